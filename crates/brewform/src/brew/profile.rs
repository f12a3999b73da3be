//! Platform profiles: the small set of facts that separate the Intel and
//! Apple Silicon providers.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use brewform_core::{ConfigError, HOMEBREW_ARM_PROFILE, HOMEBREW_PROFILE, canonical_profile};

use crate::core::resource::ProviderKind;
use crate::utils::ProviderError;

/// Install location on Intel Macs
pub const INTEL_BREW_PATH: &str = "/usr/local/bin/brew";
/// Install location on Apple Silicon Macs
pub const ARM_BREW_PATH: &str = "/opt/homebrew/bin/brew";
/// Forces the ARM code paths in brew even from a Rosetta parent
pub const ARM_ENV_OVERRIDE: (&str, &str) = ("HOMEBREW_CHANGE_ARCH_TO_ARM", "1");

/// How cask commands are spelled for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaskSyntaxPolicy {
    /// Ask `brew --version` before every cask command
    Detect,
    /// Always use `brew cask <subcommand>`
    Legacy,
}

/// Everything that differs between the Homebrew provider variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub kind: ProviderKind,
    pub brew_path: PathBuf,
    /// Extra variables for the child, on top of HOME
    pub environment: Vec<(String, String)>,
    pub cask_syntax: CaskSyntaxPolicy,
    /// Append stderr to the captured output
    pub combine_output: bool,
    /// Whether uninstall options are passed through to brew
    pub uninstall_options: bool,
}

impl PlatformProfile {
    /// Intel/Universal Homebrew, preferring /usr/local over /opt/homebrew
    pub fn homebrew() -> Self {
        let brew_path = if Path::new(INTEL_BREW_PATH).exists() {
            INTEL_BREW_PATH
        } else {
            ARM_BREW_PATH
        };
        Self::homebrew_at(brew_path)
    }

    /// Intel/Universal Homebrew at an explicit path
    pub fn homebrew_at(brew_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ProviderKind::Homebrew,
            brew_path: brew_path.into(),
            environment: Vec::new(),
            cask_syntax: CaskSyntaxPolicy::Detect,
            combine_output: false,
            uninstall_options: true,
        }
    }

    /// Apple Silicon Homebrew under /opt/homebrew
    pub fn homebrew_arm() -> Self {
        Self {
            kind: ProviderKind::HomebrewArm,
            brew_path: PathBuf::from(ARM_BREW_PATH),
            environment: vec![(ARM_ENV_OVERRIDE.0.to_string(), ARM_ENV_OVERRIDE.1.to_string())],
            cask_syntax: CaskSyntaxPolicy::Legacy,
            combine_output: true,
            uninstall_options: false,
        }
    }

    /// Apple Silicon Homebrew, as used for tap management
    pub fn tap_arm() -> Self {
        Self {
            kind: ProviderKind::Tap,
            ..Self::homebrew_arm()
        }
    }

    /// Point the profile at a different brew binary
    pub fn with_brew_path(mut self, brew_path: impl Into<PathBuf>) -> Self {
        self.brew_path = brew_path.into();
        self
    }
}

/// Profile names accepted on the command line and in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileName {
    Homebrew,
    HomebrewArm,
}

impl ProfileName {
    pub fn profile(self) -> PlatformProfile {
        match self {
            ProfileName::Homebrew => PlatformProfile::homebrew(),
            ProfileName::HomebrewArm => PlatformProfile::homebrew_arm(),
        }
    }
}

impl FromStr for ProfileName {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_profile(s) {
            Some(HOMEBREW_PROFILE) => Ok(ProfileName::Homebrew),
            Some(HOMEBREW_ARM_PROFILE) => Ok(ProfileName::HomebrewArm),
            _ => Err(ProviderError::Config(ConfigError::Invalid(format!("unknown profile '{}'", s.trim().to_lowercase())))),
        }
    }
}
