use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};

pub const HOMEBREW_PROFILE: &str = "homebrew";
pub const HOMEBREW_ARM_PROFILE: &str = "homebrew-arm";

/// Profile names understood by the providers
pub const KNOWN_PROFILES: &[&str] = &[HOMEBREW_PROFILE, HOMEBREW_ARM_PROFILE];

/// Canonical spelling of a profile name, accepting any case and the
/// `homebrewarm` provider name
pub fn canonical_profile(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "homebrew" => Some(HOMEBREW_PROFILE),
        "homebrew-arm" | "homebrewarm" => Some(HOMEBREW_ARM_PROFILE),
        _ => None,
    }
}

/// Represents the brewform configuration file (`~/.brewform/config.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrewformConfig {
    /// Default platform profile for package resources
    #[serde(default)]
    pub profile: Option<String>,

    /// Override for the brew binary, `~` is expanded
    #[serde(default)]
    pub brew_path: Option<String>,

    /// Log at debug level without passing `-v`
    #[serde(default)]
    pub verbose: bool,
}

impl BrewformConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if the file exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    /// Check profile names and paths for obvious mistakes
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(profile) = &self.profile {
            if canonical_profile(profile).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "unknown profile '{}', expected one of: {}",
                    profile,
                    KNOWN_PROFILES.join(", ")
                )));
            }
        }

        if let Some(path) = &self.brew_path {
            if path.trim().is_empty() {
                return Err(ConfigError::Invalid("brew_path cannot be empty".to_string()));
            }
        }

        Ok(())
    }

    /// The brew binary override with `~` expanded
    pub fn expanded_brew_path(&self) -> Option<PathBuf> {
        self.brew_path
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).into_owned()))
    }
}

/// Get the brewform directory path (~/.brewform)
pub fn config_dir() -> ConfigResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home_dir.join(".brewform"))
}

/// Default location of the configuration file
pub fn default_config_path() -> ConfigResult<PathBuf> {
    Ok(config_dir()?.join("config.yaml"))
}
