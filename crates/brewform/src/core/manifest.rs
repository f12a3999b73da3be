use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::core::resource::{Ensure, PackageResource, ProviderKind, TapResource};
use crate::utils::{ProviderError, ProviderResult, ResultExt};

/// Declared packages and taps
///
/// ```toml
/// [metadata]
/// name = "workstation"
///
/// [[tap]]
/// name = "homebrew/cask-fonts"
///
/// [[package]]
/// name = "wget"
/// ensure = "latest"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default, rename = "tap")]
    pub taps: Vec<TapEntry>,

    #[serde(default, rename = "package")]
    pub packages: Vec<PackageEntry>,
}

/// Metadata for the manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// A `[[package]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,

    #[serde(default)]
    pub ensure: Ensure,

    #[serde(default)]
    pub install_options: Vec<String>,

    #[serde(default)]
    pub uninstall_options: Vec<String>,

    /// Overrides the default package provider for this entry
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

impl PackageEntry {
    pub fn resource(&self) -> PackageResource {
        PackageResource {
            name: self.name.clone(),
            ensure: self.ensure.clone(),
            install_options: self.install_options.clone(),
            uninstall_options: self.uninstall_options.clone(),
        }
    }
}

/// A `[[tap]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapEntry {
    pub name: String,

    #[serde(default)]
    pub ensure: Ensure,

    #[serde(default)]
    pub install_options: Vec<String>,
}

impl TapEntry {
    pub fn resource(&self) -> TapResource {
        TapResource {
            name: self.name.clone(),
            ensure: self.ensure.clone(),
            install_options: self.install_options.clone(),
        }
    }
}

impl Manifest {
    /// Load a manifest from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProviderResult<Self> {
        let path = path.as_ref();
        debug!("Loading manifest from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse and validate manifest TOML
    pub fn parse(content: &str) -> ProviderResult<Self> {
        let manifest: Manifest = toml::from_str(content)
            .map_err(|e| ProviderError::Manifest(format!("Failed to parse manifest: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject entries no provider could act on
    pub fn validate(&self) -> ProviderResult<()> {
        for entry in &self.packages {
            if entry.name.trim().is_empty() {
                return Err(ProviderError::Manifest("Package name cannot be empty".to_string()));
            }
            if is_blank(&entry.ensure) {
                return Err(ProviderError::Manifest(format!("Package '{}' has an empty ensure", entry.name)));
            }
            if entry.provider == Some(ProviderKind::Tap) {
                return Err(ProviderError::Manifest(format!(
                    "Package '{}' cannot use the tap provider",
                    entry.name
                )));
            }
        }

        for entry in &self.taps {
            if entry.name.trim().is_empty() {
                return Err(ProviderError::Manifest("Tap name cannot be empty".to_string()));
            }
            if is_blank(&entry.ensure) {
                return Err(ProviderError::Manifest(format!("Tap '{}' has an empty ensure", entry.name)));
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.taps.is_empty()
    }
}

/// An empty `ensure` would install `name@`
fn is_blank(ensure: &Ensure) -> bool {
    matches!(ensure, Ensure::Version(version) if version.is_empty())
}
