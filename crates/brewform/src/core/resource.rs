use serde::{Deserialize, Serialize};
use std::fmt;

/// Desired state of a package or tap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
    Latest,
    /// A concrete version, installed as `name@version`
    Version(String),
}

impl From<&str> for Ensure {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "present" | "installed" | "true" => Ensure::Present,
            "absent" | "purged" | "false" => Ensure::Absent,
            "latest" => Ensure::Latest,
            _ => Ensure::Version(value.trim().to_string()),
        }
    }
}

impl From<String> for Ensure {
    fn from(value: String) -> Self {
        Ensure::from(value.as_str())
    }
}

impl From<Ensure> for String {
    fn from(value: Ensure) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ensure::Present => write!(f, "present"),
            Ensure::Absent => write!(f, "absent"),
            Ensure::Latest => write!(f, "latest"),
            Ensure::Version(version) => write!(f, "{}", version),
        }
    }
}

/// Which provider produced a fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Homebrew,
    #[serde(alias = "homebrew-arm")]
    HomebrewArm,
    Tap,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Homebrew => write!(f, "homebrew"),
            ProviderKind::HomebrewArm => write!(f, "homebrewarm"),
            ProviderKind::Tap => write!(f, "tap"),
        }
    }
}

/// A package as declared by the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageResource {
    pub name: String,
    pub ensure: Ensure,
    pub install_options: Vec<String>,
    pub uninstall_options: Vec<String>,
}

impl PackageResource {
    pub fn new(name: impl Into<String>, ensure: impl Into<Ensure>) -> Self {
        Self {
            name: name.into(),
            ensure: ensure.into(),
            ..Self::default()
        }
    }

    pub fn with_install_options(mut self, options: Vec<String>) -> Self {
        self.install_options = options;
        self
    }

    pub fn with_uninstall_options(mut self, options: Vec<String>) -> Self {
        self.uninstall_options = options;
        self
    }

    /// Name as passed to brew: URLs verbatim, everything else lowercased
    pub fn resolved_name(&self) -> String {
        resolve_name(&self.name)
    }

    /// `name` or `name@version`, depending on `ensure`
    pub fn install_target(&self) -> String {
        match &self.ensure {
            Ensure::Version(version) => format!("{}@{}", self.resolved_name(), version),
            _ => self.resolved_name(),
        }
    }
}

/// URLs are passed through, plain names lowercased
pub fn resolve_name(name: &str) -> String {
    if name.starts_with("http://") || name.starts_with("https://") {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

/// An installed package as reported by brew
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFact {
    pub name: String,
    /// Version text as printed by `brew list --versions`, possibly several
    /// space separated versions
    pub ensure: String,
    pub provider: ProviderKind,
}

impl PackageFact {
    /// Whether one of the installed versions is `version` or lies under it
    /// (`18` covers `18.19.0`)
    pub fn has_version(&self, version: &str) -> bool {
        let series = format!("{}.", version);
        self.ensure
            .split_whitespace()
            .any(|installed| installed == version || installed.starts_with(&series))
    }

    /// Whether this fact satisfies a pinned `version`, either through a
    /// versioned formula name (`node@18`) or through the installed versions
    pub fn satisfies_version(&self, version: &str) -> bool {
        self.name.ends_with(&format!("@{}", version.to_lowercase())) || self.has_version(version)
    }
}

/// A tap as declared by the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TapResource {
    pub name: String,
    pub ensure: Ensure,
    pub install_options: Vec<String>,
}

impl TapResource {
    pub fn new(name: impl Into<String>, ensure: impl Into<Ensure>) -> Self {
        Self {
            name: name.into(),
            ensure: ensure.into(),
            install_options: Vec::new(),
        }
    }

    /// Taps are always addressed in lowercase
    pub fn resolved_name(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A registered tap as reported by `brew tap`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapFact {
    pub name: String,
    pub ensure: String,
    pub provider: ProviderKind,
}

impl TapFact {
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: "present".to_string(),
            provider: ProviderKind::Tap,
        }
    }
}
