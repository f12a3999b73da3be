// Brewform - declarative Homebrew package and tap providers for macOS

// Core modules
pub mod core;
pub mod brew;
pub mod provider;
pub mod apply;
pub mod utils;

// CLI handling
pub mod cli;

// Re-export common types and functions for convenience
pub use self::core::{manifest, resource};
pub use apply::{Action, Applier, ApplyOptions, ApplySummary, apply_manifest, plan_package, plan_tap};
pub use brew::{PlatformProfile, ProfileName, SystemRunner};
pub use provider::{HomebrewProvider, Provider, TapProvider, Upgradeable};
pub use utils::{ProviderError, ProviderResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
