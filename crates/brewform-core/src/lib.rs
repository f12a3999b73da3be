// Brewform Core - shared components for the brewform providers

pub mod core;
pub mod logging;

// Re-export common types
pub use self::core::config::{
    BrewformConfig, HOMEBREW_ARM_PROFILE, HOMEBREW_PROFILE, canonical_profile, config_dir, default_config_path,
};
pub use self::core::error::{ConfigError, ConfigResult};
pub use logging::init_logger;
