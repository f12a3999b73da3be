pub mod cask;
pub mod core;
pub mod exec;
pub mod identity;
pub mod parse;
pub mod profile;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export common types
pub use cask::{BrewVersion, CaskSyntax};
pub use self::core::BrewCore;
pub use exec::{BrewCommand, CommandOutput, CommandRunner, SystemRunner};
pub use identity::ExecutionIdentity;
pub use profile::{CaskSyntaxPolicy, PlatformProfile, ProfileName};
