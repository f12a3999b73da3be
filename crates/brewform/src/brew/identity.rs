//! The user a brew command runs as.
//!
//! Homebrew refuses to run as root, so every command is executed as the
//! owner of the brew binary. When the caller is already that user (or any
//! unprivileged user) nothing is switched; when the caller is root the child
//! process drops to the owner's uid/gid. The identity is resolved again for
//! every command.

use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::unistd::{Uid, User, geteuid};
use tracing::debug;

use crate::utils::{ProviderError, ProviderResult};

const SUPERUSER_UID: u32 = 0;

/// Who a brew command runs as, and with which HOME
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionIdentity {
    /// Owner of the brew binary
    pub uid: u32,
    /// Group of the brew binary
    pub gid: u32,
    /// Home directory of the owner, exported as HOME
    pub home: PathBuf,
    /// Whether the child must switch to `uid`/`gid` (caller is root)
    pub switch_user: bool,
}

impl ExecutionIdentity {
    /// Resolve the identity for the given brew binary
    pub fn resolve(brew_path: &Path) -> ProviderResult<Self> {
        let metadata = std::fs::metadata(brew_path).map_err(|source| ProviderError::OwnerLookup {
            path: brew_path.to_path_buf(),
            source,
        })?;

        let owner = metadata.uid();
        Self::from_owner(brew_path, owner, metadata.gid(), home_dir_for(owner), current_uid())
    }

    /// Build the identity from already-known ownership facts
    ///
    /// A root owner is rejected before a missing home directory.
    pub fn from_owner(
        brew_path: &Path,
        owner_uid: u32,
        owner_gid: u32,
        home: Option<PathBuf>,
        caller_uid: u32,
    ) -> ProviderResult<Self> {
        if owner_uid == SUPERUSER_UID {
            return Err(ProviderError::RootOwnedInstallation {
                path: brew_path.to_path_buf(),
            });
        }

        let home = home.ok_or(ProviderError::HomeLookup { uid: owner_uid })?;

        Ok(Self {
            uid: owner_uid,
            gid: owner_gid,
            home,
            switch_user: caller_uid == SUPERUSER_UID,
        })
    }
}

/// Effective uid of this process
pub fn current_uid() -> u32 {
    geteuid().as_raw()
}

/// Look up the home directory of `uid` in the password database
pub fn home_dir_for(uid: u32) -> Option<PathBuf> {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(user) => user.map(|user| user.dir),
        Err(e) => {
            debug!("Password database lookup for uid {} failed: {}", uid, e);
            None
        }
    }
}
