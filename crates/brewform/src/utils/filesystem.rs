use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Removes each file, skipping ones that are already gone
///
/// Returns the paths that were actually removed. Other failures are logged
/// and skipped as well.
pub fn remove_files_best_effort(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut removed = Vec::new();

    for file in files {
        match fs::remove_file(file) {
            Ok(()) => {
                debug!("Removed {}", file.display());
                removed.push(file.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Could not remove mismatched checksum file {}: already gone", file.display());
            }
            Err(e) => {
                warn!("Could not remove mismatched checksum file {}: {}", file.display(), e);
            }
        }
    }

    removed
}

/// Resolve a manifest argument to a full path, expanding `~`
pub fn resolve_manifest_path(manifest_target: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(manifest_target).into_owned())
}

/// Checks if a file exists
pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_existing_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("wget--1.21.tar.gz");
        fs::write(&present, b"corrupt").unwrap();
        let missing = dir.path().join("never-downloaded.tar.gz");

        let removed = remove_files_best_effort(&[present.clone(), missing]);

        assert_eq!(removed, vec![present.clone()]);
        assert!(!present.exists());
    }

    #[test]
    fn leaves_absolute_manifest_path_alone() {
        assert_eq!(resolve_manifest_path("/etc/brewform.toml"), PathBuf::from("/etc/brewform.toml"));
    }

    #[test]
    fn file_exists_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!file_exists(dir.path()));
    }
}
