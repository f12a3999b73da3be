//! Pure parsers for brew's textual output.
//!
//! Nothing in here runs a process, so every function can be exercised with
//! captured output.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing::warn;

use crate::brew::cask::BrewVersion;
use crate::core::resource::{PackageFact, ProviderKind};

/// Marker brew prints when a cached download fails verification
pub const CHECKSUM_MARKER: &str = "sha256 checksum";

lazy_static! {
    // `brew list --versions` line: name, whitespace, one or more versions
    static ref NAME_VERSION_REGEX: Regex = Regex::new(r"^(\S+)\s+(.+)").unwrap();

    // Files brew kept from an earlier, possibly corrupt, download
    static ref ALREADY_DOWNLOADED_REGEX: Regex = Regex::new(r"Already downloaded: (.*)").unwrap();

    // First dotted number in `brew --version`, e.g. "Homebrew 4.2.1-12-gabc"
    static ref BREW_VERSION_REGEX: Regex = Regex::new(r"(\d+\.)+\d+").unwrap();
}

/// Split a listing line into a package fact
pub fn name_version_split(line: &str, provider: ProviderKind) -> Option<PackageFact> {
    let line = line.trim_end_matches(['\r', '\n']);
    match NAME_VERSION_REGEX.captures(line) {
        Some(caps) => Some(PackageFact {
            name: caps[1].to_string(),
            ensure: caps[2].trim().to_string(),
            provider,
        }),
        None => {
            warn!("Could not match {}", line);
            None
        }
    }
}

/// Parse a whole `brew list --versions` output, dropping unmatched lines
pub fn parse_package_list(output: &str, provider: ProviderKind) -> Vec<PackageFact> {
    output
        .lines()
        .filter_map(|line| name_version_split(line, provider))
        .collect()
}

/// Whether install output reports a checksum mismatch
pub fn has_checksum_failure(output: &str) -> bool {
    output.contains(CHECKSUM_MARKER)
}

/// Every path listed on an `Already downloaded:` line
pub fn already_downloaded(output: &str) -> Vec<PathBuf> {
    ALREADY_DOWNLOADED_REGEX
        .captures_iter(output)
        .flat_map(|caps| {
            caps[1]
                .split_whitespace()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Extract the version from `brew --version`
pub fn parse_brew_version(output: &str) -> Option<BrewVersion> {
    BREW_VERSION_REGEX
        .find(output)
        .and_then(|m| m.as_str().parse().ok())
}

/// Registered taps, one per non-empty line
pub fn parse_tap_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a listed tap satisfies a declared tap name
///
/// `brew tap` prints `user/repo` while users often declare the GitHub
/// repository `user/homebrew-repo`, so both spellings match.
pub fn tap_matches(declared: &str, listed: &str) -> bool {
    let declared = declared.trim().to_lowercase();
    let listed = listed.trim().to_lowercase();
    listed == declared || listed == declared.replace("homebrew-", "")
}
