//! Cask command spelling.
//!
//! Homebrew 2.6.0 replaced `brew cask <subcommand>` with
//! `brew <subcommand> --cask`. The spelling is picked from the running brew
//! version, or pinned to the legacy form by the profile.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// First Homebrew release that understands `--cask`
pub const CASK_FLAG_SINCE: [u64; 3] = [2, 6, 0];

/// The two ways of addressing casks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaskSyntax {
    /// `brew install --cask name`
    Flag,
    /// `brew cask install name`
    Subcommand,
}

impl CaskSyntax {
    /// The spelling supported by a given brew version
    pub fn for_version(version: &BrewVersion) -> Self {
        if *version >= BrewVersion::from_segments(&CASK_FLAG_SINCE) {
            CaskSyntax::Flag
        } else {
            CaskSyntax::Subcommand
        }
    }

    /// Rewrite a formula argument list (subcommand first) into its cask form
    pub fn apply(self, args: &[String]) -> Vec<String> {
        let mut result = Vec::with_capacity(args.len() + 1);
        match self {
            CaskSyntax::Flag => {
                let mut rest = args.iter();
                if let Some(subcommand) = rest.next() {
                    result.push(subcommand.clone());
                }
                result.push("--cask".to_string());
                result.extend(rest.cloned());
            }
            CaskSyntax::Subcommand => {
                result.push("cask".to_string());
                result.extend(args.iter().cloned());
            }
        }
        result
    }
}

/// A dotted numeric version, compared segment by segment
#[derive(Debug, Clone, Eq)]
pub struct BrewVersion {
    segments: Vec<u64>,
}

impl BrewVersion {
    pub fn from_segments(segments: &[u64]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for BrewVersion {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .trim()
            .split('.')
            .map(str::parse)
            .collect::<Result<Vec<u64>, _>>()?;
        Ok(Self { segments })
    }
}

impl Ord for BrewVersion {
    // Missing trailing segments count as zero, so 2.6 == 2.6.0
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for BrewVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BrewVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for BrewVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}
