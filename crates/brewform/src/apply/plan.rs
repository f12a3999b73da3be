use std::fmt;

use crate::core::resource::{Ensure, PackageFact, PackageResource, TapFact, TapResource};

/// What has to happen for a resource to reach its declared state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Noop,
    Install,
    Update,
    Uninstall,
}

impl Action {
    /// Present participle for progress lines
    pub fn verb(self) -> &'static str {
        match self {
            Action::Noop => "Keeping",
            Action::Install => "Installing",
            Action::Update => "Updating",
            Action::Uninstall => "Uninstalling",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Noop => write!(f, "keep"),
            Action::Install => write!(f, "install"),
            Action::Update => write!(f, "update"),
            Action::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Decide the action for a package given what is installed
///
/// `latest` always updates an installed package: `brew install` upgrades
/// outdated packages and leaves current ones alone.
pub fn plan_package(resource: &PackageResource, current: Option<&PackageFact>) -> Action {
    match (&resource.ensure, current) {
        (Ensure::Absent, Some(_)) => Action::Uninstall,
        (Ensure::Absent, None) => Action::Noop,
        (_, None) => Action::Install,
        (Ensure::Present, Some(_)) => Action::Noop,
        (Ensure::Latest, Some(_)) => Action::Update,
        (Ensure::Version(version), Some(fact)) => {
            if fact.satisfies_version(version) {
                Action::Noop
            } else {
                Action::Install
            }
        }
    }
}

/// Decide the action for a tap; taps have no versions
pub fn plan_tap(resource: &TapResource, current: Option<&TapFact>) -> Action {
    match (&resource.ensure, current) {
        (Ensure::Absent, Some(_)) => Action::Uninstall,
        (Ensure::Absent, None) => Action::Noop,
        (_, None) => Action::Install,
        (_, Some(_)) => Action::Noop,
    }
}
