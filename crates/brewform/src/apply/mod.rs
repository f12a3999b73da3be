//! Converge the system onto a manifest.
//!
//! Every declared resource is queried, compared with its declared `ensure`
//! and handed to its provider when the two differ. Taps go first so that
//! packages from those taps can be found. A failing resource is logged and
//! counted; the remaining resources are still applied.

pub mod plan;

pub use plan::{Action, plan_package, plan_tap};

use std::fmt;
use tracing::{debug, info};

use crate::brew::exec::CommandRunner;
use crate::brew::PlatformProfile;
use crate::core::manifest::{Manifest, PackageEntry, TapEntry};
use crate::core::resource::ProviderKind;
use crate::provider::{HomebrewProvider, Provider, TapProvider, Upgradeable};
use crate::utils::{ProviderError, ProviderResult, log_error, log_step, log_success};

/// Options for applying manifests
#[derive(Debug, Default, Clone)]
pub struct ApplyOptions {
    /// Report what would change without running anything that mutates
    pub dry_run: bool,
}

/// One resource that was (or would be) changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub resource: String,
    pub action: Action,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.resource)
    }
}

/// Outcome of an apply run
#[derive(Debug, Default)]
pub struct ApplySummary {
    pub changes: Vec<Change>,
    pub unchanged: usize,
    /// Resource label and error text
    pub failures: Vec<(String, String)>,
}

impl ApplySummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// `ApplyFailed` when any resource failed
    pub fn into_result(self) -> ProviderResult<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(ProviderError::ApplyFailed { failed: self.failures.len() })
        }
    }

    fn fail(&mut self, resource: String, error: &ProviderError) {
        log_error(&format!("{}: {}", resource, error));
        self.failures.push((resource, error.to_string()));
    }
}

/// The providers a manifest is applied with
#[derive(Debug, Clone)]
pub struct Applier<R> {
    default_kind: ProviderKind,
    homebrew: HomebrewProvider<R>,
    homebrew_arm: HomebrewProvider<R>,
    taps: TapProvider<R>,
}

impl<R: CommandRunner + Clone> Applier<R> {
    /// Build the provider set; packages without an explicit provider use
    /// `default_profile`
    pub fn new(runner: R, default_profile: PlatformProfile) -> Self {
        let default_kind = default_profile.kind;
        let (intel, arm) = match default_kind {
            ProviderKind::HomebrewArm => (PlatformProfile::homebrew(), default_profile),
            _ => (default_profile, PlatformProfile::homebrew_arm()),
        };
        let tap = PlatformProfile::tap_arm().with_brew_path(arm.brew_path.clone());

        Self {
            default_kind,
            homebrew: HomebrewProvider::new(runner.clone(), intel),
            homebrew_arm: HomebrewProvider::new(runner.clone(), arm),
            taps: TapProvider::new(runner, tap),
        }
    }
}

impl<R: CommandRunner> Applier<R> {
    fn package_provider(&self, kind: Option<ProviderKind>) -> &HomebrewProvider<R> {
        match kind.unwrap_or(self.default_kind) {
            ProviderKind::HomebrewArm => &self.homebrew_arm,
            _ => &self.homebrew,
        }
    }

    /// Apply every tap, then every package
    ///
    /// Returns the summary even when resources failed; use
    /// [`ApplySummary::into_result`] to turn failures into an error.
    pub fn apply(&self, manifest: &Manifest, options: &ApplyOptions) -> ApplySummary {
        let mut summary = ApplySummary::default();

        if manifest.is_empty() {
            info!("Manifest declares no taps or packages, nothing to apply");
            return summary;
        }

        for entry in &manifest.taps {
            self.apply_tap(entry, options, &mut summary);
        }
        for entry in &manifest.packages {
            self.apply_package(entry, options, &mut summary);
        }

        info!(
            "Apply finished: {} changed, {} unchanged, {} failed",
            summary.changes.len(),
            summary.unchanged,
            summary.failed()
        );
        summary
    }

    fn apply_tap(&self, entry: &TapEntry, options: &ApplyOptions, summary: &mut ApplySummary) {
        let resource = entry.resource();
        let label = format!("tap {}", resource.resolved_name());

        converge(
            label,
            options,
            summary,
            || Ok(plan_tap(&resource, self.taps.query(&resource)?.as_ref())),
            |action| match action {
                Action::Install | Action::Update => self.taps.install(&resource),
                Action::Uninstall => self.taps.uninstall(&resource),
                Action::Noop => Ok(()),
            },
        );
    }

    fn apply_package(&self, entry: &PackageEntry, options: &ApplyOptions, summary: &mut ApplySummary) {
        let provider = self.package_provider(entry.provider);
        let resource = entry.resource();
        let label = format!("{} package {}", provider.kind(), resource.resolved_name());

        converge(
            label,
            options,
            summary,
            || Ok(plan_package(&resource, provider.query_declared(&resource)?.as_ref())),
            |action| match action {
                Action::Install => provider.install(&resource),
                Action::Update => provider.update(&resource),
                Action::Uninstall => provider.uninstall(&resource),
                Action::Noop => Ok(()),
            },
        );
    }
}

/// Apply `manifest` with `providers`, reporting only when `dry_run` is set
pub fn apply_manifest<R: CommandRunner>(manifest: &Manifest, providers: &Applier<R>, dry_run: bool) -> ApplySummary {
    providers.apply(manifest, &ApplyOptions { dry_run })
}

fn converge<P, F>(label: String, options: &ApplyOptions, summary: &mut ApplySummary, plan: P, perform: F)
where
    P: FnOnce() -> ProviderResult<Action>,
    F: FnOnce(Action) -> ProviderResult<()>,
{
    let action = match plan() {
        Ok(action) => action,
        Err(e) => return summary.fail(label, &e),
    };

    if action == Action::Noop {
        debug!("{} is in the declared state", label);
        summary.unchanged += 1;
        return;
    }

    let change = Change { resource: label, action };

    if options.dry_run {
        log_step(&format!("Would {}", change));
        summary.changes.push(change);
        return;
    }

    log_step(&format!("{} {}", action.verb(), change.resource));
    match perform(action) {
        Ok(()) => {
            log_success(&format!("{} done", change));
            summary.changes.push(change);
        }
        Err(e) => summary.fail(change.resource, &e),
    }
}
