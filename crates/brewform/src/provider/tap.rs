//! Tap management using Homebrew on macOS (arm64).

use tracing::{debug, error};

use crate::brew::exec::CommandRunner;
use crate::brew::parse;
use crate::brew::{BrewCore, PlatformProfile};
use crate::core::resource::{ProviderKind, TapFact, TapResource};
use crate::provider::Provider;
use crate::utils::{ProviderError, ProviderResult};

/// Registers and removes third-party taps
///
/// Listing failures are logged and reported as "nothing tapped"; only
/// `install` and `uninstall` return errors.
#[derive(Debug, Clone)]
pub struct TapProvider<R> {
    core: BrewCore<R>,
}

impl<R: CommandRunner> TapProvider<R> {
    pub fn new(runner: R, profile: PlatformProfile) -> Self {
        Self {
            core: BrewCore::new(runner, profile),
        }
    }

    /// Output of `brew tap` split into lines
    fn tapped(&self) -> ProviderResult<Vec<String>> {
        let output = self.core.execute(&["tap"], false)?;
        Ok(parse::parse_tap_list(&output))
    }
}

impl<R: CommandRunner> Provider for TapProvider<R> {
    type Resource = TapResource;
    type Fact = TapFact;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Tap
    }

    fn install(&self, resource: &TapResource) -> ProviderResult<()> {
        let name = resource.resolved_name();
        debug!("Tapping {}", name);

        let mut args = vec!["tap".to_string(), name];
        args.extend(resource.install_options.iter().cloned());

        self.core
            .execute(&args, true)
            .map(|_| ())
            .map_err(|e| ProviderError::Tap(e.to_string()))
    }

    fn uninstall(&self, resource: &TapResource) -> ProviderResult<()> {
        let name = resource.resolved_name();
        debug!("Untapping {}", name);

        self.core
            .execute(&["untap", name.as_str()], true)
            .map(|_| ())
            .map_err(|e| ProviderError::Untap(e.to_string()))
    }

    fn query(&self, resource: &TapResource) -> ProviderResult<Option<TapFact>> {
        let name = resource.resolved_name();
        debug!("Querying tap {}", name);

        match self.tapped() {
            Ok(lines) => Ok(lines
                .into_iter()
                .find(|line| parse::tap_matches(&name, line))
                .map(TapFact::present)),
            Err(e) => {
                error!("Could not query tap: {}", e);
                Ok(None)
            }
        }
    }

    fn instances(&self) -> ProviderResult<Vec<TapFact>> {
        debug!("Listing currently tapped repositories");

        match self.tapped() {
            Ok(lines) => Ok(lines.into_iter().map(TapFact::present).collect()),
            Err(e) => {
                error!("Could not list taps: {}", e);
                Ok(Vec::new())
            }
        }
    }
}
