//! Core functionality for executing Homebrew commands.
//!
//! [`BrewCore`] pairs a [`CommandRunner`] with a [`PlatformProfile`]: it turns
//! argument lists into [`BrewCommand`]s for the profile's binary and
//! environment, maps non-zero exits to execution failures on request, and
//! knows how to spell cask commands for the profile.

use tracing::debug;

use crate::brew::cask::CaskSyntax;
use crate::brew::exec::{BrewCommand, CommandOutput, CommandRunner};
use crate::brew::parse;
use crate::brew::profile::{CaskSyntaxPolicy, PlatformProfile};
use crate::utils::{ProviderError, ProviderResult};

/// Core functionality for executing brew commands
#[derive(Debug, Clone)]
pub struct BrewCore<R> {
    runner: R,
    profile: PlatformProfile,
}

impl<R: CommandRunner> BrewCore<R> {
    pub fn new(runner: R, profile: PlatformProfile) -> Self {
        Self { runner, profile }
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Describe a brew invocation for this profile
    pub fn command<S: AsRef<str>>(&self, args: &[S]) -> BrewCommand {
        BrewCommand {
            program: self.profile.brew_path.clone(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            environment: self.profile.environment.clone(),
            combine_output: self.profile.combine_output,
        }
    }

    /// Run a brew command and return its exit status and output
    pub fn capture<S: AsRef<str>>(&self, args: &[S]) -> ProviderResult<(BrewCommand, CommandOutput)> {
        let command = self.command(args);
        let output = self.runner.run(&command)?;
        debug!("'{}' exited with {:?}", command.display(), output.status);
        Ok((command, output))
    }

    /// Run a brew command and return its output
    ///
    /// With `fail_on_error` a non-zero exit becomes
    /// [`ProviderError::ExecutionFailure`]; otherwise the output is returned
    /// whatever the exit status.
    pub fn execute<S: AsRef<str>>(&self, args: &[S], fail_on_error: bool) -> ProviderResult<String> {
        let (command, output) = self.capture(args)?;
        if fail_on_error {
            output.into_result(&command)
        } else {
            Ok(output.output)
        }
    }

    /// The cask spelling to use right now
    pub fn cask_syntax(&self) -> ProviderResult<CaskSyntax> {
        match self.profile.cask_syntax {
            CaskSyntaxPolicy::Legacy => Ok(CaskSyntax::Subcommand),
            CaskSyntaxPolicy::Detect => {
                let output = self.execute(&["--version"], false)?;
                let version = parse::parse_brew_version(&output)
                    .ok_or_else(|| ProviderError::VersionDetection(output.trim().to_string()))?;
                let syntax = CaskSyntax::for_version(&version);
                debug!("Homebrew {} uses {:?} cask syntax", version, syntax);
                Ok(syntax)
            }
        }
    }

    /// Rewrite a formula argument list into its cask form
    pub fn cask_args(&self, args: &[String]) -> ProviderResult<Vec<String>> {
        Ok(self.cask_syntax()?.apply(args))
    }
}
