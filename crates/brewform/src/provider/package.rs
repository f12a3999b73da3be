//! Package management using Homebrew (+ casks) on macOS.
//!
//! One provider serves both the Intel and the Apple Silicon installation;
//! the differences live in the [`PlatformProfile`]. Formulae are tried
//! first and casks second, for installs as well as uninstalls.

use tracing::debug;

use crate::brew::exec::CommandRunner;
use crate::brew::parse;
use crate::brew::{BrewCore, PlatformProfile};
use crate::core::resource::{Ensure, PackageFact, PackageResource, ProviderKind};
use crate::provider::{Provider, Upgradeable};
use crate::utils::{ProviderError, ProviderResult, remove_files_best_effort};

/// Homebrew package provider
#[derive(Debug, Clone)]
pub struct HomebrewProvider<R> {
    core: BrewCore<R>,
}

impl<R: CommandRunner> HomebrewProvider<R> {
    pub fn new(runner: R, profile: PlatformProfile) -> Self {
        Self {
            core: BrewCore::new(runner, profile),
        }
    }

    pub fn core(&self) -> &BrewCore<R> {
        &self.core
    }

    /// Installed packages, optionally narrowed to one name
    ///
    /// Listing commands never fail on a non-zero exit; brew exits non-zero
    /// for names that are not installed.
    pub fn package_list(&self, name: Option<&str>) -> ProviderResult<Vec<PackageFact>> {
        debug!("Listing installed packages");
        let output = self
            .list_output(name)
            .map_err(|e| ProviderError::ListPackages(e.to_string()))?;
        Ok(parse::parse_package_list(&output, self.core.profile().kind))
    }

    fn list_output(&self, name: Option<&str>) -> ProviderResult<String> {
        let mut args = vec!["list".to_string(), "--versions".to_string()];

        let Some(name) = name else {
            let mut result = self.core.execute(&args, false)?;
            append_output(&mut result, self.core.execute(&self.core.cask_args(&args)?, false)?);
            return Ok(result);
        };

        args.push(name.to_string());
        let mut result = self.core.execute(&args, false)?;
        if !result.contains(name) {
            append_output(&mut result, self.core.execute(&self.core.cask_args(&args)?, false)?);
        }

        if result.trim().is_empty() {
            debug!("Package {} not installed", name);
        } else {
            debug!("Found package {}", result.trim());
        }

        Ok(result)
    }

    /// The installed fact that answers for the resource's declared state
    ///
    /// A pinned version installs as `name@version` and is listed under that
    /// name, so it is looked up first and the plain name second.
    pub fn query_declared(&self, resource: &PackageResource) -> ProviderResult<Option<PackageFact>> {
        if let Ensure::Version(_) = resource.ensure {
            let pinned = PackageResource::new(resource.install_target(), Ensure::Present);
            if let Some(fact) = self.query(&pinned)? {
                return Ok(Some(fact));
            }
        }
        self.query(resource)
    }

    /// Formula arguments, or their cask spelling
    fn form(&self, args: Vec<String>, cask: bool) -> ProviderResult<Vec<String>> {
        if cask { self.core.cask_args(&args) } else { Ok(args) }
    }

    /// `brew info` then `brew install`, as formula or as cask
    fn install_as(&self, resource: &PackageResource, target: &str, cask: bool) -> ProviderResult<()> {
        let info = self.form(vec!["info".to_string(), target.to_string()], cask)?;
        self.core.execute(&info, true)?;

        debug!("Package found{}, installing...", if cask { " on brewcask" } else { "" });

        let mut install = vec!["install".to_string(), target.to_string()];
        install.extend(resource.install_options.iter().cloned());
        let install = self.form(install, cask)?;

        let (command, output) = self.core.capture(&install)?;
        debug!("{}", output.output);

        if parse::has_checksum_failure(&output.output) {
            return Err(self.fix_checksum(resource, &output.output));
        }

        output.into_result(&command).map(|_| ())
    }

    /// Remove the cached downloads named in the output and report failure
    ///
    /// The install still fails; the next attempt downloads afresh.
    fn fix_checksum(&self, resource: &PackageResource, output: &str) -> ProviderError {
        debug!("Fixing checksum error...");
        let files = parse::already_downloaded(output);
        let removed = remove_files_best_effort(&files);
        debug!("Removed {} of {} mismatched download(s)", removed.len(), files.len());

        ProviderError::ChecksumMismatch {
            package: resource.resolved_name(),
            files,
        }
    }
}

fn append_output(result: &mut String, more: String) {
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(&more);
}

impl<R: CommandRunner> Provider for HomebrewProvider<R> {
    type Resource = PackageResource;
    type Fact = PackageFact;

    fn kind(&self) -> ProviderKind {
        self.core.profile().kind
    }

    fn install(&self, resource: &PackageResource) -> ProviderResult<()> {
        let target = resource.install_target();
        debug!("Looking for {} package on brew...", target);

        match self.install_as(resource, &target, false) {
            Ok(()) => Ok(()),
            Err(e @ ProviderError::ChecksumMismatch { .. }) => Err(e),
            Err(e) if e.is_execution_failure() => {
                debug!("Rescued: {}", e);
                debug!("Package {} not found on Brew. Trying BrewCask...", target);

                self.install_as(resource, &target, true).map_err(|e| match e {
                    ProviderError::ChecksumMismatch { .. } => e,
                    other => ProviderError::Install(other.to_string()),
                })
            }
            Err(e) => Err(ProviderError::Install(e.to_string())),
        }
    }

    fn uninstall(&self, resource: &PackageResource) -> ProviderResult<()> {
        let name = resource.resolved_name();
        debug!("Uninstalling {}", name);

        let mut args = vec!["uninstall".to_string(), name];
        if self.core.profile().uninstall_options {
            args.extend(resource.uninstall_options.iter().cloned());
        } else if !resource.uninstall_options.is_empty() {
            debug!("Uninstall options are not supported by the {} provider, ignoring them", self.kind());
        }

        match self.core.execute(&args, true) {
            Ok(_) => Ok(()),
            Err(e) if e.is_execution_failure() => {
                debug!("Rescued: {}", e);
                self.core
                    .cask_args(&args)
                    .and_then(|cask| self.core.execute(&cask, true))
                    .map(|_| ())
                    .map_err(|e| ProviderError::Uninstall(e.to_string()))
            }
            Err(e) => Err(ProviderError::Uninstall(e.to_string())),
        }
    }

    fn query(&self, resource: &PackageResource) -> ProviderResult<Option<PackageFact>> {
        let name = resource.resolved_name();
        let facts = self.package_list(Some(&name))?;
        Ok(facts.into_iter().find(|fact| fact.name == name))
    }

    fn instances(&self) -> ProviderResult<Vec<PackageFact>> {
        self.package_list(None)
    }
}

impl<R: CommandRunner> Upgradeable for HomebrewProvider<R> {
    fn update(&self, resource: &PackageResource) -> ProviderResult<()> {
        debug!("Updating {}", resource.resolved_name());
        self.install(resource)
    }

    fn latest(&self, resource: &PackageResource) -> ProviderResult<Option<String>> {
        Ok(self.query(resource)?.map(|fact| fact.ensure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brew::testing::ScriptedRunner;

    fn intel(runner: &ScriptedRunner) -> HomebrewProvider<&ScriptedRunner> {
        HomebrewProvider::new(runner, PlatformProfile::homebrew_at("/usr/local/bin/brew"))
    }

    fn arm(runner: &ScriptedRunner) -> HomebrewProvider<&ScriptedRunner> {
        HomebrewProvider::new(runner, PlatformProfile::homebrew_arm())
    }

    #[test]
    fn installs_formula_when_info_succeeds() {
        let runner = ScriptedRunner::new()
            .ok(&["info", "wget"], "wget: stable 1.21.4")
            .ok(&["install", "wget"], "==> Pouring wget--1.21.4.bottle.tar.gz");

        intel(&runner).install(&PackageResource::new("wget", "latest")).unwrap();
        assert_eq!(runner.call_lines(), vec!["info wget", "install wget"]);
    }

    #[test]
    fn passes_install_options_and_version() {
        let runner = ScriptedRunner::new()
            .ok(&["info", "node@18"], "")
            .ok(&["install", "node@18", "--force-bottle"], "");

        let resource = PackageResource::new("Node", "18").with_install_options(vec!["--force-bottle".to_string()]);
        intel(&runner).install(&resource).unwrap();
        assert_eq!(runner.call_lines(), vec!["info node@18", "install node@18 --force-bottle"]);
    }

    #[test]
    fn falls_back_to_cask_with_detected_syntax() {
        let runner = ScriptedRunner::new()
            .version("4.1.0")
            .fail(&["info", "firefox"], "Error: No available formula")
            .ok(&["info", "--cask", "firefox"], "firefox: 118.0")
            .ok(&["install", "--cask", "firefox"], "firefox was successfully installed!");

        intel(&runner).install(&PackageResource::new("Firefox", "present")).unwrap();
        assert_eq!(
            runner.action_lines(),
            vec!["info firefox", "info --cask firefox", "install --cask firefox"]
        );
    }

    #[test]
    fn failed_formula_install_also_falls_back() {
        let runner = ScriptedRunner::new()
            .version("4.1.0")
            .ok(&["info", "docker"], "docker: stable 24.0")
            .fail(&["install", "docker"], "Error: conflicts with cask")
            .ok(&["info", "--cask", "docker"], "")
            .ok(&["install", "--cask", "docker"], "");

        intel(&runner).install(&PackageResource::new("docker", "present")).unwrap();
        assert_eq!(runner.action_lines().last().map(String::as_str), Some("install --cask docker"));
    }

    #[test]
    fn failed_fallback_reports_install_error() {
        let runner = ScriptedRunner::new()
            .version("4.1.0")
            .fail(&["info", "nothing"], "Error: No available formula")
            .fail(&["info", "--cask", "nothing"], "Error: Cask 'nothing' is unavailable");

        let err = intel(&runner).install(&PackageResource::new("nothing", "present")).unwrap_err();
        match err {
            ProviderError::Install(detail) => assert!(detail.contains("Cask 'nothing' is unavailable")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn arm_fallback_uses_legacy_cask_subcommand() {
        let runner = ScriptedRunner::new()
            .fail(&["info", "iterm2"], "")
            .ok(&["cask", "info", "iterm2"], "")
            .ok(&["cask", "install", "iterm2"], "");

        arm(&runner).install(&PackageResource::new("iterm2", "present")).unwrap();
        assert_eq!(
            runner.call_lines(),
            vec!["info iterm2", "cask info iterm2", "cask install iterm2"]
        );
        assert!(runner
            .calls()
            .iter()
            .all(|call| call.environment == vec![("HOMEBREW_CHANGE_ARCH_TO_ARM".to_string(), "1".to_string())]));
    }

    #[test]
    fn checksum_failure_cleans_up_and_fails_without_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("wget--1.21.4.tar.gz");
        std::fs::write(&cached, b"corrupt").unwrap();
        let gone = dir.path().join("never-there.tar.gz");

        let output = format!(
            "Already downloaded: {} {}\nError: SHA256 mismatch\nsha256 checksum mismatch\n",
            cached.display(),
            gone.display()
        );
        let runner = ScriptedRunner::new()
            .ok(&["info", "wget"], "")
            .fail(&["install", "wget"], &output);

        let err = intel(&runner).install(&PackageResource::new("wget", "present")).unwrap_err();
        match err {
            ProviderError::ChecksumMismatch { package, files } => {
                assert_eq!(package, "wget");
                assert_eq!(files, vec![cached.clone(), gone]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!cached.exists());
        assert_eq!(runner.call_lines(), vec!["info wget", "install wget"]);
    }

    #[test]
    fn uninstalls_formula_with_options() {
        let runner = ScriptedRunner::new().ok(&["uninstall", "wget", "--force"], "");
        let resource = PackageResource::new("wget", "absent").with_uninstall_options(vec!["--force".to_string()]);

        intel(&runner).uninstall(&resource).unwrap();
        assert_eq!(runner.call_lines(), vec!["uninstall wget --force"]);
    }

    #[test]
    fn uninstall_falls_back_to_cask_then_reports() {
        let runner = ScriptedRunner::new()
            .version("2.5.0")
            .fail(&["uninstall", "slack"], "Error: No such keg")
            .ok(&["cask", "uninstall", "slack"], "");
        intel(&runner).uninstall(&PackageResource::new("slack", "absent")).unwrap();
        assert_eq!(runner.action_lines(), vec!["uninstall slack", "cask uninstall slack"]);

        let runner = ScriptedRunner::new()
            .version("2.5.0")
            .fail(&["uninstall", "slack"], "Error: No such keg")
            .fail(&["cask", "uninstall", "slack"], "Error: Cask 'slack' is not installed.");
        let err = intel(&runner).uninstall(&PackageResource::new("slack", "absent")).unwrap_err();
        assert!(matches!(err, ProviderError::Uninstall(ref detail) if detail.contains("not installed")));
    }

    #[test]
    fn arm_drops_uninstall_options() {
        let runner = ScriptedRunner::new().ok(&["uninstall", "wget"], "");
        let resource = PackageResource::new("wget", "absent").with_uninstall_options(vec!["--force".to_string()]);

        arm(&runner).uninstall(&resource).unwrap();
        assert_eq!(runner.call_lines(), vec!["uninstall wget"]);
    }

    #[test]
    fn query_skips_cask_listing_when_formula_found() {
        let runner = ScriptedRunner::new().ok(&["list", "--versions", "git"], "git 2.42.0\n");

        let fact = intel(&runner).query(&PackageResource::new("Git", "present")).unwrap().unwrap();
        assert_eq!(fact.name, "git");
        assert_eq!(fact.ensure, "2.42.0");
        assert_eq!(fact.provider, ProviderKind::Homebrew);
        assert_eq!(runner.call_lines(), vec!["list --versions git"]);
    }

    #[test]
    fn query_consults_casks_when_formula_missing() {
        let runner = ScriptedRunner::new()
            .version("4.0.0")
            .fail(&["list", "--versions", "firefox"], "")
            .ok(&["list", "--cask", "--versions", "firefox"], "firefox 118.0.1\n");

        let provider = intel(&runner);
        let resource = PackageResource::new("firefox", "latest");
        assert_eq!(provider.latest(&resource).unwrap().as_deref(), Some("118.0.1"));
    }

    #[test]
    fn query_reports_absent_packages() {
        let runner = ScriptedRunner::new().version("4.0.0");
        assert!(intel(&runner).query(&PackageResource::new("ghost", "present")).unwrap().is_none());
    }

    #[test]
    fn instances_merge_formulae_and_casks() {
        let runner = ScriptedRunner::new()
            .ok(&["list", "--versions"], "git 2.42.0\nwget 1.21.4")
            .ok(&["cask", "list", "--versions"], "firefox 118.0\nnoversion\n");

        let facts = arm(&runner).instances().unwrap();
        let names: Vec<&str> = facts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["git", "wget", "firefox"]);
        assert!(facts.iter().all(|f| f.provider == ProviderKind::HomebrewArm));
    }

    #[test]
    fn listing_wraps_configuration_failures() {
        let runner = ScriptedRunner::new()
            .ok(&["list", "--versions"], "")
            .ok(&["--version"], "not a version");

        let err = intel(&runner).instances().unwrap_err();
        assert!(matches!(err, ProviderError::ListPackages(_)));
    }

    #[test]
    fn update_reinstalls() {
        let runner = ScriptedRunner::new()
            .ok(&["info", "wget"], "")
            .ok(&["install", "wget"], "Warning: wget 1.21.4 is already installed and up-to-date.");

        intel(&runner).update(&PackageResource::new("wget", "latest")).unwrap();
        assert_eq!(runner.call_lines(), vec!["info wget", "install wget"]);
    }
}
