use std::fs;

use brewform::brew::PlatformProfile;
use brewform::brew::testing::ScriptedRunner;
use brewform::core::resource::{PackageResource, TapResource};
use brewform::{HomebrewProvider, Provider, ProviderError, TapProvider, Upgradeable};

fn intel(runner: &ScriptedRunner) -> HomebrewProvider<&ScriptedRunner> {
    HomebrewProvider::new(runner, PlatformProfile::homebrew_at("/usr/local/bin/brew"))
}

#[test]
fn installing_wget_latest_runs_info_then_install() {
    let runner = ScriptedRunner::new()
        .ok(&["info", "wget"], "wget: stable 1.21.4 (bottled)")
        .ok(&["install", "wget"], "==> Pouring wget--1.21.4.arm64_sonoma.bottle.tar.gz");

    intel(&runner).install(&PackageResource::new("wget", "latest")).unwrap();

    assert_eq!(runner.call_lines(), vec!["info wget", "install wget"]);
}

#[test]
fn unknown_formula_falls_back_to_cask() {
    let runner = ScriptedRunner::new()
        .version("4.1.20")
        .fail(&["info", "somecask"], "Error: No available formula with the name \"somecask\"")
        .ok(&["info", "--cask", "somecask"], "somecask: 1.0")
        .ok(&["install", "--cask", "somecask"], "somecask was successfully installed!");

    intel(&runner).install(&PackageResource::new("somecask", "present")).unwrap();

    assert_eq!(
        runner.action_lines(),
        vec!["info somecask", "info --cask somecask", "install --cask somecask"]
    );
}

#[test]
fn failed_cask_fallback_reports_the_detail() {
    let runner = ScriptedRunner::new()
        .version("4.1.20")
        .fail(&["info", "somecask"], "Error: No available formula")
        .ok(&["info", "--cask", "somecask"], "somecask: 1.0")
        .fail(&["install", "--cask", "somecask"], "Error: Download failed on Cask 'somecask'");

    let err = intel(&runner)
        .install(&PackageResource::new("somecask", "present"))
        .unwrap_err();

    assert!(matches!(err, ProviderError::Install(_)));
    let message = err.to_string();
    assert!(message.starts_with("Could not install package: "));
    assert!(message.contains("Download failed on Cask 'somecask'"));
}

#[test]
fn arm_provider_uses_the_cask_subcommand() {
    let runner = ScriptedRunner::new()
        .fail(&["info", "somecask"], "Error: No available formula")
        .ok(&["cask", "info", "somecask"], "somecask: 1.0")
        .ok(&["cask", "install", "somecask"], "installed");

    let provider = HomebrewProvider::new(&runner, PlatformProfile::homebrew_arm());
    provider.install(&PackageResource::new("somecask", "present")).unwrap();

    assert_eq!(
        runner.call_lines(),
        vec!["info somecask", "cask info somecask", "cask install somecask"]
    );
    assert!(runner.calls().iter().all(|call| {
        call.environment == vec![("HOMEBREW_CHANGE_ARCH_TO_ARM".to_string(), "1".to_string())]
    }));
}

#[test]
fn checksum_failure_removes_downloads_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("wget--1.21.4.tar.gz");
    let second = dir.path().join("wget--1.21.4.patch");
    fs::write(&first, b"corrupt").unwrap();
    fs::write(&second, b"corrupt").unwrap();

    let output = format!(
        "==> Downloading wget\nAlready downloaded: {} {}\nError: SHA256 mismatch\nsha256 checksum mismatch",
        first.display(),
        second.display()
    );
    let runner = ScriptedRunner::new()
        .ok(&["info", "wget"], "wget: stable 1.21.4")
        .fail(&["install", "wget"], &output);

    let err = intel(&runner).install(&PackageResource::new("wget", "present")).unwrap_err();

    match err {
        ProviderError::ChecksumMismatch { package, files } => {
            assert_eq!(package, "wget");
            assert_eq!(files, vec![first.clone(), second.clone()]);
        }
        other => panic!("expected a checksum error, got {:?}", other),
    }
    assert!(!first.exists());
    assert!(!second.exists());
    // No cask attempt after a checksum failure
    assert_eq!(runner.call_lines(), vec!["info wget", "install wget"]);
}

#[test]
fn checksum_cleanup_tolerates_missing_files() {
    let runner = ScriptedRunner::new()
        .ok(&["info", "wget"], "")
        .fail(
            &["install", "wget"],
            "Already downloaded: /nonexistent/brewform/a /nonexistent/brewform/b\nsha256 checksum",
        );

    let err = intel(&runner).install(&PackageResource::new("wget", "present")).unwrap_err();
    assert!(err.to_string().contains("Checksum error for package wget"));
}

#[test]
fn versioned_install_targets_name_at_version() {
    let runner = ScriptedRunner::new()
        .ok(&["info", "python@3.11"], "")
        .ok(&["install", "python@3.11", "--build-from-source"], "");

    let resource = PackageResource::new("Python", "3.11").with_install_options(vec!["--build-from-source".to_string()]);
    intel(&runner).install(&resource).unwrap();

    assert_eq!(runner.call_lines(), vec!["info python@3.11", "install python@3.11 --build-from-source"]);
}

#[test]
fn latest_reports_installed_versions() {
    let runner = ScriptedRunner::new().ok(&["list", "--versions", "python"], "python 3.10.2 3.11.5\n");

    let latest = intel(&runner).latest(&PackageResource::new("python", "latest")).unwrap();
    assert_eq!(latest.as_deref(), Some("3.10.2 3.11.5"));
}

#[test]
fn tap_matches_prefixed_and_literal_names() {
    let runner = ScriptedRunner::new().ok(&["tap"], "homebrew/core\nfoo\n");
    let taps = TapProvider::new(&runner, PlatformProfile::tap_arm());
    assert!(taps.query(&TapResource::new("homebrew-foo", "present")).unwrap().is_some());

    let runner = ScriptedRunner::new().ok(&["tap"], "homebrew-foo\n");
    let taps = TapProvider::new(&runner, PlatformProfile::tap_arm());
    assert!(taps.query(&TapResource::new("homebrew-foo", "present")).unwrap().is_some());
}
