//! Running brew as the owner of the installation.
//!
//! Providers never spawn processes themselves; they hand a [`BrewCommand`]
//! to a [`CommandRunner`]. [`SystemRunner`] is the real implementation,
//! tests substitute a scripted fake.

use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, trace};

use crate::brew::identity::ExecutionIdentity;
use crate::utils::{ProviderError, ProviderResult};

/// A fully described brew invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrewCommand {
    pub program: PathBuf,
    /// Arguments after the program, subcommand first
    pub args: Vec<String>,
    /// Variables added on top of HOME
    pub environment: Vec<(String, String)>,
    /// Append stderr to the captured output
    pub combine_output: bool,
}

impl BrewCommand {
    /// Human readable command line for logs and error messages
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// What a finished command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            output: output.into(),
        }
    }

    pub fn failure(status: i32, output: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            output: output.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into an execution failure
    pub fn into_result(self, command: &BrewCommand) -> ProviderResult<String> {
        if self.is_success() {
            Ok(self.output)
        } else {
            Err(ProviderError::ExecutionFailure {
                command: command.display(),
                output: self.output.trim().to_string(),
            })
        }
    }
}

/// Runs a command to completion and reports exit status and output
///
/// Only a failure to start the process is an error here; non-zero exits
/// are reported through [`CommandOutput::status`].
pub trait CommandRunner {
    fn run(&self, command: &BrewCommand) -> ProviderResult<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &BrewCommand) -> ProviderResult<CommandOutput> {
        (**self).run(command)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, command: &BrewCommand) -> ProviderResult<CommandOutput> {
        (**self).run(command)
    }
}

/// Spawns real processes as the owner of the brew binary
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    /// Build the process for `command` under `identity`
    fn prepare(command: &BrewCommand, identity: &ExecutionIdentity) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd.env("HOME", &identity.home);
        for (key, value) in &command.environment {
            cmd.env(key, value);
        }

        // The uid and gid can only be set when running as root
        if identity.switch_user {
            cmd.uid(identity.uid);
            cmd.gid(identity.gid);
        }

        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &BrewCommand) -> ProviderResult<CommandOutput> {
        let identity = ExecutionIdentity::resolve(&command.program)?;
        let line = command.display();

        debug!(
            "Executing '{}' as uid {}{}",
            line,
            identity.uid,
            if identity.switch_user { " (switched)" } else { "" }
        );

        let output = Self::prepare(command, &identity)
            .output()
            .map_err(|source| ProviderError::Spawn {
                command: line.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if command.combine_output {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        } else if !output.stderr.is_empty() {
            trace!("STDERR:\n{}", String::from_utf8_lossy(&output.stderr));
        }

        trace!("Command output:\n{}", text);

        Ok(CommandOutput {
            status: output.status.code(),
            output: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> BrewCommand {
        BrewCommand {
            program: PathBuf::from("/opt/homebrew/bin/brew"),
            args: args.iter().map(|s| s.to_string()).collect(),
            environment: vec![("HOMEBREW_CHANGE_ARCH_TO_ARM".to_string(), "1".to_string())],
            combine_output: true,
        }
    }

    #[test]
    fn displays_full_command_line() {
        assert_eq!(command(&["install", "wget"]).display(), "/opt/homebrew/bin/brew install wget");
    }

    #[test]
    fn non_zero_exit_becomes_execution_failure() {
        let cmd = command(&["info", "nope"]);
        let err = CommandOutput::failure(1, "Error: No available formula\n")
            .into_result(&cmd)
            .unwrap_err();
        match err {
            ProviderError::ExecutionFailure { command, output } => {
                assert_eq!(command, "/opt/homebrew/bin/brew info nope");
                assert_eq!(output, "Error: No available formula");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let signalled = CommandOutput { status: None, output: String::new() };
        assert!(signalled.into_result(&cmd).is_err());
        assert_eq!(CommandOutput::success("ok").into_result(&cmd).unwrap(), "ok");
    }

    #[test]
    fn prepared_process_carries_home_and_overrides() {
        let identity = ExecutionIdentity {
            uid: 501,
            gid: 20,
            home: PathBuf::from("/Users/dev"),
            switch_user: false,
        };
        let cmd = SystemRunner::prepare(&command(&["tap"]), &identity);

        let envs: Vec<(String, String)> = cmd
            .get_envs()
            .filter_map(|(k, v)| Some((k.to_str()?.to_string(), v?.to_str()?.to_string())))
            .collect();
        assert!(envs.contains(&("HOME".to_string(), "/Users/dev".to_string())));
        assert!(envs.contains(&("HOMEBREW_CHANGE_ARCH_TO_ARM".to_string(), "1".to_string())));

        let args: Vec<&str> = cmd.get_args().filter_map(|a| a.to_str()).collect();
        assert_eq!(args, vec!["tap"]);
    }

    #[test]
    fn missing_binary_fails_before_spawning() {
        let mut cmd = command(&["--version"]);
        cmd.program = PathBuf::from("/nonexistent/brew");
        assert!(matches!(
            SystemRunner::new().run(&cmd),
            Err(ProviderError::OwnerLookup { .. })
        ));
    }

    fn stream_script(dir: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("brew");
        std::fs::write(&script, "#!/bin/sh\necho \"out $1\"\necho \"err $1\" 1>&2\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    fn system_runner_merges_stderr_only_when_asked() {
        use crate::brew::identity::{current_uid, home_dir_for};

        // Root-owned scripts are refused, and the owner needs a passwd entry
        if current_uid() == 0 || home_dir_for(current_uid()).is_none() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let script = stream_script(dir.path());
        let mut cmd = BrewCommand {
            program: script,
            args: vec!["list".to_string()],
            environment: Vec::new(),
            combine_output: true,
        };

        let merged = SystemRunner::new().run(&cmd).unwrap();
        assert!(merged.is_success());
        assert_eq!(merged.output, "out list\nerr list\n");

        cmd.combine_output = false;
        let stdout_only = SystemRunner::new().run(&cmd).unwrap();
        assert_eq!(stdout_only.output, "out list\n");
    }
}
