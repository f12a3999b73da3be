//! Scripted stand-in for [`CommandRunner`] used by tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::brew::exec::{BrewCommand, CommandOutput, CommandRunner};
use crate::utils::ProviderResult;

/// Answers commands from a table keyed by the argument list
///
/// Unscripted commands exit with status 1 and print nothing on stdout, the
/// way brew answers unknown formulae. Every command is recorded.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: HashMap<Vec<String>, CommandOutput>,
    calls: RefCell<Vec<BrewCommand>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response
    pub fn ok(mut self, args: &[&str], output: &str) -> Self {
        self.responses.insert(key(args), CommandOutput::success(output));
        self
    }

    /// Script a failing response
    pub fn fail(mut self, args: &[&str], output: &str) -> Self {
        self.responses.insert(key(args), CommandOutput::failure(1, output));
        self
    }

    /// Script `brew --version`
    pub fn version(self, version: &str) -> Self {
        let output = format!("Homebrew {}\n", version);
        self.ok(&["--version"], &output)
    }

    /// Every command run so far
    pub fn calls(&self) -> Vec<BrewCommand> {
        self.calls.borrow().clone()
    }

    /// Argument lists of every command run so far, joined by spaces
    pub fn call_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| call.args.join(" "))
            .collect()
    }

    /// Command lines excluding `brew --version` probes
    pub fn action_lines(&self) -> Vec<String> {
        self.call_lines()
            .into_iter()
            .filter(|line| line != "--version")
            .collect()
    }
}

fn key(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &BrewCommand) -> ProviderResult<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());
        Ok(self
            .responses
            .get(&command.args)
            .cloned()
            .unwrap_or_else(|| CommandOutput::failure(1, "")))
    }
}
