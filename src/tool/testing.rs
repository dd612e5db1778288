//! Scripted `ToolRunner` for unit tests.
use super::{InvokeOptions, ToolOutput, ToolRunner};
use crate::error::ProvisionResult;
use std::cell::RefCell;

type Script = Box<dyn Fn(&[String]) -> ProvisionResult<ToolOutput>>;

/// Records every call and answers from a script closure.
pub struct ScriptedRunner {
    calls: RefCell<Vec<(Vec<String>, InvokeOptions)>>,
    script: Script,
}

impl ScriptedRunner {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&[String]) -> ProvisionResult<ToolOutput> + 'static,
    {
        Self {
            calls: RefCell::new(Vec::new()),
            script: Box::new(script),
        }
    }

    /// A runner where every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ok_output("")))
    }

    pub fn spawn_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Subcommand names in call order.
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|(argv, _)| argv.first().cloned())
            .collect()
    }

    pub fn calls(&self) -> Vec<(Vec<String>, InvokeOptions)> {
        self.calls.borrow().clone()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, argv: &[String], options: InvokeOptions) -> ProvisionResult<ToolOutput> {
        self.calls.borrow_mut().push((argv.to_vec(), options));
        (self.script)(argv)
    }
}

pub fn ok_output(stdout: &str) -> ToolOutput {
    ToolOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

pub fn failed_output(code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(code),
    }
}
