//! Test doubles shared by the unit tests.

use crate::process::CommandError;
use crate::traits::CommandRunner;
use std::cell::RefCell;

/// Canned result for one scripted command.
#[derive(Debug, Clone)]
pub enum Reply {
    Stdout(String),
    Exit { code: i32, stderr: String },
}

/// A [`CommandRunner`] that serves canned output and records every call.
///
/// A call matches a rule when the program is equal and the space-joined
/// arguments start with the rule's prefix.  Unmatched calls fail like a
/// command exiting with status 127.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, String, Reply)>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, program: &str, args_prefix: &str, out: &str) -> Self {
        self.rules.push((
            program.into(),
            args_prefix.into(),
            Reply::Stdout(out.into()),
        ));
        self
    }

    pub fn fail(mut self, program: &str, args_prefix: &str, code: i32, stderr: &str) -> Self {
        self.rules.push((
            program.into(),
            args_prefix.into(),
            Reply::Exit {
                code,
                stderr: stderr.into(),
            },
        ));
        self
    }

    /// Number of recorded calls to `program`.
    pub fn count(&self, program: &str) -> usize {
        let prefix = format!("{program} ");
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(&prefix) || c.as_str() == program)
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let joined = args.join(" ");
        self.calls.borrow_mut().push(format!("{program} {joined}"));

        let reply = self
            .rules
            .iter()
            .find(|(p, prefix, _)| p == program && joined.starts_with(prefix.as_str()))
            .map(|(_, _, reply)| reply.clone())
            .unwrap_or(Reply::Exit {
                code: 127,
                stderr: format!("unexpected call: {program} {joined}"),
            });

        match reply {
            Reply::Stdout(out) => Ok(out),
            Reply::Exit { code, stderr } => Err(CommandError::Failed {
                program: program.to_string(),
                status: format!("exit status {code}"),
                stderr,
            }),
        }
    }
}
