// SPDX-License-Identifier: MIT

//! Command-line shape returned by a harness adapter, before it is handed to
//! the process launcher.

/// A fully-built invocation: binary plus positional/flag arguments, ready to
/// be handed to `tokio::process::Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argv {
    pub program: String,
    pub args: Vec<String>,
}

impl Argv {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// What a harness adapter extracted from a finished child's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOutcome {
    pub result: String,
    pub session_id: Option<String>,
}
