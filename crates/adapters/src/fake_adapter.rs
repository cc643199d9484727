// SPDX-License-Identifier: MIT

//! A scriptable [`HarnessAdapter`] double for tests in dependent crates,
//! gated behind the `test-support` feature so it never ships in a release
//! build.

use crate::argv::{Argv, ParsedOutcome};
use crate::error::AdapterError;
use crate::harness_adapter::HarnessAdapter;
use parking_lot::Mutex;
use spindle_core::Spool;

/// Always succeeds, echoing the prompt back as the result, unless
/// configured otherwise via the `fail_parse`/`expired_fingerprint` knobs.
pub struct FakeAdapter {
    pub program: String,
    pub fail_parse: bool,
    pub expired_fingerprint: &'static str,
    pub fallback_available: bool,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self {
            program: "true".to_string(),
            fail_parse: false,
            expired_fingerprint: "session expired",
            fallback_available: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeAdapter {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl HarnessAdapter for FakeAdapter {
    fn build_command(&self, spool: &Spool) -> Result<Argv, AdapterError> {
        self.calls.lock().push("build_command".to_string());
        Ok(Argv::new(&self.program).arg(&spool.prompt))
    }

    fn parse_output(&self, stdout: &[u8]) -> Result<ParsedOutcome, AdapterError> {
        self.calls.lock().push("parse_output".to_string());
        if self.fail_parse {
            return Err(AdapterError::UnparseableOutput);
        }
        Ok(ParsedOutcome {
            result: String::from_utf8_lossy(stdout).trim().to_string(),
            session_id: Some("fake-session".to_string()),
        })
    }

    fn resume_command(&self, session_id: &str, prompt: &str) -> Result<Argv, AdapterError> {
        self.calls.lock().push("resume_command".to_string());
        Ok(Argv::new(&self.program)
            .arg("--resume")
            .arg(session_id)
            .arg(prompt))
    }

    fn fallback_resume(&self, previous: &Spool, prompt: &str) -> Option<Argv> {
        self.calls.lock().push("fallback_resume".to_string());
        if !self.fallback_available {
            return None;
        }
        Some(
            Argv::new(&self.program).arg(format!(
                "transcript: {}\n{}\n---\n{}",
                previous.prompt,
                previous.result.clone().unwrap_or_default(),
                prompt
            )),
        )
    }

    fn is_expired_session_error(&self, stderr: &[u8]) -> bool {
        String::from_utf8_lossy(stderr).contains(self.expired_fingerprint)
    }
}
