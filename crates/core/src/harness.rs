// SPDX-License-Identifier: MIT

//! The closed set of harness CLIs Spindle knows how to drive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates which harness adapter owns a spool.
///
/// Adding a harness is a planned code change (a new adapter implementation),
/// not a runtime-configurable plugin — dispatch is by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessKind {
    Claude,
    Codex,
}

impl HarnessKind {
    /// The id prefix this harness's adapter applies to spool ids it mints,
    /// if any. Claude ids carry no discriminator; Codex ids are prefixed
    /// `codex-<hex>` per spec.
    pub fn id_prefix(&self) -> Option<&'static str> {
        match self {
            HarnessKind::Claude => None,
            HarnessKind::Codex => Some("codex"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HarnessKind::Claude => "claude",
            HarnessKind::Codex => "codex",
        }
    }
}

impl fmt::Display for HarnessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HarnessKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(HarnessKind::Claude),
            "codex" => Ok(HarnessKind::Codex),
            other => Err(format!("unknown harness: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_harnesses() {
        assert_eq!("claude".parse::<HarnessKind>().unwrap(), HarnessKind::Claude);
        assert_eq!("codex".parse::<HarnessKind>().unwrap(), HarnessKind::Codex);
    }

    #[test]
    fn rejects_unknown_harness() {
        assert!("gpt".parse::<HarnessKind>().is_err());
    }

    #[test]
    fn only_codex_ids_get_a_prefix() {
        assert_eq!(HarnessKind::Claude.id_prefix(), None);
        assert_eq!(HarnessKind::Codex.id_prefix(), Some("codex"));
    }
}
