// SPDX-License-Identifier: MIT

//! ID generation and newtype-ID plumbing.

use rand::rngs::OsRng;
use rand::{RngCore, TryRngCore};

/// Trait for truncating identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generates unique spool-id tokens.
pub trait IdGen: Send + Sync {
    /// Generate a fresh hex token of `len` characters (no harness prefix).
    fn next_hex(&self, len: usize) -> String;
}

/// Cryptographically random hex-token generator backed by the OS RNG.
///
/// Spool ids must be unpredictable enough to use as filenames and to avoid
/// collisions across concurrent admissions (spec: "≥ 8 hex chars from a
/// cryptographic RNG").
#[derive(Clone, Copy, Default)]
pub struct OsRngIdGen;

impl IdGen for OsRngIdGen {
    fn next_hex(&self, len: usize) -> String {
        let byte_len = len.div_ceil(2);
        let mut bytes = vec![0u8; byte_len];
        OsRng.unwrap_err().fill_bytes(&mut bytes);
        let mut hex = String::with_capacity(byte_len * 2);
        for b in bytes {
            hex.push_str(&format!("{:02x}", b));
        }
        hex.truncate(len);
        hex
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
