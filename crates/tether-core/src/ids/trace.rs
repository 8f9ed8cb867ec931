//!
//! Trace and span identifiers.
//!
//! Identifiers are drawn from OS entropy. A generator can be switched into
//! test mode for the lifetime of a [`TestModeGuard`]; while the guard lives,
//! every identifier is the constant `{0, .., 0, 1}` pattern.
//!

use base32::Alphabet;
use rand::{RngCore, rngs::OsRng};
use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use thiserror::Error as ThisError;

const ALPHABET: Alphabet = Alphabet::Rfc4648Hex { padding: false };

///
/// IdError
///

#[derive(Debug, ThisError)]
pub enum IdError {
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("invalid {kind} '{input}': {reason}")]
    Parse {
        kind: &'static str,
        input: String,
        reason: &'static str,
    },
}

///
/// TraceId
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TraceId(pub [u8; 16]);

///
/// SpanId
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SpanId(pub [u8; 8]);

macro_rules! impl_id {
    ($ty:ident, $len:literal, $kind:literal) => {
        impl $ty {
            pub const LEN: usize = $len;

            /// Constant value produced while test mode is enabled.
            pub const TEST_VALUE: Self = {
                let mut bytes = [0u8; $len];
                bytes[$len - 1] = 1;
                Self(bytes)
            };

            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&encode(&self.0))
            }
        }

        impl FromStr for $ty {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = decode(s, $kind)?;
                let bytes: [u8; $len] = bytes.try_into().map_err(|_| IdError::Parse {
                    kind: $kind,
                    input: s.to_string(),
                    reason: "wrong length",
                })?;

                Ok(Self(bytes))
            }
        }
    };
}

impl_id!(TraceId, 16, "trace id");
impl_id!(SpanId, 8, "span id");

fn encode(bytes: &[u8]) -> String {
    base32::encode(ALPHABET, bytes).to_ascii_lowercase()
}

fn decode(s: &str, kind: &'static str) -> Result<Vec<u8>, IdError> {
    let upper = s.to_ascii_uppercase();

    // reject padding and anything outside 0-9a-v up front; the decoder is lenient
    if !upper.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'V').contains(&b)) {
        return Err(IdError::Parse {
            kind,
            input: s.to_string(),
            reason: "invalid character",
        });
    }

    base32::decode(ALPHABET, &upper).ok_or_else(|| IdError::Parse {
        kind,
        input: s.to_string(),
        reason: "not base32",
    })
}

///
/// IdGenerator
///
/// Cloning shares the test-mode state, so a guard taken on one handle
/// governs every clone (e.g. the one held by the runtime).
///

#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    test_mode: Arc<AtomicBool>,
}

impl IdGenerator {
    /// Generator backed by OS entropy.
    #[must_use]
    pub fn random() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_test_mode(&self) -> bool {
        self.test_mode.load(Ordering::Acquire)
    }

    /// Switch to constant identifiers until the returned guard is dropped.
    #[must_use = "test mode ends as soon as the guard is dropped"]
    pub fn enable_test_mode(&self) -> TestModeGuard {
        let previous = self.test_mode.swap(true, Ordering::AcqRel);

        TestModeGuard {
            test_mode: Arc::clone(&self.test_mode),
            previous,
        }
    }

    pub fn trace_id(&self) -> Result<TraceId, IdError> {
        if self.is_test_mode() {
            return Ok(TraceId::TEST_VALUE);
        }

        let mut id = TraceId::default();
        fill(&mut id.0)?;

        Ok(id)
    }

    pub fn span_id(&self) -> Result<SpanId, IdError> {
        if self.is_test_mode() {
            return Ok(SpanId::TEST_VALUE);
        }

        let mut id = SpanId::default();
        fill(&mut id.0)?;

        Ok(id)
    }
}

fn fill(dest: &mut [u8]) -> Result<(), IdError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|err| IdError::Entropy(err.to_string()))
}

///
/// TestModeGuard
///
/// Restores the generator's previous mode on drop, including while
/// unwinding from a failed assertion.
///

#[derive(Debug)]
pub struct TestModeGuard {
    test_mode: Arc<AtomicBool>,
    previous: bool,
}

impl Drop for TestModeGuard {
    fn drop(&mut self) {
        self.test_mode.store(self.previous, Ordering::Release);
    }
}

///
/// TESTS
///
