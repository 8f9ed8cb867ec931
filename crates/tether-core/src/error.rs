use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Error
///
/// Framework error carried across the call boundary.
///
/// Handler errors are converted into this type (`From`) and normalized with
/// [`round_trip`] before being handed back to the caller.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    #[must_use]
    pub const fn new(code: ErrorCode, message: String) -> Self {
        Self { code, message }
    }

    /// 500-class failures
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message.into())
    }

    /// 400 class failures
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message.into())
    }

    /// 404
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message.into())
    }

    /// 401
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message.into())
    }

    /// Errors without a known kind.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unknown, message.into())
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::unknown(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::unknown(message)
    }
}

///
/// ErrorCode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
#[remain::sorted]
pub enum ErrorCode {
    Aborted,
    AlreadyExists,
    Canceled,
    DataLoss,
    DeadlineExceeded,
    FailedPrecondition,
    Internal,
    InvalidArgument,
    NotFound,
    OutOfRange,
    PermissionDenied,
    ResourceExhausted,
    Unauthenticated,
    Unavailable,
    Unimplemented,
    Unknown,
}

/// Normalize a handler-raised error into the framework representation.
///
/// The error goes through its wire form and back, so the caller observes
/// exactly what a remote caller would. Kind is preserved; anything that
/// does not survive the trip degrades to `Unknown` with the original message.
pub fn round_trip(err: impl Into<Error>) -> Error {
    let err = err.into();

    let decoded = serde_json::to_vec(&err).and_then(|bytes| serde_json::from_slice::<Error>(&bytes));
    match decoded {
        Ok(decoded) => decoded,
        Err(_) => Error::unknown(err.message),
    }
}

///
/// TESTS
///
