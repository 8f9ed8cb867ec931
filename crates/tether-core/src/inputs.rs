//!
//! Inputs snapshot codec.
//!
//! Wrappers snapshot every endpoint input (path parameters in path order,
//! then the request body) as one JSON array. The snapshot is attached to the
//! trace and decoded back into owned locals before the handler runs, so the
//! handler never observes caller-side mutation.
//!
//! Callers pass tuples: `serialize_inputs(&(&p0, &p1))` and
//! `copy_inputs::<(i64, Body)>(&bytes)`.
//!

use crate::{Error, log, log::Topic};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// InputsError
///

#[derive(Debug, ThisError)]
pub enum InputsError {
    #[error("could not serialize inputs: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("could not decode inputs: {0}")]
    Decode(#[source] serde_json::Error),
}

impl From<InputsError> for Error {
    fn from(err: InputsError) -> Self {
        match err {
            InputsError::Serialize(_) => Self::invalid_argument(err.to_string()),
            InputsError::Decode(_) => Self::internal(err.to_string()),
        }
    }
}

/// Serialize a tuple of inputs into an opaque snapshot.
pub fn serialize_inputs<T>(values: &T) -> Result<Vec<u8>, Error>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(values).map_err(|err| {
        log!(Topic::Inputs, Warn, "serialize inputs failed: {err}");
        InputsError::Serialize(err).into()
    })
}

/// Decode a snapshot back into owned values.
pub fn copy_inputs<T>(data: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(data).map_err(|err| {
        log!(Topic::Inputs, Warn, "copy inputs failed: {err}");
        InputsError::Decode(err).into()
    })
}
