//!
//! Isolation boundary for endpoint execution.
//!
//! A wrapper runs begin-request, input decoding and the handler inside one
//! spawned task ([`isolate`]) and waits on a one-shot rendezvous. Handler
//! panics are caught with [`recover`] and turned into `Internal` errors by
//! [`panic_error`]. The task owns a [`DoneSignal`] that always fires, so the
//! caller can never block forever. The caller side owns a [`PendingCall`],
//! which finishes the call even when the wrapper future is dropped early.
//!

use crate::{
    Error, ErrorCode,
    inputs::{copy_inputs, serialize_inputs},
    log,
    log::Topic,
    runtime::{self, Call},
};
use futures::FutureExt;
use serde::{Serialize, de::DeserializeOwned};
use std::{any::Any, fmt, future::Future, panic::AssertUnwindSafe, sync::Arc};
use tokio::sync::oneshot;

///
/// CallResponse
///
/// Response buffer of one invocation. Written by the isolated task, read
/// once by the caller after the rendezvous.
///

#[derive(Debug, Default)]
pub struct CallResponse {
    pub data: Option<Vec<u8>>,
    pub err: Option<Error>,
}

impl CallResponse {
    #[must_use]
    pub const fn failed(err: Error) -> Self {
        Self {
            data: None,
            err: Some(err),
        }
    }
}

///
/// DoneSignal
///
/// Raises the rendezvous exactly once. If dropped without completing
/// (unwinding, task cancellation) it delivers an `Internal` failure.
///

pub struct DoneSignal {
    tx: Option<oneshot::Sender<CallResponse>>,
}

impl DoneSignal {
    #[must_use]
    pub const fn new(tx: oneshot::Sender<CallResponse>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn complete(mut self, response: CallResponse) {
        if let Some(tx) = self.tx.take() {
            // receiver gone means the caller was dropped; nothing to deliver
            let _ = tx.send(response);
        }
    }
}

impl Drop for DoneSignal {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let err = Error::internal("request task terminated without a response");
            let _ = tx.send(CallResponse::failed(err));
        }
    }
}

///
/// PendingCall
///
/// Caller half of the rendezvous. Finishes its call exactly once: with the
/// task's error once the response arrives, or with `Canceled` when dropped
/// before that. A canceled call is still finished after the task signals,
/// so `finish` never overtakes `finish_req`.
///

pub struct PendingCall {
    call: Call,
    rx: Option<oneshot::Receiver<CallResponse>>,
}

impl PendingCall {
    #[must_use]
    pub const fn new(call: Call, rx: oneshot::Receiver<CallResponse>) -> Self {
        Self { call, rx: Some(rx) }
    }

    /// Wait for the task's response, then finish the call with its error.
    pub async fn wait(mut self) -> CallResponse {
        let response = match self.rx.as_mut() {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                CallResponse::failed(Error::internal("request task dropped the rendezvous"))
            }),
            None => CallResponse::failed(Error::internal("rendezvous already consumed")),
        };

        self.rx = None;
        self.call.finish(response.err.as_ref());

        response
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        let Some(rx) = self.rx.take() else {
            return;
        };

        let err = Error::new(ErrorCode::Canceled, "call canceled before completion".to_string());
        log!(Topic::Call, Warn, "{err}");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let call = Arc::clone(&self.call);
                handle.spawn(async move {
                    let _ = rx.await;
                    call.finish(Some(&err));
                });
            }
            Err(_) => self.call.finish(Some(&err)),
        }
    }
}

/// Run `fut` on its own task, wait for its response and finish `call`.
///
/// The spawned task inherits the runtime set by [`runtime::scope`], so
/// wrappers called from a handler report to the same runtime.
/// Must be called from within a tokio runtime.
pub async fn isolate<F>(call: &Call, fut: F) -> CallResponse
where
    F: Future<Output = CallResponse> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let pending = PendingCall::new(Arc::clone(call), rx);
    let scoped = runtime::scoped();

    tokio::spawn(async move {
        let signal = DoneSignal::new(tx);
        let response = match scoped {
            Some(rt) => runtime::scope(rt, fut).await,
            None => fut.await,
        };
        signal.complete(response);
    });

    pending.wait().await
}

///
/// Panic
///

pub struct Panic(Box<dyn Any + Send>);

impl Panic {
    /// Render the payload the way `panic!` formatted it, when possible.
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(s) = self.0.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = self.0.downcast_ref::<String>() {
            s.clone()
        } else if let Some(err) = self.0.downcast_ref::<Error>() {
            err.to_string()
        } else {
            "Box<dyn Any>".to_string()
        }
    }
}

impl fmt::Debug for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Panic").field(&self.message()).finish()
    }
}

/// Poll `fut`, catching any panic it raises.
pub async fn recover<F>(fut: F) -> Result<F::Output, Panic>
where
    F: Future,
{
    AssertUnwindSafe(fut).catch_unwind().await.map_err(Panic)
}

/// `Internal` error for a recovered handler panic.
#[must_use]
pub fn panic_error(panic: &Panic) -> Error {
    let message = panic.message();
    log!(Topic::Request, Error, "panic handling request: {message}");

    Error::internal(format!("panic handling request: {message}"))
}

/// Serialize a handler response.
///
/// A failure is an `Internal` error; the wrapper records it with
/// `finish_req` and hands the same error to its caller.
pub fn serialize_response<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: Serialize,
{
    serialize_inputs(&(value,)).map_err(|err| {
        log!(Topic::Request, Warn, "response payload dropped: {err}");
        Error::internal(format!("could not serialize response: {}", err.message))
    })
}

/// Hand the call outcome to the caller of a wrapper with a response type.
pub fn deliver<R>(response: CallResponse) -> Result<R, Error>
where
    R: DeserializeOwned,
{
    if let Some(err) = response.err {
        return Err(err);
    }

    match response.data.as_deref().filter(|data| !data.is_empty()) {
        Some(data) => copy_inputs::<(R,)>(data).map(|(resp,)| resp),
        None => Err(Error::internal("endpoint produced no response payload")),
    }
}

/// Hand the call outcome to the caller of a wrapper without a response type.
pub fn deliver_empty(response: CallResponse) -> Result<(), Error> {
    response.err.map_or(Ok(()), Err)
}
