//!
//! Runtime contract consumed by synthesized wrappers.
//!
//! A wrapper obtains a [`Call`] from [`begin_call`], then drives it through
//! `begin_req` → `finish_req` → `finish`. Which runtime answers is resolved
//! per call: a task-scoped override ([`scope`]) first, then the installed
//! process default ([`install`]), then a lazily created [`TraceRuntime`].
//!

mod trace;

pub use trace::*;

use crate::{Context, Error, ids::RequestKind, log, log::Topic};
use serde::{Deserialize, Serialize};
use std::{
    future::Future,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

///
/// RuntimeContract
///

pub trait RuntimeContract: Send + Sync {
    fn begin_call(&self, params: CallParams) -> Result<Call, Error>;
}

///
/// CallHandle
///
/// Correlation handle for one in-flight call. `finish_req` and `finish` are
/// each invoked exactly once per call by the wrapper.
///

pub trait CallHandle: Send + Sync {
    fn begin_req(&self, ctx: &Context, data: RequestData) -> Result<(), Error>;

    fn finish_req(&self, data: Option<&[u8]>, err: Option<&Error>);

    fn finish(&self, err: Option<&Error>);
}

pub type Call = Arc<dyn CallHandle>;

///
/// CallParams
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CallParams {
    pub service: &'static str,
    pub endpoint: &'static str,
    pub endpoint_expr_idx: u32,
}

///
/// PathParam
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PathParam {
    pub key: String,
    pub value: String,
}

impl PathParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

///
/// RequestData
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestData {
    pub kind: RequestKind,
    pub service: &'static str,
    pub endpoint: &'static str,
    pub endpoint_expr_idx: u32,
    pub inputs: Option<Vec<u8>>,
    pub path: String,
    pub path_segments: Option<Vec<PathParam>>,
    pub require_auth: bool,
}

// -----------------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------------

tokio::task_local! {
    static SCOPED: Arc<dyn RuntimeContract>;
}

static INSTALLED: RwLock<Option<Arc<dyn RuntimeContract>>> = RwLock::new(None);
static DEFAULT: OnceLock<Arc<dyn RuntimeContract>> = OnceLock::new();

/// Install the process-wide runtime, replacing any previous one.
pub fn install(runtime: Arc<dyn RuntimeContract>) {
    let mut slot = INSTALLED.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(runtime);
}

/// Run `fut` with `runtime` answering every `begin_call` made from this task.
pub async fn scope<F>(runtime: Arc<dyn RuntimeContract>, fut: F) -> F::Output
where
    F: Future,
{
    SCOPED.scope(runtime, fut).await
}

/// The runtime set by an enclosing [`scope`], if any.
pub(crate) fn scoped() -> Option<Arc<dyn RuntimeContract>> {
    SCOPED.try_with(Arc::clone).ok()
}

/// The runtime `begin_call` would use right now.
#[must_use]
pub fn current() -> Arc<dyn RuntimeContract> {
    if let Some(runtime) = scoped() {
        return runtime;
    }

    let installed = INSTALLED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    installed.unwrap_or_else(|| {
        Arc::clone(DEFAULT.get_or_init(|| Arc::new(TraceRuntime::default())))
    })
}

/// Start a call on the active runtime.
pub fn begin_call(params: CallParams) -> Result<Call, Error> {
    current().begin_call(params).inspect_err(|err| {
        log!(
            Topic::Call,
            Warn,
            "begin call {}.{} failed: {err}",
            params.service,
            params.endpoint
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Refusing(AtomicUsize);

    impl RuntimeContract for Refusing {
        fn begin_call(&self, _params: CallParams) -> Result<Call, Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(Error::internal("refused"))
        }
    }

    const PARAMS: CallParams = CallParams {
        service: "svc",
        endpoint: "ep",
        endpoint_expr_idx: 3,
    };

    #[tokio::test]
    async fn scoped_runtime_takes_precedence() {
        let refusing = Arc::new(Refusing(AtomicUsize::new(0)));

        let result = scope(refusing.clone(), async { begin_call(PARAMS) }).await;

        assert!(result.is_err());
        assert_eq!(refusing.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn default_runtime_starts_calls() {
        let call = begin_call(PARAMS).expect("default runtime");
        call.finish(None);
    }
}
