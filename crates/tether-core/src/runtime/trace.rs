use crate::{
    Context, Error,
    ids::{EndpointId, IdGenerator, SpanId, TraceId},
    log,
    log::Topic,
    metrics::EndpointMetrics,
    path::path_unescape,
    runtime::{Call, CallHandle, CallParams, RequestData, RuntimeContract},
};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

///
/// TraceRuntime
///
/// Default runtime: allocates trace/span identifiers per call, enforces
/// `require_auth`, and emits lifecycle events through `log!`. Finished
/// traces are not persisted; transport is someone else's job.
///

#[derive(Clone, Debug, Default)]
pub struct TraceRuntime {
    ids: IdGenerator,
    metrics: Arc<EndpointMetrics>,
}

impl TraceRuntime {
    #[must_use]
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            ids,
            metrics: Arc::new(EndpointMetrics::default()),
        }
    }

    #[must_use]
    pub const fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    #[must_use]
    pub fn metrics(&self) -> &EndpointMetrics {
        &self.metrics
    }

    /// Start a call, keeping the concrete handle.
    pub fn start(&self, params: CallParams) -> Result<Arc<TracedCall>, Error> {
        let endpoint = EndpointId::new(params.service, params.endpoint);

        let trace_id = self.ids.trace_id().map_err(|err| Error::internal(err.to_string()))?;
        let span_id = self.ids.span_id().map_err(|err| Error::internal(err.to_string()))?;

        log!(
            Topic::Call,
            Debug,
            "begin call {endpoint} (expr {}) trace={trace_id} span={span_id}",
            params.endpoint_expr_idx
        );

        Ok(Arc::new(TracedCall {
            endpoint,
            trace_id,
            span_id,
            started: Instant::now(),
            request_started: Mutex::new(None),
            metrics: Arc::clone(&self.metrics),
        }))
    }
}

impl RuntimeContract for TraceRuntime {
    fn begin_call(&self, params: CallParams) -> Result<Call, Error> {
        let call: Call = self.start(params)?;
        Ok(call)
    }
}

///
/// TracedCall
///

#[derive(Debug)]
pub struct TracedCall {
    endpoint: EndpointId,
    trace_id: TraceId,
    span_id: SpanId,
    started: Instant,
    request_started: Mutex<Option<Instant>>,
    metrics: Arc<EndpointMetrics>,
}

impl TracedCall {
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    #[must_use]
    pub const fn span_id(&self) -> SpanId {
        self.span_id
    }
}

impl CallHandle for TracedCall {
    fn begin_req(&self, ctx: &Context, data: RequestData) -> Result<(), Error> {
        if data.require_auth && ctx.auth().is_none() {
            log!(
                Topic::Auth,
                Info,
                "{} rejected: endpoint requires auth but none provided",
                self.endpoint
            );
            return Err(Error::unauthenticated(
                "endpoint requires auth but none provided",
            ));
        }

        let params = decoded_params(&data)?;

        *self
            .request_started
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());

        log!(
            Topic::Request,
            Debug,
            "{} {} path={} params=[{params}] inputs={}B uid={} span={}",
            data.kind,
            self.endpoint,
            data.path,
            data.inputs.as_ref().map_or(0, Vec::len),
            ctx.uid().unwrap_or("-"),
            self.span_id
        );

        Ok(())
    }

    fn finish_req(&self, data: Option<&[u8]>, err: Option<&Error>) {
        let started = *self
            .request_started
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let elapsed = started.map(|started| started.elapsed());

        match err {
            Some(err) => log!(
                Topic::Request,
                Info,
                "{} failed after {elapsed:?}: {err} span={}",
                self.endpoint,
                self.span_id
            ),
            None => log!(
                Topic::Request,
                Debug,
                "{} ok after {elapsed:?} response={}B span={}",
                self.endpoint,
                data.map_or(0, <[u8]>::len),
                self.span_id
            ),
        }
    }

    fn finish(&self, err: Option<&Error>) {
        self.metrics.record(self.endpoint, err.is_none());

        log!(
            Topic::Call,
            Debug,
            "finish call {} in {:?} ok={} trace={}",
            self.endpoint,
            self.started.elapsed(),
            err.is_none(),
            self.trace_id
        );
    }
}

// Path parameter values arrive escaped; the trace shows them decoded.
fn decoded_params(data: &RequestData) -> Result<String, Error> {
    let Some(segments) = &data.path_segments else {
        return Ok(String::new());
    };

    let mut out = Vec::with_capacity(segments.len());
    for param in segments {
        let value = path_unescape(&param.value).ok_or_else(|| {
            Error::invalid_argument(format!(
                "malformed path parameter {}: {}",
                param.key, param.value
            ))
        })?;
        out.push(format!("{}={value}", param.key));
    }

    Ok(out.join(","))
}
