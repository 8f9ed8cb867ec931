//!
//! HTTP passthrough types for raw endpoints.
//!
//! Raw handlers receive the response writer and the incoming request
//! directly. Wrappers interpose a [`MetricsWriter`] to observe the status
//! code and body the handler produced.
//!

use crate::Context;
use std::io;

pub const DEFAULT_STATUS: u16 = 200;

///
/// ResponseWriter
///

pub trait ResponseWriter: Send {
    fn headers_mut(&mut self) -> &mut Vec<(String, String)>;

    /// Send the status line; only the first call takes effect.
    fn write_header(&mut self, status: u16);

    /// Write body bytes, implicitly sending a 200 status if none was set.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

///
/// Request
///

#[derive(Clone, Debug, Default)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    ctx: Context,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

///
/// BufferedResponse
/// In-memory response writer.
///

#[derive(Clone, Debug, Default)]
pub struct BufferedResponse {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(DEFAULT_STATUS)
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.headers
    }

    fn write_header(&mut self, status: u16) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_header(DEFAULT_STATUS);
        self.body.extend_from_slice(buf);

        Ok(buf.len())
    }
}

///
/// Metrics
/// What the handler did to the response.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metrics {
    pub code: u16,
    pub written: u64,
    pub body: Vec<u8>,
}

impl Metrics {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code >= 400
    }
}

///
/// MetricsWriter
/// Forwards to the inner writer while recording status and body.
///

pub struct MetricsWriter {
    inner: Box<dyn ResponseWriter>,
    code: Option<u16>,
    written: u64,
    body: Vec<u8>,
}

impl MetricsWriter {
    #[must_use]
    pub fn new(inner: Box<dyn ResponseWriter>) -> Self {
        Self {
            inner,
            code: None,
            written: 0,
            body: Vec::new(),
        }
    }

    /// Status defaults to 200 when the handler never set one.
    #[must_use]
    pub fn into_metrics(self) -> Metrics {
        Metrics {
            code: self.code.unwrap_or(DEFAULT_STATUS),
            written: self.written,
            body: self.body,
        }
    }
}

impl ResponseWriter for MetricsWriter {
    fn headers_mut(&mut self) -> &mut Vec<(String, String)> {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: u16) {
        if self.code.is_none() {
            self.code = Some(status);
        }
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.code.is_none() {
            self.code = Some(DEFAULT_STATUS);
        }

        let n = self.inner.write(buf)?;
        self.written += n as u64;
        self.body.extend_from_slice(&buf[..n]);

        Ok(n)
    }
}
