use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use otk_config::{CloseError, Closeable};

use crate::exporter::ExportError;

/// One encoded export call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub content_type: &'static str,
    /// `None` when the body is not compressed.
    pub content_encoding: Option<String>,
    pub timeout: Duration,
    pub body: Bytes,
}

/// Delivers encoded requests to a collector.
pub trait Transport: Any + Send + Sync + fmt::Debug {
    fn send(&self, request: ExportRequest) -> Result<(), ExportError>;
}

/// Keeps the last request instead of sending it.
#[derive(Debug, Default)]
pub struct NoopTransport {
    last: Mutex<Option<ExportRequest>>,
}

impl NoopTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_request(&self) -> Option<ExportRequest> {
        self.last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Transport for NoopTransport {
    fn send(&self, request: ExportRequest) -> Result<(), ExportError> {
        tracing::trace!(
            endpoint = %request.endpoint,
            bytes = request.body.len(),
            "dropping export request"
        );
        *self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request);
        Ok(())
    }
}

/// Client connection owned by an OTLP exporter. Registered as a closeable
/// resource when the exporter is built from configuration.
#[derive(Debug)]
pub struct HttpChannel {
    transport: Arc<dyn Transport>,
    closed: AtomicBool,
}

impl HttpChannel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            closed: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn send(&self, request: ExportRequest) -> Result<(), ExportError> {
        if self.is_closed() {
            return Err(ExportError::Shutdown);
        }
        self.transport.send(request)
    }
}

impl Default for HttpChannel {
    fn default() -> Self {
        Self::new(Arc::new(NoopTransport::new()))
    }
}

impl Closeable for HttpChannel {
    fn close(&self) -> Result<(), CloseError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("http channel closed");
        }
        Ok(())
    }
}
