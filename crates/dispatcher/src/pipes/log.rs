//! LogSink - logs payload summaries via tracing

use contracts::{Payload, Sink, RESERVED_PREFIX};
use tracing::info;

/// Sink that logs payload summaries for debugging
#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter keys, discriminators excluded
    fn param_keys(payload: &Payload) -> Vec<&str> {
        payload
            .iter()
            .map(|(k, _)| k)
            .filter(|k| !k.starts_with(RESERVED_PREFIX))
            .collect()
    }
}

impl Sink for LogSink {
    fn send(&self, payload: Payload) {
        let method_id = payload.method_id().ok().flatten();
        info!(
            sink = %self.name,
            class_name = ?payload.class_name(),
            method_id = ?method_id,
            params = ?Self::param_keys(&payload),
            "Payload emitted"
        );
    }
}
