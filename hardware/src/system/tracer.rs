//! Protocol Tracer.

use serde::Serialize;

/// Target used for protocol trace events.
pub const TRACE_TARGET: &str = "ruby::trace";

/// Recorder handle for protocol transitions.
///
/// Holds no event state: records go straight to the `tracing` subscriber
/// at TRACE level under [`TRACE_TARGET`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tracer {
    enabled: bool,
}

impl Tracer {
    /// Creates a tracer. With the `always-trace` feature the tracer is
    /// enabled regardless of `protocol_trace`.
    pub fn new(protocol_trace: bool) -> Self {
        Self {
            enabled: protocol_trace || cfg!(feature = "always-trace"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records one protocol transition of `controller` on `addr`.
    pub fn record(&self, controller: &str, addr: u64, event: &str, next_state: &str) {
        if self.enabled {
            tracing::trace!(
                target: TRACE_TARGET,
                controller,
                addr = %format!("{:#x}", addr),
                event,
                next_state,
                "protocol transition"
            );
        }
    }
}
