//! Error taxonomy for the cluster core.
//!
//! One enum carries every failure mode described in the error-handling design:
//! bootstrap/parse/revision failures, terminal-state violations, transport
//! failures, dispatch failures, timeouts, per-service reconfiguration
//! failures, missing collections support, and TLS/security setup failures.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for the cluster core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bootstrap exhausted every seed node, or the raw config failed to parse,
    /// or an incoming config's revision was old/same (non-fatal, normally
    /// surfaced as a `ConfigIgnored` event rather than this error).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A terminal operation (`closeBucket`, `shutdown`) was invoked twice.
    #[error("already shut down")]
    AlreadyShutdown,

    /// The transport layer failed to connect or was severed mid-flight.
    #[error("connection error to {host}:{port}: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    /// No eligible node/endpoint exists right now for this request; handed to
    /// the retry orchestrator rather than returned to the caller.
    #[error("no eligible endpoint for dispatch: {0}")]
    Dispatch(String),

    /// The request exceeded its per-operation timeout.
    #[error("operation timed out after {elapsed:?} (limit {limit:?})")]
    Timeout { elapsed: Duration, limit: Duration },

    /// A per-service reconfiguration step failed; logged as an event, the
    /// reconcile continues.
    #[error("service reconfiguration failed for {service:?} on {node}: {reason}")]
    Service {
        node: String,
        service: String,
        reason: String,
    },

    /// The server does not support the collections API.
    #[error("collections are not available on this cluster")]
    CollectionsNotAvailable,

    /// TLS handler construction failed; fatal to the connect attempt.
    #[error("security setup failed: {0}")]
    Security(String),
}

/// Configuration-provider-specific failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bootstrap exhausted all {attempted} seed node(s)")]
    BootstrapExhausted { attempted: usize },

    #[error("failed to parse bucket config from {origin}: {reason}")]
    ParseFailure { origin: String, reason: String },

    #[error("revision {incoming} is not newer than applied revision {current} for bucket {bucket}")]
    OldOrSameRevision {
        bucket: String,
        current: i64,
        incoming: i64,
    },

    #[error("no such open bucket: {0}")]
    NoSuchBucket(String),
}

/// Why a request was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// `send` was called after the core shut down.
    Shutdown,
    /// The request's per-operation timeout elapsed.
    Timeout,
    /// A caller-initiated cancel.
    Requested,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CancelReason::Shutdown => "SHUTDOWN",
            CancelReason::Timeout => "TIMEOUT",
            CancelReason::Requested => "REQUESTED",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_bucket_and_revisions() {
        let err = ConfigError::OldOrSameRevision {
            bucket: "travel-sample".into(),
            current: 7,
            incoming: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("travel-sample"));
        assert!(msg.contains('7'));
        assert!(msg.contains('5'));
    }

    #[test]
    fn core_error_wraps_config_error() {
        let err: CoreError = ConfigError::NoSuchBucket("b".into()).into();
        assert!(matches!(err, CoreError::Config(ConfigError::NoSuchBucket(_))));
    }

    #[test]
    fn cancel_reason_display_matches_wire_names() {
        assert_eq!(CancelReason::Shutdown.to_string(), "SHUTDOWN");
        assert_eq!(CancelReason::Timeout.to_string(), "TIMEOUT");
    }
}
