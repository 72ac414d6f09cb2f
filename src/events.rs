//! Lifecycle events (§6) and the bus they are published on.
//!
//! The event bus is an external collaborator in the spec's own terms: callers
//! provide their own sink (metrics, audit log, whatever); this crate only
//! defines the shape of events and a default `tracing`-backed sink so the
//! core is useful standalone. Modeled on `ninelives::telemetry`'s
//! `tower::Service<Event>`-shaped sink, trimmed to what the core needs.

use std::fmt;
use std::sync::Arc;

use crate::error::CancelReason;

/// Why an incoming config was ignored by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIgnoredReason {
    ParseFailure,
    OldOrSameRevision,
}

impl fmt::Display for ConfigIgnoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIgnoredReason::ParseFailure => write!(f, "PARSE_FAILURE"),
            ConfigIgnoredReason::OldOrSameRevision => write!(f, "OLD_OR_SAME_REVISION"),
        }
    }
}

/// Endpoint lifecycle sub-events (§6).
#[derive(Debug, Clone)]
pub enum EndpointEvent {
    Connecting { host: String, port: u16 },
    Connected { host: String, port: u16 },
    ConnectionFailed { host: String, port: u16, attempt: u32, cause: String },
    ConnectionAborted { host: String, port: u16 },
    ConnectionIgnored { host: String, port: u16 },
    Disconnected { host: String, port: u16 },
    DisconnectionFailed { host: String, port: u16, cause: String },
}

/// All structured lifecycle events the core publishes (§6).
#[derive(Debug, Clone)]
pub enum Event {
    BucketOpened { bucket: String },
    BucketClosed { bucket: String },
    ShutdownCompleted,
    ReconfigurationCompleted,
    ReconfigurationIgnored,
    ReconfigurationErrorDetected { reason: String },
    ServiceReconfigurationFailed { node: String, service: String, reason: String },
    ServiceReplaced { node: String, service: String, old_port: u16, new_port: u16 },
    ConfigIgnored { bucket: String, reason: ConfigIgnoredReason },
    ConfigUpdated { bucket: String, revision: i64 },
    Endpoint(EndpointEvent),
    CollectionMapDecodingFailed { bucket: String, reason: String },
    RequestCancelled { reason: CancelReason },
}

/// Fire-and-forget publish: never blocks the caller on a slow/unready sink.
///
/// The event bus is an external collaborator (§6): this crate only fixes the
/// shape of events and a default `tracing` sink. A caller wanting to forward
/// events to metrics/audit systems supplies their own closure.
#[derive(Clone)]
pub struct EventBus {
    sink: Arc<dyn Fn(Event) + Send + Sync>,
}

impl EventBus {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        Self { sink: Arc::new(sink) }
    }

    /// The default bus: every event logged via `tracing` at a level matching
    /// its severity.
    pub fn tracing() -> Self {
        Self::new(|event| log_event(&event))
    }

    /// A bus that records nothing (useful in tests that don't care about
    /// events).
    pub fn noop() -> Self {
        Self::new(|_event| {})
    }

    pub fn publish(&self, event: Event) {
        (self.sink)(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventBus")
    }
}

fn log_event(event: &Event) {
    match event {
        Event::BucketOpened { bucket } => tracing::info!(bucket, "bucket opened"),
        Event::BucketClosed { bucket } => tracing::info!(bucket, "bucket closed"),
        Event::ShutdownCompleted => tracing::info!("shutdown completed"),
        Event::ReconfigurationCompleted => tracing::debug!("reconfiguration completed"),
        Event::ReconfigurationIgnored => tracing::debug!("reconfiguration ignored (already in progress)"),
        Event::ReconfigurationErrorDetected { reason } => {
            tracing::warn!(reason, "reconfiguration error detected")
        }
        Event::ServiceReconfigurationFailed { node, service, reason } => {
            tracing::warn!(node, service, reason, "service reconfiguration failed")
        }
        Event::ServiceReplaced { node, service, old_port, new_port } => {
            tracing::info!(node, service, old_port, new_port, "service replaced on port mismatch")
        }
        Event::ConfigIgnored { bucket, reason } => {
            tracing::debug!(bucket, %reason, "config ignored")
        }
        Event::ConfigUpdated { bucket, revision } => {
            tracing::debug!(bucket, revision, "config updated")
        }
        Event::Endpoint(ev) => log_endpoint_event(ev),
        Event::CollectionMapDecodingFailed { bucket, reason } => {
            tracing::warn!(bucket, reason, "collection map decoding failed")
        }
        Event::RequestCancelled { reason } => tracing::debug!(%reason, "request cancelled"),
    }
}

fn log_endpoint_event(event: &EndpointEvent) {
    match event {
        EndpointEvent::Connecting { host, port } => tracing::debug!(host, port, "endpoint connecting"),
        EndpointEvent::Connected { host, port } => tracing::info!(host, port, "endpoint connected"),
        EndpointEvent::ConnectionFailed { host, port, attempt, cause } => {
            tracing::warn!(host, port, attempt, cause, "endpoint connection failed")
        }
        EndpointEvent::ConnectionAborted { host, port } => {
            tracing::debug!(host, port, "endpoint connection aborted")
        }
        EndpointEvent::ConnectionIgnored { host, port } => {
            tracing::debug!(host, port, "endpoint connect ignored")
        }
        EndpointEvent::Disconnected { host, port } => tracing::info!(host, port, "endpoint disconnected"),
        EndpointEvent::DisconnectionFailed { host, port, cause } => {
            tracing::warn!(host, port, cause, "endpoint disconnection failed")
        }
    }
}

/// Exposed for tests/benches that want a `Duration`-stamped record of every
/// event published, mirroring `ninelives::sleeper::TrackingSleeper`.
#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<std::sync::Mutex<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bus(&self) -> EventBus {
        let events = self.events.clone();
        EventBus::new(move |event| {
            events.lock().unwrap_or_else(|p| p.into_inner()).push(event);
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn count_matching(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}
