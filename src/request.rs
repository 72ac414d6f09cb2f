//! The request abstraction the core routes and dispatches (§4.6, §6).
//!
//! `Request` is deliberately thin: the core only needs enough to pick a
//! service/endpoint and to cancel the request if dispatch can't proceed.
//! Encoding a request onto the wire and decoding its response is entirely the
//! transport layer's business.

use crate::error::CancelReason;
use crate::types::ServiceType;

/// Where a request should be routed (§4.6).
#[derive(Debug, Clone)]
pub struct RoutingKey {
    pub bucket: Option<String>,
    pub partition_key: Option<Vec<u8>>,
    pub replica_index: Option<usize>,
    pub use_fast_forward: bool,
}

impl RoutingKey {
    /// A cluster-scoped request with no bucket or partition affinity.
    pub fn cluster() -> Self {
        Self { bucket: None, partition_key: None, replica_index: None, use_fast_forward: false }
    }

    /// A key-value request scoped to `bucket`, hashed on `partition_key`.
    pub fn key_value(bucket: impl Into<String>, partition_key: impl Into<Vec<u8>>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            partition_key: Some(partition_key.into()),
            replica_index: None,
            use_fast_forward: false,
        }
    }

    /// Read from a specific replica index instead of the partition master.
    pub fn with_replica(mut self, index: usize) -> Self {
        self.replica_index = Some(index);
        self
    }

    pub fn with_fast_forward(mut self, use_fast_forward: bool) -> Self {
        self.use_fast_forward = use_fast_forward;
        self
    }
}

/// A unit of work the core dispatches to an endpoint (§4.6).
///
/// Implementors own their own payload and response channel; the core only
/// needs enough surface to pick a target and to cancel if it can't proceed.
pub trait Request: Send {
    /// Which service type this request targets.
    fn service_type(&self) -> ServiceType;

    /// Routing information used to pick the target node/partition.
    fn routing_key(&self) -> RoutingKey;

    /// Whether the retry orchestrator should be notified on dispatch
    /// timeout. Some fire-and-forget requests opt out (§4.6).
    fn register_for_timeout(&self) -> bool {
        true
    }

    /// Serializes this request onto the wire frame an endpoint sends.
    fn encode(&self) -> Vec<u8>;

    /// Delivers the dispatch outcome back to whoever is awaiting this
    /// request (§4.6).
    fn complete(&mut self, result: Result<Vec<u8>, crate::error::CoreError>);

    /// Called when the request cannot be dispatched and will not be
    /// retried: shutdown, timeout, or an explicit cancel (§6).
    fn cancel(&mut self, reason: CancelReason);
}
