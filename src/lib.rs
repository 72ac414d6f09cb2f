#![forbid(unsafe_code)]

//! # cluster-core
//!
//! Control-plane core of a client runtime for a distributed document-database
//! cluster: a configuration provider that bootstraps and keeps bucket
//! topology current, a reconciler that converges the managed node/service/
//! endpoint tree onto each new topology snapshot, and a dispatcher that
//! routes requests through it.
//!
//! ## Features
//!
//! - **Configuration provider** with parallel seed bootstrap, revision-gated
//!   config acceptance, and broadcast fan-out of topology snapshots.
//! - **Topology reconciler** that diffs desired vs. current node/service
//!   state and converges it, single-flighted against concurrent updates.
//! - **Per-endpoint circuit breakers** with rolling-window failure-rate
//!   gating.
//! - **Locator strategies** per service type: key-value partition hashing,
//!   deterministic manager selection, round-robin elsewhere.
//! - **Per-request timeout scheduling** through a pluggable `Timer`, with a
//!   `tokio::time`-backed default.
//! - **Pluggable transport, timer, retry and config-loading collaborators**
//!   — this crate defines the interfaces; callers supply the networking
//!   stack.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cluster_core::{Core, NoRetryOrchestrator, ConfigLoader, ConfigRefresher};
//! use cluster_core::{CircuitBreakerConfig, EventBus, InstantSleeper, NodeIdentifier};
//! use cluster_core::{CoreError, TransportFactory, TransportHandle, TokioTimer};
//! use async_trait::async_trait;
//! use std::time::Duration;
//!
//! struct NoopTransport;
//! #[async_trait]
//! impl TransportFactory for NoopTransport {
//!     async fn connect(&self, _host: &str, _port: u16, _tls: bool)
//!         -> Result<Arc<dyn TransportHandle>, CoreError> {
//!         unimplemented!("plug in a real transport")
//!     }
//! }
//!
//! struct NoopLoader;
//! #[async_trait]
//! impl ConfigLoader for NoopLoader {
//!     async fn load(&self, _node: &NodeIdentifier, _bucket: &str, _tls: bool)
//!         -> Result<Vec<u8>, cluster_core::ConfigError> {
//!         unimplemented!("plug in an HTTP config fetcher")
//!     }
//! }
//!
//! struct NoopRefresher;
//! #[async_trait]
//! impl ConfigRefresher for NoopRefresher {
//!     async fn watch(&self, _node: NodeIdentifier, _bucket: String,
//!         _sink: tokio::sync::mpsc::UnboundedSender<Vec<u8>>) {
//!         std::future::pending::<()>().await
//!     }
//! }
//!
//! # async fn example() {
//! let core = Core::new(
//!     vec![NodeIdentifier::new("127.0.0.1", 8091)],
//!     false,
//!     Arc::new(NoopLoader),
//!     Arc::new(NoopRefresher),
//!     Arc::new(NoopTransport),
//!     Arc::new(InstantSleeper),
//!     CircuitBreakerConfig::default(),
//!     Arc::new(NoRetryOrchestrator),
//!     Arc::new(TokioTimer),
//!     Duration::from_secs(15),
//!     EventBus::tracing(),
//! );
//! let _ = core.open_bucket("travel-sample").await;
//! # }
//! ```

pub mod backoff;
pub mod circuit_breaker;
pub mod clock;
pub mod config;
pub mod core;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod jitter;
pub mod locator;
pub mod node;
pub mod provider;
pub mod request;
pub mod retry_orchestrator;
pub mod service;
pub mod sleeper;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod timer;
pub mod transport;
pub mod types;

pub use backoff::Backoff;
pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState};
pub use clock::{Clock, MonotonicClock};
pub use config::{
    decode_collection_id, encode_collection_id, parse_bucket_config, BucketConfig,
    ClusterConfig, CollectionManifestCache, CollectionManifestLoader, ManifestResponse,
    NodeInfo, PartitionMap, ServicePorts, DEFAULT_COLLECTION_ID, PARTITION_NOT_EXISTENT,
};
pub use core::Core;
pub use endpoint::{Endpoint, EndpointState};
pub use error::{CancelReason, ConfigError, CoreError};
pub use events::{ConfigIgnoredReason, EndpointEvent, Event, EventBus, RecordingSink};
pub use jitter::Jitter;
pub use locator::Locator;
pub use node::Node;
pub use provider::{ConfigLoader, ConfigProvider, ConfigRefresher, ConfigStream};
pub use request::{Request, RoutingKey};
pub use retry_orchestrator::{NoRetryOrchestrator, RetryOrchestrator};
pub use service::{Service, ServiceConfig};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use timer::{Timer, TimerHandle, TokioTimer};
pub use transport::{TransportFactory, TransportHandle};
pub use types::{BucketType, Capabilities, NodeIdentifier, ServiceType};

pub mod prelude;
