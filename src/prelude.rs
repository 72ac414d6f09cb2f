//! Convenient re-exports for common `cluster-core` types.
pub use crate::{
    backoff::Backoff,
    circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState},
    clock::{Clock, MonotonicClock},
    config::{
        decode_collection_id, encode_collection_id, parse_bucket_config, BucketConfig,
        ClusterConfig, CollectionManifestCache, CollectionManifestLoader, ManifestResponse,
        NodeInfo, PartitionMap, ServicePorts, DEFAULT_COLLECTION_ID, PARTITION_NOT_EXISTENT,
    },
    core::Core,
    endpoint::{Endpoint, EndpointState},
    error::{CancelReason, ConfigError, CoreError},
    events::{ConfigIgnoredReason, EndpointEvent, Event, EventBus, RecordingSink},
    jitter::Jitter,
    locator::Locator,
    node::Node,
    provider::{ConfigLoader, ConfigProvider, ConfigRefresher, ConfigStream},
    request::{Request, RoutingKey},
    retry_orchestrator::{NoRetryOrchestrator, RetryOrchestrator},
    service::{Service, ServiceConfig},
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    timer::{Timer, TimerHandle, TokioTimer},
    transport::{TransportFactory, TransportHandle},
    types::{BucketType, Capabilities, NodeIdentifier, ServiceType},
};
