//! Topology reconciler and request dispatcher (C8, §4.7): the piece that
//! watches the configuration provider's snapshot stream and drives the
//! node/service/endpoint tree towards it, and the entry point requests are
//! sent through.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::config::ClusterConfig;
use crate::error::{CancelReason, CoreError};
use crate::events::{Event, EventBus};
use crate::locator::Locator;
use crate::node::Node;
use crate::provider::{ConfigLoader, ConfigProvider, ConfigRefresher};
use crate::request::Request;
use crate::retry_orchestrator::RetryOrchestrator;
use crate::service::ServiceConfig;
use crate::sleeper::Sleeper;
use crate::timer::Timer;
use crate::transport::TransportFactory;
use crate::types::{NodeIdentifier, ServiceType};

/// How often the idle-shrink sweep walks every managed service's pool
/// (§4.3). Endpoint-level idle timeouts are configured per `ServiceConfig`;
/// this just sets how promptly they're reaped once they qualify.
const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// The client core: owns the configuration provider, the live node/service
/// tree, and dispatches requests against whatever that tree currently looks
/// like (§4.7).
pub struct Core {
    provider: ConfigProvider,
    nodes: Mutex<HashMap<NodeIdentifier, Arc<Node>>>,
    locators: Mutex<HashMap<ServiceType, Arc<Locator>>>,
    use_tls: bool,
    transport: Arc<dyn TransportFactory>,
    sleeper: Arc<dyn Sleeper>,
    breaker_config: CircuitBreakerConfig,
    retry: Arc<dyn RetryOrchestrator>,
    timer: Arc<dyn Timer>,
    request_timeout: Duration,
    events: EventBus,
    reconfigure_in_progress: AtomicBool,
    more_configs_pending: AtomicBool,
    shut_down: AtomicBool,
}

impl Core {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seeds: Vec<NodeIdentifier>,
        use_tls: bool,
        loader: Arc<dyn ConfigLoader>,
        refresher: Arc<dyn ConfigRefresher>,
        transport: Arc<dyn TransportFactory>,
        sleeper: Arc<dyn Sleeper>,
        breaker_config: CircuitBreakerConfig,
        retry: Arc<dyn RetryOrchestrator>,
        timer: Arc<dyn Timer>,
        request_timeout: Duration,
        events: EventBus,
    ) -> Arc<Self> {
        let provider = ConfigProvider::new(seeds, use_tls, loader, refresher, events.clone());
        let core = Arc::new(Self {
            provider,
            nodes: Mutex::new(HashMap::new()),
            locators: Mutex::new(HashMap::new()),
            use_tls,
            transport,
            sleeper,
            breaker_config,
            retry,
            timer,
            request_timeout,
            events,
            reconfigure_in_progress: AtomicBool::new(false),
            more_configs_pending: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
        });
        core.clone().spawn_reconcile_loop();
        core.clone().spawn_idle_sweep_loop();
        core
    }

    pub async fn open_bucket(&self, bucket: &str) -> Result<(), CoreError> {
        self.provider.open_bucket(bucket).await
    }

    pub fn close_bucket(&self, bucket: &str) -> Result<(), CoreError> {
        self.provider.close_bucket(bucket)
    }

    pub fn current_config(&self) -> ClusterConfig {
        self.provider.current()
    }

    /// Tears everything down: the config provider's refresh subscriptions
    /// and every node's services/endpoints. Idempotent calls after the
    /// first return `AlreadyShutdown` (§4.7).
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        self.provider.shutdown()?;
        self.shut_down.store(true, Ordering::Release);
        let nodes: Vec<Arc<Node>> = self.nodes.lock().unwrap_or_else(|p| p.into_inner()).drain().map(|(_, n)| n).collect();
        for node in &nodes {
            node.disconnect().await;
        }
        Ok(())
    }

    /// Dispatches `request` against the current topology, handing it to the
    /// retry orchestrator if no eligible endpoint exists right now (§4.6).
    /// Unless the request opts out via `register_for_timeout`, dispatch
    /// races against the configured per-request timeout; on expiry the
    /// request is cancelled as `CancelReason::Timeout` (§4.7, §5, §7).
    pub async fn send(&self, mut request: Box<dyn Request>) {
        if self.shut_down.load(Ordering::Acquire) {
            request.cancel(CancelReason::Shutdown);
            self.events.publish(Event::RequestCancelled { reason: CancelReason::Shutdown });
            return;
        }

        let service_type = request.service_type();
        let routing = request.routing_key();
        let cluster = self.provider.current();
        let locator = self.locator_for(service_type);

        let Some(node_id) = locator.locate(&cluster, service_type, &routing) else {
            self.retry.accept(request).await;
            return;
        };

        let node = self.nodes.lock().unwrap_or_else(|p| p.into_inner()).get(&node_id).cloned();
        let Some(node) = node else {
            self.retry.accept(request).await;
            return;
        };

        let Some(service) = node.service(service_type, routing.bucket.as_deref()) else {
            self.retry.accept(request).await;
            return;
        };

        let endpoint = match service.writable_endpoints().into_iter().next() {
            Some(endpoint) => Some(endpoint),
            None => service.grow().await,
        };

        let Some(endpoint) = endpoint else {
            self.retry.accept(request).await;
            return;
        };

        let frame = request.encode();

        if !request.register_for_timeout() {
            let result = endpoint.send(&frame).await;
            endpoint.mark_request_completion(result.is_ok());
            request.complete(result);
            return;
        }

        let (expired_tx, expired_rx) = oneshot::channel();
        let timer_handle =
            self.timer.schedule(self.request_timeout, Box::new(move || { let _ = expired_tx.send(()); }));

        tokio::select! {
            result = endpoint.send(&frame) => {
                timer_handle.cancel();
                endpoint.mark_request_completion(result.is_ok());
                request.complete(result);
            }
            _ = expired_rx => {
                endpoint.mark_request_completion(false);
                request.cancel(CancelReason::Timeout);
                self.events.publish(Event::RequestCancelled { reason: CancelReason::Timeout });
            }
        }
    }

    fn locator_for(&self, service_type: ServiceType) -> Arc<Locator> {
        self.locators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(service_type)
            .or_insert_with(|| Arc::new(Locator::for_service(service_type)))
            .clone()
    }

    fn get_or_create_node(&self, identifier: NodeIdentifier) -> Arc<Node> {
        self.nodes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(identifier.clone())
            .or_insert_with(|| {
                Arc::new(Node::new(
                    identifier,
                    self.use_tls,
                    self.transport.clone(),
                    self.sleeper.clone(),
                    self.breaker_config,
                    self.events.clone(),
                ))
            })
            .clone()
    }

    fn spawn_reconcile_loop(self: Arc<Self>) {
        let mut stream = self.provider.subscribe();
        tokio::spawn(async move {
            loop {
                match stream.recv().await {
                    Ok(_cfg) => self.on_config_changed().await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Periodically walks every managed service's pool and disconnects
    /// endpoints that have sat idle past `idle_time`, above the pool's
    /// minimum (§4.3). Stops once `shutdown()` has run.
    fn spawn_idle_sweep_loop(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(IDLE_SWEEP_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if self.shut_down.load(Ordering::Acquire) {
                    break;
                }
                let nodes: Vec<Arc<Node>> = self.nodes.lock().unwrap_or_else(|p| p.into_inner()).values().cloned().collect();
                for node in &nodes {
                    for service in node.services() {
                        service.shrink_idle().await;
                    }
                }
            }
        });
    }

    /// CAS-guarded single-flight reconfiguration: a config arriving while a
    /// reconcile is already running marks `more_configs_pending` rather
    /// than racing a second reconcile, and the in-flight run loops once
    /// more against the latest snapshot before releasing the lock (§4.7).
    async fn on_config_changed(&self) {
        if self.reconfigure_in_progress.swap(true, Ordering::AcqRel) {
            self.more_configs_pending.store(true, Ordering::Release);
            self.events.publish(Event::ReconfigurationIgnored);
            return;
        }
        loop {
            let snapshot = self.provider.current();
            self.reconcile(&snapshot).await;
            if !self.more_configs_pending.swap(false, Ordering::AcqRel) {
                break;
            }
        }
        self.reconfigure_in_progress.store(false, Ordering::Release);
    }

    /// Converges the managed node/service tree onto `cluster` (§4.7):
    /// cluster-scoped services follow each node's advertised port map;
    /// key-value is reconciled per (node, bucket) since its port and
    /// presence are bucket-scoped.
    async fn reconcile(&self, cluster: &ClusterConfig) {
        let mut desired_nodes: HashMap<NodeIdentifier, crate::config::NodeInfo> = HashMap::new();
        let mut desired_kv: HashMap<(NodeIdentifier, String), u16> = HashMap::new();

        for bucket in cluster.buckets() {
            for node_info in &bucket.nodes {
                desired_nodes.entry(node_info.identifier.clone()).or_insert_with(|| node_info.clone());
                if let Some(port) = node_info.ports.port_for(ServiceType::KeyValue, self.use_tls) {
                    desired_kv.insert((node_info.identifier.clone(), bucket.name.clone()), port);
                }
            }
        }

        for (identifier, info) in &desired_nodes {
            let node = self.get_or_create_node(identifier.clone());
            for service_type in ServiceType::ALL {
                if service_type == ServiceType::KeyValue {
                    continue;
                }
                match info.ports.port_for(service_type, self.use_tls) {
                    Some(port) => node.ensure_service_at(service_type, None, port, ServiceConfig::default()).await,
                    None => node.remove_service(service_type, None).await,
                }
            }
        }

        for ((identifier, bucket), port) in &desired_kv {
            let node = self.get_or_create_node(identifier.clone());
            node.ensure_service_at(ServiceType::KeyValue, Some(bucket.clone()), *port, ServiceConfig::key_value())
                .await;
        }

        self.prune_unwanted(&desired_nodes, &desired_kv).await;
        self.events.publish(Event::ReconfigurationCompleted);
    }

    /// Removes nodes no longer in the incoming config, and services on
    /// surviving nodes that the incoming config no longer lists (§4.7).
    async fn prune_unwanted(
        &self,
        desired_nodes: &HashMap<NodeIdentifier, crate::config::NodeInfo>,
        desired_kv: &HashMap<(NodeIdentifier, String), u16>,
    ) {
        let existing: Vec<(NodeIdentifier, Arc<Node>)> =
            self.nodes.lock().unwrap_or_else(|p| p.into_inner()).iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        for (identifier, node) in existing {
            if !desired_nodes.contains_key(&identifier) {
                node.disconnect().await;
                self.nodes.lock().unwrap_or_else(|p| p.into_inner()).remove(&identifier);
                continue;
            }
            for (service_type, bucket) in node.enabled_services() {
                let still_wanted = match service_type {
                    ServiceType::KeyValue => {
                        bucket.as_ref().is_some_and(|b| desired_kv.contains_key(&(identifier.clone(), b.clone())))
                    }
                    other => desired_nodes.get(&identifier).and_then(|info| info.ports.port_for(other, self.use_tls)).is_some(),
                };
                if !still_wanted {
                    node.remove_service(service_type, bucket.as_deref()).await;
                }
            }
        }
    }
}
