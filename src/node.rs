//! Node-level service map (C4, §4.4): the set of services a single cluster
//! node currently hosts, keyed by service type (and bucket, for key-value).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::events::{Event, EventBus};
use crate::service::{Service, ServiceConfig};
use crate::sleeper::Sleeper;
use crate::transport::TransportFactory;
use crate::types::{NodeIdentifier, ServiceType};

type ServiceKey = (ServiceType, Option<String>);

/// One cluster node, and the bucket-scoped and cluster-scoped services it's
/// currently known to host (§4.4).
pub struct Node {
    identifier: NodeIdentifier,
    use_tls: bool,
    transport: Arc<dyn TransportFactory>,
    sleeper: Arc<dyn Sleeper>,
    breaker_config: CircuitBreakerConfig,
    events: EventBus,
    services: Mutex<HashMap<ServiceKey, (u16, Arc<Service>)>>,
}

impl Node {
    pub fn new(
        identifier: NodeIdentifier,
        use_tls: bool,
        transport: Arc<dyn TransportFactory>,
        sleeper: Arc<dyn Sleeper>,
        breaker_config: CircuitBreakerConfig,
        events: EventBus,
    ) -> Self {
        Self { identifier, use_tls, transport, sleeper, breaker_config, events, services: Mutex::new(HashMap::new()) }
    }

    pub fn identifier(&self) -> &NodeIdentifier {
        &self.identifier
    }

    pub fn service_enabled(&self, service_type: ServiceType, bucket: Option<&str>) -> bool {
        let key = (service_type, bucket.map(str::to_string));
        self.services.lock().unwrap_or_else(|p| p.into_inner()).contains_key(&key)
    }

    pub fn has_services_enabled(&self) -> bool {
        !self.services.lock().unwrap_or_else(|p| p.into_inner()).is_empty()
    }

    pub fn service(&self, service_type: ServiceType, bucket: Option<&str>) -> Option<Arc<Service>> {
        let key = (service_type, bucket.map(str::to_string));
        self.services.lock().unwrap_or_else(|p| p.into_inner()).get(&key).map(|(_, svc)| svc.clone())
    }

    /// Every service currently hosted, for reconciliation's teardown pass
    /// (§4.7).
    pub fn enabled_services(&self) -> Vec<(ServiceType, Option<String>)> {
        self.services.lock().unwrap_or_else(|p| p.into_inner()).keys().cloned().collect()
    }

    /// Every service pool currently hosted, for the idle-shrink sweep
    /// (§4.3).
    pub fn services(&self) -> Vec<Arc<Service>> {
        self.services.lock().unwrap_or_else(|p| p.into_inner()).values().map(|(_, svc)| svc.clone()).collect()
    }

    /// Ensures `service_type` (scoped to `bucket` for key-value) is hosted
    /// at `port`, growing a fresh pool if absent. Idempotent when the port
    /// hasn't changed. On a port mismatch the prior service is torn down
    /// and replaced, emitting `ServiceReplaced` (§4.7, resolved from an
    /// open question: a node's advertised port for a service can change
    /// across a rebalance without the node itself being replaced).
    pub async fn ensure_service_at(
        &self,
        service_type: ServiceType,
        bucket: Option<String>,
        port: u16,
        config: ServiceConfig,
    ) {
        let key = (service_type, bucket.clone());

        let existing = self.services.lock().unwrap_or_else(|p| p.into_inner()).get(&key).map(|(p, svc)| (*p, svc.clone()));

        match existing {
            Some((existing_port, _)) if existing_port == port => {}
            Some((existing_port, old_service)) => {
                old_service.disconnect_all().await;
                let fresh = self.new_service(port, config);
                fresh.ensure_min_endpoints().await;
                self.services.lock().unwrap_or_else(|p| p.into_inner()).insert(key, (port, Arc::new(fresh)));
                self.events.publish(Event::ServiceReplaced {
                    node: self.identifier.to_string(),
                    service: service_type.to_string(),
                    old_port: existing_port,
                    new_port: port,
                });
            }
            None => {
                let fresh = self.new_service(port, config);
                fresh.ensure_min_endpoints().await;
                self.services.lock().unwrap_or_else(|p| p.into_inner()).insert(key, (port, Arc::new(fresh)));
            }
        }
    }

    /// Tears a hosted service down and removes it (§4.7 - services in the
    /// node's current set but absent from the incoming config).
    pub async fn remove_service(&self, service_type: ServiceType, bucket: Option<&str>) {
        let key = (service_type, bucket.map(str::to_string));
        let removed = self.services.lock().unwrap_or_else(|p| p.into_inner()).remove(&key);
        if let Some((_, service)) = removed {
            service.disconnect_all().await;
        }
    }

    /// Tears every hosted service down (§4.4 - node removal).
    pub async fn disconnect(&self) {
        let services: Vec<Arc<Service>> =
            self.services.lock().unwrap_or_else(|p| p.into_inner()).drain().map(|(_, (_, svc))| svc).collect();
        for service in &services {
            service.disconnect_all().await;
        }
    }

    fn new_service(&self, port: u16, config: ServiceConfig) -> Service {
        Service::new(
            self.identifier.host.clone(),
            port,
            self.use_tls,
            config,
            self.transport.clone(),
            self.sleeper.clone(),
            self.breaker_config,
            self.events.clone(),
        )
    }
}
