//! Endpoint pool for one service on one node (C3, §4.3): maintains between
//! `min_endpoints` and `max_endpoints` connections, growing under load and
//! shrinking endpoints that have sat idle and unused past `idle_time`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::endpoint::Endpoint;
use crate::events::EventBus;
use crate::sleeper::Sleeper;
use crate::transport::TransportFactory;

/// Pool sizing and pipelining tunables (§4.3). Key-value services
/// typically pipeline; most others do not.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    pub min_endpoints: usize,
    pub max_endpoints: usize,
    pub idle_time: Duration,
    pub pipelined: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { min_endpoints: 1, max_endpoints: 1, idle_time: Duration::from_secs(300), pipelined: false }
    }
}

impl ServiceConfig {
    pub fn key_value() -> Self {
        Self { min_endpoints: 1, max_endpoints: 1, idle_time: Duration::from_secs(300), pipelined: true }
    }
}

/// A pool of endpoints all connecting to the same `host:port` (§4.3).
pub struct Service {
    host: String,
    port: u16,
    use_tls: bool,
    config: ServiceConfig,
    transport: Arc<dyn TransportFactory>,
    sleeper: Arc<dyn Sleeper>,
    breaker_config: CircuitBreakerConfig,
    events: EventBus,
    endpoints: Mutex<Vec<Arc<Endpoint>>>,
}

impl Service {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        use_tls: bool,
        config: ServiceConfig,
        transport: Arc<dyn TransportFactory>,
        sleeper: Arc<dyn Sleeper>,
        breaker_config: CircuitBreakerConfig,
        events: EventBus,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls,
            config,
            transport,
            sleeper,
            breaker_config,
            events,
            endpoints: Mutex::new(Vec::new()),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// All endpoints currently in the pool.
    pub fn endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Endpoints that can currently accept a write (§4.2 - `canWrite`).
    pub fn writable_endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints().into_iter().filter(|e| e.can_write()).collect()
    }

    fn new_endpoint(&self) -> Arc<Endpoint> {
        Arc::new(Endpoint::new(
            self.host.clone(),
            self.port,
            self.use_tls,
            self.transport.clone(),
            self.sleeper.clone(),
            self.breaker_config,
            self.events.clone(),
        ))
    }

    /// Grows the pool to `min_endpoints`, connecting each new endpoint
    /// (§4.3). Safe to call repeatedly; only adds what's missing.
    pub async fn ensure_min_endpoints(&self) {
        let missing = {
            let endpoints = self.endpoints.lock().unwrap_or_else(|p| p.into_inner());
            self.config.min_endpoints.saturating_sub(endpoints.len())
        };
        for _ in 0..missing {
            let endpoint = self.new_endpoint();
            endpoint.connect().await;
            self.endpoints.lock().unwrap_or_else(|p| p.into_inner()).push(endpoint);
        }
    }

    /// Adds one more endpoint if the pool has room, for use when every
    /// existing endpoint is saturated (§4.3). Returns `None` at capacity.
    pub async fn grow(&self) -> Option<Arc<Endpoint>> {
        {
            let endpoints = self.endpoints.lock().unwrap_or_else(|p| p.into_inner());
            if endpoints.len() >= self.config.max_endpoints {
                return None;
            }
        }
        let endpoint = self.new_endpoint();
        endpoint.connect().await;
        self.endpoints.lock().unwrap_or_else(|p| p.into_inner()).push(endpoint);
        Some(self.endpoints.lock().unwrap_or_else(|p| p.into_inner()).last().unwrap().clone())
    }

    /// Disconnects and drops endpoints beyond `min_endpoints` that are free
    /// of outstanding work and have been idle past `idle_time` (§4.3).
    pub async fn shrink_idle(&self) {
        let candidates: Vec<Arc<Endpoint>> = {
            let endpoints = self.endpoints.lock().unwrap_or_else(|p| p.into_inner());
            if endpoints.len() <= self.config.min_endpoints {
                return;
            }
            endpoints
                .iter()
                .skip(self.config.min_endpoints)
                .filter(|e| e.is_free() && e.idle_for() >= self.config.idle_time)
                .cloned()
                .collect()
        };
        for endpoint in &candidates {
            endpoint.disconnect().await;
        }
        if candidates.is_empty() {
            return;
        }
        let mut endpoints = self.endpoints.lock().unwrap_or_else(|p| p.into_inner());
        endpoints.retain(|e| !candidates.iter().any(|c| Arc::ptr_eq(c, e)));
    }

    /// Disconnects every endpoint in the pool (§4.4, node teardown).
    pub async fn disconnect_all(&self) {
        let endpoints = self.endpoints();
        for endpoint in &endpoints {
            endpoint.disconnect().await;
        }
        self.endpoints.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}
