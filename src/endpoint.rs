//! Endpoint lifecycle (C2, §4.2): one pooled connection to a single
//! `host:port`, its connect/reconnect state machine, and its per-endpoint
//! circuit breaker.

use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy};
use crate::error::CoreError;
use crate::events::{EndpointEvent, Event, EventBus};
use crate::jitter::Jitter;
use crate::sleeper::Sleeper;
use crate::backoff::Backoff;
use crate::transport::{TransportFactory, TransportHandle};

const STATE_DISCONNECTED: u8 = 0;
const STATE_CONNECTING: u8 = 1;
const STATE_CONNECTED: u8 = 2;
const STATE_DISCONNECTING: u8 = 3;

/// Connection lifecycle state (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl From<u8> for EndpointState {
    fn from(v: u8) -> Self {
        match v {
            STATE_CONNECTING => EndpointState::Connecting,
            STATE_CONNECTED => EndpointState::Connected,
            STATE_DISCONNECTING => EndpointState::Disconnecting,
            _ => EndpointState::Disconnected,
        }
    }
}

/// One pooled connection to a single node/port (§4.2).
pub struct Endpoint {
    host: String,
    port: u16,
    use_tls: bool,
    transport: Arc<dyn TransportFactory>,
    sleeper: Arc<dyn Sleeper>,
    state: AtomicU8,
    handle: Mutex<Option<Arc<dyn TransportHandle>>>,
    breaker: CircuitBreakerPolicy,
    outstanding: AtomicUsize,
    attempt: AtomicU32,
    events: EventBus,
    last_activity: Mutex<Instant>,
}

impl Endpoint {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        use_tls: bool,
        transport: Arc<dyn TransportFactory>,
        sleeper: Arc<dyn Sleeper>,
        breaker_config: CircuitBreakerConfig,
        events: EventBus,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls,
            transport,
            sleeper,
            state: AtomicU8::new(STATE_DISCONNECTED),
            handle: Mutex::new(None),
            breaker: CircuitBreakerPolicy::new(breaker_config),
            outstanding: AtomicUsize::new(0),
            attempt: AtomicU32::new(0),
            events,
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// How long this endpoint has gone without request activity, used by
    /// the owning pool to decide what to shrink (§4.3).
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_activity.lock().unwrap_or_else(|p| p.into_inner()).elapsed()
    }

    fn touch(&self) {
        *self.last_activity.lock().unwrap_or_else(|p| p.into_inner()) = Instant::now();
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> EndpointState {
        self.state.load(Ordering::Acquire).into()
    }

    pub fn breaker(&self) -> &CircuitBreakerPolicy {
        &self.breaker
    }

    pub fn outstanding_requests(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Whether this endpoint has no outstanding work and can be dropped
    /// from its pool without orphaning a request (§4.2, §4.3).
    pub fn is_free(&self) -> bool {
        self.outstanding_requests() == 0
    }

    /// Whether a request may be dispatched to this endpoint right now:
    /// connected, the transport handle is still alive, and the breaker is
    /// not tripped (§4.2 - `canWrite`).
    pub fn can_write(&self) -> bool {
        if self.state() != EndpointState::Connected {
            return false;
        }
        let alive = self.handle.lock().unwrap_or_else(|p| p.into_inner()).as_ref().is_some_and(|h| h.is_alive());
        alive && self.breaker.allows_request()
    }

    /// Drives the connect/reconnect loop until a connection succeeds or the
    /// endpoint is disconnected from under it. No-op if already
    /// connecting/connected (§4.2).
    pub async fn connect(&self) {
        if self.state.compare_exchange(
            STATE_DISCONNECTED,
            STATE_CONNECTING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ).is_err()
        {
            return;
        }
        self.attempt.store(0, Ordering::Release);
        self.events.publish(Event::Endpoint(EndpointEvent::Connecting { host: self.host.clone(), port: self.port }));

        loop {
            let attempt = self.attempt.fetch_add(1, Ordering::AcqRel) + 1;
            match self.transport.connect(&self.host, self.port, self.use_tls).await {
                Ok(handle) => {
                    *self.handle.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle);
                    if self
                        .state
                        .compare_exchange(STATE_CONNECTING, STATE_CONNECTED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.events.publish(Event::Endpoint(EndpointEvent::Connected {
                            host: self.host.clone(),
                            port: self.port,
                        }));
                    } else {
                        // Disconnect was requested mid-connect; undo.
                        self.handle.lock().unwrap_or_else(|p| p.into_inner()).take();
                        self.events.publish(Event::Endpoint(EndpointEvent::ConnectionIgnored {
                            host: self.host.clone(),
                            port: self.port,
                        }));
                    }
                    return;
                }
                Err(err) => {
                    self.events.publish(Event::Endpoint(EndpointEvent::ConnectionFailed {
                        host: self.host.clone(),
                        port: self.port,
                        attempt,
                        cause: err.to_string(),
                    }));
                    if self.state() != EndpointState::Connecting {
                        self.events.publish(Event::Endpoint(EndpointEvent::ConnectionAborted {
                            host: self.host.clone(),
                            port: self.port,
                        }));
                        return;
                    }
                    let delay = Jitter::full().apply(Backoff::endpoint_reconnect().delay(attempt as usize));
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    /// Writes `frame` over the current connection, gating on the circuit
    /// breaker. Callers must follow up with [`Endpoint::mark_request_completion`]
    /// regardless of outcome (§4.1, §4.2).
    pub async fn send(&self, frame: &[u8]) -> Result<Vec<u8>, CoreError> {
        if self.state() != EndpointState::Connected {
            return Err(CoreError::Dispatch(format!("endpoint {}:{} is not connected", self.host, self.port)));
        }
        if !self.breaker.track() {
            return Err(CoreError::Dispatch(format!("circuit breaker open for {}:{}", self.host, self.port)));
        }
        let handle = self.handle.lock().unwrap_or_else(|p| p.into_inner()).clone();
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        match handle {
            Some(handle) => handle.send(frame).await,
            None => Err(CoreError::Dispatch(format!("endpoint {}:{} has no live handle", self.host, self.port))),
        }
    }

    /// Records the outcome of a previously dispatched request against the
    /// circuit breaker and decrements the outstanding counter (§4.1, §4.2).
    pub fn mark_request_completion(&self, success: bool) {
        self.touch();
        if success {
            self.breaker.mark_success();
        } else {
            self.breaker.mark_failure();
        }
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }

    /// Tears the connection down. No-op if already disconnected (§4.2).
    pub async fn disconnect(&self) {
        let prior: EndpointState = self.state.swap(STATE_DISCONNECTING, Ordering::AcqRel).into();
        if prior == EndpointState::Disconnected {
            self.state.store(STATE_DISCONNECTED, Ordering::Release);
            return;
        }
        if let Some(handle) = self.handle.lock().unwrap_or_else(|p| p.into_inner()).take() {
            handle.close().await;
        }
        self.state.store(STATE_DISCONNECTED, Ordering::Release);
        self.events.publish(Event::Endpoint(EndpointEvent::Disconnected { host: self.host.clone(), port: self.port }));
    }
}
