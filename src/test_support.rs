//! Test-only fakes for the crate's external collaborator traits (§6, §10.4).
//!
//! Exposed under `cfg(any(test, feature = "test-support"))` so both this
//! crate's own unit/integration tests and a downstream integrator can drive
//! [`crate::Core`] and [`crate::ConfigProvider`] without real sockets, HTTP
//! loaders, or wall-clock sleeps. Call-recording style mirrors
//! `ninelives::sleeper::TrackingSleeper`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::{CollectionManifestLoader, ManifestResponse};
use crate::error::{CoreError, ConfigError};
use crate::request::Request;
use crate::retry_orchestrator::RetryOrchestrator;
use crate::transport::{TransportFactory, TransportHandle};
use crate::types::NodeIdentifier;
use crate::provider::{ConfigLoader, ConfigRefresher};

/// A [`TransportFactory`] whose connects always succeed and whose handles
/// simply echo whatever frame they're sent back to the caller.
#[derive(Debug, Default, Clone)]
pub struct FakeTransportFactory {
    connect_attempts: Arc<AtomicUsize>,
}

impl FakeTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of `connect` calls observed, across every host/port.
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::Acquire)
    }
}

#[async_trait]
impl TransportFactory for FakeTransportFactory {
    async fn connect(&self, _host: &str, _port: u16, _use_tls: bool) -> Result<Arc<dyn TransportHandle>, CoreError> {
        self.connect_attempts.fetch_add(1, Ordering::AcqRel);
        Ok(Arc::new(FakeTransportHandle::default()))
    }
}

/// An always-alive, echoing transport handle.
#[derive(Debug, Default)]
pub struct FakeTransportHandle {
    sends: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl TransportHandle for FakeTransportHandle {
    async fn send(&self, frame: &[u8]) -> Result<Vec<u8>, CoreError> {
        self.sends.lock().unwrap_or_else(|p| p.into_inner()).push(frame.to_vec());
        Ok(frame.to_vec())
    }

    fn is_alive(&self) -> bool {
        true
    }

    async fn close(&self) {}
}

/// A [`ConfigLoader`] backed by a fixed map of `host -> raw config bytes`
/// (or an explicit failure), so bootstrap scenarios can be scripted without
/// a real key-value/manager client.
#[derive(Debug, Default, Clone)]
pub struct FakeConfigLoader {
    responses: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failing_hosts: Arc<Mutex<Vec<String>>>,
}

impl FakeConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// `node.host` returns `json` from `load`.
    pub fn respond(&self, host: impl Into<String>, json: impl Into<Vec<u8>>) -> &Self {
        self.responses.lock().unwrap_or_else(|p| p.into_inner()).insert(host.into(), json.into());
        self
    }

    /// `node.host` fails every load attempt.
    pub fn fail(&self, host: impl Into<String>) -> &Self {
        self.failing_hosts.lock().unwrap_or_else(|p| p.into_inner()).push(host.into());
        self
    }
}

#[async_trait]
impl ConfigLoader for FakeConfigLoader {
    async fn load(&self, node: &NodeIdentifier, _bucket: &str, _use_tls: bool) -> Result<Vec<u8>, ConfigError> {
        if self.failing_hosts.lock().unwrap_or_else(|p| p.into_inner()).contains(&node.host) {
            return Err(ConfigError::BootstrapExhausted { attempted: 1 });
        }
        self.responses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&node.host)
            .cloned()
            .ok_or_else(|| ConfigError::BootstrapExhausted { attempted: 1 })
    }
}

/// A [`ConfigRefresher`] that never pushes on its own; tests drive pushes
/// explicitly through the returned sender.
#[derive(Debug, Default, Clone)]
pub struct ManualConfigRefresher {
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
}

impl ManualConfigRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `raw` to every watcher registered so far (there is normally
    /// exactly one, per bucket).
    pub fn push(&self, raw: impl Into<Vec<u8>>) {
        let raw = raw.into();
        for sender in self.senders.lock().unwrap_or_else(|p| p.into_inner()).iter() {
            let _ = sender.send(raw.clone());
        }
    }
}

#[async_trait]
impl ConfigRefresher for ManualConfigRefresher {
    async fn watch(&self, _node: NodeIdentifier, _bucket: String, sink: mpsc::UnboundedSender<Vec<u8>>) {
        self.senders.lock().unwrap_or_else(|p| p.into_inner()).push(sink);
        std::future::pending::<()>().await
    }
}

/// A [`RetryOrchestrator`] that records every request handed to it instead
/// of resolving it, so tests can assert on dispatch-failure handoffs.
#[derive(Default)]
pub struct RecordingRetryOrchestrator {
    accepted: AtomicUsize,
}

impl RecordingRetryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.load(Ordering::Acquire)
    }
}

#[async_trait]
impl RetryOrchestrator for RecordingRetryOrchestrator {
    async fn accept(&self, mut request: Box<dyn Request>) {
        self.accepted.fetch_add(1, Ordering::AcqRel);
        request.cancel(crate::error::CancelReason::Requested);
    }
}

/// A [`CollectionManifestLoader`] that always returns a fixed, scripted
/// response.
#[derive(Debug, Clone)]
pub struct FakeManifestLoader {
    response: ManifestResponse,
}

impl FakeManifestLoader {
    pub fn applied(uid: impl Into<String>, entries: Vec<(String, String, u32)>) -> Self {
        Self { response: ManifestResponse::Applied { uid: uid.into(), entries } }
    }

    pub fn unknown() -> Self {
        Self { response: ManifestResponse::Unknown }
    }

    pub fn other(status: impl Into<String>) -> Self {
        Self { response: ManifestResponse::Other { status: status.into() } }
    }
}

#[async_trait]
impl CollectionManifestLoader for FakeManifestLoader {
    async fn fetch(&self, _bucket: &str) -> Result<ManifestResponse, CoreError> {
        Ok(self.response.clone())
    }
}
