//! Transport collaborator traits (§6): the wire connection itself is an
//! external dependency the core only drives through this interface —
//! exactly how a caller would plug in TCP+TLS, an in-memory test double, or
//! a multiplexed QUIC stream without the core knowing the difference.

use async_trait::async_trait;

use crate::error::CoreError;

/// A single established connection to one node/port.
///
/// Endpoints hold exactly one `TransportHandle` while CONNECTED (§4.2).
#[async_trait]
pub trait TransportHandle: Send + Sync {
    /// Writes a fully framed request and returns its raw response bytes.
    async fn send(&self, frame: &[u8]) -> Result<Vec<u8>, CoreError>;

    /// Whether the underlying connection is still believed alive. A `false`
    /// here should promptly be followed by the endpoint tearing the
    /// connection down (§4.2).
    fn is_alive(&self) -> bool;

    /// Best-effort close; failures are logged, not propagated (§6 -
    /// `DisconnectionFailed`).
    async fn close(&self);
}

/// Builds [`TransportHandle`]s for a given host/port/TLS combination. An
/// external collaborator (§6): this crate defines the contract, callers
/// supply the concrete networking stack.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        use_tls: bool,
    ) -> Result<std::sync::Arc<dyn TransportHandle>, CoreError>;
}
