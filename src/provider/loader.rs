//! Config loading collaborator (§4.5, §6): fetching a raw bucket-config
//! document from a single node. An external collaborator — this crate
//! defines the contract (and the default ports a caller would dial), the
//! caller supplies the actual KV/manager protocol client.

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::types::NodeIdentifier;

/// Default key-value port (plaintext).
pub const DEFAULT_KV_PORT: u16 = 11210;
/// Default key-value port (TLS).
pub const DEFAULT_KV_TLS_PORT: u16 = 11207;
/// Default cluster-manager port (plaintext).
pub const DEFAULT_MANAGER_PORT: u16 = 8091;
/// Default cluster-manager port (TLS).
pub const DEFAULT_MANAGER_TLS_PORT: u16 = 18091;

/// How many seed nodes the provider probes concurrently during bootstrap
/// (§4.5).
pub const MAX_PARALLEL_LOADERS: usize = 5;

/// Fetches a bucket's raw config JSON from one node, trying the key-value
/// protocol first and falling back to the manager HTTP endpoint (§4.5).
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// Returns the raw config bytes and the host they were resolved
    /// against (used to fill in nodes whose `hostname` is omitted).
    async fn load(&self, node: &NodeIdentifier, bucket: &str, use_tls: bool) -> Result<Vec<u8>, ConfigError>;
}
