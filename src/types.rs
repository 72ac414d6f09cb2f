//! Shared identity and capability types used across the config model,
//! node/service/endpoint layer, and locators.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// The protocol endpoint types a node may host (§2, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceType {
    KeyValue,
    Manager,
    Query,
    Search,
    Analytics,
    Views,
}

impl ServiceType {
    /// All service types the reconciler knows about, in a stable order —
    /// used to detect services present on a node but no longer in the
    /// incoming config's service map (§4.7 step 2).
    pub const ALL: [ServiceType; 6] = [
        ServiceType::KeyValue,
        ServiceType::Manager,
        ServiceType::Query,
        ServiceType::Search,
        ServiceType::Analytics,
        ServiceType::Views,
    ];

    /// Bucket-scoped services require a bucket name alongside the node when
    /// looked up; cluster-scoped services do not (§4.3).
    pub fn is_bucket_scoped(self) -> bool {
        matches!(self, ServiceType::KeyValue)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceType::KeyValue => "kv",
            ServiceType::Manager => "mgmt",
            ServiceType::Query => "query",
            ServiceType::Search => "search",
            ServiceType::Analytics => "analytics",
            ServiceType::Views => "views",
        };
        write!(f, "{s}")
    }
}

/// Stable node identity: `(host, manager-port)`. Ports for other services may
/// change across reconfigurations without identity changing (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdentifier {
    pub host: String,
    pub manager_port: u16,
}

impl NodeIdentifier {
    pub fn new(host: impl Into<String>, manager_port: u16) -> Self {
        Self { host: host.into(), manager_port }
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.manager_port)
    }
}

/// Bucket storage backend (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketType {
    Partitioned,
    Ephemeral,
    Memcache,
}

/// Bucket and cluster capability sets (§3), kept as opaque strings — the
/// core never interprets individual capability names, only plumbs them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub bucket: HashSet<String>,
    pub cluster: HashMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_is_the_only_bucket_scoped_service() {
        for svc in ServiceType::ALL {
            assert_eq!(svc.is_bucket_scoped(), svc == ServiceType::KeyValue);
        }
    }

    #[test]
    fn node_identifier_equality_is_identifier_only() {
        let a = NodeIdentifier::new("10.0.0.1", 8091);
        let b = NodeIdentifier::new("10.0.0.1", 8091);
        assert_eq!(a, b);
    }

    #[test]
    fn node_identifier_display_is_host_colon_port() {
        let n = NodeIdentifier::new("10.0.0.1", 8091);
        assert_eq!(n.to_string(), "10.0.0.1:8091");
    }
}
