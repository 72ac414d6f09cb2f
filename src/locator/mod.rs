//! Request-to-node locators (C5, §4.4): the strategy for picking a target
//! node differs per service type, so `Locator` dispatches to whichever
//! variant matches the request's service.

pub mod keyvalue;
pub mod manager;
pub mod round_robin;

pub use keyvalue::KeyValueLocator;
pub use manager::ManagerLocator;
pub use round_robin::RoundRobinLocator;

use crate::config::{ClusterConfig, NodeInfo};
use crate::request::RoutingKey;
use crate::types::{NodeIdentifier, ServiceType};

/// Picks a target node for a request, using whichever strategy fits its
/// service type (§4.4).
pub enum Locator {
    KeyValue(KeyValueLocator),
    Manager(ManagerLocator),
    RoundRobin(RoundRobinLocator),
}

impl Locator {
    /// The locator a given service type dispatches through: key-value
    /// hashes on the document key, manager picks deterministically, and
    /// every other cluster-scoped service round-robins (§4.4).
    pub fn for_service(service_type: ServiceType) -> Self {
        match service_type {
            ServiceType::KeyValue => Locator::KeyValue(KeyValueLocator),
            ServiceType::Manager => Locator::Manager(ManagerLocator),
            _ => Locator::RoundRobin(RoundRobinLocator::new()),
        }
    }

    /// Resolves `routing` against the current cluster snapshot.
    pub fn locate(&self, cluster: &ClusterConfig, service_type: ServiceType, routing: &RoutingKey) -> Option<NodeIdentifier> {
        match self {
            Locator::KeyValue(locator) => {
                let bucket = cluster.bucket(routing.bucket.as_deref()?)?;
                let key = routing.partition_key.as_deref()?;
                locator.locate(bucket, key, routing.replica_index, routing.use_fast_forward)
            }
            Locator::Manager(locator) => locator.locate(&candidate_nodes(cluster, routing.bucket.as_deref())),
            Locator::RoundRobin(locator) => {
                locator.locate(&candidate_nodes(cluster, routing.bucket.as_deref()), service_type)
            }
        }
    }
}

/// Every node known for `bucket`, or across all open buckets when the
/// request is cluster-scoped.
fn candidate_nodes(cluster: &ClusterConfig, bucket: Option<&str>) -> Vec<NodeInfo> {
    match bucket {
        Some(name) => cluster.bucket(name).map(|b| b.nodes.clone()).unwrap_or_default(),
        None => cluster.buckets().flat_map(|b| b.nodes.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BucketConfig, PartitionMap, ServicePorts};
    use crate::types::{BucketType, Capabilities};

    fn kv_node(host: &str) -> NodeInfo {
        let mut ports = ServicePorts::default();
        ports.set(ServiceType::KeyValue, Some(11210), None);
        NodeInfo { identifier: NodeIdentifier::new(host, 8091), ports }
    }

    fn cluster_with_bucket() -> ClusterConfig {
        let bucket = BucketConfig {
            revision: 1,
            uuid: "u".into(),
            name: "default".into(),
            tainted: false,
            bucket_type: BucketType::Partitioned,
            nodes: vec![kv_node("10.0.0.1")],
            capabilities: Capabilities::default(),
            partitions: Some(PartitionMap::new(vec![0; 1024], vec![Vec::new(); 1024])),
        };
        ClusterConfig::empty().with_bucket(bucket)
    }

    #[test]
    fn key_value_locator_resolves_to_the_only_node() {
        let cluster = cluster_with_bucket();
        let locator = Locator::for_service(ServiceType::KeyValue);
        let routing = RoutingKey::key_value("default", b"doc-1".to_vec());
        let resolved = locator.locate(&cluster, ServiceType::KeyValue, &routing).unwrap();
        assert_eq!(resolved.host, "10.0.0.1");
    }

    #[test]
    fn key_value_locator_with_no_bucket_in_routing_key_resolves_nothing() {
        let cluster = cluster_with_bucket();
        let locator = Locator::for_service(ServiceType::KeyValue);
        let routing = RoutingKey::cluster();
        assert!(locator.locate(&cluster, ServiceType::KeyValue, &routing).is_none());
    }
}
