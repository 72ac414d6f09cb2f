//! Typed bucket/cluster configuration model (C6, §3).

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{BucketType, Capabilities, NodeIdentifier, ServiceType};

/// Sentinel returned by [`PartitionMap::master_for`] when a partition index
/// has no master assigned (§4.4).
pub const PARTITION_NOT_EXISTENT: i32 = -1;

/// Per-node service port table: plaintext and TLS port for every service the
/// node hosts (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicePorts {
    plain: HashMap<ServiceType, u16>,
    tls: HashMap<ServiceType, u16>,
}

impl ServicePorts {
    pub fn set(&mut self, service: ServiceType, plain: Option<u16>, tls: Option<u16>) {
        if let Some(p) = plain {
            self.plain.insert(service, p);
        }
        if let Some(p) = tls {
            self.tls.insert(service, p);
        }
    }

    /// The service map to use for reconciliation: TLS ports when `use_tls`,
    /// plaintext otherwise (§4.7: `ni.sslServices()` vs `ni.services()`).
    pub fn active(&self, use_tls: bool) -> &HashMap<ServiceType, u16> {
        if use_tls {
            &self.tls
        } else {
            &self.plain
        }
    }

    /// The port for `service` under the requested transport, if the node
    /// hosts it at all.
    pub fn port_for(&self, service: ServiceType, use_tls: bool) -> Option<u16> {
        self.active(use_tls).get(&service).copied()
    }

    /// Whether the node hosts `service` under either transport.
    pub fn hosts(&self, service: ServiceType) -> bool {
        self.plain.contains_key(&service) || self.tls.contains_key(&service)
    }
}

/// One node as described by a bucket configuration (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub identifier: NodeIdentifier,
    pub ports: ServicePorts,
}

impl NodeInfo {
    pub fn new(identifier: NodeIdentifier) -> Self {
        Self { identifier, ports: ServicePorts::default() }
    }
}

/// For each of `P` partitions, the index into the bucket's node list holding
/// the master, and the indices holding replicas (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMap {
    pub masters: Vec<i32>,
    pub replicas: Vec<Vec<i32>>,
    /// Present only while a rebalance is moving partitions (§3, §9).
    pub fast_forward: Option<Box<PartitionMap>>,
}

impl PartitionMap {
    pub fn new(masters: Vec<i32>, replicas: Vec<Vec<i32>>) -> Self {
        Self { masters, replicas, fast_forward: None }
    }

    pub fn num_partitions(&self) -> usize {
        self.masters.len()
    }

    pub fn master_for(&self, partition: usize) -> i32 {
        self.masters.get(partition).copied().unwrap_or(PARTITION_NOT_EXISTENT)
    }

    pub fn replica_for(&self, partition: usize, replica_index: usize) -> i32 {
        self.replicas
            .get(partition)
            .and_then(|r| r.get(replica_index))
            .copied()
            .unwrap_or(PARTITION_NOT_EXISTENT)
    }
}

/// One bucket's topology (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub revision: i64,
    pub uuid: String,
    pub name: String,
    pub tainted: bool,
    pub bucket_type: BucketType,
    pub nodes: Vec<NodeInfo>,
    pub capabilities: Capabilities,
    pub partitions: Option<PartitionMap>,
}

impl BucketConfig {
    /// The node hosting the master of `partition`, respecting the
    /// fast-forward map when the caller opts in and one is present (§4.4).
    pub fn node_for_partition(&self, partition: usize, use_fast_forward: bool) -> Option<&NodeInfo> {
        let map = self.partitions.as_ref()?;
        let map = if use_fast_forward {
            map.fast_forward.as_deref().unwrap_or(map)
        } else {
            map
        };
        let idx = map.master_for(partition);
        self.node_at_index(idx)
    }

    pub fn node_for_replica(&self, partition: usize, replica: usize, use_fast_forward: bool) -> Option<&NodeInfo> {
        let map = self.partitions.as_ref()?;
        let map = if use_fast_forward {
            map.fast_forward.as_deref().unwrap_or(map)
        } else {
            map
        };
        let idx = map.replica_for(partition, replica);
        self.node_at_index(idx)
    }

    pub fn node_at_index(&self, index: i32) -> Option<&NodeInfo> {
        if index < 0 {
            return None;
        }
        self.nodes.get(index as usize)
    }

    pub fn number_of_partitions(&self) -> Option<usize> {
        self.partitions.as_ref().map(PartitionMap::num_partitions)
    }

    /// Hosts that appear as the master of at least one partition (§4.5).
    pub fn hosts_with_primary_partitions(&self) -> Vec<&str> {
        let Some(map) = self.partitions.as_ref() else { return Vec::new() };
        let mut hosts: Vec<&str> = map
            .masters
            .iter()
            .filter_map(|&idx| self.node_at_index(idx))
            .map(|n| n.identifier.host.as_str())
            .collect();
        hosts.sort_unstable();
        hosts.dedup();
        hosts
    }
}

/// A mapping from bucket name to bucket configuration (§3). Shared and
/// cheaply cloned: readers always see a consistent snapshot, matching §5's
/// "single volatile reference replaced wholesale".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterConfig {
    buckets: Arc<HashMap<String, BucketConfig>>,
}

impl ClusterConfig {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bucket(&self, name: &str) -> Option<&BucketConfig> {
        self.buckets.get(name)
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn buckets(&self) -> impl Iterator<Item = &BucketConfig> {
        self.buckets.values()
    }

    /// Returns a new `ClusterConfig` with `bucket`'s entry replaced (or
    /// inserted). The old snapshot is untouched (copy-on-write).
    pub fn with_bucket(&self, bucket: BucketConfig) -> Self {
        let mut map = (*self.buckets).clone();
        map.insert(bucket.name.clone(), bucket);
        Self { buckets: Arc::new(map) }
    }

    /// Returns a new `ClusterConfig` with `name`'s entry removed.
    pub fn without_bucket(&self, name: &str) -> Self {
        let mut map = (*self.buckets).clone();
        map.remove(name);
        Self { buckets: Arc::new(map) }
    }
}
