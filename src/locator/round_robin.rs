//! Round-robin locator (C5, §4.4): spreads requests for a cluster-scoped
//! service (query, search, analytics, views) evenly across the nodes that
//! host it.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::NodeInfo;
use crate::types::{NodeIdentifier, ServiceType};

#[derive(Debug, Default)]
pub struct RoundRobinLocator {
    counter: AtomicUsize,
}

impl RoundRobinLocator {
    pub fn new() -> Self {
        Self { counter: AtomicUsize::new(0) }
    }

    pub fn locate(&self, nodes: &[NodeInfo], service: ServiceType) -> Option<NodeIdentifier> {
        let candidates: Vec<&NodeInfo> = nodes.iter().filter(|n| n.ports.hosts(service)).collect();
        if candidates.is_empty() {
            return None;
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Some(candidates[index].identifier.clone())
    }
}
