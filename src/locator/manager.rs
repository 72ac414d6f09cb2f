//! Manager-service locator (C5, §4.4): cluster-scoped requests land on any
//! node hosting the manager service, picked deterministically so repeated
//! calls with an unchanged topology land on the same node.

use crate::config::NodeInfo;
use crate::types::{NodeIdentifier, ServiceType};

#[derive(Debug, Default, Clone, Copy)]
pub struct ManagerLocator;

impl ManagerLocator {
    /// The lowest-sorted identifier among nodes hosting the manager
    /// service (§4.4).
    pub fn locate(&self, nodes: &[NodeInfo]) -> Option<NodeIdentifier> {
        nodes.iter().filter(|n| n.ports.hosts(ServiceType::Manager)).map(|n| n.identifier.clone()).min()
    }
}
