// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Node registry and locality service.

Every rank knows the full id space but materializes only the nodes owned by
its own virtual processes; all other nodes are proxies. Devices are
proxyless nodes: they carry no network-transparent identity and certain
connection rules refuse to target them.

The registry also hosts the synaptic-element counters used by structural
plasticity. Counters are sharded by owning thread; each shard is only ever
mutated by its own worker thread during a build, the lock exists for the
benefit of inspection from the caller's thread.
*/

use ahash::{AHashMap, AHashSet};
use parking_lot::Mutex;

use crate::collection::NodeCollection;
use crate::topology::VpTopology;
use crate::NodeId;

/// Resolved view of a node from the perspective of one worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHandle {
    /// The node is owned by the querying thread.
    Local(LocalNode),
    /// The node lives on another thread or rank.
    Proxy(NodeId),
}

/// A node owned by the current worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalNode {
    pub id: NodeId,
    /// False for devices, which cannot be targeted by proxy-requiring rules.
    pub has_proxies: bool,
}

impl NodeHandle {
    pub fn is_proxy(&self) -> bool {
        matches!(self, NodeHandle::Proxy(_))
    }

    pub fn local(&self) -> Option<LocalNode> {
        match self {
            NodeHandle::Local(n) => Some(*n),
            NodeHandle::Proxy(_) => None,
        }
    }
}

/// Registry of all nodes known to this rank.
pub struct NodeSpace {
    topology: VpTopology,
    next_id: NodeId,
    devices: AHashSet<NodeId>,
    /// name -> connected-element count, per node, sharded by owning thread.
    elements: Vec<Mutex<AHashMap<NodeId, AHashMap<String, i64>>>>,
}

impl NodeSpace {
    pub(crate) fn new(topology: VpTopology) -> Self {
        let shards = (0..topology.num_threads()).map(|_| Mutex::new(AHashMap::new())).collect();
        Self {
            topology,
            next_id: 1,
            devices: AHashSet::new(),
            elements: shards,
        }
    }

    /// Total number of nodes in the simulation.
    pub fn size(&self) -> usize {
        (self.next_id - 1) as usize
    }

    /// Create `n` neurons and return them as a collection.
    pub(crate) fn create_nodes(&mut self, n: usize) -> NodeCollection {
        let first = self.next_id;
        self.next_id += n as NodeId;
        NodeCollection::from_range(first, self.next_id - 1)
    }

    /// Create one proxyless device node.
    pub(crate) fn create_device(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.devices.insert(id);
        id
    }

    pub fn is_device(&self, id: NodeId) -> bool {
        self.devices.contains(&id)
    }

    /// Whether the node lives on this rank.
    pub fn is_local(&self, id: NodeId) -> bool {
        self.topology.is_local_node(id)
    }

    /// Owning thread of the node, if it lives on this rank.
    pub fn owner_thread(&self, id: NodeId) -> Option<usize> {
        self.topology.node_owner_thread(id)
    }

    /// Resolve a node as seen from worker thread `thread`.
    pub fn get(&self, id: NodeId, thread: usize) -> NodeHandle {
        debug_assert!(id >= 1 && id < self.next_id, "unknown node id {id}");
        if self.owner_thread(id) == Some(thread) {
            NodeHandle::Local(LocalNode {
                id,
                has_proxies: !self.devices.contains(&id),
            })
        } else {
            NodeHandle::Proxy(id)
        }
    }

    /// All nodes owned by worker thread `thread`, in ascending id order.
    pub fn local_nodes(&self, thread: usize) -> Vec<LocalNode> {
        (1..self.next_id)
            .filter(|&id| self.owner_thread(id) == Some(thread))
            .map(|id| LocalNode {
                id,
                has_proxies: !self.devices.contains(&id),
            })
            .collect()
    }

    /// Adjust the connected-element count `name` of a node.
    ///
    /// Must only be called for nodes owned by the current rank; the counter
    /// lives in the shard of the owning thread.
    pub fn connect_synaptic_element(&self, id: NodeId, name: &str, delta: i64) {
        let thread = self
            .owner_thread(id)
            .expect("synaptic elements are only tracked for rank-local nodes");
        let mut shard = self.elements[thread].lock();
        let counts = shard.entry(id).or_default();
        *counts.entry(name.to_string()).or_insert(0) += delta;
    }

    /// Connected-element count `name` of a node, zero if never touched.
    pub fn synaptic_element_count(&self, id: NodeId, name: &str) -> i64 {
        let Some(thread) = self.owner_thread(id) else {
            return 0;
        };
        let shard = self.elements[thread].lock();
        shard.get(&id).and_then(|c| c.get(name)).copied().unwrap_or(0)
    }
}
