// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Per-thread connection storage.

Edges are appended to the shard of the thread that owns the target node.
`delay` and `weight` are `Option<f64>`: `None` means the synapse model's
default applies and the value is resolved by the simulation engine, not
stored per edge.
*/

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::values::AttrValue;
use crate::{NodeId, SynapseModelId};

/// Attribute dictionary attached to one edge.
pub type SynapseAttrs = AHashMap<String, AttrValue>;

/// One materialized synaptic edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub thread: usize,
    pub model: SynapseModelId,
    pub delay: Option<f64>,
    pub weight: Option<f64>,
    pub attrs: SynapseAttrs,
}

/// Connection table sharded by worker thread.
pub struct ConnectionTable {
    shards: Vec<Mutex<Vec<Edge>>>,
}

impl ConnectionTable {
    pub(crate) fn new(num_threads: usize) -> Self {
        Self {
            shards: (0..num_threads).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    /// Append one edge on the given thread's shard.
    #[allow(clippy::too_many_arguments)]
    pub fn connect(
        &self,
        source: NodeId,
        target: NodeId,
        thread: usize,
        model: SynapseModelId,
        attrs: SynapseAttrs,
        delay: Option<f64>,
        weight: Option<f64>,
    ) {
        self.shards[thread].lock().push(Edge {
            source,
            target,
            thread,
            model,
            delay,
            weight,
            attrs,
        });
    }

    /// Remove one edge matching (source, target, model) on the thread's
    /// shard. Returns whether an edge was removed.
    pub fn disconnect(
        &self,
        source: NodeId,
        target: NodeId,
        thread: usize,
        model: SynapseModelId,
    ) -> bool {
        let mut shard = self.shards[thread].lock();
        if let Some(pos) = shard
            .iter()
            .position(|e| e.source == source && e.target == target && e.model == model)
        {
            shard.remove(pos);
            true
        } else {
            false
        }
    }

    /// Total edge count across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all edges, shard by shard.
    pub fn edges(&self) -> Vec<Edge> {
        let mut all = Vec::with_capacity(self.len());
        for shard in &self.shards {
            all.extend(shard.lock().iter().cloned());
        }
        all
    }

    pub fn edges_on_thread(&self, thread: usize) -> Vec<Edge> {
        self.shards[thread].lock().clone()
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_disconnect() {
        let table = ConnectionTable::new(2);
        table.connect(1, 2, 0, 0, SynapseAttrs::new(), None, Some(0.5));
        table.connect(1, 3, 1, 0, SynapseAttrs::new(), Some(1.5), None);
        assert_eq!(table.len(), 2);

        assert!(table.disconnect(1, 2, 0, 0));
        assert!(!table.disconnect(1, 2, 0, 0));
        assert_eq!(table.len(), 1);

        let edges = table.edges();
        assert_eq!(edges[0].target, 3);
        assert_eq!(edges[0].delay, Some(1.5));
        assert_eq!(edges[0].weight, None);
    }

    #[test]
    fn test_shard_isolation() {
        let table = ConnectionTable::new(2);
        table.connect(1, 2, 1, 0, SynapseAttrs::new(), None, None);
        assert!(table.edges_on_thread(0).is_empty());
        assert_eq!(table.edges_on_thread(1).len(), 1);
    }
}
