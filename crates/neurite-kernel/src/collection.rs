// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Node collections.

An ordered, finite sequence of unique node identifiers with constant-time
index lookup in both directions. Collections are immutable for the duration
of a build; the builder swaps whole collections when it symmetrizes.
*/

use ahash::AHashMap;

use crate::NodeId;

/// Ordered set of node identifiers.
#[derive(Debug, Clone)]
pub struct NodeCollection {
    ids: Vec<NodeId>,
    index: AHashMap<NodeId, usize>,
    contiguous: bool,
}

impl NodeCollection {
    /// Build a collection from an explicit id list.
    ///
    /// Ids must be unique; duplicate entries indicate a caller bug.
    pub fn new(ids: Vec<NodeId>) -> Self {
        let mut index = AHashMap::with_capacity(ids.len());
        for (lid, &id) in ids.iter().enumerate() {
            let previous = index.insert(id, lid);
            assert!(previous.is_none(), "node collections hold unique ids");
        }
        let contiguous = ids.windows(2).all(|w| w[1] == w[0] + 1);
        Self {
            ids,
            index,
            contiguous,
        }
    }

    /// Collection covering the inclusive id range `first..=last`.
    pub fn from_range(first: NodeId, last: NodeId) -> Self {
        Self::new((first..=last).collect())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Node id at local index `lid`.
    pub fn get(&self, lid: usize) -> NodeId {
        self.ids[lid]
    }

    /// Local index of `id` within this collection.
    pub fn get_lid(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// True when the ids form an ascending contiguous range.
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// Whether this collection shares any node with `other`.
    pub fn overlaps(&self, other: &NodeCollection) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().any(|id| large.contains(id))
    }
}

impl PartialEq for NodeCollection {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
    }
}

impl Eq for NodeCollection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_collection_is_contiguous() {
        let c = NodeCollection::from_range(3, 7);
        assert_eq!(c.len(), 5);
        assert!(c.is_contiguous());
        assert_eq!(c.get(0), 3);
        assert_eq!(c.get_lid(7), Some(4));
        assert_eq!(c.get_lid(8), None);
    }

    #[test]
    fn test_explicit_collection_lookup() {
        let c = NodeCollection::new(vec![10, 4, 8]);
        assert!(!c.is_contiguous());
        assert_eq!(c.get_lid(4), Some(1));
        assert!(c.contains(8));
        assert!(!c.contains(5));
    }

    #[test]
    fn test_overlap() {
        let a = NodeCollection::from_range(1, 5);
        let b = NodeCollection::from_range(5, 9);
        let c = NodeCollection::from_range(6, 9);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    #[should_panic]
    fn test_duplicate_ids_rejected() {
        NodeCollection::new(vec![1, 2, 2]);
    }
}
