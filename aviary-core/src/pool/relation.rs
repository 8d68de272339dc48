//! Relation lists.
//!
//! A relation list is a singly linked list of identifiers whose nodes live in
//! a shared [`RelationPool`]. Links are slot numbers, not pointers, so cloning
//! the pool clones every list with it and no link needs fixing.

use aviary_types::StoreError;

use super::block::{BlockPool, SlotId};

/// One link of a relation list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelationNode {
    value: u64,
    next: Option<SlotId>,
}

/// Head of a relation list. The default is the empty list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelationList {
    head: Option<SlotId>,
}

impl RelationList {
    /// Returns true if nothing has been added to the list.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.head.is_none()
    }
}

/// Storage for the nodes of many relation lists.
#[derive(Clone, Debug)]
pub struct RelationPool {
    nodes: BlockPool<RelationNode>,
}

impl RelationPool {
    /// Creates an empty pool with `block_capacity` nodes per block.
    pub fn new(block_capacity: usize) -> Self {
        Self {
            nodes: BlockPool::new("relation nodes", block_capacity),
        }
    }

    /// Adds `value` to the front of `list`. O(1).
    pub fn prepend(&mut self, list: &mut RelationList, value: u64) -> Result<(), StoreError> {
        let slot = self.nodes.push(RelationNode {
            value,
            next: list.head,
        })?;
        list.head = Some(slot);
        Ok(())
    }

    /// Iterates over `list`, most recently added first.
    pub fn iter(&self, list: RelationList) -> Relations<'_> {
        Relations {
            nodes: &self.nodes,
            next: list.head,
        }
    }

    /// Counts the elements of `list`. O(n), the length is not cached.
    pub fn len(&self, list: RelationList) -> usize {
        self.iter(list).count()
    }

    /// Total number of nodes across all lists.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of node blocks allocated.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.nodes.block_count()
    }

    /// Drops every node. Existing list heads must not be used afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Iterator over one relation list.
#[derive(Clone)]
pub struct Relations<'a> {
    nodes: &'a BlockPool<RelationNode>,
    next: Option<SlotId>,
}

impl Iterator for Relations<'_> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        let node = self.nodes.get(self.next?)?;
        self.next = node.next;
        Some(node.value)
    }
}
