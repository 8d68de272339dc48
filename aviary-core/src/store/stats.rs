//! Statistics and StoreStats.

use super::manager::{Entity, EntityManager};
use super::Database;
use crate::pool::{RelationNode, StringStore};

/// A snapshot of store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Valid users.
    pub users: usize,
    /// Valid flights.
    pub flights: usize,
    /// Valid reservations.
    pub reservations: usize,
    /// Slots held by entities that were replaced or failed to commit.
    pub invalid_slots: usize,
    /// Nodes across all relation lists.
    pub relation_nodes: usize,
    /// Strings held by all string stores.
    pub strings: usize,
    /// Bytes of text held by all string stores.
    pub string_bytes: usize,
    /// Blocks allocated by every pool.
    pub blocks: usize,
    /// Bytes reserved by entity pools.
    pub entity_bytes: usize,
}

impl StoreStats {
    fn add_manager<E: Entity>(&mut self, manager: &EntityManager<E>) {
        let strings = manager.strings();
        self.invalid_slots += manager.slots() - manager.len();
        self.strings += strings.len();
        self.string_bytes += strings.bytes_used();
        self.blocks += manager.pool().block_count() + strings.block_count();
        self.entity_bytes += manager.pool().bytes_reserved();
    }

    /// Returns approximate memory usage in bytes.
    pub fn memory_usage_bytes(&self) -> usize {
        self.entity_bytes + self.string_bytes + self.relation_nodes * size_of::<RelationNode>()
    }
}

impl Database {
    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            users: self.users.len(),
            flights: self.flights.len(),
            reservations: self.reservations.len(),
            relation_nodes: self.users.relations().node_count(),
            blocks: self.users.relations().block_count(),
            ..StoreStats::default()
        };
        stats.add_manager(self.users.entities());
        stats.add_manager(self.flights.entities());
        stats.add_manager(self.reservations.entities());
        stats
    }
}

impl core::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} users, {} flights, {} reservations, {} relations",
            self.users, self.flights, self.reservations, self.relation_nodes
        )?;
        write!(
            f,
            ", {} strings ({} bytes), {} blocks",
            self.strings, self.string_bytes, self.blocks
        )?;
        if self.invalid_slots > 0 {
            write!(f, ", {} invalid slots", self.invalid_slots)?;
        }
        Ok(())
    }
}
