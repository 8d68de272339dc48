use std::collections::BTreeMap;

use aviary_types::Date;

use super::{EntitySummary, Query, QueryType, TopDelayedAirports, UsersByNamePrefix};

/// Query types by identifier.
#[derive(Default)]
pub struct QueryRegistry {
    types: BTreeMap<u8, Box<dyn QueryType>>,
}

impl QueryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in query types. `today` is the date ages are
    /// computed against.
    pub fn with_defaults(today: Date) -> Self {
        let mut registry = Self::new();
        registry.register(1, EntitySummary::new(today));
        registry.register(7, TopDelayedAirports);
        registry.register(9, UsersByNamePrefix);
        registry
    }

    /// Registers `query` under `id`, replacing any previous type with that
    /// identifier.
    pub fn register<Q: Query>(&mut self, id: u8, query: Q) -> &mut Self {
        self.types.insert(id, Box::new(query));
        self
    }

    /// The query type registered under `id`.
    pub fn get(&self, id: u8) -> Option<&dyn QueryType> {
        self.types.get(&id).map(|q| &**q)
    }

    /// Registered identifiers, ascending.
    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.types.keys().copied()
    }

    /// Number of registered query types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl core::fmt::Debug for QueryRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let registry = QueryRegistry::with_defaults(Date::MIN);
        assert_eq!(registry.ids().collect::<Vec<_>>(), [1, 7, 9]);
        assert!(registry.get(7).is_some());
        assert!(registry.get(2).is_none());
        assert_eq!(format!("{registry:?}"), "{1, 7, 9}");
    }

    #[test]
    fn register_replaces() {
        let mut registry = QueryRegistry::new();
        assert!(registry.is_empty());
        registry.register(3, TopDelayedAirports).register(3, UsersByNamePrefix);
        assert_eq!(registry.len(), 1);
    }
}
