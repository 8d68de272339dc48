//! Generic indexed entity storage.
//!
//! An [`EntityManager`] owns a [`BlockPool`] of entities, the string store
//! their text fields point into, and a hash index from identifier to slot.
//! Users, flights and reservations are all stored this way and only differ
//! in their [`Entity`] and [`Draft`] implementations.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::{ControlFlow, Deref};

use aviary_types::StoreError;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use tracing::warn;

use crate::pool::{BlockPool, SlotId, StrSpan, StringStore};

/// A record type that can live in an [`EntityManager`].
pub trait Entity: Clone {
    /// Identifier type, looked up by reference.
    type Id: ?Sized + Hash + Eq + fmt::Display;

    /// String store the entity's spans point into.
    type Strings: StringStore + Clone;

    /// Name used in diagnostics (`user`, `flight`, ...).
    const KIND: &'static str;

    /// Returns the identifier of this entity.
    fn key<'a>(&'a self, strings: &'a Self::Strings) -> &'a Self::Id;

    /// Returns false once the entity has been invalidated.
    fn is_valid(&self) -> bool;

    /// Marks the entity as dead. It stays in the pool but is skipped by
    /// lookups and iteration.
    fn invalidate(&mut self);
}

/// Parsed field values waiting to be committed to a manager.
///
/// Text lives in the draft until [`Draft::intern`] copies it into the
/// manager's string store.
pub trait Draft {
    /// The entity this draft becomes.
    type Entity: Entity;

    /// Builds the entity with its scalar fields filled in and empty spans.
    fn skeleton(&self) -> Self::Entity;

    /// Interns the draft's text and points the entity's spans at it.
    fn intern(
        &self,
        entity: &mut Self::Entity,
        strings: &mut <Self::Entity as Entity>::Strings,
    ) -> Result<(), StoreError>;
}

/// Borrowed view of a stored entity together with its string store.
pub struct EntityRef<'a, E: Entity> {
    slot: SlotId,
    entity: &'a E,
    strings: &'a E::Strings,
}

impl<'a, E: Entity> EntityRef<'a, E> {
    /// Slot the entity occupies.
    #[inline(always)]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// The entity itself, with the full borrow lifetime.
    #[inline(always)]
    pub fn entity(&self) -> &'a E {
        self.entity
    }

    /// Resolves one of the entity's spans.
    #[inline(always)]
    pub fn text(&self, span: StrSpan) -> &'a str {
        self.strings.get(span)
    }

    /// Identifier of the entity.
    #[inline(always)]
    pub fn key(&self) -> &'a E::Id {
        self.entity.key(self.strings)
    }
}

impl<E: Entity> Clone for EntityRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Entity> Copy for EntityRef<'_, E> {}

impl<E: Entity> Deref for EntityRef<'_, E> {
    type Target = E;

    #[inline(always)]
    fn deref(&self) -> &E {
        self.entity
    }
}

impl<E: Entity + fmt::Debug> fmt::Debug for EntityRef<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("slot", &self.slot)
            .field("entity", self.entity)
            .finish()
    }
}

/// Pool-backed storage with an identifier index.
///
/// Identifiers are unique. Adding an entity whose identifier is already
/// present replaces the index entry; the previous entity stays in its slot,
/// invalidated.
#[derive(Clone)]
pub struct EntityManager<E: Entity> {
    pool: BlockPool<E>,
    strings: E::Strings,
    index: FxHashMap<u64, SmallVec<[SlotId; 1]>>,
    valid: usize,
}

#[inline(always)]
fn hash_key<K: ?Sized + Hash>(key: &K) -> u64 {
    FxBuildHasher.hash_one(key)
}

impl<E: Entity> EntityManager<E> {
    /// Creates an empty manager. Nothing is allocated until the first add.
    pub fn new(block_capacity: usize, strings: E::Strings) -> Self {
        Self {
            pool: BlockPool::new(E::KIND, block_capacity),
            strings,
            index: FxHashMap::default(),
            valid: 0,
        }
    }

    /// Number of valid entities.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.valid
    }

    /// Returns true if there is no valid entity.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    /// Number of occupied slots, invalidated entities included.
    #[inline(always)]
    pub fn slots(&self) -> usize {
        self.pool.len()
    }

    /// The underlying entity pool.
    #[inline(always)]
    pub fn pool(&self) -> &BlockPool<E> {
        &self.pool
    }

    /// The string store entity spans point into.
    #[inline(always)]
    pub fn strings(&self) -> &E::Strings {
        &self.strings
    }

    /// Copies a draft into the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AllocationFailure`] if the pool, the string
    /// store or the index cannot grow. When that happens after the entity was
    /// copied into the pool, the copy is invalidated in place.
    pub fn add<D>(&mut self, draft: &D) -> Result<SlotId, StoreError>
    where
        D: Draft<Entity = E>,
    {
        let (slot, entity) = self.pool.push_mut(draft.skeleton())?;
        if let Err(err) = draft.intern(entity, &mut self.strings) {
            entity.invalidate();
            return Err(err);
        }
        let hash = hash_key(entity.key(&self.strings));

        if self.index.try_reserve(1).is_err() {
            entity.invalidate();
            return Err(StoreError::AllocationFailure {
                what: "entity index",
                bytes: size_of::<(u64, SmallVec<[SlotId; 1]>)>(),
            });
        }

        let duplicate = self
            .index
            .get(&hash)
            .and_then(|bucket| bucket.iter().position(|&s| self.same_key(s, slot)));

        let bucket = self.index.entry(hash).or_default();
        match duplicate {
            Some(pos) => {
                let old = core::mem::replace(&mut bucket[pos], slot);
                if let Some(previous) = self.pool.get_mut(old) {
                    previous.invalidate();
                }
                if let Some(current) = self.pool.get(slot) {
                    warn!(
                        kind = E::KIND,
                        id = %current.key(&self.strings),
                        "repeated identifier, replacing previous entity"
                    );
                }
            }
            None => {
                bucket.push(slot);
                self.valid += 1;
            }
        }
        Ok(slot)
    }

    fn same_key(&self, a: SlotId, b: SlotId) -> bool {
        match (self.pool.get(a), self.pool.get(b)) {
            (Some(x), Some(y)) => x.key(&self.strings) == y.key(&self.strings),
            _ => false,
        }
    }

    /// Returns the slot of the valid entity with identifier `id`.
    pub fn slot_of(&self, id: &E::Id) -> Option<SlotId> {
        self.index.get(&hash_key(id))?.iter().copied().find(|&slot| {
            self.pool
                .get(slot)
                .is_some_and(|e| e.is_valid() && e.key(&self.strings) == id)
        })
    }

    /// Looks up an entity by identifier. O(1) expected.
    pub fn get_by_id(&self, id: &E::Id) -> Option<EntityRef<'_, E>> {
        self.slot_of(id).and_then(|slot| self.get(slot))
    }

    /// Looks up an entity by identifier for modification.
    pub fn get_by_id_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        let slot = self.slot_of(id)?;
        self.pool.get_mut(slot)
    }

    /// Returns the valid entity at `slot`.
    pub fn get(&self, slot: SlotId) -> Option<EntityRef<'_, E>> {
        let entity = self.pool.get(slot).filter(|e| e.is_valid())?;
        Some(EntityRef {
            slot,
            entity,
            strings: &self.strings,
        })
    }

    /// Iterates over valid entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityRef<'_, E>> + '_ {
        self.pool
            .iter_slots()
            .filter(|(_, e)| e.is_valid())
            .map(move |(slot, entity)| EntityRef {
                slot,
                entity,
                strings: &self.strings,
            })
    }

    /// Calls `f` on every valid entity in insertion order until it breaks.
    pub fn visit<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(EntityRef<'_, E>) -> ControlFlow<B>,
    {
        self.pool.visit(|slot, entity| {
            if !entity.is_valid() {
                return ControlFlow::Continue(());
            }
            f(EntityRef {
                slot,
                entity,
                strings: &self.strings,
            })
        })
    }

    /// Drops every entity and string and empties the index.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.strings.clear();
        self.index.clear();
        self.valid = 0;
    }
}

impl<E: Entity> fmt::Debug for EntityManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("kind", &E::KIND)
            .field("valid", &self.valid)
            .field("slots", &self.pool.len())
            .field("strings", &self.strings.len())
            .finish()
    }
}
