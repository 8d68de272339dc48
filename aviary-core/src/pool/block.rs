//! Fixed-Capacity Block Pool
//!
//! Stores elements in a list of blocks whose capacity is reserved once, up
//! front, and never exceeded. A full block is left alone and a new one is
//! started, so an element never moves once it has been written.
//!
//! ## Memory Layout
//!
//! ```text
//! blocks[0]: [e0][e1][e2][e3]   (full)
//! blocks[1]: [e4][e5][e6][e7]   (full)
//! blocks[2]: [e8][e9][    ][  ] (fill cursor = blocks[2].len())
//!             ^
//! SlotId(8) = block 8 / 4, offset 8 % 4
//! ```
//!
//! ## Performance
//!
//! - Allocation: O(1), one reservation per `block_capacity` elements
//! - Retrieval: O(1), a division and two indexings
//! - Iteration: sequential within a block

use core::ops::ControlFlow;

use aviary_types::StoreError;

/// Position of an element in a [`BlockPool`].
///
/// Slots are numbered globally in insertion order. Only the last block is
/// ever partially filled, so the slot number of the n-th element is `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a slot identifier from a raw slot number.
    #[inline(always)]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw slot number.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A growable pool of non-relocating elements.
pub struct BlockPool<T> {
    blocks: Vec<Vec<T>>,
    block_capacity: usize,
    len: usize,
    what: &'static str,
}

impl<T> BlockPool<T> {
    /// Creates an empty pool. No memory is reserved until the first push.
    ///
    /// `what` names the pool in allocation errors. A capacity of zero is
    /// treated as one.
    pub fn new(what: &'static str, block_capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity: block_capacity.max(1),
            len: 0,
            what,
        }
    }

    /// Number of elements stored.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the pool holds no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks allocated so far.
    #[inline(always)]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Elements per block.
    #[inline(always)]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Bytes reserved by all blocks, used or not.
    pub fn bytes_reserved(&self) -> usize {
        self.blocks.len() * self.block_capacity * size_of::<T>()
    }

    /// Returns the index of the block that the next element goes into,
    /// starting a new block if the current one is full.
    fn writable_block(&mut self) -> Result<usize, StoreError> {
        let needs_block = self
            .blocks
            .last()
            .map_or(true, |block| block.len() == self.block_capacity);

        if needs_block {
            let failure = StoreError::AllocationFailure {
                what: self.what,
                bytes: self.block_capacity * size_of::<T>(),
            };
            let mut block = Vec::new();
            block
                .try_reserve_exact(self.block_capacity)
                .map_err(|_| failure.clone())?;
            self.blocks.try_reserve(1).map_err(|_| failure)?;
            self.blocks.push(block);
        }
        Ok(self.blocks.len() - 1)
    }

    /// Moves `item` into the pool and returns its slot.
    #[inline]
    pub fn push(&mut self, item: T) -> Result<SlotId, StoreError> {
        self.push_mut(item).map(|(slot, _)| slot)
    }

    /// Moves `item` into the pool and returns its slot together with a
    /// mutable reference to the stored element.
    pub fn push_mut(&mut self, item: T) -> Result<(SlotId, &mut T), StoreError> {
        let slot = SlotId(u32::try_from(self.len).map_err(|_| StoreError::AllocationFailure {
            what: self.what,
            bytes: size_of::<T>(),
        })?);
        let b = self.writable_block()?;
        self.len += 1;

        let block = &mut self.blocks[b];
        debug_assert!(block.len() < block.capacity());
        block.push(item);
        let offset = block.len() - 1;
        Ok((slot, &mut block[offset]))
    }

    /// Returns the element at `slot`.
    #[inline(always)]
    pub fn get(&self, slot: SlotId) -> Option<&T> {
        let i = slot.index();
        self.blocks
            .get(i / self.block_capacity)?
            .get(i % self.block_capacity)
    }

    /// Returns the element at `slot` mutably.
    #[inline(always)]
    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut T> {
        let i = slot.index();
        self.blocks
            .get_mut(i / self.block_capacity)?
            .get_mut(i % self.block_capacity)
    }

    /// Iterates over all elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flatten()
    }

    /// Iterates over all elements together with their slots.
    pub fn iter_slots(&self) -> impl Iterator<Item = (SlotId, &T)> + '_ {
        self.iter()
            .enumerate()
            .map(|(i, item)| (SlotId(i as u32), item))
    }

    /// Calls `f` on every element in insertion order until it breaks.
    pub fn visit<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(SlotId, &T) -> ControlFlow<B>,
    {
        for (slot, item) in self.iter_slots() {
            f(slot, item)?;
        }
        ControlFlow::Continue(())
    }

    /// Drops every element and every block.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }
}

impl<T: Default> BlockPool<T> {
    /// Allocates a default-initialized element.
    pub fn alloc(&mut self) -> Result<(SlotId, &mut T), StoreError> {
        self.push_mut(T::default())
    }
}

impl<T: Clone> Clone for BlockPool<T> {
    /// Deep copy. Each copied block gets the full block capacity, so the copy
    /// keeps the non-relocation guarantee when it grows.
    fn clone(&self) -> Self {
        let blocks = self
            .blocks
            .iter()
            .map(|block| {
                let mut copy = Vec::with_capacity(self.block_capacity);
                copy.extend_from_slice(block);
                copy
            })
            .collect();

        Self {
            blocks,
            block_capacity: self.block_capacity,
            len: self.len,
            what: self.what,
        }
    }
}

impl<T> core::fmt::Debug for BlockPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlockPool")
            .field("what", &self.what)
            .field("len", &self.len)
            .field("blocks", &self.blocks.len())
            .field("block_capacity", &self.block_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut pool = BlockPool::new("test", 3);
        let slots: Vec<_> = (0..10).map(|i| pool.push(i * 10).unwrap()).collect();

        assert_eq!(pool.len(), 10);
        assert_eq!(pool.block_count(), 4);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(pool.get(*slot), Some(&(i * 10)));
        }
        assert_eq!(pool.get(SlotId::new(10)), None);
    }

    #[test]
    fn no_block_until_first_push() {
        let mut pool: BlockPool<u64> = BlockPool::new("test", 16);
        assert_eq!(pool.block_count(), 0);
        assert!(pool.is_empty());
        pool.push(1).unwrap();
        assert_eq!(pool.block_count(), 1);
        assert_eq!(pool.bytes_reserved(), 16 * 8);
    }

    #[test]
    fn elements_never_move() {
        let mut pool = BlockPool::new("test", 4);
        let first = pool.push(String::from("first")).unwrap();
        let addr = pool.get(first).unwrap() as *const String;

        for i in 0..1000 {
            pool.push(i.to_string()).unwrap();
        }
        assert_eq!(pool.get(first).unwrap() as *const String, addr);
        assert_eq!(pool.get(first).unwrap(), "first");
    }

    #[test]
    fn alloc_and_mutate() {
        let mut pool: BlockPool<(u32, u32)> = BlockPool::new("test", 2);
        let (slot, item) = pool.alloc().unwrap();
        assert_eq!(*item, (0, 0));
        item.0 = 7;
        pool.get_mut(slot).unwrap().1 = 9;
        assert_eq!(pool.get(slot), Some(&(7, 9)));
    }

    #[test]
    fn iteration_is_insertion_order() {
        let mut pool = BlockPool::new("test", 3);
        for i in 0..8u32 {
            pool.push(i).unwrap();
        }
        let items: Vec<u32> = pool.iter().copied().collect();
        assert_eq!(items, (0..8).collect::<Vec<_>>());

        let slots: Vec<usize> = pool.iter_slots().map(|(s, _)| s.index()).collect();
        assert_eq!(slots, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn visit_stops_early() {
        let mut pool = BlockPool::new("test", 2);
        for i in 0..10u32 {
            pool.push(i).unwrap();
        }
        let mut seen = 0;
        let result = pool.visit(|_, &item| {
            seen += 1;
            if item == 4 {
                ControlFlow::Break(item)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result, ControlFlow::Break(4));
        assert_eq!(seen, 5);
    }

    #[test]
    fn clear_resets() {
        let mut pool = BlockPool::new("test", 2);
        for i in 0..5u8 {
            pool.push(i).unwrap();
        }
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.push(42).unwrap().index(), 0);
    }

    #[test]
    fn clone_keeps_block_capacity() {
        let mut pool = BlockPool::new("test", 8);
        for i in 0..3u32 {
            pool.push(i).unwrap();
        }
        let mut copy = pool.clone();
        let slot = SlotId::new(0);
        let addr = copy.get(slot).unwrap() as *const u32;
        for i in 3..8u32 {
            copy.push(i).unwrap();
        }
        assert_eq!(copy.block_count(), 1);
        assert_eq!(copy.get(slot).unwrap() as *const u32, addr);
        assert_eq!(pool.len(), 3);
        assert_eq!(copy.len(), 8);
    }

    #[test]
    fn zero_capacity_is_one() {
        let mut pool = BlockPool::new("test", 0);
        pool.push('a').unwrap();
        pool.push('b').unwrap();
        assert_eq!(pool.block_capacity(), 1);
        assert_eq!(pool.block_count(), 2);
    }
}
