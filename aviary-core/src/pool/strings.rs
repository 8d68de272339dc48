//! Block-Based String Pool
//!
//! Interned text is copied into fixed-capacity byte blocks and referenced by
//! a [`StrSpan`] (block, offset, length). Like [`BlockPool`](super::BlockPool),
//! a block is never grown past its initial capacity, so interned text never
//! moves.
//!
//! ## Memory Layout
//!
//! ```text
//! blocks[0]: [hello][world][foo bar][  free  ]
//!             ^      ^      ^
//! spans:     (0,0,5)(0,5,5)(0,10,7)
//! blocks[1]: [ oversized string, exact-size block ]
//! blocks[2]: [baz][        free         ]   <- current
//! ```
//!
//! Strings longer than the block capacity get a dedicated block of exactly
//! their size; the current shared block stays current.

use aviary_types::StoreError;

/// Reference to a string stored in a [`StringStore`].
///
/// 12 bytes. The default span is the empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StrSpan {
    block: u32,
    offset: u32,
    len: u32,
}

impl StrSpan {
    /// Returns the byte length of the referenced string.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    /// Returns true for the empty string.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Storage for interned strings.
pub trait StringStore {
    /// Copies `s` into the store and returns a span for it.
    fn intern(&mut self, s: &str) -> Result<StrSpan, StoreError>;

    /// Returns the string behind `span`.
    ///
    /// A span that did not come from this store yields `""`.
    fn get(&self, span: StrSpan) -> &str;

    /// Number of strings stored.
    fn len(&self) -> usize;

    /// Returns true if no string is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of text stored.
    fn bytes_used(&self) -> usize;

    /// Number of blocks allocated.
    fn block_count(&self) -> usize;

    /// Drops every stored string.
    fn clear(&mut self);
}

/// Append-only string pool. Every call to `intern` stores a new copy.
pub struct StringPool {
    blocks: Vec<Vec<u8>>,
    block_capacity: usize,
    /// Block that small strings are appended to.
    current: Option<usize>,
    count: usize,
    bytes: usize,
}

impl StringPool {
    /// Creates an empty pool with blocks of `block_capacity` bytes.
    pub fn new(block_capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity: block_capacity.max(1),
            current: None,
            count: 0,
            bytes: 0,
        }
    }

    /// Bytes per shared block.
    #[inline(always)]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    fn new_block(&mut self, capacity: usize) -> Result<usize, StoreError> {
        let failure = StoreError::AllocationFailure {
            what: "string pool",
            bytes: capacity,
        };
        let mut block = Vec::new();
        block
            .try_reserve_exact(capacity)
            .map_err(|_| failure.clone())?;
        self.blocks.try_reserve(1).map_err(|_| failure)?;
        self.blocks.push(block);
        Ok(self.blocks.len() - 1)
    }

    /// Finds a block with room for `len` more bytes.
    fn block_for(&mut self, len: usize) -> Result<usize, StoreError> {
        if len > self.block_capacity {
            return self.new_block(len);
        }
        if let Some(b) = self.current {
            let block = &self.blocks[b];
            if block.capacity() - block.len() >= len {
                return Ok(b);
            }
        }
        let b = self.new_block(self.block_capacity)?;
        self.current = Some(b);
        Ok(b)
    }
}

impl StringStore for StringPool {
    fn intern(&mut self, s: &str) -> Result<StrSpan, StoreError> {
        let len = s.len();
        let overflow = |_| StoreError::AllocationFailure {
            what: "string pool",
            bytes: len,
        };
        let len32 = u32::try_from(len).map_err(overflow)?;

        if len == 0 {
            self.count += 1;
            return Ok(StrSpan::default());
        }

        let b = self.block_for(len)?;
        let block = &mut self.blocks[b];
        let offset = block.len();
        debug_assert!(block.capacity() - offset >= len);
        block.extend_from_slice(s.as_bytes());
        self.count += 1;
        self.bytes += len;

        Ok(StrSpan {
            block: u32::try_from(b).map_err(overflow)?,
            offset: u32::try_from(offset).map_err(overflow)?,
            len: len32,
        })
    }

    #[inline]
    fn get(&self, span: StrSpan) -> &str {
        let start = span.offset as usize;
        self.blocks
            .get(span.block as usize)
            .and_then(|block| block.get(start..start + span.len()))
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    fn bytes_used(&self) -> usize {
        self.bytes
    }

    #[inline(always)]
    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn clear(&mut self) {
        self.blocks.clear();
        self.current = None;
        self.count = 0;
        self.bytes = 0;
    }
}

impl Clone for StringPool {
    /// Deep copy that keeps every block's original capacity.
    fn clone(&self) -> Self {
        let blocks = self
            .blocks
            .iter()
            .map(|block| {
                let mut copy = Vec::with_capacity(block.capacity());
                copy.extend_from_slice(block);
                copy
            })
            .collect();

        Self {
            blocks,
            block_capacity: self.block_capacity,
            current: self.current,
            count: self.count,
            bytes: self.bytes,
        }
    }
}

impl core::fmt::Debug for StringPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StringPool")
            .field("strings", &self.count)
            .field("bytes", &self.bytes)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}
