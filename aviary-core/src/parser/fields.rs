//! Field Splitter
//!
//! Splits one record into its fields on a single-byte delimiter. Fields are
//! slices of the record, nothing is copied:
//!
//! ```ignore
//! "U1;Ana;;PT"  ->  ["U1", "Ana", "", "PT"]
//! ```
//!
//! Unlike a word tokenizer, empty fields are significant: `n` delimiters
//! always produce `n + 1` fields, and their positions decide which validator
//! runs on them.
//!
//! ## The Delimiter Contract
//!
//! The delimiter must be an ASCII byte. ASCII bytes never occur inside a
//! multi-byte UTF-8 sequence, so every split point is a char boundary.

use memchr::memchr_iter;
use smallvec::SmallVec;

/// Fields kept inline before spilling to the heap. Covers every dataset kind.
pub const INLINE_FIELDS: usize = 16;

/// The fields of one record, in order.
pub type Fields<'r> = SmallVec<[&'r str; INLINE_FIELDS]>;

/// Splits records on a fixed ASCII delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct FieldSplitter {
    delimiter: u8,
}

impl FieldSplitter {
    /// Creates a splitter for `delimiter`, which must be ASCII.
    #[inline]
    pub const fn new(delimiter: u8) -> Self {
        debug_assert!(delimiter.is_ascii(), "field delimiter must be ASCII");
        Self { delimiter }
    }

    /// The delimiter byte.
    #[inline(always)]
    pub const fn delimiter(self) -> u8 {
        self.delimiter
    }

    /// Emits every field of `record` in order, with its position.
    #[inline]
    pub fn for_each<'r, F>(&self, record: &'r str, mut emit: F)
    where
        F: FnMut(usize, &'r str),
    {
        let mut start = 0usize;
        let mut index = 0usize;

        for i in memchr_iter(self.delimiter, record.as_bytes()) {
            emit(index, record.get(start..i).unwrap_or_default());
            index += 1;
            start = i + 1;
        }
        emit(index, record.get(start..).unwrap_or_default());
    }

    /// Collects the fields of `record`.
    pub fn split<'r>(&self, record: &'r str) -> Fields<'r> {
        let mut fields = Fields::new();
        self.for_each(record, |_, field| fields.push(field));
        fields
    }

    /// Counts the fields of `record` without collecting them.
    #[inline]
    pub fn count(&self, record: &str) -> usize {
        memchr_iter(self.delimiter, record.as_bytes()).count() + 1
    }
}
