//! Memory pools.
//!
//! - [`BlockPool`]: fixed-capacity blocks of typed elements addressed by
//!   [`SlotId`]
//! - [`StringPool`] and [`DedupStringPool`]: interned text addressed by
//!   [`StrSpan`]
//! - [`RelationPool`]: nodes of singly linked identifier lists
//!
//! No pool ever moves an element it has handed out a handle for.

mod block;
mod dedup;
mod relation;
mod strings;

pub use block::{BlockPool, SlotId};
pub use dedup::DedupStringPool;
pub use relation::{RelationList, RelationNode, RelationPool, Relations};
pub use strings::{StrSpan, StringPool, StringStore};
