//! Delimited record parsing.
//!
//! A stream is parsed with two nested grammars: a [`RecordGrammar`] splits it
//! into records and a [`FieldGrammar`] splits each record into a fixed number
//! of fields, each handed to its own callback. State flows through a single
//! `&mut S`, so loaders keep their draft entity and their rejection sink in
//! one place.

mod fields;
mod grammar;
mod reader;

pub use fields::{FieldSplitter, Fields, INLINE_FIELDS};
pub use grammar::{AfterCallback, BeforeCallback, FieldCallback, FieldGrammar, RecordGrammar};
pub use reader::{ParseSummary, RecordParser};
