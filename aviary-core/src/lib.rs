//! Block-pool record store for users, flights and reservations.
//!
//! The crate is organized bottom-up:
//!
//! - **[`pool`]**: non-relocating block pools, string pools (with an optional
//!   deduplicating variant) and relation lists
//! - **[`store`]**: entity managers indexed by identifier, and the
//!   [`Database`] that groups them
//! - **[`parser`]**: grammar-driven parsing of delimited records
//! - **[`loader`]**: the dataset files, their validation rules and rejection
//!   files
//! - **[`query`]**: query types, their shared statistics and the dispatcher
//!
//! ## Example
//!
//! ```no_run
//! use aviary_core::query::{dispatch, QueryInstance, QueryRegistry};
//! use aviary_core::Database;
//! use aviary_types::StoreConfig;
//!
//! let config = StoreConfig::default();
//! let mut db = Database::new(&config);
//! db.load_dir("dataset/", "errors/", ())?;
//!
//! let registry = QueryRegistry::with_defaults(config.reference_date);
//! let instance = QueryInstance::parse("9F \"João\"", &registry)?;
//! for output in dispatch(&db, &registry, &[instance]) {
//!     print!("{output}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod loader;
pub mod parser;
pub mod pool;
pub mod query;
pub mod store;

pub use loader::{DatasetLoader, LoadObserver, LoadReport, LoadStep, StepReport};
pub use store::{Database, StoreStats};
