//! Query types and their dispatcher.
//!
//! A query type is a [`Query`]: it parses its arguments once, may build
//! statistics shared by every instance of the type in a batch, and executes
//! each instance into a [`QueryWriter`]. The registry stores query types
//! behind the object-safe [`QueryType`] so that instances of different types
//! can sit in one batch.
//!
//! ## Dispatch
//!
//! ```text
//! input:   1 U1 | 7 10 | 1 U2 | 7 3
//! groups:  1 -> [U1, U2]          7 -> [10, 3]
//!          (no statistics)        (statistics built once)
//! output:  out(U1) | out(10) | out(U2) | out(3)
//! ```
//!
//! Outputs always come back in input order, whatever the grouping.

mod dispatch;
mod instance;
mod q01;
mod q07;
mod q09;
mod registry;
mod writer;

pub use dispatch::{dispatch, dispatch_single};
pub use instance::{split_arguments, QueryInstance};
pub use q01::{EntitySummary, SummaryTarget};
pub use q07::{AirportDelays, TopDelayedAirports};
pub use q09::{SortedUsers, UsersByNamePrefix};
pub use registry::QueryRegistry;
pub use writer::QueryWriter;

use core::any::Any;
use core::fmt;

use aviary_types::ValueError;

use crate::store::Database;

/// A query type.
///
/// `generate_statistics` defaults to no statistics; `execute` then receives
/// `None`.
pub trait Query: Send + Sync + 'static {
    /// Parsed arguments of one instance.
    type Args: Clone + fmt::Debug + Send + Sync + 'static;
    /// Data computed once per batch and shared by its instances.
    type Stats;

    /// Parses the arguments of one instance.
    fn parse_arguments(&self, args: &[&str]) -> Result<Self::Args, ValueError>;

    /// Builds statistics for a batch of instances of this type.
    fn generate_statistics(&self, db: &Database, batch: &[&Self::Args]) -> Option<Self::Stats> {
        let _ = (db, batch);
        None
    }

    /// Writes the answer for one instance.
    fn execute(
        &self,
        db: &Database,
        stats: Option<&Self::Stats>,
        args: &Self::Args,
        out: &mut QueryWriter,
    );
}

/// Type-erased query arguments.
pub trait QueryArgs: Any + fmt::Debug + Send + Sync {
    /// Clones into a new box.
    fn clone_box(&self) -> Box<dyn QueryArgs>;

    /// Upcast for downcasting to the concrete argument type.
    fn as_any(&self) -> &dyn Any;
}

impl<T> QueryArgs for T
where
    T: Any + Clone + fmt::Debug + Send + Sync,
{
    fn clone_box(&self) -> Box<dyn QueryArgs> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn QueryArgs> {
    fn clone(&self) -> Self {
        // Deref first: `Box<dyn QueryArgs>` is itself a `QueryArgs`.
        (**self).clone_box()
    }
}

/// Object-safe view of a [`Query`], as stored in a [`QueryRegistry`].
pub trait QueryType: Send + Sync {
    /// Parses arguments into their erased form.
    fn parse_boxed(&self, args: &[&str]) -> Result<Box<dyn QueryArgs>, ValueError>;

    /// Runs a batch of instances of this type, one output per instance.
    ///
    /// Statistics are generated once, shared by every instance, and dropped
    /// before returning.
    fn execute_batch(&self, db: &Database, batch: &[&QueryInstance]) -> Vec<String>;
}

impl<Q: Query> QueryType for Q {
    fn parse_boxed(&self, args: &[&str]) -> Result<Box<dyn QueryArgs>, ValueError> {
        let parsed = Query::parse_arguments(self, args)?;
        Ok(Box::new(parsed))
    }

    fn execute_batch(&self, db: &Database, batch: &[&QueryInstance]) -> Vec<String> {
        let args: Vec<Option<&Q::Args>> = batch
            .iter()
            .map(|instance| instance.arguments().as_any().downcast_ref::<Q::Args>())
            .collect();

        let present: Vec<&Q::Args> = args.iter().flatten().copied().collect();
        let stats = Query::generate_statistics(self, db, &present);

        batch
            .iter()
            .zip(&args)
            .map(|(instance, args)| {
                let mut out = QueryWriter::new(instance.is_formatted());
                if let Some(args) = args {
                    Query::execute(self, db, stats.as_ref(), args, &mut out);
                }
                out.finish()
            })
            .collect()
    }
}

/// Fails unless exactly `n` arguments were given.
pub(crate) fn expect_arguments(args: &[&str], n: usize) -> Result<(), ValueError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(ValueError::Malformed {
            kind: "argument count",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_arguments_clone_to_the_concrete_type() {
        let args: Box<dyn QueryArgs> = Box::new(String::from("prefix"));
        let copy = args.clone();
        assert_eq!(
            (*copy).as_any().downcast_ref::<String>().map(String::as_str),
            Some("prefix")
        );
    }

    #[test]
    fn argument_count() {
        assert!(expect_arguments(&["a"], 1).is_ok());
        assert!(expect_arguments(&[], 1).is_err());
        assert!(expect_arguments(&["a", "b"], 1).is_err());
    }
}
