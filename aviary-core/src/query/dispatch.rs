use std::collections::BTreeMap;

use tracing::debug;

use super::{QueryInstance, QueryRegistry};
use crate::store::Database;

/// Executes a batch of query instances and returns one output per instance,
/// in input order.
///
/// Instances are grouped by query type (keeping their relative order) so
/// that each type generates its statistics once. An instance whose type is
/// not in `registry` produces an empty output.
pub fn dispatch(db: &Database, registry: &QueryRegistry, instances: &[QueryInstance]) -> Vec<String> {
    let mut groups: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, instance) in instances.iter().enumerate() {
        groups.entry(instance.query_type()).or_default().push(i);
    }

    let mut outputs = vec![String::new(); instances.len()];
    for (query, members) in groups {
        let Some(query_type) = registry.get(query) else {
            debug!(query, instances = members.len(), "skipping unregistered query type");
            continue;
        };
        debug!(query, instances = members.len(), "dispatching query group");

        let batch: Vec<&QueryInstance> = members.iter().map(|&i| &instances[i]).collect();
        for (&i, output) in members.iter().zip(query_type.execute_batch(db, &batch)) {
            outputs[i] = output;
        }
    }
    outputs
}

/// Executes a single instance.
pub fn dispatch_single(db: &Database, registry: &QueryRegistry, instance: &QueryInstance) -> String {
    registry
        .get(instance.query_type())
        .and_then(|query_type| query_type.execute_batch(db, &[instance]).pop())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Query, QueryWriter};
    use aviary_types::ValueError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Echoes its argument and counts statistics builds.
    struct Echo(Arc<AtomicUsize>);

    impl Query for Echo {
        type Args = String;
        type Stats = usize;

        fn parse_arguments(&self, args: &[&str]) -> Result<String, ValueError> {
            Ok(args.join(" "))
        }

        fn generate_statistics(&self, _: &Database, batch: &[&String]) -> Option<usize> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(batch.len())
        }

        fn execute(&self, _: &Database, stats: Option<&usize>, args: &String, out: &mut QueryWriter) {
            out.begin_object();
            out.field("arg", args);
            out.field("batch", stats.copied().unwrap_or_default());
        }
    }

    #[test]
    fn outputs_follow_input_order() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut registry = QueryRegistry::new();
        registry.register(2, Echo(builds.clone()));
        registry.register(1, Echo(builds.clone()));

        let lines = ["2 a", "1 b", "2 c", "1F d", "2 e"];
        let instances: Vec<QueryInstance> = lines
            .iter()
            .map(|l| QueryInstance::parse(l, &registry).expect("should parse"))
            .collect();

        let db = Database::default();
        let outputs = dispatch(&db, &registry, &instances);

        assert_eq!(outputs, ["a;3\n", "b;2\n", "c;3\n", "--- 1 ---\narg: d\nbatch: 2\n", "e;3\n"]);
        assert_eq!(builds.load(Ordering::SeqCst), 2, "one statistics build per type");

        assert_eq!(dispatch_single(&db, &registry, &instances[0]), "a;1\n");
        assert_eq!(builds.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn empty_batch() {
        let registry = QueryRegistry::new();
        assert!(dispatch(&Database::default(), &registry, &[]).is_empty());
    }
}
