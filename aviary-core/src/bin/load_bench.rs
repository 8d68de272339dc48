//! Dataset Load Benchmark
//!
//! Loads a dataset directory into a fresh store several times and reports how
//! long each file took, followed by the store statistics of the last run.
//!
//! ## Usage
//!
//! ```bash
//! # Rejection files go to a temporary directory under the system one
//! ./target/release/load_bench /path/to/dataset
//!
//! # Keep the rejection files
//! ./target/release/load_bench /path/to/dataset /path/to/errors
//!
//! # Override pool sizes
//! AVIARY_CONFIG=store.json ./target/release/load_bench /path/to/dataset
//! ```
//!
//! ## Example Output
//!
//! ```text
//! === Load ===
//! --------------------------------
//! users        : 0.081 s
//! flights      : 0.004 s
//! passengers   : 0.112 s
//! reservations : 0.156 s
//! total        : 0.353 s
//! --------------------------------
//! users: 10000/10002 accepted, flights: 1000/1000 accepted, ...
//! ```

use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use aviary_core::{Database, LoadObserver, LoadStep};
use aviary_types::StoreConfig;

const WARMUP_RUNS: usize = 1;
const MEASURE_RUNS: usize = 5;

/// Accumulates the time spent between consecutive checkpoints.
#[derive(Default)]
struct StepTimer {
    current: Option<(LoadStep, Instant)>,
    totals: Vec<(LoadStep, Duration)>,
}

impl LoadObserver for StepTimer {
    fn checkpoint(&mut self, step: LoadStep) {
        let now = Instant::now();
        if let Some((previous, started)) = self.current.take() {
            match self.totals.iter_mut().find(|(s, _)| *s == previous) {
                Some((_, total)) => *total += now - started,
                None => self.totals.push((previous, now - started)),
            }
        }
        if step != LoadStep::Done {
            self.current = Some((step, now));
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: load_bench <dataset> [errors]");
        std::process::exit(1);
    }

    let dataset = PathBuf::from(&args[1]);
    let errors = match args.get(2) {
        Some(dir) => PathBuf::from(dir),
        None => env::temp_dir().join("aviary_load_bench"),
    };
    std::fs::create_dir_all(&errors)?;

    let config = match env::var_os("AVIARY_CONFIG") {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::default(),
    };

    println!("Dataset: {}", dataset.display());
    println!("Errors:  {}\n", errors.display());

    for _ in 0..WARMUP_RUNS {
        let mut db = Database::new(&config);
        db.load_dir(&dataset, &errors, ())?;
    }

    let mut timer = StepTimer::default();
    let mut last = None;
    for _ in 0..MEASURE_RUNS {
        let mut db = Database::new(&config);
        let report = db.load_dir(&dataset, &errors, &mut timer)?;
        last = Some((db, report));
    }

    println!("=== Load ===");
    println!("--------------------------------");
    let mut total = Duration::ZERO;
    for (step, elapsed) in &timer.totals {
        let avg = *elapsed / MEASURE_RUNS as u32;
        total += avg;
        println!("{:<12} : {:.3} s", step.name(), avg.as_secs_f64());
    }
    println!("{:<12} : {:.3} s", "total", total.as_secs_f64());
    println!("--------------------------------");

    if let Some((db, report)) = last {
        let stats = db.stats();
        println!("{report}");
        println!("Rejected    : {}", fmt_count(report.rejected() as u64));
        println!("{stats}");
        println!("Memory      : {}", fmt_bytes(stats.memory_usage_bytes() as u64));
    }

    Ok(())
}

fn fmt_bytes(b: u64) -> String {
    if b >= 1024 * 1024 * 1024 {
        format!("{:.2} GiB", b as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if b >= 1024 * 1024 {
        format!("{:.2} MiB", b as f64 / (1024.0 * 1024.0))
    } else if b >= 1024 {
        format!("{:.2} KiB", b as f64 / 1024.0)
    } else {
        format!("{} B", b)
    }
}

fn fmt_count(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);

    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
