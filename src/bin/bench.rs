//! MiniKV WAL policy benchmark
//!
//! Compares the write-side cost of the three WAL sync policies by running
//! the same put workload under each and reporting elapsed time, throughput,
//! and the number of durability barriers the WAL executed.
//!
//! The flush threshold is set above the workload size so SST flushes don't
//! dominate; the WAL is what's being measured.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use minikv::{Config, Engine, Result, WalSyncPolicy};

/// MiniKV WAL policy benchmark
#[derive(Parser, Debug)]
#[command(name = "minikv-bench")]
#[command(about = "Write benchmark comparing WAL sync policies")]
#[command(version)]
struct Args {
    /// Number of put operations per policy
    #[arg(short = 'n', long, default_value = "50000")]
    ops: usize,

    /// Base directory for per-policy data directories
    #[arg(short, long, default_value = "./bench_data")]
    data_dir: PathBuf,

    /// Value size in bytes
    #[arg(long, default_value = "32")]
    value_size: usize,

    /// Batch size for the BATCH policy
    #[arg(long, default_value = "100")]
    batch: usize,

    /// Sync interval in milliseconds for the BATCH policy
    #[arg(long, default_value = "5")]
    batch_interval_ms: u64,
}

struct BenchResult {
    label: &'static str,
    elapsed_secs: f64,
    qps: f64,
    syncs: u64,
}

fn run_bench(args: &Args, label: &'static str, policy: WalSyncPolicy) -> Result<BenchResult> {
    let dir = args.data_dir.join(label.to_lowercase());

    // Fresh directory per policy so previous runs don't interfere.
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }

    let config = Config::builder()
        .data_dir(&dir)
        .wal_sync_policy(policy)
        .flush_threshold_ops(args.ops + 1)
        .build();
    let mut engine = Engine::open(config)?;

    let value = "x".repeat(args.value_size);
    let start = Instant::now();

    for i in 0..args.ops {
        let key = format!("key_{i}");
        engine.put(&key, &value)?;
    }

    engine.close()?;
    let elapsed = start.elapsed();

    let elapsed_secs = elapsed.as_secs_f64();
    let qps = if elapsed_secs > 0.0 {
        args.ops as f64 / elapsed_secs
    } else {
        0.0
    };

    Ok(BenchResult {
        label,
        elapsed_secs,
        qps,
        syncs: engine.wal_sync_count(),
    })
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    println!("MiniKV v{} WAL policy benchmark", minikv::VERSION);
    println!("ops per policy: {}", args.ops);
    println!();

    let policies = [
        ("SYNC", WalSyncPolicy::Sync),
        (
            "BATCH",
            WalSyncPolicy::Batch {
                count: args.batch,
                interval_ms: args.batch_interval_ms,
            },
        ),
        (
            "ADAPTIVE",
            WalSyncPolicy::Adaptive {
                min_batch: 1,
                max_batch: args.batch,
                idle_ms: 50,
            },
        ),
    ];

    println!(
        "{:<10} {:>12} {:>14} {:>10}",
        "policy", "elapsed (s)", "ops/s", "syncs"
    );

    for (label, policy) in policies {
        match run_bench(&args, label, policy) {
            Ok(result) => println!(
                "{:<10} {:>12.3} {:>14.0} {:>10}",
                result.label, result.elapsed_secs, result.qps, result.syncs
            ),
            Err(e) => {
                eprintln!("{label}: benchmark failed: {e}");
                std::process::exit(1);
            }
        }
    }
}
