//! Configuration for MiniKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a MiniKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory for all data files
    pub data_dir: PathBuf,

    /// MemTable operation count triggering a flush
    pub flush_threshold_ops: usize,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// WAL file path (relative to data_dir)
    pub wal_path: PathBuf,

    /// Sync policy: when to fsync the WAL
    pub wal_sync_policy: WalSyncPolicy,
}

/// WAL sync policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncPolicy {
    /// fsync after every append (safest, slowest)
    Sync,

    /// fsync after `count` appends or `interval_ms` since the last sync,
    /// whichever comes first
    Batch { count: usize, interval_ms: u64 },

    /// fsync after a batch whose size tracks recent write throughput,
    /// bounded by [`min_batch`, `max_batch`]; `idle_ms` without an append
    /// caps loss during quiet periods
    Adaptive {
        min_batch: usize,
        max_batch: usize,
        idle_ms: u64,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./minikv_data"),
            flush_threshold_ops: 1000,
            wal_path: PathBuf::from("wal.log"),
            wal_sync_policy: WalSyncPolicy::Sync,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Absolute path of the WAL file
    pub fn wal_file(&self) -> PathBuf {
        self.data_dir.join(&self.wal_path)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    pub fn flush_threshold_ops(mut self, ops: usize) -> Self {
        self.config.flush_threshold_ops = ops.max(1);
        self
    }

    pub fn wal_sync_policy(mut self, policy: WalSyncPolicy) -> Self {
        self.config.wal_sync_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
