//! # MiniKV
//!
//! An embedded, single-writer, persistent key-value store organized as a
//! log-structured merge tree:
//! - Write-Ahead Logging (WAL) with pluggable durability policies
//! - Crash recovery with partial-write handling
//! - Immutable sorted string tables (SSTs) produced by MemTable flushes
//! - Full compaction with tombstone reclamation
//!
//! ## Architecture Overview
//!
//! ```text
//!    put / delete                        get
//!         │                               │
//!         ▼                               ▼
//!  ┌─────────────┐    apply       ┌─────────────┐
//!  │     WAL     │───────────────▶│  MemTable   │
//!  │  (append +  │                │  (BTreeMap) │
//!  │ sync policy)│                └──────┬──────┘
//!  └─────────────┘                       │ flush / probe
//!                                        ▼
//!                                 ┌─────────────┐
//!                                 │   Storage   │
//!                                 │ (SST stack, │
//!                                 │ compaction) │
//!                                 └─────────────┘
//! ```
//!
//! Reads probe the MemTable first, then the SSTs newest to oldest; the
//! newest layer wins and a tombstone reads as absent.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MiniKvError, Result};
pub use config::{Config, WalSyncPolicy};
pub use engine::Engine;
pub use record::TOMBSTONE;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MiniKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
