//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append every logical operation before the MemTable is touched
//! - Decide, per configured sync policy, when to force data to disk
//! - Sequential replay to rebuild MemTable state on startup
//! - Tolerate a torn trailing record after a crash
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────┐
//! │ PUT \t key \t value \n  │
//! ├─────────────────────────┤
//! │ DEL \t key \t       \n  │
//! ├─────────────────────────┤
//! │ ...                     │
//! └─────────────────────────┘
//! ```
//!
//! The file is truncated by the engine once a flush or compaction has
//! durably captured its contents in SST form.

mod policy;
mod writer;
mod reader;
mod recovery;

pub use policy::SyncPolicy;
pub use writer::WalWriter;
pub use reader::WalReader;
pub use recovery::{replay, RecoveryReport};
