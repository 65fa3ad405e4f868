//! WAL sync policies
//!
//! Runtime state machines behind the three durability modes. The writer
//! asks the policy on every append whether a durability barrier (fsync)
//! must run before the append returns; time-driven deadlines are also
//! checked through [`SyncPolicy::idle_sync_due`].
//!
//! All methods take the current instant as a parameter so tests can drive
//! the policies with a synthetic clock.

use std::time::{Duration, Instant};

use crate::config::WalSyncPolicy;

/// EWMA window for the adaptive throughput estimate
const RATE_WINDOW: Duration = Duration::from_millis(100);

/// Wall-time span one adaptive batch should cover at the estimated rate
const BATCH_SPAN: Duration = Duration::from_millis(5);

/// Runtime sync-policy state, built from [`WalSyncPolicy`]
#[derive(Debug)]
pub enum SyncPolicy {
    /// Barrier after every append
    Sync,

    /// Barrier every N appends or on an interval deadline
    Batch(BatchPolicy),

    /// Barrier cadence follows recent write throughput
    Adaptive(AdaptivePolicy),
}

#[derive(Debug)]
pub struct BatchPolicy {
    count: usize,
    interval: Duration,
    pending: usize,
    last_sync: Instant,
}

#[derive(Debug)]
pub struct AdaptivePolicy {
    min_batch: usize,
    max_batch: usize,
    idle: Duration,
    pending: usize,
    /// Current batch target, recomputed on every append
    batch: usize,
    /// EWMA of the append rate in records per second
    rate: f64,
    last_append: Option<Instant>,
}

impl SyncPolicy {
    pub fn new(config: WalSyncPolicy, now: Instant) -> Self {
        match config {
            WalSyncPolicy::Sync => SyncPolicy::Sync,
            WalSyncPolicy::Batch { count, interval_ms } => SyncPolicy::Batch(BatchPolicy {
                count: count.max(1),
                interval: Duration::from_millis(interval_ms),
                pending: 0,
                last_sync: now,
            }),
            WalSyncPolicy::Adaptive {
                min_batch,
                max_batch,
                idle_ms,
            } => {
                let min_batch = min_batch.max(1);
                SyncPolicy::Adaptive(AdaptivePolicy {
                    min_batch,
                    max_batch: max_batch.max(min_batch),
                    idle: Duration::from_millis(idle_ms),
                    pending: 0,
                    batch: min_batch,
                    rate: 0.0,
                    last_append: None,
                })
            }
        }
    }

    /// Register an append; returns true when a barrier must run before the
    /// append is reported successful
    pub fn on_append(&mut self, now: Instant) -> bool {
        match self {
            SyncPolicy::Sync => true,
            SyncPolicy::Batch(batch) => batch.on_append(now),
            SyncPolicy::Adaptive(adaptive) => adaptive.on_append(now),
        }
    }

    /// True when pending records have outlived the policy's time deadline
    pub fn idle_sync_due(&self, now: Instant) -> bool {
        match self {
            SyncPolicy::Sync => false,
            SyncPolicy::Batch(batch) => batch.idle_sync_due(now),
            SyncPolicy::Adaptive(adaptive) => adaptive.idle_sync_due(now),
        }
    }

    /// Inform the policy that a barrier has been executed
    pub fn note_synced(&mut self, now: Instant) {
        match self {
            SyncPolicy::Sync => {}
            SyncPolicy::Batch(batch) => {
                batch.pending = 0;
                batch.last_sync = now;
            }
            SyncPolicy::Adaptive(adaptive) => adaptive.pending = 0,
        }
    }

    /// Appends registered since the last barrier
    pub fn pending(&self) -> usize {
        match self {
            SyncPolicy::Sync => 0,
            SyncPolicy::Batch(batch) => batch.pending,
            SyncPolicy::Adaptive(adaptive) => adaptive.pending,
        }
    }

    /// Current batch target (1 for Sync, N for Batch, adaptive otherwise)
    pub fn current_batch(&self) -> usize {
        match self {
            SyncPolicy::Sync => 1,
            SyncPolicy::Batch(batch) => batch.count,
            SyncPolicy::Adaptive(adaptive) => adaptive.batch,
        }
    }
}

impl BatchPolicy {
    fn on_append(&mut self, now: Instant) -> bool {
        self.pending += 1;
        self.pending >= self.count || now.duration_since(self.last_sync) >= self.interval
    }

    fn idle_sync_due(&self, now: Instant) -> bool {
        self.pending > 0 && now.duration_since(self.last_sync) >= self.interval
    }
}

impl AdaptivePolicy {
    fn on_append(&mut self, now: Instant) -> bool {
        self.observe(now);
        self.pending += 1;
        self.pending >= self.batch
    }

    /// Fold the gap since the previous append into the rate estimate and
    /// recompute the batch target.
    ///
    /// The target is the number of records arriving in [`BATCH_SPAN`] at
    /// the estimated rate, clamped to the configured bounds, so it grows
    /// monotonically with throughput. A gap of `idle` or more zeroes the
    /// estimate and the batch falls back to `min_batch`.
    fn observe(&mut self, now: Instant) {
        if let Some(prev) = self.last_append {
            let gap = now.duration_since(prev);
            if gap >= self.idle {
                self.rate = 0.0;
            } else {
                let secs = gap.as_secs_f64().max(1e-6);
                let sample = 1.0 / secs;
                let alpha = (secs / RATE_WINDOW.as_secs_f64()).min(1.0);
                self.rate += alpha * (sample - self.rate);
            }
        }
        self.last_append = Some(now);

        let target = (self.rate * BATCH_SPAN.as_secs_f64()).round() as usize;
        self.batch = target.clamp(self.min_batch, self.max_batch);
    }

    fn idle_sync_due(&self, now: Instant) -> bool {
        self.pending > 0
            && self
                .last_append
                .is_some_and(|last| now.duration_since(last) >= self.idle)
    }
}
