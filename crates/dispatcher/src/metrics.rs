//! Dispatcher and pipe metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Outcome counters of one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Payloads that invoked a receiver method
    delivered: AtomicU64,
    /// Payloads for this contract with an unknown method id
    unmatched: AtomicU64,
    /// Payloads dropped because the receiver was released
    expired: AtomicU64,
    /// Malformed payloads
    faults: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unmatched(&self) -> u64 {
        self.unmatched.load(Ordering::Relaxed)
    }

    pub fn inc_unmatched(&self) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    pub fn inc_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    pub fn inc_faults(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            delivered: self.delivered(),
            unmatched: self.unmatched(),
            expired: self.expired(),
            faults: self.faults(),
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub delivered: u64,
    pub unmatched: u64,
    pub expired: u64,
    pub faults: u64,
}

/// Metrics for a single pipe
#[derive(Debug, Default)]
pub struct PipeMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Payloads consumed by the target
    delivered: AtomicU64,
    /// Payloads no dispatcher consumed
    unmatched: AtomicU64,
    /// Payloads that failed to decode
    faults: AtomicU64,
    /// Payloads dropped due to full queue or send failure
    dropped: AtomicU64,
}

impl PipeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unmatched(&self) -> u64 {
        self.unmatched.load(Ordering::Relaxed)
    }

    pub fn inc_unmatched(&self) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    pub fn inc_faults(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipeSnapshot {
        PipeSnapshot {
            queue_len: self.queue_len(),
            delivered: self.delivered(),
            unmatched: self.unmatched(),
            faults: self.faults(),
            dropped: self.dropped(),
        }
    }
}

/// Snapshot of pipe metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeSnapshot {
    pub queue_len: usize,
    pub delivered: u64,
    pub unmatched: u64,
    pub faults: u64,
    pub dropped: u64,
}
