//! Splitter telemetry shared across concurrent split calls.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe container for splitter statistics.
///
/// One instance is created by whatever orchestrates a write or compaction,
/// wrapped in an `Arc`, and handed to every split call. Updates are relaxed
/// atomic increments: commutative, unordered, and infallible.
#[derive(Debug, Default)]
pub struct SplitCounters {
    // --- Calls ---
    pub split_calls: AtomicU64,
    pub exact_splits: AtomicU64,
    pub remainder_splits: AtomicU64,
    pub contract_violations: AtomicU64,

    // --- Input side ---
    pub input_chunks: AtomicU64,
    pub input_bytes: AtomicU64,
    pub input_records: AtomicU64,

    // --- Output side ---
    pub output_chunks: AtomicU64,
    pub output_bytes: AtomicU64,
    pub output_records: AtomicU64,
}

impl SplitCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_call(&self) {
        self.split_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_violation(&self) {
        self.contract_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Account the parent side of one successful split.
    pub(crate) fn record_input(&self, exact: bool, bytes: u64, records: u64) {
        if exact {
            self.exact_splits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.remainder_splits.fetch_add(1, Ordering::Relaxed);
        }
        self.input_chunks.fetch_add(1, Ordering::Relaxed);
        self.input_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.input_records.fetch_add(records, Ordering::Relaxed);
    }

    /// Account the pieces a split returned, summed from the pieces themselves.
    pub(crate) fn record_output(&self, chunks: u64, bytes: u64, records: u64) {
        self.output_chunks.fetch_add(chunks, Ordering::Relaxed);
        self.output_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.output_records.fetch_add(records, Ordering::Relaxed);
    }

    /// Capture a point-in-time snapshot of the accumulated metrics.
    pub fn snapshot(&self) -> SplitCountersSnapshot {
        SplitCountersSnapshot {
            split_calls: self.split_calls.load(Ordering::Relaxed),
            exact_splits: self.exact_splits.load(Ordering::Relaxed),
            remainder_splits: self.remainder_splits.load(Ordering::Relaxed),
            contract_violations: self.contract_violations.load(Ordering::Relaxed),
            input_chunks: self.input_chunks.load(Ordering::Relaxed),
            input_bytes: self.input_bytes.load(Ordering::Relaxed),
            input_records: self.input_records.load(Ordering::Relaxed),
            output_chunks: self.output_chunks.load(Ordering::Relaxed),
            output_bytes: self.output_bytes.load(Ordering::Relaxed),
            output_records: self.output_records.load(Ordering::Relaxed),
        }
    }

    /// Reset all statistics to zero.
    pub fn reset(&self) {
        self.split_calls.store(0, Ordering::Relaxed);
        self.exact_splits.store(0, Ordering::Relaxed);
        self.remainder_splits.store(0, Ordering::Relaxed);
        self.contract_violations.store(0, Ordering::Relaxed);
        self.input_chunks.store(0, Ordering::Relaxed);
        self.input_bytes.store(0, Ordering::Relaxed);
        self.input_records.store(0, Ordering::Relaxed);
        self.output_chunks.store(0, Ordering::Relaxed);
        self.output_bytes.store(0, Ordering::Relaxed);
        self.output_records.store(0, Ordering::Relaxed);
    }
}

/// Immutable copy of [`SplitCounters`] captured at a specific moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCountersSnapshot {
    pub split_calls: u64,
    pub exact_splits: u64,
    pub remainder_splits: u64,
    pub contract_violations: u64,
    pub input_chunks: u64,
    pub input_bytes: u64,
    pub input_records: u64,
    pub output_chunks: u64,
    pub output_bytes: u64,
    pub output_records: u64,
}

impl SplitCountersSnapshot {
    /// Compute the delta between two snapshots (`newer - older`). Saturates at zero.
    pub fn delta_since(&self, older: &Self) -> Self {
        macro_rules! delta {
            ($field:ident) => {
                self.$field.saturating_sub(older.$field)
            };
        }

        Self {
            split_calls: delta!(split_calls),
            exact_splits: delta!(exact_splits),
            remainder_splits: delta!(remainder_splits),
            contract_violations: delta!(contract_violations),
            input_chunks: delta!(input_chunks),
            input_bytes: delta!(input_bytes),
            input_records: delta!(input_records),
            output_chunks: delta!(output_chunks),
            output_bytes: delta!(output_bytes),
            output_records: delta!(output_records),
        }
    }
}
