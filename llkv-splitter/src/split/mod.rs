//! The chunk splitter.
//!
//! [`split_chunk`] is the single entry point for dividing a chunk. It checks
//! the caller's size plan against the chunk, delegates to the chunk kind's
//! [`PortionChunk::split_impl`], then checks the pieces that come back:
//!
//! - `sum(target_sizes) <= packed_size`
//! - remainder mode needs `records_count >= len(target_sizes) + 1`,
//!   exact mode needs `records_count >= len(target_sizes)`
//! - exact mode returns `len(target_sizes)` pieces, remainder mode one more
//! - every piece holds at least one row, rows and bytes are conserved, and
//!   addresses are consecutive from the parent's
//!
//! A failed check is an [`Error::ContractViolation`]. Nothing is clamped or
//! truncated to make an inconsistent plan fit.

use std::sync::Arc;

use llkv_result::{Error, Result};

use crate::address::ChunkAddress;
use crate::chunk::{ChunkRef, PortionChunk};
use crate::config::SplitSettings;
use crate::counters::SplitCounters;
use crate::planner::plan_blob_target_sizes;
use crate::serialization::ColumnSerializer;

mod plan;

pub(crate) use plan::{RowOffsets, plan_row_ranges, row_offsets};
pub use plan::SplitMode;

fn violation(counters: &SplitCounters, address: ChunkAddress, msg: String) -> Error {
    counters.record_violation();
    tracing::error!(%address, "{msg}");
    Error::contract_violation(msg)
}

/// Split `chunk` into pieces approximating `target_sizes`.
///
/// Pieces land on row boundaries, so their sizes are best-effort. Total bytes
/// and rows are always conserved. An empty plan returns the chunk's content
/// as a single piece. The parent chunk is left untouched.
pub fn split_chunk(
    chunk: &dyn PortionChunk,
    serializer: &dyn ColumnSerializer,
    counters: &SplitCounters,
    target_sizes: &[u64],
) -> Result<Vec<ChunkRef>> {
    counters.record_call();

    let address = chunk.address();
    let packed_size = chunk.packed_size();
    let records = chunk.records_count();

    let planned = target_sizes
        .iter()
        .try_fold(0u64, |acc, &s| acc.checked_add(s))
        .ok_or_else(|| violation(counters, address, "split plan size overflows u64".into()))?;
    if planned > packed_size {
        return Err(violation(
            counters,
            address,
            format!("split plan sums to {planned} bytes, chunk holds {packed_size}"),
        ));
    }

    let mode = SplitMode::for_plan(packed_size, planned);
    let expected = mode.expected_pieces(target_sizes.len());
    if records < expected as u64 {
        return Err(violation(
            counters,
            address,
            format!(
                "{mode:?} split into {expected} pieces needs {expected} rows, chunk has {records}"
            ),
        ));
    }

    if expected > 0 && address.checked_offset(expected - 1).is_none() {
        return Err(violation(
            counters,
            address,
            format!("addressing {expected} split pieces overflows the chunk index"),
        ));
    }

    let pieces = chunk
        .split_impl(serializer, target_sizes, mode)
        .map_err(|e| match e {
            Error::ContractViolation(msg) => violation(counters, address, msg),
            other => other,
        })?;

    if pieces.len() != expected {
        return Err(violation(
            counters,
            address,
            format!(
                "{mode:?} split returned {} pieces, expected {expected}",
                pieces.len()
            ),
        ));
    }

    let mut out_bytes = 0u64;
    let mut out_records = 0u64;
    for (i, piece) in pieces.iter().enumerate() {
        let piece_records = piece.records_count();
        if piece_records == 0 {
            return Err(violation(
                counters,
                address,
                format!("split piece {i} has no rows"),
            ));
        }
        if Some(piece.address()) != address.checked_offset(i) {
            return Err(violation(
                counters,
                address,
                format!("split piece {i} has address {}", piece.address()),
            ));
        }
        out_bytes += piece.packed_size();
        out_records += piece_records;
    }
    if out_bytes != packed_size || out_records != records {
        return Err(violation(
            counters,
            address,
            format!(
                "split pieces hold {out_bytes} bytes / {out_records} rows, \
                 parent held {packed_size} / {records}"
            ),
        ));
    }

    counters.record_input(mode == SplitMode::Exact, packed_size, records);
    counters.record_output(pieces.len() as u64, out_bytes, out_records);
    tracing::debug!(
        %address,
        kind = chunk.kind(),
        ?mode,
        packed_size,
        records,
        targets = target_sizes.len(),
        pieces = pieces.len(),
        "split chunk"
    );
    Ok(pieces)
}

/// A serializer, a shared counters handle and settings, bundled for the
/// write or compaction task that owns them.
#[derive(Clone)]
pub struct ChunkSplitter {
    serializer: Arc<dyn ColumnSerializer>,
    counters: Arc<SplitCounters>,
    settings: SplitSettings,
}

impl ChunkSplitter {
    pub fn new(serializer: Arc<dyn ColumnSerializer>, counters: Arc<SplitCounters>) -> Self {
        Self {
            serializer,
            counters,
            settings: SplitSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SplitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn serializer(&self) -> &Arc<dyn ColumnSerializer> {
        &self.serializer
    }

    pub fn counters(&self) -> &Arc<SplitCounters> {
        &self.counters
    }

    pub fn settings(&self) -> &SplitSettings {
        &self.settings
    }

    /// See [`split_chunk`].
    pub fn split(&self, chunk: &dyn PortionChunk, target_sizes: &[u64]) -> Result<Vec<ChunkRef>> {
        split_chunk(
            chunk,
            self.serializer.as_ref(),
            self.counters.as_ref(),
            target_sizes,
        )
    }

    /// Tile `chunk` into blobs no larger than `max_blob_bytes` where row
    /// boundaries allow.
    pub fn split_to_blobs(&self, chunk: &dyn PortionChunk) -> Result<Vec<ChunkRef>> {
        let plan =
            plan_blob_target_sizes(chunk.packed_size(), chunk.records_count(), &self.settings)?;
        self.split(chunk, &plan)
    }
}
