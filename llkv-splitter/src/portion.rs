//! Portion index bookkeeping.
//!
//! A [`Portion`] collects, per column, the ordered [`ColumnRecord`]s of the
//! chunks a write or compaction has persisted. Records are append-only and
//! must arrive in ordinal order (`0, 1, 2, ...` per column), so reading a
//! column back is a walk over its records in the order they were added.

use rustc_hash::FxHashMap;

use llkv_result::{Error, Result};

use crate::address::{ChunkAddress, FieldId};
use crate::blob::BlobRange;
use crate::chunk::PortionChunk;
use crate::record::ColumnRecord;

pub type PortionId = u64;

/// A portion under construction. Exclusively owned by the task filling it.
#[derive(Debug, Default)]
pub struct Portion {
    id: PortionId,
    columns: FxHashMap<FieldId, Vec<ColumnRecord>>,
}

impl Portion {
    pub fn new(id: PortionId) -> Self {
        Self {
            id,
            columns: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> PortionId {
        self.id
    }

    /// Register a persisted chunk stored at `location`.
    pub fn add(&mut self, chunk: &dyn PortionChunk, location: BlobRange) -> Result<()> {
        let record = ColumnRecord::new(chunk.address(), location, chunk.build_meta()?);
        self.append_record(record)
    }

    /// Register a prebuilt record. Same ordering and size checks as
    /// [`Portion::add`].
    pub fn append_record(&mut self, record: ColumnRecord) -> Result<()> {
        let address = record.address;
        let Some(expected) = self.next_chunk_index(address.column_id) else {
            let msg = format!(
                "portion {}: column {} has no chunk index left after {}",
                self.id,
                address.column_id,
                u32::MAX
            );
            tracing::error!(portion = self.id, %address, "{msg}");
            return Err(Error::contract_violation(msg));
        };
        if address.chunk_index != expected {
            let msg = format!(
                "portion {}: chunk index {} for column {} out of order, expected {expected}",
                self.id, address.chunk_index, address.column_id
            );
            tracing::error!(portion = self.id, %address, "{msg}");
            return Err(Error::contract_violation(msg));
        }
        if record.location.size != record.packed_size() {
            let msg = format!(
                "portion {}: {address} stored as {} bytes but packs {}",
                self.id,
                record.location.size,
                record.packed_size()
            );
            tracing::error!(portion = self.id, %address, "{msg}");
            return Err(Error::contract_violation(msg));
        }

        tracing::trace!(
            portion = self.id,
            %address,
            blob_id = record.location.blob_id,
            offset = record.location.offset,
            size = record.location.size,
            records = record.records_count(),
            "portion append"
        );
        self.columns
            .entry(address.column_id)
            .or_default()
            .push(record);
        Ok(())
    }

    /// Ordinal the next chunk of `column` must carry, or `None` once the
    /// column has used index `u32::MAX`.
    pub fn next_chunk_index(&self, column: FieldId) -> Option<u32> {
        match self.columns.get(&column).and_then(|recs| recs.last()) {
            Some(last) => last.address.chunk_index.checked_add(1),
            None => Some(0),
        }
    }

    /// Records of `column` in ordinal order. Empty for unknown columns.
    pub fn records(&self, column: FieldId) -> &[ColumnRecord] {
        self.columns.get(&column).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn column_ids(&self) -> Vec<FieldId> {
        let mut ids: Vec<FieldId> = self.columns.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn column_records_count(&self, column: FieldId) -> u64 {
        self.records(column).iter().map(ColumnRecord::records_count).sum()
    }

    pub fn column_packed_size(&self, column: FieldId) -> u64 {
        self.records(column).iter().map(ColumnRecord::packed_size).sum()
    }

    pub fn total_packed_size(&self) -> u64 {
        self.columns
            .values()
            .flatten()
            .map(ColumnRecord::packed_size)
            .sum()
    }

    /// Blob locations of `column`, in the order their rows concatenate.
    pub fn blob_ranges(&self, column: FieldId) -> Vec<BlobRange> {
        self.records(column).iter().map(|r| r.location).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Finalize the portion. Every column must hold the same number of rows.
    pub fn seal(self) -> Result<SealedPortion> {
        let mut row_count: Option<(FieldId, u64)> = None;
        for column in self.column_ids() {
            let rows = self.column_records_count(column);
            match row_count {
                None => row_count = Some((column, rows)),
                Some((first, expected)) if expected != rows => {
                    let msg = format!(
                        "portion {}: column {column} holds {rows} rows, column {first} holds {expected}",
                        self.id
                    );
                    tracing::error!(portion = self.id, "{msg}");
                    return Err(Error::contract_violation(msg));
                }
                Some(_) => {}
            }
        }

        let row_count = row_count.map_or(0, |(_, rows)| rows);
        tracing::debug!(
            portion = self.id,
            columns = self.columns.len(),
            row_count,
            "sealed portion"
        );
        Ok(SealedPortion {
            id: self.id,
            row_count,
            columns: self.columns,
        })
    }
}

/// A finalized, read-only portion index.
#[derive(Debug)]
pub struct SealedPortion {
    id: PortionId,
    row_count: u64,
    columns: FxHashMap<FieldId, Vec<ColumnRecord>>,
}

impl SealedPortion {
    pub fn id(&self) -> PortionId {
        self.id
    }

    /// Rows per column, identical across columns.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn records(&self, column: FieldId) -> &[ColumnRecord] {
        self.columns.get(&column).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn column_ids(&self) -> Vec<FieldId> {
        let mut ids: Vec<FieldId> = self.columns.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Record for a specific chunk, if present.
    pub fn record(&self, address: ChunkAddress) -> Option<&ColumnRecord> {
        self.records(address.column_id)
            .get(usize::try_from(address.chunk_index).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::FixedWidthChunk;
    use crate::meta::ChunkMeta;
    use bytes::Bytes;

    fn chunk(column: FieldId, index: u32, rows: usize) -> FixedWidthChunk {
        FixedWidthChunk::new(
            ChunkAddress::new(column, index),
            8,
            Bytes::from(vec![0u8; rows * 8]),
        )
        .unwrap()
    }

    #[test]
    fn append_in_order_and_query() {
        let mut p = Portion::new(7);
        assert_eq!(p.next_chunk_index(1), Some(0));
        p.add(&chunk(1, 0, 3), BlobRange::new(10, 0, 24)).unwrap();
        p.add(&chunk(1, 1, 2), BlobRange::new(10, 24, 16)).unwrap();
        p.add(&chunk(2, 0, 5), BlobRange::new(11, 0, 40)).unwrap();

        assert_eq!(p.next_chunk_index(1), Some(2));
        assert_eq!(p.column_ids(), vec![1, 2]);
        assert_eq!(p.column_records_count(1), 5);
        assert_eq!(p.column_packed_size(1), 40);
        assert_eq!(p.total_packed_size(), 80);
        assert_eq!(
            p.blob_ranges(1),
            vec![BlobRange::new(10, 0, 24), BlobRange::new(10, 24, 16)]
        );
        assert!(p.records(99).is_empty());
    }

    #[test]
    fn skipped_index_is_contract_violation() {
        let mut p = Portion::new(1);
        p.add(&chunk(1, 0, 1), BlobRange::new(1, 0, 8)).unwrap();
        let err = p.add(&chunk(1, 2, 1), BlobRange::new(1, 8, 8)).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(p.records(1).len(), 1);
    }

    #[test]
    fn exhausted_column_rejects_further_records() {
        let mut p = Portion::new(1);
        // Build a column whose last index is u32::MAX without a chain of
        // four billion appends.
        p.columns.insert(
            1,
            vec![ColumnRecord::new(
                ChunkAddress::new(1, u32::MAX),
                BlobRange::new(1, 0, 8),
                ChunkMeta::simple(1, 8),
            )],
        );
        assert_eq!(p.next_chunk_index(1), None);

        let err = p
            .add(&chunk(1, u32::MAX, 1), BlobRange::new(1, 8, 8))
            .unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(p.records(1).len(), 1);
    }

    #[test]
    fn first_record_must_be_zero() {
        let mut p = Portion::new(1);
        let err = p.add(&chunk(4, 1, 1), BlobRange::new(1, 0, 8)).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(p.is_empty());
    }

    #[test]
    fn size_mismatch_is_contract_violation() {
        let mut p = Portion::new(1);
        let err = p.add(&chunk(1, 0, 2), BlobRange::new(1, 0, 8)).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn seal_checks_row_totals() {
        let mut p = Portion::new(3);
        p.add(&chunk(1, 0, 4), BlobRange::new(1, 0, 32)).unwrap();
        p.add(&chunk(2, 0, 3), BlobRange::new(2, 0, 24)).unwrap();
        assert!(p.seal().unwrap_err().is_contract_violation());

        let mut p = Portion::new(4);
        p.add(&chunk(1, 0, 4), BlobRange::new(1, 0, 32)).unwrap();
        p.add(&chunk(2, 0, 1), BlobRange::new(2, 0, 8)).unwrap();
        p.add(&chunk(2, 1, 3), BlobRange::new(2, 8, 24)).unwrap();
        let sealed = p.seal().unwrap();
        assert_eq!(sealed.id(), 4);
        assert_eq!(sealed.row_count(), 4);
        assert_eq!(sealed.column_ids(), vec![1, 2]);
        assert_eq!(
            sealed.record(ChunkAddress::new(2, 1)).unwrap().location,
            BlobRange::new(2, 8, 24)
        );
        assert!(sealed.record(ChunkAddress::new(2, 2)).is_none());
    }

    #[test]
    fn empty_portion_seals() {
        let sealed = Portion::new(0).seal().unwrap();
        assert_eq!(sealed.row_count(), 0);
        assert!(sealed.column_ids().is_empty());
    }
}
