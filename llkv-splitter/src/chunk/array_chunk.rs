use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;
use bytes::Bytes;
use llkv_result::{Error, Result};

use super::{ChunkRef, PortionChunk, child_address};
use crate::address::ChunkAddress;
use crate::meta::{ChunkMeta, compute_chunk_stats};
use crate::serialization::ColumnSerializer;
use crate::split::{RowOffsets, SplitMode, plan_row_ranges, row_offsets};

/// A chunk backed by a decoded Arrow array and its serialized form.
///
/// Splitting slices the array on row boundaries and re-serializes each slice.
/// With a row-concatenable serializer the children's payloads concatenate
/// back to this chunk's payload.
#[derive(Clone)]
pub struct ArrayChunk {
    address: ChunkAddress,
    array: ArrayRef,
    packed: Bytes,
}

impl fmt::Debug for ArrayChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayChunk")
            .field("address", &self.address)
            .field("data_type", self.array.data_type())
            .field("records", &self.array.len())
            .field("packed_size", &self.packed.len())
            .finish()
    }
}

impl ArrayChunk {
    /// Serialize `array` and wrap it.
    pub fn from_array(
        address: ChunkAddress,
        array: ArrayRef,
        serializer: &dyn ColumnSerializer,
    ) -> Result<Self> {
        let packed = Bytes::from(serializer.serialize(array.as_ref())?);
        Ok(Self {
            address,
            array,
            packed,
        })
    }

    /// Wrap an already-encoded payload, decoding it to recover the rows.
    pub fn from_packed(
        address: ChunkAddress,
        data_type: &DataType,
        packed: Bytes,
        serializer: &dyn ColumnSerializer,
    ) -> Result<Self> {
        let array = serializer.deserialize(data_type, &packed)?;
        Ok(Self {
            address,
            array,
            packed,
        })
    }

    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    pub fn data_type(&self) -> &DataType {
        self.array.data_type()
    }
}

impl PortionChunk for ArrayChunk {
    fn kind(&self) -> &'static str {
        "array"
    }

    fn address(&self) -> ChunkAddress {
        self.address
    }

    fn packed_bytes(&self) -> &Bytes {
        &self.packed
    }

    fn records_count(&self) -> u64 {
        self.array.len() as u64
    }

    fn build_meta(&self) -> Result<ChunkMeta> {
        Ok(ChunkMeta {
            records_count: self.records_count(),
            packed_size: self.packed_size(),
            stats: compute_chunk_stats(self.array.as_ref()),
        })
    }

    fn with_chunk_index(&self, chunk_index: u32) -> ChunkRef {
        Arc::new(Self {
            address: self.address.with_chunk_index(chunk_index),
            array: Arc::clone(&self.array),
            packed: self.packed.clone(),
        })
    }

    fn split_impl(
        &self,
        serializer: &dyn ColumnSerializer,
        target_sizes: &[u64],
        mode: SplitMode,
    ) -> Result<Vec<ChunkRef>> {
        let sizes = serializer.row_sizes(self.array.as_ref())?;
        let offsets = row_offsets(&sizes);
        let total = offsets.last().copied().unwrap_or(0);
        if sizes.len() != self.array.len() || total != self.packed_size() {
            return Err(Error::Internal(format!(
                "serializer reports {} rows / {total} bytes for {} with {} rows / {} bytes",
                sizes.len(),
                self.address,
                self.array.len(),
                self.packed_size()
            )));
        }

        let ranges = plan_row_ranges(RowOffsets::Prefix(&offsets), target_sizes, mode)?;
        let mut out: Vec<ChunkRef> = Vec::with_capacity(ranges.len());
        for (i, range) in ranges.into_iter().enumerate() {
            let slice = self.array.slice(range.start, range.len());
            let packed = serializer.serialize(slice.as_ref())?;
            let expected = offsets[range.end] - offsets[range.start];
            if packed.len() as u64 != expected {
                return Err(Error::Internal(format!(
                    "rows {range:?} of {} encoded to {} bytes, row sizes say {expected}",
                    self.address,
                    packed.len()
                )));
            }
            out.push(Arc::new(Self {
                address: child_address(self.address, i)?,
                array: slice,
                packed: Bytes::from(packed),
            }));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::SplitCounters;
    use crate::serialization::RowFramedSerializer;
    use crate::split::split_chunk;
    use arrow::array::{Int64Array, StringArray};

    #[test]
    fn split_children_concatenate_to_parent() {
        let ser = RowFramedSerializer;
        let arr: ArrayRef = Arc::new(StringArray::from(vec![
            Some("a"),
            None,
            Some("bbbbbbbb"),
            Some("cc"),
            Some("dddd"),
        ]));
        let chunk = ArrayChunk::from_array(ChunkAddress::new(3, 0), arr, &ser).unwrap();
        let half = chunk.packed_size() / 2;
        let pieces = chunk.split_impl(&ser, &[half], SplitMode::Remainder).unwrap();
        assert_eq!(pieces.len(), 2);

        let joined: Vec<u8> = pieces
            .iter()
            .flat_map(|p| p.packed_bytes().iter().copied())
            .collect();
        assert_eq!(joined.as_slice(), chunk.packed_bytes().as_ref());
        assert_eq!(pieces[0].address(), ChunkAddress::new(3, 0));
        assert_eq!(pieces[1].address(), ChunkAddress::new(3, 1));
    }

    #[test]
    fn from_packed_decodes_rows_and_meta() {
        let ser = RowFramedSerializer;
        let arr: ArrayRef = Arc::new(Int64Array::from(vec![4, 1, 9]));
        let packed = Bytes::from(ser.serialize(arr.as_ref()).unwrap());
        let chunk =
            ArrayChunk::from_packed(ChunkAddress::new(1, 2), &DataType::Int64, packed, &ser)
                .unwrap();
        assert_eq!(chunk.records_count(), 3);
        assert_eq!(chunk.array().to_data(), arr.to_data());

        let meta = chunk.build_meta().unwrap();
        assert_eq!(meta.records_count, 3);
        assert_eq!(meta.packed_size, 27);
        assert_eq!(meta.stats.unwrap().distinct_count, 3);
    }

    /// Reports one byte more for the first row than it writes.
    struct OverReportingSizes;

    impl ColumnSerializer for OverReportingSizes {
        fn serialize(&self, array: &dyn Array) -> Result<Vec<u8>> {
            RowFramedSerializer.serialize(array)
        }
        fn deserialize(&self, data_type: &DataType, bytes: &[u8]) -> Result<ArrayRef> {
            RowFramedSerializer.deserialize(data_type, bytes)
        }
        fn row_sizes(&self, array: &dyn Array) -> Result<Vec<u64>> {
            let mut sizes = RowFramedSerializer.row_sizes(array)?;
            if let Some(first) = sizes.first_mut() {
                *first += 1;
            }
            Ok(sizes)
        }
    }

    /// Pads the encoding of any array shorter than `full_rows` with a
    /// trailing byte, so the parent encodes correctly but split slices do not.
    struct PadsSlices {
        full_rows: usize,
    }

    impl ColumnSerializer for PadsSlices {
        fn serialize(&self, array: &dyn Array) -> Result<Vec<u8>> {
            let mut out = RowFramedSerializer.serialize(array)?;
            if array.len() < self.full_rows {
                out.push(0);
            }
            Ok(out)
        }
        fn deserialize(&self, data_type: &DataType, bytes: &[u8]) -> Result<ArrayRef> {
            RowFramedSerializer.deserialize(data_type, bytes)
        }
        fn row_sizes(&self, array: &dyn Array) -> Result<Vec<u64>> {
            RowFramedSerializer.row_sizes(array)
        }
    }

    fn int_chunk(rows: i64) -> ArrayChunk {
        let arr: ArrayRef = Arc::new(Int64Array::from((0..rows).collect::<Vec<i64>>()));
        ArrayChunk::from_array(ChunkAddress::new(1, 0), arr, &RowFramedSerializer).unwrap()
    }

    #[test]
    fn row_sizes_disagreeing_with_payload_is_internal() {
        let chunk = int_chunk(4);
        let counters = SplitCounters::new();
        let err = split_chunk(&chunk, &OverReportingSizes, &counters, &[18]).unwrap_err();
        assert!(matches!(err, Error::Internal(_)), "{err}");

        let snap = counters.snapshot();
        assert_eq!(snap.contract_violations, 0);
        assert_eq!(snap.output_chunks, 0);
    }

    #[test]
    fn slice_encoding_off_plan_is_internal() {
        let chunk = int_chunk(4);
        let counters = SplitCounters::new();
        let err = split_chunk(&chunk, &PadsSlices { full_rows: 4 }, &counters, &[18]).unwrap_err();
        assert!(matches!(err, Error::Internal(_)), "{err}");
        assert!(err.to_string().contains("row sizes say 18"));
        assert_eq!(counters.snapshot().output_chunks, 0);
    }

    #[test]
    fn reindex_keeps_payload() {
        let ser = RowFramedSerializer;
        let arr: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        let chunk = ArrayChunk::from_array(ChunkAddress::new(1, 0), arr, &ser).unwrap();
        assert!(!chunk.is_splittable());
        let moved = chunk.with_chunk_index(5);
        assert_eq!(moved.address(), ChunkAddress::new(1, 5));
        assert_eq!(moved.packed_bytes(), chunk.packed_bytes());
    }
}
