//! Lightweight per-chunk statistics recorded in a portion's index.
//!
//! Statistics are computed once, when a chunk is persisted, so the index can
//! answer row-count and pruning questions after the payload has been dropped
//! from memory.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use rustc_hash::FxHashSet;
use std::hash::Hash;

use crate::codecs::{
    sortable_u64_from_f64, sortable_u64_from_i8, sortable_u64_from_i16, sortable_u64_from_i32,
    sortable_u64_from_i64, sortable_u64_from_str_prefix,
};

/// Value statistics for one chunk.
///
/// `min_u64`/`max_u64` are order-preserving encodings (see
/// [`crate::codecs`]); for strings and binaries they hold an 8-byte prefix,
/// so they bound the true values but may tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStats {
    pub min_u64: u64,
    pub max_u64: u64,
    pub null_count: u64,
    pub distinct_count: u64,
}

/// Index-side description of a persisted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta {
    pub records_count: u64,
    pub packed_size: u64,
    /// `None` for chunk kinds that carry opaque rows, and for value types
    /// without an ordering encoding.
    pub stats: Option<ChunkStats>,
}

impl ChunkMeta {
    /// Size and row count only.
    pub fn simple(records_count: u64, packed_size: u64) -> Self {
        Self {
            records_count,
            packed_size,
            stats: None,
        }
    }
}

fn ord_stats<T, K, I>(
    values: I,
    len: usize,
    null_count: u64,
    key: impl Fn(T) -> K,
    to_u64: impl Fn(T) -> u64,
) -> Option<ChunkStats>
where
    T: PartialOrd + Copy,
    K: Hash + Eq,
    I: IntoIterator<Item = Option<T>>,
{
    let mut min_val: Option<T> = None;
    let mut max_val: Option<T> = None;
    let mut distinct: FxHashSet<K> = FxHashSet::with_capacity_and_hasher(len, Default::default());
    for v in values.into_iter().flatten() {
        distinct.insert(key(v));
        // NaN is unordered and would pin min/max; it stays out of both.
        if v.partial_cmp(&v).is_none() {
            continue;
        }
        if min_val.is_none_or(|m| v < m) {
            min_val = Some(v);
        }
        if max_val.is_none_or(|m| v > m) {
            max_val = Some(v);
        }
    }
    match (min_val, max_val) {
        (Some(min), Some(max)) => Some(ChunkStats {
            min_u64: to_u64(min),
            max_u64: to_u64(max),
            null_count,
            distinct_count: distinct.len() as u64,
        }),
        _ => None,
    }
}

/// Compute min/max/null/distinct statistics for an Arrow array.
///
/// Returns `None` for empty arrays, unsupported types, and float arrays whose
/// non-null values are all NaN. An all-null array yields zeroed min/max with
/// the null count filled in.
pub fn compute_chunk_stats(array: &dyn Array) -> Option<ChunkStats> {
    if array.is_empty() {
        return None;
    }

    let len = array.len();
    let null_count = array.null_count() as u64;

    if null_count == len as u64 {
        return Some(ChunkStats {
            min_u64: 0,
            max_u64: 0,
            null_count,
            distinct_count: 0,
        });
    }

    macro_rules! stats_primitive {
        ($arrow_ty:ty, $to_u64:expr) => {{
            let arr = array.as_primitive_opt::<$arrow_ty>()?;
            ord_stats(arr.iter(), len, null_count, |v| v, $to_u64)
        }};
    }

    macro_rules! stats_float {
        ($arrow_ty:ty) => {{
            let arr = array.as_primitive_opt::<$arrow_ty>()?;
            ord_stats(
                arr.iter().map(|o| o.map(|v| v as f64)),
                len,
                null_count,
                f64::to_bits,
                sortable_u64_from_f64,
            )
        }};
    }

    match array.data_type() {
        DataType::Int8 => stats_primitive!(Int8Type, sortable_u64_from_i8),
        DataType::Int16 => stats_primitive!(Int16Type, sortable_u64_from_i16),
        DataType::Int32 => stats_primitive!(Int32Type, sortable_u64_from_i32),
        DataType::Int64 => stats_primitive!(Int64Type, sortable_u64_from_i64),
        DataType::UInt8 => stats_primitive!(UInt8Type, |v: u8| v as u64),
        DataType::UInt16 => stats_primitive!(UInt16Type, |v: u16| v as u64),
        DataType::UInt32 => stats_primitive!(UInt32Type, |v: u32| v as u64),
        DataType::UInt64 => stats_primitive!(UInt64Type, |v: u64| v),
        DataType::Date32 => stats_primitive!(Date32Type, sortable_u64_from_i32),
        DataType::Date64 => stats_primitive!(Date64Type, sortable_u64_from_i64),
        DataType::Float32 => stats_float!(Float32Type),
        DataType::Float64 => stats_float!(Float64Type),
        DataType::Utf8 => {
            let arr = array.as_string_opt::<i32>()?;
            ord_stats(arr.iter(), len, null_count, |v| v, |v: &str| {
                sortable_u64_from_str_prefix(v.as_bytes())
            })
        }
        DataType::LargeUtf8 => {
            let arr = array.as_string_opt::<i64>()?;
            ord_stats(arr.iter(), len, null_count, |v| v, |v: &str| {
                sortable_u64_from_str_prefix(v.as_bytes())
            })
        }
        DataType::Binary => {
            let arr = array.as_binary_opt::<i32>()?;
            ord_stats(arr.iter(), len, null_count, |v| v, sortable_u64_from_str_prefix)
        }
        DataType::LargeBinary => {
            let arr = array.as_binary_opt::<i64>()?;
            ord_stats(arr.iter(), len, null_count, |v| v, sortable_u64_from_str_prefix)
        }
        _ => None,
    }
}
