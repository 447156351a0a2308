//! Column serializers: Arrow arrays to packed chunk bytes and back.
//!
//! The splitter treats encoding as an opaque strategy supplied by the caller
//! ([`ColumnSerializer`]). It only relies on one property: encodings are
//! **row-concatenable**. Encoding rows `a..b` and then rows `b..c` must give
//! exactly the bytes of encoding rows `a..c`. That is what lets split
//! children reproduce the parent payload byte for byte, and what makes
//! packed sizes add up across pieces.
//!
//! ## `RowFramedSerializer` layout
//!
//! There is no chunk header. The data type travels with the chunk, not in
//! the bytes. Each row is one frame:
//!
//! ```text
//!   byte 0    : tag (0 = null, 1 = value)
//!   bytes 1.. : payload, present only when tag == 1
//!
//!   fixed-width primitives : native value, little-endian (1/2/4/8 bytes)
//!   Boolean                : one byte, 0 or 1
//!   Utf8/Binary (+Large)   : u32 LE byte length, then the bytes
//! ```
//!
//! Supported types: Int8..Int64, UInt8..UInt64, Float32, Float64, Date32,
//! Date64, Boolean, Utf8, LargeUtf8, Binary, LargeBinary.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BinaryArray, BooleanArray, LargeBinaryArray, LargeStringArray,
    PrimitiveArray, StringArray,
};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use llkv_result::{Error, Result};

use crate::codecs::{read_u8, read_u32_le, take, write_u32_le};

/// Strategy converting a column's rows to packed bytes and back.
///
/// Implementations must be deterministic and row-concatenable (see the
/// module docs), and `row_sizes` must agree with `serialize`.
pub trait ColumnSerializer: Send + Sync {
    /// Encode every row of `array`, in order.
    fn serialize(&self, array: &dyn Array) -> Result<Vec<u8>>;

    /// Decode packed bytes previously produced for `data_type`.
    fn deserialize(&self, data_type: &DataType, bytes: &[u8]) -> Result<ArrayRef>;

    /// Encoded width of each row of `array`. Sums to `serialize(array).len()`.
    fn row_sizes(&self, array: &dyn Array) -> Result<Vec<u64>>;
}

const NULL_TAG: u8 = 0;
const VALUE_TAG: u8 = 1;
const TAG_BYTES: u64 = 1;
const LEN_PREFIX_BYTES: u64 = 4;

/// Default serializer: one self-delimiting frame per row.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowFramedSerializer;

impl RowFramedSerializer {
    pub fn new() -> Self {
        Self
    }
}

/// Byte width of the payload of a non-null fixed-width value, or `None` for
/// types that are not fixed width.
#[inline]
fn fixed_width(dt: &DataType) -> Option<u64> {
    match dt {
        DataType::Int8 | DataType::UInt8 | DataType::Boolean => Some(1),
        DataType::Int16 | DataType::UInt16 => Some(2),
        DataType::Int32 | DataType::UInt32 | DataType::Float32 | DataType::Date32 => Some(4),
        DataType::Int64 | DataType::UInt64 | DataType::Float64 | DataType::Date64 => Some(8),
        _ => None,
    }
}

#[inline]
fn unsupported(dt: &DataType) -> Error {
    Error::invalid_argument(format!("row-framed codec does not support {dt:?}"))
}

#[inline]
fn mismatch(dt: &DataType) -> Error {
    Error::Internal(format!("array does not downcast to its declared type {dt:?}"))
}

#[inline]
fn truncated(off: usize) -> Error {
    Error::invalid_argument(format!("row-framed payload truncated at byte {off}"))
}

#[inline]
fn bad_tag(tag: u8, off: usize) -> Error {
    Error::invalid_argument(format!("invalid row tag {tag} at byte {off}"))
}

fn push_varlen(out: &mut Vec<u8>, value: &[u8]) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| Error::invalid_argument("value longer than u32::MAX bytes"))?;
    out.push(VALUE_TAG);
    write_u32_le(out, len);
    out.extend_from_slice(value);
    Ok(())
}

/// Split a varlen payload into per-row optional byte slices.
fn read_varlen_frames(bytes: &[u8]) -> Result<Vec<Option<&[u8]>>> {
    let mut out = Vec::new();
    let mut off = 0usize;
    while let Some(tag) = read_u8(bytes, &mut off) {
        match tag {
            NULL_TAG => out.push(None),
            VALUE_TAG => {
                let len = read_u32_le(bytes, &mut off).ok_or_else(|| truncated(off))? as usize;
                let value = take(bytes, &mut off, len).ok_or_else(|| truncated(off))?;
                out.push(Some(value));
            }
            other => return Err(bad_tag(other, off - 1)),
        }
    }
    Ok(out)
}

fn to_utf8(frames: Vec<Option<&[u8]>>) -> Result<Vec<Option<&str>>> {
    frames
        .into_iter()
        .map(|f| {
            f.map(|b| {
                std::str::from_utf8(b)
                    .map_err(|e| Error::invalid_argument(format!("invalid utf-8 in payload: {e}")))
            })
            .transpose()
        })
        .collect()
}

impl ColumnSerializer for RowFramedSerializer {
    fn serialize(&self, array: &dyn Array) -> Result<Vec<u8>> {
        let dt = array.data_type();
        let capacity = fixed_width(dt)
            .map(|w| array.len() * (1 + w as usize))
            .unwrap_or(array.len() * 8);
        let mut out = Vec::with_capacity(capacity);

        macro_rules! encode_fixed {
            ($arrow_ty:ty) => {{
                let arr = array
                    .as_primitive_opt::<$arrow_ty>()
                    .ok_or_else(|| mismatch(dt))?;
                for i in 0..arr.len() {
                    if arr.is_null(i) {
                        out.push(NULL_TAG);
                    } else {
                        out.push(VALUE_TAG);
                        out.extend_from_slice(&arr.value(i).to_le_bytes());
                    }
                }
            }};
        }

        macro_rules! encode_varlen {
            ($downcast:ident, $offset:ty, $as_bytes:expr) => {{
                let arr = array.$downcast::<$offset>().ok_or_else(|| mismatch(dt))?;
                for i in 0..arr.len() {
                    if arr.is_null(i) {
                        out.push(NULL_TAG);
                    } else {
                        push_varlen(&mut out, $as_bytes(arr.value(i)))?;
                    }
                }
            }};
        }

        match dt {
            DataType::Int8 => encode_fixed!(Int8Type),
            DataType::Int16 => encode_fixed!(Int16Type),
            DataType::Int32 => encode_fixed!(Int32Type),
            DataType::Int64 => encode_fixed!(Int64Type),
            DataType::UInt8 => encode_fixed!(UInt8Type),
            DataType::UInt16 => encode_fixed!(UInt16Type),
            DataType::UInt32 => encode_fixed!(UInt32Type),
            DataType::UInt64 => encode_fixed!(UInt64Type),
            DataType::Float32 => encode_fixed!(Float32Type),
            DataType::Float64 => encode_fixed!(Float64Type),
            DataType::Date32 => encode_fixed!(Date32Type),
            DataType::Date64 => encode_fixed!(Date64Type),
            DataType::Boolean => {
                let arr = array.as_boolean_opt().ok_or_else(|| mismatch(dt))?;
                for i in 0..arr.len() {
                    if arr.is_null(i) {
                        out.push(NULL_TAG);
                    } else {
                        out.push(VALUE_TAG);
                        out.push(arr.value(i) as u8);
                    }
                }
            }
            DataType::Utf8 => encode_varlen!(as_string_opt, i32, str::as_bytes),
            DataType::LargeUtf8 => encode_varlen!(as_string_opt, i64, str::as_bytes),
            DataType::Binary => encode_varlen!(as_binary_opt, i32, std::convert::identity),
            DataType::LargeBinary => encode_varlen!(as_binary_opt, i64, std::convert::identity),
            other => return Err(unsupported(other)),
        }
        Ok(out)
    }

    fn deserialize(&self, data_type: &DataType, bytes: &[u8]) -> Result<ArrayRef> {
        macro_rules! decode_fixed {
            ($arrow_ty:ty, $native:ty) => {{
                const W: usize = std::mem::size_of::<$native>();
                let mut values: Vec<Option<$native>> = Vec::with_capacity(bytes.len() / (W + 1));
                let mut off = 0usize;
                while let Some(tag) = read_u8(bytes, &mut off) {
                    match tag {
                        NULL_TAG => values.push(None),
                        VALUE_TAG => {
                            let raw: [u8; W] = take(bytes, &mut off, W)
                                .and_then(|b| b.try_into().ok())
                                .ok_or_else(|| truncated(off))?;
                            values.push(Some(<$native>::from_le_bytes(raw)));
                        }
                        other => return Err(bad_tag(other, off - 1)),
                    }
                }
                Arc::new(PrimitiveArray::<$arrow_ty>::from(values)) as ArrayRef
            }};
        }

        let array: ArrayRef = match data_type {
            DataType::Int8 => decode_fixed!(Int8Type, i8),
            DataType::Int16 => decode_fixed!(Int16Type, i16),
            DataType::Int32 => decode_fixed!(Int32Type, i32),
            DataType::Int64 => decode_fixed!(Int64Type, i64),
            DataType::UInt8 => decode_fixed!(UInt8Type, u8),
            DataType::UInt16 => decode_fixed!(UInt16Type, u16),
            DataType::UInt32 => decode_fixed!(UInt32Type, u32),
            DataType::UInt64 => decode_fixed!(UInt64Type, u64),
            DataType::Float32 => decode_fixed!(Float32Type, f32),
            DataType::Float64 => decode_fixed!(Float64Type, f64),
            DataType::Date32 => decode_fixed!(Date32Type, i32),
            DataType::Date64 => decode_fixed!(Date64Type, i64),
            DataType::Boolean => {
                let mut values: Vec<Option<bool>> = Vec::with_capacity(bytes.len() / 2);
                let mut off = 0usize;
                while let Some(tag) = read_u8(bytes, &mut off) {
                    match tag {
                        NULL_TAG => values.push(None),
                        VALUE_TAG => match read_u8(bytes, &mut off) {
                            Some(0) => values.push(Some(false)),
                            Some(1) => values.push(Some(true)),
                            Some(b) => {
                                return Err(Error::invalid_argument(format!(
                                    "invalid boolean byte {b} at byte {}",
                                    off - 1
                                )));
                            }
                            None => return Err(truncated(off)),
                        },
                        other => return Err(bad_tag(other, off - 1)),
                    }
                }
                Arc::new(BooleanArray::from(values))
            }
            DataType::Utf8 => Arc::new(StringArray::from(to_utf8(read_varlen_frames(bytes)?)?)),
            DataType::LargeUtf8 => Arc::new(LargeStringArray::from(to_utf8(
                read_varlen_frames(bytes)?,
            )?)),
            DataType::Binary => Arc::new(BinaryArray::from_opt_vec(read_varlen_frames(bytes)?)),
            DataType::LargeBinary => {
                Arc::new(LargeBinaryArray::from_opt_vec(read_varlen_frames(bytes)?))
            }
            other => return Err(unsupported(other)),
        };
        Ok(array)
    }

    fn row_sizes(&self, array: &dyn Array) -> Result<Vec<u64>> {
        let dt = array.data_type();
        if let Some(width) = fixed_width(dt) {
            return Ok((0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        TAG_BYTES
                    } else {
                        TAG_BYTES + width
                    }
                })
                .collect());
        }

        macro_rules! varlen_sizes {
            ($downcast:ident, $offset:ty) => {{
                let arr = array.$downcast::<$offset>().ok_or_else(|| mismatch(dt))?;
                (0..arr.len())
                    .map(|i| {
                        if arr.is_null(i) {
                            TAG_BYTES
                        } else {
                            TAG_BYTES + LEN_PREFIX_BYTES + arr.value(i).len() as u64
                        }
                    })
                    .collect()
            }};
        }

        let sizes = match dt {
            DataType::Utf8 => varlen_sizes!(as_string_opt, i32),
            DataType::LargeUtf8 => varlen_sizes!(as_string_opt, i64),
            DataType::Binary => varlen_sizes!(as_binary_opt, i32),
            DataType::LargeBinary => varlen_sizes!(as_binary_opt, i64),
            other => return Err(unsupported(other)),
        };
        Ok(sizes)
    }
}
