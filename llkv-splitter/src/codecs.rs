//! Little-endian cursor helpers and order-preserving u64 encoders.
//!
//! The `sortable_u64_from_*` family maps signed and floating-point values
//! onto `u64` so that unsigned comparison matches the natural numeric order.
//! Chunk statistics store min/max in this form.

#[inline]
pub(crate) fn write_u32_le(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Borrow `n` bytes at `*off` and advance the cursor. `None` if truncated.
#[inline]
pub(crate) fn take<'a>(bytes: &'a [u8], off: &mut usize, n: usize) -> Option<&'a [u8]> {
    let end = off.checked_add(n)?;
    let out = bytes.get(*off..end)?;
    *off = end;
    Some(out)
}

#[inline]
pub(crate) fn read_u8(bytes: &[u8], off: &mut usize) -> Option<u8> {
    take(bytes, off, 1).map(|b| b[0])
}

#[inline]
pub(crate) fn read_u32_le(bytes: &[u8], off: &mut usize) -> Option<u32> {
    let raw: [u8; 4] = take(bytes, off, 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

#[inline]
pub fn sortable_u64_from_i8(v: i8) -> u64 {
    ((v as u8) ^ 0x80) as u64
}

#[inline]
pub fn sortable_u64_from_i16(v: i16) -> u64 {
    ((v as u16) ^ 0x8000) as u64
}

#[inline]
pub fn sortable_u64_from_i32(v: i32) -> u64 {
    ((v as u32) ^ 0x8000_0000) as u64
}

#[inline]
pub fn sortable_u64_from_i64(v: i64) -> u64 {
    (v as u64) ^ 0x8000_0000_0000_0000
}

/// IEEE754 to lex order: negatives inverted, positives flip the sign bit.
#[inline]
pub fn sortable_u64_from_f64(v: f64) -> u64 {
    let bits = v.to_bits();
    if bits & 0x8000_0000_0000_0000 != 0 {
        !bits
    } else {
        bits ^ 0x8000_0000_0000_0000
    }
}

/// First eight bytes of `s`, big-endian, zero padded.
#[inline]
pub fn sortable_u64_from_str_prefix(s: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = s.len().min(8);
    buf[..len].copy_from_slice(&s[..len]);
    u64::from_be_bytes(buf)
}
