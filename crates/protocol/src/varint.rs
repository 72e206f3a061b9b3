//! # Overview
//!
//! Variable-length integers used by the node wire format. Counts and lengths
//! are written as `varint` (32-bit) and positions and sizes as `varlong`
//! (64-bit), both in the layout rsync's `io.c` uses: a leading byte whose high
//! one-bits count the extra little-endian bytes that follow.
//!
//! # Examples
//!
//! ```
//! use protocol::{decode_varint, encode_varint_to_vec};
//!
//! let mut encoded = Vec::new();
//! encode_varint_to_vec(255, &mut encoded);
//! let (value, remainder) = decode_varint(&encoded).expect("varint decoding succeeds");
//! assert_eq!(value, 255);
//! assert!(remainder.is_empty());
//! ```

use std::io::{self, Read, Write};

/// Extra byte counts indexed by `leading_byte / 4`.
const INT_BYTE_EXTRA: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // (0x00-0x3F) / 4
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // (0x40-0x7F) / 4
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // (0x80-0xBF) / 4
    2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 6, // (0xC0-0xFF) / 4
];

/// Maximum number of additional bytes read after a varint's leading byte.
const MAX_EXTRA_BYTES: usize = 4;

/// Minimum byte count used for every varlong in the node format.
pub const VARLONG_MIN_BYTES: u8 = 3;

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn truncated() -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "truncated variable-length integer",
    )
}

/// Encodes an i32 into the varint layout.
///
/// | Leading byte | Extra bytes | Range |
/// |--------------|-------------|-------|
/// | `0xxx_xxxx` | 0 | 0..127 |
/// | `10xx_xxxx` | 1 | 0..16383 |
/// | `110x_xxxx` | 2 | 0..2097151 |
/// | `1110_xxxx` | 3 | 0..268435455 |
/// | `1111_0xxx` | 4 | any i32 |
fn encode_varint_bytes(value: i32) -> (usize, [u8; 5]) {
    let mut bytes = [0u8; 5];
    bytes[1..5].copy_from_slice(&value.to_le_bytes());

    let mut count = 4usize;
    while count > 1 && bytes[count] == 0 {
        count -= 1;
    }

    let bit = 1u8 << (7 - (count - 1) as u32);
    let top = bytes[count];

    if top >= bit {
        count += 1;
        bytes[0] = !(bit - 1);
    } else if count > 1 {
        bytes[0] = top | !((bit << 1) - 1);
    } else {
        bytes[0] = bytes[1];
    }

    (count, bytes)
}

fn varint_extra(leading: u8) -> io::Result<usize> {
    let extra = INT_BYTE_EXTRA[(leading / 4) as usize] as usize;
    if extra > MAX_EXTRA_BYTES {
        return Err(invalid_data("varint overflows 32 bits"));
    }
    Ok(extra)
}

fn assemble_varint(leading: u8, tail: &[u8]) -> i32 {
    let extra = tail.len();
    let mut buf = [0u8; 5];
    if extra > 0 {
        buf[..extra].copy_from_slice(tail);
        let bit = 1u8 << (8 - extra as u32);
        buf[extra] = leading & (bit - 1);
    } else {
        buf[0] = leading;
    }
    i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

/// Writes `value` as a varint.
pub fn write_varint<W: Write + ?Sized>(writer: &mut W, value: i32) -> io::Result<()> {
    let (len, bytes) = encode_varint_bytes(value);
    writer.write_all(&bytes[..len])
}

/// Appends `value` as a varint to `out`.
pub fn encode_varint_to_vec(value: i32, out: &mut Vec<u8>) {
    let (len, bytes) = encode_varint_bytes(value);
    out.extend_from_slice(&bytes[..len]);
}

/// Reads a varint from `reader`.
///
/// # Errors
///
/// [`io::ErrorKind::UnexpectedEof`] when the input ends early and
/// [`io::ErrorKind::InvalidData`] when the leading byte announces more than
/// four extra bytes.
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let mut leading = [0u8; 1];
    reader.read_exact(&mut leading)?;
    let extra = varint_extra(leading[0])?;
    let mut tail = [0u8; MAX_EXTRA_BYTES];
    reader.read_exact(&mut tail[..extra])?;
    Ok(assemble_varint(leading[0], &tail[..extra]))
}

/// Decodes a varint from the front of `bytes`, returning the value and the
/// remaining input.
pub fn decode_varint(bytes: &[u8]) -> io::Result<(i32, &[u8])> {
    let (&leading, rest) = bytes.split_first().ok_or_else(truncated)?;
    let extra = varint_extra(leading)?;
    if rest.len() < extra {
        return Err(truncated());
    }
    let (tail, rest) = rest.split_at(extra);
    Ok((assemble_varint(leading, tail), rest))
}

/// Encodes an i64 into the varlong layout with at least `min_bytes` bytes.
fn encode_varlong_bytes(value: i64, min_bytes: u8) -> (usize, [u8; 9]) {
    let min = usize::from(min_bytes.clamp(1, 8));
    let le = value.to_le_bytes();

    let mut cnt = 8;
    while cnt > min && le[cnt - 1] == 0 {
        cnt -= 1;
    }

    let bit = 1u8 << (7 + min - cnt);
    let leading = if le[cnt - 1] >= bit {
        cnt += 1;
        !(bit - 1)
    } else if cnt > min {
        le[cnt - 1] | !((bit << 1) - 1)
    } else {
        le[cnt - 1]
    };

    let mut out = [0u8; 9];
    out[0] = leading;
    out[1..cnt].copy_from_slice(&le[..cnt - 1]);
    (cnt, out)
}

/// Returns the total byte count (leading byte included) announced by a
/// varlong leading byte, and the mask selecting its data bits.
fn varlong_extent(leading: u8, min_bytes: u8) -> io::Result<(usize, u8)> {
    let min = usize::from(min_bytes.clamp(1, 8));
    let mut cnt = min;
    let mut bit = 0x80u8;
    while cnt < 9 && leading & bit != 0 {
        cnt += 1;
        bit >>= 1;
    }

    if cnt == min {
        return Ok((cnt, 0xFF));
    }
    if cnt == 9 && (leading & bit != 0 || leading & (bit - 1) != 0) {
        return Err(invalid_data("varlong overflows 64 bits"));
    }
    Ok((cnt, bit - 1))
}

fn assemble_varlong(leading: u8, mask: u8, tail: &[u8]) -> i64 {
    let mut buf = [0u8; 9];
    buf[..tail.len()].copy_from_slice(tail);
    buf[tail.len()] = leading & mask;
    i64::from_le_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ])
}

/// Writes `value` as a varlong of at least `min_bytes` bytes.
pub fn write_varlong<W: Write + ?Sized>(
    writer: &mut W,
    value: i64,
    min_bytes: u8,
) -> io::Result<()> {
    let (len, bytes) = encode_varlong_bytes(value, min_bytes);
    writer.write_all(&bytes[..len])
}

/// Appends `value` as a varlong of at least `min_bytes` bytes to `out`.
pub fn encode_varlong_to_vec(value: i64, min_bytes: u8, out: &mut Vec<u8>) {
    let (len, bytes) = encode_varlong_bytes(value, min_bytes);
    out.extend_from_slice(&bytes[..len]);
}

/// Reads a varlong written with the same `min_bytes`.
pub fn read_varlong<R: Read + ?Sized>(reader: &mut R, min_bytes: u8) -> io::Result<i64> {
    let mut leading = [0u8; 1];
    reader.read_exact(&mut leading)?;
    let (cnt, mask) = varlong_extent(leading[0], min_bytes)?;
    let mut tail = [0u8; 8];
    reader.read_exact(&mut tail[..cnt - 1])?;
    Ok(assemble_varlong(leading[0], mask, &tail[..cnt - 1]))
}

/// Decodes a varlong from the front of `bytes`, returning the value and the
/// remaining input.
pub fn decode_varlong(bytes: &[u8], min_bytes: u8) -> io::Result<(i64, &[u8])> {
    let (&leading, rest) = bytes.split_first().ok_or_else(truncated)?;
    let (cnt, mask) = varlong_extent(leading, min_bytes)?;
    if rest.len() < cnt - 1 {
        return Err(truncated());
    }
    let (tail, rest) = rest.split_at(cnt - 1);
    Ok((assemble_varlong(leading, mask, tail), rest))
}
