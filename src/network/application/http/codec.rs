//! Percent-encoding codec, form-urlencoded variant.
//!
//! Unreserved bytes (ALPHA / DIGIT / `-_.~`) pass through, space maps to
//! `+`, everything else becomes `%` plus two uppercase hex digits. The
//! slice-based functions keep the embedded bounded-memory guarantee: they
//! never write past the destination, always leave it `0`-terminated, and an
//! escape sequence is emitted whole or not at all. The `heapless` variants
//! are the convenience API for callers already holding a growable-style
//! container.

use heapless::{String, Vec};

use crate::network::error::Error;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Decode one input position: either a full `%XX` escape, a `+`, or a
/// literal byte. Returns the decoded byte and the index of the next input
/// position.
fn decode_step(src: &[u8], i: usize) -> Result<(u8, usize), Error> {
    match src[i] {
        b'%' => {
            let (Some(&hi), Some(&lo)) = (src.get(i + 1), src.get(i + 2)) else {
                return Err(Error::InvalidEscape);
            };
            match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => Ok(((hi << 4) | lo, i + 3)),
                _ => Err(Error::InvalidEscape),
            }
        }
        b'+' => Ok((b' ', i + 1)),
        other => Ok((other, i + 1)),
    }
}

/// Percent-encode `src` into `dest`, returning the encoded length.
///
/// One byte of `dest` is reserved for the terminating `0`, which is written
/// on every exit path. Before emitting a three-byte escape the remaining
/// capacity is checked, so a truncated output never ends mid-escape. On
/// insufficient room the output produced so far stays in `dest` (useful for
/// diagnostics) and `Err(Overflow)` is returned.
pub fn encode_into(src: &[u8], dest: &mut [u8]) -> Result<usize, Error> {
    debug_assert!(!dest.is_empty());

    let mut pos = 0;
    for &byte in src {
        if is_unreserved(byte) || byte == b' ' {
            if pos + 1 >= dest.len() {
                dest[pos] = 0;
                return Err(Error::Overflow);
            }
            dest[pos] = if byte == b' ' { b'+' } else { byte };
            pos += 1;
        } else {
            if pos + 3 >= dest.len() {
                dest[pos] = 0;
                return Err(Error::Overflow);
            }
            dest[pos] = b'%';
            dest[pos + 1] = HEX_UPPER[usize::from(byte >> 4)];
            dest[pos + 2] = HEX_UPPER[usize::from(byte & 0x0F)];
            pos += 3;
        }
    }

    dest[pos] = 0;
    Ok(pos)
}

/// Percent-decode `src` into `dest`, returning the decoded length.
///
/// `%` must be followed by exactly two hex digits (case-insensitive); a
/// lone or short escape yields `Err(InvalidEscape)`. Exhausting `dest`
/// (less the reserved terminator byte) yields `Err(Overflow)`. In both
/// cases decoding stops at the offending position and `dest` is left
/// `0`-terminated with the partial output intact.
pub fn decode_into(src: &[u8], dest: &mut [u8]) -> Result<usize, Error> {
    debug_assert!(!dest.is_empty());

    let mut pos = 0;
    let mut i = 0;
    while i < src.len() {
        let (byte, next) = match decode_step(src, i) {
            Ok(step) => step,
            Err(e) => {
                dest[pos] = 0;
                return Err(e);
            }
        };
        if pos + 1 >= dest.len() {
            dest[pos] = 0;
            return Err(Error::Overflow);
        }
        dest[pos] = byte;
        pos += 1;
        i = next;
    }

    dest[pos] = 0;
    Ok(pos)
}

/// Percent-encode `src`, appending to a `heapless` string.
///
/// Escape sequences are appended atomically; on overflow the destination
/// keeps everything encoded so far and `Err(Overflow)` is returned.
pub fn encode_append<const N: usize>(src: &[u8], dest: &mut String<N>) -> Result<(), Error> {
    for &byte in src {
        if is_unreserved(byte) {
            dest.push(byte as char).map_err(|_| Error::Overflow)?;
        } else if byte == b' ' {
            dest.push('+').map_err(|_| Error::Overflow)?;
        } else {
            let escape = [
                b'%',
                HEX_UPPER[usize::from(byte >> 4)],
                HEX_UPPER[usize::from(byte & 0x0F)],
            ];
            // The escape bytes are ASCII, so the conversion cannot fail.
            let escape = core::str::from_utf8(&escape).map_err(|_| Error::InvalidEscape)?;
            dest.push_str(escape).map_err(|_| Error::Overflow)?;
        }
    }
    Ok(())
}

/// Percent-decode `src`, appending the raw bytes to a `heapless` vector.
pub fn decode_append<const N: usize>(src: &[u8], dest: &mut Vec<u8, N>) -> Result<(), Error> {
    let mut i = 0;
    while i < src.len() {
        let (byte, next) = decode_step(src, i)?;
        dest.push(byte).map_err(|_| Error::Overflow)?;
        i = next;
    }
    Ok(())
}
