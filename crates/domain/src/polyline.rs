//! Route geometry codec
//!
//! Decoder for the compact ASCII polyline encoding used by the directions
//! endpoint: interleaved latitude/longitude deltas, each a zigzag-encoded
//! signed varint built from 5-bit groups biased by 63, scale factor 1e5.

use thiserror::Error;

use crate::value_objects::{Coordinate, InvalidCoordinates};

/// Coordinate scale factor of the wire format
const SCALE: f64 = 1e5;

/// Continuation bit of a 5-bit group
const CONTINUATION: u64 = 0x20;

/// Errors that can occur while decoding a polyline string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// Input ended in the middle of a varint
    #[error("Polyline ends mid-varint at byte {0}")]
    UnexpectedEnd(usize),

    /// Byte below the encoding bias (not a valid polyline character)
    #[error("Invalid polyline character {0:?} at byte {1}")]
    InvalidCharacter(char, usize),

    /// Varint wider than a decoded delta can be
    #[error("Varint overflow at byte {0}")]
    Overflow(usize),

    /// Accumulated position left the valid coordinate range
    #[error("Decoded coordinate out of range at byte {0}")]
    OutOfRange(usize),
}

/// Decode a polyline string into an ordered coordinate sequence.
///
/// Deterministic pure function of the input; an empty string yields an
/// empty sequence. Malformed input is an error, never a partial result.
///
/// # Errors
///
/// Returns a [`PolylineError`] if the input ends mid-varint, contains a
/// byte outside the encoding alphabet, or accumulates an out-of-range
/// coordinate.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut pos = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut coords = Vec::new();

    while pos < bytes.len() {
        let at = pos;
        lat += read_delta(bytes, &mut pos)?;
        lng += read_delta(bytes, &mut pos)?;

        #[allow(clippy::cast_precision_loss)]
        let coordinate = Coordinate::new(lat as f64 / SCALE, lng as f64 / SCALE)
            .map_err(|InvalidCoordinates| PolylineError::OutOfRange(at))?;
        coords.push(coordinate);
    }

    Ok(coords)
}

/// Read one zigzag-encoded signed varint starting at `*pos`.
fn read_delta(bytes: &[u8], pos: &mut usize) -> Result<i64, PolylineError> {
    let mut accumulated: u64 = 0;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(PolylineError::UnexpectedEnd(*pos));
        };
        if byte < 63 {
            return Err(PolylineError::InvalidCharacter(byte as char, *pos));
        }
        if shift > 58 {
            return Err(PolylineError::Overflow(*pos));
        }
        *pos += 1;

        let group = u64::from(byte - 63);
        accumulated |= (group & 0x1f) << shift;
        if group & CONTINUATION == 0 {
            break;
        }
        shift += 5;
    }

    // Undo the zigzag encoding: lowest bit selects the complement.
    #[allow(clippy::cast_possible_wrap)]
    let half = (accumulated >> 1) as i64;
    Ok(if accumulated & 1 == 1 { !half } else { half })
}
