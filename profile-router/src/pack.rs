//! Bit-packing primitives.
//!
//! The scan keeps most of its working data in packed integers: a trip
//! position rides in the low byte of a connection payload, and the transfer
//! table exposes the transfers arriving at a station as a packed index
//! interval. Both encodings share the same 24-bit/8-bit split.

use std::fmt;
use std::ops::Range;

/// Error returned when a value does not fit its packed field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// High field needs more than 24 bits
    #[error("value {0} does not fit in 24 bits")]
    Overflow24(u64),

    /// Low field needs more than 8 bits
    #[error("value {0} does not fit in 8 bits")]
    Overflow8(u64),

    /// Interval end precedes its start
    #[error("interval end {end} precedes start {start}")]
    ReversedInterval { start: usize, end: usize },
}

/// Packs a 24-bit value and an 8-bit value into one `u32`.
///
/// # Examples
///
/// ```
/// use profile_router::pack::{pack_24_8, unpack_24, unpack_8};
///
/// let word = pack_24_8(0x123456, 0x78).unwrap();
/// assert_eq!(unpack_24(word), 0x123456);
/// assert_eq!(unpack_8(word), 0x78);
///
/// // Values that don't fit are rejected
/// assert!(pack_24_8(1 << 24, 0).is_err());
/// assert!(pack_24_8(0, 256).is_err());
/// ```
pub fn pack_24_8(bits24: u32, bits8: u32) -> Result<u32, PackError> {
    if bits24 >> 24 != 0 {
        return Err(PackError::Overflow24(bits24 as u64));
    }
    if bits8 >> 8 != 0 {
        return Err(PackError::Overflow8(bits8 as u64));
    }
    Ok((bits24 << 8) | bits8)
}

/// Returns the 24 most significant bits of a packed word.
pub fn unpack_24(word: u32) -> u32 {
    word >> 8
}

/// Returns the 8 least significant bits of a packed word.
pub fn unpack_8(word: u32) -> u32 {
    word & 0xFF
}

/// A half-open index interval `[start, end)` packed into one `u32`.
///
/// The start occupies the high 24 bits and the length the low 8 bits, so an
/// interval can cover at most 255 indices. Used for the contiguous runs of
/// transfer indices arriving at a station.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedRange(u32);

impl PackedRange {
    /// An empty interval starting at index 0.
    pub const EMPTY: PackedRange = PackedRange(0);

    /// Packs the interval `[start_inclusive, end_exclusive)`.
    ///
    /// # Errors
    ///
    /// Fails if the end precedes the start, if the start needs more than
    /// 24 bits, or if the length needs more than 8 bits.
    pub fn new(start_inclusive: usize, end_exclusive: usize) -> Result<Self, PackError> {
        if end_exclusive < start_inclusive {
            return Err(PackError::ReversedInterval {
                start: start_inclusive,
                end: end_exclusive,
            });
        }
        if start_inclusive >> 24 != 0 {
            return Err(PackError::Overflow24(start_inclusive as u64));
        }
        let length = end_exclusive - start_inclusive;
        if length >> 8 != 0 {
            return Err(PackError::Overflow8(length as u64));
        }
        Ok(PackedRange(((start_inclusive as u32) << 8) | length as u32))
    }

    /// Returns the first index of the interval.
    pub fn start_inclusive(self) -> usize {
        unpack_24(self.0) as usize
    }

    /// Returns the number of indices in the interval.
    pub fn length(self) -> usize {
        unpack_8(self.0) as usize
    }

    /// Returns the index one past the last of the interval.
    pub fn end_exclusive(self) -> usize {
        self.start_inclusive() + self.length()
    }

    /// Returns true if the interval contains no indices.
    pub fn is_empty(self) -> bool {
        self.length() == 0
    }

    /// Returns the interval as an iterable index range.
    pub fn indices(self) -> Range<usize> {
        self.start_inclusive()..self.end_exclusive()
    }
}

impl fmt::Debug for PackedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PackedRange({}..{})",
            self.start_inclusive(),
            self.end_exclusive()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack() {
        let word = pack_24_8(42, 7).unwrap();
        assert_eq!(unpack_24(word), 42);
        assert_eq!(unpack_8(word), 7);
    }

    #[test]
    fn pack_boundary_values() {
        let max = pack_24_8((1 << 24) - 1, 255).unwrap();
        assert_eq!(unpack_24(max), (1 << 24) - 1);
        assert_eq!(unpack_8(max), 255);

        let zero = pack_24_8(0, 0).unwrap();
        assert_eq!(unpack_24(zero), 0);
        assert_eq!(unpack_8(zero), 0);
    }

    #[test]
    fn pack_rejects_overflow() {
        assert_eq!(pack_24_8(1 << 24, 0), Err(PackError::Overflow24(1 << 24)));
        assert_eq!(pack_24_8(0, 256), Err(PackError::Overflow8(256)));
    }

    #[test]
    fn range_roundtrip() {
        let range = PackedRange::new(100, 130).unwrap();
        assert_eq!(range.start_inclusive(), 100);
        assert_eq!(range.length(), 30);
        assert_eq!(range.end_exclusive(), 130);
        assert!(!range.is_empty());
    }

    #[test]
    fn range_empty() {
        let range = PackedRange::new(17, 17).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.indices().count(), 0);
        assert!(PackedRange::EMPTY.is_empty());
    }

    #[test]
    fn range_indices_iterate_in_order() {
        let range = PackedRange::new(3, 6).unwrap();
        assert_eq!(range.indices().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn range_rejects_invalid() {
        assert!(matches!(
            PackedRange::new(5, 4),
            Err(PackError::ReversedInterval { start: 5, end: 4 })
        ));
        assert!(matches!(
            PackedRange::new(1 << 24, 1 << 24),
            Err(PackError::Overflow24(_))
        ));
        assert!(matches!(
            PackedRange::new(0, 256),
            Err(PackError::Overflow8(256))
        ));
    }

    #[test]
    fn range_boundary_length() {
        let range = PackedRange::new(0, 255).unwrap();
        assert_eq!(range.length(), 255);
        assert_eq!(range.end_exclusive(), 255);
    }
}
