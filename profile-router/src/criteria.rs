//! Packed journey criteria.
//!
//! A journey option toward the destination is summarized by up to three
//! criteria (departure time, arrival time, number of changes) plus an opaque
//! payload used to trace the route back. All four ride in one `u64`:
//!
//! ```text
//! 63          51          39      32                    0
//! +-----------+-----------+-------+---------------------+
//! | dep (12b) | arr (12b) | chg 7 |    payload (32b)    |
//! +-----------+-----------+-------+---------------------+
//! ```
//!
//! The departure field stores the *complement* `4095 - (dep + 240)`, so a
//! later departure yields a smaller word, and an all-zero field doubles as
//! the "no departure" sentinel. Because the fields occupy bit positions in
//! exactly their priority order, plain `u64` comparison orders words by
//! (latest departure, earliest arrival, fewest changes), which is what lets
//! [`crate::front::ParetoFrontBuilder`] insert positionally instead of
//! sorting.
//!
//! Times are minutes relative to midnight of the service day and may spill
//! into the previous or next day, hence the valid range `[-240, 2880)`.

use std::fmt;

const DEP_SHIFT: u32 = 51;
const ARR_SHIFT: u32 = 39;
const CHANGES_SHIFT: u32 = 32;

const MASK_12_BITS: u64 = 0xFFF;
const MASK_7_BITS: u64 = 0x7F;
pub(crate) const PAYLOAD_MASK: u64 = 0xFFFF_FFFF;

/// Minute values are biased by this before packing so they are non-negative.
const MINS_BIAS: i32 = 240;

/// Earliest representable minute of day (inclusive).
pub const MIN_MINS: i32 = -240;
/// Latest representable minute of day (exclusive).
pub const MAX_MINS: i32 = 2880;
/// Upper bound (exclusive) on the change count.
pub const MAX_CHANGES: u32 = 128;

/// Error returned when a criteria field is outside its declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    /// Arrival minute outside `[-240, 2880)`
    #[error("arrival time {0} is outside [-240, 2880)")]
    ArrivalOutOfRange(i32),

    /// Departure minute outside `[-240, 2880)`
    #[error("departure time {0} is outside [-240, 2880)")]
    DepartureOutOfRange(i32),

    /// Change count outside `[0, 128)`
    #[error("change count {0} is outside [0, 128)")]
    TooManyChanges(u32),
}

/// A packed criteria word.
///
/// Construction validates every field, so any `PackedCriteria` value holds
/// in-range criteria by construction. The derived `Ord` is the raw `u64`
/// order described in the module docs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedCriteria(u64);

impl PackedCriteria {
    /// Packs an arrival time, change count and payload, with no departure.
    ///
    /// # Errors
    ///
    /// Fails if `arr_mins` is outside `[-240, 2880)` or `changes` is 128 or
    /// more.
    ///
    /// # Examples
    ///
    /// ```
    /// use profile_router::criteria::PackedCriteria;
    ///
    /// let c = PackedCriteria::pack(620, 2, 0xDEAD_BEEF).unwrap();
    /// assert!(!c.has_dep_mins());
    /// assert_eq!(c.arr_mins(), 620);
    /// assert_eq!(c.changes(), 2);
    /// assert_eq!(c.payload(), 0xDEAD_BEEF);
    /// ```
    pub fn pack(arr_mins: i32, changes: u32, payload: u32) -> Result<Self, CriteriaError> {
        if !(MIN_MINS..MAX_MINS).contains(&arr_mins) {
            return Err(CriteriaError::ArrivalOutOfRange(arr_mins));
        }
        if changes >= MAX_CHANGES {
            return Err(CriteriaError::TooManyChanges(changes));
        }
        let arr = ((arr_mins + MINS_BIAS) as u64) << ARR_SHIFT;
        let chg = (changes as u64) << CHANGES_SHIFT;
        Ok(PackedCriteria(arr | chg | payload as u64))
    }

    pub(crate) fn bits(self) -> u64 {
        self.0
    }

    /// Returns true if the word carries a departure time.
    pub fn has_dep_mins(self) -> bool {
        (self.0 >> DEP_SHIFT) != 0
    }

    /// Returns the departure time in minutes.
    ///
    /// # Panics
    ///
    /// Panics if the word carries no departure time.
    pub fn dep_mins(self) -> i32 {
        assert!(self.has_dep_mins(), "criteria has no departure time");
        4095 - (self.0 >> DEP_SHIFT) as i32 - MINS_BIAS
    }

    /// Returns the arrival time in minutes.
    pub fn arr_mins(self) -> i32 {
        ((self.0 >> ARR_SHIFT) & MASK_12_BITS) as i32 - MINS_BIAS
    }

    /// Returns the number of changes.
    pub fn changes(self) -> u32 {
        ((self.0 >> CHANGES_SHIFT) & MASK_7_BITS) as u32
    }

    /// Returns the opaque 32-bit payload.
    pub fn payload(self) -> u32 {
        self.0 as u32
    }

    /// Returns true if `self` is at least as good as `other` on every
    /// criterion: departure no earlier, arrival no later, no more changes.
    /// The payload does not participate.
    ///
    /// # Panics
    ///
    /// Panics if one word carries a departure time and the other does not;
    /// such words are not comparable.
    pub fn dominates_or_is_equal(self, other: Self) -> bool {
        assert_eq!(
            self.has_dep_mins(),
            other.has_dep_mins(),
            "criteria are only comparable when both have or both lack a departure time"
        );
        let dep_ok = !self.has_dep_mins() || self.dep_mins() >= other.dep_mins();
        dep_ok && self.arr_mins() <= other.arr_mins() && self.changes() <= other.changes()
    }

    /// Returns the word with its departure field cleared.
    pub fn without_dep_mins(self) -> Self {
        PackedCriteria(self.0 & ((1 << DEP_SHIFT) - 1))
    }

    /// Returns the word with the given departure time set, replacing any
    /// previous one.
    ///
    /// # Errors
    ///
    /// Fails if `dep_mins` is outside `[-240, 2880)`.
    pub fn with_dep_mins(self, dep_mins: i32) -> Result<Self, CriteriaError> {
        if !(MIN_MINS..MAX_MINS).contains(&dep_mins) {
            return Err(CriteriaError::DepartureOutOfRange(dep_mins));
        }
        let complement = (4095 - (dep_mins + MINS_BIAS)) as u64;
        Ok(PackedCriteria(
            self.without_dep_mins().0 | (complement << DEP_SHIFT),
        ))
    }

    /// Returns the word with one more change.
    ///
    /// # Errors
    ///
    /// Fails if the change count is already 127.
    pub fn with_additional_change(self) -> Result<Self, CriteriaError> {
        let changes = self.changes() + 1;
        if changes >= MAX_CHANGES {
            return Err(CriteriaError::TooManyChanges(changes));
        }
        let cleared = self.0 & !(MASK_7_BITS << CHANGES_SHIFT);
        Ok(PackedCriteria(cleared | (changes as u64) << CHANGES_SHIFT))
    }

    /// Returns the word with the given payload, replacing the previous one.
    pub fn with_payload(self, payload: u32) -> Self {
        PackedCriteria((self.0 & !PAYLOAD_MASK) | payload as u64)
    }
}

impl fmt::Debug for PackedCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_dep_mins() {
            write!(
                f,
                "({}, {}, {})",
                self.dep_mins(),
                self.arr_mins(),
                self.changes()
            )
        } else {
            write!(f, "({}, {})", self.arr_mins(), self.changes())
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip over the full criteria domain
        #[test]
        fn pack_roundtrip(
            arr in MIN_MINS..MAX_MINS,
            changes in 0u32..MAX_CHANGES,
            payload in any::<u32>(),
        ) {
            let c = PackedCriteria::pack(arr, changes, payload).unwrap();
            prop_assert_eq!(c.arr_mins(), arr);
            prop_assert_eq!(c.changes(), changes);
            prop_assert_eq!(c.payload(), payload);
            prop_assert!(!c.has_dep_mins());
        }

        /// Departure injection preserves the other fields and roundtrips
        #[test]
        fn dep_roundtrip(
            arr in MIN_MINS..MAX_MINS,
            dep in MIN_MINS..MAX_MINS,
            changes in 0u32..MAX_CHANGES,
            payload in any::<u32>(),
        ) {
            let c = PackedCriteria::pack(arr, changes, payload)
                .unwrap()
                .with_dep_mins(dep)
                .unwrap();
            prop_assert!(c.has_dep_mins());
            prop_assert_eq!(c.dep_mins(), dep);
            prop_assert_eq!(c.arr_mins(), arr);
            prop_assert_eq!(c.changes(), changes);
            prop_assert_eq!(c.payload(), payload);
        }

        /// Raw word order follows the criteria priority order
        #[test]
        fn order_is_priority_order(
            arr_a in MIN_MINS..MAX_MINS,
            arr_b in MIN_MINS..MAX_MINS,
            chg_a in 0u32..MAX_CHANGES,
            chg_b in 0u32..MAX_CHANGES,
        ) {
            let a = PackedCriteria::pack(arr_a, chg_a, 0).unwrap();
            let b = PackedCriteria::pack(arr_b, chg_b, 0).unwrap();
            prop_assert_eq!(a.cmp(&b), (arr_a, chg_a).cmp(&(arr_b, chg_b)));
        }
    }
}
