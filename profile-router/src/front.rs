//! Pareto fronts of packed criteria.
//!
//! A front is an antichain under [`PackedCriteria::dominates_or_is_equal`]:
//! no entry dominates another. The builder maintains the antichain under
//! streaming insertion; [`ParetoFrontBuilder::build`] freezes it into an
//! immutable [`ParetoFront`] that can be shared freely.

use std::fmt;

use crate::criteria::{CriteriaError, PAYLOAD_MASK, PackedCriteria};

/// An immutable, dominance-pruned front.
///
/// Entries are kept in raw word order, which by the packed layout is
/// (latest departure, earliest arrival, fewest changes) first.
#[derive(Clone, PartialEq, Eq)]
pub struct ParetoFront {
    tuples: Box<[PackedCriteria]>,
}

impl ParetoFront {
    /// Returns an empty front.
    pub fn empty() -> Self {
        ParetoFront {
            tuples: Box::default(),
        }
    }

    /// Returns the number of entries.
    pub fn size(&self) -> usize {
        self.tuples.len()
    }

    /// Returns true if the front has no entries.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Visits every entry in order.
    pub fn iter(&self) -> impl Iterator<Item = PackedCriteria> + '_ {
        self.tuples.iter().copied()
    }

    /// Finds the entry with exactly the given arrival time and change count.
    ///
    /// Returns `None` when no such entry exists; callers use this only when
    /// their own prior computation guarantees one does.
    pub fn get(&self, arr_mins: i32, changes: u32) -> Option<PackedCriteria> {
        self.tuples
            .iter()
            .copied()
            .find(|c| c.arr_mins() == arr_mins && c.changes() == changes)
    }
}

impl fmt::Debug for ParetoFront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tuples.iter()).finish()
    }
}

/// A growable front, owned by exactly one computation at a time.
#[derive(Debug, Clone, Default)]
pub struct ParetoFrontBuilder {
    tuples: Vec<PackedCriteria>,
}

impl ParetoFrontBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the front under construction is empty.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Returns the number of entries currently in the front.
    pub fn size(&self) -> usize {
        self.tuples.len()
    }

    /// Empties the front, keeping the backing storage.
    pub fn clear(&mut self) {
        self.tuples.clear();
    }

    /// Visits every entry in order.
    pub fn iter(&self) -> impl Iterator<Item = PackedCriteria> + '_ {
        self.tuples.iter().copied()
    }

    /// Inserts a word, maintaining the antichain and the sort order.
    ///
    /// If an existing entry dominates the incoming word the front is left
    /// unchanged; otherwise the word is inserted at its sort position and
    /// every entry it dominates is dropped. For the position scan the
    /// incoming word's payload is treated as all-ones, so that entries equal
    /// on the real criteria but differing in payload compare deterministically
    /// and are then caught by the dominance check.
    pub fn add(&mut self, tuple: PackedCriteria) -> &mut Self {
        let key = tuple.bits() | PAYLOAD_MASK;

        let mut insert_at = 0;
        while insert_at < self.tuples.len() && key > self.tuples[insert_at].bits() {
            if self.tuples[insert_at].dominates_or_is_equal(tuple) {
                return self;
            }
            insert_at += 1;
        }

        // Compact the tail: drop every remaining entry the new word dominates.
        let mut keep = insert_at;
        for src in insert_at..self.tuples.len() {
            if tuple.dominates_or_is_equal(self.tuples[src]) {
                continue;
            }
            self.tuples[keep] = self.tuples[src];
            keep += 1;
        }
        self.tuples.truncate(keep);

        self.tuples.insert(insert_at, tuple);
        self
    }

    /// Re-inserts every entry of `other` into this front.
    pub fn add_all(&mut self, other: &ParetoFrontBuilder) -> &mut Self {
        for tuple in &other.tuples {
            self.add(*tuple);
        }
        self
    }

    /// Returns true if every entry of `other`, taken with `dep_mins` as its
    /// departure time, is dominated by (or equal to) some entry of this
    /// front. Used to decide whether propagating a freshly computed front to
    /// a neighboring station would add anything new.
    ///
    /// # Errors
    ///
    /// Fails if `dep_mins` is outside `[-240, 2880)`.
    pub fn fully_dominates(
        &self,
        other: &ParetoFrontBuilder,
        dep_mins: i32,
    ) -> Result<bool, CriteriaError> {
        for tuple in &other.tuples {
            let probe = tuple.with_dep_mins(dep_mins)?;
            if !self.tuples.iter().any(|c| c.dominates_or_is_equal(probe)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Freezes the front under construction into an immutable copy.
    pub fn build(&self) -> ParetoFront {
        ParetoFront {
            tuples: self.tuples.clone().into_boxed_slice(),
        }
    }
}
