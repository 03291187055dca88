//! Per-delegate voting-power history.
//!
//! Every event that changes a delegate's power appends to (or, within one
//! block, overwrites the tail of) an ordered checkpoint sequence. Historical
//! queries binary-search the sequence; nothing is ever removed or reordered.

/// A (block height, voting power) snapshot entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// Block height at which the power took effect
    pub height: u64,
    /// Voting power after the event
    pub votes: u128,
}

/// Append-only checkpoint sequence for a single delegate.
///
/// Invariants: heights are strictly increasing, and at most one entry
/// exists per height — a second write at the tail height overwrites the
/// tail's power instead of appending.
#[derive(Debug, Clone, Default)]
pub struct Checkpoints(Vec<Checkpoint>);

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `votes` as the power at `height`.
    ///
    /// Heights must arrive in non-decreasing order; the ordered call
    /// stream driving the ledger guarantees it.
    pub fn write(&mut self, height: u64, votes: u128) {
        match self.0.last_mut() {
            Some(last) if last.height == height => {
                last.votes = votes;
            }
            Some(last) => {
                debug_assert!(last.height < height, "checkpoint heights must not decrease");
                self.0.push(Checkpoint { height, votes });
            }
            None => {
                self.0.push(Checkpoint { height, votes });
            }
        }
    }

    /// Power at the most recent checkpoint, or zero if none.
    pub fn latest(&self) -> u128 {
        self.0.last().map(|c| c.votes).unwrap_or(0)
    }

    /// Power at the last checkpoint with height <= `height`, or zero if
    /// the sequence starts after `height`. O(log n).
    pub fn prior(&self, height: u64) -> u128 {
        let idx = self.0.partition_point(|c| c.height <= height);
        if idx == 0 {
            0
        } else {
            self.0[idx - 1].votes
        }
    }

    /// Number of checkpoints recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checkpoint at `index`, if recorded.
    pub fn get(&self, index: usize) -> Option<Checkpoint> {
        self.0.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_write_appends_per_height() {
        let mut cps = Checkpoints::new();
        cps.write(10, 100);
        cps.write(11, 90);
        cps.write(15, 80);

        assert_eq!(cps.len(), 3);
        assert_eq!(cps.get(0), Some(Checkpoint { height: 10, votes: 100 }));
        assert_eq!(cps.get(2), Some(Checkpoint { height: 15, votes: 80 }));
        assert_eq!(cps.latest(), 80);
    }

    #[test]
    fn test_same_height_overwrites_tail() {
        let mut cps = Checkpoints::new();
        cps.write(10, 100);
        cps.write(10, 90);
        cps.write(10, 80);

        assert_eq!(cps.len(), 1);
        assert_eq!(cps.get(0), Some(Checkpoint { height: 10, votes: 80 }));

        cps.write(12, 100);
        assert_eq!(cps.len(), 2);
        assert_eq!(cps.get(1), Some(Checkpoint { height: 12, votes: 100 }));
    }

    #[test]
    fn test_prior_binary_search() {
        let mut cps = Checkpoints::new();
        cps.write(10, 100);
        cps.write(20, 200);
        cps.write(30, 300);

        // Before the first checkpoint
        assert_eq!(cps.prior(9), 0);
        // Exact hits
        assert_eq!(cps.prior(10), 100);
        assert_eq!(cps.prior(20), 200);
        assert_eq!(cps.prior(30), 300);
        // Between checkpoints
        assert_eq!(cps.prior(15), 100);
        assert_eq!(cps.prior(29), 200);
        // After the last
        assert_eq!(cps.prior(1_000), 300);
    }

    #[test]
    fn test_empty_sequence() {
        let cps = Checkpoints::new();
        assert!(cps.is_empty());
        assert_eq!(cps.latest(), 0);
        assert_eq!(cps.prior(0), 0);
        assert_eq!(cps.prior(u64::MAX), 0);
        assert_eq!(cps.get(0), None);
    }

    proptest! {
        /// `prior` always agrees with a linear scan over the sequence.
        #[test]
        fn prop_prior_matches_linear_scan(
            writes in proptest::collection::vec((0u64..1_000, 0u128..1_000_000), 0..64),
            query in 0u64..1_200,
        ) {
            let mut sorted = writes.clone();
            sorted.sort_by_key(|(h, _)| *h);

            let mut cps = Checkpoints::new();
            for (h, v) in &sorted {
                cps.write(*h, *v);
            }

            let mut expected = 0u128;
            for (h, v) in &sorted {
                if *h <= query {
                    expected = *v;
                }
            }
            prop_assert_eq!(cps.prior(query), expected);
        }

        /// Heights stay strictly increasing no matter the write pattern.
        #[test]
        fn prop_heights_strictly_increase(
            writes in proptest::collection::vec((0u64..100, 0u128..1_000), 0..64),
        ) {
            let mut sorted = writes.clone();
            sorted.sort_by_key(|(h, _)| *h);

            let mut cps = Checkpoints::new();
            for (h, v) in &sorted {
                cps.write(*h, *v);
            }

            for i in 1..cps.len() {
                prop_assert!(cps.get(i - 1).unwrap().height < cps.get(i).unwrap().height);
            }
        }
    }
}
