//! Seeded create/remove sequences.
//!
//! A [`Plan`] is generated once, outside the measured loop, and replayed against any storage
//! op by op, so every run of a benchmark performs the same work.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a churn plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Create a value and remember it.
    Create,
    /// Remove the remembered value at this index (swap-removed from the live list).
    Remove(usize),
}

/// A reproducible sequence of operations.
#[derive(Clone, Debug)]
pub struct Plan {
    ops: Vec<Op>,
}

impl Plan {
    /// Generate `len` operations, creating with probability `create_ratio`.
    ///
    /// The live count never goes negative, so every `Remove` index is valid when replayed in
    /// order.
    pub fn new(seed: u64, len: usize, create_ratio: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut live = 0usize;
        let ops = (0..len)
            .map(|_| {
                if live == 0 || rng.gen_bool(create_ratio) {
                    live += 1;
                    Op::Create
                } else {
                    let index = rng.gen_range(0..live);
                    live -= 1;
                    Op::Remove(index)
                }
            })
            .collect();
        Self { ops }
    }

    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }
}
