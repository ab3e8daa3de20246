// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support for partitioning test runs across several machines.
//!
//! Tests are packed into shards using their historical elapsed times. Long tests are placed with
//! the Longest-Processing-Time heuristic: each one goes to the currently least-loaded shard, which
//! keeps the slowest shard within `4/3 - 1/(3 * total)` of optimal. Short tests barely affect the
//! balance, so they are dealt out round-robin (optionally shuffled) without re-sorting.
//!
//! Packing is a pure function of its inputs: the same records, shard count and seed always produce
//! the same bins.

use crate::{
    errors::{ShardCountError, ShardIndexOutOfBounds},
    pattern::ShardPattern,
    timings::TestRecord,
};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use sharder_metadata::{ShardPlanSummary, ShardSummary};
use std::num::NonZeroUsize;
use tracing::debug;

/// Tests that take at most this many seconds are considered short.
///
/// Short tests are distributed round-robin rather than by load.
pub const SHORT_TEST_THRESHOLD: f64 = 0.5;

/// The tests assigned to a single shard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bin {
    members: Vec<TestRecord>,
    total: f64,
}

impl Bin {
    /// Returns the tests in this bin, in the order they were assigned.
    pub fn members(&self) -> &[TestRecord] {
        &self.members
    }

    /// Returns the names of the tests in this bin, in the order they were assigned.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|record| record.name())
    }

    /// Returns the sum of the elapsed times of the tests in this bin.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Returns true if no tests were assigned to this bin.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn push(&mut self, record: &TestRecord) {
        self.total += record.elapsed();
        self.members.push(record.clone());
    }
}

/// Packs `records` into `total` bins.
///
/// `records` should already be sorted by [`TestRecord::cmp_by_elapsed_desc`], as returned by
/// [`aggregate`](crate::aggregate::aggregate). If `seed` is non-zero, short tests are shuffled
/// with a generator seeded from it before being dealt out.
///
/// If there are fewer records than bins, some bins are returned empty.
pub fn pack(records: &[TestRecord], total: NonZeroUsize, seed: i64) -> Vec<Bin> {
    let total = total.get();
    let mut bins = vec![Bin::default(); total];

    let (long, mut short): (Vec<&TestRecord>, Vec<&TestRecord>) = records
        .iter()
        .partition(|record| record.elapsed() > SHORT_TEST_THRESHOLD);

    for record in long {
        // bins[0] is always the least-loaded bin.
        bins[0].push(record);
        // sort_by is stable, so equal-total bins keep their relative order.
        bins.sort_by(|a, b| a.total.total_cmp(&b.total));
    }

    if seed != 0 {
        // The generator is scoped to this call so that results only depend on the arguments.
        // Negative seeds are reinterpreted bit-for-bit.
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        short.shuffle(&mut rng);
    }

    for (i, record) in short.into_iter().enumerate() {
        bins[i % total].push(record);
    }

    bins.reverse();
    bins
}

/// Options used to build a [`ShardPlan`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ShardPlanOptions {
    total_shards: NonZeroUsize,
    seed: i64,
}

impl ShardPlanOptions {
    /// Creates a new set of options.
    ///
    /// Returns an error if `total_shards` is 0.
    pub fn new(total_shards: usize, seed: i64) -> Result<Self, ShardCountError> {
        let total_shards =
            NonZeroUsize::new(total_shards).ok_or_else(|| ShardCountError::new(total_shards))?;
        Ok(Self { total_shards, seed })
    }

    /// Returns the number of shards.
    pub fn total_shards(&self) -> NonZeroUsize {
        self.total_shards
    }

    /// Returns the seed used to shuffle short tests. 0 means no shuffling.
    pub fn seed(&self) -> i64 {
        self.seed
    }
}

/// A set of tests packed into shards.
#[derive(Clone, Debug, PartialEq)]
pub struct ShardPlan {
    options: ShardPlanOptions,
    bins: Vec<Bin>,
}

impl ShardPlan {
    /// Packs aggregated `records` according to `options`.
    pub fn new(records: &[TestRecord], options: ShardPlanOptions) -> Self {
        let bins = pack(records, options.total_shards, options.seed);
        for (index, bin) in bins.iter().enumerate() {
            debug!(
                "shard {index}: {} test groups, {:.3}s total",
                bin.members.len(),
                bin.total,
            );
        }
        Self { options, bins }
    }

    /// Returns the options this plan was built with.
    pub fn options(&self) -> ShardPlanOptions {
        self.options
    }

    /// Returns the bins, indexed by shard.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Returns the selection pattern for the shard at `index`.
    pub fn pattern(&self, index: i64) -> Result<ShardPattern<'_>, ShardIndexOutOfBounds> {
        ShardPattern::new(&self.bins, index)
    }

    /// Constructs a serializable summary for this plan.
    pub fn to_summary(&self) -> ShardPlanSummary {
        let mut summary =
            ShardPlanSummary::new(self.options.total_shards.get(), self.options.seed);
        summary.shards = self
            .bins
            .iter()
            .enumerate()
            .map(|(index, bin)| {
                ShardSummary::new(index, bin.total, bin.names().map(str::to_owned).collect())
            })
            .collect();
        summary
    }
}
