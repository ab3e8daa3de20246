// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collapsing subtests into top-level groups.
//!
//! The number and names of subtests vary from run to run, but the top-level test a subtest
//! belongs to is stable. Grouping by the top-level name means the packer balances units of work
//! that can actually be selected, and keeps the generated patterns short.

use crate::timings::{TestRecord, sort_records};
use std::collections::BTreeMap;
use tracing::debug;

/// Sums the elapsed times of all records that share a [group name](TestRecord::group_name).
///
/// Returns one record per group, sorted by [`TestRecord::cmp_by_elapsed_desc`].
pub fn aggregate(records: &[TestRecord]) -> Vec<TestRecord> {
    let mut groups = BTreeMap::<&str, f64>::new();
    for record in records {
        *groups.entry(record.group_name()).or_default() += record.elapsed();
    }

    let mut aggregated: Vec<_> = groups
        .into_iter()
        .map(|(name, elapsed)| TestRecord::new(name, elapsed))
        .collect();
    sort_records(&mut aggregated);

    debug!(
        "aggregated {} test timings into {} groups",
        records.len(),
        aggregated.len()
    );
    aggregated
}
