// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::SummaryParseError;
use serde::{Deserialize, Serialize};

/// Root element for a serializable shard plan.
///
/// This is produced by `sharder --format json` and describes every shard, not just the one that
/// was selected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct ShardPlanSummary {
    /// The number of shards the tests were packed into.
    pub total_shards: usize,

    /// The seed used to shuffle short tests. 0 means no shuffling took place.
    pub seed: i64,

    /// One entry per shard, in shard index order.
    pub shards: Vec<ShardSummary>,
}

impl ShardPlanSummary {
    /// Creates a new summary with no shards filled in.
    pub fn new(total_shards: usize, seed: i64) -> Self {
        Self {
            total_shards,
            seed,
            shards: Vec::with_capacity(total_shards),
        }
    }

    /// Returns the sum of the elapsed times across all shards.
    pub fn total_elapsed(&self) -> f64 {
        self.shards.iter().map(|shard| shard.total_elapsed).sum()
    }
}

/// A single shard within a [`ShardPlanSummary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct ShardSummary {
    /// The index of this shard, counting up from 0.
    pub index: usize,

    /// The cumulative historical duration of the tests in this shard, in seconds.
    pub total_elapsed: f64,

    /// The test groups assigned to this shard, in assignment order.
    pub tests: Vec<String>,
}

impl ShardSummary {
    /// Creates a new shard summary.
    pub fn new(index: usize, total_elapsed: f64, tests: Vec<String>) -> Self {
        Self {
            index,
            total_elapsed,
            tests,
        }
    }
}

/// Whether a selection pattern lists the tests to run or the tests to skip.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKindSummary {
    /// Only the listed tests are run.
    Include,

    /// Everything except the listed tests is run.
    Exclude,
}

/// The output of `sharder --format json`: the selected shard's pattern plus the full plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct ShardSelectionSummary {
    /// The shard that was selected.
    pub index: i64,

    /// Whether the pattern includes or excludes the listed tests.
    pub kind: PatternKindSummary,

    /// The selection pattern, as it would be printed by `--format plain`.
    pub pattern: String,

    /// The plan the pattern was generated from.
    pub plan: ShardPlanSummary,
}

impl ShardSelectionSummary {
    /// Creates a new selection summary.
    pub fn new(
        index: i64,
        kind: PatternKindSummary,
        pattern: impl Into<String>,
        plan: ShardPlanSummary,
    ) -> Self {
        Self {
            index,
            kind,
            pattern: pattern.into(),
            plan,
        }
    }

    /// Parses JSON output produced by `sharder --format json`.
    ///
    /// Also checks that the selected index is part of the plan.
    pub fn parse_json(json: impl AsRef<str>) -> Result<Self, SummaryParseError> {
        let summary: Self =
            serde_json::from_str(json.as_ref()).map_err(SummaryParseError::Json)?;
        let in_plan = usize::try_from(summary.index)
            .is_ok_and(|index| summary.plan.shards.iter().any(|shard| shard.index == index));
        if !in_plan {
            return Err(SummaryParseError::IndexNotInPlan {
                index: summary.index,
                total_shards: summary.plan.total_shards,
            });
        }
        Ok(summary)
    }

    /// Returns the summary of the selected shard.
    pub fn selected_shard(&self) -> Option<&ShardSummary> {
        let index = usize::try_from(self.index).ok()?;
        self.plan.shards.iter().find(|shard| shard.index == index)
    }
}
