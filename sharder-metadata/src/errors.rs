// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{error, fmt};

/// An error that occurs while reading back `sharder --format json` output.
#[derive(Debug)]
pub enum SummaryParseError {
    /// Error parsing JSON output.
    Json(serde_json::Error),

    /// The summary was parsed, but the selected index is not part of the plan.
    IndexNotInPlan {
        /// The index recorded in the output.
        index: i64,

        /// The number of shards in the plan.
        total_shards: usize,
    },
}

impl fmt::Display for SummaryParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Json(_) => {
                write!(f, "parsing `sharder` JSON output failed")
            }
            Self::IndexNotInPlan {
                index,
                total_shards,
            } => {
                write!(
                    f,
                    "selected shard {index} is not part of a plan with {total_shards} shards"
                )
            }
        }
    }
}

impl error::Error for SummaryParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::IndexNotInPlan { .. } => None,
        }
    }
}
