// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering shard selections as `go test` filter arguments.
//!
//! Every shard except the last one runs exactly the tests packed into it, via `-run`. The last
//! shard is the residual shard: it runs everything that *isn't* claimed by another shard, via
//! `-skip`. Tests that are missing from the timing log (new or renamed tests, say) therefore still
//! run somewhere.

use crate::{errors::ShardIndexOutOfBounds, partition::Bin};
use itertools::Itertools;
use sharder_metadata::PatternKindSummary;
use std::fmt;

/// Matches no test, since every test name is non-empty.
///
/// `go test -run ""` means "no filter", so an include pattern with no tests can't be empty.
const MATCH_NOTHING: &str = "^$";

/// Whether a pattern lists the tests to run or the tests to skip.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PatternKind {
    /// Only run the listed tests.
    Include,

    /// Run everything except the listed tests.
    Exclude,
}

impl PatternKind {
    /// Returns the `go test` flag for this kind of pattern.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Include => "-run",
            Self::Exclude => "-skip",
        }
    }

    /// Returns the serializable form of this kind.
    pub fn to_summary(self) -> PatternKindSummary {
        match self {
            Self::Include => PatternKindSummary::Include,
            Self::Exclude => PatternKindSummary::Exclude,
        }
    }
}

/// The test selection for a single shard.
///
/// The `Display` impl renders the full argument, for example `-run "(^TestA$)|(^TestB$)"`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShardPattern<'a> {
    shard: usize,
    kind: PatternKind,
    names: Vec<&'a str>,
}

impl<'a> ShardPattern<'a> {
    /// Computes the pattern for the shard at `index`.
    ///
    /// Returns an error if `index` is negative or not less than `bins.len()`.
    pub fn new(bins: &'a [Bin], index: i64) -> Result<Self, ShardIndexOutOfBounds> {
        let shard = usize::try_from(index)
            .ok()
            .filter(|&shard| shard < bins.len())
            .ok_or_else(|| ShardIndexOutOfBounds::new(index, bins.len()))?;

        if shard == bins.len() - 1 {
            let names = bins[..shard].iter().flat_map(Bin::names).collect();
            Ok(Self {
                shard,
                kind: PatternKind::Exclude,
                names,
            })
        } else {
            Ok(Self {
                shard,
                kind: PatternKind::Include,
                names: bins[shard].names().collect(),
            })
        }
    }

    /// Returns the index of the shard this pattern selects.
    pub fn shard(&self) -> usize {
        self.shard
    }

    /// Returns whether this pattern includes or excludes its tests.
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Returns the test names this pattern lists.
    pub fn names(&self) -> &[&'a str] {
        &self.names
    }

    /// Returns the regular expression passed to the `go test` flag, without quotes.
    ///
    /// Each name becomes an exact-match anchor, and anchors are joined with `|`.
    pub fn expression(&self) -> String {
        if self.names.is_empty() && self.kind == PatternKind::Include {
            return MATCH_NOTHING.to_owned();
        }
        self.names
            .iter()
            .map(|name| format!("(^{name}$)"))
            .join("|")
    }
}

impl fmt::Display for ShardPattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.kind.flag(), self.expression())
    }
}

/// Generates the selection pattern for the shard at `index`.
///
/// This is a shortcut for rendering [`ShardPattern::new`].
pub fn generate(bins: &[Bin], index: i64) -> Result<String, ShardIndexOutOfBounds> {
    ShardPattern::new(bins, index).map(|pattern| pattern.to_string())
}
