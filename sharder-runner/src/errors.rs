// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by sharder.

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurred while reading a timing log.
///
/// Any of these aborts the read: no partial list of records is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// The timing log could not be opened.
    #[error("failed to open timing log `{path}`")]
    Open {
        /// The path that was passed in.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// Reading from the timing log failed partway through.
    #[error("failed to read timing log `{path}`")]
    Read {
        /// The path that was passed in.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// A line in the timing log was not a valid JSON event.
    #[error("line {line} of timing log `{path}` is not a valid JSON event")]
    Parse {
        /// The path that was passed in.
        path: Utf8PathBuf,

        /// The 1-based line number that failed to parse.
        line: usize,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },
}

impl ExtractError {
    /// Returns the path of the timing log that failed to be read.
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// A shard index was requested that is not in `[0, total)`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("shard {index} is out of bounds for {total} total shards")]
pub struct ShardIndexOutOfBounds {
    index: i64,
    total: usize,
}

impl ShardIndexOutOfBounds {
    pub(crate) fn new(index: i64, total: usize) -> Self {
        Self { index, total }
    }

    /// Returns the index that was requested.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Returns the number of shards that were available.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// An error returned when the number of shards is invalid.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("total shards must be at least 1, got {total}")]
pub struct ShardCountError {
    total: usize,
}

impl ShardCountError {
    pub(crate) fn new(total: usize) -> Self {
        Self { total }
    }
}
