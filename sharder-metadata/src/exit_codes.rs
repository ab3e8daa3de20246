// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `sharder` failures.
///
/// `sharder` runs may fail for a variety of reasons. This structure documents the exit codes
/// that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum SharderExitCode {}

impl SharderExitCode {
    /// No errors occurred and sharder exited normally.
    pub const OK: i32 = 0;

    /// The timing log could not be opened, read, or parsed.
    pub const TIMINGS_READ_FAILED: i32 = 104;

    /// The requested shard index was outside `[0, total)`.
    pub const SHARD_INDEX_OUT_OF_RANGE: i32 = 105;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a sharder invocation.
    pub const SETUP_ERROR: i32 = 96;
}
