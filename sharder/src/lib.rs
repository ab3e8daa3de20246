// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Split a Go test suite into shards of equal duration.
//!
//! `sharder` reads the `go test -json` log of a previous run, groups subtests under their
//! top-level test, and packs the groups into shards so that each shard takes roughly the same
//! amount of time. It then prints the `-run` or `-skip` argument that selects one shard:
//!
//! ```text
//! go test -json ./... > timings.jsonl
//! go test ./... $(sharder --output timings.jsonl --total 4 --index 2)
//! ```
//!
//! The last shard always uses `-skip`, so tests that are missing from the timing log still run.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;
#[cfg(test)]
mod tests_integration;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, StderrStyles};
