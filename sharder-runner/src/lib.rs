// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for sharder.
//!
//! Sharding happens in four steps, each in its own module:
//!
//! 1. [`timings::extract`] reads per-test elapsed times from a `go test -json` log.
//! 2. [`aggregate::aggregate`] folds subtests into their top-level test.
//! 3. [`partition::pack`] spreads the top-level tests across shards so that each shard takes
//!    roughly the same time.
//! 4. [`pattern::generate`] renders the `-run`/`-skip` argument for one shard.

pub mod aggregate;
pub mod errors;
pub mod partition;
pub mod pattern;
pub mod timings;
