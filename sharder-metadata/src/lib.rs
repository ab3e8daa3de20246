// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Sharder metadata.
//!
//! Types in this crate describe the machine-readable output of `sharder`, along with the exit
//! codes it documents. They are kept separate from `sharder-runner` so that CI tooling can depend
//! on them without pulling in the packer.

mod errors;
mod exit_codes;
mod summary;

pub use errors::*;
pub use exit_codes::*;
pub use summary::*;
