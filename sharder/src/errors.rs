// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::StderrStyles;
use owo_colors::OwoColorize;
use sharder_metadata::SharderExitCode;
use sharder_runner::errors::{ExtractError, ShardCountError, ShardIndexOutOfBounds};
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error: something went wrong that sharder knows how to report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to read timing log")]
    TimingsReadError {
        #[from]
        err: ExtractError,
    },
    #[error("invalid shard count")]
    ShardCountError {
        #[from]
        err: ShardCountError,
    },
    #[error("shard index out of range")]
    ShardIndexOutOfBounds {
        #[from]
        err: ShardIndexOutOfBounds,
    },
    #[error("invalid environment variable name")]
    InvalidEnvKey { key: String },
    #[error("writing output failed")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
    #[error("serializing output failed")]
    SerializeOutputError {
        #[source]
        err: serde_json::Error,
    },
}

impl ExpectedError {
    pub(crate) fn invalid_env_key(key: impl Into<String>) -> Self {
        Self::InvalidEnvKey { key: key.into() }
    }

    pub(crate) fn write_output_error(err: std::io::Error) -> Self {
        Self::WriteOutputError { err }
    }

    pub(crate) fn serialize_output_error(err: serde_json::Error) -> Self {
        Self::SerializeOutputError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::TimingsReadError { .. } => SharderExitCode::TIMINGS_READ_FAILED,
            Self::ShardIndexOutOfBounds { .. } => SharderExitCode::SHARD_INDEX_OUT_OF_RANGE,
            Self::ShardCountError { .. } | Self::InvalidEnvKey { .. } => {
                SharderExitCode::SETUP_ERROR
            }
            Self::WriteOutputError { .. } | Self::SerializeOutputError { .. } => {
                SharderExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        tracing::error!("{}", self.stderr_message(styles));
    }

    /// Renders this error and its chain of causes, one cause per line.
    fn stderr_message(&self, styles: &StderrStyles) -> String {
        let (message, source) = match self {
            Self::TimingsReadError { err } => (err.to_string(), err.source()),
            Self::ShardCountError { err } => (err.to_string(), None),
            Self::ShardIndexOutOfBounds { err } => (
                format!(
                    "shard index {} is out of range: it must be between 0 and {}",
                    err.index().style(styles.bold),
                    err.total().saturating_sub(1).style(styles.bold),
                ),
                None,
            ),
            Self::InvalidEnvKey { key } => (
                format!(
                    "`{}` is not a valid environment variable name for --env-key",
                    key.style(styles.bold)
                ),
                None,
            ),
            Self::WriteOutputError { err } => {
                ("failed to write output".to_owned(), Some(err as &dyn Error))
            }
            Self::SerializeOutputError { err } => (
                "failed to serialize shard plan".to_owned(),
                Some(err as &dyn Error),
            ),
        };

        let causes: String = std::iter::successors(source, |&err| err.source())
            .map(|err| format!("\n  caused by: {err}"))
            .collect();
        message + &causes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharder_runner::{
        partition::{ShardPlan, ShardPlanOptions},
        timings,
    };
    use std::io::Cursor;

    #[test]
    fn message_includes_cause_chain() {
        let err = timings::extract_from_reader(Cursor::new("not json\n"), "timings.jsonl")
            .expect_err("line 1 is not JSON");
        let message = ExpectedError::from(err).stderr_message(&StderrStyles::default());

        let (first, rest) = message
            .split_once('\n')
            .expect("message has a cause line");
        assert_eq!(
            first,
            "line 1 of timing log `timings.jsonl` is not a valid JSON event"
        );
        assert!(rest.starts_with("  caused by: "), "{rest}");
    }

    #[test]
    fn message_for_out_of_range_index() {
        let options = ShardPlanOptions::new(3, 0).expect("valid options");
        let plan = ShardPlan::new(&[], options);
        let err = ExpectedError::from(plan.pattern(7).expect_err("7 is out of range"));

        let message = err.stderr_message(&StderrStyles::default());
        assert!(message.starts_with("shard index "), "{message}");
        assert!(message.contains("7"), "{message}");
        assert!(message.contains("between 0 and "), "{message}");
        assert!(!message.contains('\n'), "{message}");
        assert_eq!(
            err.process_exit_code(),
            SharderExitCode::SHARD_INDEX_OUT_OF_RANGE
        );
    }
}
