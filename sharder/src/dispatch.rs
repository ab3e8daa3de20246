// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use sharder_metadata::{ShardSelectionSummary, SharderExitCode};
use sharder_runner::{
    aggregate::aggregate,
    partition::{ShardPlan, ShardPlanOptions},
    pattern::ShardPattern,
    timings::{self, TestRecord},
};
use std::io::{self, Write};
use tracing::{debug, info};

/// Split a Go test suite into shards of equal duration.
///
/// Reads the `go test -json` output of a previous run, packs the tests into --total shards of
/// roughly equal duration, and prints the `-run` or `-skip` argument that selects shard --index.
///
/// The last shard skips every test claimed by another shard, so tests that are missing from the
/// timing log still run.
#[derive(Debug, Parser)]
#[command(version, max_term_width = 100)]
pub struct SharderApp {
    /// Timing log produced by `go test -json` (`-` for standard input)
    #[arg(long = "output", value_name = "PATH", env = "SHARDER_OUTPUT")]
    timings_file: Utf8PathBuf,

    /// Randomly shuffle short tests using this seed (0 disables shuffling)
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        env = "SHARDER_SEED"
    )]
    seed: i64,

    /// Total number of shards
    #[arg(long, default_value_t = 1, value_name = "N", env = "SHARDER_TOTAL")]
    total: usize,

    /// Index of the shard to select, counting up from 0
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_name = "N",
        env = "SHARDER_INDEX"
    )]
    index: i64,

    /// Output format
    #[arg(long, value_enum, default_value_t, value_name = "FMT", env = "SHARDER_FORMAT")]
    format: FormatOpt,

    /// Variable name used by --format env
    #[arg(
        long,
        default_value = "TEST_FILTER",
        value_name = "KEY",
        env = "SHARDER_ENV_KEY"
    )]
    env_key: String,

    #[clap(flatten)]
    output: OutputOpts,
}

/// How the selection pattern is printed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
enum FormatOpt {
    /// The pattern as-is
    #[default]
    Plain,
    /// The pattern with `$` escaped for use in a Makefile
    Make,
    /// `KEY=PATTERN`, for environment files such as `$GITHUB_ENV`
    Env,
    /// The pattern and the full shard plan as JSON
    Json,
}

impl SharderApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        if self.format == FormatOpt::Env && !is_valid_env_key(&self.env_key) {
            return Err(ExpectedError::invalid_env_key(self.env_key));
        }
        let options = ShardPlanOptions::new(self.total, self.seed)?;

        let records = read_timings(&self.timings_file)?;
        let aggregated = aggregate(&records);
        let plan = ShardPlan::new(&aggregated, options);
        let pattern = plan.pattern(self.index)?;

        if output.verbose {
            let bin = &plan.bins()[pattern.shard()];
            info!(
                "shard {} of {}: {} test groups, {:.3}s of recorded time",
                self.index,
                self.total,
                bin.members().len(),
                bin.total(),
            );
        }

        let mut writer = output_writer.stdout_writer();
        self.write_pattern(&plan, &pattern, &mut writer)?;
        writer.flush().map_err(ExpectedError::write_output_error)?;

        Ok(SharderExitCode::OK)
    }

    fn write_pattern(
        &self,
        plan: &ShardPlan,
        pattern: &ShardPattern<'_>,
        mut writer: impl Write,
    ) -> Result<()> {
        let rendered = pattern.to_string();
        let res = match self.format {
            FormatOpt::Plain => writeln!(writer, "{rendered}"),
            FormatOpt::Make => writeln!(writer, "{}", escape_for_make(&rendered)),
            FormatOpt::Env => writeln!(writer, "{}={rendered}", self.env_key),
            FormatOpt::Json => {
                let summary = ShardSelectionSummary::new(
                    self.index,
                    pattern.kind().to_summary(),
                    rendered,
                    plan.to_summary(),
                );
                serde_json::to_writer_pretty(&mut writer, &summary)
                    .map_err(ExpectedError::serialize_output_error)?;
                writeln!(writer)
            }
        };
        res.map_err(ExpectedError::write_output_error)
    }
}

fn read_timings(path: &Utf8Path) -> Result<Vec<TestRecord>> {
    let records = if path.as_str() == "-" {
        debug!("reading timing log from standard input");
        timings::extract_from_reader(io::stdin().lock(), "<stdin>")?
    } else {
        timings::extract(path)?
    };
    Ok(records)
}

/// Escapes `$` so that the pattern survives Make's variable expansion inside a recipe.
fn escape_for_make(pattern: &str) -> String {
    pattern.replace('$', "\\$$")
}

fn is_valid_env_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
