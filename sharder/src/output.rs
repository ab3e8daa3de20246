// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostics on stderr and the pattern on stdout.
//!
//! Everything other than the selected pattern goes through `tracing` to stderr, so that the
//! pattern can be captured with `$(sharder ...)` without any extra noise.

use clap::{Args, ValueEnum};
use owo_colors::{Style, style};
use std::{
    io::{self, BufWriter, Write},
    sync::Once,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    Layer,
    filter::{ParseError, Targets},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable holding a `Targets` filter, e.g. `debug` or `sharder_runner=trace`.
const LOG_ENV: &str = "SHARDER_LOG";

static INIT_LOGGER: Once = Once::new();

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Log how the shard plan was built
    #[arg(long, short, global = true, env = "SHARDER_VERBOSE")]
    pub(crate) verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "CARGO_TERM_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        let OutputOpts { verbose, color } = self;
        color.init_logger(verbose);
        OutputContext { verbose, color }
    }
}

/// Output settings resolved from the command line.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) verbose: bool,
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns the styles used for error messages on stderr.
    pub fn stderr_styles(&self) -> StderrStyles {
        if self.color.should_colorize(supports_color::Stream::Stderr) {
            StderrStyles {
                bold: style().bold(),
            }
        } else {
            StderrStyles::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn color_never_init() -> Self {
        let color = Color::Never;
        color.init_logger(false);
        Self {
            verbose: false,
            color,
        }
    }
}

/// When to colorize stderr.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Colorize if stderr is a terminal that supports it.
    #[default]
    Auto,
    /// Always colorize.
    Always,
    /// Never colorize.
    Never,
}

impl Color {
    fn init_logger(self, verbose: bool) {
        let ansi = self.should_colorize(supports_color::Stream::Stderr);

        INIT_LOGGER.call_once(|| {
            let default_level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };
            let log_env = std::env::var(LOG_ENV).ok();
            let (targets, parse_error) = log_targets(log_env.as_deref(), default_level);

            let layer = tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_level(true)
                .with_ansi(ansi)
                .with_writer(io::stderr)
                .with_filter(targets);

            // Tests may install their own subscriber first.
            let _ = tracing_subscriber::registry().with(layer).try_init();

            if let (Some(value), Some(err)) = (log_env, parse_error) {
                tracing::warn!("ignoring invalid {LOG_ENV} value `{value}`: {err}");
            }
        });
    }

    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Builds the log filter from the value of `SHARDER_LOG`.
///
/// An unset, empty or unparseable value falls back to `default_level`; the parse error is returned
/// so that it can be reported once logging is up.
fn log_targets(
    value: Option<&str>,
    default_level: LevelFilter,
) -> (Targets, Option<ParseError>) {
    let fallback = || Targets::new().with_default(default_level);
    match value.map(str::trim) {
        None | Some("") => (fallback(), None),
        Some(value) => match value.parse::<Targets>() {
            Ok(targets) => (targets, None),
            Err(err) => (fallback(), Some(err)),
        },
    }
}

/// Styles used when printing errors to stderr.
#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
}

/// Where the selected pattern is written: stdout, or a buffer in tests.
#[derive(Debug, Default)]
pub struct OutputWriter {
    captured: Option<Vec<u8>>,
}

impl OutputWriter {
    #[cfg(test)]
    pub(crate) fn new_test() -> Self {
        Self {
            captured: Some(Vec::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn stdout(&self) -> Option<&str> {
        self.captured
            .as_deref()
            .map(|buf| std::str::from_utf8(buf).expect("stdout is UTF-8"))
    }

    pub(crate) fn stdout_writer(&mut self) -> Box<dyn Write + '_> {
        match &mut self.captured {
            Some(buf) => Box::new(buf),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        }
    }
}
