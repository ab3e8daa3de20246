// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading historical test timings.
//!
//! Timings come from the line-delimited JSON event stream that `go test -json` (and `test2json`)
//! produces. Each line is a single event; only the final `pass` or `fail` event for a named test
//! carries the elapsed time we care about. Everything else (`run`, `output`, `skip`, and the
//! package-level summary events that have no `Test` field) is ignored.

use crate::errors::ExtractError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::{
    cmp::Ordering,
    fs::File,
    io::{BufRead, BufReader},
};
use tracing::debug;

/// The elapsed time of a single test, as recorded in a timing log.
#[derive(Clone, Debug, PartialEq)]
pub struct TestRecord {
    name: String,
    elapsed: f64,
}

impl TestRecord {
    /// Creates a new record.
    pub fn new(name: impl Into<String>, elapsed: f64) -> Self {
        Self {
            name: name.into(),
            elapsed,
        }
    }

    /// Returns the full name of the test, including any subtest path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the elapsed time of the test in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Returns the top-level group this test belongs to: the part of the name before the first
    /// `/`.
    ///
    /// Names without a `/`, and names where nothing precedes the first `/`, are their own group.
    pub fn group_name(&self) -> &str {
        match self.name.split_once('/') {
            Some((group, _)) if !group.is_empty() => group,
            _ => &self.name,
        }
    }

    /// Orders records by elapsed time descending, then by name descending.
    ///
    /// Sorting with this comparator is deterministic regardless of the input order.
    pub fn cmp_by_elapsed_desc(&self, other: &Self) -> Ordering {
        other
            .elapsed
            .total_cmp(&self.elapsed)
            .then_with(|| other.name.cmp(&self.name))
    }
}

pub(crate) fn sort_records(records: &mut [TestRecord]) {
    // sort_by is stable.
    records.sort_by(TestRecord::cmp_by_elapsed_desc);
}

/// A single event in a `go test -json` stream.
///
/// `go test` emits these fields capitalized, but lowercase names are accepted as well. A field
/// that is absent or `null` is treated as unset.
#[derive(Debug, Deserialize)]
struct TestEvent {
    #[serde(rename = "Action", alias = "action", default)]
    action: Option<TestAction>,
    #[serde(rename = "Test", alias = "test", default)]
    test: Option<String>,
    #[serde(rename = "Elapsed", alias = "elapsed", default)]
    elapsed: Option<f64>,
}

#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
enum TestAction {
    Pass,
    Fail,
    #[serde(other)]
    Other,
}

impl TestEvent {
    fn into_record(self) -> Option<TestRecord> {
        match (self.action, self.test) {
            (Some(TestAction::Pass | TestAction::Fail), Some(test)) if !test.is_empty() => {
                Some(TestRecord::new(test, self.elapsed.unwrap_or_default()))
            }
            _ => None,
        }
    }
}

/// Reads the timing log at `path`.
///
/// Returns one record per `pass` or `fail` event that names a test, sorted by
/// [`TestRecord::cmp_by_elapsed_desc`].
pub fn extract(path: impl AsRef<Utf8Path>) -> Result<Vec<TestRecord>, ExtractError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| ExtractError::Open {
        path: path.to_owned(),
        err,
    })?;
    extract_from_reader(BufReader::new(file), path)
}

/// Reads a timing log from an arbitrary reader.
///
/// Every line must be a JSON event, so an interior blank line is an error. `path` is only used
/// for error messages.
pub fn extract_from_reader(
    reader: impl BufRead,
    path: impl Into<Utf8PathBuf>,
) -> Result<Vec<TestRecord>, ExtractError> {
    let path = path.into();
    let mut records = Vec::new();
    let mut skipped = 0_usize;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| ExtractError::Read {
            path: path.clone(),
            err,
        })?;
        let event: TestEvent = serde_json::from_str(&line).map_err(|err| ExtractError::Parse {
            path: path.clone(),
            line: line_idx + 1,
            err,
        })?;
        match event.into_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(
        "read {} test timings from `{}` ({} other events skipped)",
        records.len(),
        path,
        skipped,
    );

    sort_records(&mut records);
    Ok(records)
}
