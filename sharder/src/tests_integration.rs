// Copyright (c) The sharder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! These run the app in-process against the recorded timing log in `fixtures/`, capturing stdout
//! through [`OutputWriter::new_test`].

use crate::{ExpectedError, OutputContext, OutputWriter, SharderApp};
use camino::Utf8Path;
use clap::Parser;
use indoc::indoc;
use pretty_assertions::assert_eq;
use sharder_metadata::{PatternKindSummary, ShardSelectionSummary, SharderExitCode};
use test_case::test_case;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/test-timings.jsonl");

fn run(args: &[&str]) -> Result<String, ExpectedError> {
    let app = SharderApp::try_parse_from(std::iter::once("sharder").chain(args.iter().copied()))
        .expect("arguments are valid");
    let mut output = OutputWriter::new_test();
    let code = app.exec(OutputContext::color_never_init(), &mut output)?;
    assert_eq!(code, SharderExitCode::OK);
    Ok(output
        .stdout()
        .expect("test output writer captures stdout")
        .to_owned())
}

fn run_err(args: &[&str]) -> ExpectedError {
    match run(args) {
        Ok(stdout) => panic!("expected an error, got output: {stdout}"),
        Err(err) => err,
    }
}

#[test_case(0, "-run \"(^TestAlpha$)|(^TestEpsilon$)\"\n" ; "first shard")]
#[test_case(1, "-run \"(^TestBeta$)|(^TestEta$)\"\n" ; "middle shard")]
#[test_case(
    2,
    "-skip \"(^TestAlpha$)|(^TestEpsilon$)|(^TestBeta$)|(^TestEta$)\"\n"
    ; "residual shard"
)]
fn plain_output(index: i64, expected: &str) {
    let index = index.to_string();
    let stdout = run(&["--output", FIXTURE, "--total", "3", "--index", &index])
        .expect("sharding succeeds");
    assert_eq!(stdout, expected);
}

#[test]
fn single_shard_by_default() {
    let stdout = run(&["--output", FIXTURE]).expect("sharding succeeds");
    assert_eq!(stdout, "-skip \"\"\n");
}

#[test]
fn make_output_escapes_dollars() {
    let stdout = run(&[
        "--output", FIXTURE, "--total", "3", "--index", "0", "--format", "make",
    ])
    .expect("sharding succeeds");
    assert_eq!(stdout, "-run \"(^TestAlpha\\$$)|(^TestEpsilon\\$$)\"\n");
}

#[test]
fn env_output() {
    let stdout = run(&[
        "--output", FIXTURE, "--total", "3", "--index", "1", "--format", "env",
    ])
    .expect("sharding succeeds");
    assert_eq!(stdout, "TEST_FILTER=-run \"(^TestBeta$)|(^TestEta$)\"\n");

    let stdout = run(&[
        "--output",
        FIXTURE,
        "--total",
        "3",
        "--index",
        "1",
        "--format",
        "env",
        "--env-key",
        "GO_TEST_ARGS",
    ])
    .expect("sharding succeeds");
    assert_eq!(stdout, "GO_TEST_ARGS=-run \"(^TestBeta$)|(^TestEta$)\"\n");
}

#[test]
fn json_output() {
    let stdout = run(&[
        "--output", FIXTURE, "--total", "3", "--index", "2", "--format", "json",
    ])
    .expect("sharding succeeds");

    let summary = ShardSelectionSummary::parse_json(&stdout).expect("output is a valid summary");
    assert_eq!(summary.index, 2);
    assert_eq!(summary.kind, PatternKindSummary::Exclude);
    assert_eq!(
        summary.pattern,
        "-skip \"(^TestAlpha$)|(^TestEpsilon$)|(^TestBeta$)|(^TestEta$)\""
    );
    assert_eq!(summary.plan.total_shards, 3);
    assert_eq!(summary.plan.seed, 0);
    assert_eq!(summary.plan.total_elapsed(), 6.875);

    let tests: Vec<_> = summary
        .plan
        .shards
        .iter()
        .map(|shard| shard.tests.clone())
        .collect();
    assert_eq!(
        tests,
        vec![
            vec!["TestAlpha".to_owned(), "TestEpsilon".to_owned()],
            vec!["TestBeta".to_owned(), "TestEta".to_owned()],
            vec![
                "TestGamma".to_owned(),
                "TestDelta".to_owned(),
                "TestZeta".to_owned()
            ],
        ]
    );

    let selected = summary.selected_shard().expect("index is in the plan");
    assert_eq!(selected.total_elapsed, 1.75);
}

#[test]
fn dash_prefixed_path_is_a_file() {
    // Only `-` exactly means standard input.
    let err = run_err(&["--output=-.jsonl"]);
    assert_eq!(err.process_exit_code(), SharderExitCode::TIMINGS_READ_FAILED);
}

#[test]
fn seed_keeps_long_tests_in_place() {
    let stdout = run(&[
        "--output", FIXTURE, "--total", "3", "--index", "0", "--seed", "42", "--format", "json",
    ])
    .expect("sharding succeeds");
    let summary = ShardSelectionSummary::parse_json(&stdout).expect("output is a valid summary");

    assert_eq!(summary.plan.seed, 42);
    let long_tests: Vec<&str> = summary
        .plan
        .shards
        .iter()
        .filter_map(|shard| shard.tests.first().map(String::as_str))
        .collect();
    assert_eq!(long_tests, vec!["TestAlpha", "TestBeta", "TestGamma"]);

    let mut all: Vec<_> = summary
        .plan
        .shards
        .iter()
        .flat_map(|shard| shard.tests.iter().cloned())
        .collect();
    all.sort();
    assert_eq!(
        all,
        vec![
            "TestAlpha",
            "TestBeta",
            "TestDelta",
            "TestEpsilon",
            "TestEta",
            "TestGamma",
            "TestZeta"
        ]
    );
}

#[test_case("3" ; "equal to total")]
#[test_case("-1" ; "negative")]
fn index_out_of_range(index: &str) {
    let err = run_err(&["--output", FIXTURE, "--total", "3", "--index", index]);
    assert!(
        matches!(err, ExpectedError::ShardIndexOutOfBounds { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(
        err.process_exit_code(),
        SharderExitCode::SHARD_INDEX_OUT_OF_RANGE
    );
}

#[test]
fn zero_total_shards() {
    let err = run_err(&["--output", FIXTURE, "--total", "0"]);
    assert!(
        matches!(err, ExpectedError::ShardCountError { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.process_exit_code(), SharderExitCode::SETUP_ERROR);
}

#[test]
fn invalid_env_key() {
    let err = run_err(&[
        "--output",
        FIXTURE,
        "--format",
        "env",
        "--env-key",
        "NOT A KEY",
    ]);
    assert!(
        matches!(&err, ExpectedError::InvalidEnvKey { key } if key == "NOT A KEY"),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.process_exit_code(), SharderExitCode::SETUP_ERROR);
}

#[test]
fn missing_timings_file() {
    let dir = camino_tempfile::tempdir().expect("created temp dir");
    let path = dir.path().join("missing.jsonl");

    let err = run_err(&["--output", path.as_str()]);
    assert!(
        matches!(err, ExpectedError::TimingsReadError { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.process_exit_code(), SharderExitCode::TIMINGS_READ_FAILED);
}

#[test]
fn malformed_timings_file() {
    let dir = camino_tempfile::tempdir().expect("created temp dir");
    let path = dir.path().join("timings.jsonl");
    write_log(
        &path,
        indoc! {r#"
            {"Action":"pass","Test":"TestA","Elapsed":1.5}
            this is not json
        "#},
    );

    let err = run_err(&["--output", path.as_str()]);
    match &err {
        ExpectedError::TimingsReadError { err } => {
            assert!(
                err.to_string().contains("line 2"),
                "error mentions the line number: {err}"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.process_exit_code(), SharderExitCode::TIMINGS_READ_FAILED);
}

#[test]
fn empty_timings_file() {
    let dir = camino_tempfile::tempdir().expect("created temp dir");
    let path = dir.path().join("timings.jsonl");
    write_log(&path, "");

    let stdout = run(&["--output", path.as_str(), "--total", "2", "--index", "0"])
        .expect("sharding succeeds");
    assert_eq!(stdout, "-run \"^$\"\n");

    let stdout = run(&["--output", path.as_str(), "--total", "2", "--index", "1"])
        .expect("sharding succeeds");
    assert_eq!(stdout, "-skip \"\"\n");
}

fn write_log(path: &Utf8Path, contents: &str) {
    std::fs::write(path, contents).expect("wrote timing log");
}
