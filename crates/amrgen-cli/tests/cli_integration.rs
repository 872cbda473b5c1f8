//! Integration tests for the amrgen CLI.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use amrgen_core::AmrBuilder;
use amrgen_corpus::{save_corpus, LookupTables};
use tempfile::TempDir;

fn run_amrgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_amrgen"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute amrgen command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// "the dog barks" with `dog` under `bark-01`.
fn write_corpus(dir: &Path) -> PathBuf {
    let mut b = AmrBuilder::new()
        .with_id("s1")
        .with_sentence("the dog barks")
        .with_pos_tags(["DT", "NN", "VBZ"]);
    let bark = b.add_vertex("bark-01");
    let dog = b.add_vertex("dog");
    b.set_pos(dog, "NN");
    b.add_edge(bark, dog, ":ARG0");
    b.align_concept(bark, [2]);
    b.align_concept(dog, [1]);
    let amr = b.build().unwrap();

    let path = dir.join("corpus.json");
    save_corpus(&path, &[amr]).unwrap();
    path
}

#[test]
fn test_tables_command() {
    let dir = TempDir::new().unwrap();
    let corpus = write_corpus(dir.path());
    let output = dir.path().join("out").join("tables.json");

    let result = run_amrgen(&[
        "tables",
        "--corpus",
        corpus.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "tables failed: {:?}", result);
    assert!(stdout(&result).contains("Built tables from 1 graphs"));

    let tables = LookupTables::load(&output).unwrap();
    assert_eq!(tables.best_pos.get("dog").map(String::as_str), Some("NN"));
    assert_eq!(tables.realization("dog", "NN"), Some("dog"));
}

#[test]
fn test_features_training_prints_gold() {
    let dir = TempDir::new().unwrap();
    let corpus = write_corpus(dir.path());

    let result = run_amrgen(&["features", "--corpus", corpus.to_str().unwrap(), "--training"]);
    assert!(result.status.success(), "features failed: {:?}", result);

    let out = stdout(&result);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected output: {out}");
    let fields: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(fields[0], "s1");
    assert_eq!(fields[2], "the");
}

#[test]
fn test_features_inference_prints_predictions() {
    let dir = TempDir::new().unwrap();
    let corpus = write_corpus(dir.path());

    let result = run_amrgen(&[
        "features",
        "--corpus",
        corpus.to_str().unwrap(),
        "--aspect",
        "number",
    ]);
    assert!(result.status.success(), "features failed: {:?}", result);

    let out = stdout(&result);
    let line = out.lines().next().expect("one context");
    assert_eq!(line.split('\t').nth(2), Some("sg"));
}

#[test]
fn test_features_rejects_unknown_aspect() {
    let dir = TempDir::new().unwrap();
    let corpus = write_corpus(dir.path());
    let result = run_amrgen(&["features", "--corpus", corpus.to_str().unwrap(), "-a", "tense"]);
    assert!(!result.status.success());
}

#[test]
fn test_missing_corpus_fails() {
    let result = run_amrgen(&["tables", "--corpus", "/nonexistent/corpus.json"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("no such file"));
}

#[test]
fn test_score_without_candidates() {
    let result = run_amrgen(&["score"]);
    assert!(result.status.success());
    assert!(stdout(&result).contains("No candidates to score."));
}
