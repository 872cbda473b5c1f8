//! Score command: rank candidate sentences with the neural scorer.

use std::io::{BufRead, BufReader};
use std::path::Path;

use amrgen_lm::{NeuralScorer, ScorerConfig, SentenceScorer};
use anyhow::{Context, Result};
use tracing::info;

/// Non-empty, trimmed lines of `input` or stdin.
fn read_candidates(input: Option<&Path>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut candidates = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            candidates.push(line.to_string());
        }
    }
    Ok(candidates)
}

pub fn execute(input: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let candidates = read_candidates(input)?;
    if candidates.is_empty() {
        println!("No candidates to score.");
        return Ok(());
    }

    let config = ScorerConfig::resolve(config)?;
    info!(addr = %config.address(), model = %config.model, "Starting scorer");
    let mut scorer = NeuralScorer::start(config).context("failed to start the scorer")?;

    for (sentence, score) in scorer.rank(&candidates)? {
        println!("{score:>10.4}\t{sentence}");
    }
    Ok(())
}
