//! Line protocol spoken with the scorer.
//!
//! A request is one line: the batch size, then every sentence wrapped in
//! begin/end markers and right-padded to the longest sentence of the batch.
//! A reply is one line of space-separated scores in request order.

use serde::{Deserialize, Serialize};

use crate::error::{ScorerError, ScorerResult};

/// Literal tokens framing each sentence of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    #[serde(default = "default_bos")]
    pub bos: String,
    #[serde(default = "default_eos")]
    pub eos: String,
    #[serde(default = "default_pad")]
    pub pad: String,
}

fn default_bos() -> String {
    "<bos>".to_string()
}

fn default_eos() -> String {
    "<eos>".to_string()
}

fn default_pad() -> String {
    "<pad>".to_string()
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            bos: default_bos(),
            eos: default_eos(),
            pad: default_pad(),
        }
    }
}

/// Build the request line for a batch, without the trailing newline.
///
/// Each sentence gets `max_len - len` padding markers, lengths counted in
/// whitespace tokens before the begin/end markers are added.
pub fn encode_batch<S: AsRef<str>>(sentences: &[S], markers: &Markers) -> String {
    let tokenized: Vec<Vec<&str>> = sentences
        .iter()
        .map(|s| s.as_ref().split_whitespace().collect())
        .collect();
    let max_len = tokenized.iter().map(Vec::len).max().unwrap_or(0);

    let mut fields = vec![sentences.len().to_string()];
    for tokens in &tokenized {
        fields.push(markers.bos.clone());
        fields.extend(tokens.iter().map(|t| t.to_string()));
        fields.push(markers.eos.clone());
        fields.extend(std::iter::repeat(markers.pad.clone()).take(max_len - tokens.len()));
    }
    fields.join(" ")
}

/// Parse a reply line into exactly `expected` scores.
pub fn decode_scores(line: &str, expected: usize) -> ScorerResult<Vec<f64>> {
    let scores = line
        .split_whitespace()
        .map(|field| {
            field.parse::<f64>().map_err(|_| ScorerError::Malformed {
                field: field.to_string(),
            })
        })
        .collect::<ScorerResult<Vec<f64>>>()?;

    if scores.len() != expected {
        return Err(ScorerError::CountMismatch {
            expected,
            actual: scores.len(),
        });
    }
    Ok(scores)
}
