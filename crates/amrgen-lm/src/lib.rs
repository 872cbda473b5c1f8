//! Client for a neural language-model scorer.
//!
//! The scorer is an external program (typically a Python process hosting a
//! pretrained LM) that connects back to a TCP endpoint opened by this crate.
//! Candidate sentences are sent in batches and scored by negative
//! log-probability, lower being more plausible.
//!
//! ```no_run
//! use amrgen_lm::{NeuralScorer, ScorerConfig, SentenceScorer};
//!
//! let mut scorer = NeuralScorer::start(ScorerConfig::default())?;
//! let ranked = scorer.rank(&["the dog barks".to_string(), "dog the barks".to_string()])?;
//! println!("{:?}", ranked[0]);
//! # Ok::<(), amrgen_lm::ScorerError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod process;
pub mod protocol;

pub use client::{NeuralScorer, SentenceScorer, SharedScorer};
pub use config::ScorerConfig;
pub use error::{ScorerError, ScorerResult};
pub use process::{CommandLauncher, ScorerHandle, ScorerLauncher};
pub use protocol::{decode_scores, encode_batch, Markers};
