//! Reading and writing graph corpora as JSON.

use std::path::Path;

use amrgen_core::{Amr, AmrParts};
use tracing::info;

use crate::error::{CorpusError, CorpusResult};

/// Load a JSON array of graphs, validating each one.
pub fn load_corpus(path: &Path) -> CorpusResult<Vec<Amr>> {
    if !path.exists() {
        return Err(CorpusError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let json = std::fs::read_to_string(path)?;
    let parts: Vec<AmrParts> = serde_json::from_str(&json)?;

    let mut amrs = Vec::with_capacity(parts.len());
    for (index, part) in parts.into_iter().enumerate() {
        let name = if part.id.is_empty() {
            format!("#{index}")
        } else {
            part.id.clone()
        };
        let amr = Amr::from_parts(part)
            .map_err(|source| CorpusError::InvalidGraph { amr: name, source })?;
        amrs.push(amr);
    }

    info!(path = %path.display(), graphs = amrs.len(), "Loaded corpus");
    Ok(amrs)
}

/// Write graphs as a pretty JSON array.
pub fn save_corpus(path: &Path, amrs: &[Amr]) -> CorpusResult<()> {
    let json = serde_json::to_string_pretty(amrs)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), graphs = amrs.len(), "Saved corpus");
    Ok(())
}
