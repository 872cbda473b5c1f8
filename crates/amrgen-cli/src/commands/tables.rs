//! Tables command: aggregate a corpus into lookup tables.

use std::path::Path;

use amrgen_corpus::{load_corpus, AlignmentGold, LookupTables};
use anyhow::Result;

pub fn execute(corpus: &Path, output: &Path) -> Result<()> {
    let amrs = load_corpus(corpus)?;
    let tables = LookupTables::build(&amrs, &AlignmentGold::new());
    tables.save(output)?;

    println!("✅ Built tables from {} graphs", amrs.len());
    println!("   Concepts:        {}", tables.concepts.len());
    println!("   POS entries:     {}", tables.best_pos.len());
    println!(
        "   Merge pairs:     {}",
        tables.merges.values().map(|m| m.len()).sum::<usize>()
    );
    println!("   Named entities:  {}", tables.named_entities.by_concept.len());
    println!("   Saved to:        {}", output.display());
    Ok(())
}
