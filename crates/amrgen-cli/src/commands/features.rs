//! Features command: dump per-vertex feature contexts for one aspect.
//!
//! With `--training` every context is printed next to its alignment-derived
//! gold label. Otherwise a majority-label classifier is trained per aspect on
//! the same corpus, the whole pipeline is run, and each context is printed
//! next to the prediction made for it.

use std::collections::BTreeMap;
use std::path::Path;

use amrgen_core::Amr;
use amrgen_corpus::{load_corpus, AlignmentGold};
use amrgen_features::{
    Aspect, AspectPipeline, Classifier, Classifiers, Event, ExtractionMode, PredictionStore,
    PriorClassifier,
};
use anyhow::Result;
use tracing::warn;

pub fn execute(corpus: &Path, aspect: Aspect, training: bool) -> Result<()> {
    let amrs = load_corpus(corpus)?;
    let pipeline = AspectPipeline::standard();
    let gold = AlignmentGold::new();

    if training {
        let mode = ExtractionMode::Training { gold: &gold };
        for amr in &amrs {
            match pipeline.contexts(amr, aspect, mode) {
                Ok(contexts) => {
                    for (vertex, extraction) in contexts {
                        let label = extraction.label.as_deref().unwrap_or("-");
                        println!("{}\t{}\t{}\t{}", amr.id(), vertex, label, extraction.context);
                    }
                }
                Err(e) => warn!(amr = amr.id(), error = %e, "Skipping graph"),
            }
        }
        return Ok(());
    }

    let classifiers = train_priors(&pipeline, &amrs, &gold);
    for amr in &amrs {
        let mut store = PredictionStore::new();
        if let Err(e) = pipeline.predict(amr, &classifiers, &mut store) {
            warn!(amr = amr.id(), error = %e, "Skipping graph");
            continue;
        }
        let mode = ExtractionMode::Inference {
            predictions: &store,
        };
        for (vertex, extraction) in pipeline.contexts(amr, aspect, mode)? {
            let predicted = store.best(vertex, aspect).unwrap_or("-");
            println!("{}\t{}\t{}\t{}", amr.id(), vertex, predicted, extraction.context);
        }
    }
    Ok(())
}

fn train_priors(pipeline: &AspectPipeline, amrs: &[Amr], gold: &AlignmentGold) -> Classifiers {
    let mut events: BTreeMap<Aspect, Vec<Event>> = BTreeMap::new();
    for amr in amrs {
        match pipeline.collect_events(amr, gold) {
            Ok(collected) => {
                for (aspect, mut batch) in collected {
                    events.entry(aspect).or_default().append(&mut batch);
                }
            }
            Err(e) => warn!(amr = amr.id(), error = %e, "No training events from graph"),
        }
    }

    let mut classifiers = Classifiers::new();
    for aspect in pipeline.aspects() {
        let mut classifier = PriorClassifier::new();
        classifier.train(events.get(&aspect).map(Vec::as_slice).unwrap_or_default());
        classifiers.insert(aspect, Box::new(classifier) as Box<dyn Classifier>);
    }
    classifiers
}
