//! Basic Classification
//!
//! The minimal example: classify a few documents with a stand-in scorer.
//!
//! ```bash
//! cargo run --example 01_classify_text
//! ```

use papertriage::{
    ClassifierConfig, Label, ModelHandle, PaperClassifier, Probabilities, SequenceScorer,
    WordCodec,
};

/// Votes by vocabulary. Real deployments load a trained model instead.
struct VocabularyScorer;

impl SequenceScorer for VocabularyScorer {
    fn score(&self, text: &str) -> papertriage::Result<Probabilities> {
        let count = |words: &[&str]| {
            words
                .iter()
                .map(|w| text.matches(w).count())
                .sum::<usize>() as f32
        };
        Ok(Probabilities::from_logits([
            count(&["proceedings", "workshop", "symposium"]),
            count(&["journal", "volume", "issue"]),
            count(&["benchmark", "implementation", "throughput"]),
            count(&["theorem", "lemma", "proof"]),
            count(&["invoice", "total", "receipt"]),
        ]))
    }
}

fn main() -> papertriage::Result<()> {
    let handle = ModelHandle::new(WordCodec::new(), VocabularyScorer);
    let classifier = PaperClassifier::from_handle(handle, &ClassifierConfig::default())?;

    let documents = [
        "Receipt #1182",
        "Lemma 3 follows from the theorem above; the proof is by induction on the depth.",
        "We report throughput on each benchmark and release the implementation.",
        "Invoice total due: 420.00 EUR. Please pay the total within thirty days.",
    ];

    for doc in documents {
        let result = classifier.classify(doc)?;
        let preview: String = doc.chars().take(40).collect();
        println!("{preview:<42} -> {result}");
        if result.label != Label::NotResearch {
            println!(
                "{:<42}    {} / {}",
                "",
                result.label.paper_type(),
                result.label.nature().unwrap_or("-")
            );
        }
    }

    Ok(())
}
