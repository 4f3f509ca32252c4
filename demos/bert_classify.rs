//! BERT Classification
//!
//! Classify text files with a fine-tuned BERT artifact.
//!
//! ```bash
//! cargo run --example bert_classify --features bert -- ./saved_bert paper.txt
//! ```

use std::env;

use papertriage::{ClassifierConfig, PaperClassifier};

fn main() -> papertriage::Result<()> {
    let mut args = env::args().skip(1);
    let model_dir = args.next().unwrap_or_else(|| "./saved_bert".to_string());
    let files: Vec<String> = args.collect();

    let config = ClassifierConfig::default().with_model_dir(&model_dir);
    let classifier = PaperClassifier::from_config(&config)?;
    classifier.preload()?;

    if files.is_empty() {
        println!("usage: bert_classify <model_dir> <file.txt>...");
        return Ok(());
    }

    for path in &files {
        let result = classifier.classify_file(path)?;
        println!(
            "{path}: {} ({:.3}) type={} nature={} chunks={}",
            result.label,
            result.display_confidence(),
            result.label.paper_type(),
            result.label.nature().unwrap_or("-"),
            result.chunks,
        );
    }

    Ok(())
}
