use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use expense_categorizer::{CategorizationService, ModelStore, ServiceConfig};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delete any stored model and train a fresh one
    #[arg(short, long)]
    fresh: bool,

    /// Where the trained model is stored (defaults to the user cache directory)
    #[arg(long, value_name = "PATH")]
    model_path: Option<PathBuf>,

    /// Keep the model in memory only; never read or write the model file
    #[arg(long)]
    no_persist: bool,

    /// Print the confidence for every category
    #[arg(short, long)]
    scores: bool,

    /// Report accuracy over the built-in training corpus
    #[arg(long)]
    evaluate: bool,

    /// Expense descriptions to categorize; a built-in demo set is used when omitted
    descriptions: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ServiceConfig {
        model_path: args.model_path.clone(),
        persist: !args.no_persist,
        ..ServiceConfig::default()
    };

    if args.fresh && config.persist {
        let store = match &config.model_path {
            Some(path) => ModelStore::new(path),
            None => ModelStore::new_default(),
        };
        info!("Fresh model requested - removing {:?}", store.path());
        store
            .remove()
            .with_context(|| format!("failed to remove {:?}", store.path()))?;
    }

    let start_time = Instant::now();
    let service = CategorizationService::new(config);
    let source = service
        .initialize()
        .context("failed to initialize the categorization model")?;
    info!("=== Model ready ({:?}, took {:.2?}) ===", source, start_time.elapsed());

    if args.evaluate {
        let accuracy = service.evaluate_corpus()?;
        println!("Training corpus accuracy: {:.1}%", accuracy * 100.0);
    }

    let descriptions = if args.descriptions.is_empty() {
        demo_inputs()
    } else {
        args.descriptions
    };

    let classify_start = Instant::now();
    for text in &descriptions {
        let category = service.classify(text);
        println!("{:<40} {}", text, category);

        if args.scores {
            for (category, confidence) in service.predict_with_confidence(text)? {
                println!("    {:<14} {:>6.2}%", category.label(), confidence);
            }
        }
    }

    info!(
        "Classified {} descriptions in {:.2?}",
        descriptions.len(),
        classify_start.elapsed()
    );

    Ok(())
}

fn demo_inputs() -> Vec<String> {
    [
        "lunch at chipotle",
        "uber to airport",
        "netflix subscription",
        "new laptop from amazon",
        "movie tickets",
        "potato chips at gaming street shop",
        "gaming subscription",
        "",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
