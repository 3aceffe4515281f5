use anyhow::{Context, Result};
use clap::Parser;

use sonoprint::cli::CompareCli;
use sonoprint::compare;
use sonoprint::fingerprint::format::load_sequence;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = CompareCli::parse();
    let (first_path, second_path) = cli.pair()?;

    let first = load_sequence(first_path)
        .with_context(|| format!("Failed to load fingerprint {}", first_path.display()))?;
    let second = load_sequence(second_path)
        .with_context(|| format!("Failed to load fingerprint {}", second_path.display()))?;

    let result = compare(&first, &second).context("Fingerprints are not comparable")?;

    let (window, reference) = if result.window_is_first {
        (first_path, second_path)
    } else {
        (second_path, first_path)
    };
    log::info!(
        "Best alignment: {} starts at {:.2}s (entry {}) of {}",
        window.display(),
        result.offset_seconds,
        result.offset,
        reference.display()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Loss: {:.6}", result.global_loss);
    }

    Ok(())
}
