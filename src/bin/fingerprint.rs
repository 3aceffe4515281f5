use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufWriter, Write};
use std::time::Duration;

use sonoprint::audio::{FileSource, SampleSource};
use sonoprint::cli::{create_output, FingerprintCli};
use sonoprint::config;
use sonoprint::fingerprint::format::{write_report, write_sequence};
use sonoprint::profile::RunProfile;
use sonoprint::{CancelToken, Pipeline};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = FingerprintCli::parse();

    let cfg = config::load_active_config(cli.config.as_deref())?;
    let params = config::resolve_params(cfg.as_ref(), cli.chunk_seconds, cli.frequency_count);

    let input = cli.input()?;

    log::info!("Input: {}", input.display());
    log::info!(
        "Chunks: {}s, top {} frequencies per chunk",
        params.chunk_seconds, params.frequency_count
    );

    let source = FileSource::open(input)
        .with_context(|| format!("Failed to open {} for decoding", input.display()))?;
    params
        .chunk_size(source.sample_rate())
        .context("Invalid fingerprint parameters")?;

    // Fail on unwritable output paths before spending time decoding.
    let mut output = cli.output.as_deref().map(create_output).transpose()?;
    let profile_out = cli.profile.as_deref().map(create_output).transpose()?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        if let Err(err) = ctrlc::set_handler(move || cancel.cancel()) {
            log::warn!("Could not install Ctrl-C handler: {}", err);
        }
    }

    let mut pipeline = Pipeline::new(params).with_cancel(cancel);
    let spinner = if cli.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner} {pos} chunks")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pipeline = pipeline.with_progress(pb.clone());
        Some(pb)
    };

    let result = pipeline.run(source);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let (sequence, stats) = result.with_context(|| format!("Failed to fingerprint {}", input.display()))?;

    match output {
        Some(ref mut writer) => {
            write_sequence(writer, &sequence)?;
            writer.flush().context("Failed to flush fingerprint output")?;
            if let Some(ref path) = cli.output {
                log::info!("Wrote {} fingerprints to {}", sequence.len(), path.display());
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_report(&mut out, &sequence)?;
            out.flush()?;
        }
    }

    if let (Some(writer), Some(path)) = (profile_out, cli.profile.as_ref()) {
        RunProfile::new(input, &stats)
            .write_to(writer)
            .with_context(|| format!("Failed to write profile: {}", path.display()))?;
        log::info!("Wrote run profile to {}", path.display());
    }

    Ok(())
}
