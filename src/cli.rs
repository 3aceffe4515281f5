use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "fingerprint", about = "Compute a spectral fingerprint of an audio file")]
pub struct FingerprintCli {
    /// Audio file to fingerprint (FLAC, WAV, MP3, OGG)
    #[arg(short, long)]
    pub filename: Option<PathBuf>,

    /// Fingerprint output file. Prints a readable report to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON run profile to this file
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Config file (defaults to ./sonoprint.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chunk duration in seconds
    #[arg(long)]
    pub chunk_seconds: Option<f64>,

    /// Number of dominant frequencies kept per chunk
    #[arg(long)]
    pub frequency_count: Option<usize>,

    /// Hide the progress spinner
    #[arg(short, long)]
    pub quiet: bool,
}

impl FingerprintCli {
    /// The audio file to fingerprint; it must be given and exist.
    pub fn input(&self) -> Result<&Path> {
        let input = self
            .filename
            .as_deref()
            .ok_or_else(|| Error::Usage("must specify filename of audio file to fingerprint".into()))?;
        if !input.exists() {
            return Err(Error::Usage(format!("input file not found: {}", input.display())));
        }
        Ok(input)
    }
}

#[derive(Parser, Debug)]
#[command(name = "compare-fingerprints", about = "Compare two fingerprint files and report the best-alignment loss")]
pub struct CompareCli {
    /// Fingerprint files to compare
    #[arg(num_args = 0..)]
    pub files: Vec<PathBuf>,

    /// Print the full comparison as JSON
    #[arg(long)]
    pub json: bool,
}

impl CompareCli {
    /// The two fingerprint files to compare.
    pub fn pair(&self) -> Result<(&Path, &Path)> {
        match self.files.as_slice() {
            [first, second] => Ok((first.as_path(), second.as_path())),
            files => Err(Error::Usage(format!(
                "expected the file names of two fingerprints to compare, got {}",
                files.len()
            ))),
        }
    }
}

/// Create (truncate) an output file up front so an unwritable path fails
/// before any work is done.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to create {}: {}", path.display(), e),
        ))
    })?;
    Ok(BufWriter::new(file))
}
