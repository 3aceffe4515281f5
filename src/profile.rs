use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::pipeline::RunStats;

/// Timing summary of one fingerprinting run, written as JSON.
#[derive(Debug, Serialize)]
pub struct RunProfile {
    pub input: String,
    pub sample_rate: u32,
    pub chunk_size: usize,
    pub samples: u64,
    pub chunks: usize,
    pub discarded_samples: usize,
    pub elapsed_secs: f64,
    pub audio_secs: f64,
    /// Seconds of audio processed per wall-clock second
    pub realtime_factor: f64,
}

impl RunProfile {
    pub fn new(input: &Path, stats: &RunStats) -> Self {
        let elapsed_secs = stats.elapsed.as_secs_f64();
        let audio_secs = if stats.sample_rate > 0 {
            stats.samples as f64 / stats.sample_rate as f64
        } else {
            0.0
        };
        let realtime_factor = if elapsed_secs > 0.0 { audio_secs / elapsed_secs } else { 0.0 };

        Self {
            input: input.display().to_string(),
            sample_rate: stats.sample_rate,
            chunk_size: stats.chunk_size,
            samples: stats.samples,
            chunks: stats.chunks,
            discarded_samples: stats.discarded_samples,
            elapsed_secs,
            audio_secs,
            realtime_factor,
        }
    }

    /// Write the profile as pretty JSON. The writer is typically opened
    /// before the run starts.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(std::io::Error::from)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
