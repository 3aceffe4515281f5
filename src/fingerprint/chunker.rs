use serde::Deserialize;

use super::model::{FingerprintSequence, TimestampedFingerprint};
use super::spectrum::SpectralAnalyzer;
use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SECONDS: f64 = 0.3;
pub const DEFAULT_FREQUENCY_COUNT: usize = 3;
/// Largest chunk the analyzer will plan an FFT for.
pub const MAX_CHUNK_SIZE: usize = u32::MAX as usize;

/// Parameters that must match between two fingerprints for them to be comparable.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct FingerprintParams {
    /// Duration of one chunk in seconds
    #[serde(default = "default_chunk_seconds")]
    pub chunk_seconds: f64,
    /// Number of dominant frequencies kept per chunk
    #[serde(default = "default_frequency_count")]
    pub frequency_count: usize,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self {
            chunk_seconds: default_chunk_seconds(),
            frequency_count: default_frequency_count(),
        }
    }
}

fn default_chunk_seconds() -> f64 { DEFAULT_CHUNK_SECONDS }
fn default_frequency_count() -> usize { DEFAULT_FREQUENCY_COUNT }

impl FingerprintParams {
    /// Samples per chunk at `sample_rate`, `round(sample_rate * chunk_seconds)`.
    pub fn chunk_size(&self, sample_rate: u32) -> Result<usize> {
        if self.frequency_count == 0 {
            return Err(Error::InvalidParams("frequency count must be at least 1".into()));
        }
        if !self.chunk_seconds.is_finite() || self.chunk_seconds <= 0.0 {
            return Err(Error::InvalidParams(format!(
                "chunk duration must be a positive number of seconds, got {}",
                self.chunk_seconds
            )));
        }
        if sample_rate == 0 {
            return Err(Error::InvalidParams("sample rate must be positive".into()));
        }

        let size = (sample_rate as f64 * self.chunk_seconds).round();
        if size < 1.0 {
            return Err(Error::InvalidParams(format!(
                "{}s at {}Hz is less than one sample per chunk",
                self.chunk_seconds, sample_rate
            )));
        }
        if size > MAX_CHUNK_SIZE as f64 {
            return Err(Error::InvalidParams(format!(
                "{}s at {}Hz exceeds the maximum of {} samples per chunk",
                self.chunk_seconds, sample_rate, MAX_CHUNK_SIZE
            )));
        }
        Ok(size as usize)
    }
}

/// Splits a sample stream into fixed-size chunks and fingerprints each one.
///
/// All buffering state lives here; feed samples in stream order with
/// [`Chunker::push`]. A trailing partial chunk is never emitted.
pub struct Chunker {
    analyzer: SpectralAnalyzer,
    chunk_seconds: f64,
    buffer: Vec<f64>,
    chunk_index: usize,
}

impl Chunker {
    pub fn new(sample_rate: u32, params: &FingerprintParams) -> Result<Self> {
        let chunk_size = params.chunk_size(sample_rate)?;
        log::debug!(
            "Chunker: {} samples per chunk ({}s @ {}Hz), top {} frequencies",
            chunk_size, params.chunk_seconds, sample_rate, params.frequency_count
        );

        Ok(Self {
            analyzer: SpectralAnalyzer::new(chunk_size, sample_rate, params.frequency_count),
            chunk_seconds: params.chunk_seconds,
            buffer: Vec::with_capacity(chunk_size),
            chunk_index: 0,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.analyzer.block_len()
    }

    /// Number of complete chunks emitted so far.
    pub fn chunks_emitted(&self) -> usize {
        self.chunk_index
    }

    /// Buffer one sample. Returns a fingerprint when this sample completes a chunk.
    pub fn push(&mut self, sample: f64) -> Result<Option<TimestampedFingerprint>> {
        self.buffer.push(sample);
        if self.buffer.len() < self.analyzer.block_len() {
            return Ok(None);
        }

        let timestamp = self.chunk_index as f64 * self.chunk_seconds;
        let fingerprint = self.analyzer.analyze(&self.buffer)?.at(timestamp);
        self.buffer.clear();
        self.chunk_index += 1;
        Ok(Some(fingerprint))
    }

    /// End the stream. Returns the number of buffered samples that were
    /// dropped because they did not fill a chunk.
    pub fn finish(self) -> usize {
        self.buffer.len()
    }
}

/// Fingerprint an in-order sample stream without threads.
pub fn chunk<I>(samples: I, sample_rate: u32, params: &FingerprintParams) -> Result<FingerprintSequence>
where
    I: IntoIterator<Item = f64>,
{
    let mut chunker = Chunker::new(sample_rate, params)?;
    let mut sequence = FingerprintSequence::new();

    for sample in samples {
        if let Some(fp) = chunker.push(sample)? {
            sequence.push(fp);
        }
    }

    let dropped = chunker.finish();
    if dropped > 0 {
        log::debug!("Discarded {} trailing samples (partial chunk)", dropped);
    }
    Ok(sequence)
}
