//! Two-stage fingerprinting run.
//!
//! A producer thread pulls decoded blocks from a [`SampleSource`] and hands
//! them over a rendezvous channel to the consumer, which owns the
//! [`Chunker`]. The producer blocks until the consumer has taken the
//! previous block, so at most one decoded block is in flight.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;

use crate::audio::SampleSource;
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::fingerprint::{Chunker, FingerprintParams, FingerprintSequence};

/// Counters collected during one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    pub sample_rate: u32,
    pub chunk_size: usize,
    pub samples: u64,
    pub chunks: usize,
    pub discarded_samples: usize,
    pub elapsed: Duration,
}

pub struct Pipeline {
    params: FingerprintParams,
    cancel: CancelToken,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(params: FingerprintParams) -> Self {
        Self {
            params,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Tick `progress` once per emitted chunk.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fingerprint everything `source` produces.
    ///
    /// Any decode error or cancellation discards the fingerprints computed
    /// so far.
    pub fn run<S: SampleSource>(&self, source: S) -> Result<(FingerprintSequence, RunStats)> {
        let started = Instant::now();
        let sample_rate = source.sample_rate();
        let chunker = Chunker::new(sample_rate, &self.params)?;
        let chunk_size = chunker.chunk_size();

        let (tx, rx) = sync_channel::<Vec<f32>>(0);

        let (produced, consumed) = thread::scope(|scope| {
            let cancel = self.cancel.clone();
            let producer = scope.spawn(move || produce(source, tx, &cancel));
            let consumed = self.consume(chunker, rx);
            let produced = producer
                .join()
                .unwrap_or_else(|_| Err(Error::Decode("sample producer panicked".into())));
            (produced, consumed)
        });

        // A producer failure wins over whatever the consumer saw.
        let samples = produced?;
        let (sequence, discarded) = consumed?;

        let stats = RunStats {
            sample_rate,
            chunk_size,
            samples,
            chunks: sequence.len(),
            discarded_samples: discarded,
            elapsed: started.elapsed(),
        };

        log::info!(
            "Fingerprinted {} samples into {} chunks in {:.2?} ({} trailing samples discarded)",
            stats.samples, stats.chunks, stats.elapsed, stats.discarded_samples
        );

        Ok((sequence, stats))
    }

    fn consume(&self, mut chunker: Chunker, rx: Receiver<Vec<f32>>) -> Result<(FingerprintSequence, usize)> {
        let mut sequence = FingerprintSequence::new();

        for block in rx.iter() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for &sample in &block {
                if let Some(fp) = chunker.push(sample as f64)? {
                    sequence.push(fp);
                    if let Some(ref pb) = self.progress {
                        pb.inc(1);
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok((sequence, chunker.finish()))
    }
}

fn produce<S: SampleSource>(mut source: S, tx: SyncSender<Vec<f32>>, cancel: &CancelToken) -> Result<u64> {
    let mut samples = 0u64;

    while let Some(block) = source.next_block()? {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        samples += block.len() as u64;
        if tx.send(block).is_err() {
            // Consumer stopped early; it reports why.
            break;
        }
    }

    log::debug!("Sample producer finished after {} samples", samples);
    Ok(samples)
}
