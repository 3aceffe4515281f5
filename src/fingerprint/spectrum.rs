use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::model::{Fingerprint, FrequencyMagnitude};
use crate::error::{Error, Result};

/// Turns fixed-length sample blocks into top-K fingerprints.
///
/// The FFT is planned once for the block length and reused for every chunk.
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    block_len: usize,
    sample_rate: u32,
    frequency_count: usize,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SpectralAnalyzer {
    pub fn new(block_len: usize, sample_rate: u32, frequency_count: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(block_len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            block_len,
            sample_rate,
            frequency_count,
            buffer: Vec::with_capacity(block_len),
            scratch,
        }
    }

    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Number of bins eligible for selection: the lower half of the
    /// spectrum without the Nyquist bin.
    pub fn candidate_count(&self) -> usize {
        (self.block_len / 2).saturating_sub(1)
    }

    /// Analyze one block of exactly `block_len` samples.
    pub fn analyze(&mut self, block: &[f64]) -> Result<Fingerprint> {
        if block.len() != self.block_len {
            return Err(Error::BlockLength {
                expected: self.block_len,
                got: block.len(),
            });
        }

        self.buffer.clear();
        self.buffer.extend(block.iter().map(|&s| Complex::new(s, 0.0)));
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let candidates = self.candidate_count();
        let bins = self.buffer[..candidates]
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.norm()));

        let frequencies = top_bins(bins, self.frequency_count)
            .into_iter()
            .map(|bin| {
                FrequencyMagnitude::new(
                    bin_frequency(bin.index, self.sample_rate, self.block_len),
                    bin.magnitude,
                )
            })
            .collect();

        Ok(Fingerprint::new(frequencies))
    }
}

pub fn bin_frequency(index: usize, sample_rate: u32, fft_size: usize) -> f64 {
    index as f64 * sample_rate as f64 / fft_size as f64
}

#[derive(Clone, Copy, Debug)]
struct RankedBin {
    index: usize,
    magnitude: f64,
}

// Louder bins rank higher; on equal magnitude the lower bin ranks higher.
impl Ord for RankedBin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.magnitude
            .total_cmp(&other.magnitude)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for RankedBin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedBin {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedBin {}

/// Keep the `k` strongest bins, returned strongest first.
///
/// A min-heap capped at `k` entries holds the current winners, so only the
/// weakest winner is ever compared against a new candidate.
fn top_bins(bins: impl Iterator<Item = (usize, f64)>, k: usize) -> Vec<RankedBin> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<RankedBin>> = BinaryHeap::with_capacity(k + 1);
    for (index, magnitude) in bins {
        heap.push(Reverse(RankedBin { index, magnitude }));
        if heap.len() > k {
            heap.pop();
        }
    }

    // Ascending by Reverse is descending by rank.
    heap.into_sorted_vec().into_iter().map(|Reverse(bin)| bin).collect()
}
