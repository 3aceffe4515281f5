use crate::error::Result;

/// A sequential, exhaustible producer of mono samples.
///
/// `next_block` returns `Ok(None)` once the stream is exhausted; an `Err`
/// is terminal and aborts the run.
pub trait SampleSource: Send {
    fn sample_rate(&self) -> u32;

    fn next_block(&mut self) -> Result<Option<Vec<f32>>>;
}

/// Samples already held in memory, handed out in fixed-size blocks.
pub struct MemorySource {
    samples: Vec<f32>,
    sample_rate: u32,
    block_len: usize,
    position: usize,
}

impl MemorySource {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::with_block_len(samples, sample_rate, 4096)
    }

    pub fn with_block_len(samples: Vec<f32>, sample_rate: u32, block_len: usize) -> Self {
        Self {
            samples,
            sample_rate,
            block_len: block_len.max(1),
            position: 0,
        }
    }
}

impl SampleSource for MemorySource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }
        let end = (self.position + self.block_len).min(self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(Some(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_yields_all_samples_then_ends() {
        let mut src = MemorySource::with_block_len((0..10).map(|i| i as f32).collect(), 100, 4);
        let mut lens = Vec::new();
        while let Some(block) = src.next_block().unwrap() {
            lens.push(block.len());
        }
        assert_eq!(lens, vec![4, 4, 2]);
        assert!(src.next_block().unwrap().is_none());
    }
}
