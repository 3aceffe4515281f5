use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fingerprint::{Fingerprint, FingerprintSequence, TimestampedFingerprint};

/// Best alignment of the shorter sequence inside the longer one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    /// Minimal window loss divided by the window length
    pub global_loss: f64,
    /// Index into the reference where the window starts
    pub offset: usize,
    /// Timestamp of the reference entry at `offset`
    pub offset_seconds: f64,
    pub window_len: usize,
    pub reference_len: usize,
    /// True when the first argument was used as the window
    pub window_is_first: bool,
}

/// Smallest absolute difference between two fingerprints' frequencies,
/// each sorted ascending and paired by position.
///
/// Any single close match yields a low loss; the other frequencies are
/// ignored. Returns `f64::MAX` for empty fingerprints.
pub fn element_loss(a: &Fingerprint, b: &Fingerprint) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.sorted_frequencies()
        .iter()
        .zip(b.sorted_frequencies().iter())
        .map(|(fa, fb)| (fa - fb).abs())
        .fold(f64::MAX, f64::min)
}

/// Split into (window, reference, window_is_first). On equal lengths the
/// first argument is the window.
fn comparison_order<'a>(
    a: &'a FingerprintSequence,
    b: &'a FingerprintSequence,
) -> (&'a FingerprintSequence, &'a FingerprintSequence, bool) {
    if a.len() <= b.len() {
        (a, b, true)
    } else {
        (b, a, false)
    }
}

fn window_loss(window: &[TimestampedFingerprint], reference: &[TimestampedFingerprint], offset: usize) -> Result<f64> {
    let mut loss = 0.0;
    for (j, w) in window.iter().enumerate() {
        let r = &reference[offset + j];
        if w.fingerprint.len() != r.fingerprint.len() {
            return Err(Error::FrequencyCountMismatch {
                window_index: j,
                window_count: w.fingerprint.len(),
                reference_index: offset + j,
                reference_count: r.fingerprint.len(),
            });
        }
        loss += element_loss(&w.fingerprint, &r.fingerprint);
    }
    Ok(loss)
}

#[derive(Clone, Copy, Debug)]
struct OffsetLoss {
    offset: usize,
    loss: f64,
}

// Lower loss ranks first; equal losses prefer the earlier offset.
impl Ord for OffsetLoss {
    fn cmp(&self, other: &Self) -> Ordering {
        self.loss
            .total_cmp(&other.loss)
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for OffsetLoss {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OffsetLoss {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OffsetLoss {}

/// Slide the shorter sequence over the longer one and return the offset
/// with the smallest summed element loss.
///
/// Only offsets where the window fits entirely inside the reference are
/// scored. Offsets are scored in parallel.
pub fn compare(a: &FingerprintSequence, b: &FingerprintSequence) -> Result<Comparison> {
    let (window, reference, window_is_first) = comparison_order(a, b);
    if window.is_empty() {
        return Err(Error::EmptySequence);
    }

    let win = window.entries();
    let refs = reference.entries();
    let positions = refs.len() - win.len() + 1;

    let losses = (0..positions)
        .into_par_iter()
        .map(|offset| window_loss(win, refs, offset).map(|loss| Reverse(OffsetLoss { offset, loss })))
        .collect::<Result<Vec<_>>>()?;

    let mut heap = BinaryHeap::from(losses);
    let best = match heap.pop() {
        Some(Reverse(best)) => best,
        None => return Err(Error::EmptySequence),
    };

    log::debug!(
        "Scored {} offsets (window {}, reference {}); best offset {} with loss {}",
        positions, win.len(), refs.len(), best.offset, best.loss
    );

    Ok(Comparison {
        global_loss: best.loss / win.len() as f64,
        offset: best.offset,
        offset_seconds: refs[best.offset].timestamp,
        window_len: win.len(),
        reference_len: refs.len(),
        window_is_first,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FrequencyMagnitude;

    fn fp(freqs: &[f64]) -> Fingerprint {
        Fingerprint::new(freqs.iter().map(|&f| FrequencyMagnitude::unweighted(f)).collect())
    }

    fn seq(rows: &[[f64; 3]]) -> FingerprintSequence {
        FingerprintSequence::from(
            rows.iter()
                .enumerate()
                .map(|(i, r)| fp(r).at(i as f64 * 0.3))
                .collect::<Vec<_>>(),
        )
    }

    fn long_sequence() -> FingerprintSequence {
        seq(&[
            [100.0, 200.0, 300.0],
            [110.0, 220.0, 330.0],
            [120.0, 240.0, 360.0],
            [130.0, 260.0, 390.0],
            [140.0, 280.0, 420.0],
            [150.0, 300.0, 450.0],
            [160.0, 320.0, 480.0],
            [170.0, 340.0, 510.0],
            [180.0, 360.0, 540.0],
            [190.0, 380.0, 570.0],
        ])
    }

    #[test]
    fn element_loss_takes_minimum_difference() {
        let a = fp(&[300.0, 100.0, 205.0]);
        let b = fp(&[101.0, 310.0, 200.0]);
        assert_eq!(element_loss(&a, &b), 1.0);
        // inputs untouched
        assert_eq!(a.frequencies[0].frequency, 300.0);
        assert_eq!(b.frequencies[1].frequency, 310.0);
    }

    #[test]
    fn self_comparison_is_zero() {
        let s = long_sequence();
        let result = compare(&s, &s).unwrap();
        assert_eq!(result.global_loss, 0.0);
        assert_eq!(result.offset, 0);
        assert_eq!(result.window_len, 10);
    }

    #[test]
    fn finds_embedded_window() {
        let reference = long_sequence();
        let window = FingerprintSequence::from(reference.entries()[4..9].to_vec());

        let result = compare(&window, &reference).unwrap();
        assert_eq!(result.global_loss, 0.0);
        assert_eq!(result.offset, 4);
        assert!((result.offset_seconds - 1.2).abs() < 1e-9);
        assert!(result.window_is_first);
    }

    #[test]
    fn argument_order_does_not_change_result() {
        let reference = long_sequence();
        let window = seq(&[
            [131.0, 262.0, 395.0],
            [141.0, 279.0, 425.0],
            [152.0, 300.0, 455.0],
            [158.0, 321.0, 490.0],
            [173.0, 344.0, 505.0],
        ]);

        let ab = compare(&window, &reference).unwrap();
        let ba = compare(&reference, &window).unwrap();

        assert_eq!(ab.window_len, 5);
        assert_eq!(ba.window_len, 5);
        assert!(!ba.window_is_first);
        assert_eq!(ab.global_loss, ba.global_loss);
        assert_eq!(ab.offset, ba.offset);
        assert_eq!(ab.offset, 3);
        // losses at offset 3: 1 + 1 + 0 + 1 + 3
        assert!((ab.global_loss - 6.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn equal_lengths_score_single_offset() {
        let a = seq(&[[100.0, 200.0, 300.0], [400.0, 500.0, 600.0]]);
        let b = seq(&[[104.0, 210.0, 320.0], [402.0, 509.0, 700.0]]);

        let result = compare(&a, &b).unwrap();
        assert_eq!(result.offset, 0);
        assert!(result.window_is_first);
        assert!((result.global_loss - (4.0 + 2.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_frequency_counts_fail() {
        let a = seq(&[[100.0, 200.0, 300.0]]);
        let b = FingerprintSequence::from(vec![fp(&[100.0, 200.0]).at(0.0)]);
        let err = compare(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            Error::FrequencyCountMismatch { window_count: 3, reference_count: 2, .. }
        ));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let empty = FingerprintSequence::new();
        assert!(matches!(compare(&empty, &long_sequence()), Err(Error::EmptySequence)));
    }

    #[test]
    fn ties_prefer_earliest_offset() {
        let reference = seq(&[
            [100.0, 200.0, 300.0],
            [100.0, 200.0, 300.0],
            [100.0, 200.0, 300.0],
        ]);
        let window = seq(&[[100.0, 200.0, 300.0]]);
        assert_eq!(compare(&window, &reference).unwrap().offset, 0);
    }
}
