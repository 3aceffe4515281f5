/// One analyzed spectrum bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyMagnitude {
    /// Bin center frequency in Hz
    pub frequency: f64,
    /// Spectral amplitude (0.0 when loaded from the text format)
    pub magnitude: f64,
}

impl FrequencyMagnitude {
    pub fn new(frequency: f64, magnitude: f64) -> Self {
        Self { frequency, magnitude }
    }

    /// A frequency whose magnitude is unknown. The text format does not
    /// persist magnitudes, so loaded fingerprints are built from these.
    pub fn unweighted(frequency: f64) -> Self {
        Self { frequency, magnitude: 0.0 }
    }
}

/// Spectral signature of one chunk: the strongest bins, descending by magnitude.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fingerprint {
    pub frequencies: Vec<FrequencyMagnitude>,
}

impl Fingerprint {
    pub fn new(frequencies: Vec<FrequencyMagnitude>) -> Self {
        Self { frequencies }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequencies sorted ascending. Works on a copy; `self` keeps its
    /// magnitude order.
    pub fn sorted_frequencies(&self) -> Vec<f64> {
        let mut sorted: Vec<f64> = self.frequencies.iter().map(|f| f.frequency).collect();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    pub fn at(self, timestamp: f64) -> TimestampedFingerprint {
        TimestampedFingerprint {
            fingerprint: self,
            timestamp,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimestampedFingerprint {
    pub fingerprint: Fingerprint,
    /// Seconds from stream start
    pub timestamp: f64,
}

/// Timestamp-ordered fingerprints of one audio source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FingerprintSequence {
    entries: Vec<TimestampedFingerprint>,
}

impl FingerprintSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TimestampedFingerprint) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.timestamp < entry.timestamp),
            "timestamps must be strictly increasing"
        );
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TimestampedFingerprint] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimestampedFingerprint> {
        self.entries.iter()
    }
}

impl From<Vec<TimestampedFingerprint>> for FingerprintSequence {
    fn from(entries: Vec<TimestampedFingerprint>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a FingerprintSequence {
    type Item = &'a TimestampedFingerprint;
    type IntoIter = std::slice::Iter<'a, TimestampedFingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
