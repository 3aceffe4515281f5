pub mod chunker;
pub mod format;
pub mod model;
pub mod spectrum;

pub use chunker::{chunk, Chunker, FingerprintParams};
pub use model::{Fingerprint, FingerprintSequence, FrequencyMagnitude, TimestampedFingerprint};
pub use spectrum::SpectralAnalyzer;
