//! Spectral fingerprinting of audio streams and best-offset comparison of
//! fingerprint sequences.

pub mod audio;
pub mod cancel;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod profile;

pub use cancel::CancelToken;
pub use compare::{compare, Comparison};
pub use error::{Error, Result};
pub use fingerprint::{FingerprintParams, FingerprintSequence};
pub use pipeline::{Pipeline, RunStats};
