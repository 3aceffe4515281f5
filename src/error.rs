use thiserror::Error;

/// Errors returned by fingerprinting and comparison.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("{source_name}:{line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("{0}")]
    Usage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error(
        "fingerprints do not have matching frequency counts: \
         window[{window_index}] has {window_count}, reference[{reference_index}] has {reference_count}"
    )]
    FrequencyCountMismatch {
        window_index: usize,
        window_count: usize,
        reference_index: usize,
        reference_count: usize,
    },

    #[error("block has {got} samples, analyzer was planned for {expected}")]
    BlockLength { expected: usize, got: usize },

    #[error("cannot compare an empty fingerprint sequence")]
    EmptySequence,

    #[error("fingerprinting was cancelled")]
    Cancelled,
}

impl From<symphonia::core::errors::Error> for Error {
    fn from(err: symphonia::core::errors::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
