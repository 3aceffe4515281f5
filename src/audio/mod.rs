pub mod decode;
pub mod source;

pub use decode::FileSource;
pub use source::{MemorySource, SampleSource};
