pub mod source;
pub mod stream;

pub use source::{MemorySource, SampleBlock, SampleSource, WavFileSource, read_wav_channel};
pub use stream::run_stream;
