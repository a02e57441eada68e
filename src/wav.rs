use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::error::{FilterError, Result};

/// Write equal-length channels as an interleaved 32-bit float WAV
pub fn save_wav<P: AsRef<Path>>(path: P, channels: &[&[f32]], sample_rate: u32) -> Result<()> {
    let Some(first) = channels.first() else {
        return Err(FilterError::Config("no channels to write".to_string()));
    };
    let frames = first.len();
    if let Some(bad) = channels.iter().find(|c| c.len() != frames) {
        return Err(FilterError::BufferLength {
            expected: frames,
            actual: bad.len(),
        });
    }
    let num_channels = u16::try_from(channels.len())
        .map_err(|_| FilterError::Config(format!("too many channels: {}", channels.len())))?;

    let spec = WavSpec {
        channels: num_channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for i in 0..frames {
        for channel in channels {
            writer.write_sample(channel[i])?;
        }
    }
    writer.finalize()?;

    log::debug!(
        "Wrote {} frames x {} channels to {}",
        frames,
        num_channels,
        path.as_ref().display()
    );
    Ok(())
}
