use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

/// One block of samples handed to the filter loop
///
/// `reference` is present only for adaptive engines and always has the
/// same length as `input`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBlock {
    pub input: Vec<f32>,
    pub reference: Option<Vec<f32>>,
}

impl SampleBlock {
    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

pub trait SampleSource: Send {
    fn next_block(&mut self) -> anyhow::Result<Option<SampleBlock>>;
    fn sample_rate(&self) -> u32;
}

/// Block source over in-memory sample vectors
pub struct MemorySource {
    input: Vec<f32>,
    reference: Option<Vec<f32>>,
    position: usize,
    block_size: usize,
    sample_rate: u32,
}

impl MemorySource {
    pub fn new(
        input: Vec<f32>,
        reference: Option<Vec<f32>>,
        block_size: usize,
        sample_rate: u32,
    ) -> anyhow::Result<Self> {
        if block_size == 0 {
            anyhow::bail!("Block size must be at least 1");
        }
        if let Some(r) = &reference
            && r.len() != input.len()
        {
            anyhow::bail!(
                "Reference has {} samples but input has {}",
                r.len(),
                input.len()
            );
        }
        Ok(Self {
            input,
            reference,
            position: 0,
            block_size,
            sample_rate,
        })
    }
}

impl SampleSource for MemorySource {
    fn next_block(&mut self) -> anyhow::Result<Option<SampleBlock>> {
        if self.position >= self.input.len() {
            return Ok(None);
        }

        let end = self.position.saturating_add(self.block_size).min(self.input.len());
        let block = SampleBlock {
            input: self.input[self.position..end].to_vec(),
            reference: self
                .reference
                .as_ref()
                .map(|r| r[self.position..end].to_vec()),
        };
        self.position = end;

        Ok(Some(block))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Read one channel of a WAV file, returning the samples and sample rate
pub fn read_wav_channel<P: AsRef<Path>>(
    path: P,
    channel: usize,
) -> anyhow::Result<(Vec<f32>, u32)> {
    let mut source = WavFileSource::new(path, usize::MAX, channel, None)?;
    let sample_rate = source.sample_rate();
    let input = std::mem::take(&mut source.inner.input);
    Ok((input, sample_rate))
}

/// Block source reading channels of a WAV file
///
/// Integer PCM is normalised to ±1.0 full scale. The input (and optional
/// reference) channel are de-interleaved on open.
pub struct WavFileSource {
    inner: MemorySource,
    channels: u16,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(
        path: P,
        block_size: usize,
        input_channel: usize,
        reference_channel: Option<usize>,
    ) -> anyhow::Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels as usize;

        for channel in std::iter::once(input_channel).chain(reference_channel) {
            if channel >= channels {
                anyhow::bail!(
                    "Channel {} requested but WAV file has {} channels",
                    channel,
                    channels
                );
            }
        }

        let interleaved = Self::read_samples(reader, &spec)?;
        let extract = |channel: usize| -> Vec<f32> {
            interleaved
                .iter()
                .skip(channel)
                .step_by(channels)
                .copied()
                .collect()
        };

        let input = extract(input_channel);
        let reference = reference_channel.map(extract);

        log::debug!(
            "Opened WAV: {} channels, {} Hz, {} frames",
            channels,
            spec.sample_rate,
            input.len()
        );

        Ok(Self {
            inner: MemorySource::new(input, reference, block_size, spec.sample_rate)?,
            channels: spec.channels,
        })
    }

    /// Replace the reference with `reference`, e.g. one read from a second file
    pub fn with_reference(self, reference: Vec<f32>) -> anyhow::Result<Self> {
        let block_size = self.inner.block_size;
        let sample_rate = self.inner.sample_rate;
        Ok(Self {
            inner: MemorySource::new(self.inner.input, Some(reference), block_size, sample_rate)?,
            channels: self.channels,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> anyhow::Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = (1u64 << (spec.bits_per_sample as u32 - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }
}

impl SampleSource for WavFileSource {
    fn next_block(&mut self) -> anyhow::Result<Option<SampleBlock>> {
        self.inner.next_block()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_blocks() {
        let input: Vec<f32> = (0..7).map(|i| i as f32).collect();
        let reference: Vec<f32> = (0..7).map(|i| -(i as f32)).collect();
        let mut source = MemorySource::new(input, Some(reference), 3, 1000).unwrap();

        let first = source.next_block().unwrap().unwrap();
        assert_eq!(first.input, vec![0.0, 1.0, 2.0]);
        assert_eq!(first.reference, Some(vec![0.0, -1.0, -2.0]));

        let second = source.next_block().unwrap().unwrap();
        assert_eq!(second.len(), 3);

        let last = source.next_block().unwrap().unwrap();
        assert_eq!(last.input, vec![6.0]);
        assert!(source.next_block().unwrap().is_none());
    }

    #[test]
    fn test_memory_source_single_block_when_large() {
        let mut source = MemorySource::new(vec![1.0; 5], None, usize::MAX, 250).unwrap();
        assert_eq!(source.next_block().unwrap().unwrap().len(), 5);
        assert!(source.next_block().unwrap().is_none());
        assert_eq!(source.sample_rate(), 250);
    }

    #[test]
    fn test_memory_source_rejects_mismatched_reference() {
        assert!(MemorySource::new(vec![0.0; 4], Some(vec![0.0; 3]), 2, 1000).is_err());
        assert!(MemorySource::new(vec![0.0; 4], None, 0, 1000).is_err());
    }

    #[test]
    fn test_read_wav_channel_scales_32_bit_int() {
        let path = std::env::temp_dir().join(format!(
            "biofilter_int32_{}.wav",
            std::process::id()
        ));
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 1000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for v in [i32::MAX / 2, i32::MIN, 0] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, sample_rate) = read_wav_channel(&path, 0).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sample_rate, 1000);
        assert_eq!(samples.len(), 3);
        approx::assert_abs_diff_eq!(samples[0], 0.5, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(samples[1], -1.0, epsilon = 1e-6);
        assert_eq!(samples[2], 0.0);
    }
}
