use crate::error::{FilterError, Result};
use crate::signal_processing::{DelayLine, StreamingFilter};

/// Fixed-coefficient FIR convolution filter
///
/// Computes `y[n] = Σ b[k]·x[n-k]` for `k` in `0..num_taps`. The coefficient
/// slice is borrowed from the caller for the lifetime of the filter and is
/// never modified. The delay line holds `num_taps + block_size - 1` samples
/// and is the only state carried between calls.
pub struct FirFilter<'a> {
    taps: &'a [f32],
    delay_line: DelayLine,
    block_size: usize,
}

impl<'a> FirFilter<'a> {
    /// Create a new FIR filter over the first `num_taps` coefficients
    ///
    /// # Arguments
    /// * `coeffs` - Tap coefficients `b[0..num_taps]`, in impulse-response order
    /// * `num_taps` - Number of taps (filter order + 1)
    /// * `block_size` - Nominal block length used to size the delay line
    ///
    /// # Errors
    /// Returns `FilterError::ZeroTaps`, `FilterError::ZeroBlockSize`, or
    /// `FilterError::CoefficientLength` when `coeffs` holds fewer than
    /// `num_taps` values.
    pub fn new(coeffs: &'a [f32], num_taps: usize, block_size: usize) -> Result<Self> {
        if num_taps == 0 {
            return Err(FilterError::ZeroTaps);
        }
        if block_size == 0 {
            return Err(FilterError::ZeroBlockSize);
        }
        if coeffs.len() < num_taps {
            return Err(FilterError::CoefficientLength {
                expected: num_taps,
                actual: coeffs.len(),
            });
        }

        log::debug!(
            "FIR filter: {} taps, block size {}, state {} samples",
            num_taps,
            block_size,
            num_taps + block_size - 1
        );

        Ok(Self {
            taps: &coeffs[..num_taps],
            delay_line: DelayLine::new(num_taps + block_size - 1),
            block_size,
        })
    }

    /// Process a single sample through the filter
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        self.delay_line.push(sample);
        self.delay_line.dot(self.taps)
    }

    /// Filter `input` into `output`
    ///
    /// Equivalent to calling `process_sample` for each element in order.
    /// Only `min(input.len(), output.len())` samples are processed; callers
    /// that need the lengths checked use `try_process_buffer`.
    pub fn process_buffer(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process_sample(*x);
        }
    }

    /// Filter `input` into `output`, rejecting mismatched lengths
    pub fn try_process_buffer(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        if input.len() != output.len() {
            return Err(FilterError::BufferLength {
                expected: input.len(),
                actual: output.len(),
            });
        }
        self.process_buffer(input, output);
        Ok(())
    }

    /// Zero the delay line
    pub fn reset_state(&mut self) {
        self.delay_line.clear();
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of samples held in the delay line
    pub fn state_len(&self) -> usize {
        self.delay_line.capacity()
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f32] {
        self.taps
    }
}

impl StreamingFilter for FirFilter<'_> {
    fn process_sample(&mut self, sample: f32) -> f32 {
        FirFilter::process_sample(self, sample)
    }

    fn process_buffer(&mut self, input: &[f32], output: &mut [f32]) {
        FirFilter::process_buffer(self, input, output)
    }

    fn reset_state(&mut self) {
        FirFilter::reset_state(self)
    }
}
