use crate::constants::{BIQUAD_COEFFS_PER_STAGE, BIQUAD_STATE_PER_STAGE};
use crate::error::{FilterError, Result};
use crate::signal_processing::StreamingFilter;

/// Cascade of Direct-Form I second-order sections
///
/// Each stage computes
/// `y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]`
/// and feeds its output to the next stage. Coefficients are borrowed as a
/// flat slice of `{b0, b1, b2, a1, a2}` quintuples (`a0` normalised to 1).
///
/// Splitting a high-order response into biquads keeps coefficient magnitudes
/// small, which matters for narrow notches evaluated in single precision.
/// Like any IIR filter the phase response is non-linear.
pub struct BiquadCascade<'a> {
    coeffs: &'a [f32],
    /// Per stage: `x[n-1], x[n-2], y[n-1], y[n-2]`
    state: Vec<[f32; BIQUAD_STATE_PER_STAGE]>,
    block_size: usize,
}

impl<'a> BiquadCascade<'a> {
    /// Create a new biquad cascade
    ///
    /// # Arguments
    /// * `coeffs` - `5 * num_stages` coefficients, one quintuple per stage
    /// * `num_stages` - Number of second-order sections
    /// * `block_size` - Nominal processing block length
    ///
    /// # Errors
    /// Returns `FilterError::ZeroStages`, `FilterError::ZeroBlockSize`, or
    /// `FilterError::CoefficientLength` if `coeffs.len() != 5 * num_stages`.
    pub fn new(coeffs: &'a [f32], num_stages: usize, block_size: usize) -> Result<Self> {
        if num_stages == 0 {
            return Err(FilterError::ZeroStages);
        }
        if block_size == 0 {
            return Err(FilterError::ZeroBlockSize);
        }
        let expected = BIQUAD_COEFFS_PER_STAGE * num_stages;
        if coeffs.len() != expected {
            return Err(FilterError::CoefficientLength {
                expected,
                actual: coeffs.len(),
            });
        }

        log::debug!(
            "Biquad cascade: {} stages, block size {}",
            num_stages,
            block_size
        );

        Ok(Self {
            coeffs,
            state: vec![[0.0; BIQUAD_STATE_PER_STAGE]; num_stages],
            block_size,
        })
    }

    /// Run one sample through every stage in order
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let mut x = sample;
        for (c, s) in self
            .coeffs
            .chunks_exact(BIQUAD_COEFFS_PER_STAGE)
            .zip(self.state.iter_mut())
        {
            let y = c[0] * x + c[1] * s[0] + c[2] * s[1] - c[3] * s[2] - c[4] * s[3];
            s[1] = s[0];
            s[0] = x;
            s[3] = s[2];
            s[2] = y;
            x = y;
        }
        x
    }

    /// Filter `input` into `output`, carrying state across calls
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

    pub fn reset_state(&mut self) {
        for s in self.state.iter_mut() {
            *s = [0.0; BIQUAD_STATE_PER_STAGE];
        }
    }

    pub fn num_stages(&self) -> usize {
        self.state.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total state words (`4 * num_stages`)
    pub fn state_len(&self) -> usize {
        self.state.len() * BIQUAD_STATE_PER_STAGE
    }

    pub fn coefficients(&self) -> &[f32] {
        self.coeffs
    }
}

impl StreamingFilter for BiquadCascade<'_> {
    fn process_sample(&mut self, sample: f32) -> f32 {
        BiquadCascade::process_sample(self, sample)
    }

    fn process_buffer(&mut self, input: &[f32], output: &mut [f32]) {
        BiquadCascade::process_buffer(self, input, output)
    }

    fn reset_state(&mut self) {
        BiquadCascade::reset_state(self)
    }
}
