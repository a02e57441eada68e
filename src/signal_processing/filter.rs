use crate::error::Result;

/// Fixed-coefficient streaming filter
///
/// Implemented by `FirFilter` and `BiquadCascade`. Block and sample entry
/// points share one delay line and must produce identical output streams.
pub trait StreamingFilter {
    /// Filter one sample, advancing the delay line by one
    fn process_sample(&mut self, sample: f32) -> f32;

    /// Filter `input` into `output`, advancing the delay line by `input.len()`
    fn process_buffer(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process_sample(*x);
        }
    }

    /// Filter a buffer in place
    fn process_in_place(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Zero the delay line without touching coefficients
    fn reset_state(&mut self);
}

/// Result of one LMS iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveOutput {
    /// Filter estimate `y[n]`
    pub output: f32,
    /// `d[n] - y[n]`
    pub error: f32,
}

/// Streaming filter that adapts its taps against a reference signal
pub trait AdaptiveStreamingFilter {
    fn process_sample(&mut self, input: f32, reference: f32) -> AdaptiveOutput;

    /// Run the adaptation sequentially over a block; taps evolve within the call
    fn process_buffer(
        &mut self,
        inputs: &[f32],
        references: &[f32],
        outputs: &mut [f32],
        errors: &mut [f32],
    ) {
        debug_assert_eq!(inputs.len(), references.len());
        debug_assert_eq!(inputs.len(), outputs.len());
        debug_assert_eq!(inputs.len(), errors.len());
        let samples = inputs
            .iter()
            .zip(references)
            .zip(outputs.iter_mut().zip(errors.iter_mut()));
        for ((x, d), (y, e)) in samples {
            let result = self.process_sample(*x, *d);
            *y = result.output;
            *e = result.error;
        }
    }

    fn mu(&self) -> f32;

    fn set_mu(&mut self, mu: f32);

    /// Overwrite taps (zero when `None`) and clear the delay line
    fn reset_coefficients(&mut self, coeffs: Option<&[f32]>) -> Result<()>;
}
