//! Least-mean-squares adaptive FIR filter.
//!
//! Every sample runs four steps, in this order:
//!
//! ```text
//! y[n] = Σ w[k]·x[n-k]              filter with the current weights
//! e[n] = d[n] - y[n]                compare against the reference
//! w[k] = w[k] + μ·e[n]·x[n-k]       adapt every tap
//! ```
//!
//! followed by advancing the delay line. Block calls repeat the same loop,
//! so weights adapted by sample `i` already filter sample `i + 1`.
//!
//! The weights live in a caller-owned buffer that the filter borrows
//! mutably for its whole lifetime: the filter is the only writer while it
//! exists, and the caller reads the adapted taps back once it is dropped.
//!
//! Convergence is not tracked internally. Callers watch the error stream
//! (see `MovingAverage`) and react with `set_mu` or `reset_coefficients`.
//! The usual stability guidance is `0 < μ < 2 / λmax` of the input
//! autocorrelation matrix; it is not enforced.

use crate::error::{FilterError, Result};
use crate::signal_processing::{AdaptiveOutput, AdaptiveStreamingFilter, DelayLine};

pub struct LmsFilter<'a> {
    weights: &'a mut [f32],
    /// Holds exactly `num_taps` inputs; `x[n]` overwrites `x[n-num_taps]`
    delay_line: DelayLine,
    mu: f32,
    block_size: usize,
}

impl<'a> LmsFilter<'a> {
    /// Create an LMS filter adapting the first `num_taps` entries of `weights`
    ///
    /// # Arguments
    /// * `weights` - Caller-owned initial taps; updated in place on every sample
    /// * `num_taps` - Number of adaptive taps
    /// * `mu` - Adaptation step size
    /// * `block_size` - Nominal processing block length
    ///
    /// # Errors
    /// Returns `FilterError::ZeroTaps`, `FilterError::ZeroBlockSize`, or
    /// `FilterError::CoefficientLength` if `weights` is shorter than `num_taps`.
    pub fn new(
        weights: &'a mut [f32],
        num_taps: usize,
        mu: f32,
        block_size: usize,
    ) -> Result<Self> {
        if num_taps == 0 {
            return Err(FilterError::ZeroTaps);
        }
        if block_size == 0 {
            return Err(FilterError::ZeroBlockSize);
        }
        if weights.len() < num_taps {
            return Err(FilterError::CoefficientLength {
                expected: num_taps,
                actual: weights.len(),
            });
        }

        log::debug!(
            "LMS filter: {} taps, mu {}, block size {}",
            num_taps,
            mu,
            block_size
        );

        Ok(Self {
            weights: &mut weights[..num_taps],
            delay_line: DelayLine::new(num_taps),
            mu,
            block_size,
        })
    }

    /// Filter one input sample and adapt against `reference`
    pub fn process_sample(&mut self, input: f32, reference: f32) -> AdaptiveOutput {
        // The slot being overwritten holds x[n-num_taps], which no tap reads.
        self.delay_line.push(input);

        let output = self.delay_line.dot(&*self.weights);
        let error = reference - output;

        let step = self.mu * error;
        for (w, x) in self.weights.iter_mut().zip(self.delay_line.iter_recent()) {
            *w += step * x;
        }

        AdaptiveOutput { output, error }
    }

    /// Adapt sequentially over a block
    ///
    /// Processes `min` of the four slice lengths; `try_process_buffer`
    /// rejects mismatched lengths instead.
    pub fn process_buffer(
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

    /// Adapt over a block, rejecting mismatched lengths
    pub fn try_process_buffer(
        &mut self,
        inputs: &[f32],
        references: &[f32],
        outputs: &mut [f32],
        errors: &mut [f32],
    ) -> Result<()> {
        let expected = inputs.len();
        for actual in [references.len(), outputs.len(), errors.len()] {
            if actual != expected {
                return Err(FilterError::BufferLength { expected, actual });
            }
        }
        self.process_buffer(inputs, references, outputs, errors);
        Ok(())
    }

    pub fn mu(&self) -> f32 {
        self.mu
    }

    /// Change the step size; applies from the next processed sample
    pub fn set_mu(&mut self, mu: f32) {
        log::debug!("LMS mu changed from {} to {}", self.mu, mu);
        self.mu = mu;
    }

    /// Overwrite every tap and clear the delay line
    ///
    /// Taps are copied from `coeffs` or zeroed when `None`. `mu` and the
    /// filter shape are kept.
    ///
    /// # Errors
    /// Returns `FilterError::CoefficientLength` if `coeffs` is shorter than
    /// `num_taps`; nothing is modified in that case.
    pub fn reset_coefficients(&mut self, coeffs: Option<&[f32]>) -> Result<()> {
        match coeffs {
            Some(c) => {
                if c.len() < self.weights.len() {
                    return Err(FilterError::CoefficientLength {
                        expected: self.weights.len(),
                        actual: c.len(),
                    });
                }
                self.weights.copy_from_slice(&c[..self.weights.len()]);
            }
            None => self.weights.fill(0.0),
        }
        self.delay_line.clear();
        log::debug!("LMS coefficients reset ({} taps)", self.weights.len());
        Ok(())
    }

    /// Current (adapted) weights
    pub fn coefficients(&self) -> &[f32] {
        &*self.weights
    }

    pub fn num_taps(&self) -> usize {
        self.weights.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn state_len(&self) -> usize {
        self.delay_line.capacity()
    }
}

impl AdaptiveStreamingFilter for LmsFilter<'_> {
    fn process_sample(&mut self, input: f32, reference: f32) -> AdaptiveOutput {
        LmsFilter::process_sample(self, input, reference)
    }

    fn process_buffer(
        &mut self,
        inputs: &[f32],
        references: &[f32],
        outputs: &mut [f32],
        errors: &mut [f32],
    ) {
        LmsFilter::process_buffer(self, inputs, references, outputs, errors)
    }

    fn mu(&self) -> f32 {
        LmsFilter::mu(self)
    }

    fn set_mu(&mut self, mu: f32) {
        LmsFilter::set_mu(self, mu)
    }

    fn reset_coefficients(&mut self, coeffs: Option<&[f32]>) -> Result<()> {
        LmsFilter::reset_coefficients(self, coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lms_state_size() {
        let mut weights = vec![0.0f32; 16];
        let filter = LmsFilter::new(&mut weights, 16, 0.01, 4).unwrap();
        assert_eq!(filter.num_taps(), 16);
        assert_eq!(filter.state_len(), 16);
        assert_eq!(filter.block_size(), 4);
    }

    #[test]
    fn test_lms_rejects_short_weights() {
        let mut weights = vec![0.0f32; 3];
        assert!(matches!(
            LmsFilter::new(&mut weights, 4, 0.01, 1),
            Err(FilterError::CoefficientLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_lms_single_step_by_hand() {
        let mut weights = vec![0.5f32, 0.25];
        {
            let mut filter = LmsFilter::new(&mut weights, 2, 0.1, 1).unwrap();

            // x = [2], history zero: y = 0.5*2 = 1, e = 3 - 1 = 2
            let r = filter.process_sample(2.0, 3.0);
            assert_abs_diff_eq!(r.output, 1.0);
            assert_abs_diff_eq!(r.error, 2.0);
            // w0 += 0.1*2*2, w1 += 0.1*2*0
            assert_abs_diff_eq!(filter.coefficients()[0], 0.9, epsilon = 1e-6);
            assert_abs_diff_eq!(filter.coefficients()[1], 0.25, epsilon = 1e-6);

            // x = [1, 2]: y = 0.9*1 + 0.25*2 = 1.4, e = -1.4
            let r = filter.process_sample(1.0, 0.0);
            assert_abs_diff_eq!(r.output, 1.4, epsilon = 1e-6);
            assert_abs_diff_eq!(r.error, -1.4, epsilon = 1e-6);
        }
        // w0 = 0.9 + 0.1*(-1.4)*1, w1 = 0.25 + 0.1*(-1.4)*2
        assert_abs_diff_eq!(weights[0], 0.76, epsilon = 1e-6);
        assert_abs_diff_eq!(weights[1], -0.03, epsilon = 1e-6);
    }

    #[test]
    fn test_lms_zero_mu_is_fixed_fir() {
        let mut weights = vec![1.0f32, -1.0];
        let mut filter = LmsFilter::new(&mut weights, 2, 0.0, 1).unwrap();
        let outputs: Vec<f32> = [1.0, 2.0, 4.0]
            .iter()
            .map(|&x| filter.process_sample(x, 0.0).output)
            .collect();
        assert_eq!(outputs, vec![1.0, 1.0, 2.0]);
        assert_eq!(filter.coefficients(), &[1.0, -1.0]);
    }

    #[test]
    fn test_lms_adapts_within_a_block() {
        let inputs = [1.0f32; 4];
        let references = [1.0f32; 4];
        let mut weights = vec![0.0f32];
        let mut filter = LmsFilter::new(&mut weights, 1, 0.5, 4).unwrap();
        let mut outputs = [0.0; 4];
        let mut errors = [0.0; 4];
        filter.process_buffer(&inputs, &references, &mut outputs, &mut errors);

        // w: 0 -> 0.5 -> 0.75 -> 0.875
        assert_eq!(outputs, [0.0, 0.5, 0.75, 0.875]);
        assert_eq!(errors, [1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_lms_set_mu_keeps_state() {
        let mut weights = vec![0.0f32; 2];
        let mut filter = LmsFilter::new(&mut weights, 2, 0.1, 1).unwrap();
        filter.process_sample(1.0, 1.0);
        let before = filter.coefficients().to_vec();
        filter.set_mu(0.0);
        assert_eq!(filter.mu(), 0.0);
        assert_eq!(filter.coefficients(), before.as_slice());
        filter.process_sample(1.0, 5.0);
        assert_eq!(filter.coefficients(), before.as_slice());
    }

    #[test]
    fn test_lms_reset_with_coefficients() {
        let mut weights = vec![0.0f32; 3];
        let mut filter = LmsFilter::new(&mut weights, 3, 0.05, 1).unwrap();
        for i in 0..20 {
            filter.process_sample(i as f32, 1.0);
        }
        filter.reset_coefficients(Some(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(filter.coefficients(), &[1.0, 2.0, 3.0]);
        assert_eq!(filter.mu(), 0.05);

        // History is cleared: only w0 sees the new sample
        let r = filter.process_sample(1.0, 1.0);
        assert_abs_diff_eq!(r.output, 1.0);
    }

    #[test]
    fn test_lms_reset_rejects_short_coefficients() {
        let mut weights = vec![0.5f32; 3];
        let mut filter = LmsFilter::new(&mut weights, 3, 0.05, 1).unwrap();
        assert!(filter.reset_coefficients(Some(&[1.0])).is_err());
        assert_eq!(filter.coefficients(), &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_lms_try_process_buffer_length_mismatch() {
        let mut weights = vec![0.0f32; 2];
        let mut filter = LmsFilter::new(&mut weights, 2, 0.01, 1).unwrap();
        let mut outputs = [0.0; 3];
        let mut errors = [0.0; 2];
        let result =
            filter.try_process_buffer(&[0.0; 3], &[0.0; 3], &mut outputs, &mut errors);
        assert!(matches!(
            result,
            Err(FilterError::BufferLength {
                expected: 3,
                actual: 2
            })
        ));
    }
}
