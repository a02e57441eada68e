//! Frequency response of supplied coefficient sets.
//!
//! Evaluates `H(e^{jω})` for FIR taps or a biquad cascade so callers can
//! check externally designed coefficients (e.g. notch depth at 50/60 Hz)
//! before streaming samples through them. Nothing here designs filters.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::config::EngineConfig;
use crate::constants::{BIQUAD_COEFFS_PER_STAGE, MIN_MAGNITUDE};
use crate::error::{FilterError, Result};

/// Complex gain at one frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyResponse {
    pub frequency_hz: f32,
    /// Linear magnitude `|H|`
    pub magnitude: f32,
    /// Phase in radians, `(-π, π]`
    pub phase: f32,
}

impl FrequencyResponse {
    fn from_complex(frequency_hz: f32, h: Complex64) -> Self {
        Self {
            frequency_hz,
            magnitude: h.norm() as f32,
            phase: h.arg() as f32,
        }
    }

    /// Magnitude in dB, floored to avoid `-inf` at exact zeros
    pub fn magnitude_db(&self) -> f32 {
        (20.0 * (self.magnitude as f64).max(MIN_MAGNITUDE).log10()) as f32
    }
}

/// `z^-1` on the unit circle for `frequency_hz`
fn unit_delay(frequency_hz: f32, sample_rate: f32) -> Complex64 {
    let omega = 2.0 * PI * frequency_hz as f64 / sample_rate as f64;
    Complex64::from_polar(1.0, -omega)
}

/// Response of FIR taps `b[k]` at `frequency_hz`
pub fn fir_response(taps: &[f32], frequency_hz: f32, sample_rate: f32) -> FrequencyResponse {
    let z_inv = unit_delay(frequency_hz, sample_rate);
    let mut delay = Complex64::new(1.0, 0.0);
    let mut h = Complex64::new(0.0, 0.0);
    for &b in taps {
        h += delay * b as f64;
        delay *= z_inv;
    }
    FrequencyResponse::from_complex(frequency_hz, h)
}

/// Response of a `{b0, b1, b2, a1, a2}` biquad cascade at `frequency_hz`
///
/// # Errors
/// Returns `FilterError::CoefficientLength` if `coeffs` is empty or not a
/// whole number of stages.
pub fn biquad_cascade_response(
    coeffs: &[f32],
    frequency_hz: f32,
    sample_rate: f32,
) -> Result<FrequencyResponse> {
    if coeffs.is_empty() || coeffs.len() % BIQUAD_COEFFS_PER_STAGE != 0 {
        let stages = (coeffs.len() / BIQUAD_COEFFS_PER_STAGE).max(1);
        return Err(FilterError::CoefficientLength {
            expected: stages * BIQUAD_COEFFS_PER_STAGE,
            actual: coeffs.len(),
        });
    }

    let z1 = unit_delay(frequency_hz, sample_rate);
    let z2 = z1 * z1;
    let one = Complex64::new(1.0, 0.0);

    let h = coeffs
        .chunks_exact(BIQUAD_COEFFS_PER_STAGE)
        .fold(one, |acc, c| {
            let num = z1 * c[1] as f64 + z2 * c[2] as f64 + c[0] as f64;
            let den = one + z1 * c[3] as f64 + z2 * c[4] as f64;
            acc * num / den
        });

    Ok(FrequencyResponse::from_complex(frequency_hz, h))
}

/// Response of the engine described by `engine`
///
/// LMS engines are evaluated at their initial taps.
pub fn engine_response(
    engine: &EngineConfig,
    frequency_hz: f32,
    sample_rate: f32,
) -> Result<FrequencyResponse> {
    match engine {
        EngineConfig::Fir(c) => Ok(fir_response(&c.coefficients, frequency_hz, sample_rate)),
        EngineConfig::Iir(c) => biquad_cascade_response(&c.coefficients, frequency_hz, sample_rate),
        EngineConfig::Lms(_) => Ok(fir_response(
            &engine.coefficient_buffer(),
            frequency_hz,
            sample_rate,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BASELINE_HIGHPASS_1K, ECG_LOWPASS_51, NOTCH_60HZ_1K};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fir_dc_gain_is_tap_sum() {
        let taps = [0.25f32, 0.5, 0.25];
        let r = fir_response(&taps, 0.0, 1000.0);
        assert_abs_diff_eq!(r.magnitude, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(r.phase, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fir_nyquist_null() {
        // [0.5, 0.5] has a zero at fs/2
        let r = fir_response(&[0.5, 0.5], 500.0, 1000.0);
        assert!(r.magnitude < 1e-6);
        assert!(r.magnitude_db() < -100.0);
    }

    #[test]
    fn test_ecg_lowpass_response() {
        let pass = fir_response(&ECG_LOWPASS_51, 10.0, 1000.0);
        let stop = fir_response(&ECG_LOWPASS_51, 150.0, 1000.0);
        assert!(pass.magnitude_db().abs() < 0.5);
        assert!(stop.magnitude_db() < -40.0);
    }

    #[test]
    fn test_baseline_highpass_cutoff() {
        let r = biquad_cascade_response(&BASELINE_HIGHPASS_1K, 0.5, 1000.0).unwrap();
        assert_abs_diff_eq!(r.magnitude_db(), -3.0, epsilon = 0.1);
        let r = biquad_cascade_response(&BASELINE_HIGHPASS_1K, 10.0, 1000.0).unwrap();
        assert_abs_diff_eq!(r.magnitude, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_notch_depth() {
        let r = biquad_cascade_response(&NOTCH_60HZ_1K, 60.0, 1000.0).unwrap();
        assert!(r.magnitude_db() < -60.0, "notch depth {}", r.magnitude_db());
        let r = biquad_cascade_response(&NOTCH_60HZ_1K, 10.0, 1000.0).unwrap();
        assert_abs_diff_eq!(r.magnitude, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_cascade_multiplies_stages() {
        let mut two = NOTCH_60HZ_1K.to_vec();
        two.extend_from_slice(&BASELINE_HIGHPASS_1K);
        let a = biquad_cascade_response(&NOTCH_60HZ_1K, 30.0, 1000.0).unwrap();
        let b = biquad_cascade_response(&BASELINE_HIGHPASS_1K, 30.0, 1000.0).unwrap();
        let ab = biquad_cascade_response(&two, 30.0, 1000.0).unwrap();
        assert_abs_diff_eq!(ab.magnitude, a.magnitude * b.magnitude, epsilon = 1e-5);
    }

    #[test]
    fn test_biquad_response_rejects_partial_stage() {
        assert!(biquad_cascade_response(&[1.0, 0.0, 0.0], 10.0, 1000.0).is_err());
        assert!(biquad_cascade_response(&[], 10.0, 1000.0).is_err());
    }

    #[test]
    fn test_engine_response_dispatch() {
        use crate::config::{FirConfig, IirConfig, LmsConfig};

        let fir = EngineConfig::Fir(FirConfig::default());
        let r = engine_response(&fir, 10.0, 1000.0).unwrap();
        assert_abs_diff_eq!(r.magnitude, 1.0, epsilon = 0.05);

        let iir = EngineConfig::Iir(IirConfig::default());
        let r = engine_response(&iir, 0.5, 1000.0).unwrap();
        assert_abs_diff_eq!(r.magnitude_db(), -3.0, epsilon = 0.1);

        // Zero initial taps
        let lms = EngineConfig::Lms(LmsConfig::default());
        let r = engine_response(&lms, 60.0, 1000.0).unwrap();
        assert_eq!(r.magnitude, 0.0);
    }
}
