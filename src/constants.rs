//! Layout and numeric constants shared by the filter engines.

/// Coefficients per biquad stage, ordered `{b0, b1, b2, a1, a2}` with `a0 = 1`.
pub const BIQUAD_COEFFS_PER_STAGE: usize = 5;

/// State words per biquad stage: `x[n-1], x[n-2], y[n-1], y[n-2]`.
pub const BIQUAD_STATE_PER_STAGE: usize = 4;

/// Floor applied to magnitudes before converting to decibels.
pub const MIN_MAGNITUDE: f64 = 1e-12;

/// Default moving-average window used to watch the LMS error signal.
pub const DEFAULT_ERROR_WINDOW: usize = 64;
