//! Configuration for the biofilter host loop.
//!
//! Engines are described in TOML and loaded with [`HostConfig::load`]:
//!
//! ```toml
//! sample_rate = 1000.0
//! mode = "sample"
//! input_channel = 0
//! reference_channel = 1
//!
//! [engine]
//! kind = "lms"
//! num_taps = 32
//! mu = 0.02
//! block_size = 1
//! ```
//!
//! Coefficients are always supplied ready-made; nothing here designs filters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{BIQUAD_COEFFS_PER_STAGE, DEFAULT_ERROR_WINDOW};
use crate::error::{FilterError, Result};

/// 51-tap linear-phase ECG lowpass, -6 dB at 50 Hz for fs = 1 kHz
pub const ECG_LOWPASS_51: [f32; 51] = [
    1.01602337e-03,
    1.05219578e-03,
    1.05485683e-03,
    9.52665359e-04,
    6.39612342e-04,
    -6.52666866e-19,
    -1.05692964e-03,
    -2.55869546e-03,
    -4.43506165e-03,
    -6.49496992e-03,
    -8.42139827e-03,
    -9.78815640e-03,
    -1.00992192e-02,
    -8.84737843e-03,
    -5.58538708e-03,
    2.65242472e-18,
    8.02209630e-03,
    1.83472206e-02,
    3.05752787e-02,
    4.40532964e-02,
    5.79227190e-02,
    7.11964426e-02,
    8.28570731e-02,
    9.19645190e-02,
    9.77592660e-02,
    9.97478615e-02,
    9.77592660e-02,
    9.19645190e-02,
    8.28570731e-02,
    7.11964426e-02,
    5.79227190e-02,
    4.40532964e-02,
    3.05752787e-02,
    1.83472206e-02,
    8.02209630e-03,
    2.65242472e-18,
    -5.58538708e-03,
    -8.84737843e-03,
    -1.00992192e-02,
    -9.78815640e-03,
    -8.42139827e-03,
    -6.49496992e-03,
    -4.43506165e-03,
    -2.55869546e-03,
    -1.05692964e-03,
    -6.52666866e-19,
    6.39612342e-04,
    9.52665359e-04,
    1.05485683e-03,
    1.05219578e-03,
    1.01602337e-03,
];

/// 2nd-order Butterworth highpass at 0.5 Hz for fs = 1 kHz (baseline wander)
pub const BASELINE_HIGHPASS_1K: [f32; 5] = [
    0.99778102,
    -1.99556205,
    0.99778102, // b0, b1, b2
    -1.99555712,
    0.99556697, // a1, a2
];

/// 60 Hz notch, Q = 30, fs = 1 kHz (powerline interference)
pub const NOTCH_60HZ_1K: [f32; 5] = [
    0.99390200,
    -1.84821343,
    0.99390200, // b0, b1, b2
    -1.84821343,
    0.98780401, // a1, a2
];

/// Whether the host feeds engines one sample or one block per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// One call per sample, as from a sampling interrupt
    Sample,
    /// One call per block
    #[default]
    Block,
}

/// Fixed FIR engine description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirConfig {
    /// Taps `b[0..num_taps]` in impulse-response order
    pub coefficients: Vec<f32>,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

/// Biquad cascade description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IirConfig {
    /// `{b0, b1, b2, a1, a2}` per stage, `a0` normalised to 1
    pub coefficients: Vec<f32>,
    pub num_stages: usize,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

/// LMS adaptive engine description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmsConfig {
    pub num_taps: usize,
    pub mu: f32,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Starting taps; zeros when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_coefficients: Option<Vec<f32>>,
    /// Error moving-average magnitude above which the host warns of divergence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergence_threshold: Option<f32>,
    /// Window for the error moving average
    #[serde(default = "default_error_window")]
    pub error_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EngineConfig {
    Fir(FirConfig),
    Iir(IirConfig),
    Lms(LmsConfig),
}

/// Host loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Sample rate of the incoming stream in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,
    #[serde(default)]
    pub mode: ProcessingMode,
    /// WAV channel carrying the signal to filter
    #[serde(default)]
    pub input_channel: usize,
    /// WAV channel carrying the LMS reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_channel: Option<usize>,
    pub engine: EngineConfig,
}

fn default_block_size() -> usize {
    1
}

fn default_error_window() -> usize {
    DEFAULT_ERROR_WINDOW
}

fn default_sample_rate() -> f32 {
    1000.0
}

impl Default for FirConfig {
    fn default() -> Self {
        Self {
            coefficients: ECG_LOWPASS_51.to_vec(),
            block_size: 32,
        }
    }
}

impl Default for IirConfig {
    fn default() -> Self {
        Self {
            coefficients: BASELINE_HIGHPASS_1K.to_vec(),
            num_stages: 1,
            block_size: 1,
        }
    }
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            num_taps: 32,
            mu: 0.02,
            block_size: 1,
            initial_coefficients: None,
            divergence_threshold: Some(10.0),
            error_window: DEFAULT_ERROR_WINDOW,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::for_engine(EngineConfig::Fir(FirConfig::default()))
    }
}

impl EngineConfig {
    /// Short name matching the TOML `kind` tag
    pub fn kind(&self) -> &'static str {
        match self {
            EngineConfig::Fir(_) => "fir",
            EngineConfig::Iir(_) => "iir",
            EngineConfig::Lms(_) => "lms",
        }
    }

    pub fn block_size(&self) -> usize {
        match self {
            EngineConfig::Fir(c) => c.block_size,
            EngineConfig::Iir(c) => c.block_size,
            EngineConfig::Lms(c) => c.block_size,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, EngineConfig::Lms(_))
    }

    /// Fresh coefficient storage for building an engine
    ///
    /// The caller owns the returned buffer and lends it to the engine; for
    /// LMS it holds the adapted taps once the engine is dropped.
    pub fn coefficient_buffer(&self) -> Vec<f32> {
        match self {
            EngineConfig::Fir(c) => c.coefficients.clone(),
            EngineConfig::Iir(c) => c.coefficients.clone(),
            EngineConfig::Lms(c) => match &c.initial_coefficients {
                Some(initial) => initial.clone(),
                None => vec![0.0; c.num_taps],
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.block_size() == 0 {
            return Err(FilterError::ZeroBlockSize);
        }
        match self {
            EngineConfig::Fir(c) => {
                if c.coefficients.is_empty() {
                    return Err(FilterError::ZeroTaps);
                }
            }
            EngineConfig::Iir(c) => {
                if c.num_stages == 0 {
                    return Err(FilterError::ZeroStages);
                }
                let expected = c.num_stages * BIQUAD_COEFFS_PER_STAGE;
                if c.coefficients.len() != expected {
                    return Err(FilterError::CoefficientLength {
                        expected,
                        actual: c.coefficients.len(),
                    });
                }
            }
            EngineConfig::Lms(c) => {
                if c.num_taps == 0 {
                    return Err(FilterError::ZeroTaps);
                }
                if !c.mu.is_finite() {
                    return Err(FilterError::Config(format!("invalid mu: {}", c.mu)));
                }
                if let Some(initial) = &c.initial_coefficients
                    && initial.len() < c.num_taps
                {
                    return Err(FilterError::CoefficientLength {
                        expected: c.num_taps,
                        actual: initial.len(),
                    });
                }
                if c.error_window == 0 {
                    return Err(FilterError::Config(
                        "error_window must be at least 1".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl HostConfig {
    /// Default host settings around the given engine
    ///
    /// LMS engines read their reference from channel 1.
    pub fn for_engine(engine: EngineConfig) -> Self {
        let reference_channel = engine.is_adaptive().then_some(1);
        let mode = match &engine {
            EngineConfig::Fir(_) => ProcessingMode::Block,
            _ => ProcessingMode::Sample,
        };
        Self {
            sample_rate: default_sample_rate(),
            mode,
            input_channel: 0,
            reference_channel,
            engine,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HostConfig =
            toml::from_str(content).map_err(|e| FilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Check settings that the engine constructors cannot see
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(FilterError::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.engine.is_adaptive() && self.reference_channel.is_none() {
            return Err(FilterError::Config(
                "LMS engine requires a reference_channel".to_string(),
            ));
        }
        if self.reference_channel == Some(self.input_channel) {
            return Err(FilterError::Config(
                "input and reference channels must differ".to_string(),
            ));
        }
        self.engine.validate()
    }
}
