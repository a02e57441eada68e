use serde::Serialize;

use crate::audio::SampleBlock;
use crate::config::{EngineConfig, ProcessingMode};
use crate::error::{FilterError, Result};
use crate::signal_processing::{BiquadCascade, FirFilter, LmsFilter, MovingAverage};

/// One processed sample as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleRow {
    pub index: u64,
    pub input: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f32>,
    pub output: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<f32>,
}

enum Engine<'a> {
    Fir(FirFilter<'a>),
    Iir(BiquadCascade<'a>),
    Lms(LmsFilter<'a>),
}

/// Watches the LMS error magnitude and warns when it exceeds a threshold
struct DivergenceMonitor {
    average: MovingAverage,
    threshold: Option<f32>,
    diverging: bool,
}

impl DivergenceMonitor {
    fn observe(&mut self, error: f32, index: u64) {
        let level = self.average.add_magnitude(error);
        let Some(threshold) = self.threshold else {
            return;
        };
        // A blown-up filter drives the average to inf or NaN
        let over = !level.is_finite() || (self.average.is_full() && level > threshold);
        if over && !self.diverging {
            log::warn!(
                "LMS error average {:.4} exceeds {:.4} at sample {}; consider lowering mu",
                level,
                threshold,
                index
            );
        } else if !over && self.diverging {
            log::info!("LMS error average back to {:.4} at sample {}", level, index);
        }
        self.diverging = over;
    }
}

/// Drives one engine over incoming blocks
///
/// Owns the engine and borrows its coefficient storage from the caller.
/// In `Sample` mode every sample is a separate engine call; in `Block`
/// mode the whole block goes through `process_buffer`. Both produce the
/// same rows.
pub struct FilterRunner<'a> {
    engine: Engine<'a>,
    mode: ProcessingMode,
    monitor: Option<DivergenceMonitor>,
    next_index: u64,
    output: Vec<f32>,
    error: Vec<f32>,
}

impl<'a> FilterRunner<'a> {
    /// Build the engine described by `config` over `coeffs`
    ///
    /// `coeffs` normally comes from `EngineConfig::coefficient_buffer`.
    pub fn new(
        config: &EngineConfig,
        coeffs: &'a mut [f32],
        mode: ProcessingMode,
    ) -> Result<Self> {
        let block_size = config.block_size();
        let (engine, monitor) = match config {
            EngineConfig::Fir(c) => {
                let num_taps = c.coefficients.len();
                (Engine::Fir(FirFilter::new(coeffs, num_taps, block_size)?), None)
            }
            EngineConfig::Iir(c) => (
                Engine::Iir(BiquadCascade::new(coeffs, c.num_stages, block_size)?),
                None,
            ),
            EngineConfig::Lms(c) => {
                if c.error_window == 0 {
                    return Err(FilterError::Config(
                        "error_window must be at least 1".to_string(),
                    ));
                }
                let monitor = DivergenceMonitor {
                    average: MovingAverage::new(c.error_window),
                    threshold: c.divergence_threshold,
                    diverging: false,
                };
                (
                    Engine::Lms(LmsFilter::new(coeffs, c.num_taps, c.mu, block_size)?),
                    Some(monitor),
                )
            }
        };

        Ok(Self {
            engine,
            mode,
            monitor,
            next_index: 0,
            output: Vec::with_capacity(block_size),
            error: Vec::with_capacity(block_size),
        })
    }

    /// Filter one block and return a row per sample
    ///
    /// # Errors
    /// Returns `FilterError::BufferLength` if `block.reference` and
    /// `block.input` differ in length. LMS engines also need a reference.
    pub fn process_block(&mut self, block: &SampleBlock) -> Result<Vec<SampleRow>> {
        let n = block.len();
        if let Some(reference) = &block.reference
            && reference.len() != n
        {
            return Err(FilterError::BufferLength {
                expected: n,
                actual: reference.len(),
            });
        }
        self.output.clear();
        self.output.resize(n, 0.0);
        self.error.clear();

        match &mut self.engine {
            Engine::Fir(f) => match self.mode {
                ProcessingMode::Sample => {
                    for (y, &x) in self.output.iter_mut().zip(&block.input) {
                        *y = f.process_sample(x);
                    }
                }
                ProcessingMode::Block => f.process_buffer(&block.input, &mut self.output),
            },
            Engine::Iir(f) => match self.mode {
                ProcessingMode::Sample => {
                    for (y, &x) in self.output.iter_mut().zip(&block.input) {
                        *y = f.process_sample(x);
                    }
                }
                ProcessingMode::Block => f.process_buffer(&block.input, &mut self.output),
            },
            Engine::Lms(f) => {
                let reference = block.reference.as_deref().ok_or_else(|| {
                    FilterError::Config("LMS engine requires a reference signal".to_string())
                })?;
                self.error.resize(n, 0.0);
                match self.mode {
                    ProcessingMode::Sample => {
                        for i in 0..n {
                            let r = f.process_sample(block.input[i], reference[i]);
                            self.output[i] = r.output;
                            self.error[i] = r.error;
                        }
                    }
                    ProcessingMode::Block => f.try_process_buffer(
                        &block.input,
                        reference,
                        &mut self.output,
                        &mut self.error,
                    )?,
                }
            }
        }

        let rows: Vec<SampleRow> = (0..n)
            .map(|i| SampleRow {
                index: self.next_index + i as u64,
                input: block.input[i],
                reference: block.reference.as_ref().map(|r| r[i]),
                output: self.output[i],
                error: self.error.get(i).copied(),
            })
            .collect();

        if let Some(monitor) = self.monitor.as_mut() {
            for row in &rows {
                if let Some(e) = row.error {
                    monitor.observe(e, row.index);
                }
            }
        }

        self.next_index += n as u64;
        Ok(rows)
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self.engine, Engine::Lms(_))
    }

    /// Samples processed so far
    pub fn samples_processed(&self) -> u64 {
        self.next_index
    }

    /// Current coefficients (adapted taps for LMS)
    pub fn coefficients(&self) -> &[f32] {
        match &self.engine {
            Engine::Fir(f) => f.taps(),
            Engine::Iir(f) => f.coefficients(),
            Engine::Lms(f) => f.coefficients(),
        }
    }

    /// Whether the LMS error average is currently above the divergence threshold
    pub fn is_diverging(&self) -> bool {
        self.monitor.as_ref().is_some_and(|m| m.diverging)
    }
}
