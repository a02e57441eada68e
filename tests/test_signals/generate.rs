use std::f32::consts::PI;

use biofilter::simulation::{create_rng, uniform_noise};

/// `amplitude·sin(2π·freq·t)` sampled at `sample_rate`
pub fn sine(freq_hz: f32, amplitude: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
        .collect()
}

/// Reproducible uniform noise in [-1, 1)
pub fn random_signal(num_samples: usize, seed: u64) -> Vec<f32> {
    uniform_noise(num_samples, 1.0, &mut create_rng(Some(seed)))
}

pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Output/input RMS ratio in dB
pub fn attenuation_db(input: &[f32], output: &[f32]) -> f32 {
    20.0 * (rms(output) / rms(input)).log10()
}
