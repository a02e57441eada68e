use std::f32::consts::PI;

use rand_chacha::ChaCha8Rng;

use super::noise::uniform_noise;

/// Mains frequency used by the powerline scenario
pub const POWERLINE_HZ: f32 = 60.0;

/// (centre as a fraction of the beat, width as a fraction of the beat, amplitude)
const ECG_WAVES: [(f32, f32, f32); 5] = [
    (0.20, 0.025, 0.12),  // P
    (0.33, 0.008, -0.10), // Q
    (0.35, 0.010, 1.00),  // R
    (0.37, 0.008, -0.18), // S
    (0.60, 0.040, 0.30),  // T
];

/// Synthetic ECG built from Gaussian P, QRS and T bumps, peak-normalised to 1.0
pub fn synthetic_ecg(num_samples: usize, sample_rate: f32, heart_rate_bpm: f32) -> Vec<f32> {
    let beat_secs = 60.0 / heart_rate_bpm.max(1.0);

    let mut samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let phase = (t / beat_secs).fract();
            ECG_WAVES
                .iter()
                .map(|&(centre, width, amplitude)| {
                    let d = (phase - centre) / width;
                    amplitude * (-0.5 * d * d).exp()
                })
                .sum()
        })
        .collect();

    let peak = samples.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
    if peak > 0.0 {
        samples.iter_mut().for_each(|x| *x /= peak);
    }
    samples
}

/// Signal for baseline-wander removal tests
///
/// A 10 Hz tone of amplitude 100 riding on a 0.2 Hz drift of amplitude 80,
/// plus uniform noise of amplitude 5.
pub fn baseline_drift_signal(
    num_samples: usize,
    sample_rate: f32,
    rng: &mut ChaCha8Rng,
) -> Vec<f32> {
    let noise = uniform_noise(num_samples, 5.0, rng);
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let signal = 100.0 * (2.0 * PI * 10.0 * t).sin();
            let drift = 80.0 * (2.0 * PI * 0.2 * t).sin();
            signal + drift + noise[i]
        })
        .collect()
}

/// ECG contaminated by mains hum of slowly varying amplitude
#[derive(Debug, Clone)]
pub struct PowerlineScenario {
    pub clean: Vec<f32>,
    pub interference: Vec<f32>,
    pub contaminated: Vec<f32>,
    /// Unit-amplitude hum in phase with the interference
    pub noise_reference: Vec<f32>,
}

/// Build the powerline cancellation scenario
///
/// The interference amplitude follows `0.3 + 0.2·sin(2π·0.1·t)`. For noise
/// cancellation, feed `noise_reference` as the LMS input and `contaminated`
/// as its reference; the error then tracks `clean`.
pub fn powerline_scenario(
    num_samples: usize,
    sample_rate: f32,
    heart_rate_bpm: f32,
) -> PowerlineScenario {
    let clean = synthetic_ecg(num_samples, sample_rate, heart_rate_bpm);

    let (interference, noise_reference): (Vec<f32>, Vec<f32>) = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let hum = (2.0 * PI * POWERLINE_HZ * t).sin();
            let amplitude = 0.3 + 0.2 * (2.0 * PI * 0.1 * t).sin();
            (amplitude * hum, hum)
        })
        .unzip();

    let contaminated = clean
        .iter()
        .zip(&interference)
        .map(|(c, n)| c + n)
        .collect();

    PowerlineScenario {
        clean,
        interference,
        contaminated,
        noise_reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::create_rng;

    #[test]
    fn test_synthetic_ecg_normalised_and_periodic() {
        let ecg = synthetic_ecg(3000, 1000.0, 60.0);
        let peak = ecg.iter().fold(0.0f32, |m, &x| m.max(x));
        assert!((peak - 1.0).abs() < 1e-6);

        // One R peak per second at 60 bpm
        let r_peaks = ecg
            .windows(3)
            .filter(|w| w[1] > 0.8 && w[1] >= w[0] && w[1] > w[2])
            .count();
        assert_eq!(r_peaks, 3);
    }

    #[test]
    fn test_baseline_drift_signal_range() {
        let signal = baseline_drift_signal(5000, 1000.0, &mut create_rng(Some(3)));
        assert_eq!(signal.len(), 5000);
        assert!(signal.iter().all(|x| x.abs() <= 185.0));
    }

    #[test]
    fn test_powerline_scenario_composition() {
        let s = powerline_scenario(2000, 1000.0, 72.0);
        for i in 0..2000 {
            assert!((s.contaminated[i] - s.clean[i] - s.interference[i]).abs() < 1e-6);
            assert!(s.noise_reference[i].abs() <= 1.0);
            assert!(s.interference[i].abs() <= 0.5 + 1e-6);
        }
    }
}
