use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Seeded generator for reproducible runs; OS entropy when `seed` is `None`
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean square of the signal
pub fn signal_power(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f32>() / signal.len() as f32
}

/// Add zero-mean Gaussian noise with standard deviation `std_dev`
pub fn add_white_noise(signal: &mut [f32], std_dev: f32, rng: &mut ChaCha8Rng) {
    if std_dev <= 0.0 {
        return;
    }
    let Ok(normal) = Normal::new(0.0, std_dev as f64) else {
        return;
    };
    for sample in signal.iter_mut() {
        *sample += normal.sample(rng) as f32;
    }
}

/// Add Gaussian noise at the given SNR relative to the signal's own power
pub fn add_noise_at_snr(signal: &mut [f32], snr_db: f32, rng: &mut ChaCha8Rng) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }
    let noise_power = sig_power / 10.0_f32.powf(snr_db / 10.0);
    add_white_noise(signal, noise_power.sqrt(), rng);
}

/// Uniform noise in `[-amplitude, amplitude)`
pub fn uniform_noise(num_samples: usize, amplitude: f32, rng: &mut ChaCha8Rng) -> Vec<f32> {
    (0..num_samples)
        .map(|_| (rng.random::<f32>() - 0.5) * 2.0 * amplitude)
        .collect()
}
