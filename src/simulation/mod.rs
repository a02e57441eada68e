mod noise;
mod signal;

pub use noise::{add_noise_at_snr, add_white_noise, create_rng, signal_power, uniform_noise};
pub use signal::{
    POWERLINE_HZ, PowerlineScenario, baseline_drift_signal, powerline_scenario, synthetic_ecg,
};
