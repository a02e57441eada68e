use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use biofilter::save_wav;
use biofilter::simulation::{
    add_noise_at_snr, baseline_drift_signal, create_rng, powerline_scenario, synthetic_ecg,
};

#[derive(Parser, Debug)]
#[command(name = "generate_biosignal")]
#[command(about = "Generate synthetic biosignal WAV files for filter testing")]
struct Args {
    /// Scenarios to generate
    #[arg(
        short = 'S',
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "ecg,drift,powerline"
    )]
    scenarios: Vec<Scenario>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 1000)]
    sample_rate: u32,

    /// Heart rate of the synthetic ECG in beats per minute
    #[arg(long, default_value_t = 72.0)]
    heart_rate: f32,

    /// Add white noise to the ECG at this SNR in dB
    #[arg(long)]
    snr: Option<f32>,

    /// Output filename prefix
    #[arg(long, default_value = "bio")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum Scenario {
    /// Mono ECG, optionally noisy
    Ecg,
    /// Mono 10 Hz tone on 0.2 Hz baseline drift
    Drift,
    /// ch0 = 60 Hz noise reference, ch1 = ECG + hum, ch2 = clean ECG
    Powerline,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Scenario::Ecg => "ecg",
            Scenario::Drift => "drift",
            Scenario::Powerline => "powerline",
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    scenario: Scenario,
    channels: Vec<&'static str>,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: u32,
    duration: f32,
    heart_rate: f32,
    seed: u64,
    files: Vec<ManifestEntry>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let seed = args.seed.unwrap_or(0);
    let fs_hz = args.sample_rate as f32;
    let num_samples = (args.duration * fs_hz) as usize;

    let mut entries = Vec::new();
    for (i, &scenario) in args.scenarios.iter().enumerate() {
        let mut rng = create_rng(Some(seed + i as u64));

        let (channels, names): (Vec<Vec<f32>>, Vec<&'static str>) = match scenario {
            Scenario::Ecg => {
                let mut ecg = synthetic_ecg(num_samples, fs_hz, args.heart_rate);
                if let Some(snr) = args.snr {
                    add_noise_at_snr(&mut ecg, snr, &mut rng);
                }
                (vec![ecg], vec!["ecg"])
            }
            Scenario::Drift => (
                vec![baseline_drift_signal(num_samples, fs_hz, &mut rng)],
                vec!["drift"],
            ),
            Scenario::Powerline => {
                let mut s = powerline_scenario(num_samples, fs_hz, args.heart_rate);
                if let Some(snr) = args.snr {
                    add_noise_at_snr(&mut s.contaminated, snr, &mut rng);
                }
                (
                    vec![s.noise_reference, s.contaminated, s.clean],
                    vec!["noise_reference", "contaminated", "clean"],
                )
            }
        };

        let filename = format!("{}_{}.wav", args.prefix, scenario.name());
        let filepath = args.output_dir.join(&filename);
        let slices: Vec<&[f32]> = channels.iter().map(Vec::as_slice).collect();
        save_wav(&filepath, &slices, args.sample_rate)
            .with_context(|| format!("Failed to write {}", filepath.display()))?;
        eprintln!("Wrote {} ({} channels)", filepath.display(), slices.len());

        entries.push(ManifestEntry {
            file: filename,
            scenario,
            channels: names,
        });
    }

    if args.manifest {
        let manifest = Manifest {
            sample_rate: args.sample_rate,
            duration: args.duration,
            heart_rate: args.heart_rate,
            seed,
            files: entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    Ok(())
}
