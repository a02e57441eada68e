use anyhow::Context;
use clap::{Parser, Subcommand};
use rolling_stats::Stats;
use std::path::PathBuf;

use biofilter::audio::{SampleSource, WavFileSource, read_wav_channel, run_stream};
use biofilter::config::{
    EngineConfig, FirConfig, HostConfig, IirConfig, LmsConfig, ProcessingMode,
};
use biofilter::output::{OutputFormat, create_formatter};
use biofilter::signal_processing::engine_response;
use biofilter::{FilterRunner, save_wav};

/// Blocks buffered between the reader thread and the filter loop
const STREAM_QUEUE_BLOCKS: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "biofilter")]
#[command(about = "Stream biosignals through FIR, IIR biquad and LMS filters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter a WAV file with the engine described in a TOML config
    Run(RunArgs),
    /// Print the magnitude and phase response of the configured engine
    Response(ResponseArgs),
    /// Print default TOML configurations
    Defaults {
        /// Engine to print; all three when omitted
        #[arg(value_enum)]
        kind: Option<EngineKind>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Host TOML configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Input WAV file
    #[arg(short, long)]
    input: PathBuf,

    /// Separate WAV file carrying the LMS reference
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Channel of the reference file to read
    #[arg(long, default_value_t = 0)]
    reference_file_channel: usize,

    /// Input channel (overrides the config)
    #[arg(long)]
    channel: Option<usize>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Processing mode (overrides the config)
    #[arg(short, long, value_enum)]
    mode: Option<ProcessingMode>,

    /// Write filtered output (and LMS error) to this WAV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every Nth sample; 0 prints nothing
    #[arg(long, default_value_t = 1)]
    every: u64,
}

#[derive(clap::Args, Debug)]
struct ResponseArgs {
    /// Host TOML configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Sample rate in Hz (defaults to the config's)
    #[arg(short, long)]
    sample_rate: Option<f32>,

    /// Frequencies in Hz, comma separated
    #[arg(long, value_delimiter = ',', default_value = "0.5,10,50,60,100")]
    freqs: Vec<f32>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum EngineKind {
    Fir,
    Iir,
    Lms,
}

impl EngineKind {
    fn default_config(self) -> HostConfig {
        let engine = match self {
            EngineKind::Fir => EngineConfig::Fir(FirConfig::default()),
            EngineKind::Iir => EngineConfig::Iir(IirConfig::default()),
            EngineKind::Lms => EngineConfig::Lms(LmsConfig::default()),
        };
        HostConfig::for_engine(engine)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Response(args) => response(args),
        Command::Defaults { kind } => defaults(kind),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = HostConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(channel) = args.channel {
        config.input_channel = channel;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let adaptive = config.engine.is_adaptive();
    let block_size = config.engine.block_size();
    let wav_reference = if adaptive && args.reference.is_none() {
        config.reference_channel
    } else {
        None
    };

    let mut source =
        WavFileSource::new(&args.input, block_size, config.input_channel, wav_reference)
            .with_context(|| format!("Failed to open {}", args.input.display()))?;
    if adaptive && let Some(path) = &args.reference {
        let (reference, _) = read_wav_channel(path, args.reference_file_channel)
            .with_context(|| format!("Failed to read reference {}", path.display()))?;
        source = source.with_reference(reference)?;
    }

    let sample_rate = source.sample_rate();
    if (sample_rate as f32 - config.sample_rate).abs() > f32::EPSILON {
        log::warn!(
            "WAV sample rate {} Hz differs from configured {} Hz",
            sample_rate,
            config.sample_rate
        );
    }

    log::info!(
        "Engine: {} (block size {}, {:?} mode)",
        config.engine.kind(),
        block_size,
        config.mode
    );

    let formatter = create_formatter(args.format, adaptive);
    if args.every > 0
        && let Some(header) = formatter.header()
    {
        println!("{}", header);
    }

    let mut coeffs = config.engine.coefficient_buffer();
    let mut runner = FilterRunner::new(&config.engine, &mut coeffs, config.mode)?;

    let mut outputs = Vec::new();
    let mut errors = Vec::new();
    let mut output_stats: Stats<f32> = Stats::new();
    let mut error_stats: Stats<f32> = Stats::new();

    let consumed = run_stream(source, STREAM_QUEUE_BLOCKS, |block| {
        let rows = runner.process_block(block)?;
        for row in &rows {
            output_stats.update(row.output);
            if let Some(e) = row.error {
                error_stats.update(e.abs());
            }
            if args.every > 0 && row.index % args.every == 0 {
                println!("{}", formatter.format(row));
            }
        }
        if args.output.is_some() {
            outputs.extend(rows.iter().map(|r| r.output));
            errors.extend(rows.iter().filter_map(|r| r.error));
        }
        Ok(())
    })?;

    let diverging = runner.is_diverging();
    drop(runner);

    log::info!(
        "Processed {} samples: output mean {:.5}, std {:.5}, range [{:.5}, {:.5}]",
        consumed,
        output_stats.mean,
        output_stats.std_dev,
        output_stats.min,
        output_stats.max
    );
    if adaptive {
        log::info!(
            "LMS |error| mean {:.5}, max {:.5}{}",
            error_stats.mean,
            error_stats.max,
            if diverging { " (diverging)" } else { "" }
        );
        log::info!("Adapted coefficients: {:?}", coeffs);
    }

    if let Some(path) = &args.output {
        let channels: Vec<&[f32]> = if adaptive {
            vec![outputs.as_slice(), errors.as_slice()]
        } else {
            vec![outputs.as_slice()]
        };
        save_wav(path, &channels, sample_rate)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn response(args: ResponseArgs) -> anyhow::Result<()> {
    let config = HostConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let sample_rate = args.sample_rate.unwrap_or(config.sample_rate);

    println!("{:>10} {:>12} {:>10} {:>10}", "freq_hz", "magnitude", "dB", "phase");
    for &freq in &args.freqs {
        let r = engine_response(&config.engine, freq, sample_rate)?;
        println!(
            "{:>10.3} {:>12.6} {:>10.2} {:>10.4}",
            r.frequency_hz,
            r.magnitude,
            r.magnitude_db(),
            r.phase
        );
    }
    Ok(())
}

fn defaults(kind: Option<EngineKind>) -> anyhow::Result<()> {
    let kinds = match kind {
        Some(k) => vec![k],
        None => vec![EngineKind::Fir, EngineKind::Iir, EngineKind::Lms],
    };
    for (i, kind) in kinds.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        let config = kind.default_config();
        println!("# {} engine", config.engine.kind());
        print!("{}", config.to_toml_string()?);
    }
    Ok(())
}
