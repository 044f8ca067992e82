//! # XADC Test Driver
//!
//! Exercises the `para_xadc` library against the live sensor tree:
//!
//! 1. Lists every channel with its current corrected value
//! 2. Looks up a channel by name fragment
//! 3. Dumps a short burst of samples from one channel
//! 4. Measures read throughput and counts distinct values on another
//!
//! # Usage
//!
//! ```bash
//! # Defaults: lookup "BRAM", burst on channel 1, throughput on channel 3
//! xadctest
//!
//! # Fake tree for bench work
//! xadctest --sensor-root /tmp/iio --rate-reads 1000 -v
//! ```

use clap::Parser;
use para_common::config::ParaConfig;
use para_common::logging;
use para_xadc::{XadcError, channel_index};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

/// Exit status when the channel listing fails.
const EXIT_INFO_FAILED: u8 = 2;
/// Exit status when a value read fails during the listing.
const EXIT_READ_FAILED: u8 = 3;
/// Exit status for configuration problems.
const EXIT_CONFIG_FAILED: u8 = 1;

/// XADCTEST - Basic test of para_xadc
#[derive(Parser, Debug)]
#[command(name = "xadctest")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Basic test of the para_xadc telemetry library")]
#[command(long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply if omitted and
    /// /etc/para/para.toml does not exist).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the IIO device directory from the config.
    #[arg(long, value_name = "DIR")]
    sensor_root: Option<PathBuf>,

    /// Channel name fragment to look up.
    #[arg(long, default_value = "BRAM")]
    lookup: String,

    /// Channel id for the sample burst.
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    sample_channel: i64,

    /// Number of samples in the burst.
    #[arg(long, default_value_t = 100)]
    samples: usize,

    /// Channel id for the throughput loop.
    #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
    rate_channel: i64,

    /// Number of reads in the throughput loop.
    #[arg(long, default_value_t = 20000)]
    rate_reads: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

/// Failure of one driver step, mapped to an exit status.
#[derive(Debug)]
enum StepError {
    Config(String),
    Info(XadcError),
    Read(XadcError),
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("XADCTEST - Basic test of para_xadc\n");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(StepError::Config(msg)) => {
            error!("Configuration failed: {}", msg);
            eprintln!("ERROR: {msg}");
            ExitCode::from(EXIT_CONFIG_FAILED)
        }
        Err(StepError::Info(e)) => {
            println!("ERROR {} from info(): {}", e.kind().code(), e);
            ExitCode::from(EXIT_INFO_FAILED)
        }
        Err(StepError::Read(e)) => {
            println!("ERROR {} from read_channel(): {}", e.kind().code(), e);
            ExitCode::from(EXIT_READ_FAILED)
        }
    }
}

fn run(args: Args) -> Result<(), StepError> {
    let mut config = ParaConfig::resolve(args.config.as_deref())
        .map_err(|e| StepError::Config(e.to_string()))?;
    if let Some(root) = args.sensor_root.clone() {
        config.xadc.sensor_root = root;
    }

    logging::init(config.shared.log_level, args.verbose, args.json);
    info!(
        "{} v{} using {}",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.xadc.sensor_root.display()
    );

    para_xadc::configure(&config.xadc).map_err(|e| StepError::Config(e.to_string()))?;

    list_channels()?;
    lookup(&args.lookup);
    sample_burst(args.sample_channel, args.samples);
    throughput(args.rate_channel, args.rate_reads);
    Ok(())
}

/// Step 1: every channel with its current value.
fn list_channels() -> Result<(), StepError> {
    println!("Getting Info...");
    let (count, names) = para_xadc::info().map_err(StepError::Info)?;
    println!("Found {count} channels:");

    for (index, name) in names.iter().enumerate() {
        let value = para_xadc::read_channel(index).map_err(StepError::Read)?;
        let unit = para_xadc::ChannelKind::from_name(name).unit();
        println!("  {index:2}: {name} = {value:.3} {unit}");
    }
    Ok(())
}

/// Step 2: name lookup.
fn lookup(pattern: &str) {
    match para_xadc::find_channel(pattern) {
        Ok(id) => println!("\nLook-up '{pattern}': ID={id}"),
        Err(e) => println!("\nError {} looking up '{pattern}'!\n", e.kind().code()),
    }
}

/// Step 3: short burst of samples from one channel.
fn sample_burst(id: i64, samples: usize) {
    println!("\nReading channel {id} {samples} times...");

    let mut values = Vec::with_capacity(samples);
    for _ in 0..samples {
        match channel_index(id).and_then(para_xadc::read_channel) {
            Ok(value) => values.push(value),
            Err(e) => {
                println!("ERROR {} from read_channel(): {}", e.kind().code(), e);
                break;
            }
        }
    }

    let line: String = values.iter().map(|v| format!("{v:8.4}")).collect();
    println!("{line}\n");
}

/// Step 4: read rate and number of value changes.
fn throughput(id: i64, reads: usize) {
    println!("\nReading channel {id} {reads} times...");

    let index = match channel_index(id) {
        Ok(index) => index,
        Err(e) => {
            println!("ERROR {} from read_channel(): {}", e.kind().code(), e);
            return;
        }
    };

    let mut deltas = 0usize;
    let mut last = 0.0f64;
    let start = Instant::now();
    for _ in 0..reads {
        match para_xadc::read_channel(index) {
            Ok(value) => {
                if value != last {
                    deltas += 1;
                    last = value;
                }
            }
            Err(e) => {
                println!("ERROR {} from read_channel(): {}", e.kind().code(), e);
                return;
            }
        }
    }
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "Took {:.3} seconds, {:.0} updates/sec",
        elapsed,
        reads as f64 / elapsed.max(f64::MIN_POSITIVE)
    );
    println!("Found {deltas} unique values");
}
