//! # GPIO Edge Test Driver
//!
//! Exercises `para_gpio` on one header pin:
//!
//! 1. Exports the pin (if needed) and sets it as input
//! 2. Busy-polls the level and prints every change until it is quiet for 10 s
//! 3. Waits for up to five rising edges, 10 s each
//! 4. Closes, unexporting only if this run exported the pin
//!
//! Needs write access to `/sys/class/gpio` (usually root).

use clap::Parser;
use para_common::config::ParaConfig;
use para_common::logging;
use para_gpio::{Direction, Edge, EdgeWait, Gpio, GpioError, pin_number};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Quiet period that ends the busy-poll phase.
const QUIET_PERIOD: Duration = Duration::from_secs(10);
/// Timeout for each edge wait.
const EDGE_TIMEOUT: Duration = Duration::from_secs(10);
/// Rising edges to wait for.
const EDGE_COUNT: usize = 5;

/// GPIOTEST_IRQ - Basic test of para_gpio
#[derive(Parser, Debug)]
#[command(name = "gpiotest_irq")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Basic test of the para_gpio edge-wait facility")]
#[command(long_about = None)]
struct Args {
    /// GPIO pin number
    #[arg(short, long, default_value_t = 7, allow_hyphen_values = true)]
    gpio: i64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("GPIOTEST_IRQ - Basic test of para_gpio\n");

    let pin = match pin_number(args.gpio) {
        Ok(pin) => pin,
        Err(_) => {
            eprintln!("GPIO # must be >= 0, exiting");
            return ExitCode::FAILURE;
        }
    };

    let config = match ParaConfig::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.shared.log_level, args.verbose, args.json);
    info!("{} v{} using GPIO {}", config.shared.service_name, env!("CARGO_PKG_VERSION"), pin);

    match run(&config, pin) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}, exiting");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ParaConfig, pin: u32) -> Result<(), GpioError> {
    println!("Initializing...");
    let gpio = Gpio::open_with(&config.gpio, pin)?;
    println!("  Success");
    thread::sleep(Duration::from_secs(1));

    println!("Setting direction to 'input'.");
    gpio.set_direction(Direction::In)?;
    println!("  Success");
    thread::sleep(Duration::from_secs(1));

    poll_for_changes(&gpio);
    wait_for_rising(&gpio);

    println!("Closing");
    gpio.close(false)
}

/// Print level changes until the pin stays put for [`QUIET_PERIOD`].
fn poll_for_changes(gpio: &Gpio) {
    let mut level = match gpio.read_level() {
        Ok(level) => level,
        Err(e) => {
            println!("ERROR from read_level(): {e}");
            return;
        }
    };

    println!("Explicitly polling for changes, starting at {level}...");
    let mut since = Instant::now();
    while since.elapsed() < QUIET_PERIOD {
        match gpio.read_level() {
            Ok(now) if now != level => {
                println!("{now}");
                level = now;
                since = Instant::now();
            }
            Ok(_) => {}
            Err(e) => {
                println!("ERROR from read_level(): {e}");
                break;
            }
        }
    }
}

fn wait_for_rising(gpio: &Gpio) {
    println!("Efficiently waiting for rising edges...");
    for i in 1..=EDGE_COUNT {
        match gpio.wait_for_edge(Edge::Rising, Some(EDGE_TIMEOUT)) {
            Ok(EdgeWait::Edge { .. }) => println!("Rise {i}!"),
            Ok(EdgeWait::Timeout) => {
                println!("Timeout!");
                break;
            }
            Err(e) => {
                println!("ERROR from wait_for_edge(): {e}");
                break;
            }
        }
    }
}
