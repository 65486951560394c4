//! # Servo Fleet Demo
//!
//! Drives a small fleet through a full start / stop / resume cycle while
//! the main thread feeds random targets into the shared cells.
//!
//! # Usage
//!
//! ```bash
//! # Built-in three-servo fleet on the simulation driver
//! servo_demo
//!
//! # Fleet from file, reproducible targets, verbose logging
//! servo_demo --config config/fleet.toml --seed 7 -v
//!
//! # JSON logs and status lines
//! servo_demo --json
//! ```
//!
//! Logging is installed before the fleet file is read, so a missing or
//! invalid `--config` is reported before the process exits with status 1.
//! The file's `shared.log_level` then replaces the startup level unless
//! `--verbose` is given.

#![deny(warnings)]

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use servo_common::prelude::*;
use servo_ctrl::{Actuator, DriverRegistry, FleetBinding, TargetCell, prepare_channels};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// Servo fleet demo - random targets, stop and resume
#[derive(Parser, Debug)]
#[command(name = "servo_demo")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Runs a servo fleet through start, stop and resume with random targets")]
#[command(long_about = None)]
struct Args {
    /// Path to fleet configuration (fleet.toml). Uses a built-in
    /// three-servo fleet when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// PWM driver to use
    #[arg(short, long, default_value = "simulation")]
    driver: String,

    /// Target updates per phase
    #[arg(short = 'n', long, default_value_t = 6)]
    iterations: u32,

    /// Delay between target updates [ms]
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Seed for the target generator
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Servo demo failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let log_filter = setup_tracing(&args);

    let config = match &args.config {
        Some(path) => {
            info!("Loading fleet config from {}", path.display());
            FleetConfig::load_validated(path)?
        }
        None => builtin_fleet(),
    };
    if !args.verbose {
        apply_log_level(&log_filter, config.shared.log_level);
    }

    info!(
        "{} demo v{} starting ({} actuators)",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.actuators.len()
    );

    let registry = DriverRegistry::with_builtin_drivers();
    info!("Available drivers: {:?}", registry.list_drivers());
    let port = registry.create_driver(&args.driver)?;
    info!("Using driver {} v{}", port.name(), port.version());

    // One cell per actuator; the last actuator is the range-reset toggler.
    let cells: Vec<TargetCell> = config
        .actuators
        .iter()
        .map(|_| TargetCell::default())
        .collect();
    let actuators = config
        .actuators
        .iter()
        .zip(&cells)
        .map(|(cfg, cell)| Actuator::new(cfg.clone(), Some(cell.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let max_rotation: Vec<f32> = config.actuators.iter().map(|a| a.max_rotation_deg).collect();

    prepare_channels(port.as_ref(), &actuators)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut writer = TargetWriter {
        cells: &cells,
        max_rotation: &max_rotation,
        rng: &mut rng,
        toggle: false,
    };

    let mut fleet = FleetBinding::start(actuators, Arc::clone(&port))?;

    info!("Phase 1: fleet running");
    drive(&fleet, &mut writer, &args, &running);

    fleet.stop();
    info!("Phase 2: fleet stopped, targets keep changing");
    drive(&fleet, &mut writer, &args, &running);

    if running.load(Ordering::SeqCst) {
        fleet.resume()?;
        info!("Phase 3: fleet resumed");
        drive(&fleet, &mut writer, &args, &running);
    }

    fleet.stop();
    report(&fleet, args.json);

    if let Err(e) = port.shutdown() {
        warn!("PWM shutdown failed: {e}");
    }
    info!("Servo demo complete");
    Ok(())
}

/// Writes fresh targets into the shared cells.
struct TargetWriter<'a> {
    cells: &'a [TargetCell],
    max_rotation: &'a [f32],
    rng: &'a mut StdRng,
    toggle: bool,
}

impl TargetWriter<'_> {
    fn write_next(&mut self) {
        let last = self.cells.len().saturating_sub(1);
        for (i, (cell, &max)) in self.cells.iter().zip(self.max_rotation).enumerate() {
            let target = if i == last && self.cells.len() > 1 {
                if self.toggle { max } else { 0.0 }
            } else {
                self.rng.gen_range(0.0..=max)
            };
            cell.store(target);
        }
        self.toggle = !self.toggle;
    }
}

fn drive(fleet: &FleetBinding, writer: &mut TargetWriter<'_>, args: &Args, running: &AtomicBool) {
    for _ in 0..args.iterations {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        writer.write_next();
        thread::sleep(Duration::from_millis(args.interval_ms));
        report(fleet, args.json);
    }
}

fn report(fleet: &FleetBinding, json: bool) {
    for status in fleet.statuses() {
        if json {
            match serde_json::to_string(&status) {
                Ok(line) => info!("{line}"),
                Err(e) => warn!("Status serialization failed: {e}"),
            }
        } else {
            info!("{status}");
        }
    }
}

/// Three servos on channels 0..=2; the third runs reversed.
fn builtin_fleet() -> FleetConfig {
    let actuators = (0..3u8)
        .map(|id| ActuatorConfig {
            id,
            channel: id,
            gpio: 16 + id,
            sweep_period_ms: 1500 + 250 * id as u32,
            rest_period_ms: 500,
            reversed: id == 2,
            ..Default::default()
        })
        .collect();
    FleetConfig {
        shared: SharedConfig::default(),
        actuators,
    }
}

/// Handle for swapping the log filter once the fleet file is loaded.
type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

fn log_filter(level: Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level.into())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) -> LogFilterHandle {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let (filter, handle) = reload::Layer::new(log_filter(level));
    let registry = tracing_subscriber::registry().with(filter);

    if args.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_names(true))
            .init();
    }
    handle
}

/// Switch to the level configured in the fleet file.
fn apply_log_level(handle: &LogFilterHandle, configured: LogLevel) {
    if let Err(e) = handle.reload(log_filter(configured.into())) {
        warn!("Failed to apply configured log level: {e}");
    }
}
