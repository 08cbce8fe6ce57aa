//! # RIO Notifier Demo Binary
//!
//! Runs a periodic notifier against a selectable alarm driver and logs
//! tick throughput once per second.
//!
//! # Usage
//!
//! ```bash
//! # Host driver, 20ms period
//! rio_notifier
//!
//! # Explicit config file
//! rio_notifier --config config/config.toml
//!
//! # Deterministic simulated time
//! rio_notifier --simulate
//!
//! # Verbose logging / JSON logs
//! rio_notifier -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use rio_common::config::{AppConfig, ConfigLoader, LogLevel, NotifierSection, SharedConfig};
use rio_common::timebase::MonotonicClock;
use rio_hal::drivers::{builtin_registry, sim::SimAlarmDriver};
use rio_hal::rt;
use rio_notifier::Notifier;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// RIO Notifier demo - periodic callback scheduling on a pluggable alarm driver
#[derive(Parser, Debug)]
#[command(name = "rio_notifier")]
#[command(version)]
#[command(about = "Periodic notifier demo with pluggable alarm drivers")]
#[command(long_about = None)]
struct Args {
    /// Path to TOML configuration file (shared + notifier tables).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force the simulation driver (exclusive - overrides the config)
    #[arg(short = 's', long)]
    simulate: bool,

    /// Override the callback period in milliseconds
    #[arg(long, value_name = "MS")]
    period_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("notifier demo failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    setup_tracing(&args);

    info!("RIO Notifier v{} starting...", env!("CARGO_PKG_VERSION"));

    // Configuration: file if given, built-in defaults otherwise.
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            let config = AppConfig::load(path)?;
            config.validate()?;
            config
        }
        None => AppConfig {
            shared: SharedConfig {
                log_level: LogLevel::Info,
                service_name: "rio-notifier-demo".to_string(),
            },
            notifier: NotifierSection::default(),
        },
    };
    if let Some(period_ms) = args.period_ms {
        config.notifier.period_ms = period_ms;
        config.notifier.validate()?;
    }
    let period = Duration::from_millis(config.notifier.period_ms);

    if rt::detect_rt_mode() {
        info!("Running under a real-time scheduling policy");
    } else {
        info!("Running in standard (non-RT) scheduling mode");
    }

    // Shutdown flag wired to SIGINT.
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let ticks = Arc::new(AtomicU64::new(0));
    let handler = {
        let ticks = Arc::clone(&ticks);
        move || {
            ticks.fetch_add(1, Ordering::Relaxed);
        }
    };

    // Driver selection: --simulate is exclusive, else config.notifier.driver.
    if args.simulate || config.notifier.driver == "sim" {
        info!("Simulation mode enabled (manually advanced clock)");
        let driver = Arc::new(SimAlarmDriver::new());
        let notifier = Notifier::with_driver(driver.clone(), driver.clone(), handler)?;
        run_ticker(&config, period, &notifier, &running, &ticks, Some(&driver))?;
    } else {
        let registry = builtin_registry();
        let driver = registry.create_driver(&config.notifier.driver)?;
        info!("Created driver: {} v{}", driver.name(), driver.version());
        let notifier = Notifier::with_driver(driver, Arc::new(MonotonicClock::new()), handler)?;
        run_ticker(&config, period, &notifier, &running, &ticks, None)?;
    }

    info!("RIO Notifier shutdown complete");
    Ok(())
}

/// Start the notifier and report tick throughput until shutdown.
///
/// With a sim driver present, simulated time is advanced by one period
/// per wall-clock period so firings track real time deterministically.
fn run_ticker(
    config: &AppConfig,
    period: Duration,
    notifier: &Notifier,
    running: &AtomicBool,
    ticks: &AtomicU64,
    sim: Option<&SimAlarmDriver>,
) -> Result<(), Box<dyn std::error::Error>> {
    notifier.set_name(&config.shared.service_name);
    if config.notifier.real_time {
        let accepted = notifier.set_hal_thread_priority(true, config.notifier.priority);
        if accepted {
            info!(
                "Requested SCHED_FIFO priority {} for alarm delivery",
                config.notifier.priority
            );
        } else {
            warn!("Real-time priority request was not accepted");
        }
    }

    notifier.start_periodic(period)?;
    info!(
        "Notifier started (period={}ms, driver={})",
        period.as_millis(),
        config.notifier.driver
    );

    let mut last_report = std::time::Instant::now();
    let mut last_ticks = 0u64;
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(period);
        if let Some(driver) = sim {
            driver.advance(period);
        }
        if last_report.elapsed() >= Duration::from_secs(1) {
            let total = ticks.load(Ordering::Relaxed);
            info!("{} ticks total (+{} this second)", total, total - last_ticks);
            last_ticks = total;
            last_report = std::time::Instant::now();
        }
    }

    notifier.stop();
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
