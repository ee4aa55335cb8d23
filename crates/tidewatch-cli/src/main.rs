//! `tidewatch` – AUV safety supervisor
//!
//! Runs the safety supervisor against a JSON-lines stream:
//!
//! 1. Loads `~/.tidewatch/config.toml` (or `$TIDEWATCH_CONFIG`), falling back
//!    to defaults, then applies `TIDEWATCH_*` overrides.
//! 2. Reads one JSON [`Signal`][tidewatch_types::Signal] per stdin line and
//!    publishes it on the event bus.
//! 3. Ticks the supervisor at `tick_hz` and writes every plan request and
//!    status report to stdout as one JSON line.
//! 4. Stops on **Ctrl-C**.
//!
//! `tidewatch init-config` writes the default config file and exits.
//!
//! Logs and the banner go to stderr.

mod config;
mod stdio;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

use tidewatch_middleware::{EventBus, Topic};
use tidewatch_runtime::{SupervisorTask, init_tracing};

fn main() {
    let _guard = init_tracing("tidewatch");

    print_banner();

    if std::env::args().nth(1).as_deref() == Some("init-config") {
        match config::save(&config::Config::default()) {
            Ok(path) => eprintln!(
                "  {} Config written to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            ),
            Err(e) => {
                eprintln!("{}: {}", "Error saving config".red(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            std::process::exit(1);
        }
    };
    info!(
        path = %config::config_path().display(),
        tick_hz = cfg.tick_hz,
        lost_comms_timeout_secs = cfg.supervisor.lost_comms_timeout_secs,
        system_id = %cfg.supervisor.system_id,
        "configuration loaded"
    );

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run(cfg, shutdown));
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_timeout(Duration::from_millis(200));

    if let Err(e) = result {
        eprintln!("{}: {}", "Supervisor error".red(), e);
        std::process::exit(1);
    }
    eprintln!("{}", "  ✓ Exiting tidewatch.".green());
}

async fn run(
    cfg: config::Config,
    shutdown: Arc<AtomicBool>,
) -> Result<(), tidewatch_types::SafetyError> {
    let bus = EventBus::default();

    // Output forwarders subscribe first so the initial idle report is seen.
    let plans = bus.subscribe_to(Topic::PlanCommands);
    let status = bus.subscribe_to(Topic::Status);
    tokio::spawn(stdio::forward_events(plans, std::io::stdout()));
    tokio::spawn(stdio::forward_events(status, std::io::stdout()));

    let tick_period = cfg.tick_period();
    let task = SupervisorTask::new(&bus, cfg.supervisor, tick_period)?;

    let reader_bus = bus.clone();
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        stdio::read_signals(stdin, &reader_bus).await;
    });

    task.run(shutdown).await;
    Ok(())
}

fn print_banner() {
    eprintln!();
    eprintln!("{}", r#"  _   _    _                     _       _     "#.bold().cyan());
    eprintln!("{}", r#" | |_(_)__| |_____ __ ____ _| |_ __| |_   "#.bold().cyan());
    eprintln!("{}", r#" |  _| / _` / -_) V  V / _` |  _/ _| ' \  "#.bold().cyan());
    eprintln!("{}", r#"  \__|_\__,_\___|\_/\_/\__,_|\__\__|_||_| "#.bold().cyan());
    eprintln!();
    eprintln!(
        "  {} {}",
        "tidewatch".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    eprintln!("  AUV Safety Supervisor");
    eprintln!();
}
