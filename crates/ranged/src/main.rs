//! ranged - The rangemaster exercise service
//!
//! This is the main entry point for the ranged service.
//! It wires together all the components:
//! - Exercise configuration loading
//! - Serial transport to the target controller
//! - Session scheduler
//! - Signal handling

use anyhow::{Context, Result};
use clap::Parser;
use range_api::EndReason;
use range_config::{ExerciseConfig, load_config};
use range_core::{CoreEvent, SchedulerConfig, SchedulerHandle, SessionScheduler};
use range_sink_serial::{SerialSink, available_ports};
use range_util::{
    RANGE_SERIAL_PORT_ENV, default_config_path, format_countdown, format_datetime_full,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// ranged - Timed target exercise runner for the shooting range
#[derive(Parser, Debug)]
#[command(name = "ranged")]
#[command(about = "Timed target exercise runner for the shooting range", long_about = None)]
struct Args {
    /// Exercise file path (default: ~/.config/rangemaster/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Serial port override (or set RANGE_SERIAL_PORT env var)
    #[arg(short, long, env = RANGE_SERIAL_PORT_ENV)]
    serial_port: Option<PathBuf>,

    /// Do not open the serial port; log target commands instead
    #[arg(long)]
    simulate: bool,

    /// List serial devices and exit
    #[arg(long)]
    list_ports: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    exercise: ExerciseConfig,
    sink: Arc<SerialSink>,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let exercise = load_config(&args.config)
            .with_context(|| format!("Failed to load exercise from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            exercise_id = %exercise.session.id(),
            windows = exercise.session.windows().len(),
            "Exercise loaded"
        );

        let port = args
            .serial_port
            .clone()
            .unwrap_or_else(|| exercise.daemon.serial_port.clone());
        let sink = Arc::new(SerialSink::new(port, exercise.daemon.baud_rate));

        if args.simulate {
            info!("Simulation mode, serial port not opened");
        } else if let Err(e) = sink.connect().await {
            warn!(
                port = %sink.port_path().display(),
                error = %e,
                "Serial port unavailable, target commands will be simulated"
            );
        }

        info!(
            port = %sink.port_path().display(),
            connected = sink.is_connected(),
            "Target sink ready"
        );

        Ok(Self { exercise, sink })
    }

    async fn run(self) -> Result<()> {
        let scheduler = SessionScheduler::spawn(
            self.sink.clone(),
            SchedulerConfig {
                tick_interval: self.exercise.daemon.tick_interval,
                dispatch_timeout: self.exercise.daemon.dispatch_timeout,
            },
        );
        let mut events = scheduler.subscribe();

        // Set up signal handlers
        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup())
            .context("Failed to create SIGHUP handler")?;

        scheduler
            .start(self.exercise.session)
            .await
            .context("Failed to start session")?;

        let idle = scheduler.wait_idle();
        tokio::pin!(idle);

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, aborting session");
                    Self::abort(&scheduler).await?;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, aborting session");
                    Self::abort(&scheduler).await?;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, aborting session");
                    Self::abort(&scheduler).await?;
                }

                event = events.recv() => match event {
                    Ok(event) => Self::handle_core_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                },

                result = &mut idle => {
                    result?;
                    break;
                }
            }
        }

        // Events published alongside the final transition
        while let Ok(event) = events.try_recv() {
            Self::handle_core_event(&event);
        }

        info!("Shutting down ranged");
        scheduler.shutdown().await?;
        self.sink.disconnect();

        info!("Shutdown complete");
        Ok(())
    }

    async fn abort(scheduler: &SchedulerHandle) -> Result<()> {
        if !scheduler.abort().await? {
            debug!("No session running");
        }
        Ok(())
    }

    fn handle_core_event(event: &CoreEvent) {
        match event {
            CoreEvent::SessionStarted {
                run_id,
                exercise_id,
                name,
                total_seconds,
                started_at,
            } => {
                info!(
                    run_id = %run_id,
                    exercise_id = %exercise_id,
                    name = %name,
                    duration = %format_countdown(*total_seconds),
                    started_at = %format_datetime_full(started_at),
                    "Exercise running"
                );
            }
            CoreEvent::TargetsChanged {
                run_id,
                elapsed_seconds,
                activated,
                deactivated,
            } => {
                info!(
                    run_id = %run_id,
                    elapsed = %format_countdown(*elapsed_seconds),
                    activated = ?activated,
                    deactivated = ?deactivated,
                    "Targets changed"
                );
            }
            CoreEvent::SessionEnding {
                run_id,
                reason,
                sweep,
                ..
            } => {
                info!(run_id = %run_id, reason = ?reason, sweep = ?sweep, "Lowering targets");
            }
            CoreEvent::SessionEnded {
                run_id,
                reason,
                elapsed_seconds,
            } => match reason {
                EndReason::Completed => info!(
                    run_id = %run_id,
                    elapsed = %format_countdown(*elapsed_seconds),
                    "Exercise complete"
                ),
                EndReason::Aborted => warn!(
                    run_id = %run_id,
                    elapsed = %format_countdown(*elapsed_seconds),
                    "Exercise aborted"
                ),
            },
            // Already logged by the dispatcher
            CoreEvent::DispatchFailed { .. } => {}
        }
    }
}

fn list_ports() -> Result<()> {
    let ports = available_ports().context("Failed to list serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if args.list_ports {
        return list_ports();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "ranged starting"
    );

    let service = Service::new(&args).await?;
    service.run().await
}
