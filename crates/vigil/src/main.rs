//! # Vigil - behavioral risk engine replay tool
//!
//! Replays a recorded input trace through the engine with real timers,
//! printing every engine event as a JSON line on stdout.
//!
//! ```text
//! trace (JSON lines) → feeder → run_engine → stdout
//!                                   ↑
//!                     answers (--answer-with-expected)
//! ```

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{broadcast, mpsc};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vigil::timer::Deadline;
use vigil::trace::{TraceEntry, parse_trace};
use vigil::{EngineConfig, EngineController, EngineEvent, InputEvent, run_engine};
use vigil_common::FieldId;

/// Vigil - behavioral risk engine
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input trace (JSON lines), or "-" for stdin
    #[arg(short, long, default_value = "-")]
    trace: String,

    /// Configuration file path
    #[arg(short, long, default_value = "config/vigil.toml", env = "VIGIL_CONFIG")]
    config: String,

    /// Fields present in the host form (defaults to every configured field)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Replay speed factor (2.0 = twice as fast)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Answer every issued challenge correctly, as a solving user would
    #[arg(long, default_value = "false")]
    answer_with_expected: bool,

    /// Time to keep the engine running after the trace ends (ms)
    #[arg(long, default_value_t = 500)]
    settle_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Vigil v{}", env!("CARGO_PKG_VERSION"));

    anyhow::ensure!(args.speed > 0.0, "--speed must be positive");

    // Load configuration
    let config = EngineConfig::load(&args.config)?;
    info!("Configuration loaded from {}", args.config);

    let present: Vec<FieldId> = args
        .fields
        .clone()
        .unwrap_or_else(|| config.fields.clone())
        .into_iter()
        .map(FieldId::new)
        .collect();

    let entries = read_trace(&args.trace)?;
    info!(events = entries.len(), "Trace loaded");

    let engine = EngineController::new(config, &present).context("Failed to build engine")?;

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (input_tx, input_rx) = mpsc::channel::<InputEvent>(1024);
    let (output_tx, mut output_rx) = mpsc::channel::<EngineEvent>(1024);

    let engine_task = tokio::spawn(run_engine(engine, input_rx, output_tx, shutdown_tx.subscribe()));
    let mut feeder = tokio::spawn(feed_trace(entries, input_tx.clone(), args.speed));
    let mut feeder_done = false;
    let mut settle = Deadline::new();

    let mut stdout = io::stdout().lock();
    loop {
        tokio::select! {
            joined = &mut feeder, if !feeder_done => {
                feeder_done = true;
                joined.context("Trace feeder panicked")??;
                settle.arm(Duration::from_millis(args.settle_ms));
            }
            _ = settle.fired() => {
                info!("Trace finished");
                let _ = shutdown_tx.send(());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(());
            }
            event = output_rx.recv() => {
                let Some(event) = event else { break };
                serde_json::to_writer(&mut stdout, &event)?;
                writeln!(stdout)?;

                if args.answer_with_expected {
                    if let EngineEvent::ChallengeIssued { answer, .. }
                    | EngineEvent::ChallengeRotated { answer, .. } = event
                    {
                        input_tx
                            .send(InputEvent::Answer { text: answer })
                            .await
                            .context("Engine stopped accepting input")?;
                    }
                }
            }
        }
    }

    let engine = engine_task.await.context("Engine task panicked")??;
    info!(
        pointer = %engine.pointer_score(),
        cadence = %engine.fused_cadence_score(),
        composite = %engine.composite(),
        gate = ?engine.gate_state(),
        "Vigil shutdown complete"
    );
    Ok(())
}

fn read_trace(path: &str) -> Result<Vec<TraceEntry>> {
    let entries = if path == "-" {
        parse_trace(io::stdin().lock())?
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open trace {path}"))?;
        parse_trace(BufReader::new(file))?
    };
    Ok(entries)
}

/// Send trace entries with their recorded spacing
async fn feed_trace(entries: Vec<TraceEntry>, inputs: mpsc::Sender<InputEvent>, speed: f64) -> Result<()> {
    for entry in entries {
        if entry.delay_ms > 0 {
            tokio::time::sleep(Duration::from_secs_f64(entry.delay_ms as f64 / 1000.0 / speed)).await;
        }
        inputs
            .send(entry.event)
            .await
            .context("Engine stopped accepting input")?;
    }
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }

    Ok(())
}
