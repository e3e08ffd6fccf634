//! `run` command: poll a simulated receiver and print position events.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use trackpoll::config::{PollingMode, TrackerConfig};
use trackpoll::logging;
use trackpoll::provider::{SimulatedProvider, SpeedProfile};
use trackpoll::{ChannelListener, Coordinate, PositionEvent, PositionPoller};

use super::config::load_config;
use crate::error::CliError;

/// Polling mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ModeArg {
    /// Constant update interval
    Fixed,
    /// Interval adapted to speed for roughly equidistant fixes
    Adaptive,
}

impl From<ModeArg> for PollingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fixed => PollingMode::Fixed,
            ModeArg::Adaptive => PollingMode::Adaptive,
        }
    }
}

/// Event output format.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Config file to read instead of the default
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Polling mode (overrides config)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Fixed-mode update interval in seconds (overrides config)
    #[arg(long)]
    pub interval: Option<f64>,

    /// Fixed-mode update timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Start latitude in decimal degrees
    #[arg(long, default_value = "52.5200", allow_hyphen_values = true)]
    pub lat: f64,

    /// Start longitude in decimal degrees
    #[arg(long, default_value = "13.4050", allow_hyphen_values = true)]
    pub lon: f64,

    /// Direction of travel in degrees from north
    #[arg(long, default_value = "90")]
    pub bearing: f64,

    /// Speed profile as SPEED@SECONDS segments, e.g. "1.4@60,8@120,0@30"
    #[arg(long, default_value = "1.4@60,8@120,0@30")]
    pub profile: String,

    /// Simulate signal loss on every Nth request
    #[arg(long)]
    pub dropout_every: Option<u32>,

    /// Stop after this many seconds (runs until Ctrl+C otherwise)
    #[arg(long)]
    pub duration: Option<f64>,

    /// Event output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Also write logs to the configured log file
    #[arg(long)]
    pub log_file: bool,
}

pub fn run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    let _guard = if args.log_file {
        let guard = logging::init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;
        Some(guard)
    } else {
        logging::init_console_logging();
        None
    };

    let profile: SpeedProfile = args
        .profile
        .parse()
        .map_err(|e| CliError::Config(format!("--profile: {}", e)))?;
    let mut provider =
        SimulatedProvider::new(Coordinate::new(args.lat, args.lon), args.bearing, profile);
    if let Some(n) = args.dropout_every {
        provider = provider.with_dropout_every(n);
    }

    let (listener, events) = ChannelListener::channel();
    let poller = config.build_poller(Box::new(provider), Arc::new(listener))?;
    tracing::info!(
        mode = %config.polling.mode,
        interval_secs = poller.update_interval().as_secs_f64(),
        "Starting simulated tracking"
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received shutdown signal, stopping...");
        signal_cancel.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let duration = args
        .duration
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|_| CliError::Config(format!("invalid --duration '{}'", secs)))
        })
        .transpose()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(track(
        poller,
        events,
        cancel,
        duration,
        args.output,
        &mut out,
    ))
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut TrackerConfig, args: &RunArgs) -> Result<(), CliError> {
    if let Some(mode) = args.mode {
        config.polling.mode = mode.into();
    }
    if let Some(secs) = args.interval {
        config.polling.update_interval = seconds_arg("--interval", secs)?;
    }
    if let Some(secs) = args.timeout {
        config.polling.update_timeout = seconds_arg("--timeout", secs)?;
    }
    Ok(())
}

fn seconds_arg(name: &str, secs: f64) -> Result<Duration, CliError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(CliError::Config(format!(
            "{} must be a positive number of seconds, got {}",
            name, secs
        ))),
    }
}

/// Run the poller and write one line per event to `out`.
async fn track(
    mut poller: PositionPoller,
    mut events: UnboundedReceiver<PositionEvent>,
    cancel: CancellationToken,
    duration: Option<Duration>,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if let Some(duration) = duration {
        let timer_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            timer_cancel.cancel();
        });
    }

    // The channel closes once the poller (and its listener) is dropped
    let polling = tokio::spawn(async move { poller.run(cancel).await });

    while let Some(event) = events.recv().await {
        writeln!(out, "{}", format_event(&event, output)?).map_err(CliError::Write)?;
    }

    match polling.await {
        Ok(result) => result.map_err(CliError::from),
        Err(e) => Err(CliError::Config(format!("Polling task failed: {}", e))),
    }
}

fn format_event(event: &PositionEvent, output: OutputFormat) -> Result<String, CliError> {
    if output == OutputFormat::Json {
        return serde_json::to_string(event).map_err(CliError::Output);
    }

    Ok(match event {
        PositionEvent::Updated { fix } => format!("fix      {}", fix),
        PositionEvent::PartialUpdated { timestamp } => {
            format!("partial  time={}", timestamp.format("%Y-%m-%dT%H:%M:%SZ"))
        }
        PositionEvent::Restored => "restored".to_string(),
        PositionEvent::Lost => "lost".to_string(),
        PositionEvent::Error { error } => format!("error    {}", error),
    })
}
