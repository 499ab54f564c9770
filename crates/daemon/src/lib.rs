//! Refresh loop for `rivalbat`.
//!
//! Wires together all background tasks:
//! - Refresh timer (poll interval from `refresh-seconds`)
//! - Config file watcher (live reload on change)
//! - UPower display-device property changes
//!
//! Every trigger runs one [`Pipeline`] refresh and writes the resulting
//! [`IndicatorView`] to stdout.

pub mod emit;
pub mod pipeline;
pub mod schedule;

pub use emit::{Emitter, OutputFormat};
pub use pipeline::Pipeline;
pub use schedule::RefreshTimer;

use chrono::Local;
use futures::stream::{self, StreamExt};
use rivalbat_config::{load as load_config, ConfigWatcher, IndicatorConfig};
use rivalbat_core::{IndicatorError, Result, Trigger};
use rivalbat_indicator::IndicatorView;
use rivalbat_probe::{ProcessRunner, UpowerClient};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Runtime options from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub config_path: PathBuf,
    /// Refresh once, print, and exit.
    pub once: bool,
    pub format: OutputFormat,
    /// Overrides `refresh-seconds` from the config file.
    pub interval: Option<u64>,
}

impl Options {
    fn apply(&self, config: &mut IndicatorConfig) {
        if let Some(seconds) = self.interval {
            config.refresh_seconds = seconds;
        }
    }

    fn initial_config(&self) -> IndicatorConfig {
        let mut config = load_config(&self.config_path).unwrap_or_else(|e| {
            error!("{e}; using defaults");
            IndicatorConfig::default()
        });
        self.apply(&mut config);
        config
    }

    fn reload(&self, current: IndicatorConfig) -> IndicatorConfig {
        match load_config(&self.config_path) {
            Ok(mut config) => {
                self.apply(&mut config);
                info!("Config reloaded from {}", self.config_path.display());
                config
            }
            Err(e) => {
                warn!("{e}; keeping previous config");
                current
            }
        }
    }
}

/// Run the indicator until SIGINT/SIGTERM (or once, with `--once`).
pub async fn run(opts: Options) -> Result<()> {
    let mut config = opts.initial_config();

    let power = match UpowerClient::connect().await {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("UPower unavailable, no system battery fallback: {e}");
            None
        }
    };
    let pipeline = Pipeline::new(ProcessRunner, power.clone());
    let mut emitter = Emitter::new(std::io::stdout(), opts.format);

    if opts.once {
        let status = pipeline.refresh(&config).await;
        emitter.emit(IndicatorView::from_status(&status).at(Local::now()))?;
        return Ok(());
    }

    let (_watcher, mut config_rx) = ConfigWatcher::spawn(&opts.config_path);
    let mut power_changes = match &power {
        Some(client) => client.changes().await,
        None => stream::pending().boxed(),
    };
    let mut timer = RefreshTimer::new(config.refresh_interval());
    info!("Refreshing every {}s", timer.period().as_secs());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut trigger = Trigger::Startup;
    loop {
        debug!(trigger = trigger.as_str(), "Refreshing battery status");

        // Dropping the refresh future kills any child it is waiting on.
        let status = tokio::select! {
            status = pipeline.refresh(&config) => status,
            _ = &mut shutdown => {
                info!("Shutdown requested; cancelled in-flight refresh");
                return Ok(());
            }
        };
        if !publish(&mut emitter, IndicatorView::from_status(&status).at(Local::now())) {
            return Ok(());
        }

        trigger = loop {
            let next = tokio::select! {
                _ = timer.tick() => Trigger::Tick,
                Some(()) = config_rx.recv() => Trigger::ConfigChanged,
                Some(()) = power_changes.next() => Trigger::PowerChanged,
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(());
                }
            };

            match next {
                Trigger::PowerChanged if !config.upower_fallback => continue,
                Trigger::ConfigChanged => {
                    config = opts.reload(config);
                    if timer.restart(config.refresh_interval()) {
                        info!("Refresh interval now {}s", timer.period().as_secs());
                    }
                }
                _ => {}
            }
            break next;
        };
    }
}

/// Write `view`, logging failures.  Returns `false` once the reader of the
/// output has gone away; every other write error is retried on the next
/// refresh.
fn publish<W: Write>(emitter: &mut Emitter<W>, view: IndicatorView) -> bool {
    match emitter.emit(view) {
        Ok(_) => true,
        Err(IndicatorError::Io { source }) if source.kind() == ErrorKind::BrokenPipe => {
            info!("Output closed by reader; stopping");
            false
        }
        Err(e) => {
            warn!("Cannot write indicator output: {e}");
            true
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
