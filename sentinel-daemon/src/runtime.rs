use std::time::Duration;

use tokio::sync::broadcast;

use sentinel_core::Config;
use sentinel_gateway::DeploymentGateway;
use sentinel_notify::Notifier;
use sentinel_rollback::RollbackTrigger;

use crate::error::DaemonError;
use crate::scheduler::{LiveScheduler, Scheduler};

/// Loop timing. `max_cycles` stops the loop early, which `None` never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub max_cycles: Option<u64>,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            error_backoff: config.error_backoff,
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the live scheduler and block the current thread until the loop exits.
pub fn start_blocking(config: &Config, options: RunOptions) -> Result<(), DaemonError> {
    tracing::info!(
        config = ?config,
        rollback = %config.rollback.mode(),
        "starting sentinel",
    );
    let scheduler = LiveScheduler::from_config(config);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    runtime.block_on(run(scheduler, options)).map(|_| ())
}

/// Run cycles until ctrl-c or the cycle limit, returning the scheduler.
///
/// A good cycle is followed by `poll_interval`, a failed one by
/// `error_backoff`. Cycle failures are logged, never returned.
pub async fn run<G, N, R>(
    mut scheduler: Scheduler<G, N, R>,
    options: RunOptions,
) -> Result<Scheduler<G, N, R>, DaemonError>
where
    G: DeploymentGateway + Send + 'static,
    N: Notifier + Send + 'static,
    R: RollbackTrigger + Send + 'static,
{
    let (shutdown_tx, _) = broadcast::channel::<()>(4);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let signal_handle = spawn_signal_task(&shutdown_tx);

    let mut cycles: u64 = 0;
    loop {
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = scheduler.run_cycle();
            (scheduler, result)
        })
        .await
        .map_err(|err| DaemonError::Join {
            task: "cycle",
            message: err.to_string(),
        })?;
        scheduler = returned;
        cycles += 1;

        let pause = match result {
            Ok(report) => {
                report.log_summary();
                options.poll_interval
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    backoff_secs = options.error_backoff.as_secs(),
                    "cycle failed",
                );
                options.error_backoff
            }
        };

        if options.max_cycles.is_some_and(|max| cycles >= max) {
            tracing::info!(cycles, "cycle limit reached");
            break;
        }

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }

    let _ = shutdown_tx.send(());
    handle_join("signal_handler", signal_handle.await)?;
    Ok(scheduler)
}

/// Waits for ctrl-c and broadcasts shutdown, or exits when shutdown is
/// broadcast by the loop. Subscribes before spawning so an early shutdown is
/// never missed.
fn spawn_signal_task(
    shutdown_tx: &broadcast::Sender<()>,
) -> tokio::task::JoinHandle<Result<(), DaemonError>> {
    let shutdown = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => Ok(()),
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => {
                        tracing::info!("received ctrl-c, shutting down");
                        let _ = shutdown.send(());
                        Ok(())
                    }
                    Err(err) => Err(DaemonError::Signal(err)),
                }
            }
        }
    })
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Join {
            task,
            message: err.to_string(),
        }),
    }
}

/// Install the global subscriber on stderr. `RUST_LOG` overrides the `info`
/// default; a second call is a no-op.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = match format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
