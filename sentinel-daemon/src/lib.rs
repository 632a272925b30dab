//! # sentinel-daemon
//!
//! The scheduler loop. Each cycle lists the controller's applications,
//! refreshes and reads every one except the monitor itself, feeds the fresh
//! status to the reconciler and executes the resulting side effects.
//! [`runtime::run`] repeats cycles on tokio with poll/backoff sleeps and
//! ctrl-c shutdown.

pub mod error;
pub mod report;
pub mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use report::{AppReport, CycleReport};
pub use runtime::{init_tracing, run, start_blocking, LogFormat, RunOptions};
pub use scheduler::{LiveScheduler, Scheduler};
