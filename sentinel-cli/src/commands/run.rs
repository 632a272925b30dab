//! `sentinel run`: the reconciliation daemon.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use sentinel_core::{Config, ConfigOverrides, RollbackMode};
use sentinel_daemon::{
    init_tracing, start_blocking, CycleReport, LiveScheduler, LogFormat, RunOptions,
};

/// Arguments for `sentinel run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration file. Flags and environment variables override it.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run a single cycle, print a report and exit.
    #[arg(long)]
    pub once: bool,

    /// Stop after this many cycles.
    #[arg(long, value_name = "N", conflicts_with = "once")]
    pub max_cycles: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    #[command(flatten)]
    pub settings: SettingFlags,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Settings that may come from a flag or its environment variable.
#[derive(Args, Debug, Default)]
pub struct SettingFlags {
    /// Argo CD API root.
    #[arg(long, env = "ARGOCD_API", value_name = "URL")]
    pub argocd_api: Option<String>,

    /// Argo CD bearer token.
    #[arg(long, env = "ARGOCD_TOKEN", hide_env_values = true)]
    pub argocd_token: Option<String>,

    /// Slack incoming webhook; notifications are only logged without it.
    #[arg(
        long,
        env = "SLACK_WEBHOOK_URL",
        hide_env_values = true,
        value_name = "URL"
    )]
    pub slack_webhook_url: Option<String>,

    /// Token used to dispatch the rollback workflow.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitOps repository holding the rollback workflow.
    #[arg(long, env = "GIT_REPO_URL", value_name = "URL")]
    pub git_repo_url: Option<String>,

    #[arg(long, env = "GIT_BRANCH")]
    pub git_branch: Option<String>,

    /// Local checkout used by the git-revert rollback mode.
    #[arg(long, env = "GIT_CHECKOUT", value_name = "DIR")]
    pub git_checkout: Option<PathBuf>,

    /// workflow-dispatch, git-revert or disabled.
    #[arg(long, env = "ROLLBACK_MODE", value_name = "MODE")]
    pub rollback_mode: Option<RollbackMode>,

    #[arg(long, env = "ROLLBACK_WORKFLOW", value_name = "FILE")]
    pub rollback_workflow: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT", value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Seconds between successful cycles.
    #[arg(long, env = "POLL_INTERVAL", value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Seconds to wait after a failed cycle.
    #[arg(long, env = "ERROR_BACKOFF", value_name = "SECS")]
    pub error_backoff: Option<u64>,

    /// Seconds to wait after each sync request.
    #[arg(long, env = "RETRY_DELAY", value_name = "SECS")]
    pub retry_delay: Option<u64>,

    /// Remediation attempts before an application is paused.
    #[arg(long, env = "MAX_ATTEMPTS", value_name = "N")]
    pub max_attempts: Option<u32>,

    /// The monitor's own application, never reconciled.
    #[arg(long, env = "MONITOR_APP", value_name = "NAME")]
    pub monitor_app: Option<String>,
}

impl From<SettingFlags> for ConfigOverrides {
    fn from(flags: SettingFlags) -> Self {
        ConfigOverrides {
            argocd_api: flags.argocd_api,
            argocd_token: flags.argocd_token,
            slack_webhook_url: flags.slack_webhook_url,
            github_token: flags.github_token,
            git_repo_url: flags.git_repo_url,
            git_branch: flags.git_branch,
            git_checkout: flags.git_checkout,
            rollback_mode: flags.rollback_mode,
            rollback_workflow: flags.rollback_workflow,
            request_timeout_secs: flags.request_timeout,
            poll_interval_secs: flags.poll_interval,
            error_backoff_secs: flags.error_backoff,
            retry_delay_secs: flags.retry_delay,
            max_attempts: flags.max_attempts,
            monitor_app: flags.monitor_app,
        }
    }
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        init_tracing(self.log_format.into());

        let config = Config::load(self.config.as_deref(), self.settings.into())
            .context("invalid configuration")?;

        if self.once {
            let mut scheduler = LiveScheduler::from_config(&config);
            let report = scheduler
                .run_cycle()
                .context("reconciliation cycle failed")?;
            print_report(&report);
            return Ok(());
        }

        let options = RunOptions {
            max_cycles: self.max_cycles,
            ..RunOptions::from_config(&config)
        };
        start_blocking(&config, options).context("sentinel exited with an error")
    }
}

// ---------------------------------------------------------------------------
// Report output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "application")]
    application: String,
    #[tabled(rename = "health")]
    health: String,
    #[tabled(rename = "sync")]
    sync: String,
    #[tabled(rename = "revision")]
    revision: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "actions")]
    actions: String,
}

fn print_report(report: &CycleReport) {
    println!(
        "Sentinel v{} | {} applications | {} syncs | {} rollbacks | {} paused",
        env!("CARGO_PKG_VERSION"),
        report.apps.len(),
        report.count_actions("sync"),
        report.count_actions("rollback"),
        report.paused(),
    );

    if report.apps.is_empty() {
        println!("No applications reconciled.");
        return;
    }

    let rows: Vec<ReportRow> = report
        .apps
        .iter()
        .map(|app| ReportRow {
            application: app.name.to_string(),
            health: app.health.to_string(),
            sync: app.sync.to_string(),
            revision: short_revision(app.revision.as_str()),
            state: app.phase.to_string(),
            actions: if app.actions.is_empty() {
                "-".to_string()
            } else {
                app.actions.join(", ")
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for app in report.apps.iter().filter(|app| app.paused) {
        println!(
            "{} {} is paused; fix it manually or push a new revision",
            "paused".red().bold(),
            app.name
        );
    }
    if !report.skipped.is_empty() {
        let names: Vec<String> = report.skipped.iter().map(ToString::to_string).collect();
        println!("{}", format!("skipped: {}", names.join(", ")).bright_black());
    }
}

fn short_revision(revision: &str) -> String {
    revision.chars().take(10).collect()
}
