use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dnsbl_domain::{CliOverrides, Config};
use dnsbl_infrastructure::{
    HickoryDnsblProber, NoopAnalyticStore, PostgresAnalyticStore, RabbitMqWorkQueue,
    SqliteTaskLedger, TracingReporter, YamlPrefixSource,
};
use dnsbl_jobs::{DailyRunJob, DailyRunJobConfig};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Per-worker-iteration deadline bounding a single probe, distinct
/// from the Prober's own 5s per-attempt DNS deadline.
const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "dnsbl-screener")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily, idempotent DNSBL screening pipeline")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Path to the CIDR prefix list, overriding the configured one
    #[arg(short = 'p', long, value_name = "FILE")]
    prefixes: Option<String>,

    /// Ledger database path, overriding the configured one
    #[arg(long)]
    database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Expand and report the would-be task count without touching the
    /// ledger, queue, or analytic store
    #[arg(long)]
    dry_run: bool,

    /// Run as if today were this date (YYYY-MM-DD), for backfills and
    /// manual reruns
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        db_path: cli.database.clone(),
        prefixes_path: cli.prefixes.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = Config::load(cli.config.as_deref(), cli_overrides)?;
    config.validate()?;

    let _log_guards = init_logging(&config)?;

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        zones = config.blacklists.len(),
        "configuration loaded"
    );

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let today = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    if cli.dry_run {
        return run_dry(&config).await;
    }

    let exit_code = match run(&config, shutdown, today).await {
        Ok(summary) => {
            info!(line = %summary.to_line(), "run complete");
            0
        }
        Err(err) => {
            error!(error = %err, "run failed");
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run_dry(config: &Config) -> anyhow::Result<()> {
    let prefix_source = Arc::new(YamlPrefixSource::new(config.prefixes_path.clone()));
    let generator = dnsbl_application::use_cases::GenerateTasksUseCase::new(
        prefix_source,
        config.blacklists.clone(),
    );
    let report = generator.execute().await?;
    info!(
        seeds = report.seeds.len(),
        skipped_prefixes = report.skipped_prefixes,
        "dry run: no writes performed"
    );
    Ok(())
}

async fn run(
    config: &Config,
    shutdown: CancellationToken,
    today: chrono::NaiveDate,
) -> anyhow::Result<dnsbl_domain::RunSummary> {
    let sqlite_options = SqliteConnectOptions::new()
        .filename(&config.sqlite.db_path)
        .create_if_missing(true);
    let sqlite_pool = SqlitePoolOptions::new().connect_with(sqlite_options).await?;
    let ledger = Arc::new(SqliteTaskLedger::new(sqlite_pool));

    let queue = Arc::new(
        RabbitMqWorkQueue::connect(
            &config.rabbitmq.amqp_url(),
            config.rabbitmq.default_queue.clone(),
            config.rabbitmq.prefetch_count(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to broker: {e}"))?,
    );

    let analytic_store: Arc<dyn dnsbl_application::ports::AnalyticStore> =
        if config.postgresql.is_configured() {
            let url = config
                .postgresql
                .connection_url()
                .expect("is_configured() implies connection_url() is Some");
            let pool = PgPoolOptions::new().connect(&url).await?;
            Arc::new(PostgresAnalyticStore::new(pool))
        } else {
            warn!("no analytic store configured, promoted rows will be dropped");
            Arc::new(NoopAnalyticStore)
        };

    let prober = Arc::new(HickoryDnsblProber::new());
    let prefix_source = Arc::new(YamlPrefixSource::new(config.prefixes_path.clone()));
    let reporter = Arc::new(TracingReporter::new());

    let job = DailyRunJob::new(
        ledger,
        queue,
        analytic_store,
        prober,
        prefix_source,
        reporter,
        DailyRunJobConfig {
            zones: config.blacklists.clone(),
            publish_batch_size: config.rabbitmq.publish_batch_size,
            bulk_update_count: config.sqlite.bulk_update_count,
            probe_timeout: PROBE_TIMEOUT,
            concurrency: config.rabbitmq.concurrency_limit,
            retention_days: config.sqlite.retention_days,
        },
    )
    .with_cancellation(shutdown);

    job.run(today)
        .await
        .map_err(|e| anyhow::anyhow!("run failed: {e}"))
}

/// Builds a `rolling::daily` appender rooted at `path`'s directory,
/// named after `path`'s file name.
fn daily_appender(path: &str, default_name: &str) -> tracing_appender::rolling::RollingFileAppender {
    let directory = std::path::Path::new(path).parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| default_name.to_string());
    tracing_appender::rolling::daily(directory, file_name)
}

fn init_logging(config: &Config) -> anyhow::Result<Vec<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer as _;

    let level: tracing::Level = config.logging.level.parse().unwrap_or(tracing::Level::INFO);
    let mut guards = Vec::new();

    let app_layer: Box<dyn tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync> =
        match &config.logging.app_log_path {
            Some(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(daily_appender(path, "dnsbl-screener.log"));
                guards.push(guard);
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .boxed()
            }
            None => tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed(),
        };

    let error_layer: Option<Box<dyn tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync>> =
        config.logging.error_log_path.as_ref().map(|path| {
            let (non_blocking, guard) = tracing_appender::non_blocking(daily_appender(path, "dnsbl-screener-error.log"));
            guards.push(guard);
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::filter::LevelFilter::ERROR)
                .boxed()
        });

    let combined_layer = app_layer
        .and_then(error_layer)
        .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level));

    tracing_subscriber::registry().with(combined_layer).init();

    Ok(guards)
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install sigterm handler")
                .recv()
                .await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received interrupt, shutting down gracefully"),
            _ = terminate => info!("received terminate, shutting down gracefully"),
        }
        shutdown.cancel();

        tokio::select! {
            _ = ctrl_c_again() => {
                error!("received second interrupt, forcing exit");
                std::process::exit(130);
            }
            _ = tokio::time::sleep(Duration::from_secs(30)) => {}
        }
    });
}

async fn ctrl_c_again() {
    tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
}
