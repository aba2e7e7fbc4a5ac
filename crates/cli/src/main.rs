mod args;
mod metrics;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prism_core::{
    load_config, load_config_from_env, validate_config, BatchError, BatchOrchestrator, Config,
    JobQueue, LogFormat, LoggingConfig, MediaCategory, MediaTranscoder, RunOutcome,
};

use args::Args;

/// Exit code when at least one item failed.
const EXIT_COMPLETED_WITH_ERRORS: i32 = 2;

/// Exit code when the run was interrupted (128 + SIGINT).
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("prism: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => load_config_from_env().context("Failed to load config from environment")?,
    };
    apply_overrides(&mut config, &args);
    validate_config(&config).context("Configuration validation failed")?;

    init_tracing(&config.logging);

    let category = args.category();
    let format = args.format_tag();

    let mut queue = JobQueue::new();
    for file in &args.files {
        let file_category = MediaCategory::of_path(file).unwrap_or(category);
        if !queue.add(file_category, file) {
            warn!(path = %file.display(), "Ignoring: not a file or already queued");
        }
    }
    let other = match category {
        MediaCategory::Image => MediaCategory::AudioVideo,
        MediaCategory::AudioVideo => MediaCategory::Image,
    };
    if !queue.is_empty(other) {
        warn!(
            "Ignoring {} that do not match the {} target",
            queue.count_label(other),
            category
        );
    }

    let transcoder = MediaTranscoder::new(config.image.clone(), config.ffmpeg.clone());
    if !backend_ready(&transcoder, &queue, category).await? {
        println!("Nothing to do");
        return Ok(0);
    }

    let orchestrator = BatchOrchestrator::new(config.orchestrator.clone(), transcoder);
    let handle = match orchestrator.submit_queue(&queue, category, format, config.output.policy())
    {
        Ok(handle) => handle,
        Err(BatchError::NothingToDo) => {
            println!("Nothing to do");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        "Converting {} to {} ({} workers)",
        queue.count_label(category),
        args.format_tag(),
        orchestrator.config().worker_count()
    );

    let renderer = tokio::spawn(render::follow(handle.subscribe()));
    let token = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupt received, finishing in-flight items");
        token.cancel();
    });

    let summary = handle.wait().await?;
    interrupt.abort();
    let _ = renderer.await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        for line in render::summary_lines(&summary) {
            println!("{}", line);
        }
    }

    if args.metrics {
        print!("{}", metrics::encode_metrics()?);
    }

    Ok(match summary.outcome {
        RunOutcome::Success => 0,
        RunOutcome::CompletedWithErrors => EXIT_COMPLETED_WITH_ERRORS,
        RunOutcome::Cancelled => EXIT_CANCELLED,
    })
}

/// Returns `false` for an empty queue, without touching the backend.
async fn backend_ready(
    transcoder: &MediaTranscoder,
    queue: &JobQueue,
    category: MediaCategory,
) -> Result<bool> {
    if queue.is_empty(category) {
        return Ok(false);
    }
    transcoder
        .validate_for(category)
        .await
        .with_context(|| format!("No {} converter available", category))?;
    Ok(true)
}

/// Command-line flags win over file and environment settings.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(jobs) = args.jobs {
        config.orchestrator.max_concurrency = Some(jobs);
    }
    if let Some(output) = &args.output {
        config.output.folder = Some(output.clone());
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
