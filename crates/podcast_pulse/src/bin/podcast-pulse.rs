use std::{net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;
use apalis::{layers::sentry::SentryLayer, prelude::*};
use apalis_cron::{CronStream, Tick};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use cron::Schedule;
use podcast_status::FsStatusStore;
use podcast_pulse::{
    elevenlabs::ElevenLabsClient,
    host::{HostClient, HostCredentials},
    job_channel,
    openai::OpenAIClient,
    server::{self, AppState},
    spawn_worker,
    tracing::init_tracing_subscriber,
    x::client::XClient,
    DispatchOutcome, Dispatcher, JobReceiver, PipelineRunner, PipelineRunnerBuilder,
};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

type LiveRunner = PipelineRunner<ElevenLabsClient, HostClient, Arc<FsStatusStore>>;
type LiveDispatcher = Dispatcher<XClient, OpenAIClient>;

#[derive(Parser)]
#[command(
    name = "podcast-pulse",
    about = "Turns the daily \"Two thoughts from\" post into a published podcast episode"
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct Config {
    /// X (Twitter) API bearer token
    #[arg(long, env = "X_BEARER_TOKEN", hide_env_values = true)]
    x_bearer_token: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// Completion model used to write the monologue
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o")]
    openai_model: String,

    /// ElevenLabs API key
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    elevenlabs_key: Option<String>,

    /// ElevenLabs voice id
    #[arg(long, env = "ELEVENLABS_VOICE_ID", default_value = "21m00Tcm4TlvDq8ikWAM")]
    voice_id: String,

    /// Podcast hosting API base URL
    #[arg(long, env = "PODCAST_API_URL")]
    podcast_api_url: Option<String>,

    #[arg(long, env = "PODCAST_USER_ID")]
    podcast_user_id: Option<String>,

    #[arg(long, env = "PODCAST_API_TOKEN", hide_env_values = true)]
    podcast_api_token: Option<String>,

    /// Show to publish episodes to; publishing is skipped when unset
    #[arg(long, env = "PODCAST_SHOW_ID")]
    podcast_show_id: Option<String>,

    /// Timezone whose calendar date the episode is scheduled on
    #[arg(long, env = "PUBLISH_TIMEZONE", default_value = "America/New_York")]
    publish_timezone: String,

    /// Local hour episodes go live
    #[arg(long, env = "PUBLISH_HOUR", default_value = "6", value_parser = clap::value_parser!(u32).range(0..24))]
    publish_hour: u32,

    /// Directory holding audio files and status records
    #[arg(long, env = "AUDIO_DIR", default_value = "audio_files")]
    audio_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API and run background jobs
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
        bind: SocketAddr,
    },
    /// Fetch, generate and run the whole pipeline once, then exit
    Run,
    /// Trigger the pipeline on a cron schedule
    Cron {
        /// Cron schedule expression
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 12 * * *")]
        schedule: String,
    },
}

/// Treats an explicitly empty value the same as an unset one.
fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn secret(value: &Option<String>) -> Option<SecretString> {
    non_blank(value).map(SecretString::from)
}

async fn build_runner(config: &Config) -> anyhow::Result<LiveRunner> {
    let store = FsStatusStore::init(&config.audio_dir).await?;
    let synthesizer = ElevenLabsClient::new(secret(&config.elevenlabs_key))
        .context("Failed to build ElevenLabs client")?;

    let timezone = Tz::from_str(&config.publish_timezone)
        .map_err(|e| anyhow::anyhow!("Invalid PUBLISH_TIMEZONE: {e}"))?;
    let publisher = config
        .podcast_show_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(|show_id| {
            HostClient::new(
                HostCredentials {
                    api_url: non_blank(&config.podcast_api_url),
                    user_id: non_blank(&config.podcast_user_id),
                    api_token: secret(&config.podcast_api_token),
                },
                show_id,
            )
            .with_schedule(timezone, config.publish_hour)
        });
    if publisher.is_none() {
        tracing::warn!("PODCAST_SHOW_ID not set, episodes will not be published");
    }

    Ok(PipelineRunnerBuilder::new(&config.audio_dir, &config.voice_id)
        .synthesizer(synthesizer)
        .publisher(publisher)
        .store(Arc::new(store))
        .build())
}

async fn build_pipeline(
    config: &Config,
) -> anyhow::Result<(LiveDispatcher, Arc<LiveRunner>, JobReceiver)> {
    let runner = Arc::new(build_runner(config).await?);
    let (jobs, job_rx) = job_channel();

    let dispatcher = Dispatcher::new(
        XClient::new(secret(&config.x_bearer_token)),
        OpenAIClient::new(secret(&config.openai_key)).with_model(&config.openai_model),
        jobs,
    );

    Ok((dispatcher, runner, job_rx))
}

async fn handle_tick(_tick: Tick, dispatcher: Data<Arc<LiveDispatcher>>) -> anyhow::Result<()> {
    tracing::info!("Running scheduled dispatch...");
    match dispatcher.dispatch().await? {
        DispatchOutcome::Dispatched { status_key, .. } => {
            tracing::info!(%status_key, "Scheduled run queued");
        }
        DispatchOutcome::NotFound => tracing::info!("Nothing to publish today"),
    }
    Ok(())
}

async fn shutdown_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for ctrl-c");
    }
    tracing::info!("Shutdown requested");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = cli.config;

    match cli.command {
        Command::Serve { bind } => {
            let (dispatcher, runner, job_rx) = build_pipeline(&config).await?;
            let shutdown = CancellationToken::new();
            let worker = spawn_worker(Arc::clone(&runner), job_rx, shutdown.clone());

            let store = Arc::clone(runner.store());
            let state = Arc::new(AppState { dispatcher, store });

            tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));
            server::serve(bind, state, shutdown).await?;
            worker.await.context("Worker task failed")?;
        }
        Command::Run => {
            let (dispatcher, runner, mut job_rx) = build_pipeline(&config).await?;
            tracing::info!("Running pipeline once...");

            match dispatcher.dispatch().await? {
                DispatchOutcome::NotFound => {
                    tracing::info!("No matching post found");
                }
                DispatchOutcome::Dispatched { status_key, .. } => {
                    let job = job_rx
                        .recv()
                        .await
                        .context("Dispatched job never reached the queue")?;
                    let record = runner.run(job).await;
                    tracing::info!(%status_key, status = ?record.status, "Run complete");
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
            }
        }
        Command::Cron { schedule } => {
            tracing::info!(%schedule, "Starting cron scheduler...");
            let schedule = Schedule::from_str(&schedule)?;

            let (dispatcher, runner, job_rx) = build_pipeline(&config).await?;
            let shutdown = CancellationToken::new();
            let job_worker = spawn_worker(runner, job_rx, shutdown.clone());

            // no retry layer: search and generation are never retried
            let worker = WorkerBuilder::new("podcast-pulse-cron")
                .backend(CronStream::new(schedule))
                .layer(SentryLayer::new())
                .data(Arc::new(dispatcher))
                .build(handle_tick);

            tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));
            tokio::select! {
                res = worker.run() => res?,
                _ = shutdown.cancelled() => {}
            }
            shutdown.cancel();
            job_worker.await.context("Worker task failed")?;
        }
    }

    Ok(())
}
