#![deny(warnings)]

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;
use vibescope_core::analysis::{
    CannedAnalyzer, EmotionAnalyzer, GenerativeAnalyzer, SessionInsights,
};
use vibescope_core::config::{
    resolve_api_key, resolve_string_with_default, ApiKey, AppConfig, Env, ExportIdentity,
    GenerativeConfig, HistoryCapacity, SampleInterval, StdEnv, DEFAULT_EXPORT_EMAIL,
    DEFAULT_EXPORT_NAME, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_SAMPLE_INTERVAL_MS, ENV_GEMINI_API_KEY, ENV_GEMINI_BASE_URL, ENV_GEMINI_MODEL,
};
use vibescope_core::export::{demo_archive, render, ExportFormat};
use vibescope_core::observe::SyntheticObserver;
use vibescope_core::session::{
    Sampler, SamplerConfig, SamplerReport, SessionEvent, SessionRecorder, SessionSummary,
};

#[derive(Parser, Debug)]
#[command(name = "vibescope")]
#[command(about = "Emotional intelligence sessions from live analysis (observe->analyze->report)")]
struct Args {
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a live sampling session and print readings as they arrive.
    Watch(WatchArgs),
    /// Render the demo archive as JSON, CSV or a Markdown report.
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
struct WatchArgs {
    /// Stop after this many seconds; 0 runs until interrupted.
    #[arg(long, default_value_t = 0)]
    duration_secs: u64,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_INTERVAL_MS)]
    interval_ms: u64,

    /// Channels to sample: facial, voice or both.
    #[arg(long, default_value = "both")]
    mode: String,

    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    #[arg(long)]
    api_key: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    base_url: Option<String>,

    /// Skip the generative backend even when a key is configured.
    #[arg(long)]
    offline: bool,

    /// Ask the analyzer for a session report after the run.
    #[arg(long)]
    insights: bool,
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Output format: json, csv or report.
    #[arg(long, default_value = "json")]
    format: String,

    /// Seed for the demo session generator; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    base_url: Option<String>,

    /// Use the canned progress summary instead of the generative backend.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    match args.command {
        Command::Watch(watch_args) => run_watch(watch_args, &env).await,
        Command::Export(export_args) => run_export(export_args, &env).await,
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

enum SelectedAnalyzer {
    Canned(CannedAnalyzer),
    Generative(GenerativeAnalyzer),
}

fn select_analyzer(
    api_key: Option<ApiKey>,
    generative: &GenerativeConfig,
    offline: bool,
) -> anyhow::Result<SelectedAnalyzer> {
    if offline {
        tracing::info!("offline mode, using canned analysis");
        return Ok(SelectedAnalyzer::Canned(CannedAnalyzer::new()));
    }
    match api_key {
        Some(key) => {
            let analyzer = GenerativeAnalyzer::new(key.expose().to_owned())?
                .with_base_url(generative.base_url.clone())
                .with_model(generative.model.clone());
            Ok(SelectedAnalyzer::Generative(analyzer))
        }
        None => {
            tracing::warn!("no api key configured, falling back to canned analysis");
            Ok(SelectedAnalyzer::Canned(CannedAnalyzer::new()))
        }
    }
}

async fn run_watch(args: WatchArgs, env: &impl Env) -> anyhow::Result<()> {
    let cfg = build_config(&args, env)?;

    tracing::info!(
        mode = %cfg.mode,
        interval_ms = cfg.interval.interval_ms,
        history = cfg.history.get(),
        "config loaded"
    );

    match select_analyzer(cfg.api_key.clone(), &cfg.generative, args.offline)? {
        SelectedAnalyzer::Canned(analyzer) => {
            run_session(analyzer, cfg, args.duration_secs, args.insights).await
        }
        SelectedAnalyzer::Generative(analyzer) => {
            run_session(analyzer, cfg, args.duration_secs, args.insights).await
        }
    }
}

fn build_config(args: &WatchArgs, env: &impl Env) -> anyhow::Result<AppConfig> {
    let mode = args.mode.parse()?;
    let interval = SampleInterval::new(args.interval_ms)?;
    let history = HistoryCapacity::new(args.history_capacity)?;
    let api_key = resolve_api_key(args.api_key.clone(), ENV_GEMINI_API_KEY, env)?;
    let generative = GenerativeConfig::new(
        resolve_string_with_default(
            args.base_url.clone(),
            ENV_GEMINI_BASE_URL,
            env,
            DEFAULT_GEMINI_BASE_URL,
        ),
        resolve_string_with_default(
            args.model.clone(),
            ENV_GEMINI_MODEL,
            env,
            DEFAULT_GEMINI_MODEL,
        ),
    )?;

    Ok(AppConfig {
        mode,
        interval,
        history,
        api_key,
        generative,
        identity: ExportIdentity::default(),
        start_time: SystemTime::now(),
    })
}

async fn run_session<A>(
    analyzer: A,
    cfg: AppConfig,
    duration_secs: u64,
    want_insights: bool,
) -> anyhow::Result<()>
where
    A: EmotionAnalyzer + Clone + 'static,
{
    let sampler = Sampler::new(
        SyntheticObserver,
        analyzer.clone(),
        SamplerConfig::from_app(&cfg),
    );
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(sampler.run(events_tx, shutdown_rx));

    let mut recorder = SessionRecorder::new(cfg.start_time, cfg.history);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async move {
        match duration_secs {
            0 => std::future::pending().await,
            secs => tokio::time::sleep(Duration::from_secs(secs)).await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupt received, ending session");
                break;
            }
            _ = &mut deadline => {
                tracing::info!(duration_secs, "session duration reached");
                break;
            }
            event = events_rx.recv() => match event {
                Some(event) => {
                    print_event(&event);
                    recorder.apply(&event);
                }
                None => break,
            },
        }
    }

    let _ = shutdown_tx.send(true);
    drop(events_rx);
    let report = task.await.context("sampler task failed")?;
    recorder.clear_current();

    match recorder.summary(SystemTime::now()) {
        Some(summary) => print_summary(&summary, &report),
        None => tracing::info!("no readings recorded"),
    }

    if want_insights {
        if let Some(stats) = recorder.stats(SystemTime::now()) {
            match analyzer.session_insights(stats).await {
                Ok(insights) => print_insights(&insights),
                Err(e) => tracing::warn!(error = %e, "session report unavailable"),
            }
        }
    }

    Ok(())
}

async fn run_export(args: ExportArgs, env: &impl Env) -> anyhow::Result<()> {
    let format: ExportFormat = args.format.parse()?;
    let api_key = resolve_api_key(args.api_key.clone(), ENV_GEMINI_API_KEY, env)?;
    let generative = GenerativeConfig::new(
        resolve_string_with_default(
            args.base_url.clone(),
            ENV_GEMINI_BASE_URL,
            env,
            DEFAULT_GEMINI_BASE_URL,
        ),
        resolve_string_with_default(
            args.model.clone(),
            ENV_GEMINI_MODEL,
            env,
            DEFAULT_GEMINI_MODEL,
        ),
    )?;
    let identity = ExportIdentity {
        name: args
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_owned()),
        email: args
            .email
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPORT_EMAIL.to_owned()),
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let now = Local::now();

    let archive = match select_analyzer(api_key, &generative, args.offline)? {
        SelectedAnalyzer::Canned(analyzer) => {
            demo_archive(&mut rng, now, &identity, &analyzer).await
        }
        SelectedAnalyzer::Generative(analyzer) => {
            demo_archive(&mut rng, now, &identity, &analyzer).await
        }
    };

    let rendered = render(&archive, format)?;
    println!("{rendered}");
    tracing::info!(
        file = format.file_name(),
        mime = format.mime_type(),
        "export rendered"
    );

    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Facial { reading, synthetic } => {
            let marker = if *synthetic { " (fallback)" } else { "" };
            println!(
                "[facial] {} {}%{} - {}",
                reading.emotion,
                reading.confidence.get(),
                marker,
                reading.analysis
            );
        }
        SessionEvent::Voice { reading, synthetic } => {
            let marker = if *synthetic { " (fallback)" } else { "" };
            println!(
                "[voice] {} {}% stress {}/10 engagement {}/10{}",
                reading.sentiment,
                reading.confidence.get(),
                reading.stress.get(),
                reading.engagement.get(),
                marker
            );
        }
    }
}

fn print_summary(summary: &SessionSummary, report: &SamplerReport) {
    println!();
    println!("Session summary");
    println!("  duration: {} min", summary.duration_minutes);
    println!("  readings: {}", summary.total_detections);
    println!("  dominant emotion: {}", summary.dominant_emotion);
    println!("  average confidence: {}%", summary.avg_confidence);
    println!("  emotion changes: {}", summary.emotion_changes);
    for (emotion, count) in &summary.emotion_distribution {
        println!("    {emotion}: {count}");
    }
    if let Some(voice) = &summary.voice {
        println!(
            "  voice: {} (stress {:.1}/10, engagement {:.1}/10)",
            voice.dominant_sentiment, voice.avg_stress, voice.avg_engagement
        );
    }
    if report.fallbacks > 0 || report.skipped_ticks > 0 {
        println!(
            "  degraded: {} fallback readings, {} skipped ticks",
            report.fallbacks, report.skipped_ticks
        );
    }
}

fn print_insights(insights: &SessionInsights) {
    println!();
    println!("Session report");
    println!("  {}", insights.summary);
    for line in &insights.insights {
        println!("  insight: {line}");
    }
    for line in &insights.recommendations {
        println!("  recommendation: {line}");
    }
    println!(
        "  social effectiveness {}/10, emotional stability {}/10",
        insights.social_effectiveness.get(),
        insights.emotional_stability.get()
    );
}
