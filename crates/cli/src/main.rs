mod cli;
mod console;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opsify_core::{
    load_config, load_config_or_default, validate_config, Config, ConversionListener,
    ConversionOrchestrator, FfmpegEngine, TranscodeEngine,
};

use cli::{Cli, Commands, ConvertArgs};
use console::ConsoleListener;

/// Exit code when at least one file failed to convert.
const EXIT_PARTIAL_FAILURE: i32 = 1;

/// Exit code for errors that stopped the run.
const EXIT_FATAL: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick by the verbose flag
    let default_filter = if cli.verbose {
        "opsify_core=debug,opsify_cli=debug,info"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("error: {:#}", e);
            std::process::exit(EXIT_FATAL);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert(args) => {
            apply_overrides(&mut config, &args);
            validate_config(&config).context("Configuration validation failed")?;
            convert(config, args).await
        }
        Commands::CheckTools => {
            validate_config(&config).context("Configuration validation failed")?;
            let engine = FfmpegEngine::new(config.engine);
            engine
                .validate()
                .await
                .context("ffmpeg tools are not usable")?;
            println!(
                "ffmpeg: {}\nffprobe: {}",
                engine.config().ffmpeg_path.display(),
                engine.config().ffprobe_path.display()
            );
            Ok(0)
        }
        Commands::ShowConfig => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            print!("{}", rendered);
            Ok(0)
        }
    }
}

async fn convert(config: Config, args: ConvertArgs) -> Result<i32> {
    let filter = config.media.filter();
    info!(
        "Media extensions: {:?}, parallelism: {}",
        filter.extensions(),
        config.orchestrator.effective_parallelism()
    );

    let orchestrator = ConversionOrchestrator::new(
        config.orchestrator,
        FfmpegEngine::new(config.engine),
        filter,
    );

    let listener: Arc<dyn ConversionListener> = if args.json {
        Arc::new(ConsoleListener::quiet())
    } else {
        Arc::new(ConsoleListener::default())
    };

    let report = orchestrator
        .convert(&args.input, &args.output_dir, &args.format, Some(listener))
        .await
        .with_context(|| format!("Failed to convert {:?}", args.input))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        );
    } else {
        println!(
            "Done: {} converted, {} failed, {} total ({} ms)",
            report.succeeded, report.failed, report.total, report.duration_ms
        );
    }

    Ok(if report.all_succeeded() {
        0
    } else {
        EXIT_PARTIAL_FAILURE
    })
}

/// Loads the config file if one was given, otherwise defaults; env overrides apply to both.
fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => load_config_or_default().context("Failed to load default configuration"),
    }
}

/// Command-line flags take precedence over file and env values.
fn apply_overrides(config: &mut Config, args: &ConvertArgs) {
    if let Some(jobs) = args.jobs {
        config.orchestrator.max_parallel = Some(jobs);
    }
    if let Some(naming) = args.naming() {
        config.orchestrator.naming = naming;
    }
    if let Some(kind) = args.kind {
        config.media.kind = kind.into();
    }
    config
        .media
        .extra_extensions
        .extend(args.extensions.iter().cloned());
}
