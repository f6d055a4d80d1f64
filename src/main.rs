use anyhow::{Context, Result};
use repurpose::{
    cli::{output::Output, Cli, Commands},
    utils::toml_config::RepurposeConfig,
    Provider, ResearchCoordinator,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &RepurposeConfig, cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else {
        config.logging.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = cli.log_json || config.logging.json;

    // Logs go to stderr; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| {
            fmt::layer()
                .with_target(true)
                .with_ansi(!cli.no_color)
                .with_writer(std::io::stderr)
        }))
        .init();
}

async fn run_analyze(
    config: &RepurposeConfig,
    output: &Output,
    query: &str,
    destination: Option<PathBuf>,
    compact: bool,
) -> Result<()> {
    config
        .require_api_key()
        .context("Gemini credential is required for analysis")?;

    let llm = Provider::Gemini(config.gemini_config()).create_client()?;
    let coordinator = ResearchCoordinator::new(llm, config.refine.passes);

    output.info(&format!("Analyzing: {}", query));
    let report = coordinator.analyze(query).await?;

    let rendered = if compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };

    match destination {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            output.report_summary(&report);
            output.success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn run_config(config: &RepurposeConfig, output: &Output, path: &Path, validate: bool) -> Result<()> {
    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("model", &config.provider.model);
    output.kv("base_url", &config.provider.base_url);
    output.kv("api_key_env", &config.provider.api_key_env);
    output.kv("max_attempts", &config.retry.max_attempts.to_string());
    output.kv("initial_backoff_ms", &config.retry.initial_backoff_ms.to_string());
    output.kv("refine_passes", &config.refine.passes.to_string());
    output.kv("log_level", &config.logging.log_level);

    if validate {
        let warnings = config.validate_with_warnings()?;
        for warning in &warnings {
            output.warning(&warning.message);
        }
        output.success("Configuration is valid");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = match RepurposeConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("Failed to load {}: {}", cli.config.display(), e));
            return Err(e.into());
        }
    };

    init_tracing(&config, &cli);
    tracing::debug!(config = %cli.config.display(), "Configuration loaded");

    let result = match cli.command {
        Commands::Analyze {
            query,
            output: destination,
            compact,
        } => run_analyze(&config, &output, &query, destination, compact).await,
        Commands::Config { validate } => run_config(&config, &output, &cli.config, validate),
    };

    if let Err(e) = &result {
        output.error(&format!("{:#}", e));
    }
    result
}
