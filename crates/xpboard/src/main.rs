//! xpboard - GraphQL XP dashboard

mod cli;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use xpboard_core::client::DashboardClient;
use xpboard_core::config::PaletteSetting;
use xpboard_core::{
    AuthProvider, CycleResult, DashboardConfig, DashboardEvent, HttpTransport, RefreshScheduler,
    RenderCoordinator, StatsEngine, SvgFileTarget, TokenAuth,
};

#[derive(Parser)]
#[command(
    name = "xpboard",
    version,
    about = "GraphQL XP dashboard",
    long_about = "Fetches your profile, XP transactions, project progress and cohort levels\n\
                  from the school GraphQL API and renders them as SVG charts.\n\
                  \n\
                  Examples:\n\
                    xpboard render                   # Write every chart once\n\
                    xpboard render -o ./charts       # Custom output directory\n\
                    xpboard watch --interval 30      # Re-render every 30 seconds\n\
                    xpboard stats                    # Print summary table\n\
                    xpboard stats --json             # Summary as JSON\n\
                    xpboard config --init            # Write a default config file\n\
                  \n\
                  Environment Variables:\n\
                    XPBOARD_TOKEN                    # JWT issued by the sign-in endpoint\n\
                    XPBOARD_ENDPOINT                 # Override GraphQL endpoint\n\
                    XPBOARD_CONFIG                   # Override config file path\n\
                    XPBOARD_OUTPUT                   # Override output directory\n\
                    XPBOARD_NO_COLOR                 # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: xpboard=info)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// JWT used as bearer token
    #[arg(long, env = "XPBOARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GraphQL endpoint (overrides config)
    #[arg(long, env = "XPBOARD_ENDPOINT")]
    endpoint: Option<String>,

    /// Config file (default: <config dir>/xpboard/config.toml)
    #[arg(long, env = "XPBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Output directory for SVG files (overrides config)
    #[arg(long, short = 'o', env = "XPBOARD_OUTPUT")]
    output: Option<PathBuf>,

    /// Built-in palette name: default | high-contrast
    #[arg(long)]
    palette: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "XPBOARD_NO_COLOR")]
    no_color: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Render every chart once and exit (default)
    Render,
    /// Render, then refresh on a timer until Ctrl-C
    Watch {
        /// Refresh interval in seconds (overrides config)
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },
    /// Print the profile summary and exit
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config_path = cli
        .config
        .clone()
        .or_else(DashboardConfig::default_path)
        .context("Could not determine config directory; pass --config")?;
    let config = effective_config(&cli, &config_path)?;

    match cli.mode.unwrap_or(Mode::Render) {
        Mode::Render => run_render(config, cli.token, cli.no_color).await,
        Mode::Watch { interval } => {
            let mut config = config;
            if let Some(secs) = interval {
                if secs == 0 {
                    bail!("--interval must be positive");
                }
                config.refresh_interval_secs = secs;
            }
            run_watch(config, cli.token, cli.no_color).await
        }
        Mode::Stats { json } => run_stats(config, cli.token, json, cli.no_color).await,
        Mode::Config { init } => run_config(config, config_path, init),
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose {
        "xpboard=debug,xpboard_core=debug"
    } else {
        "xpboard=info,xpboard_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Config file, then flags and environment on top
fn effective_config(cli: &Cli, path: &std::path::Path) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load_or_default(path);
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(palette) = &cli.palette {
        config.palette = PaletteSetting::Named(palette.clone());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn token_auth(token: Option<String>) -> Result<Arc<TokenAuth>> {
    let token = token.context("No token: pass --token or set XPBOARD_TOKEN")?;
    let auth = Arc::new(TokenAuth::new(token));
    if !auth.is_authenticated() {
        bail!("Token is malformed or expired; sign in again");
    }
    if auth.is_expiring(300) {
        warn!("Token expires in less than 5 minutes");
    }
    Ok(auth)
}

fn build_coordinator(config: &DashboardConfig, auth: Arc<TokenAuth>) -> Result<RenderCoordinator> {
    let transport = HttpTransport::new(&config.endpoint, auth.clone(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    let target = SvgFileTarget::new(&config.output_dir);
    Ok(RenderCoordinator::from_config(
        config,
        Arc::new(transport),
        auth,
        Arc::new(target),
    ))
}

fn spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

async fn run_render(config: DashboardConfig, token: Option<String>, no_color: bool) -> Result<()> {
    let start = Instant::now();
    let auth = token_auth(token)?;
    let coordinator = build_coordinator(&config, auth)?;

    let spinner = spinner()?;
    spinner.set_message("Fetching profile, transactions and progress...");

    match coordinator.load().await {
        Ok(CycleResult::Rendered(report)) => {
            spinner.finish_with_message(format!(
                "✓ Rendered {}/{} charts into {} in {:.2}s",
                report.rendered_count(),
                report.slots.len(),
                config.output_dir.display(),
                start.elapsed().as_secs_f64()
            ));
            cli::print_report(&report, no_color);
            Ok(())
        }
        Ok(CycleResult::Superseded { .. }) => {
            spinner.finish_and_clear();
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e).context("Dashboard load failed")
        }
    }
}

async fn run_watch(config: DashboardConfig, token: Option<String>, no_color: bool) -> Result<()> {
    let auth = token_auth(token)?;
    let coordinator = Arc::new(build_coordinator(&config, auth)?);
    let mut events = coordinator.event_bus().subscribe();

    match coordinator.load().await {
        Ok(result) => {
            if let Some(report) = result.report() {
                cli::print_report(report, no_color);
            }
        }
        Err(e) if e.is_auth_failure() => return Err(e).context("Dashboard load failed"),
        // Shown by the target; the scheduler retries
        Err(e) => warn!(error = %e, "Initial load failed"),
    }

    let scheduler = RefreshScheduler::start(Arc::clone(&coordinator), config.refresh_interval());
    println!(
        "Watching: charts in {} refresh every {}s (Ctrl-C to stop)",
        config.output_dir.display(),
        config.refresh_interval_secs
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(DashboardEvent::CycleCompleted { generation, rendered }) => {
                    println!(
                        "[{}] cycle {} rendered {} charts",
                        chrono::Local::now().format("%H:%M:%S"),
                        generation,
                        rendered
                    );
                }
                Ok(DashboardEvent::LoadFailed(message)) => {
                    eprintln!("Refresh failed: {}", message);
                }
                Ok(DashboardEvent::LoggedOut) => {
                    scheduler.stop().await;
                    bail!("Session expired; sign in again and restart");
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event stream lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    scheduler.stop().await;
    Ok(())
}

async fn run_stats(
    config: DashboardConfig,
    token: Option<String>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let auth = token_auth(token)?;
    let transport = HttpTransport::new(&config.endpoint, auth, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let client = DashboardClient::with_ttl(
        Arc::new(transport),
        config.cohorts.event_ids(),
        config.cache_ttl(),
    );

    let (snapshot, malformed) = client
        .fetch_snapshot()
        .await
        .context("Failed to fetch dashboard data")?;
    if !malformed.is_empty() {
        warn!(skipped = malformed.len(), "Malformed records skipped");
    }

    let stats = StatsEngine::new(config.palette(), config.cohorts.clone());
    let summary = stats.summarize(&snapshot, chrono::Utc::now());

    if json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", out);
    } else {
        cli::print_summary(&summary, no_color);
    }
    Ok(())
}

fn run_config(config: DashboardConfig, path: PathBuf, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            println!("Config already exists at: {}", path.display());
            return Ok(());
        }
        DashboardConfig::default().save(&path)?;
        println!("✓ Wrote default config to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
