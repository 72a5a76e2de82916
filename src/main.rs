//! Course Revenue Simulator
//!
//! Web form and CLI for sweeping a course's price through a pre-trained
//! revenue model and reporting the revenue-maximizing price.
//!
//! # Usage
//!
//! ```bash
//! # Serve the form on the configured address
//! course-revenue-sim serve --addr 127.0.0.1:8080
//!
//! # One-off simulation on the terminal
//! course-revenue-sim simulate --category Development \
//!     --subcategory "Web Development" --level Beginner --format table
//!
//! # Browse the catalog
//! course-revenue-sim catalog Development
//! ```
//!
//! # Environment Variables
//!
//! - `REVSIM_CONFIG`: Path to the TOML config (default: `./simulator.toml`)
//! - `REVSIM_CORS_ORIGINS`: Comma-separated origins allowed to call the API
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use course_revenue_sim::api::create_app;
use course_revenue_sim::catalog::Catalog;
use course_revenue_sim::config::defaults;
use course_revenue_sim::render;
use course_revenue_sim::{
    CourseForm, RunError, SimulationError, SimulatorConfig, SimulatorContext,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "course-revenue-sim")]
#[command(about = "Course price sweep revenue simulator")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML config (overrides REVSIM_CONFIG and ./simulator.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Serve the simulator form and JSON API (default)
    Serve {
        /// Override the server address (default: "0.0.0.0:8080")
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Run one simulation and print the result
    Simulate {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        level: Option<String>,
        #[arg(long, default_value_t = defaults::FORM_TOTAL_HOURS)]
        total_hours: f64,
        #[arg(long, default_value_t = defaults::FORM_LECTURE_COUNT)]
        lectures: u32,
        #[arg(long, default_value = defaults::FORM_TITLE)]
        title: String,
        #[arg(long, default_value = defaults::FORM_HEADLINE)]
        headline: String,
        #[arg(long, default_value_t = defaults::FORM_RATING)]
        rating: f64,
        #[arg(long, default_value_t = defaults::FORM_REVIEW_COUNT)]
        reviews: u64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List course types, or the subcategories of one type
    Catalog {
        category: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Svg,
}

// ============================================================================
// Logging
// ============================================================================

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logs go to stderr so `simulate --format json|svg` output stays clean.
fn init_logging(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_server(config: &SimulatorConfig, addr_override: Option<String>) -> Result<()> {
    let ctx = SimulatorContext::from_config(config).context("Failed to initialize simulator")?;
    let server_addr = addr_override.unwrap_or_else(|| config.server.addr.clone());

    let app = create_app(ctx);
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;

    info!("✓ HTTP server listening on {}", server_addr);
    info!("Simulator form available at: http://{}", server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down...");
        })
        .await
        .context("HTTP server error")?;

    info!("✓ Shutdown complete");
    Ok(())
}

async fn run_simulate(config: &SimulatorConfig, form: CourseForm, format: OutputFormat) -> Result<ExitCode> {
    let ctx = SimulatorContext::from_config(config).context("Failed to initialize simulator")?;
    let course = form.resolve().context("Invalid course description")?;

    let sim = match ctx.run(&course).await {
        Ok(sim) => sim,
        Err(RunError::Simulation(SimulationError::SelectionIncomplete { .. })) => {
            eprintln!("{}", render::INCOMPLETE_NOTICE);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e).context("Simulation failed"),
    };

    let currency = &ctx.display.currency;
    match format {
        OutputFormat::Table => {
            println!("{:>12}  {:>18}", format!("Price ({currency})"), format!("Revenue ({currency})"));
            for (i, p) in sim.curve.points().iter().enumerate() {
                let marker = if i == sim.optimum.index { "  <- optimum" } else { "" };
                println!("{:>12.2}  {:>18}{marker}", p.price, render::format_money(p.revenue));
            }
            println!();
            println!("{}", render::optimum_summary(&sim.optimum, currency));
        }
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(&sim).context("Failed to serialize simulation")?;
            println!("{text}");
        }
        OutputFormat::Svg => {
            print!("{}", render::revenue_chart_svg(&sim.curve, &sim.optimum, currency));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_catalog(config: &SimulatorConfig, category: Option<&str>) -> Result<()> {
    let catalog = Catalog::load(&config.catalog.path).context("Failed to load catalog")?;
    match category {
        Some(name) => {
            for sub in catalog.subcategories_by_name(name) {
                println!("{sub}");
            }
        }
        None => {
            for course_type in Catalog::course_types() {
                println!("{course_type} ({} subcategories)", catalog.subcategories(*course_type).len());
            }
        }
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();

    // Config warnings are reported before the JSON choice is known.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let (config, source) = tracing::subscriber::with_default(bootstrap, || {
        SimulatorConfig::load(args.config.as_deref())
    })
    .context("Failed to load simulator configuration")?;

    init_logging(args.log_json || config.logging.json);
    info!(source = %source, "Configuration loaded");

    match args.command.unwrap_or(SubCommand::Serve { addr: None }) {
        SubCommand::Serve { addr } => {
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            info!("  {}", config.display.page_title);
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            run_server(&config, addr).await?;
            Ok(ExitCode::SUCCESS)
        }
        SubCommand::Simulate {
            category,
            subcategory,
            level,
            total_hours,
            lectures,
            title,
            headline,
            rating,
            reviews,
            format,
        } => {
            let form = CourseForm {
                category,
                subcategory,
                level,
                total_hours,
                lecture_count: lectures,
                title,
                headline,
                rating,
                review_count: reviews,
            };
            run_simulate(&config, form, format).await
        }
        SubCommand::Catalog { category } => {
            run_catalog(&config, category.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
