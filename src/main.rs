//! Deviation Dashboard - Production & quality deviation analysis
//!
//! Opens the desktop dashboard by default; `report` and `summary` run a
//! single request headless.

use anyhow::Context;
use clap::{Parser, Subcommand};
use deviation_dashboard::gui::DashboardApp;
use deviation_dashboard::report::write_report;
use deviation_dashboard::{logging, DashboardConfig, DashboardService, RangeRequest};
use eframe::egui;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "deviation-dashboard")]
#[command(about = "Planned vs. actual production and quality dashboard")]
#[command(version)]
struct Cli {
    /// Path to config file (default: dashboard.json in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset to load (overrides the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the desktop dashboard
    Gui,
    /// Write a standalone HTML report
    Report {
        /// Output file path
        #[arg(long)]
        output: PathBuf,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Open the report in the default browser when done
        #[arg(long)]
        open: bool,
    },
    /// Print the filtered view as JSON
    Summary {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = DashboardConfig::discover(cli.config.as_deref(), &cwd)?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    info!(data = %config.data_path.display(), "configuration loaded");

    let service = DashboardService::new(config);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => run_gui(service),
        Commands::Report {
            output,
            start,
            end,
            open,
        } => {
            let view = service
                .handle(&RangeRequest::new(start, end))
                .with_context(|| format!("failed to load {}", service.data_path().display()))?;
            write_report(&view, &output, service.config().theme)?;
            println!("Report written to {}", output.display());

            if open {
                open::that(&output)
                    .with_context(|| format!("failed to open {}", output.display()))?;
            }
            Ok(())
        }
        Commands::Summary { start, end } => {
            let view = service
                .handle(&RangeRequest::new(start, end))
                .with_context(|| format!("failed to load {}", service.data_path().display()))?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
    }
}

fn run_gui(service: DashboardService) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Deviation Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Deviation Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, service)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
