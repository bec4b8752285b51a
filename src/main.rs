//! FX & CPI Dashboard - Exchange rate vs consumer price index viewer
//!
//! Loads the national CPI table and the USD/KRW and EUR/KRW rate tables,
//! aligns them on a common time axis and shows them in an egui window.

mod charts;
mod compare;
mod config;
mod data;
mod gui;

use anyhow::Context;
use clap::Parser;
use config::{build_config, CliArgs};
use data::DataLoader;
use eframe::egui;
use gui::DashboardApp;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// FX & CPI Dashboard - exchange rates against consumer prices
#[derive(Parser, Debug)]
#[command(name = "fx_cpi_dashboard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding CPI.csv, USD_KRW.csv and EUR_KRW.csv
    #[arg(short, long, value_name = "DIR", env = "DASHBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DASHBOARD_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<Args> for CliArgs {
    fn from(args: Args) -> Self {
        CliArgs {
            config_file: args.config,
            data_dir: args.data_dir,
            log_level: args.log_level,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: CliArgs = args.into();
    let config = build_config(&cli_args).context("failed to build configuration")?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("FX & CPI Dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        data_dir = %config.data.dir.display(),
        parse_policy = %config.data.parse_policy,
        log_level = %config.log_level,
        "Dashboard configuration loaded"
    );

    let loader = DataLoader::from_config(&config.data)?;

    let title = config.window.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([900.0, 600.0])
            .with_title(title.as_str()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, loader)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
