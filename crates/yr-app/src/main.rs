//! Main application entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yr_data::ReportConfig;

mod replay;
mod slideshow;

/// Year in review slideshow
#[derive(Parser, Debug)]
#[command(name = "yearreview")]
struct CliArgs {
    /// Run a gesture script headless and print one JSON record per step
    #[arg(long, value_name = "SCRIPT")]
    replay: Option<PathBuf>,

    /// Configuration file; defaults are used when omitted
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ReportConfig::load_or_default(args.config.as_deref())?;

    if let Some(script) = args.replay {
        let steps = replay::load_script(&script)?;
        for record in replay::run_replay(&config.settings.navigation, &steps) {
            println!("{}", serde_json::to_string(&record)?);
        }
        return Ok(());
    }

    info!(
        pages = config.settings.navigation.total_pages,
        cooldown_ms = config.settings.navigation.cooldown_ms,
        "Starting year in review"
    );

    // Initialize tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([540.0, 960.0])
            .with_min_inner_size([360.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Year in Review",
        options,
        Box::new(move |_cc| Box::new(slideshow::SlideshowApp::new(config, runtime))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
