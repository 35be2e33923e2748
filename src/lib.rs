#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types outside of crate
pub use app::App;
pub use config::{AppConfig, ModeId, Timeframe};
pub use domain::{Candle, ObZone};
pub use engine::TrainerEngine;

// CLI argument parsing
use clap::Parser;

use crate::config::TRAINER_API;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the detection service
    #[arg(long, env = "ICT_TRAINER_BASE_URL", default_value = TRAINER_API.client.base_url)]
    pub base_url: String,

    /// Pattern mode to open with (fvg, ob, breaker). Unknown ids fall back to the default
    #[arg(long)]
    pub mode: Option<String>,

    /// Initial timeframe (1m, 3m, 5m, 15m, 1h)
    #[arg(long)]
    pub timeframe: Option<Timeframe>,

    /// Instrument symbol sent with every candle request
    #[arg(long, default_value = TRAINER_API.instrument)]
    pub instrument: String,

    /// Max candles kept on the chart
    #[arg(long, default_value_t = TRAINER_API.window)]
    pub window: usize,

    /// HTTP timeout in milliseconds
    #[arg(long, default_value_t = TRAINER_API.client.timeout_ms)]
    pub timeout_ms: u64,
}

impl Cli {
    /// Resolve the process-wide settings handed to every constructor.
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            base_url: self.base_url.trim().to_string(),
            instrument: self.instrument.trim().to_string(),
            window: self.window.max(1),
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Main application entry point - creates the GUI app
/// This is the public API for the binary to call
pub fn run_app(cc: &eframe::CreationContext<'_>, args: Cli) -> anyhow::Result<App> {
    App::new(cc, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_build_the_config() {
        let cli = Cli::parse_from([
            "ict-trainer",
            "--base-url",
            "http://10.0.0.5:9000/ ",
            "--mode",
            "ob",
            "--timeframe",
            "15m",
            "--instrument",
            "EURUSD",
            "--window",
            "0",
        ]);
        assert_eq!(cli.timeframe, Some(Timeframe::M15));
        assert_eq!(cli.mode.as_deref(), Some("ob"));

        let cfg = cli.to_config();
        assert_eq!(cfg.base_url, "http://10.0.0.5:9000/");
        assert_eq!(cfg.instrument, "EURUSD");
        assert_eq!(cfg.window, 1);
        assert_eq!(cfg.endpoint_url("get_candles"), "http://10.0.0.5:9000/get_candles/");
    }

    #[test]
    fn bad_timeframe_is_rejected() {
        assert!(Cli::try_parse_from(["ict-trainer", "--timeframe", "2h"]).is_err());
    }
}
