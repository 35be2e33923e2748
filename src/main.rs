#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Windows release: hide console window
use ict_trainer::{Cli, run_app};

use {clap::Parser, eframe::NativeOptions, std::panic};

fn main() -> eframe::Result {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Error)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("ict_trainer"), my_code_level)
        .init();

    let args = Cli::parse();
    let options = NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("ICT Trainer - Spot it. Tag it. Check it."),
        ..Default::default()
    };

    eframe::run_native(
        "ICT Trainer",
        options,
        Box::new(move |cc| Ok(Box::new(run_app(cc, args)?))),
    )
}
