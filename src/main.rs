mod api;
mod app;
mod application;
mod cli;
mod config;
mod domain;
mod headless;
mod logging;
mod ui;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands, FetchArgs};
use iced::{window, Size};

fn main() -> ExitCode {
    logging::init_logging();

    let cli = Cli::parse();
    let loaded = match cli.config {
        Some(path) => config::load_from_sources(path),
        None => config::load(),
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Fetch(args)) => run_headless(args, settings),
        None => run_gui(settings),
    }
}

fn run_headless(args: FetchArgs, settings: config::AppConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(headless::run(args, settings)) {
        Ok(run) if run.retry_urls().is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_gui(settings: config::AppConfig) -> ExitCode {
    let result = iced::application(
        move || app::DownloadApp::new(settings.clone()),
        app::update,
        app::view,
    )
    .title("HTML File Downloader")
    .window(window::Settings {
        size: Size::new(800.0, 900.0),
        ..Default::default()
    })
    .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "GUI exited with an error");
            ExitCode::FAILURE
        }
    }
}
