use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiClient;
use crate::app::App;
use crate::config::KeyResolver;
use crate::registry::{ScreenContext, ScreenRegistry};

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod listing;
mod registry;
mod screens;
mod search;
mod service;
mod theme;
mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazyflow");

    let args = cli::Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config::loader::validate(&config)?;
    let config = Arc::new(config);

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);
    let client = ApiClient::new(&config.api)?;
    info!(base_url = %config.api.web_base_url, "Configured API client");

    let mut registry = ScreenRegistry::new();
    screens::register_all(&mut registry);

    let mut app = App::new(registry, ScreenContext::new(config, client, resolver), theme);
    if let Some(screen) = &args.screen {
        app.open_screen(screen)?;
    }
    app.run().await?;

    info!("Exiting lazyflow");
    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazyflow").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazyflow.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
