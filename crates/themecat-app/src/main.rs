//! themecat command-line entry point.
//!
//! Loads `themecat.toml`, wires the catalog service to the on-disk bundle,
//! the on-disk catalog, and the theme server, initializes it, and runs one
//! command.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};

use themecat_net::HttpTransport;
use themecat_skin::{
    CatalogEvent, Observer, PublishedState, ThemeConfig, ThemeService, Toast, VfsBundle,
    VfsCatalogStore,
};
use themecat_vfs::RealVfs;

/// Reports service notifications through the log.
struct LogObserver;

impl Observer for LogObserver {
    fn on_event(&mut self, event: &CatalogEvent) {
        match event {
            CatalogEvent::DeviceError(err) => log::error!("Device error: {err}"),
            other => log::debug!("{other:?}"),
        }
    }

    fn on_publish(&mut self, state: &PublishedState) {
        log::debug!(
            "Now showing {}/{}",
            state.theme().header.name,
            state.skin().header.name
        );
    }

    fn on_success(&mut self, toast: &Toast) {
        log::info!("{}: {}", toast.title, toast.message);
    }
}

fn build_service(config: &ThemeConfig) -> ThemeService {
    let store = VfsCatalogStore::new(
        RealVfs::new(&config.catalog.root),
        config.catalog.file.clone(),
        config.default_catalog(),
    );
    let bundle = VfsBundle::new(
        RealVfs::new(&config.resources.root),
        config.resources.base_url.clone(),
    );
    let transport = HttpTransport::with_timeouts(config.timeouts());
    let mut service = ThemeService::new(store, bundle, transport)
        .with_placeholder_policy(config.placeholder_policy());
    service.subscribe(LogObserver);
    service
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let invocation = commands::parse_args(std::env::args().skip(1))?;

    // Config path from --config, THEMECAT_CONFIG, or ./themecat.toml.
    let config_path = invocation
        .config
        .clone()
        .or_else(|| std::env::var_os("THEMECAT_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("themecat.toml"));
    let config = ThemeConfig::load(&config_path)?;
    log::info!(
        "Starting themecat (bundle {}, catalog {}{})",
        config.resources.root,
        config.catalog.root,
        config.catalog.file
    );

    let mut service = build_service(&config);
    service
        .init(&config.bootstrap)
        .context("theme service failed to initialize")?;

    for line in commands::run(&invocation.command, &mut service)? {
        println!("{line}");
    }
    Ok(())
}
