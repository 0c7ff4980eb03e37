// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod drivers;
mod engine;
mod gui;
mod types;
use anyhow::{anyhow, Context};
use config::MonitorConfig;
use eframe::egui;
use egui::IconData;
use log::{info, warn};
use std::path::Path;
fn load_app_icon(path: &Path) -> anyhow::Result<IconData> {
    let dyn_img = image::open(path).with_context(|| format!("loading icon {}", path.display()))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(IconData {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}
// Entry point
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = MonitorConfig::from_env()?;
    info!(
        "Capturing {} samples per chunk at {} Hz, refresh every {} ms ({:?} source)",
        config.chunk_size, config.sample_rate_hz, config.refresh_interval_ms, config.source
    );
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size(config.window_size)
        .with_min_inner_size([640.0, 420.0])
        .with_title(config.window_title.clone());
    let icon = config.icon_path.as_deref().map(load_app_icon).transpose();
    let viewport = match icon {
        Ok(Some(icon)) => viewport.with_icon(icon),
        Ok(None) => viewport,
        Err(err) => {
            warn!("{err:#}");
            viewport
        }
    };
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Box::new(gui::EegMonitorApp::new(config))),
    )
    .map_err(|err| anyhow!("window failed: {err}"))
}
