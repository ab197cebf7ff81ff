// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask Polygon Editor
//!
//! A desktop application that traces binary masks into polygons, lets the
//! user refine them over the source images and exports the result as JSON.

mod app;
mod config;
mod editor;
mod io;
mod models;
mod ui;
mod util;
mod vision;

use anyhow::Result;
use app::MaskEditorApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Mask Polygon Editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "maskpoly",
        options,
        Box::new(|cc| Ok(Box::new(MaskEditorApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
