// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor settings.
//!
//! Interaction radii and display options. Settings are persisted between
//! runs through eframe's storage; missing or unreadable values fall back to
//! the defaults.

use serde::{Deserialize, Serialize};

/// Storage key used with `eframe::get_value` / `eframe::set_value`.
pub const STORAGE_KEY: &str = "maskpoly.settings";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Screen distance within which a vertex or edge counts as hovered.
    pub hover_radius: f64,
    /// Screen distance within which dragged vertices snap.
    pub snap_radius: f64,
    /// Drawn vertex radius.
    pub vertex_radius: f32,
    /// Polygon outline width.
    pub line_width: f32,
    /// Zoom factor applied per wheel notch.
    pub zoom_step: f64,
    /// Snap dragged vertices onto extensions of existing edges.
    pub smart_snap: bool,
    /// Draw the fine reference outline under each polygon.
    pub show_reference: bool,
    /// Maximum number of undo steps kept.
    pub history_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            hover_radius: 10.0,
            snap_radius: 12.0,
            vertex_radius: 6.0,
            line_width: 2.0,
            zoom_step: 1.15,
            smart_snap: true,
            show_reference: false,
            history_limit: 200,
        }
    }
}
