// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project-wide name registry.
//!
//! Every display name maps to one set of shared settings (colour, visibility,
//! optimization mode). Polygons with the same name in different scenes read
//! their settings from here so that edits stay consistent across the project.

use super::polygon::{OptimizationMode, Rgb};
use std::collections::BTreeMap;

/// Palette used for names without a semantic colour.
pub const DEFAULT_PALETTE: [Rgb; 9] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 165, 0],
    [128, 0, 128],
    [0, 128, 128],
];

/// Keywords that force a colour when they appear in a name.
pub const SEMANTIC_COLORS: [(&str, Rgb); 5] = [
    ("roof", [255, 0, 0]),
    ("basement", [128, 0, 128]),
    ("floor", [0, 255, 0]),
    ("window", [0, 255, 255]),
    ("wall", [255, 165, 0]),
];

/// Keywords that default a name to rectangle fitting.
pub const RECTANGLE_KEYWORDS: [&str; 1] = ["window"];

/// Colour shown for names that are not registered at all.
pub const FALLBACK_COLOR: Rgb = [128, 128, 128];

/// Settings shared by every polygon carrying the same display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameSettings {
    pub color: Rgb,
    pub visible: bool,
    pub mode: OptimizationMode,
}

impl Default for NameSettings {
    fn default() -> Self {
        Self {
            color: FALLBACK_COLOR,
            visible: true,
            mode: OptimizationMode::default(),
        }
    }
}

/// Semantic colour for a name, if any keyword matches.
pub fn semantic_color(name: &str) -> Option<Rgb> {
    let lower = name.to_lowercase();
    SEMANTIC_COLORS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, color)| *color)
}

/// Mode a freshly discovered name starts with.
pub fn default_mode_for(name: &str) -> OptimizationMode {
    let lower = name.to_lowercase();
    if RECTANGLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        OptimizationMode::Rectangle
    } else {
        OptimizationMode::Balanced
    }
}

/// Mapping from display name to shared settings.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    entries: BTreeMap<String, NameSettings>,
    palette_cursor: usize,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&NameSettings> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameSettings)> {
        self.entries.iter().map(|(name, settings)| (name.as_str(), settings))
    }

    /// Register `name` if unseen and return its settings.
    ///
    /// New names get a colour by priority: semantic keyword, then the next
    /// unused palette entry. `mode` overrides the keyword default.
    pub fn register(&mut self, name: &str, mode: Option<OptimizationMode>) -> NameSettings {
        if let Some(settings) = self.entries.get(name) {
            return *settings;
        }
        let color = match semantic_color(name) {
            Some(color) => color,
            None => self.next_palette_color(),
        };
        let settings = NameSettings {
            color,
            visible: true,
            mode: mode.unwrap_or_else(|| default_mode_for(name)),
        };
        self.entries.insert(name.to_string(), settings);
        settings
    }

    /// First palette colour not used by any entry, cycling once all are taken.
    fn next_palette_color(&mut self) -> Rgb {
        let unused = DEFAULT_PALETTE
            .iter()
            .find(|c| !self.entries.values().any(|s| s.color == **c))
            .copied();
        match unused {
            Some(color) => color,
            None => {
                let color = DEFAULT_PALETTE[self.palette_cursor % DEFAULT_PALETTE.len()];
                self.palette_cursor += 1;
                color
            }
        }
    }

    /// Move the settings of `old` to `new`.
    ///
    /// Refused when `new` is blank, already registered, or `old` is unknown.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if new.trim().is_empty() || old == new || self.contains(new) {
            return false;
        }
        match self.entries.remove(old) {
            Some(settings) => {
                self.entries.insert(new.to_string(), settings);
                true
            }
            None => false,
        }
    }

    pub fn recolor(&mut self, name: &str, color: Rgb) -> bool {
        self.update(name, |s| s.color = color)
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        self.update(name, |s| s.visible = visible)
    }

    pub fn set_mode(&mut self, name: &str, mode: OptimizationMode) -> bool {
        self.update(name, |s| s.mode = mode)
    }

    fn update(&mut self, name: &str, f: impl FnOnce(&mut NameSettings)) -> bool {
        match self.entries.get_mut(name) {
            Some(settings) => {
                f(settings);
                true
            }
            None => false,
        }
    }
}
