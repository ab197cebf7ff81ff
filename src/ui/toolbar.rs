// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar: scene navigation, view commands, snapping and crop controls.

use crate::config::EditorSettings;
use crate::editor::crop::{AspectRatio, CropTool};

/// Command requested from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    PrevScene,
    NextScene,
    ZoomIn,
    ZoomOut,
    Fit,
    BeginCrop,
    SetRatio(AspectRatio),
    ApplyCrop,
    CancelCrop,
    ClearCrop,
}

/// Display the toolbar. Display toggles are written to `settings` directly.
pub fn show(
    ui: &mut egui::Ui,
    settings: &mut EditorSettings,
    crop: &CropTool,
    has_crop: bool,
    scene: Option<(usize, usize, String)>,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_scene = scene.is_some();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(has_scene, egui::Button::new("◀")).clicked() {
            action = ToolbarAction::PrevScene;
        }
        match &scene {
            Some((index, count, name)) => ui.label(format!("{} / {}  {}", index + 1, count, name)),
            None => ui.label(egui::RichText::new("No folder open").weak()),
        };
        if ui.add_enabled(has_scene, egui::Button::new("▶")).clicked() {
            action = ToolbarAction::NextScene;
        }

        ui.separator();

        if ui.add_enabled(has_scene, egui::Button::new("➖")).clicked() {
            action = ToolbarAction::ZoomOut;
        }
        if ui.add_enabled(has_scene, egui::Button::new("Fit")).clicked() {
            action = ToolbarAction::Fit;
        }
        if ui.add_enabled(has_scene, egui::Button::new("➕")).clicked() {
            action = ToolbarAction::ZoomIn;
        }

        ui.separator();

        ui.checkbox(&mut settings.smart_snap, "Smart snap");
        ui.checkbox(&mut settings.show_reference, "Reference outline");

        ui.separator();

        if crop.active {
            egui::ComboBox::from_id_source("crop_ratio")
                .selected_text(crop.ratio.to_string())
                .show_ui(ui, |ui| {
                    for ratio in AspectRatio::ALL {
                        if ui.selectable_label(crop.ratio == ratio, ratio.to_string()).clicked() {
                            action = ToolbarAction::SetRatio(ratio);
                        }
                    }
                });
            if ui.button("✔ Apply crop").clicked() {
                action = ToolbarAction::ApplyCrop;
            }
            if ui.button("✖ Cancel").clicked() {
                action = ToolbarAction::CancelCrop;
            }
        } else {
            if ui.add_enabled(has_scene, egui::Button::new("✂ Crop")).clicked() {
                action = ToolbarAction::BeginCrop;
            }
            if ui.add_enabled(has_crop, egui::Button::new("Clear crop")).clicked() {
                action = ToolbarAction::ClearCrop;
            }
        }

        ui.separator();

        let hint = if crop.active {
            "Drag corners to resize, inside to move"
        } else {
            "Click an object to select, drag vertices, Ctrl+click an edge to add, right-click to delete"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
