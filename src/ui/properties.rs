// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Object catalog panel.
//!
//! Lists every project name as seen from the active scene. Present rows can
//! be selected; every row can be renamed, recoloured, hidden or switched to
//! another optimization mode, which applies project-wide.

use crate::models::polygon::{OptimizationMode, Rgb};
use crate::models::project::Project;
use crate::models::scene::CatalogEntry;

/// Result of properties panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    Select(usize),
    Rename { old: String, new: String },
    Recolor { name: String, color: Rgb },
    SetVisible { name: String, visible: bool },
    SetMode { name: String, mode: OptimizationMode },
}

/// In-progress rename of one catalog name.
#[derive(Debug, Clone, Default)]
pub struct RenameDraft {
    target: Option<String>,
    text: String,
    focus: bool,
}

impl RenameDraft {
    fn start(&mut self, name: &str) {
        self.target = Some(name.to_string());
        self.text = name.to_string();
        self.focus = true;
    }

    fn is_editing(&self, name: &str) -> bool {
        self.target.as_deref() == Some(name)
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.text.clear();
    }
}

/// Display the catalog for `scene_idx` and report what the user changed.
pub fn show(
    ui: &mut egui::Ui,
    project: &Project,
    scene_idx: usize,
    selected: Option<usize>,
    draft: &mut RenameDraft,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Objects");
    ui.label(egui::RichText::new("Double-click a name to rename it").weak().small());
    ui.separator();

    let entries = project.catalog(scene_idx);
    if entries.is_empty() {
        ui.label(egui::RichText::new("No objects").italics().weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (row, entry) in entries.iter().enumerate() {
            let row_action = show_row(ui, row, entry, project, scene_idx, selected, draft);
            if row_action != PropertiesAction::None {
                action = row_action;
            }
        }
    });

    action
}

fn show_row(
    ui: &mut egui::Ui,
    row: usize,
    entry: &CatalogEntry,
    project: &Project,
    scene_idx: usize,
    selected: Option<usize>,
    draft: &mut RenameDraft,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;
    let name = entry.name();
    let settings = *entry.settings();

    ui.horizontal(|ui| {
        let mut visible = settings.visible;
        if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
            action = PropertiesAction::SetVisible {
                name: name.to_string(),
                visible,
            };
        }

        let mut color = settings.color;
        if ui.color_edit_button_srgb(&mut color).changed() {
            action = PropertiesAction::Recolor {
                name: name.to_string(),
                color,
            };
        }

        if draft.is_editing(name) {
            let response = ui.text_edit_singleline(&mut draft.text);
            if draft.focus {
                response.request_focus();
                draft.focus = false;
            }
            if response.lost_focus() {
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = PropertiesAction::Rename {
                        old: name.to_string(),
                        new: draft.text.clone(),
                    };
                }
                draft.clear();
            }
        } else {
            let response = match entry.polygon() {
                Some(polygon) => {
                    let vertices = project.scenes[scene_idx]
                        .polygon(polygon)
                        .map_or(0, |p| p.vertex_count());
                    let label = ui.selectable_label(selected == Some(polygon), name);
                    if label.clicked() {
                        action = PropertiesAction::Select(polygon);
                    }
                    label.on_hover_text(format!("{vertices} vertices"))
                }
                None => ui
                    .label(egui::RichText::new(name).italics().weak())
                    .on_hover_text("Not present in this scene"),
            };
            if response.double_clicked() {
                draft.start(name);
            }
        }

        egui::ComboBox::from_id_source(("mode", row))
            .width(90.0)
            .selected_text(settings.mode.as_str())
            .show_ui(ui, |ui| {
                for mode in OptimizationMode::ALL {
                    if ui.selectable_label(settings.mode == mode, mode.as_str()).clicked()
                        && mode != settings.mode
                    {
                        action = PropertiesAction::SetMode {
                            name: name.to_string(),
                            mode,
                        };
                    }
                }
            });
    });

    action
}
