// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait. It owns the project and the editor, runs folder
//! scans and exports on background threads and routes panel actions to
//! the model.

use crate::config::{EditorSettings, STORAGE_KEY};
use crate::editor::engine::Editor;
use crate::io::export::{ExportJob, ExportReport};
use crate::io::scanner::{scan_directory, ScanOutcome};
use crate::io::serialization::{save_project_json, PROJECT_FILE_NAME};
use crate::models::project::Project;
use crate::ui::{canvas, properties, toolbar};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

/// Result of work done off the UI thread.
enum JobResult {
    Scanned(ScanOutcome),
    Exported(ExportReport),
}

/// Decoded image of the active scene.
struct SceneImage {
    scene: usize,
    texture: egui::TextureHandle,
    size: (f64, f64),
}

/// Main application state.
pub struct MaskEditorApp {
    /// Scanned project (if a folder is open)
    project: Option<Project>,

    /// Viewport, selection, history and crop
    editor: Editor,

    /// Texture for the active scene
    image: Option<SceneImage>,

    /// Scene whose image failed to load, so it is not retried every frame
    failed_image: Option<usize>,

    /// Catalog rename in progress
    rename: properties::RenameDraft,

    /// Receiver for a background scan or export
    job: Option<Receiver<Result<JobResult>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last status line
    status: String,

    /// Size of the canvas in the previous frame
    view_size: (f64, f64),

    /// Fit the image after the next canvas layout
    pending_fit: bool,
}

impl MaskEditorApp {
    /// Create the application, restoring settings saved by a previous run.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: EditorSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, STORAGE_KEY))
            .unwrap_or_default();
        log::debug!("Editor settings: {settings:?}");
        Self {
            project: None,
            editor: Editor::new(settings),
            image: None,
            failed_image: None,
            rename: properties::RenameDraft::default(),
            job: None,
            loading_message: None,
            status: "Open a folder to begin".to_string(),
            view_size: (1.0, 1.0),
            pending_fit: false,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn report_error(&mut self, what: &str, e: &anyhow::Error) {
        log::error!("{what}: {e:#}");
        self.set_status(format!("{what}: {e:#}"));
    }

    fn image_size(&self) -> Option<(f64, f64)> {
        self.image.as_ref().map(|img| img.size)
    }

    /// Scan a folder on a background thread.
    fn open_folder(&mut self, dir: PathBuf) {
        let (sender, receiver) = channel();
        self.job = Some(receiver);
        self.loading_message = Some(format!("Scanning {}...", dir.display()));

        std::thread::spawn(move || {
            let _ = sender.send(scan_directory(&dir).map(JobResult::Scanned));
        });
    }

    fn finish_scan(&mut self, outcome: ScanOutcome) {
        for skipped in &outcome.skipped {
            log::warn!("Skipped {}: {}", skipped.file, skipped.reason);
        }
        let project = outcome.project;
        if project.is_empty() {
            self.set_status(format!("No scenes found in {}", project.folder.display()));
            return;
        }
        if project.registry.is_empty() {
            log::warn!("No masks matched any scene in {}", project.folder.display());
        }
        let message = format!(
            "Loaded {} scenes, {} names ({} files skipped)",
            project.scenes.len(),
            project.registry.len(),
            outcome.skipped.len()
        );
        log::info!("{message}");
        self.set_status(message);
        self.editor.reset();
        self.rename.clear();
        self.image = None;
        self.failed_image = None;
        self.project = Some(project);
        self.pending_fit = true;
    }

    /// Write the session file into the project folder.
    fn save_session(&mut self) {
        let Some(project) = &self.project else {
            return;
        };
        let path = project.folder.join(PROJECT_FILE_NAME);
        match save_project_json(&project.scenes, &path) {
            Ok(()) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => self.report_error("Failed to save", &e),
        }
    }

    /// Export images and polygons on a background thread.
    fn export(&mut self, out_dir: PathBuf) {
        let Some(project) = &self.project else {
            return;
        };
        let job = ExportJob {
            scenes: project.scenes.clone(),
            crop: self.editor.viewport.crop,
            project_folder: project.folder.clone(),
            out_dir,
        };
        let (sender, receiver) = channel();
        self.job = Some(receiver);
        self.loading_message = Some(format!("Exporting to {}...", job.out_dir.display()));

        std::thread::spawn(move || {
            let _ = sender.send(job.run().map(JobResult::Exported));
        });
    }

    fn finish_export(&mut self, report: ExportReport) {
        let mut message = format!(
            "Exported {} images and {}",
            report.images_written,
            report.json_path.display()
        );
        if !report.failures.is_empty() {
            message.push_str(&format!(", {} images failed", report.failures.len()));
        }
        self.set_status(message);
    }

    fn reset(&mut self) {
        self.project = None;
        self.image = None;
        self.failed_image = None;
        self.editor.reset();
        self.rename.clear();
        self.set_status("Project closed");
        log::info!("Project reset");
    }

    /// Check whether the background job has finished.
    fn poll_job(&mut self) {
        let Some(result) = self.job.as_ref().and_then(|receiver| receiver.try_recv().ok()) else {
            return;
        };
        self.job = None;
        self.loading_message = None;
        match result {
            Ok(JobResult::Scanned(outcome)) => self.finish_scan(outcome),
            Ok(JobResult::Exported(report)) => self.finish_export(report),
            Err(e) => self.report_error("Operation failed", &e),
        }
    }

    /// Make sure the texture matches the active scene.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(project) = &self.project else {
            return;
        };
        let active = self.editor.scene();
        if self.image.as_ref().is_some_and(|img| img.scene == active) || self.failed_image == Some(active) {
            return;
        }
        let Some(scene) = project.scenes.get(active) else {
            return;
        };
        match crate::io::media::load_image(&scene.image_path) {
            Ok(loaded) => {
                let size = [loaded.width as usize, loaded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                let texture = ctx.load_texture("scene_image", color_image, egui::TextureOptions::LINEAR);
                log::info!("Loaded image: {} ({}x{})", scene.image_path.display(), loaded.width, loaded.height);
                self.image = Some(SceneImage {
                    scene: active,
                    texture,
                    size: (f64::from(loaded.width), f64::from(loaded.height)),
                });
                self.failed_image = None;
            }
            Err(e) => {
                self.image = None;
                self.failed_image = Some(active);
                self.report_error("Failed to load image", &e);
            }
        }
    }

    /// Move `step` scenes forward or back, wrapping around.
    fn step_scene(&mut self, step: isize) {
        let Some(project) = &self.project else {
            return;
        };
        let count = project.scenes.len() as isize;
        if count == 0 {
            return;
        }
        let next = (self.editor.scene() as isize + step).rem_euclid(count) as usize;
        if self.editor.crop.active {
            self.editor.cancel_crop();
        }
        self.editor.set_scene(next);
        self.rename.clear();
    }

    fn undo(&mut self) {
        if let Some(project) = &mut self.project {
            match self.editor.undo(&mut project.scenes) {
                Some(id) => {
                    project.adopt_mode(id);
                }
                None => self.set_status("Nothing to undo"),
            }
        }
    }

    fn redo(&mut self) {
        if let Some(project) = &mut self.project {
            match self.editor.redo(&mut project.scenes) {
                Some(id) => {
                    project.adopt_mode(id);
                }
                None => self.set_status("Nothing to redo"),
            }
        }
    }

    fn handle_toolbar(&mut self, action: toolbar::ToolbarAction) {
        use toolbar::ToolbarAction;
        let image_size = self.image_size();
        match action {
            ToolbarAction::None => {}
            ToolbarAction::PrevScene => self.step_scene(-1),
            ToolbarAction::NextScene => self.step_scene(1),
            ToolbarAction::ZoomIn => {
                let step = self.editor.settings.zoom_step;
                self.editor.zoom_centered(self.view_size, step);
            }
            ToolbarAction::ZoomOut => {
                let step = self.editor.settings.zoom_step;
                self.editor.zoom_centered(self.view_size, 1.0 / step);
            }
            ToolbarAction::Fit => {
                if let Some(size) = image_size {
                    self.editor.fit(size, self.view_size);
                }
            }
            ToolbarAction::BeginCrop => {
                if let Some(size) = image_size {
                    self.editor.begin_crop(size);
                    self.editor.fit(size, self.view_size);
                }
            }
            ToolbarAction::SetRatio(ratio) => self.editor.crop.set_ratio(ratio),
            ToolbarAction::ApplyCrop => {
                if let Some(size) = image_size {
                    match self.editor.apply_crop(size, self.view_size) {
                        Some(rect) => self.set_status(format!(
                            "Crop {:.0}x{:.0} at ({:.0}, {:.0})",
                            rect.width(),
                            rect.height(),
                            rect.min.x,
                            rect.min.y
                        )),
                        None => self.set_status("Crop rectangle is empty"),
                    }
                }
            }
            ToolbarAction::CancelCrop => {
                self.editor.cancel_crop();
                if let Some(size) = image_size {
                    self.editor.fit(size, self.view_size);
                }
            }
            ToolbarAction::ClearCrop => {
                if let Some(size) = image_size {
                    self.editor.clear_crop(size, self.view_size);
                    self.set_status("Crop cleared");
                }
            }
        }
    }

    fn handle_properties(&mut self, action: properties::PropertiesAction) {
        use properties::PropertiesAction;
        let Some(project) = &mut self.project else {
            return;
        };
        match action {
            PropertiesAction::None => {}
            PropertiesAction::Select(polygon) => self.editor.select(Some(polygon)),
            PropertiesAction::Rename { old, new } => {
                if !project.sync_name(&old, &new) {
                    self.set_status(format!("Cannot rename {old:?} to {:?}", new.trim()));
                }
            }
            PropertiesAction::Recolor { name, color } => {
                project.sync_color(&name, color);
            }
            PropertiesAction::SetVisible { name, visible } => {
                project.sync_visibility(&name, visible);
            }
            PropertiesAction::SetMode { name, mode } => {
                let prior = project.sync_mode(&name, mode);
                self.editor.record_mode_change(prior);
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (undo, redo, delete, escape, left, right) = ctx.input(|i| {
            let command = i.modifiers.command;
            (
                command && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                (command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                    || (command && i.key_pressed(egui::Key::Y)),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
            )
        });

        if undo {
            self.undo();
        }
        if redo {
            self.redo();
        }
        if delete {
            if let Some(project) = &mut self.project {
                if let Some(scene) = project.scenes.get_mut(self.editor.scene()) {
                    self.editor.delete_hovered_vertex(scene);
                }
            }
        }
        if escape {
            self.editor.cancel();
        }
        if left {
            self.step_scene(-1);
        }
        if right {
            self.step_scene(1);
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        let has_project = self.project.is_some();
        let busy = self.job.is_some();
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.add_enabled(!busy, egui::Button::new("Open Folder...")).clicked() {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        self.open_folder(dir);
                    }
                    ui.close_menu();
                }
                if ui.add_enabled(has_project, egui::Button::new("Save")).clicked() {
                    self.save_session();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_project && !busy, egui::Button::new("Export Project..."))
                    .clicked()
                {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        self.export(dir);
                    }
                    ui.close_menu();
                }
                ui.separator();
                if ui.add_enabled(has_project, egui::Button::new("Reset")).clicked() {
                    self.reset();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(self.editor.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(self.editor.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                    .clicked()
                {
                    self.redo();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom In").clicked() {
                    self.handle_toolbar(toolbar::ToolbarAction::ZoomIn);
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.handle_toolbar(toolbar::ToolbarAction::ZoomOut);
                    ui.close_menu();
                }
                if ui.button("Fit to View").clicked() {
                    self.handle_toolbar(toolbar::ToolbarAction::Fit);
                    ui.close_menu();
                }
            });
        });
    }
}

impl eframe::App for MaskEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();

        // Request repaint while busy (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        self.sync_texture(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ui));

        let scene_label = self.project.as_ref().and_then(|project| {
            let index = self.editor.scene();
            let scene = project.scenes.get(index)?;
            Some((index, project.scenes.len(), scene.image_name()))
        });
        let has_crop = self.editor.viewport.crop.is_some();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(ui, &mut self.editor.settings, &self.editor.crop, has_crop, scene_label)
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.status.as_str());
        });

        if let Some(project) = &self.project {
            let scene_idx = self.editor.scene();
            let selected = self.editor.selected();
            let action = egui::SidePanel::right("properties")
                .default_width(300.0)
                .show(ctx, |ui| properties::show(ui, project, scene_idx, selected, &mut self.rename))
                .inner;
            self.handle_properties(action);
        }

        self.handle_keyboard(ctx);

        let image_size = self.image_size();
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.loading_message {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(message)
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
                return;
            }

            let texture = self.image.as_ref().map(|img| &img.texture);
            let scene_idx = self.editor.scene();
            match self.project.as_mut().and_then(|p| p.scenes.get_mut(scene_idx)) {
                Some(scene) => {
                    self.view_size = canvas::show(ui, &mut self.editor, scene_idx, scene, texture, image_size);
                }
                None => welcome(ui),
            }
        });

        // The canvas size is only known once it has been laid out.
        if self.pending_fit {
            if let Some(size) = self.image_size() {
                self.pending_fit = false;
                self.editor.fit(size, self.view_size);
                ctx.request_repaint();
            }
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, STORAGE_KEY, &self.editor.settings);
    }
}

/// Message shown while no folder is open.
fn welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Mask Polygon Editor")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a folder of images and masks to begin")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Folder...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
