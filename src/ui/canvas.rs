// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the active scene.
//!
//! Paints the scene image through the editor's viewport, forwards pointer
//! input to the editor and paints the primitives it produces.

use crate::editor::engine::{EditState, Editor, PointerButton, Primitive};
use crate::models::polygon::{Point, Rgb};
use crate::models::scene::Scene;
use crate::util::geometry::Rect;

const STATUS_HEIGHT: f32 = 24.0;

/// Display the canvas and handle mouse interactions.
///
/// Returns the size of the drawing area, used by fit and zoom commands.
pub fn show(
    ui: &mut egui::Ui,
    editor: &mut Editor,
    scene_idx: usize,
    scene: &mut Scene,
    texture: Option<&egui::TextureHandle>,
    image_size: Option<(f64, f64)>,
) -> (f64, f64) {
    let size = ui.available_size() - egui::vec2(0.0, STATUS_HEIGHT);
    let (response, painter) = ui.allocate_painter(size.max(egui::Vec2::ZERO), egui::Sense::click_and_drag());
    let area = response.rect;
    painter.rect_filled(area, 0.0, egui::Color32::from_gray(40));

    let to_local = |p: egui::Pos2| Point::new(f64::from(p.x - area.min.x), f64::from(p.y - area.min.y));
    let to_pos = |p: Point| egui::pos2(area.min.x + p.x as f32, area.min.y + p.y as f32);

    if let (Some(texture), Some(image_size)) = (texture, image_size) {
        let region = editor.viewport.visible_region(image_size);
        let screen = egui::Rect::from_min_max(
            to_pos(editor.viewport.to_screen(region.min)),
            to_pos(editor.viewport.to_screen(region.max)),
        );
        let uv = egui::Rect::from_min_max(
            egui::pos2((region.min.x / image_size.0) as f32, (region.min.y / image_size.1) as f32),
            egui::pos2((region.max.x / image_size.0) as f32, (region.max.y / image_size.1) as f32),
        );
        painter.image(texture.id(), screen, uv, egui::Color32::WHITE);
    }

    let (insert_modifier, primary_pressed, secondary_pressed, released, pointer, scroll) =
        ui.input(|i| {
            (
                i.modifiers.command,
                i.pointer.primary_pressed(),
                i.pointer.secondary_pressed(),
                i.pointer.any_released(),
                i.pointer.latest_pos(),
                i.raw_scroll_delta.y,
            )
        });

    let mut cursor_image = None;
    if let Some(pos) = pointer {
        let local = to_local(pos);
        if response.hovered() {
            if primary_pressed {
                editor.pointer_down(scene_idx, scene, local, PointerButton::Primary, insert_modifier);
            } else if secondary_pressed {
                editor.pointer_down(scene_idx, scene, local, PointerButton::Secondary, insert_modifier);
            }
            if scroll != 0.0 {
                editor.scroll(local, f64::from(scroll.signum()));
            }
            cursor_image = Some(editor.viewport.to_image(local));
        }
        editor.pointer_move(scene, local, insert_modifier);
        if released {
            editor.pointer_up();
        }
    }

    match editor.state() {
        EditState::VertexDragging { .. } => ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing),
        EditState::PanDragging => ui.ctx().set_cursor_icon(egui::CursorIcon::AllScroll),
        _ if editor.hovered_vertex().is_some() => ui.ctx().set_cursor_icon(egui::CursorIcon::Grab),
        _ if editor.hovered_edge().is_some() => ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair),
        _ => {}
    }

    for primitive in editor.primitives(scene, editor.settings.show_reference) {
        paint(&painter, &primitive, &to_pos);
    }

    ui.horizontal(|ui| {
        ui.label(format!("Zoom: {:.0}%", editor.viewport.zoom * 100.0));
        if let Some(p) = cursor_image {
            ui.separator();
            ui.label(format!("x: {:.0}  y: {:.0}", p.x, p.y));
        }
        if let Some(crop) = editor.viewport.crop {
            ui.separator();
            ui.label(format!("Crop: {:.0}x{:.0}", crop.width(), crop.height()));
        }
        if let Some(poly) = editor.selected().and_then(|i| scene.polygon(i)) {
            ui.separator();
            ui.label(format!("{} ({} vertices)", poly.name, poly.vertex_count()));
        }
    });

    (f64::from(area.width()), f64::from(area.height()))
}

fn color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

fn paint(painter: &egui::Painter, primitive: &Primitive, to_pos: &impl Fn(Point) -> egui::Pos2) {
    match primitive {
        Primitive::Polygon { points, color: rgb, width } => {
            let points: Vec<egui::Pos2> = points.iter().map(|p| to_pos(*p)).collect();
            painter.add(egui::Shape::closed_line(points, egui::Stroke::new(*width, color(*rgb))));
        }
        Primitive::Circle { center, radius, color: rgb, filled } => {
            let center = to_pos(*center);
            if *filled {
                painter.circle_filled(center, *radius, color(*rgb));
                painter.circle_stroke(center, *radius, egui::Stroke::new(1.0, egui::Color32::BLACK));
            } else {
                painter.circle_stroke(center, *radius, egui::Stroke::new(2.0, color(*rgb)));
            }
        }
        Primitive::Line { from, to, color: rgb, width } => {
            painter.line_segment([to_pos(*from), to_pos(*to)], egui::Stroke::new(*width, color(*rgb)));
        }
        Primitive::Rect { rect, color: rgb, width } => {
            let Rect { min, max } = rect.normalized();
            painter.rect_stroke(
                egui::Rect::from_min_max(to_pos(min), to_pos(max)),
                0.0,
                egui::Stroke::new(*width, color(*rgb)),
            );
        }
    }
}
