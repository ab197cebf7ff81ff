// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven editing of the polygons of the active scene.
//!
//! The editor is a small state machine fed with pointer events in canvas
//! (screen) coordinates. It owns the viewport, the selection, the undo
//! history and the crop tool, and produces a list of screen-space drawing
//! primitives for the canvas to paint.

use super::crop::{CropHandle, CropTool};
use super::history::{History, Snapshot};
use super::snap::{smart_snap, snap_to_vertices};
use super::viewport::Viewport;
use crate::config::EditorSettings;
use crate::models::polygon::{OptimizationMode, Point, PolygonObject, Rgb, MIN_VERTICES};
use crate::models::scene::{PolygonId, Scene};
use crate::util::geometry::{closest_point_on_segment, point_in_polygon, Rect};

const HOVER_COLOR: Rgb = [255, 255, 255];
const INSERT_COLOR: Rgb = [255, 220, 0];
const GUIDE_COLOR: Rgb = [0, 220, 255];
const CROP_COLOR: Rgb = [255, 255, 255];

/// Interaction state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    PanDragging,
    VertexDragging { polygon: usize, vertex: usize },
    CropAdjusting(CropHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Screen-space drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Closed outline.
    Polygon { points: Vec<Point>, color: Rgb, width: f32 },
    Circle { center: Point, radius: f32, color: Rgb, filled: bool },
    Line { from: Point, to: Point, color: Rgb, width: f32 },
    Rect { rect: Rect, color: Rgb, width: f32 },
}

/// Editing engine for one project.
#[derive(Debug, Clone)]
pub struct Editor {
    pub viewport: Viewport,
    pub settings: EditorSettings,
    pub crop: CropTool,
    history: History,
    state: EditState,
    scene: usize,
    selected: Option<usize>,
    hovered_vertex: Option<usize>,
    /// Edge start index and the point a click would insert.
    hovered_edge: Option<(usize, Point)>,
    guides: Vec<(Point, Point)>,
    last_pointer: Point,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            viewport: Viewport::default(),
            settings,
            crop: CropTool::default(),
            history: History::new(settings.history_limit),
            state: EditState::Idle,
            scene: 0,
            selected: None,
            hovered_vertex: None,
            hovered_edge: None,
            guides: Vec::new(),
            last_pointer: Point::ZERO,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Index of the scene the selection refers to.
    pub fn scene(&self) -> usize {
        self.scene
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn hovered_vertex(&self) -> Option<usize> {
        self.hovered_vertex
    }

    pub fn hovered_edge(&self) -> Option<(usize, Point)> {
        self.hovered_edge
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Switch to another scene, dropping selection and transient state.
    ///
    /// The crop and the history are project-wide and survive the switch.
    pub fn set_scene(&mut self, scene: usize) {
        self.scene = scene;
        self.selected = None;
        self.clear_transient();
    }

    pub fn select(&mut self, polygon: Option<usize>) {
        self.selected = polygon;
        self.hovered_vertex = None;
        self.hovered_edge = None;
    }

    /// Forget everything, e.g. when a new folder is opened.
    pub fn reset(&mut self) {
        let settings = self.settings;
        *self = Self::new(settings);
    }

    fn clear_transient(&mut self) {
        self.hovered_vertex = None;
        self.hovered_edge = None;
        self.guides.clear();
        self.state = if self.crop.active {
            EditState::CropAdjusting(CropHandle::None)
        } else {
            EditState::Idle
        };
    }

    fn selected_visible<'a>(&self, scene: &'a Scene) -> Option<(usize, &'a PolygonObject)> {
        let index = self.selected?;
        scene
            .polygon(index)
            .filter(|poly| poly.visible)
            .map(|poly| (index, poly))
    }

    /// First vertex of `poly` within the hover radius of `p` (image space).
    fn vertex_at(&self, poly: &PolygonObject, p: Point) -> Option<usize> {
        poly.points
            .iter()
            .position(|v| self.viewport.screen_distance(*v, p) <= self.settings.hover_radius)
    }

    /// First edge of `poly` within the hover radius of `p`, with the
    /// closest point on it.
    fn edge_at(&self, poly: &PolygonObject, p: Point) -> Option<(usize, Point)> {
        (0..poly.points.len()).find_map(|i| {
            let (closest, distance) =
                closest_point_on_segment(p, poly.points[i], poly.points[poly.next_index(i)]);
            (distance * self.viewport.zoom <= self.settings.hover_radius).then_some((i, closest))
        })
    }

    /// Topmost visible polygon containing `p`.
    fn body_at(scene: &Scene, p: Point) -> Option<usize> {
        scene
            .objects
            .iter()
            .enumerate()
            .rev()
            .find(|(_, poly)| poly.visible && point_in_polygon(p, &poly.points))
            .map(|(i, _)| i)
    }

    pub fn pointer_down(
        &mut self,
        scene_idx: usize,
        scene: &mut Scene,
        pos: Point,
        button: PointerButton,
        insert_modifier: bool,
    ) {
        if scene_idx != self.scene {
            self.set_scene(scene_idx);
        }
        self.last_pointer = pos;
        let p = self.viewport.to_image(pos);

        if self.crop.active {
            if button == PointerButton::Primary {
                let handle = self.crop.hit_test(p, &self.viewport, self.settings.hover_radius);
                self.state = if self.crop.begin_drag(handle, p) {
                    EditState::CropAdjusting(handle)
                } else {
                    EditState::PanDragging
                };
            }
            return;
        }

        match button {
            PointerButton::Primary => self.primary_down(scene, p, insert_modifier),
            PointerButton::Secondary => {
                let hit = self
                    .selected_visible(scene)
                    .and_then(|(index, poly)| Some((index, self.vertex_at(poly, p)?)));
                if let Some((polygon, vertex)) = hit {
                    self.delete_vertex(scene, polygon, vertex);
                }
            }
        }
    }

    fn primary_down(&mut self, scene: &mut Scene, p: Point, insert_modifier: bool) {
        if let Some((index, poly)) = self.selected_visible(scene) {
            if let Some(vertex) = self.vertex_at(poly, p) {
                self.history.push(PolygonId::new(self.scene, index), poly);
                self.state = EditState::VertexDragging { polygon: index, vertex };
                return;
            }
            if insert_modifier {
                if let Some((edge, at)) = self.edge_at(poly, p) {
                    self.history.push(PolygonId::new(self.scene, index), poly);
                    if let Some(poly) = scene.polygon_mut(index) {
                        poly.insert_vertex(edge + 1, at);
                    }
                    log::debug!("Inserted vertex {} into polygon {index}", edge + 1);
                    self.hovered_edge = None;
                    self.state = EditState::VertexDragging {
                        polygon: index,
                        vertex: edge + 1,
                    };
                    return;
                }
            }
        }
        match Self::body_at(scene, p) {
            Some(index) => self.select(Some(index)),
            None => self.state = EditState::PanDragging,
        }
    }

    fn delete_vertex(&mut self, scene: &mut Scene, polygon: usize, vertex: usize) -> bool {
        let Some(poly) = scene.polygon_mut(polygon) else {
            return false;
        };
        if poly.vertex_count() <= MIN_VERTICES || vertex >= poly.vertex_count() {
            log::debug!("Refused to delete vertex {vertex} of polygon {polygon}");
            return false;
        }
        self.history.push(PolygonId::new(self.scene, polygon), poly);
        poly.remove_vertex(vertex);
        self.hovered_vertex = None;
        true
    }

    /// Delete the hovered vertex of the selected polygon.
    pub fn delete_hovered_vertex(&mut self, scene: &mut Scene) -> bool {
        match (self.selected, self.hovered_vertex) {
            (Some(polygon), Some(vertex)) => self.delete_vertex(scene, polygon, vertex),
            _ => false,
        }
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, pos: Point, insert_modifier: bool) {
        let delta = pos - self.last_pointer;
        self.last_pointer = pos;
        match self.state {
            EditState::PanDragging => self.viewport.pan_by(delta),
            EditState::VertexDragging { polygon, vertex } => {
                let target = self.drag_target(scene, polygon, vertex, pos);
                if let Some(poly) = scene.polygon_mut(polygon) {
                    poly.update_vertex(vertex, target);
                }
            }
            EditState::CropAdjusting(CropHandle::None) => {}
            EditState::CropAdjusting(_) => self.crop.drag_to(self.viewport.to_image(pos)),
            EditState::Idle => self.update_hover(scene, pos, insert_modifier),
        }
    }

    /// Where a dragged vertex lands for the pointer at `pos`.
    fn drag_target(&mut self, scene: &Scene, polygon: usize, vertex: usize, pos: Point) -> Point {
        let raw = self.viewport.to_image(pos);
        let radius = self.settings.snap_radius;
        self.guides.clear();
        if let Some(p) = snap_to_vertices(&scene.objects, polygon, raw, &self.viewport, radius) {
            return p;
        }
        if !self.settings.smart_snap {
            return raw;
        }
        let Some(poly) = scene.polygon(polygon) else {
            return raw;
        };
        let snapped = smart_snap(&poly.points, vertex, raw, &self.viewport, radius);
        self.guides = snapped.guides;
        snapped.position
    }

    fn update_hover(&mut self, scene: &Scene, pos: Point, insert_modifier: bool) {
        self.hovered_vertex = None;
        self.hovered_edge = None;
        let Some((_, poly)) = self.selected_visible(scene) else {
            return;
        };
        let p = self.viewport.to_image(pos);
        self.hovered_vertex = self.vertex_at(poly, p);
        if self.hovered_vertex.is_none() && insert_modifier {
            self.hovered_edge = self.edge_at(poly, p);
        }
    }

    pub fn pointer_up(&mut self) {
        if let EditState::VertexDragging { polygon, vertex } = self.state {
            log::debug!("Finished dragging vertex {vertex} of polygon {polygon}");
        }
        self.crop.end_drag();
        self.clear_transient();
    }

    /// Zoom by `steps` wheel notches around `pos`.
    pub fn scroll(&mut self, pos: Point, steps: f64) {
        if steps != 0.0 {
            self.viewport.zoom_at(pos, self.settings.zoom_step.powf(steps));
        }
    }

    pub fn undo(&mut self, scenes: &mut [Scene]) -> Option<PolygonId> {
        let id = self.history.undo(scenes)?;
        self.focus(id);
        log::info!("Undo on {id:?}");
        Some(id)
    }

    pub fn redo(&mut self, scenes: &mut [Scene]) -> Option<PolygonId> {
        let id = self.history.redo(scenes)?;
        self.focus(id);
        log::info!("Redo on {id:?}");
        Some(id)
    }

    fn focus(&mut self, id: PolygonId) {
        if id.scene != self.scene {
            self.set_scene(id.scene);
        } else {
            self.clear_transient();
        }
        self.selected = Some(id.polygon);
    }

    /// Record the prior state of every polygon touched by a mode change as
    /// one undo step.
    pub fn record_mode_change(&mut self, prior: Vec<(PolygonId, Vec<Point>, OptimizationMode)>) {
        let step = prior
            .into_iter()
            .map(|(target, points, mode)| Snapshot { target, points, mode })
            .collect();
        self.history.push_step(step);
    }

    /// Open the crop tool on an image of `image_size`.
    pub fn begin_crop(&mut self, image_size: (f64, f64)) {
        self.crop.open(image_size, self.viewport.crop);
        self.viewport.crop_editing = true;
        self.selected = None;
        self.clear_transient();
    }

    /// Commit the draft as the project crop and fit it into `view`.
    pub fn apply_crop(&mut self, image_size: (f64, f64), view: (f64, f64)) -> Option<Rect> {
        let rect = self.crop.apply()?;
        self.viewport.crop = Some(rect);
        self.viewport.crop_editing = false;
        self.clear_transient();
        self.viewport.fit(image_size, view);
        log::info!(
            "Crop set to ({:.0}, {:.0}) {:.0}x{:.0}",
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height()
        );
        Some(rect)
    }

    pub fn cancel_crop(&mut self) {
        self.crop.cancel();
        self.viewport.crop_editing = false;
        self.clear_transient();
    }

    pub fn clear_crop(&mut self, image_size: (f64, f64), view: (f64, f64)) {
        self.viewport.crop = None;
        self.viewport.fit(image_size, view);
    }

    /// Escape: close the crop tool if open, otherwise deselect.
    pub fn cancel(&mut self) {
        if self.crop.active {
            self.cancel_crop();
        } else {
            self.select(None);
            self.clear_transient();
        }
    }

    pub fn fit(&mut self, image_size: (f64, f64), view: (f64, f64)) {
        self.viewport.fit(image_size, view);
    }

    /// Zoom around the centre of a view of `view` size.
    pub fn zoom_centered(&mut self, view: (f64, f64), factor: f64) {
        self.viewport
            .zoom_at(Point::new(view.0 / 2.0, view.1 / 2.0), factor);
    }

    /// Everything the canvas should draw for `scene`, in screen coordinates.
    pub fn primitives(&self, scene: &Scene, show_reference: bool) -> Vec<Primitive> {
        let vp = &self.viewport;
        let to_screen = |points: &[Point]| points.iter().map(|p| vp.to_screen(*p)).collect::<Vec<_>>();
        let mut out = Vec::new();

        for (index, poly) in scene.objects.iter().enumerate().filter(|(_, p)| p.visible) {
            if show_reference && poly.visual_points.len() >= MIN_VERTICES {
                out.push(Primitive::Polygon {
                    points: to_screen(&poly.visual_points),
                    color: dim(poly.color),
                    width: 1.0,
                });
            }
            let width = if Some(index) == self.selected {
                self.settings.line_width * 1.5
            } else {
                self.settings.line_width
            };
            out.push(Primitive::Polygon {
                points: to_screen(&poly.points),
                color: poly.color,
                width,
            });
        }

        if !self.crop.active {
            if let Some((_, poly)) = self.selected_visible(scene) {
                for (i, p) in poly.points.iter().enumerate() {
                    let hovered = self.hovered_vertex == Some(i);
                    out.push(Primitive::Circle {
                        center: vp.to_screen(*p),
                        radius: self.settings.vertex_radius,
                        color: if hovered { HOVER_COLOR } else { poly.color },
                        filled: true,
                    });
                }
                if let Some((_, at)) = self.hovered_edge {
                    out.push(Primitive::Circle {
                        center: vp.to_screen(at),
                        radius: self.settings.vertex_radius,
                        color: INSERT_COLOR,
                        filled: false,
                    });
                }
            }
        }

        for (from, to) in &self.guides {
            out.push(Primitive::Line {
                from: vp.to_screen(*from),
                to: vp.to_screen(*to),
                color: GUIDE_COLOR,
                width: 1.0,
            });
        }

        if let Some(draft) = self.crop.draft.filter(|_| self.crop.active) {
            let rect = Rect::new(vp.to_screen(draft.min), vp.to_screen(draft.max));
            out.push(Primitive::Rect {
                rect,
                color: CROP_COLOR,
                width: 2.0,
            });
            for corner in rect.corners() {
                out.push(Primitive::Circle {
                    center: corner,
                    radius: self.settings.vertex_radius,
                    color: CROP_COLOR,
                    filled: true,
                });
            }
        }
        out
    }
}

fn dim(color: Rgb) -> Rgb {
    color.map(|c| c / 2)
}
