// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive crop rectangle.
//!
//! The draft rectangle lives in full-image coordinates. Corners resize it,
//! the interior moves it, and an optional aspect ratio constrains resizing.

use super::viewport::Viewport;
use crate::models::polygon::Point;
use crate::util::geometry::Rect;
use std::fmt;

/// Aspect ratio constraint for the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Free,
    Wide,
    Standard,
    Square,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Free,
        AspectRatio::Wide,
        AspectRatio::Standard,
        AspectRatio::Square,
    ];

    /// Width divided by height, `None` when unconstrained.
    pub fn value(self) -> Option<f64> {
        match self {
            AspectRatio::Free => None,
            AspectRatio::Wide => Some(16.0 / 9.0),
            AspectRatio::Standard => Some(4.0 / 3.0),
            AspectRatio::Square => Some(1.0),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AspectRatio::Free => "Free",
            AspectRatio::Wide => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Square => "1:1",
        })
    }
}

/// Part of the crop rectangle under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Move,
    None,
}

impl CropHandle {
    const CORNERS: [CropHandle; 4] = [
        CropHandle::TopLeft,
        CropHandle::TopRight,
        CropHandle::BottomRight,
        CropHandle::BottomLeft,
    ];

    fn corner_index(self) -> Option<usize> {
        Self::CORNERS.iter().position(|h| *h == self)
    }
}

#[derive(Debug, Clone, Copy)]
struct CropDrag {
    handle: CropHandle,
    start_rect: Rect,
    start_pointer: Point,
}

/// Crop tool state.
#[derive(Debug, Clone, Default)]
pub struct CropTool {
    pub active: bool,
    pub draft: Option<Rect>,
    pub ratio: AspectRatio,
    image_size: (f64, f64),
    drag: Option<CropDrag>,
}

impl CropTool {
    /// Start editing from `current`, or from the full image.
    pub fn open(&mut self, image_size: (f64, f64), current: Option<Rect>) {
        self.active = true;
        self.image_size = image_size;
        self.draft = Some(current.unwrap_or_else(|| Rect::from_size(image_size.0, image_size.1)));
        self.drag = None;
        self.fit_ratio();
    }

    pub fn set_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
        self.fit_ratio();
    }

    /// Shrink the draft around its centre to match the locked ratio.
    fn fit_ratio(&mut self) {
        let (Some(ratio), Some(rect)) = (self.ratio.value(), self.draft) else {
            return;
        };
        let (mut w, mut h) = (rect.width(), rect.height());
        if h <= 0.0 {
            return;
        }
        if w / h > ratio {
            w = h * ratio;
        } else {
            h = w / ratio;
        }
        let half = Point::new(w / 2.0, h / 2.0);
        let c = rect.center();
        self.draft = Some(Rect::new(c - half, c + half));
    }

    /// Which handle is at `pointer` (image space).
    pub fn hit_test(&self, pointer: Point, viewport: &Viewport, radius: f64) -> CropHandle {
        let Some(rect) = self.draft else {
            return CropHandle::None;
        };
        for (corner, handle) in rect.corners().iter().zip(CropHandle::CORNERS) {
            if viewport.screen_distance(*corner, pointer) <= radius {
                return handle;
            }
        }
        if rect.contains(pointer) {
            CropHandle::Move
        } else {
            CropHandle::None
        }
    }

    pub fn begin_drag(&mut self, handle: CropHandle, pointer: Point) -> bool {
        match (handle, self.draft) {
            (CropHandle::None, _) | (_, None) => false,
            (handle, Some(start_rect)) => {
                self.drag = Some(CropDrag {
                    handle,
                    start_rect,
                    start_pointer: pointer,
                });
                true
            }
        }
    }

    /// Update the draft for the pointer at `pointer` (image space).
    pub fn drag_to(&mut self, pointer: Point) {
        let Some(drag) = self.drag else {
            return;
        };
        let delta = pointer - drag.start_pointer;
        let rect = match drag.handle.corner_index() {
            Some(corner) => self.resize(drag.start_rect, corner, delta),
            None => drag.start_rect.translate(delta),
        };
        self.draft = Some(rect);
    }

    /// Resize from `start` by moving `corner`, anchored at the opposite corner.
    fn resize(&self, start: Rect, corner: usize, delta: Point) -> Rect {
        let corners = start.corners();
        let anchor = corners[(corner + 2) % 4];
        let moving = corners[corner] + delta;
        let free = Rect::new(anchor, moving).normalized();

        let Some(ratio) = self.ratio.value() else {
            return free;
        };
        let (mut w, mut h) = (free.width(), free.height());
        // Grow whichever side keeps the rectangle at least as large as the
        // mouse position implies.
        if w / ratio >= h {
            h = w / ratio;
        } else {
            w = h * ratio;
        }
        let sx = if moving.x < anchor.x { -1.0 } else { 1.0 };
        let sy = if moving.y < anchor.y { -1.0 } else { 1.0 };
        Rect::new(anchor, anchor + Point::new(sx * w, sy * h)).normalized()
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Close the tool and return the draft clamped to the image.
    ///
    /// Returns `None` (leaving the tool open) when the draft is smaller than
    /// a pixel inside the image.
    pub fn apply(&mut self) -> Option<Rect> {
        let bounds = Rect::from_size(self.image_size.0, self.image_size.1);
        let rect = self.draft?.normalized().intersect(&bounds)?;
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return None;
        }
        self.close();
        Some(rect)
    }

    /// Close the tool, discarding the draft.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.active = false;
        self.draft = None;
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(ratio: AspectRatio) -> CropTool {
        let mut tool = CropTool {
            ratio,
            ..CropTool::default()
        };
        tool.open((400.0, 300.0), Some(Rect::new(Point::new(100.0, 100.0), Point::new(200.0, 200.0))));
        tool
    }

    fn editing_viewport() -> Viewport {
        Viewport {
            crop_editing: true,
            ..Viewport::default()
        }
    }

    #[test]
    fn test_open_defaults_to_full_image() {
        let mut tool = CropTool::default();
        tool.open((640.0, 480.0), None);
        assert!(tool.active);
        assert_eq!(tool.draft, Some(Rect::from_size(640.0, 480.0)));
    }

    #[test]
    fn test_hit_test_handles() {
        let tool = tool(AspectRatio::Free);
        let vp = editing_viewport();
        assert_eq!(tool.hit_test(Point::new(102.0, 98.0), &vp, 10.0), CropHandle::TopLeft);
        assert_eq!(tool.hit_test(Point::new(199.0, 201.0), &vp, 10.0), CropHandle::BottomRight);
        assert_eq!(tool.hit_test(Point::new(150.0, 150.0), &vp, 10.0), CropHandle::Move);
        assert_eq!(tool.hit_test(Point::new(300.0, 20.0), &vp, 10.0), CropHandle::None);
    }

    #[test]
    fn test_free_resize_and_normalize() {
        let mut tool = tool(AspectRatio::Free);
        tool.begin_drag(CropHandle::BottomRight, Point::new(200.0, 200.0));
        tool.drag_to(Point::new(250.0, 220.0));
        assert_eq!(tool.draft, Some(Rect::new(Point::new(100.0, 100.0), Point::new(250.0, 220.0))));

        // Dragging past the anchor flips the rectangle instead of inverting it.
        tool.drag_to(Point::new(50.0, 60.0));
        assert_eq!(tool.draft, Some(Rect::new(Point::new(50.0, 60.0), Point::new(100.0, 100.0))));
    }

    #[test]
    fn test_locked_ratio_keeps_mouse_size() {
        let mut tool = tool(AspectRatio::Free);
        tool.set_ratio(AspectRatio::Square);
        tool.begin_drag(CropHandle::BottomRight, Point::new(200.0, 200.0));
        tool.drag_to(Point::new(260.0, 220.0));
        let rect = tool.draft.unwrap();
        assert_eq!(rect.min, Point::new(100.0, 100.0));
        assert_eq!((rect.width(), rect.height()), (160.0, 160.0));

        tool.set_ratio(AspectRatio::Wide);
        let rect = tool.draft.unwrap();
        assert!((rect.width() / rect.height() - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_left_resize_anchors_bottom_right() {
        let mut tool = tool(AspectRatio::Standard);
        let start = tool.draft.unwrap();
        tool.begin_drag(CropHandle::TopLeft, start.min);
        tool.drag_to(start.min - Point::new(40.0, 0.0));
        let rect = tool.draft.unwrap();
        assert_eq!(rect.max, start.max);
        assert!((rect.width() / rect.height() - 4.0 / 3.0).abs() < 1e-9);
        assert!(rect.width() >= start.width() + 40.0 - 1e-9);
    }

    #[test]
    fn test_move_translates() {
        let mut tool = tool(AspectRatio::Free);
        tool.begin_drag(CropHandle::Move, Point::new(150.0, 150.0));
        tool.drag_to(Point::new(160.0, 130.0));
        assert_eq!(tool.draft, Some(Rect::new(Point::new(110.0, 80.0), Point::new(210.0, 180.0))));
        tool.end_drag();
        tool.drag_to(Point::new(300.0, 300.0));
        assert_eq!(tool.draft, Some(Rect::new(Point::new(110.0, 80.0), Point::new(210.0, 180.0))));
    }

    #[test]
    fn test_apply_clamps_and_cancel_discards() {
        let mut applied_tool = tool(AspectRatio::Free);
        applied_tool.begin_drag(CropHandle::Move, Point::new(150.0, 150.0));
        applied_tool.drag_to(Point::new(400.0, 150.0));
        applied_tool.end_drag();
        let applied = applied_tool.apply().unwrap();
        assert_eq!(applied, Rect::new(Point::new(350.0, 100.0), Point::new(400.0, 200.0)));
        assert!(!applied_tool.active);

        let mut cancelled = tool(AspectRatio::Free);
        cancelled.cancel();
        assert!(!cancelled.active);
        assert!(cancelled.draft.is_none());
    }

    #[test]
    fn test_apply_refuses_rect_outside_image() {
        let mut tool = tool(AspectRatio::Free);
        tool.draft = Some(Rect::new(Point::new(500.0, 500.0), Point::new(600.0, 600.0)));
        assert!(tool.apply().is_none());
        assert!(tool.active);
    }
}
