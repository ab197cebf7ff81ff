// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mapping between image space and screen space.
//!
//! `screen = (image - origin) * zoom + pan`, where `origin` is the corner of
//! the active crop, or the image origin while no crop is active or while the
//! crop itself is being adjusted.

use crate::models::polygon::Point;
use crate::util::geometry::Rect;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 50.0;

/// Zoom, pan and crop state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    /// Screen position of the effective origin.
    pub pan: Point,
    /// Committed crop in original image coordinates.
    pub crop: Option<Rect>,
    /// The crop tool is open: draw the full image.
    pub crop_editing: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ZERO,
            crop: None,
            crop_editing: false,
        }
    }
}

impl Viewport {
    /// Image point that maps to the screen pan offset.
    pub fn origin(&self) -> Point {
        match self.crop {
            Some(rect) if !self.crop_editing => rect.min,
            _ => Point::ZERO,
        }
    }

    pub fn to_screen(&self, p: Point) -> Point {
        (p - self.origin()) * self.zoom + self.pan
    }

    pub fn to_image(&self, s: Point) -> Point {
        (s - self.pan) * (1.0 / self.zoom) + self.origin()
    }

    /// Screen-space distance between two image points.
    pub fn screen_distance(&self, a: Point, b: Point) -> f64 {
        a.distance(b) * self.zoom
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.pan = self.pan + delta;
    }

    /// Scale by `factor`, keeping the image point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let fixed = self.to_image(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - (fixed - self.origin()) * self.zoom;
    }

    /// The part of the image currently shown: the crop, or the full image.
    pub fn visible_region(&self, image_size: (f64, f64)) -> Rect {
        match self.crop {
            Some(rect) if !self.crop_editing => rect,
            _ => Rect::from_size(image_size.0, image_size.1),
        }
    }

    /// Zoom and pan so the visible region is centred in a view of `view` size.
    pub fn fit(&mut self, image_size: (f64, f64), view: (f64, f64)) {
        let region = self.visible_region(image_size);
        if region.width() <= 0.0 || region.height() <= 0.0 || view.0 <= 0.0 || view.1 <= 0.0 {
            return;
        }
        self.zoom = (view.0 / region.width())
            .min(view.1 / region.height())
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let shown = Point::new(region.width(), region.height()) * self.zoom;
        // The region's corner sits at the origin only when the crop is applied.
        let corner_offset = (region.min - self.origin()) * self.zoom;
        self.pan = (Point::new(view.0, view.1) - shown) * 0.5 - corner_offset;
    }
}
