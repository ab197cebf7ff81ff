// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Polygon data structures.
//!
//! This module defines the editable polygon objects derived from masks,
//! together with the point, colour and optimization-mode types they carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Minimum number of vertices a persisted polygon may have.
pub const MIN_VERTICES: usize = 3;

/// A 2D point in image-absolute pixel coordinates.
///
/// Serialized as a `[x, y]` pair to match the project file layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(self) -> Option<Point> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(Point::new(self.x / len, self.y / len))
        } else {
            None
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Display colour as 8-bit RGB.
pub type Rgb = [u8; 3];

/// How a mask contour is reduced to the persisted polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptimizationMode {
    Detailed,
    #[default]
    Balanced,
    Straight,
    Rectangle,
}

impl OptimizationMode {
    pub const ALL: [OptimizationMode; 4] = [
        OptimizationMode::Detailed,
        OptimizationMode::Balanced,
        OptimizationMode::Straight,
        OptimizationMode::Rectangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationMode::Detailed => "Detailed",
            OptimizationMode::Balanced => "Balanced",
            OptimizationMode::Straight => "Straight",
            OptimizationMode::Rectangle => "Rectangle",
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An editable polygon derived from one mask file.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonObject {
    /// Display name, shared with the name registry.
    pub name: String,
    /// File name of the mask this polygon was extracted from.
    pub source_mask: String,
    /// Persisted vertices in original (uncropped) image coordinates.
    pub points: Vec<Point>,
    pub color: Rgb,
    pub visible: bool,
    pub mode: OptimizationMode,
    /// Raw traced contour, kept so a mode change can re-simplify.
    pub contour: Vec<Point>,
    /// Fine reference outline, only drawn on screen.
    pub visual_points: Vec<Point>,
}

impl PolygonObject {
    /// Create a polygon with the given name, source mask and vertices.
    pub fn new(name: String, source_mask: String, points: Vec<Point>) -> Self {
        Self {
            name,
            source_mask,
            points,
            color: [128, 128, 128],
            visible: true,
            mode: OptimizationMode::default(),
            contour: Vec::new(),
            visual_points: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Move a vertex to a new position.
    pub fn update_vertex(&mut self, index: usize, point: Point) -> bool {
        match self.points.get_mut(index) {
            Some(vertex) => {
                *vertex = point;
                true
            }
            None => false,
        }
    }

    /// Insert a vertex so that it becomes `index`.
    pub fn insert_vertex(&mut self, index: usize, point: Point) -> bool {
        if index > self.points.len() {
            return false;
        }
        self.points.insert(index, point);
        true
    }

    /// Remove a vertex, refusing to go below [`MIN_VERTICES`].
    pub fn remove_vertex(&mut self, index: usize) -> bool {
        if self.points.len() <= MIN_VERTICES || index >= self.points.len() {
            return false;
        }
        self.points.remove(index);
        true
    }

    /// Index of the vertex following `index`, wrapping around.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.points.len().max(1)
    }
}
