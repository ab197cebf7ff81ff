// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Vertex snapping while dragging.
//!
//! Two assists: copying the position of a nearby vertex of another polygon,
//! and "smart snap", which pulls the dragged vertex onto the extension of the
//! polygon's own edges. Both measure distances in screen pixels and keep no
//! state between pointer moves.

use super::viewport::Viewport;
use crate::models::polygon::{Point, PolygonObject};
use crate::util::geometry::{line_intersection, project_onto_line};

/// Snapped position plus the guide segments (image space) to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub position: Point,
    pub guides: Vec<(Point, Point)>,
}

impl SnapResult {
    fn raw(position: Point) -> Self {
        Self {
            position,
            guides: Vec::new(),
        }
    }
}

/// Nearest vertex of another visible polygon within `radius` screen pixels.
pub fn snap_to_vertices(
    objects: &[PolygonObject],
    exclude: usize,
    raw: Point,
    viewport: &Viewport,
    radius: f64,
) -> Option<Point> {
    objects
        .iter()
        .enumerate()
        .filter(|(i, obj)| *i != exclude && obj.visible)
        .flat_map(|(_, obj)| obj.points.iter().copied())
        .map(|p| (p, viewport.screen_distance(p, raw)))
        .filter(|(_, d)| *d <= radius)
        .fold(None, |best: Option<(Point, f64)>, (p, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((p, d)),
        })
        .map(|(p, _)| p)
}

/// Unit directions of every edge that does not touch `dragged`.
fn reference_directions(points: &[Point], dragged: usize) -> Vec<Point> {
    let n = points.len();
    (0..n)
        .filter(|&i| i != dragged && (i + 1) % n != dragged)
        .filter_map(|i| (points[(i + 1) % n] - points[i]).normalized())
        .collect()
}

/// Snap the dragged vertex onto intersections or extensions of existing edges.
///
/// First the intersection of a line through the previous neighbour with a
/// line through the next neighbour is tried, each along some reference edge
/// direction; the first one close enough wins. Otherwise the cursor is
/// projected onto every such line through either neighbour and the closest
/// projection within range is used. Failing both, `raw` is returned.
pub fn smart_snap(
    points: &[Point],
    dragged: usize,
    raw: Point,
    viewport: &Viewport,
    radius: f64,
) -> SnapResult {
    let n = points.len();
    if n < 3 || dragged >= n {
        return SnapResult::raw(raw);
    }
    let prev = points[(dragged + n - 1) % n];
    let next = points[(dragged + 1) % n];
    let directions = reference_directions(points, dragged);

    for d1 in &directions {
        for d2 in &directions {
            let Some(x) = line_intersection(prev, *d1, next, *d2) else {
                continue;
            };
            if viewport.screen_distance(x, raw) <= radius {
                return SnapResult {
                    position: x,
                    guides: vec![(prev, x), (next, x)],
                };
            }
        }
    }

    let mut best: Option<(Point, Point, f64)> = None;
    for anchor in [prev, next] {
        for dir in &directions {
            let p = project_onto_line(raw, anchor, *dir);
            let d = viewport.screen_distance(p, raw);
            if d <= radius && best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((anchor, p, d));
            }
        }
    }

    match best {
        Some((anchor, p, _)) => SnapResult {
            position: p,
            guides: vec![(anchor, p)],
        },
        None => SnapResult::raw(raw),
    }
}
