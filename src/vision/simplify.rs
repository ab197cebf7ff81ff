// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Contour simplification.
//!
//! Three tolerance-based modes run closed Douglas-Peucker with a tolerance
//! proportional to the contour perimeter; the rectangle mode fits the
//! minimum-area rotated bounding box.

use crate::models::polygon::{OptimizationMode, Point};
use crate::util::geometry::{perimeter, perpendicular_distance};
use imageproc::geometry::convex_hull;
use imageproc::point::Point as PixelPoint;

/// Tolerance factor for the on-screen reference outline.
pub const VISUAL_EPSILON: f64 = 0.0005;

/// Tolerance factor (fraction of the perimeter) for a mode, `None` for
/// rectangle fitting.
pub fn epsilon_factor(mode: OptimizationMode) -> Option<f64> {
    match mode {
        OptimizationMode::Detailed => Some(0.001),
        OptimizationMode::Balanced => Some(0.003),
        OptimizationMode::Straight => Some(0.015),
        OptimizationMode::Rectangle => None,
    }
}

/// Reduce a closed contour to the persisted polygon for `mode`.
pub fn simplify(contour: &[Point], mode: OptimizationMode) -> Vec<Point> {
    match epsilon_factor(mode) {
        Some(factor) => approximate_closed(contour, factor * perimeter(contour, true)),
        None => min_area_rect(contour).to_vec(),
    }
}

/// Detail-preserving outline used only for display.
pub fn visual_points(contour: &[Point]) -> Vec<Point> {
    approximate_closed(contour, VISUAL_EPSILON * perimeter(contour, true))
}

/// Closed-curve Douglas-Peucker.
///
/// The curve is split at the point farthest from its first point and each
/// half is simplified as an open polyline. Every returned point is one of the
/// input points, in input order.
pub fn approximate_closed(contour: &[Point], epsilon: f64) -> Vec<Point> {
    let n = contour.len();
    if n <= 3 {
        return contour.to_vec();
    }

    let start = contour[0];
    let mut far = 1;
    let mut far_dist = start.distance(contour[1]);
    for (i, p) in contour.iter().enumerate().skip(2) {
        let d = start.distance(*p);
        if d > far_dist {
            far = i;
            far_dist = d;
        }
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    let first_half = &contour[..=far];
    let mut first_keep = vec![false; first_half.len()];
    mark_open(first_half, epsilon, &mut first_keep);

    let mut second_half: Vec<Point> = contour[far..].to_vec();
    second_half.push(start);
    let mut second_keep = vec![false; second_half.len()];
    mark_open(&second_half, epsilon, &mut second_keep);

    for (i, k) in first_keep.iter().enumerate() {
        keep[i] |= *k;
    }
    // The last entry of the second half is the start point again.
    for (j, k) in second_keep.iter().enumerate().take(second_half.len() - 1) {
        keep[far + j] |= *k;
    }

    if keep.iter().filter(|k| **k).count() < 3 {
        // Everything fit within tolerance of the chord; keep the point that
        // spans the polygon so it does not collapse onto a segment.
        let widest = (1..n)
            .filter(|&i| i != far)
            .map(|i| (i, perpendicular_distance(contour[i], start, contour[far])))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            });
        if let Some((i, d)) = widest {
            if d > 0.0 {
                keep[i] = true;
            }
        }
    }

    contour
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(p, _)| *p)
        .collect()
}

/// Mark the points of an open polyline that survive simplification.
fn mark_open(path: &[Point], epsilon: f64, keep: &mut [bool]) {
    if path.is_empty() {
        return;
    }
    let last = path.len() - 1;
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((a, b)) = stack.pop() {
        if b <= a + 1 {
            continue;
        }
        let mut index = a + 1;
        let mut dmax = -1.0;
        for (i, p) in path.iter().enumerate().take(b).skip(a + 1) {
            let d = perpendicular_distance(*p, path[a], path[b]);
            if d > dmax {
                dmax = d;
                index = i;
            }
        }
        if dmax > epsilon {
            keep[index] = true;
            stack.push((a, index));
            stack.push((index, b));
        }
    }
}

/// Minimum-area rotated rectangle enclosing `points`.
///
/// Rotating calipers over the convex hull: the optimal rectangle has one side
/// collinear with a hull edge. Degenerate inputs fall back to the axis-aligned
/// bounding box, so four corners are always returned.
pub fn min_area_rect(points: &[Point]) -> [Point; 4] {
    let pixels: Vec<PixelPoint<i64>> = points
        .iter()
        .map(|p| PixelPoint::new(p.x.round() as i64, p.y.round() as i64))
        .collect();
    let hull: Vec<Point> = convex_hull(pixels.as_slice())
        .iter()
        .map(|p| Point::new(p.x as f64, p.y as f64))
        .collect();

    if hull.len() < 3 {
        return bounding_box(points);
    }

    let mut best: Option<(f64, [Point; 4])> = None;
    for i in 0..hull.len() {
        let Some(axis) = (hull[(i + 1) % hull.len()] - hull[i]).normalized() else {
            continue;
        };
        let normal = Point::new(-axis.y, axis.x);

        let (mut u_min, mut u_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut v_min, mut v_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let u = p.dot(axis);
            let v = p.dot(normal);
            u_min = u_min.min(u);
            u_max = u_max.max(u);
            v_min = v_min.min(v);
            v_max = v_max.max(v);
        }

        let area = (u_max - u_min) * (v_max - v_min);
        if best.as_ref().map_or(true, |(best_area, _)| area < *best_area) {
            let corner = |u: f64, v: f64| axis * u + normal * v;
            best = Some((
                area,
                [
                    corner(u_min, v_min),
                    corner(u_max, v_min),
                    corner(u_max, v_max),
                    corner(u_min, v_max),
                ],
            ));
        }
    }

    match best {
        Some((_, corners)) => corners,
        None => bounding_box(points),
    }
}

fn bounding_box(points: &[Point]) -> [Point; 4] {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    if points.is_empty() {
        min = Point::ZERO;
        max = Point::ZERO;
    }
    [min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::polygon_area;

    /// Integer ring with radial noise, similar to a traced blob.
    fn noisy_circle(n: usize, radius: f64) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                let r = radius + ((i * 7919) % 5) as f64 - 2.0;
                Point::new((100.0 + r * t.cos()).round(), (100.0 + r * t.sin()).round())
            })
            .collect()
    }

    fn square_corners() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 99.0),
            Point::new(99.0, 99.0),
            Point::new(99.0, 0.0),
        ]
    }

    fn sorted(points: &[Point]) -> Vec<(i64, i64)> {
        let mut v: Vec<(i64, i64)> = points.iter().map(|p| (p.x as i64, p.y as i64)).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_tolerance_modes_return_subset() {
        let contour = noisy_circle(400, 60.0);
        for mode in [
            OptimizationMode::Detailed,
            OptimizationMode::Balanced,
            OptimizationMode::Straight,
        ] {
            let out = simplify(&contour, mode);
            assert!(out.len() <= contour.len(), "{mode} grew the contour");
            assert!(out.len() >= 3, "{mode} collapsed the contour");
            assert!(out.iter().all(|p| contour.contains(p)), "{mode} invented a point");
        }
    }

    #[test]
    fn test_tolerance_modes_are_ordered_by_coarseness() {
        let contour = noisy_circle(400, 60.0);
        let detailed = simplify(&contour, OptimizationMode::Detailed).len();
        let balanced = simplify(&contour, OptimizationMode::Balanced).len();
        let straight = simplify(&contour, OptimizationMode::Straight).len();
        let visual = visual_points(&contour).len();
        assert!(visual >= detailed);
        assert!(detailed >= balanced);
        assert!(balanced >= straight);
    }

    #[test]
    fn test_output_preserves_input_order() {
        let contour = noisy_circle(300, 40.0);
        let out = simplify(&contour, OptimizationMode::Balanced);
        let positions: Vec<usize> = out
            .iter()
            .map(|p| contour.iter().position(|q| q == p).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rectangle_mode_has_four_points() {
        for contour in [noisy_circle(200, 30.0), noisy_circle(17, 5.0), square_corners()] {
            assert_eq!(simplify(&contour, OptimizationMode::Rectangle).len(), 4);
        }
    }

    #[test]
    fn test_rectangle_of_square_is_its_corners() {
        let rect = simplify(&square_corners(), OptimizationMode::Rectangle);
        assert_eq!(sorted(&rect), sorted(&square_corners()));
    }

    #[test]
    fn test_rotated_rectangle_is_tight() {
        // A diamond: the axis-aligned box would be twice its area.
        let diamond = vec![
            Point::new(50.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 50.0),
        ];
        let rect = min_area_rect(&diamond);
        let area = polygon_area(&rect);
        assert!((area - polygon_area(&diamond)).abs() < 1e-6, "area {area}");
    }

    #[test]
    fn test_degenerate_input_still_gives_four_points() {
        let line = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        assert_eq!(min_area_rect(&line).len(), 4);
    }

    #[test]
    fn test_square_survives_every_mode() {
        for mode in OptimizationMode::ALL {
            let out = simplify(&square_corners(), mode);
            assert_eq!(sorted(&out), sorted(&square_corners()), "{mode}");
        }
    }

    #[test]
    fn test_zero_perimeter_and_empty_contours_do_not_panic() {
        let stuck = vec![Point::new(3.0, 3.0); 5];
        for mode in OptimizationMode::ALL {
            assert!(simplify(&stuck, mode).len() <= 5, "{mode}");
        }
        assert!(visual_points(&[]).is_empty());
        assert_eq!(simplify(&[], OptimizationMode::Rectangle), vec![Point::ZERO; 4]);
    }
}
