// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Plane geometry used by the simplifier, hit-testing and snapping: segment
//! distances, line intersections, point-in-polygon and an axis-aligned
//! rectangle type.

use crate::models::polygon::Point;

/// Cross products below this magnitude are treated as parallel directions.
pub const PARALLEL_EPSILON: f64 = 1e-5;

/// Axis-aligned rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::ZERO, Point::new(width, height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    /// Swap coordinates so that `min <= max` on both axes.
    pub fn normalized(&self) -> Rect {
        Rect::new(
            Point::new(self.min.x.min(self.max.x), self.min.y.min(self.max.y)),
            Point::new(self.min.x.max(self.max.x), self.min.y.max(self.max.y)),
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn translate(&self, delta: Point) -> Rect {
        Rect::new(self.min + delta, self.max + delta)
    }

    /// Overlap of two rectangles, `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let min = Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        if max.x > min.x && max.y > min.y {
            Some(Rect::new(min, max))
        } else {
            None
        }
    }

    /// Corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

/// Closest point to `p` on segment `a..b` and its distance.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> (Point, f64) {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    let t = if len_sq > f64::EPSILON {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    (closest, p.distance(closest))
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len = ab.length();
    if len <= f64::EPSILON {
        return p.distance(a);
    }
    (ab.cross(p - a)).abs() / len
}

/// Orthogonal projection of `p` onto the line through `origin` along `dir`.
pub fn project_onto_line(p: Point, origin: Point, dir: Point) -> Point {
    let len_sq = dir.dot(dir);
    if len_sq <= f64::EPSILON {
        return origin;
    }
    origin + dir * ((p - origin).dot(dir) / len_sq)
}

/// Intersection of the lines `p1 + t*d1` and `p2 + s*d2`.
///
/// Directions are expected to be unit length; near-parallel pairs yield `None`.
pub fn line_intersection(p1: Point, d1: Point, p2: Point, d2: Point) -> Option<Point> {
    let denom = d1.cross(d2);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (p2 - p1).cross(d2) / denom;
    Some(p1 + d1 * t)
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y)
            && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Absolute enclosed area of a closed polygon (shoelace formula).
pub fn polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    let twice: f64 = (0..n)
        .map(|i| vertices[i].cross(vertices[(i + 1) % n]))
        .sum();
    twice.abs() / 2.0
}

/// Length of a polyline, including the closing edge when `closed`.
pub fn perimeter(vertices: &[Point], closed: bool) -> f64 {
    let open: f64 = vertices.windows(2).map(|w| w[0].distance(w[1])).sum();
    match (closed, vertices.first(), vertices.last()) {
        (true, Some(first), Some(last)) if vertices.len() > 1 => open + last.distance(*first),
        _ => open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_closest_point_is_clamped_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let (c, d) = closest_point_on_segment(Point::new(5.0, 3.0), a, b);
        assert_eq!(c, Point::new(5.0, 0.0));
        assert!((d - 3.0).abs() < 1e-9);

        let (c, d) = closest_point_on_segment(Point::new(14.0, 3.0), a, b);
        assert_eq!(c, b);
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_intersection() {
        let x = line_intersection(
            Point::new(0.0, 5.0),
            Point::new(1.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(0.0, 1.0),
        )
        .unwrap();
        assert!((x.x - 3.0).abs() < 1e-9 && (x.y - 5.0).abs() < 1e-9);

        let parallel = line_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
        );
        assert!(parallel.is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = unit_square();
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &square[..2]));
    }

    #[test]
    fn test_area_and_perimeter() {
        let square = unit_square();
        assert!((polygon_area(&square) - 100.0).abs() < 1e-9);
        assert!((perimeter(&square, true) - 40.0).abs() < 1e-9);
        assert!((perimeter(&square, false) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_and_distance() {
        let p = project_onto_line(Point::new(3.0, 4.0), Point::ZERO, Point::new(2.0, 0.0));
        assert_eq!(p, Point::new(3.0, 0.0));
        let d = perpendicular_distance(Point::new(3.0, 4.0), Point::ZERO, Point::new(1.0, 0.0));
        assert!((d - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_normalize_and_intersect() {
        let r = Rect::new(Point::new(10.0, 8.0), Point::new(2.0, 4.0)).normalized();
        assert_eq!(r.min, Point::new(2.0, 4.0));
        assert_eq!(r.max, Point::new(10.0, 8.0));

        let bounds = Rect::from_size(5.0, 5.0);
        let clipped = r.intersect(&bounds).unwrap();
        assert_eq!(clipped, Rect::new(Point::new(2.0, 4.0), Point::new(5.0, 5.0)));
        assert!(Rect::new(Point::new(6.0, 6.0), Point::new(7.0, 7.0))
            .intersect(&bounds)
            .is_none());
    }
}
