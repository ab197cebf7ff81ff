// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Contour extraction from grayscale masks.
//!
//! A mask is binarised at a fixed cut, its borders are traced with
//! Suzuki-Abe border following, and the external contour enclosing the
//! largest area is kept. Straight runs are compressed to their end points so
//! an axis-aligned box comes back as its four corners.

use crate::io::media;
use crate::models::polygon::Point;
use crate::util::geometry::polygon_area;
use anyhow::Result;
use image::{imageops, GrayImage};
use imageproc::contours::{find_contours_with_threshold, BorderType, Contour};
use std::path::Path;

/// Pixels strictly brighter than this are foreground.
pub const MASK_THRESHOLD: u8 = 127;

/// Background margin added around a mask before tracing.
const BORDER: u32 = 1;

/// Extract the largest external contour of a mask.
///
/// Returns `None` when the mask has no foreground. Ties in area go to the
/// contour traced first.
pub fn extract_contour(mask: &GrayImage) -> Option<Vec<Point>> {
    // Border following only starts a border next to a background pixel, so
    // foreground touching the image edge needs a background frame around it.
    let mut padded = GrayImage::new(mask.width() + 2 * BORDER, mask.height() + 2 * BORDER);
    imageops::replace(&mut padded, mask, i64::from(BORDER), i64::from(BORDER));
    let contours: Vec<Contour<i32>> = find_contours_with_threshold(&padded, MASK_THRESHOLD);
    let offset = f64::from(BORDER);

    let mut best: Option<(f64, Vec<Point>)> = None;
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        let points: Vec<Point> = contour
            .points
            .iter()
            .map(|p| Point::new(f64::from(p.x) - offset, f64::from(p.y) - offset))
            .collect();
        let points = compress_runs(&points);
        let area = polygon_area(&points);
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((area, points));
        }
    }

    best.map(|(_, points)| points)
}

/// Decode a mask file and extract its contour.
///
/// Decoding failures are errors; a mask without foreground is `Ok(None)`.
pub fn extract_contour_from_file(path: &Path) -> Result<Option<Vec<Point>>> {
    let mask = media::load_gray(path)?;
    let contour = extract_contour(&mask);
    match &contour {
        Some(points) => log::debug!("{}: contour with {} corners", path.display(), points.len()),
        None => log::debug!("{}: no contour", path.display()),
    }
    Ok(contour)
}

fn step(a: Point, b: Point) -> (i8, i8) {
    let sign = |v: f64| -> i8 {
        if v > 0.0 {
            1
        } else if v < 0.0 {
            -1
        } else {
            0
        }
    };
    (sign(b.x - a.x), sign(b.y - a.y))
}

/// Drop every traced point that continues the direction of the previous one.
///
/// The input is a closed chain of 8-connected pixels; the output keeps only
/// the points where the chain changes direction.
pub fn compress_runs(points: &[Point]) -> Vec<Point> {
    let mut chain: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if chain.last() != Some(p) {
            chain.push(*p);
        }
    }
    while chain.len() > 1 && chain.first() == chain.last() {
        chain.pop();
    }
    if chain.len() < 3 {
        return chain;
    }

    let n = chain.len();
    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let next = chain[(i + 1) % n];
            step(prev, chain[i]) != step(chain[i], next)
        })
        .map(|i| chain[i])
        .collect();

    if kept.is_empty() {
        chain
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        img
    }

    fn sorted(points: &[Point]) -> Vec<(i64, i64)> {
        let mut v: Vec<(i64, i64)> = points.iter().map(|p| (p.x as i64, p.y as i64)).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_full_white_mask_yields_corners() {
        let mask = GrayImage::from_pixel(100, 100, Luma([255]));
        let contour = extract_contour(&mask).unwrap();
        assert_eq!(contour.len(), 4);
        assert_eq!(sorted(&contour), vec![(0, 0), (0, 99), (99, 0), (99, 99)]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let dim = GrayImage::from_pixel(10, 10, Luma([127]));
        assert!(extract_contour(&dim).is_none());
        let bright = GrayImage::from_pixel(10, 10, Luma([128]));
        assert!(extract_contour(&bright).is_some());
    }

    #[test]
    fn test_regions_touching_each_edge() {
        let cases = [
            (filled(64, 64, 0, 10, 20, 30), vec![(0, 10), (0, 29), (19, 10), (19, 29)]),
            (filled(64, 64, 10, 0, 30, 20), vec![(10, 0), (10, 19), (29, 0), (29, 19)]),
            (filled(64, 64, 44, 10, 64, 30), vec![(44, 10), (44, 29), (63, 10), (63, 29)]),
            (filled(64, 64, 10, 44, 30, 64), vec![(10, 44), (10, 63), (29, 44), (29, 63)]),
        ];
        for (mask, corners) in cases {
            let contour = extract_contour(&mask).unwrap();
            assert_eq!(sorted(&contour), corners);
        }
    }

    #[test]
    fn test_empty_mask_has_no_contour() {
        assert!(extract_contour(&GrayImage::new(16, 16)).is_none());
    }

    #[test]
    fn test_largest_region_wins() {
        let mut mask = filled(60, 60, 2, 2, 8, 8);
        for y in 20..50 {
            for x in 20..50 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let contour = extract_contour(&mask).unwrap();
        assert_eq!(sorted(&contour), vec![(20, 20), (20, 49), (49, 20), (49, 49)]);
    }

    #[test]
    fn test_hole_does_not_replace_outer_border() {
        let mut mask = filled(40, 40, 5, 5, 35, 35);
        for y in 10..30 {
            for x in 10..30 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let contour = extract_contour(&mask).unwrap();
        assert_eq!(sorted(&contour), vec![(5, 5), (5, 34), (34, 5), (34, 34)]);
    }

    #[test]
    fn test_compress_runs_keeps_direction_changes() {
        let chain: Vec<Point> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)]
            .iter()
            .map(|&(x, y)| Point::new(x as f64, y as f64))
            .collect();
        let compressed = compress_runs(&chain);
        assert_eq!(sorted(&compressed), vec![(0, 0), (0, 2), (2, 0), (2, 2)]);
    }
}
