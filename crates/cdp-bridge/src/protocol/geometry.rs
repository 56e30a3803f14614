// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Element geometry
//
// Pure functions over the quads the browser reports for a node. The
// browser sends every quad as 8 numbers (x1, y1, ... x4, y4) in CSS pixels
// relative to the viewport.

use serde::{Deserialize, Serialize};

/// Quads with this area or less are not clickable.
pub const MIN_CLICKABLE_AREA: f64 = 1.0;

/// A viewport-relative point in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four corners of a possibly rotated or clipped rectangle.
pub type Quad = [Point; 4];

/// Axis-aligned box around a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A relative point translated into viewport space, with the scroll needed
/// to bring it at least one pixel inside every viewport edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedPoint {
    pub point: Point,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl ResolvedPoint {
    pub fn needs_scroll(&self) -> bool {
        self.scroll_x != 0.0 || self.scroll_y != 0.0
    }
}

/// Converts a raw 8-number quad into points. `None` for malformed input.
pub fn quad_from_raw(raw: &[f64]) -> Option<Quad> {
    if raw.len() < 8 {
        return None;
    }
    Some([
        Point::new(raw[0], raw[1]),
        Point::new(raw[2], raw[3]),
        Point::new(raw[4], raw[5]),
        Point::new(raw[6], raw[7]),
    ])
}

/// Shoelace area of a quad. Independent of winding direction.
pub fn compute_quad_area(quad: &Quad) -> f64 {
    let mut area = 0.0;
    for (i, p1) in quad.iter().enumerate() {
        let p2 = &quad[(i + 1) % quad.len()];
        area += (p1.x * p2.y - p2.x * p1.y) / 2.0;
    }
    area.abs()
}

/// Clamps every corner into `[0, width] x [0, height]`.
pub fn clip_quad(quad: &Quad, width: f64, height: f64) -> Quad {
    quad.map(|p| Point::new(p.x.clamp(0.0, width.max(0.0)), p.y.clamp(0.0, height.max(0.0))))
}

/// Mean of the four corners.
pub fn quad_center(quad: &Quad) -> Point {
    let (x, y) = quad
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Point::new(x / 4.0, y / 4.0)
}

/// Centroid of the first quad that stays larger than one pixel after being
/// clipped to the viewport. Browser order is kept; nothing is sorted.
pub fn clickable_point(raw_quads: &[Vec<f64>], viewport_width: f64, viewport_height: f64) -> Option<Point> {
    raw_quads
        .iter()
        .filter_map(|raw| quad_from_raw(raw))
        .map(|quad| clip_quad(&quad, viewport_width, viewport_height))
        .find(|quad| compute_quad_area(quad) > MIN_CLICKABLE_AREA)
        .map(|quad| quad_center(&quad))
}

/// Min/max extents of a raw quad.
pub fn bounding_box(raw: &[f64]) -> Option<BoundingBox> {
    let quad = quad_from_raw(raw)?;
    let (min_x, max_x, min_y, max_y) = quad.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    );
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

/// Translates an element-relative offset into the viewport.
///
/// The origin is the minimum corner of the padding quad; without one the
/// offset is used as-is. Scroll deltas keep the point one pixel inside the
/// viewport on each axis.
pub fn resolve_relative_point(
    padding_quad: Option<&[f64]>,
    relative: Point,
    viewport_width: f64,
    viewport_height: f64,
) -> ResolvedPoint {
    let point = match padding_quad.and_then(quad_from_raw) {
        Some(quad) => {
            let min_x = quad.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let min_y = quad.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            Point::new(min_x + relative.x, min_y + relative.y)
        }
        None => relative,
    };

    let mut scroll_x = 0.0;
    let mut scroll_y = 0.0;
    if point.x < 1.0 {
        scroll_x = point.x - 1.0;
    }
    if point.x > viewport_width - 1.0 {
        scroll_x = point.x - viewport_width + 1.0;
    }
    if point.y < 1.0 {
        scroll_y = point.y - 1.0;
    }
    if point.y > viewport_height - 1.0 {
        scroll_y = point.y - viewport_height + 1.0;
    }

    ResolvedPoint {
        point,
        scroll_x,
        scroll_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<f64> {
        vec![x, y, x + size, y, x + size, y + size, x, y + size]
    }

    #[test]
    fn test_unit_square_area() {
        let quad = quad_from_raw(&square(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(compute_quad_area(&quad), 1.0);
    }

    #[test]
    fn test_area_invariant_under_rotation_and_winding() {
        let quad = quad_from_raw(&[0.0, 0.0, 4.0, 1.0, 5.0, 6.0, -1.0, 3.0]).unwrap();
        let area = compute_quad_area(&quad);
        assert!(area > 0.0);
        for shift in 1..4 {
            let mut rotated = quad;
            rotated.rotate_left(shift);
            assert_eq!(compute_quad_area(&rotated), area);
        }
        let mut reversed = quad;
        reversed.reverse();
        assert_eq!(compute_quad_area(&reversed), area);
    }

    #[test]
    fn test_collinear_quad_has_zero_area() {
        let quad = quad_from_raw(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]).unwrap();
        assert_eq!(compute_quad_area(&quad), 0.0);
    }

    #[test]
    fn test_clip_quad_to_viewport() {
        let quad = quad_from_raw(&[-10.0, -5.0, 900.0, -5.0, 900.0, 700.0, -10.0, 700.0]).unwrap();
        let clipped = clip_quad(&quad, 800.0, 600.0);
        assert_eq!(clipped[0], Point::new(0.0, 0.0));
        assert_eq!(clipped[2], Point::new(800.0, 600.0));
    }

    #[test]
    fn test_clickable_point_skips_tiny_quads() {
        let quads = vec![square(0.0, 0.0, 1.0), square(10.0, 20.0, 10.0)];
        let point = clickable_point(&quads, 800.0, 600.0).unwrap();
        assert_eq!(point, Point::new(15.0, 25.0));
    }

    #[test]
    fn test_clickable_point_takes_first_surviving_quad() {
        let quads = vec![square(10.0, 10.0, 2.0), square(100.0, 100.0, 50.0)];
        let point = clickable_point(&quads, 800.0, 600.0).unwrap();
        assert_eq!(point, Point::new(11.0, 11.0));
    }

    #[test]
    fn test_clickable_point_none_when_offscreen() {
        let quads = vec![square(1000.0, 1000.0, 50.0)];
        assert_eq!(clickable_point(&quads, 800.0, 600.0), None);
        assert_eq!(clickable_point(&[], 800.0, 600.0), None);
    }

    #[test]
    fn test_clickable_point_uses_visible_part() {
        let quads = vec![square(-50.0, -50.0, 100.0)];
        let point = clickable_point(&quads, 800.0, 600.0).unwrap();
        assert_eq!(point, Point::new(25.0, 25.0));
    }

    #[test]
    fn test_bounding_box_from_rotated_quad() {
        let bbox = bounding_box(&[5.0, 0.0, 10.0, 5.0, 5.0, 10.0, 0.0, 5.0]).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0
            }
        );
        assert_eq!(bounding_box(&[1.0, 2.0]), None);
    }

    #[test]
    fn test_relative_point_inside_viewport_needs_no_scroll() {
        let padding = square(100.0, 100.0, 50.0);
        let resolved = resolve_relative_point(Some(&padding), Point::new(10.0, 10.0), 800.0, 600.0);
        assert_eq!(resolved.point, Point::new(110.0, 110.0));
        assert!(!resolved.needs_scroll());
    }

    #[test]
    fn test_relative_point_offset_from_padding_origin() {
        let padding = square(500.0, 500.0, 20.0);
        let resolved = resolve_relative_point(Some(&padding), Point::new(5.0, 5.0), 800.0, 600.0);
        assert_eq!(resolved.point, Point::new(505.0, 505.0));
        assert_eq!((resolved.scroll_x, resolved.scroll_y), (0.0, 0.0));
    }

    #[test]
    fn test_relative_point_without_box_model() {
        let resolved = resolve_relative_point(None, Point::new(30.0, 40.0), 800.0, 600.0);
        assert_eq!(resolved.point, Point::new(30.0, 40.0));
        assert!(!resolved.needs_scroll());
    }

    #[test]
    fn test_relative_point_scroll_margins() {
        let below = resolve_relative_point(None, Point::new(400.0, 900.0), 800.0, 600.0);
        assert_eq!(below.scroll_x, 0.0);
        assert_eq!(below.scroll_y, 301.0);

        let left = resolve_relative_point(None, Point::new(0.5, 300.0), 800.0, 600.0);
        assert_eq!(left.scroll_x, -0.5);

        let edge = resolve_relative_point(None, Point::new(799.0, 599.0), 800.0, 600.0);
        assert!(!edge.needs_scroll());
        let past_edge = resolve_relative_point(None, Point::new(799.5, 1.0), 800.0, 600.0);
        assert_eq!(past_edge.scroll_x, 0.5);
    }
}
