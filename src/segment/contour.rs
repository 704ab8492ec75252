//! External contour extraction and filtering
//!
//! Finds the outer boundaries of the foreground blobs, drops the ones that
//! are small relative to the largest, and rasterizes the survivors as solid
//! regions (holes included).

use std::collections::{HashSet, VecDeque};

use image::{GrayImage, Luma, imageops};
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;
use imageproc::region_labelling::{Connectivity, connected_components};

use super::mask::{BinaryMask, MASK_OFF, MASK_ON};

/// Outer boundary of one foreground blob
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalContour {
    /// Boundary pixel coordinates in tracing order
    pub points: Vec<Point<i32>>,
    /// Polygon area enclosed by `points`
    pub area: f64,
}

impl ExternalContour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        let area = contour_area(&points);
        Self { points, area }
    }
}

/// Shoelace area of a closed polygon through the given points
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area: i64 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }

    twice_area.abs() as f64 / 2.0
}

/// Outer boundaries only; holes and anything nested inside them are skipped.
///
/// The mask is traced inside a one-pixel unmarked frame, so blobs touching
/// the image edge still get an outer border. Points are in `mask` coordinates.
pub fn find_external_contours(mask: &BinaryMask) -> Vec<ExternalContour> {
    let (width, height) = mask.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut framed, mask, 1, 1);

    find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            ExternalContour::new(points)
        })
        .collect()
}

/// Keep every contour whose area is at least `min_ratio` of the largest one.
/// The result is ordered by descending area.
pub fn select_significant_contours(
    mut contours: Vec<ExternalContour>,
    min_ratio: f64,
) -> Vec<ExternalContour> {
    // Stable sort keeps tracing order among equal areas
    contours.sort_by(|a, b| b.area.total_cmp(&a.area));

    let Some(max_area) = contours.first().map(|c| c.area) else {
        return contours;
    };
    let min_area = max_area * min_ratio;

    contours.retain(|c| c.area >= min_area);
    contours
}

/// Rasterize the blobs bounded by `contours` as solid regions.
///
/// `mask` must be the mask the contours were traced from: each contour's
/// first point identifies its 8-connected blob there.
pub fn fill_contours(mask: &BinaryMask, contours: &[ExternalContour]) -> BinaryMask {
    let (width, height) = mask.dimensions();
    let labels = connected_components(mask, Connectivity::Eight, Luma([MASK_OFF]));

    let retained: HashSet<u32> = contours
        .iter()
        .filter_map(|c| c.points.first())
        .map(|p| labels.get_pixel(p.x as u32, p.y as u32).0[0])
        .filter(|&label| label != 0)
        .collect();

    let mut filled = GrayImage::new(width, height);
    for (dst, label) in filled.pixels_mut().zip(labels.pixels()) {
        if retained.contains(&label.0[0]) {
            *dst = Luma([MASK_ON]);
        }
    }

    fill_enclosed_holes(&mut filled);
    filled
}

/// Mark every unmarked pixel that cannot reach the image border through
/// 4-connected unmarked pixels
fn fill_enclosed_holes(mask: &mut BinaryMask) {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let w = width as usize;
    let h = height as usize;
    let mut outside = vec![false; w * h];
    let mut queue = VecDeque::new();

    let visit = |x: usize, y: usize, outside: &mut Vec<bool>, queue: &mut VecDeque<_>| {
        let idx = y * w + x;
        if !outside[idx] && mask.as_raw()[idx] == MASK_OFF {
            outside[idx] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        visit(x, 0, &mut outside, &mut queue);
        visit(x, h - 1, &mut outside, &mut queue);
    }
    for y in 0..h {
        visit(0, y, &mut outside, &mut queue);
        visit(w - 1, y, &mut outside, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        if x > 0 {
            visit(x - 1, y, &mut outside, &mut queue);
        }
        if x + 1 < w {
            visit(x + 1, y, &mut outside, &mut queue);
        }
        if y > 0 {
            visit(x, y - 1, &mut outside, &mut queue);
        }
        if y + 1 < h {
            visit(x, y + 1, &mut outside, &mut queue);
        }
    }

    for (value, is_outside) in mask.iter_mut().zip(outside) {
        if !is_outside {
            *value = MASK_ON;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(size: u32, x: u32, y: u32, side: u32) -> BinaryMask {
        let mut mask = GrayImage::new(size, size);
        for py in y..y + side {
            for px in x..x + side {
                mask.put_pixel(px, py, Luma([MASK_ON]));
            }
        }
        mask
    }

    #[test]
    fn test_contour_area_square() {
        let points = vec![
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(4, 4),
            Point::new(0, 4),
        ];
        assert_eq!(contour_area(&points), 16.0);
    }

    #[test]
    fn test_contour_area_degenerate() {
        assert_eq!(contour_area(&[Point::new(1, 1)]), 0.0);
        assert_eq!(contour_area(&[Point::new(1, 1), Point::new(2, 1)]), 0.0);
    }

    #[test]
    fn test_empty_mask_has_no_contours() {
        let mask = GrayImage::new(10, 10);
        assert!(find_external_contours(&mask).is_empty());
    }

    fn extent(contour: &ExternalContour) -> (i32, i32, i32, i32) {
        let xs = contour.points.iter().map(|p| p.x);
        let ys = contour.points.iter().map(|p| p.y);
        (
            xs.clone().min().unwrap(),
            ys.clone().min().unwrap(),
            xs.max().unwrap(),
            ys.max().unwrap(),
        )
    }

    #[test]
    fn test_hole_is_not_external() {
        // 7x7 ring: one outer border, one hole border
        let mut mask = square_mask(9, 1, 1, 7);
        mask.put_pixel(4, 4, Luma([MASK_OFF]));
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(extent(&contours[0]), (1, 1, 7, 7));
    }

    #[test]
    fn test_blob_on_left_edge_is_external() {
        let mask = square_mask(10, 0, 0, 4);
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(extent(&contours[0]), (0, 0, 3, 3));
        assert_eq!(contours[0].area, 9.0);
    }

    #[test]
    fn test_full_mask_is_one_external_contour() {
        let mask = GrayImage::from_pixel(6, 5, Luma([MASK_ON]));
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(extent(&contours[0]), (0, 0, 5, 4));

        let filled = fill_contours(&mask, &contours);
        assert!(filled.pixels().all(|p| p.0[0] == MASK_ON));
    }

    #[test]
    fn test_select_significant_contours() {
        let big = ExternalContour {
            points: vec![Point::new(0, 0)],
            area: 1000.0,
        };
        let medium = ExternalContour {
            points: vec![Point::new(1, 1)],
            area: 50.0,
        };
        let speck = ExternalContour {
            points: vec![Point::new(2, 2)],
            area: 49.0,
        };

        let kept = select_significant_contours(vec![speck, big.clone(), medium.clone()], 0.05);
        assert_eq!(kept, vec![big, medium]);
    }

    #[test]
    fn test_fill_contours_fills_holes() {
        let mut mask = square_mask(9, 1, 1, 7);
        mask.put_pixel(4, 4, Luma([MASK_OFF]));
        let contours = find_external_contours(&mask);

        let filled = fill_contours(&mask, &contours);
        assert_eq!(filled.get_pixel(4, 4).0[0], MASK_ON);
        assert_eq!(filled.get_pixel(0, 0).0[0], MASK_OFF);
    }

    #[test]
    fn test_fill_contours_skips_unselected_blob() {
        let mut mask = square_mask(20, 1, 1, 10);
        mask.put_pixel(17, 17, Luma([MASK_ON]));
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 2);

        let significant = select_significant_contours(contours, 0.05);
        assert_eq!(significant.len(), 1);

        let filled = fill_contours(&mask, &significant);
        assert_eq!(filled.get_pixel(5, 5).0[0], MASK_ON);
        assert_eq!(filled.get_pixel(17, 17).0[0], MASK_OFF);
    }
}
