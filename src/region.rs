//! Color-connected region detection
//!
//! A 4-connected flood fill from a seed pixel. Used for the hover highlight,
//! for one-click background removal and for paint-bucket fills of the mask.

use std::collections::VecDeque;

use image::{GrayImage, Luma};
use log::debug;

use crate::bounds::{Bounds, BoundsBuilder};
use crate::types::{PixelBuffer, Point};

/// Tolerance used for interactive region removal
pub const REGION_DETECT_TOLERANCE: u8 = 10;
/// Tolerance used by the paint bucket: exact color match only
pub const PAINT_BUCKET_TOLERANCE: u8 = 0;

const REGION_ON: u8 = 255;

/// A set of pixels selected by flood fill, stored as a same-size binary
/// buffer (255 = selected)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    mask: GrayImage,
    pixel_count: usize,
    bounds: Option<Bounds>,
}

impl Region {
    /// Region that selects nothing
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::new(width, height),
            pixel_count: 0,
            bounds: None,
        }
    }

    /// Build a region from an arbitrary binary buffer (non-zero = selected)
    pub fn from_mask(mask: GrayImage) -> Self {
        let mut builder = BoundsBuilder::new();
        let mut pixel_count = 0;
        for (x, y, pixel) in mask.enumerate_pixels() {
            if pixel.0[0] != 0 {
                builder.update(x, y);
                pixel_count += 1;
            }
        }

        Self {
            mask,
            pixel_count,
            bounds: builder.build(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }

    /// Number of selected pixels
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Bounding rectangle of the selection, for preview rendering
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.mask.width() && y < self.mask.height() && self.mask.get_pixel(x, y).0[0] != 0
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Selected pixel coordinates in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.mask
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] != 0)
            .map(|(x, y, _)| (x, y))
    }
}

/// Flood fill from `seed`, taking every 4-connected pixel whose color
/// channels each differ from the seed color by at most `tolerance`.
///
/// A seed outside the image yields an empty region. Alpha is ignored.
pub fn detect_region(image: &PixelBuffer, seed: Point, tolerance: u8) -> Region {
    let (width, height) = image.dimensions();
    if !image.contains(seed) {
        debug!(
            "region seed ({}, {}) outside {}x{} image",
            seed.x, seed.y, width, height
        );
        return Region::empty(width, height);
    }

    let w = width as usize;
    let h = height as usize;
    let (sx, sy) = (seed.x as usize, seed.y as usize);
    let reference = image.rgb(sx as u32, sy as u32);

    let mut mask = GrayImage::new(width, height);
    let mut visited = vec![false; w * h];
    let mut queue = VecDeque::new();
    let mut builder = BoundsBuilder::new();
    let mut pixel_count = 0;

    queue.push_back((sx, sy));
    visited[sy * w + sx] = true;

    while let Some((x, y)) = queue.pop_front() {
        if !color_matches(image.rgb(x as u32, y as u32), reference, tolerance) {
            continue;
        }

        mask.put_pixel(x as u32, y as u32, Luma([REGION_ON]));
        builder.update(x as u32, y as u32);
        pixel_count += 1;

        // Fixed neighbor order keeps the traversal deterministic
        for (dx, dy) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let nidx = ny * w + nx;
            if !visited[nidx] {
                visited[nidx] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    debug!(
        "region at ({}, {}) tolerance {} covers {} pixels",
        seed.x, seed.y, tolerance, pixel_count
    );

    Region {
        mask,
        pixel_count,
        bounds: builder.build(),
    }
}

/// Every channel within tolerance of the reference
#[inline]
fn color_matches(color: [u8; 3], reference: [u8; 3], tolerance: u8) -> bool {
    color
        .iter()
        .zip(reference.iter())
        .all(|(&c, &r)| c.abs_diff(r) <= tolerance)
}
