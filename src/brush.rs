//! Brush stroke rasterization
//!
//! A stroke covers a capsule: every pixel within `radius` of the segment
//! between its two endpoints. A single click is a stroke whose endpoints
//! coincide, which degenerates to a disc.

use crate::bounds::Bounds;
use crate::types::{AlphaMask, Point};

/// What a stroke does to the pixels it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushMode {
    /// Push coverage toward 0 (remove background)
    Erase,
    /// Push coverage toward 255 (bring foreground back)
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStroke {
    pub from: Point,
    pub to: Point,
    pub radius: u32,
    /// 1.0 is a hard edge; lower values fade coverage out over the outer
    /// `1 - hardness` share of the radius
    pub hardness: f32,
}

impl BrushStroke {
    pub fn new(from: Point, to: Point, radius: u32) -> Self {
        Self {
            from,
            to,
            radius,
            hardness: 1.0,
        }
    }

    pub fn with_hardness(mut self, hardness: f32) -> Self {
        self.hardness = hardness.clamp(0.0, 1.0);
        self
    }

    /// Pixels the stroke can touch, clipped to a `width` x `height` image
    pub fn footprint(&self, width: u32, height: u32) -> Option<Bounds> {
        let r = self.radius as i64;
        let x0 = (self.from.x.min(self.to.x) as i64 - r).max(0);
        let y0 = (self.from.y.min(self.to.y) as i64 - r).max(0);
        let x1 = (self.from.x.max(self.to.x) as i64 + r).min(width as i64 - 1);
        let y1 = (self.from.y.max(self.to.y) as i64 + r).min(height as i64 - 1);

        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Bounds::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0 + 1) as u32,
            (y1 - y0 + 1) as u32,
        ))
    }

    /// Coverage of the pixel at (x, y), 0..=255
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        let d = distance_to_segment(
            (x as f64, y as f64),
            (self.from.x as f64, self.from.y as f64),
            (self.to.x as f64, self.to.y as f64),
        );
        let radius = self.radius as f64;
        if d > radius {
            return 0;
        }

        let inner = radius * self.hardness as f64;
        if d <= inner || radius - inner <= f64::EPSILON {
            return 255;
        }
        let falloff = (radius - d) / (radius - inner);
        (falloff * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// Apply the stroke to `mask`. Returns whether any pixel changed.
    pub fn apply(&self, mask: &mut AlphaMask, mode: BrushMode) -> bool {
        let (width, height) = mask.dimensions();
        let Some(area) = self.footprint(width, height) else {
            return false;
        };

        let mut changed = false;
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let coverage = self.coverage_at(x, y);
                if coverage == 0 {
                    continue;
                }
                let old = mask.get(x, y);
                let new = match mode {
                    BrushMode::Erase => old.min(255 - coverage),
                    BrushMode::Restore => old.max(coverage),
                };
                if new != old {
                    mask.set(x, y, new);
                    changed = true;
                }
            }
        }
        changed
    }
}

/// Euclidean distance from `p` to the segment `a`-`b`
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };

    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
