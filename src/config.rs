//! Engine configuration
//!
//! Collects every tunable the engine exposes. `Default` gives the values the
//! editor ships with.

use crate::error::{EditError, Result};
use crate::region::REGION_DETECT_TOLERANCE;
use crate::segment::SegmentOptions;

/// Retained undo depth
pub const DEFAULT_HISTORY_DEPTH: usize = 20;
/// Brush radius in pixels
pub const DEFAULT_BRUSH_RADIUS: u32 = 20;

/// Options for an editing session
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Automatic background segmentation
    pub segment: SegmentOptions,
    /// Per-channel tolerance for region detection and region removal
    pub region_tolerance: u8,
    /// Maximum number of retained history snapshots
    pub history_depth: usize,
    /// Default paint/erase radius
    pub brush_radius: u32,
    /// Brush edge hardness in [0, 1]; 1.0 is a hard edge
    pub brush_hardness: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            segment: SegmentOptions::default(),
            region_tolerance: REGION_DETECT_TOLERANCE,
            history_depth: DEFAULT_HISTORY_DEPTH,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            brush_hardness: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    pub fn with_brush_radius(mut self, radius: u32) -> Self {
        self.brush_radius = radius;
        self
    }

    pub fn with_brush_hardness(mut self, hardness: f32) -> Self {
        self.brush_hardness = hardness;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.segment.validate()?;
        if self.history_depth == 0 {
            return Err(EditError::invalid("history depth must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.brush_hardness) {
            return Err(EditError::invalid(format!(
                "brush hardness {} outside [0, 1]",
                self.brush_hardness
            )));
        }
        Ok(())
    }
}
