//! Non-destructive mask editing session
//!
//! An [`EditSession`] owns one source image, the alpha mask being edited and
//! the undo history for that mask. Callers hold the session and drive it
//! with discrete edit calls; nothing here is global.
//!
//! History grain: every discrete call commits one snapshot. Continuous
//! pointer drags are bracketed with [`EditSession::begin_gesture`] and
//! [`EditSession::end_gesture`]; all strokes inside the bracket become a
//! single snapshot. Calls that leave the mask unchanged do not commit.
//!
//! A session is not thread-safe; serialize calls on one instance.

use image::RgbaImage;
use log::{info, warn};

use crate::bounds::Bounds;
use crate::brush::{BrushMode, BrushStroke};
use crate::composite::composite;
use crate::config::EngineConfig;
use crate::error::{EditError, Result};
use crate::history::History;
use crate::region::{Region, detect_region};
use crate::segment::{Segmenter, segment_checked};
use crate::types::{AlphaMask, PixelBuffer, Point};

#[derive(Debug, Clone)]
pub struct EditSession {
    image: PixelBuffer,
    mask: AlphaMask,
    history: History,
    config: EngineConfig,
    gesture_open: bool,
    /// The mask was edited since the last commit, undo or redo
    dirty: bool,
}

impl EditSession {
    /// Start with everything kept and the default configuration
    pub fn new(image: PixelBuffer) -> Self {
        let config = EngineConfig::default();
        let mask = AlphaMask::opaque(image.width(), image.height());
        let history = History::with_depth(mask.clone(), config.history_depth);
        Self {
            image,
            mask,
            history,
            config,
            gesture_open: false,
            dirty: false,
        }
    }

    pub fn with_config(image: PixelBuffer, config: EngineConfig) -> Result<Self> {
        let mask = AlphaMask::opaque(image.width(), image.height());
        Self::with_mask(image, mask, config)
    }

    /// Start from an existing mask, which must match the image size
    pub fn with_mask(image: PixelBuffer, mask: AlphaMask, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        check_dimensions(&image, &mask)?;
        let history = History::with_depth(mask.clone(), config.history_depth);
        Ok(Self {
            image,
            mask,
            history,
            config,
            gesture_open: false,
            dirty: false,
        })
    }

    /// Start from a segmenter's output
    pub fn from_segmentation(
        image: PixelBuffer,
        segmenter: &dyn Segmenter,
        config: EngineConfig,
    ) -> Result<Self> {
        let mask = segment_checked(segmenter, &image)?;
        Self::with_mask(image, mask, config)
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn mask(&self) -> &AlphaMask {
        &self.mask
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.dirty
    }

    pub fn can_redo(&self) -> bool {
        !self.dirty && self.history.can_redo()
    }

    pub fn is_gesture_open(&self) -> bool {
        self.gesture_open
    }

    /// Replace the source image; the mask and history start over
    pub fn load(&mut self, image: PixelBuffer) {
        info!("loading {}x{} image into session", image.width(), image.height());
        self.mask = AlphaMask::opaque(image.width(), image.height());
        self.image = image;
        self.history.reset(self.mask.clone());
        self.gesture_open = false;
        self.dirty = false;
    }

    /// Back to an all-opaque mask with a fresh history
    pub fn reset(&mut self) {
        info!("resetting mask to fully opaque");
        self.mask = AlphaMask::opaque(self.image.width(), self.image.height());
        self.history.reset(self.mask.clone());
        self.gesture_open = false;
        self.dirty = false;
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Open a continuous gesture; edits commit once at `end_gesture`
    pub fn begin_gesture(&mut self) {
        if self.gesture_open {
            self.end_gesture();
        }
        self.gesture_open = true;
    }

    /// Close the gesture. Returns whether a snapshot was committed.
    pub fn end_gesture(&mut self) -> bool {
        if !self.gesture_open {
            return false;
        }
        self.gesture_open = false;
        self.commit()
    }

    /// Drop the gesture's edits and return to the last committed mask
    pub fn cancel_gesture(&mut self) {
        if self.gesture_open {
            self.gesture_open = false;
            self.mask = self.history.current().clone();
            self.dirty = false;
        }
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Remove (alpha 0) the capsule around the segment `from`-`to`
    pub fn paint_stroke(&mut self, from: Point, to: Point, radius: u32) -> Result<bool> {
        self.apply_stroke(from, to, radius, BrushMode::Erase)
    }

    /// Restore (alpha 255) the capsule around the segment `from`-`to`
    pub fn restore_stroke(&mut self, from: Point, to: Point, radius: u32) -> Result<bool> {
        self.apply_stroke(from, to, radius, BrushMode::Restore)
    }

    fn apply_stroke(&mut self, from: Point, to: Point, radius: u32, mode: BrushMode) -> Result<bool> {
        if radius == 0 {
            warn!("rejected stroke with zero radius");
            return Err(EditError::invalid("brush radius must be at least 1"));
        }

        let stroke =
            BrushStroke::new(from, to, radius).with_hardness(self.config.brush_hardness);
        let changed = stroke.apply(&mut self.mask, mode);
        if changed {
            self.dirty = true;
            self.commit();
        }
        Ok(changed)
    }

    /// Set every pixel of `region` to `value` (0 or 255)
    pub fn fill_region(&mut self, region: &Region, value: u8) -> Result<bool> {
        if value != AlphaMask::TRANSPARENT && value != AlphaMask::OPAQUE {
            return Err(EditError::invalid(format!(
                "fill value must be 0 or 255, got {}",
                value
            )));
        }
        if region.dimensions() != self.mask.dimensions() {
            return Err(EditError::DimensionMismatch {
                expected: self.mask.dimensions(),
                actual: region.dimensions(),
            });
        }

        let mut changed = false;
        for (dst, &selected) in self.mask.as_raw_mut().iter_mut().zip(region.mask().as_raw()) {
            if selected != 0 && *dst != value {
                *dst = value;
                changed = true;
            }
        }

        if changed {
            self.dirty = true;
            self.commit();
        }
        Ok(changed)
    }

    /// Region under `seed` using the session tolerance; never mutates
    pub fn detect_region_at(&self, seed: Point) -> Region {
        detect_region(&self.image, seed, self.config.region_tolerance)
    }

    /// Remove the color-connected region under `seed`
    pub fn remove_region_at(&mut self, seed: Point) -> Result<bool> {
        self.require_inside(seed)?;
        let region = self.detect_region_at(seed);
        self.fill_region(&region, AlphaMask::TRANSPARENT)
    }

    /// Paint-bucket: set the mask over the color-connected region under
    /// `seed` to `value`
    pub fn fill_at(&mut self, seed: Point, tolerance: u8, value: u8) -> Result<bool> {
        self.require_inside(seed)?;
        let region = detect_region(&self.image, seed, tolerance);
        self.fill_region(&region, value)
    }

    /// Replace the mask with a segmenter's output as one undoable step.
    /// On failure the mask is left untouched.
    pub fn apply_segmentation(&mut self, segmenter: &dyn Segmenter) -> Result<bool> {
        let mask = segment_checked(segmenter, &self.image)?;
        info!("applying {} segmentation", segmenter.name());
        self.apply_mask(mask)
    }

    /// Replace the mask wholesale (e.g. with a background job's result)
    pub fn apply_mask(&mut self, mask: AlphaMask) -> Result<bool> {
        check_dimensions(&self.image, &mask)?;
        if mask == self.mask {
            return Ok(false);
        }
        self.mask = mask;
        self.dirty = true;
        self.commit();
        Ok(true)
    }

    /// Crop source and mask to `bounds` (clamped to the image).
    /// History starts over from the cropped mask.
    pub fn crop(&mut self, bounds: Bounds) -> Result<()> {
        let image = self.image.crop(bounds)?;
        let mask = self.mask.crop(bounds)?;
        info!(
            "cropped session from {}x{} to {}x{}",
            self.image.width(),
            self.image.height(),
            image.width(),
            image.height()
        );

        self.image = image;
        self.mask = mask;
        self.history.reset(self.mask.clone());
        self.gesture_open = false;
        self.dirty = false;
        Ok(())
    }

    /// Current colors with the current mask as alpha, including any
    /// uncommitted gesture
    pub fn composite(&self) -> Result<RgbaImage> {
        composite(&self.image, &self.mask)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Step back one committed action. An open gesture is committed first.
    /// Returns the restored mask, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&AlphaMask> {
        self.end_gesture();
        let mask = self.history.undo()?;
        self.mask = mask;
        self.dirty = false;
        Some(&self.mask)
    }

    /// Step forward again. An open gesture is committed first, which
    /// discards the redo branch.
    pub fn redo(&mut self) -> Option<&AlphaMask> {
        self.end_gesture();
        let mask = self.history.redo()?;
        self.mask = mask;
        self.dirty = false;
        Some(&self.mask)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Snapshot the mask unless a gesture is open or nothing changed.
    /// Edits that cancel out inside a gesture leave no snapshot.
    fn commit(&mut self) -> bool {
        if self.gesture_open || !self.dirty {
            return false;
        }
        self.dirty = false;
        if &self.mask == self.history.current() {
            return false;
        }
        self.history.commit(&self.mask);
        true
    }

    fn require_inside(&self, seed: Point) -> Result<()> {
        if self.image.contains(seed) {
            return Ok(());
        }
        warn!("rejected seed ({}, {}) outside image", seed.x, seed.y);
        Err(EditError::invalid(format!(
            "seed ({}, {}) outside {}x{} image",
            seed.x,
            seed.y,
            self.image.width(),
            self.image.height()
        )))
    }
}

fn check_dimensions(image: &PixelBuffer, mask: &AlphaMask) -> Result<()> {
    if image.dimensions() != mask.dimensions() {
        return Err(EditError::DimensionMismatch {
            expected: image.dimensions(),
            actual: mask.dimensions(),
        });
    }
    Ok(())
}
