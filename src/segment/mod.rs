//! Automatic background segmentation
//!
//! Turns a raw sprite into an alpha mask by assuming a near-white backdrop.
//!
//! The classic pipeline:
//! 1. Drop alpha and keep the three color channels
//! 2. Mark near-white pixels as background and invert to get the foreground
//! 3. Open, then close, with a square kernel to remove specks and pinholes
//! 4. Trace the external contours of what remains
//! 5. Keep the contours whose area is a meaningful share of the largest one
//! 6. Fill the kept contours solid and dilate once to protect soft edges
//!
//! Any other back-end (for example a learned model) plugs in through the
//! [`Segmenter`] trait and is held to the same contract.

mod contour;
mod job;
mod mask;

use std::panic::{self, AssertUnwindSafe};

use log::debug;

use crate::error::{EditError, Result};
use crate::types::{AlphaMask, PixelBuffer};

pub use contour::{
    ExternalContour, contour_area, fill_contours, find_external_contours,
    select_significant_contours,
};
pub use job::BackgroundSegmentation;
pub use mask::{
    BinaryMask, clean_mask, close_mask, create_custom_mask, create_near_white_mask, dilate_mask,
    invert_mask, open_mask,
};

/// Options for threshold segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOptions {
    /// Lower bound per channel for a pixel to count as background (upper bound is 255)
    pub white_threshold: u8,
    /// Contours smaller than this share of the largest contour are discarded
    pub min_area_ratio: f64,
    /// Side of the square structuring element (odd)
    pub kernel_size: u8,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            white_threshold: 220,
            min_area_ratio: 0.05,
            kernel_size: 3,
        }
    }
}

impl SegmentOptions {
    pub fn validate(&self) -> Result<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(EditError::invalid(format!(
                "kernel size must be odd, got {}",
                self.kernel_size
            )));
        }
        if !(0.0..=1.0).contains(&self.min_area_ratio) {
            return Err(EditError::invalid(format!(
                "contour area ratio {} outside [0, 1]",
                self.min_area_ratio
            )));
        }
        Ok(())
    }
}

/// A back-end that produces an alpha mask for an image.
///
/// Implementations are pure: the same image always yields the same mask,
/// and they may be called from any thread.
pub trait Segmenter: Send + Sync {
    fn segment(&self, image: &PixelBuffer) -> Result<AlphaMask>;

    /// Short name for logs and UI labels
    fn name(&self) -> &str {
        "custom"
    }
}

/// Near-white thresholding with morphology and contour filtering
#[derive(Debug, Clone, Default)]
pub struct ThresholdSegmenter {
    options: SegmentOptions,
}

impl ThresholdSegmenter {
    pub fn new(options: SegmentOptions) -> Self {
        Self { options }
    }
}

impl Segmenter for ThresholdSegmenter {
    fn segment(&self, image: &PixelBuffer) -> Result<AlphaMask> {
        self.options.validate()?;
        let (width, height) = image.dimensions();
        let kernel = self.options.kernel_size;

        let rgb = image.to_rgb_image();
        let background = create_near_white_mask(&rgb, self.options.white_threshold);
        let foreground = invert_mask(&background);

        let cleaned = clean_mask(&foreground, kernel);

        let contours = find_external_contours(&cleaned);
        if contours.is_empty() {
            debug!("segmentation found no foreground in {}x{} image", width, height);
            return Ok(AlphaMask::transparent(width, height));
        }

        let found = contours.len();
        let significant = select_significant_contours(contours, self.options.min_area_ratio);
        debug!(
            "segmentation kept {} of {} contours (largest area {:.1})",
            significant.len(),
            found,
            significant.first().map(|c| c.area).unwrap_or_default()
        );

        let filled = fill_contours(&cleaned, &significant);
        let dilated = dilate_mask(&filled, kernel);

        Ok(AlphaMask::from_gray_image(dilated))
    }

    fn name(&self) -> &str {
        "threshold"
    }
}

/// Adapter that lets a closure act as a segmentation back-end
pub struct FnSegmenter<F> {
    name: String,
    func: F,
}

impl<F> FnSegmenter<F>
where
    F: Fn(&PixelBuffer) -> Result<AlphaMask> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Segmenter for FnSegmenter<F>
where
    F: Fn(&PixelBuffer) -> Result<AlphaMask> + Send + Sync,
{
    fn segment(&self, image: &PixelBuffer) -> Result<AlphaMask> {
        (self.func)(image)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Run any back-end and hold its output to the segmentation contract.
///
/// Panics and internal errors become `SegmentationUnavailable`, as does a
/// mask whose size does not match the image. `InvalidInput` passes through.
pub fn segment_checked(segmenter: &dyn Segmenter, image: &PixelBuffer) -> Result<AlphaMask> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| segmenter.segment(image)));

    let mask = match outcome {
        Ok(Ok(mask)) => mask,
        Ok(Err(EditError::InvalidInput(message))) => {
            return Err(EditError::InvalidInput(message));
        }
        Ok(Err(EditError::SegmentationUnavailable(message))) => {
            return Err(EditError::SegmentationUnavailable(message));
        }
        Ok(Err(other)) => {
            return Err(EditError::SegmentationUnavailable(format!(
                "{} back-end failed: {}",
                segmenter.name(),
                other
            )));
        }
        Err(_) => {
            return Err(EditError::SegmentationUnavailable(format!(
                "{} back-end panicked",
                segmenter.name()
            )));
        }
    };

    if mask.dimensions() != image.dimensions() {
        return Err(EditError::SegmentationUnavailable(format!(
            "{} back-end returned a {}x{} mask for a {}x{} image",
            segmenter.name(),
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        )));
    }

    Ok(mask)
}

/// Segment an image with the default threshold back-end
pub fn segment(image: &PixelBuffer) -> Result<AlphaMask> {
    segment_checked(&ThresholdSegmenter::default(), image)
}
