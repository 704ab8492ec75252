//! Alpha compositing of source colors with the edit mask

use image::{Rgba, RgbaImage};

use crate::error::{EditError, Result};
use crate::types::{AlphaMask, PixelBuffer};

/// Build the output image: color channels from `image`, alpha from `mask`.
///
/// Any alpha the source carries is replaced, not multiplied.
pub fn composite(image: &PixelBuffer, mask: &AlphaMask) -> Result<RgbaImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(EditError::DimensionMismatch {
            expected: image.dimensions(),
            actual: mask.dimensions(),
        });
    }

    let (width, height) = image.dimensions();
    let mut output = RgbaImage::new(width, height);

    for ((dst, [r, g, b]), &alpha) in output
        .pixels_mut()
        .zip(image.rgb_pixels())
        .zip(mask.as_raw())
    {
        *dst = Rgba([r, g, b, alpha]);
    }

    Ok(output)
}
