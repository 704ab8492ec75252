//! Binary mask generation and morphological cleanup
//!
//! Masks here are `GrayImage`s holding only 0 and 255 so they can be fed
//! straight into `imageproc`.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// A binary mask: 255 where the criteria matched, 0 elsewhere
pub type BinaryMask = GrayImage;

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

/// Create a near-white mask from an RGB image
/// Pixels with every channel in [lower, 255] are marked
pub fn create_near_white_mask(img: &RgbImage, lower: u8) -> BinaryMask {
    create_custom_mask(img, |r, g, b| r >= lower && g >= lower && b >= lower)
}

/// Create a mask with a predicate over the color channels
pub fn create_custom_mask<F>(img: &RgbImage, predicate: F) -> BinaryMask
where
    F: Fn(u8, u8, u8) -> bool,
{
    let (width, height) = img.dimensions();
    let mut mask = GrayImage::new(width, height);

    for (dst, pixel) in mask.pixels_mut().zip(img.pixels()) {
        let [r, g, b] = pixel.0;
        if predicate(r, g, b) {
            *dst = Luma([MASK_ON]);
        }
    }

    mask
}

/// Swap marked and unmarked pixels
pub fn invert_mask(mask: &BinaryMask) -> BinaryMask {
    let mut inverted = mask.clone();
    for pixel in inverted.pixels_mut() {
        pixel.0[0] = if pixel.0[0] == MASK_OFF { MASK_ON } else { MASK_OFF };
    }
    inverted
}

/// Chebyshev radius of a square structuring element (3 -> 1, 5 -> 2)
fn kernel_radius(kernel_size: u8) -> u8 {
    kernel_size / 2
}

/// Erosion followed by dilation with a square kernel.
/// Strips marked specks smaller than the kernel.
pub fn open_mask(mask: &BinaryMask, kernel_size: u8) -> BinaryMask {
    morphology::open(mask, Norm::LInf, kernel_radius(kernel_size))
}

/// Dilation followed by erosion with a square kernel.
/// Fills pinholes smaller than the kernel.
pub fn close_mask(mask: &BinaryMask, kernel_size: u8) -> BinaryMask {
    morphology::close(mask, Norm::LInf, kernel_radius(kernel_size))
}

/// Opening, then closing. Noise is stripped before closing can merge it
/// into blobs.
pub fn clean_mask(mask: &BinaryMask, kernel_size: u8) -> BinaryMask {
    close_mask(&open_mask(mask, kernel_size), kernel_size)
}

/// Dilate a binary mask once with a square kernel
/// With the 3x3 kernel this expands all marked regions by 1 pixel in each direction
pub fn dilate_mask(mask: &BinaryMask, kernel_size: u8) -> BinaryMask {
    morphology::dilate(mask, Norm::LInf, kernel_radius(kernel_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn mask_from(width: u32, height: u32, on: &[(u32, u32)]) -> BinaryMask {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in on {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
        mask
    }

    #[test]
    fn test_near_white_mask() {
        let mut img = RgbImage::new(4, 1);
        img.put_pixel(0, 0, Rgb([255, 255, 255])); // white
        img.put_pixel(1, 0, Rgb([220, 220, 220])); // on the threshold
        img.put_pixel(2, 0, Rgb([219, 255, 255])); // one channel below
        img.put_pixel(3, 0, Rgb([0, 0, 0])); // black

        let mask = create_near_white_mask(&img, 220);
        assert_eq!(mask.as_raw(), &vec![255, 255, 0, 0]);
    }

    #[test]
    fn test_invert_mask() {
        let mask = mask_from(3, 1, &[(1, 0)]);
        assert_eq!(invert_mask(&mask).as_raw(), &vec![255, 0, 255]);
    }

    #[test]
    fn test_dilate_mask() {
        // 3x3 image with single pixel in center
        let mask = mask_from(3, 3, &[(1, 1)]);
        let dilated = dilate_mask(&mask, 3);
        // All pixels should be set after dilation
        assert!(dilated.pixels().all(|p| p.0[0] == MASK_ON));
    }

    #[test]
    fn test_open_removes_isolated_pixel() {
        let mask = mask_from(5, 5, &[(2, 2)]);
        let opened = open_mask(&mask, 3);
        assert!(opened.pixels().all(|p| p.0[0] == MASK_OFF));
    }

    #[test]
    fn test_close_fills_pinhole() {
        let mut mask = GrayImage::from_pixel(7, 7, Luma([MASK_ON]));
        mask.put_pixel(3, 3, Luma([MASK_OFF]));
        let closed = close_mask(&mask, 3);
        assert_eq!(closed.get_pixel(3, 3).0[0], MASK_ON);
    }

    #[test]
    fn test_clean_mask_opens_before_closing() {
        // Isolated pixels two apart: closing alone would merge them
        let dots: Vec<(u32, u32)> = (0..6)
            .flat_map(|i| (0..6).map(move |j| (4 + 2 * i, 4 + 2 * j)))
            .collect();
        let mask = mask_from(20, 20, &dots);

        let cleaned = clean_mask(&mask, 3);
        assert!(cleaned.pixels().all(|p| p.0[0] == MASK_OFF));

        let reversed = open_mask(&close_mask(&mask, 3), 3);
        assert_eq!(reversed.get_pixel(9, 9).0[0], MASK_ON);
    }

    #[test]
    fn test_kernel_size_one_is_identity() {
        let mask = mask_from(5, 5, &[(2, 2)]);
        assert_eq!(open_mask(&mask, 1), mask);
        assert_eq!(dilate_mask(&mask, 1), mask);
    }
}
