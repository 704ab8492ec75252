use std::sync::Arc;

use image::{DynamicImage, GrayImage, Luma, RgbImage, RgbaImage};

use crate::bounds::Bounds;
use crate::error::{EditError, Result};

/// Integer pixel coordinate. May lie outside the image; operations that
/// need an interior point check it themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Immutable decoded raster: row-major, 3 (RGB) or 4 (RGBA) bytes per pixel.
///
/// Cloning is cheap; the bytes are shared, so a worker thread can hold a
/// copy while the session keeps editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Arc<[u8]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EditError::invalid(format!(
                "image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if channels != 3 && channels != 4 {
            return Err(EditError::invalid(format!(
                "unsupported channel count {} (expected 3 or 4)",
                channels
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(EditError::invalid(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data: data.into(),
        })
    }

    /// Convert a decoded image, keeping alpha when the source has it.
    pub fn from_dynamic_image(img: &DynamicImage) -> Result<Self> {
        if img.color().has_alpha() {
            Self::from_rgba_image(img.to_rgba8())
        } else {
            Self::from_rgb_image(img.to_rgb8())
        }
    }

    pub fn from_rgba_image(img: RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, 4, img.into_raw())
    }

    pub fn from_rgb_image(img: RgbImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, 3, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Whether `point` addresses a pixel of this image.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as u32) < self.width
            && (point.y as u32) < self.height
    }

    /// All channels of the pixel at (x, y). Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let idx = (y as usize * self.width as usize + x as usize) * c;
        &self.data[idx..idx + c]
    }

    /// Color channels of the pixel at (x, y), alpha dropped.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let p = self.pixel(x, y);
        [p[0], p[1], p[2]]
    }

    /// Iterate over the color channels of every pixel in row-major order.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data
            .chunks_exact(self.channels as usize)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Three-channel copy used for analysis; alpha is discarded.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut rgb = RgbImage::new(self.width, self.height);
        for (dst, src) in rgb.pixels_mut().zip(self.rgb_pixels()) {
            dst.0 = src;
        }
        rgb
    }

    /// Copy of the pixels inside `bounds`, clamped to the image.
    pub fn crop(&self, bounds: Bounds) -> Result<Self> {
        let bounds = bounds
            .intersect(&Bounds::of_image(self.width, self.height))
            .ok_or_else(|| EditError::invalid("crop rectangle does not overlap the image"))?;

        let c = self.channels as usize;
        let mut data = Vec::with_capacity(bounds.area() as usize * c);
        for y in bounds.y..bounds.y + bounds.height {
            let start = (y as usize * self.width as usize + bounds.x as usize) * c;
            let end = start + bounds.width as usize * c;
            data.extend_from_slice(&self.data[start..end]);
        }

        Self::new(bounds.width, bounds.height, self.channels, data)
    }
}

/// Single-channel opacity buffer: 0 = removed, 255 = kept.
///
/// Dimensions are fixed at construction; a differently sized source needs a
/// new mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    image: GrayImage,
}

impl AlphaMask {
    pub const OPAQUE: u8 = 255;
    pub const TRANSPARENT: u8 = 0;

    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([value])),
        }
    }

    /// Everything kept.
    pub fn opaque(width: u32, height: u32) -> Self {
        Self::filled(width, height, Self::OPAQUE)
    }

    /// Everything removed.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, Self::TRANSPARENT)
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        GrayImage::from_raw(width, height, data)
            .map(Self::from_gray_image)
            .ok_or_else(|| {
                EditError::invalid(format!(
                    "mask buffer holds {} bytes, {}x{} needs {}",
                    len,
                    width,
                    height,
                    width as usize * height as usize
                ))
            })
    }

    pub fn from_gray_image(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y)[0]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.image.put_pixel(x, y, Luma([value]));
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn as_gray_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_gray_image(self) -> GrayImage {
        self.image
    }

    /// Number of pixels holding exactly `value`.
    pub fn count(&self, value: u8) -> usize {
        self.as_raw().iter().filter(|&&v| v == value).count()
    }

    pub fn is_uniform(&self, value: u8) -> bool {
        self.as_raw().iter().all(|&v| v == value)
    }

    /// Copy of the mask inside `bounds`, clamped to the mask.
    pub fn crop(&self, bounds: Bounds) -> Result<Self> {
        let (width, height) = self.dimensions();
        let bounds = bounds
            .intersect(&Bounds::of_image(width, height))
            .ok_or_else(|| EditError::invalid("crop rectangle does not overlap the mask"))?;
        let view =
            image::imageops::crop_imm(&self.image, bounds.x, bounds.y, bounds.width, bounds.height);
        Ok(Self::from_gray_image(view.to_image()))
    }
}
