//! Integration tests for background segmentation
//!
//! These tests build deterministic sprites on white backdrops and check
//! which shapes survive the threshold pipeline.

use image::{Rgba, RgbaImage};
use sprite_tools::segment::{SegmentOptions, ThresholdSegmenter};
use sprite_tools::{
    AlphaMask, EditError, FnSegmenter, PixelBuffer, Segmenter, segment, segment_checked,
};

// Helper to create a test image with specific dimensions filled with a color
fn create_solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
    img
}

// Helper to draw a filled rectangle on an image
fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

fn to_buffer(img: RgbaImage) -> PixelBuffer {
    PixelBuffer::from_rgba_image(img).unwrap()
}

// Color constants
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OFF_WHITE: Rgba<u8> = Rgba([230, 225, 240, 255]); // Still background
const SHADOW: Rgba<u8> = Rgba([210, 210, 210, 255]); // Just below the threshold

// ============================================================================
// Contour Filtering Tests
// ============================================================================

#[test]
fn test_square_kept_speck_discarded() {
    let mut img = create_solid_image(100, 100, WHITE);
    draw_rect(&mut img, 10, 10, 80, 80, BLACK);
    draw_rect(&mut img, 95, 95, 2, 2, BLACK);

    let mask = segment(&to_buffer(img)).unwrap();

    assert_eq!(mask.dimensions(), (100, 100));
    // Square interior and its one-pixel dilation halo
    assert_eq!(mask.get(50, 50), 255);
    assert_eq!(mask.get(10, 10), 255);
    assert_eq!(mask.get(9, 9), 255);
    assert_eq!(mask.get(90, 90), 255);
    assert_eq!(mask.get(8, 8), 0);
    assert_eq!(mask.get(91, 91), 0);
    // Speck is gone
    assert_eq!(mask.get(95, 95), 0);
    assert_eq!(mask.get(96, 96), 0);
    assert_eq!(mask.count(255), 82 * 82);
}

#[test]
fn test_small_blob_below_area_ratio_discarded() {
    // A 4x4 blob survives opening, so only the area filter removes it
    let mut img = create_solid_image(100, 100, WHITE);
    draw_rect(&mut img, 10, 10, 80, 80, BLACK);
    draw_rect(&mut img, 93, 2, 4, 4, BLACK);

    let mask = segment(&to_buffer(img)).unwrap();

    assert_eq!(mask.get(50, 50), 255);
    assert_eq!(mask.get(94, 3), 0);
    assert_eq!(mask.count(255), 82 * 82);
}

#[test]
fn test_separate_large_parts_all_kept() {
    let mut img = create_solid_image(100, 100, WHITE);
    draw_rect(&mut img, 5, 5, 40, 40, BLACK);
    draw_rect(&mut img, 60, 60, 30, 30, BLACK);

    let mask = segment(&to_buffer(img)).unwrap();

    assert_eq!(mask.get(25, 25), 255);
    assert_eq!(mask.get(75, 75), 255);
    assert_eq!(mask.get(52, 52), 0);
}

#[test]
fn test_area_ratio_zero_keeps_everything() {
    let mut img = create_solid_image(100, 100, WHITE);
    draw_rect(&mut img, 10, 10, 80, 80, BLACK);
    draw_rect(&mut img, 93, 2, 4, 4, BLACK);

    let segmenter = ThresholdSegmenter::new(SegmentOptions {
        min_area_ratio: 0.0,
        ..SegmentOptions::default()
    });
    let mask = segmenter.segment(&to_buffer(img)).unwrap();

    assert_eq!(mask.get(94, 3), 255);
}

#[test]
fn test_enclosed_hole_is_filled() {
    // A frame with a white window inside: outer contour only, filled solid
    let mut img = create_solid_image(80, 80, WHITE);
    draw_rect(&mut img, 10, 10, 60, 60, BLACK);
    draw_rect(&mut img, 20, 20, 40, 40, WHITE);

    let mask = segment(&to_buffer(img)).unwrap();

    assert_eq!(mask.get(40, 40), 255);
    assert_eq!(mask.get(15, 15), 255);
    assert_eq!(mask.get(5, 5), 0);
}

#[test]
fn test_square_in_corner_is_kept() {
    let mut img = create_solid_image(20, 20, WHITE);
    draw_rect(&mut img, 0, 0, 10, 10, BLACK);

    let mask = segment(&to_buffer(img)).unwrap();

    assert_eq!(mask.get(0, 0), 255);
    assert_eq!(mask.get(10, 10), 255);
    assert_eq!(mask.get(11, 11), 0);
    assert_eq!(mask.count(255), 11 * 11);
}

#[test]
fn test_frame_touching_every_edge_is_filled() {
    let mut img = create_solid_image(20, 20, BLACK);
    draw_rect(&mut img, 5, 5, 10, 10, WHITE);

    let mask = segment(&to_buffer(img)).unwrap();
    assert!(mask.is_uniform(255));
}

#[test]
fn test_image_without_background_is_fully_kept() {
    let img = create_solid_image(10, 10, BLACK);
    let mask = segment(&to_buffer(img)).unwrap();

    assert!(mask.is_uniform(255), "Everything is foreground");
}

// ============================================================================
// Morphology Order Tests
// ============================================================================

#[test]
fn test_sparse_noise_removed_before_closing() {
    // Dark dots two pixels apart: closing first would fuse them into a
    // solid patch that opening keeps
    let mut img = create_solid_image(60, 60, WHITE);
    for y in (20..40).step_by(2) {
        for x in (20..40).step_by(2) {
            img.put_pixel(x, y, BLACK);
        }
    }

    let mask = segment(&to_buffer(img)).unwrap();
    assert!(mask.is_uniform(0));
}

#[test]
fn test_sparse_noise_does_not_grow_sprite() {
    let mut img = create_solid_image(100, 100, WHITE);
    draw_rect(&mut img, 5, 5, 40, 40, BLACK);
    for y in (60..90).step_by(2) {
        for x in (60..90).step_by(2) {
            img.put_pixel(x, y, BLACK);
        }
    }

    let mask = segment(&to_buffer(img)).unwrap();
    assert_eq!(mask.get(25, 25), 255);
    assert_eq!(mask.get(74, 74), 0);
    assert_eq!(mask.count(255), 42 * 42);
}

// ============================================================================
// Threshold Tests
// ============================================================================

#[test]
fn test_all_white_image_is_fully_transparent() {
    let img = create_solid_image(50, 50, WHITE);
    let mask = segment(&to_buffer(img)).unwrap();

    assert!(mask.is_uniform(0), "No foreground should be found");
}

#[test]
fn test_off_white_counts_as_background() {
    let img = create_solid_image(30, 30, OFF_WHITE);
    let mask = segment(&to_buffer(img)).unwrap();

    assert!(mask.is_uniform(0));
}

#[test]
fn test_custom_threshold_moves_background_boundary() {
    let mut img = create_solid_image(60, 60, WHITE);
    draw_rect(&mut img, 15, 15, 30, 30, SHADOW);
    let pixels = to_buffer(img);

    // Default lower bound 220: the gray square is foreground
    let mask = segment(&pixels).unwrap();
    assert_eq!(mask.get(30, 30), 255);

    // Lower bound 200: the gray square becomes background
    let segmenter = ThresholdSegmenter::new(SegmentOptions {
        white_threshold: 200,
        ..SegmentOptions::default()
    });
    let mask = segmenter.segment(&pixels).unwrap();
    assert!(mask.is_uniform(0));
}

#[test]
fn test_source_alpha_is_ignored() {
    // Transparent black pixels are still dark for analysis
    let mut img = create_solid_image(40, 40, WHITE);
    draw_rect(&mut img, 10, 10, 20, 20, Rgba([0, 0, 0, 0]));

    let mask = segment(&to_buffer(img)).unwrap();
    assert_eq!(mask.get(20, 20), 255);
}

#[test]
fn test_rgb_input_matches_rgba_input() {
    let mut img = create_solid_image(40, 40, WHITE);
    draw_rect(&mut img, 10, 10, 20, 20, BLACK);
    let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();

    let from_rgba = segment(&to_buffer(img)).unwrap();
    let from_rgb = segment(&PixelBuffer::from_rgb_image(rgb).unwrap()).unwrap();
    assert_eq!(from_rgba, from_rgb);
}

// ============================================================================
// Determinism and Back-end Contract Tests
// ============================================================================

#[test]
fn test_segmentation_is_deterministic() {
    let mut img = create_solid_image(64, 64, WHITE);
    draw_rect(&mut img, 8, 8, 20, 30, BLACK);
    draw_rect(&mut img, 35, 12, 20, 20, Rgba([200, 40, 40, 255]));
    draw_rect(&mut img, 2, 60, 2, 2, BLACK);
    let pixels = to_buffer(img);

    let first = segment(&pixels).unwrap();
    let second = segment(&pixels).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_invalid_options_rejected() {
    let segmenter = ThresholdSegmenter::new(SegmentOptions {
        kernel_size: 4,
        ..SegmentOptions::default()
    });
    let pixels = to_buffer(create_solid_image(10, 10, WHITE));

    assert!(matches!(
        segment_checked(&segmenter, &pixels),
        Err(EditError::InvalidInput(_))
    ));
}

#[test]
fn test_failing_backend_reports_unavailable() {
    let broken = FnSegmenter::new("broken", |_: &PixelBuffer| -> sprite_tools::Result<AlphaMask> {
        panic!("model weights missing")
    });
    let pixels = to_buffer(create_solid_image(10, 10, WHITE));

    match segment_checked(&broken, &pixels) {
        Err(EditError::SegmentationUnavailable(message)) => assert!(message.contains("broken")),
        other => panic!("expected SegmentationUnavailable, got {:?}", other),
    }
}

#[test]
fn test_wrong_size_backend_output_rejected() {
    let sloppy = FnSegmenter::new("sloppy", |_: &PixelBuffer| -> sprite_tools::Result<AlphaMask> {
        Ok(AlphaMask::opaque(3, 3))
    });
    let pixels = to_buffer(create_solid_image(10, 10, WHITE));

    assert!(matches!(
        segment_checked(&sloppy, &pixels),
        Err(EditError::SegmentationUnavailable(_))
    ));
}

#[test]
fn test_custom_backend_output_passes_through() {
    let keep_all = FnSegmenter::new("keep-all", |image: &PixelBuffer| -> sprite_tools::Result<AlphaMask> {
        Ok(AlphaMask::opaque(image.width(), image.height()))
    });
    let pixels = to_buffer(create_solid_image(10, 10, WHITE));

    let mask = segment_checked(&keep_all, &pixels).unwrap();
    assert!(mask.is_uniform(255));
    assert_eq!(keep_all.name(), "keep-all");
}
