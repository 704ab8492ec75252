use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use image::{DynamicImage, RgbaImage};
use log::info;
use sprite_tools::segment::SegmentOptions;
use sprite_tools::{
    AlphaMask, EditError, PixelBuffer, Point, ThresholdSegmenter, composite, detect_region,
    segment_checked,
};

/// Cut sprites out of near-white backgrounds
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove the background and write the sprite as an RGBA PNG
    RemoveBg(RemoveBgCommand),
    /// Write only the segmentation mask as a grayscale PNG
    Mask(MaskCommand),
    /// Remove the color-connected region under a pixel
    Region(RegionCommand),
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Lowest channel value that still counts as background white
    #[arg(long, default_value_t = 220)]
    white_threshold: u8,
    /// Discard shapes smaller than this share of the largest shape
    #[arg(long, default_value_t = 0.05)]
    min_area_ratio: f64,
}

impl From<&SegmentArgs> for SegmentOptions {
    fn from(args: &SegmentArgs) -> Self {
        SegmentOptions {
            white_threshold: args.white_threshold,
            min_area_ratio: args.min_area_ratio,
            ..SegmentOptions::default()
        }
    }
}

#[derive(Args, Debug)]
struct RemoveBgCommand {
    input: PathBuf,
    output: PathBuf,
    #[command(flatten)]
    segment: SegmentArgs,
}

#[derive(Args, Debug)]
struct MaskCommand {
    input: PathBuf,
    output: PathBuf,
    #[command(flatten)]
    segment: SegmentArgs,
}

#[derive(Args, Debug)]
struct RegionCommand {
    input: PathBuf,
    output: PathBuf,
    /// Seed column
    #[arg(long)]
    x: i32,
    /// Seed row
    #[arg(long)]
    y: i32,
    /// Per-channel color tolerance
    #[arg(long, default_value_t = sprite_tools::region::REGION_DETECT_TOLERANCE)]
    tolerance: u8,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RemoveBg(cmd) => {
            let pixels = read_input(&cmd.input);
            let mask = run_segmentation(&pixels, &cmd.segment);
            let output = build_composite(&pixels, &mask);
            write_output(&cmd.output, DynamicImage::ImageRgba8(output));
            println!(
                "Removed background from '{}' into '{}'",
                cmd.input.display(),
                cmd.output.display()
            );
        }
        Commands::Mask(cmd) => {
            let pixels = read_input(&cmd.input);
            let mask = run_segmentation(&pixels, &cmd.segment);
            write_output(&cmd.output, DynamicImage::ImageLuma8(mask.into_gray_image()));
            println!(
                "Wrote mask for '{}' to '{}'",
                cmd.input.display(),
                cmd.output.display()
            );
        }
        Commands::Region(cmd) => {
            let pixels = read_input(&cmd.input);
            let seed = Point::new(cmd.x, cmd.y);
            if !pixels.contains(seed) {
                eprintln!(
                    "Error: seed ({}, {}) is outside the {}x{} image",
                    cmd.x,
                    cmd.y,
                    pixels.width(),
                    pixels.height()
                );
                process::exit(1);
            }

            let region = detect_region(&pixels, seed, cmd.tolerance);
            let mut mask = AlphaMask::opaque(pixels.width(), pixels.height());
            for (x, y) in region.pixels() {
                mask.set(x, y, AlphaMask::TRANSPARENT);
            }
            info!("removed {} pixels", region.pixel_count());

            let output = build_composite(&pixels, &mask);
            write_output(&cmd.output, DynamicImage::ImageRgba8(output));
            println!(
                "Removed region at ({}, {}) from '{}' into '{}'",
                cmd.x,
                cmd.y,
                cmd.input.display(),
                cmd.output.display()
            );
        }
    }
}

fn read_input(path: &Path) -> PixelBuffer {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error reading input file '{}': {}", path.display(), e);
            process::exit(2);
        }
    };

    match PixelBuffer::from_dynamic_image(&img) {
        Ok(pixels) => pixels,
        Err(e) => {
            eprintln!("Error loading '{}': {}", path.display(), e);
            process::exit(2);
        }
    }
}

fn run_segmentation(pixels: &PixelBuffer, args: &SegmentArgs) -> AlphaMask {
    let segmenter = ThresholdSegmenter::new(SegmentOptions::from(args));
    match segment_checked(&segmenter, pixels) {
        Ok(mask) => mask,
        Err(EditError::InvalidInput(message)) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error segmenting image: {}", e);
            process::exit(3);
        }
    }
}

fn build_composite(pixels: &PixelBuffer, mask: &AlphaMask) -> RgbaImage {
    match composite(pixels, mask) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error compositing image: {}", e);
            process::exit(3);
        }
    }
}

fn write_output(path: &Path, img: DynamicImage) {
    if let Err(e) = img.save(path) {
        eprintln!("Error writing output file '{}': {}", path.display(), e);
        process::exit(4);
    }
}
