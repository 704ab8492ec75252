//! # sprite-tools
//!
//! A Rust library for cutting sprites out of their backgrounds and touching
//! up the result by hand.
//!
//! ## Features
//!
//! - **Segmentation**: Guess a foreground mask for a sprite on a near-white backdrop
//! - **Region detection**: Flood-select color-connected areas for one-click removal
//! - **Mask editing**: Brush strokes, region fills and crops with bounded undo/redo
//! - **Compositing**: Export the source colors with the edited mask as alpha
//!
//! ## Example - Background Removal
//!
//! ```rust,ignore
//! use sprite_tools::{PixelBuffer, composite, segment};
//!
//! let img = image::open("sprite.png").unwrap();
//! let pixels = PixelBuffer::from_dynamic_image(&img).unwrap();
//! let mask = segment(&pixels).unwrap();
//! composite(&pixels, &mask).unwrap().save("sprite-cut.png").unwrap();
//! ```
//!
//! ## Example - Editing Session
//!
//! ```rust,ignore
//! use sprite_tools::{EditSession, Point, ThresholdSegmenter};
//!
//! let mut session = EditSession::new(pixels);
//! session.apply_segmentation(&ThresholdSegmenter::default()).unwrap();
//! session.remove_region_at(Point::new(3, 3)).unwrap();
//! session.undo();
//! let output = session.composite().unwrap();
//! ```

pub mod bounds;
pub mod brush;
pub mod composite;
pub mod config;
pub mod error;
pub mod history;
pub mod region;
pub mod segment;
pub mod session;
pub mod types;

// Re-export commonly used items
pub use bounds::Bounds;
pub use brush::{BrushMode, BrushStroke};
pub use composite::composite;
pub use config::EngineConfig;
pub use error::{EditError, Result};
pub use history::History;
pub use region::{Region, detect_region};
pub use segment::{
    BackgroundSegmentation, FnSegmenter, SegmentOptions, Segmenter, ThresholdSegmenter, segment,
    segment_checked,
};
pub use session::EditSession;
pub use types::{AlphaMask, PixelBuffer, Point};
