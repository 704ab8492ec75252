//! Segmentation on a worker thread
//!
//! The caller keeps its interactive loop running and polls for the mask.
//! Dropping the job discards whatever the worker produces.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::debug;

use super::{Segmenter, segment_checked};
use crate::error::{EditError, Result};
use crate::types::{AlphaMask, PixelBuffer};

/// A segmentation running in the background
pub struct BackgroundSegmentation {
    receiver: Receiver<Result<AlphaMask>>,
    dimensions: (u32, u32),
}

impl BackgroundSegmentation {
    pub fn spawn(segmenter: Arc<dyn Segmenter>, image: PixelBuffer) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let dimensions = image.dimensions();

        thread::Builder::new()
            .name("segmentation".to_string())
            .spawn(move || {
                let result = segment_checked(segmenter.as_ref(), &image);
                // The receiver is gone when the caller discarded the job
                if sender.send(result).is_err() {
                    debug!("segmentation result discarded");
                }
            })
            .map_err(|e| {
                EditError::SegmentationUnavailable(format!("failed to start worker: {}", e))
            })?;

        Ok(Self {
            receiver,
            dimensions,
        })
    }

    /// Size of the image being segmented
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Non-blocking poll; `None` while the worker is still running
    pub fn try_take(&self) -> Option<Result<AlphaMask>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(EditError::SegmentationUnavailable(
                "worker stopped without a result".to_string(),
            ))),
        }
    }

    /// Block until the worker finishes
    pub fn wait(self) -> Result<AlphaMask> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(EditError::SegmentationUnavailable(
                "worker stopped without a result".to_string(),
            ))
        })
    }
}
