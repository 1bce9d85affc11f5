//! Seams for the perception collaborators driven by the tracking loop.

use anyhow::Result;
use shared::domain::Hand;

/// A captured camera frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Monotonic capture counter assigned by the source.
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Non-blocking supplier of camera frames.
pub trait FrameSource: Send {
    /// Acquires the underlying device. Called once, on the caller's thread,
    /// before the tracking loop is spawned.
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns `Ok(None)` immediately when no frame is ready yet.
    fn try_get_frame(&mut self) -> Result<Option<Frame>>;

    /// Releases the underlying device. Called exactly once when tracking stops.
    fn release(&mut self);
}

/// Per-frame hand landmark detector.
pub trait HandDetector: Send {
    /// Hands found in `frame`, primary hand first. An empty vector means no
    /// hand is visible; errors are treated the same way by the engine.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>>;
}
