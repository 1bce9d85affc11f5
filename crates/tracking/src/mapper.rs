use shared::domain::{InteractionRegion, NormalizedLandmark, ScreenPoint};

/// Maps a normalized landmark to a smoothed, region-clamped screen cursor.
///
/// The horizontal axis is mirrored because camera frames arrive already
/// flipped for display. Smoothing is a single exponential filter with factor
/// `smoothing`; the first sample after construction or [`CursorMapper::reset`]
/// seeds the filter directly.
#[derive(Debug, Clone)]
pub struct CursorMapper {
    smoothing: f32,
    cursor: Option<ScreenPoint>,
}

impl CursorMapper {
    pub fn new(smoothing: f32) -> Self {
        Self {
            smoothing: smoothing.clamp(f32::EPSILON, 1.0),
            cursor: None,
        }
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn cursor(&self) -> Option<ScreenPoint> {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// Unsmoothed screen position for `landmark` inside `region`.
    pub fn target(landmark: NormalizedLandmark, region: &InteractionRegion) -> ScreenPoint {
        let mirrored_x = 1.0 - landmark.x;
        ScreenPoint::new(
            region.x() + mirrored_x * region.width(),
            region.y() + landmark.y * region.height(),
        )
    }

    pub fn map(&mut self, landmark: NormalizedLandmark, region: &InteractionRegion) -> ScreenPoint {
        let target = Self::target(landmark, region);
        let smoothed = match self.cursor {
            Some(previous) => ScreenPoint::new(
                previous.x * (1.0 - self.smoothing) + target.x * self.smoothing,
                previous.y * (1.0 - self.smoothing) + target.y * self.smoothing,
            ),
            None => target,
        };
        let cursor = region.clamp(smoothed);
        self.cursor = Some(cursor);
        cursor
    }
}
