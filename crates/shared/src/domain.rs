use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegionError;

pub const HAND_LANDMARK_COUNT: usize = 21;

/// Landmark indices within a [`Hand`].
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A landmark in normalized image space, `[0, 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

impl NormalizedLandmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: &NormalizedLandmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

fn default_hand_score() -> f32 {
    1.0
}

/// One detected hand as reported by a landmark detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: [NormalizedLandmark; HAND_LANDMARK_COUNT],
    #[serde(default = "default_hand_score")]
    pub score: f32,
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl Hand {
    pub fn new(landmarks: [NormalizedLandmark; HAND_LANDMARK_COUNT]) -> Self {
        Self {
            landmarks,
            score: default_hand_score(),
            handedness: None,
        }
    }

    /// Builds a hand whose index fingertip and thumb tip sit at the given
    /// points; every other landmark collapses onto the index fingertip.
    pub fn pointer(index_tip: NormalizedLandmark, thumb_tip: NormalizedLandmark) -> Self {
        let mut points = [index_tip; HAND_LANDMARK_COUNT];
        points[landmarks::THUMB_TIP] = thumb_tip;
        Self::new(points)
    }

    pub fn landmark(&self, index: usize) -> Option<NormalizedLandmark> {
        self.landmarks.get(index).copied()
    }

    pub fn thumb_tip(&self) -> NormalizedLandmark {
        self.landmarks[landmarks::THUMB_TIP]
    }

    pub fn index_tip(&self) -> NormalizedLandmark {
        self.landmarks[landmarks::INDEX_FINGER_TIP]
    }

    pub fn is_finite(&self) -> bool {
        self.landmarks.iter().all(NormalizedLandmark::is_finite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whole-pixel coordinates, truncated toward zero.
    pub fn to_pixels(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Screen-space rectangle inside which gesture tracking is active.
///
/// Width and height are always positive and every value is finite; the only
/// way to obtain a region is through [`InteractionRegion::new`] or parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRegion {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl InteractionRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, RegionError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(RegionError::NonFinite);
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(RegionError::NonPositiveSize { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Largest x a cursor may take. Never below `x` even for sub-pixel widths.
    pub fn max_x(&self) -> f32 {
        (self.x + self.width - 1.0).max(self.x)
    }

    /// Largest y a cursor may take. Never below `y` even for sub-pixel heights.
    pub fn max_y(&self) -> f32 {
        (self.y + self.height - 1.0).max(self.y)
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn clamp(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(
            point.x.min(self.max_x()).max(self.x),
            point.y.min(self.max_y()).max(self.y),
        )
    }
}

impl FromStr for InteractionRegion {
    type Err = RegionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts = raw
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RegionError::Malformed(raw.to_string()))?;

        match parts.as_slice() {
            [x, y, width, height] => Self::new(*x, *y, *width, *height),
            _ => Err(RegionError::Malformed(raw.to_string())),
        }
    }
}
