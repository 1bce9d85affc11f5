use serde::{Deserialize, Serialize};

use crate::domain::ScreenPoint;

/// Interaction events produced by the tracking engine, in whole screen pixels.
///
/// `CursorMove` is the continuous channel; every other variant is discrete and
/// is never dropped by an event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    CursorMove {
        x: i32,
        y: i32,
    },
    PinchStart {
        x: i32,
        y: i32,
    },
    DragStart {
        x: i32,
        y: i32,
        start_x: i32,
        start_y: i32,
    },
    /// `dx`/`dy` are measured from the pinch anchor, not the previous sample.
    DragMove {
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
    },
    DragEnd {
        x: i32,
        y: i32,
    },
    Click {
        x: i32,
        y: i32,
    },
}

impl GestureEvent {
    pub fn cursor_move(cursor: ScreenPoint) -> Self {
        let (x, y) = cursor.to_pixels();
        Self::CursorMove { x, y }
    }

    pub fn pinch_start(cursor: ScreenPoint) -> Self {
        let (x, y) = cursor.to_pixels();
        Self::PinchStart { x, y }
    }

    pub fn drag_start(cursor: ScreenPoint, anchor: ScreenPoint) -> Self {
        let (x, y) = cursor.to_pixels();
        let (start_x, start_y) = anchor.to_pixels();
        Self::DragStart {
            x,
            y,
            start_x,
            start_y,
        }
    }

    pub fn drag_move(cursor: ScreenPoint, anchor: ScreenPoint) -> Self {
        let (x, y) = cursor.to_pixels();
        let (dx, dy) = ScreenPoint::new(cursor.x - anchor.x, cursor.y - anchor.y).to_pixels();
        Self::DragMove { x, y, dx, dy }
    }

    pub fn drag_end(cursor: ScreenPoint) -> Self {
        let (x, y) = cursor.to_pixels();
        Self::DragEnd { x, y }
    }

    pub fn click(cursor: ScreenPoint) -> Self {
        let (x, y) = cursor.to_pixels();
        Self::Click { x, y }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CursorMove { .. } => "cursor_move",
            Self::PinchStart { .. } => "pinch_start",
            Self::DragStart { .. } => "drag_start",
            Self::DragMove { .. } => "drag_move",
            Self::DragEnd { .. } => "drag_end",
            Self::Click { .. } => "click",
        }
    }

    pub fn is_discrete(&self) -> bool {
        !matches!(self, Self::CursorMove { .. })
    }

    /// Event position (the cursor at emission time).
    pub fn position(&self) -> (i32, i32) {
        match *self {
            Self::CursorMove { x, y }
            | Self::PinchStart { x, y }
            | Self::DragStart { x, y, .. }
            | Self::DragMove { x, y, .. }
            | Self::DragEnd { x, y }
            | Self::Click { x, y } => (x, y),
        }
    }

    /// True for the events that close a gesture opened by `PinchStart`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::DragEnd { .. } | Self::Click { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_move_delta_is_relative_to_anchor() {
        let event = GestureEvent::drag_move(
            ScreenPoint::new(130.6, 90.2),
            ScreenPoint::new(100.0, 100.0),
        );
        assert_eq!(
            event,
            GestureEvent::DragMove {
                x: 130,
                y: 90,
                dx: 30,
                dy: -9
            }
        );
    }

    #[test]
    fn serializes_with_snake_case_type_tag() {
        let json = serde_json::to_value(GestureEvent::DragStart {
            x: 5,
            y: 6,
            start_x: 1,
            start_y: 2,
        })
        .expect("serialize");
        assert_eq!(json["type"], "drag_start");
        assert_eq!(json["start_x"], 1);

        let parsed: GestureEvent =
            serde_json::from_str(r#"{"type":"click","x":3,"y":4}"#).expect("deserialize");
        assert_eq!(parsed, GestureEvent::Click { x: 3, y: 4 });
    }

    #[test]
    fn only_cursor_move_is_continuous() {
        assert!(!GestureEvent::CursorMove { x: 0, y: 0 }.is_discrete());
        assert!(GestureEvent::PinchStart { x: 0, y: 0 }.is_discrete());
        assert!(GestureEvent::DragEnd { x: 0, y: 0 }.is_terminal());
        assert!(GestureEvent::Click { x: 0, y: 0 }.is_terminal());
        assert!(!GestureEvent::DragMove {
            x: 0,
            y: 0,
            dx: 0,
            dy: 0
        }
        .is_terminal());
    }
}
