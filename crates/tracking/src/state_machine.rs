//! Pinch/drag state machine.
//!
//! Consumes one `(cursor, is_pinching)` sample per tracking cycle and emits
//! the interaction events for that cycle. `CursorMove` always comes first;
//! at most one discrete event follows it. Every `PinchStart` is closed by
//! exactly one `Click` or `DragEnd` before the next `PinchStart`.

use shared::{domain::ScreenPoint, protocol::GestureEvent};
use tracing::debug;

/// Upper bound on events produced by a single cycle.
pub const MAX_EVENTS_PER_CYCLE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinchState {
    #[default]
    Idle,
    Pinching,
    Dragging,
}

impl PinchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pinching => "pinching",
            Self::Dragging => "dragging",
        }
    }
}

/// Why the machine was forced back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    HandLost,
    OutOfRegion,
    Shutdown,
}

/// Events emitted by one cycle, in emission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutput {
    events: [Option<GestureEvent>; MAX_EVENTS_PER_CYCLE],
}

impl CycleOutput {
    fn emit(&mut self, event: GestureEvent) {
        for slot in &mut self.events {
            if slot.is_none() {
                *slot = Some(event);
                return;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events[0].is_none()
    }

    pub fn len(&self) -> usize {
        self.events.iter().flatten().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = GestureEvent> + '_ {
        self.events.iter().flatten().copied()
    }

    pub fn to_vec(&self) -> Vec<GestureEvent> {
        self.iter().collect()
    }
}

impl IntoIterator for CycleOutput {
    type Item = GestureEvent;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<GestureEvent>, MAX_EVENTS_PER_CYCLE>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Pinching { anchor: ScreenPoint },
    Dragging { anchor: ScreenPoint },
}

#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    phase: Phase,
    last_cursor: Option<ScreenPoint>,
    drag_threshold_px: f32,
}

impl GestureStateMachine {
    pub fn new(drag_threshold_px: f32) -> Self {
        Self {
            phase: Phase::Idle,
            last_cursor: None,
            drag_threshold_px,
        }
    }

    pub fn state(&self) -> PinchState {
        match self.phase {
            Phase::Idle => PinchState::Idle,
            Phase::Pinching { .. } => PinchState::Pinching,
            Phase::Dragging { .. } => PinchState::Dragging,
        }
    }

    /// Cursor recorded when the current pinch began; `None` while idle.
    pub fn anchor(&self) -> Option<ScreenPoint> {
        match self.phase {
            Phase::Idle => None,
            Phase::Pinching { anchor } | Phase::Dragging { anchor } => Some(anchor),
        }
    }

    pub fn last_cursor(&self) -> Option<ScreenPoint> {
        self.last_cursor
    }

    pub fn on_hand(&mut self, cursor: ScreenPoint, is_pinching: bool) -> CycleOutput {
        let mut output = CycleOutput::default();
        output.emit(GestureEvent::cursor_move(cursor));
        self.last_cursor = Some(cursor);

        let next = match (self.phase, is_pinching) {
            (Phase::Idle, false) => Phase::Idle,
            (Phase::Idle, true) => {
                output.emit(GestureEvent::pinch_start(cursor));
                Phase::Pinching { anchor: cursor }
            }
            (Phase::Pinching { anchor }, true) => {
                // Measured from the anchor so sub-threshold moves cannot accumulate.
                if cursor.distance_to(anchor) > self.drag_threshold_px {
                    output.emit(GestureEvent::drag_start(cursor, anchor));
                    Phase::Dragging { anchor }
                } else {
                    Phase::Pinching { anchor }
                }
            }
            (Phase::Dragging { anchor }, true) => {
                output.emit(GestureEvent::drag_move(cursor, anchor));
                Phase::Dragging { anchor }
            }
            (Phase::Pinching { .. }, false) => {
                output.emit(GestureEvent::click(cursor));
                Phase::Idle
            }
            (Phase::Dragging { .. }, false) => {
                output.emit(GestureEvent::drag_end(cursor));
                Phase::Idle
            }
        };

        self.transition(next);
        output
    }

    /// Forces the machine back to `Idle`. A pending pinch or drag is always
    /// closed with `DragEnd` at the last known cursor; an idle machine emits
    /// nothing.
    pub fn reset(&mut self, reason: ResetReason) -> CycleOutput {
        let mut output = CycleOutput::default();
        let anchor = match self.phase {
            Phase::Idle => return output,
            Phase::Pinching { anchor } | Phase::Dragging { anchor } => anchor,
        };

        let cursor = self.last_cursor.unwrap_or(anchor);
        debug!(
            from = self.state().as_str(),
            reason = ?reason,
            x = cursor.x,
            y = cursor.y,
            "forced gesture reset"
        );
        output.emit(GestureEvent::drag_end(cursor));
        self.phase = Phase::Idle;
        output
    }

    fn transition(&mut self, next: Phase) {
        let from = self.state();
        self.phase = next;
        let to = self.state();
        if from != to {
            debug!(from = from.as_str(), to = to.as_str(), "pinch state transition");
        }
    }
}

#[cfg(test)]
#[path = "tests/state_machine_tests.rs"]
mod tests;
