//! One tracking cycle: primary hand -> cursor -> pinch -> state machine.

use shared::domain::{Hand, InteractionRegion, ScreenPoint};
use tracing::trace;

use crate::{
    config::GestureSettings,
    mapper::CursorMapper,
    pinch::PinchClassifier,
    state_machine::{CycleOutput, GestureStateMachine, PinchState, ResetReason},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleResult {
    pub output: CycleOutput,
    /// Set when the cycle forced a pending gesture back to idle.
    pub forced_reset: Option<ResetReason>,
}

#[derive(Debug, Clone)]
pub struct Tracker {
    mapper: CursorMapper,
    classifier: PinchClassifier,
    machine: GestureStateMachine,
}

impl Tracker {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            mapper: CursorMapper::new(settings.smoothing),
            classifier: PinchClassifier::new(
                settings.pinch_threshold_px,
                settings.pinch_calibration_width,
            ),
            machine: GestureStateMachine::new(settings.drag_threshold_px),
        }
    }

    pub fn state(&self) -> PinchState {
        self.machine.state()
    }

    pub fn cursor(&self) -> Option<ScreenPoint> {
        self.mapper.cursor()
    }

    /// Runs one cycle over the detector output. Only the first hand is used.
    pub fn process_hands(&mut self, hands: &[Hand], region: &InteractionRegion) -> CycleResult {
        let Some(hand) = hands.first() else {
            return self.reset(ResetReason::HandLost);
        };
        if hands.len() > 1 {
            trace!(hands = hands.len(), "ignoring secondary hands");
        }

        let index_tip = hand.index_tip();
        let thumb_tip = hand.thumb_tip();
        if !(index_tip.is_finite() && thumb_tip.is_finite()) {
            trace!("discarding hand with non-finite landmarks");
            return self.reset(ResetReason::HandLost);
        }

        // The smoothed cursor is always clamped, so the region test uses the raw target.
        if !region.contains(CursorMapper::target(index_tip, region)) {
            return self.reset(ResetReason::OutOfRegion);
        }
        let cursor = self.mapper.map(index_tip, region);

        let pinch = self.classifier.classify(thumb_tip, index_tip);
        CycleResult {
            output: self.machine.on_hand(cursor, pinch.is_pinching),
            forced_reset: None,
        }
    }

    /// Closes any pending gesture before the engine shuts down.
    pub fn shutdown(&mut self) -> CycleResult {
        self.reset(ResetReason::Shutdown)
    }

    fn reset(&mut self, reason: ResetReason) -> CycleResult {
        let output = self.machine.reset(reason);
        CycleResult {
            forced_reset: (!output.is_empty()).then_some(reason),
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::{domain::NormalizedLandmark, protocol::GestureEvent};

    use super::*;

    fn settings() -> GestureSettings {
        GestureSettings {
            smoothing: 1.0,
            ..GestureSettings::default()
        }
    }

    fn region() -> InteractionRegion {
        InteractionRegion::new(0.0, 0.0, 1000.0, 1000.0).expect("region")
    }

    fn pinching_hand(x: f32, y: f32) -> Hand {
        Hand::pointer(
            NormalizedLandmark::new(x, y),
            NormalizedLandmark::new(x + 0.01, y),
        )
    }

    fn open_hand(x: f32, y: f32) -> Hand {
        Hand::pointer(
            NormalizedLandmark::new(x, y),
            NormalizedLandmark::new(x + 0.2, y),
        )
    }

    #[test]
    fn open_hand_hovers() {
        let mut tracker = Tracker::new(&settings());
        let result = tracker.process_hands(&[open_hand(0.5, 0.25)], &region());
        assert_eq!(
            result.output.to_vec(),
            vec![GestureEvent::CursorMove { x: 500, y: 250 }]
        );
        assert_eq!(result.forced_reset, None);
    }

    #[test]
    fn only_primary_hand_drives_the_cursor() {
        let mut tracker = Tracker::new(&settings());
        let result = tracker.process_hands(
            &[pinching_hand(0.5, 0.5), open_hand(0.1, 0.1)],
            &region(),
        );
        assert_eq!(
            result.output.to_vec(),
            vec![
                GestureEvent::CursorMove { x: 500, y: 500 },
                GestureEvent::PinchStart { x: 500, y: 500 },
            ]
        );
        assert_eq!(tracker.state(), PinchState::Pinching);
    }

    #[test]
    fn missing_hand_forces_reset_of_pending_pinch() {
        let mut tracker = Tracker::new(&settings());
        tracker.process_hands(&[pinching_hand(0.5, 0.5)], &region());

        let result = tracker.process_hands(&[], &region());
        assert_eq!(
            result.output.to_vec(),
            vec![GestureEvent::DragEnd { x: 500, y: 500 }]
        );
        assert_eq!(result.forced_reset, Some(ResetReason::HandLost));
        assert_eq!(tracker.state(), PinchState::Idle);

        let idle = tracker.process_hands(&[], &region());
        assert!(idle.output.is_empty());
        assert_eq!(idle.forced_reset, None);
    }

    #[test]
    fn non_finite_landmarks_count_as_no_hand_and_keep_cursor() {
        let mut tracker = Tracker::new(&settings());
        tracker.process_hands(&[pinching_hand(0.5, 0.5)], &region());

        let result = tracker.process_hands(&[pinching_hand(f32::NAN, 0.5)], &region());
        assert_eq!(result.forced_reset, Some(ResetReason::HandLost));
        assert_eq!(tracker.cursor(), Some(ScreenPoint::new(500.0, 500.0)));
    }

    #[test]
    fn hand_outside_region_forces_reset() {
        let mut tracker = Tracker::new(&settings());
        tracker.process_hands(&[pinching_hand(0.5, 0.5)], &region());

        let result = tracker.process_hands(&[pinching_hand(0.5, 1.3)], &region());
        assert_eq!(
            result.output.to_vec(),
            vec![GestureEvent::DragEnd { x: 500, y: 500 }]
        );
        assert_eq!(result.forced_reset, Some(ResetReason::OutOfRegion));
        assert_eq!(tracker.cursor(), Some(ScreenPoint::new(500.0, 500.0)));

        let outside = tracker.process_hands(&[open_hand(-0.2, 0.5)], &region());
        assert!(outside.output.is_empty());
    }

    #[test]
    fn shutdown_closes_pending_drag() {
        let mut tracker = Tracker::new(&settings());
        tracker.process_hands(&[pinching_hand(0.5, 0.5)], &region());
        tracker.process_hands(&[pinching_hand(0.4, 0.5)], &region());
        assert_eq!(tracker.state(), PinchState::Dragging);

        let result = tracker.shutdown();
        assert_eq!(
            result.output.to_vec(),
            vec![GestureEvent::DragEnd { x: 600, y: 500 }]
        );
        assert_eq!(result.forced_reset, Some(ResetReason::Shutdown));
    }
}
