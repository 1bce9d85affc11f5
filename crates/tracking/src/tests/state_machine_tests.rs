use super::*;

fn point(x: f32, y: f32) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

fn machine() -> GestureStateMachine {
    GestureStateMachine::new(10.0)
}

#[test]
fn idle_hover_only_moves_cursor() {
    let mut machine = machine();
    let events = machine.on_hand(point(40.0, 50.0), false).to_vec();
    assert_eq!(events, vec![GestureEvent::CursorMove { x: 40, y: 50 }]);
    assert_eq!(machine.state(), PinchState::Idle);
    assert_eq!(machine.anchor(), None);
}

#[test]
fn pinch_starts_with_anchor_at_cursor() {
    let mut machine = machine();
    let events = machine.on_hand(point(100.0, 100.0), true).to_vec();
    assert_eq!(
        events,
        vec![
            GestureEvent::CursorMove { x: 100, y: 100 },
            GestureEvent::PinchStart { x: 100, y: 100 },
        ]
    );
    assert_eq!(machine.state(), PinchState::Pinching);
    assert_eq!(machine.anchor(), Some(point(100.0, 100.0)));
}

#[test]
fn holding_pinch_inside_threshold_stays_pinching() {
    let mut machine = machine();
    machine.on_hand(point(100.0, 100.0), true);
    for _ in 0..5 {
        let events = machine.on_hand(point(106.0, 108.0), true).to_vec();
        assert_eq!(events, vec![GestureEvent::CursorMove { x: 106, y: 108 }]);
        assert_eq!(machine.state(), PinchState::Pinching);
    }
}

#[test]
fn moving_past_threshold_promotes_to_drag_on_the_crossing_sample() {
    let mut machine = machine();
    machine.on_hand(point(100.0, 100.0), true);

    let second = machine.on_hand(point(105.0, 102.0), true);
    assert_eq!(second.len(), 1);
    assert_eq!(machine.state(), PinchState::Pinching);

    let third = machine.on_hand(point(115.0, 112.0), true).to_vec();
    assert_eq!(
        third,
        vec![
            GestureEvent::CursorMove { x: 115, y: 112 },
            GestureEvent::DragStart {
                x: 115,
                y: 112,
                start_x: 100,
                start_y: 100
            },
        ]
    );
    assert_eq!(machine.state(), PinchState::Dragging);
}

#[test]
fn drift_is_measured_from_anchor_not_previous_sample() {
    let mut machine = machine();
    machine.on_hand(point(0.0, 0.0), true);
    for step in 1..=3 {
        machine.on_hand(point(3.0 * step as f32, 0.0), true);
        assert_eq!(machine.state(), PinchState::Pinching);
    }
    // Each step moved only 3px, but the anchor is now 12px away.
    machine.on_hand(point(12.0, 0.0), true);
    assert_eq!(machine.state(), PinchState::Dragging);
}

#[test]
fn threshold_distance_itself_does_not_start_drag() {
    let mut machine = machine();
    machine.on_hand(point(0.0, 0.0), true);
    machine.on_hand(point(6.0, 8.0), true);
    assert_eq!(machine.state(), PinchState::Pinching);
}

#[test]
fn drag_move_delta_is_relative_to_anchor() {
    let mut machine = machine();
    machine.on_hand(point(100.0, 100.0), true);
    machine.on_hand(point(130.0, 100.0), true);
    let events = machine.on_hand(point(150.0, 80.0), true).to_vec();
    assert_eq!(
        events,
        vec![
            GestureEvent::CursorMove { x: 150, y: 80 },
            GestureEvent::DragMove {
                x: 150,
                y: 80,
                dx: 50,
                dy: -20
            },
        ]
    );
}

#[test]
fn release_without_drag_is_a_click() {
    let mut machine = machine();
    machine.on_hand(point(10.0, 10.0), true);
    let events = machine.on_hand(point(12.0, 11.0), false).to_vec();
    assert_eq!(
        events,
        vec![
            GestureEvent::CursorMove { x: 12, y: 11 },
            GestureEvent::Click { x: 12, y: 11 },
        ]
    );
    assert_eq!(machine.state(), PinchState::Idle);
    assert_eq!(machine.anchor(), None);
}

#[test]
fn release_after_drag_ends_drag() {
    let mut machine = machine();
    machine.on_hand(point(10.0, 10.0), true);
    machine.on_hand(point(60.0, 10.0), true);
    let events = machine.on_hand(point(61.0, 10.0), false).to_vec();
    assert_eq!(
        events,
        vec![
            GestureEvent::CursorMove { x: 61, y: 10 },
            GestureEvent::DragEnd { x: 61, y: 10 },
        ]
    );
    assert_eq!(machine.state(), PinchState::Idle);
}

#[test]
fn hand_loss_while_dragging_ends_drag_at_last_cursor() {
    let mut machine = machine();
    machine.on_hand(point(10.0, 10.0), true);
    machine.on_hand(point(60.0, 10.0), true);
    machine.on_hand(point(70.0, 20.0), true);

    let events = machine.reset(ResetReason::HandLost).to_vec();
    assert_eq!(events, vec![GestureEvent::DragEnd { x: 70, y: 20 }]);
    assert_eq!(machine.state(), PinchState::Idle);
}

#[test]
fn hand_loss_while_pinching_also_ends_with_drag_end() {
    let mut machine = machine();
    machine.on_hand(point(33.0, 44.0), true);
    let events = machine.reset(ResetReason::OutOfRegion).to_vec();
    assert_eq!(events, vec![GestureEvent::DragEnd { x: 33, y: 44 }]);
    assert_eq!(machine.state(), PinchState::Idle);
}

#[test]
fn reset_while_idle_is_silent() {
    let mut machine = machine();
    assert!(machine.reset(ResetReason::HandLost).is_empty());
    machine.on_hand(point(1.0, 1.0), false);
    assert!(machine.reset(ResetReason::Shutdown).is_empty());
}

#[test]
fn release_while_idle_emits_only_cursor_move() {
    let mut machine = machine();
    for _ in 0..3 {
        assert_eq!(machine.on_hand(point(5.0, 5.0), false).len(), 1);
    }
}

/// Deterministic pseudo-random walk over samples and hand losses.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

fn expected_next(state: PinchState, pinching: bool, moved_past_threshold: bool) -> PinchState {
    match (state, pinching) {
        (PinchState::Idle, false) => PinchState::Idle,
        (PinchState::Idle, true) => PinchState::Pinching,
        (PinchState::Pinching, true) if moved_past_threshold => PinchState::Dragging,
        (PinchState::Pinching, true) => PinchState::Pinching,
        (PinchState::Dragging, true) => PinchState::Dragging,
        (_, false) => PinchState::Idle,
    }
}

#[test]
fn random_sample_streams_follow_the_transition_table_and_stay_balanced() {
    let mut rng = Lcg(0x5eed);
    let mut machine = machine();
    let mut cursor = point(500.0, 400.0);
    let mut open_gesture = false;

    for _ in 0..20_000 {
        let before = machine.state();
        let roll = rng.next() % 100;

        let events = if roll < 5 {
            let events = machine.reset(ResetReason::HandLost).to_vec();
            assert_eq!(machine.state(), PinchState::Idle);
            if before == PinchState::Idle {
                assert!(events.is_empty());
            } else {
                assert!(matches!(events.as_slice(), [GestureEvent::DragEnd { .. }]));
            }
            events
        } else {
            cursor = point(
                cursor.x + (rng.next() % 9) as f32 - 4.0,
                cursor.y + (rng.next() % 9) as f32 - 4.0,
            );
            let pinching = rng.next() % 3 != 0;
            let moved = machine
                .anchor()
                .map(|anchor| cursor.distance_to(anchor) > 10.0)
                .unwrap_or(false);
            let events = machine.on_hand(cursor, pinching).to_vec();
            assert_eq!(machine.state(), expected_next(before, pinching, moved));
            assert!(matches!(events[0], GestureEvent::CursorMove { .. }));
            assert!(events.len() <= MAX_EVENTS_PER_CYCLE);
            events
        };

        for event in events {
            match event {
                GestureEvent::PinchStart { .. } => {
                    assert!(!open_gesture, "PinchStart while a gesture is open");
                    open_gesture = true;
                }
                GestureEvent::DragStart { .. } | GestureEvent::DragMove { .. } => {
                    assert!(open_gesture, "{} outside a gesture", event.name());
                }
                GestureEvent::Click { .. } | GestureEvent::DragEnd { .. } => {
                    assert!(open_gesture, "{} without PinchStart", event.name());
                    open_gesture = false;
                }
                GestureEvent::CursorMove { .. } => {}
            }
        }
    }
}
