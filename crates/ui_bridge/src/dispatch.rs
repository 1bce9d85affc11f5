use shared::protocol::GestureEvent;
use tracing::{debug, trace};
use tracking::sink::{EventReceiver, TryRecvError};

/// Receives gesture events on the UI thread, one method per event kind.
pub trait GestureHandler {
    fn cursor_moved(&mut self, x: i32, y: i32);
    fn pinch_started(&mut self, x: i32, y: i32);
    fn drag_started(&mut self, x: i32, y: i32, start_x: i32, start_y: i32);
    fn drag_moved(&mut self, x: i32, y: i32, dx: i32, dy: i32);
    fn drag_ended(&mut self, x: i32, y: i32);
    fn clicked(&mut self, x: i32, y: i32);
}

impl<H: GestureHandler + ?Sized> GestureHandler for &mut H {
    fn cursor_moved(&mut self, x: i32, y: i32) {
        (**self).cursor_moved(x, y);
    }

    fn pinch_started(&mut self, x: i32, y: i32) {
        (**self).pinch_started(x, y);
    }

    fn drag_started(&mut self, x: i32, y: i32, start_x: i32, start_y: i32) {
        (**self).drag_started(x, y, start_x, start_y);
    }

    fn drag_moved(&mut self, x: i32, y: i32, dx: i32, dy: i32) {
        (**self).drag_moved(x, y, dx, dy);
    }

    fn drag_ended(&mut self, x: i32, y: i32) {
        (**self).drag_ended(x, y);
    }

    fn clicked(&mut self, x: i32, y: i32) {
        (**self).clicked(x, y);
    }
}

/// Records events verbatim.
impl GestureHandler for Vec<GestureEvent> {
    fn cursor_moved(&mut self, x: i32, y: i32) {
        self.push(GestureEvent::CursorMove { x, y });
    }

    fn pinch_started(&mut self, x: i32, y: i32) {
        self.push(GestureEvent::PinchStart { x, y });
    }

    fn drag_started(&mut self, x: i32, y: i32, start_x: i32, start_y: i32) {
        self.push(GestureEvent::DragStart {
            x,
            y,
            start_x,
            start_y,
        });
    }

    fn drag_moved(&mut self, x: i32, y: i32, dx: i32, dy: i32) {
        self.push(GestureEvent::DragMove { x, y, dx, dy });
    }

    fn drag_ended(&mut self, x: i32, y: i32) {
        self.push(GestureEvent::DragEnd { x, y });
    }

    fn clicked(&mut self, x: i32, y: i32) {
        self.push(GestureEvent::Click { x, y });
    }
}

pub fn dispatch<H: GestureHandler + ?Sized>(event: GestureEvent, handler: &mut H) {
    match event {
        GestureEvent::CursorMove { x, y } => handler.cursor_moved(x, y),
        GestureEvent::PinchStart { x, y } => handler.pinch_started(x, y),
        GestureEvent::DragStart {
            x,
            y,
            start_x,
            start_y,
        } => handler.drag_started(x, y, start_x, start_y),
        GestureEvent::DragMove { x, y, dx, dy } => handler.drag_moved(x, y, dx, dy),
        GestureEvent::DragEnd { x, y } => handler.drag_ended(x, y),
        GestureEvent::Click { x, y } => handler.clicked(x, y),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStatus {
    pub dispatched: usize,
    /// Every sender is gone and the queue is empty.
    pub disconnected: bool,
}

/// Drains at most `budget` queued events into `handler` without blocking.
/// Meant to be called once per UI frame.
pub fn pump<H: GestureHandler + ?Sized>(
    receiver: &EventReceiver,
    handler: &mut H,
    budget: usize,
) -> PumpStatus {
    let mut status = PumpStatus::default();
    while status.dispatched < budget {
        match receiver.try_recv() {
            Ok(event) => {
                trace!(event = event.name(), "dispatching gesture event");
                dispatch(event, handler);
                status.dispatched += 1;
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                debug!("gesture event queue disconnected");
                status.disconnected = true;
                break;
            }
        }
    }
    status
}
