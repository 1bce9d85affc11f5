//! UI-context side of gesture input: draining the tracking engine's event
//! queue and applying events to a board of draggable widgets.

pub mod board;
pub mod dispatch;
pub mod error;

pub use board::{BoardNotice, Rect, Widget, WidgetBoard};
pub use dispatch::{dispatch, pump, GestureHandler, PumpStatus};
pub use error::BoardError;
