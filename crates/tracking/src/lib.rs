//! Hand-gesture tracking: turns camera frames into a smoothed cursor and a
//! pinch/drag/click event stream, on a dedicated background thread.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod pinch;
pub mod scripted;
pub mod sink;
pub mod source;
pub mod state_machine;
pub mod stats;
pub mod tracker;

pub use config::{load_settings, TrackingSettings};
pub use engine::{EngineConfig, EngineHandle, TrackingEngine};
pub use error::{EngineError, ScriptError, SettingsError};
pub use sink::{event_queue, EventReceiver, EventSender, EventSink};
pub use source::{Frame, FrameSource, HandDetector};
pub use state_machine::{GestureStateMachine, PinchState};
