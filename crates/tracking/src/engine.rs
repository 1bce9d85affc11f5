//! Background tracking loop and the handle the UI uses to control it.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::anyhow;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use shared::{
    domain::{Hand, InteractionRegion, ScreenPoint},
    error::RegionError,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::{GestureSettings, TrackingSettings},
    error::EngineError,
    sink::EventSink,
    source::{Frame, FrameSource, HandDetector},
    stats::{StatsSnapshot, TrackingStats},
    tracker::{CycleResult, Tracker},
};

const TRACKING_THREAD_NAME: &str = "gesture-tracking";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub gestures: GestureSettings,
    pub poll_interval: Duration,
    pub cycle_interval: Duration,
    pub stop_timeout: Duration,
    pub region: InteractionRegion,
}

impl EngineConfig {
    pub fn from_settings(settings: &TrackingSettings, region: InteractionRegion) -> Self {
        Self {
            gestures: settings.gestures.clone(),
            poll_interval: settings.engine.poll_interval(),
            cycle_interval: settings.engine.cycle_interval(),
            stop_timeout: settings.engine.stop_timeout(),
            region,
        }
    }

    /// Region covering the camera frame, used when the UI has not supplied one.
    pub fn camera_region(settings: &TrackingSettings) -> Result<InteractionRegion, RegionError> {
        InteractionRegion::new(
            0.0,
            0.0,
            settings.camera.width as f32,
            settings.camera.height as f32,
        )
    }
}

pub struct TrackingEngine {
    config: EngineConfig,
}

impl TrackingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Opens the frame source and spawns the tracking thread.
    ///
    /// A source that fails to open is reported here and no thread is started.
    pub fn start(
        self,
        mut source: Box<dyn FrameSource>,
        detector: Box<dyn HandDetector>,
        sink: Arc<dyn EventSink>,
    ) -> Result<EngineHandle, EngineError> {
        if let Err(source_err) = source.open() {
            warn!("frame source failed to open: {source_err:#}");
            return Err(EngineError::SourceUnavailable { source: source_err });
        }

        let config = self.config;
        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(TrackingStats::default());
        let (region_tx, region_rx) = watch::channel(config.region);
        let (cursor_tx, cursor_rx) = watch::channel(config.region.center());
        let (done_tx, done_rx) = bounded(1);

        let worker = TrackingLoop {
            tracker: Tracker::new(&config.gestures),
            source,
            detector,
            sink,
            stop: Arc::clone(&stop),
            stats: Arc::clone(&stats),
            region_rx,
            cursor_tx,
            done_tx,
            poll_interval: config.poll_interval,
            cycle_interval: config.cycle_interval,
            detector_failures: FailureStreak::default(),
            empty_frames: FailureStreak::default(),
        };

        let thread = thread::Builder::new()
            .name(TRACKING_THREAD_NAME.to_string())
            .spawn(move || worker.run())
            .map_err(EngineError::Spawn)?;

        info!(
            x = config.region.x(),
            y = config.region.y(),
            width = config.region.width(),
            height = config.region.height(),
            "gesture tracking started"
        );

        Ok(EngineHandle {
            stop,
            stats,
            region_tx,
            cursor_rx,
            done_rx,
            thread: Some(thread),
            stop_timeout: config.stop_timeout,
        })
    }
}

/// Owner-side control of a running tracking thread. Dropping the handle
/// signals the loop to stop without waiting for it.
pub struct EngineHandle {
    stop: Arc<AtomicBool>,
    stats: Arc<TrackingStats>,
    region_tx: watch::Sender<InteractionRegion>,
    cursor_rx: watch::Receiver<ScreenPoint>,
    done_rx: Receiver<()>,
    thread: Option<JoinHandle<()>>,
    stop_timeout: Duration,
}

impl EngineHandle {
    /// Publishes a new interaction region; the loop picks it up on its next cycle.
    pub fn set_interaction_region(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), EngineError> {
        let region = InteractionRegion::new(x, y, width, height)?;
        self.region_tx.send_replace(region);
        debug!(x, y, width, height, "interaction region updated");
        Ok(())
    }

    pub fn interaction_region(&self) -> InteractionRegion {
        *self.region_tx.borrow()
    }

    pub fn cursor(&self) -> ScreenPoint {
        *self.cursor_rx.borrow()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the loop, waits up to the configured timeout for it to close
    /// any pending gesture and release the source, then joins the thread.
    ///
    /// On `StopTimeout` the thread is detached still owning the source. It
    /// emits the final `DragEnd` and releases the source once its blocking
    /// call returns; nothing else can release it in the meantime.
    pub fn stop(mut self) -> Result<(), EngineError> {
        self.stop.store(true, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        match self.done_rx.recv_timeout(self.stop_timeout) {
            Ok(()) => {
                thread.join().map_err(|_| EngineError::LoopPanicked)?;
                info!(stats = ?self.stats.snapshot(), "gesture tracking stopped");
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = thread.join();
                Err(EngineError::LoopPanicked)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "tracking thread did not stop in time; detaching"
                );
                Err(EngineError::StopTimeout {
                    timeout: self.stop_timeout,
                })
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

struct TrackingLoop {
    tracker: Tracker,
    source: Box<dyn FrameSource>,
    detector: Box<dyn HandDetector>,
    sink: Arc<dyn EventSink>,
    stop: Arc<AtomicBool>,
    stats: Arc<TrackingStats>,
    region_rx: watch::Receiver<InteractionRegion>,
    cursor_tx: watch::Sender<ScreenPoint>,
    done_tx: Sender<()>,
    poll_interval: Duration,
    cycle_interval: Duration,
    detector_failures: FailureStreak,
    empty_frames: FailureStreak,
}

/// Counts consecutive failures so only the first of a run is logged loudly.
#[derive(Debug, Default)]
struct FailureStreak {
    count: u32,
}

impl FailureStreak {
    fn record(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count == 1
    }

    /// Ends the streak, returning its length if one was running.
    fn clear(&mut self) -> Option<u32> {
        let count = std::mem::take(&mut self.count);
        (count > 0).then_some(count)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl TrackingLoop {
    fn run(mut self) {
        debug!("tracking loop running");
        while !self.stop.load(Ordering::Acquire) {
            self.stats.record_cycle();

            let frame = match self.source.try_get_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.stats.record_frame_miss();
                    thread::sleep(self.poll_interval);
                    continue;
                }
                Err(err) => {
                    self.stats.record_frame_miss();
                    warn!("frame source read failed: {err:#}");
                    thread::sleep(self.poll_interval);
                    continue;
                }
            };
            self.stats.record_frame();

            let hands = self.detect(&frame);
            // Copy out so the watch lock is not held across the cycle.
            let region = *self.region_rx.borrow();
            let result = self.tracker.process_hands(&hands, &region);
            self.deliver(result);

            if let Some(cursor) = self.tracker.cursor() {
                self.cursor_tx.send_replace(cursor);
            }

            thread::sleep(self.cycle_interval);
        }

        let result = self.tracker.shutdown();
        self.deliver(result);
        self.source.release();
        let _ = self.done_tx.send(());
        debug!("tracking loop exited");
    }

    fn detect(&mut self, frame: &Frame) -> Vec<Hand> {
        if frame.is_empty() {
            if self.empty_frames.record() {
                warn!(
                    sequence = frame.sequence,
                    width = frame.width,
                    height = frame.height,
                    "skipping empty frame"
                );
            }
            return Vec::new();
        }
        if let Some(skipped) = self.empty_frames.clear() {
            debug!(skipped, "frame source produced a non-empty frame again");
        }

        let detector = &mut self.detector;
        let detected = panic::catch_unwind(AssertUnwindSafe(|| detector.detect(frame)))
            .unwrap_or_else(|payload| {
                Err(anyhow!("hand detector panicked: {}", panic_message(&*payload)))
            });

        match detected {
            Ok(hands) => {
                if let Some(failures) = self.detector_failures.clear() {
                    debug!(failures, "hand detector recovered");
                }
                hands
            }
            Err(err) => {
                self.stats.record_detector_failure();
                if self.detector_failures.record() {
                    warn!(sequence = frame.sequence, "hand detector failed: {err:#}");
                } else {
                    debug!(sequence = frame.sequence, "hand detector failed again: {err:#}");
                }
                Vec::new()
            }
        }
    }

    fn deliver(&self, result: CycleResult) {
        if result.forced_reset.is_some() {
            self.stats.record_forced_reset();
        }
        let mut emitted = 0;
        for event in result.output {
            self.sink.emit(event);
            emitted += 1;
        }
        self.stats.record_events(emitted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_streak_reports_only_first_failure() {
        let mut streak = FailureStreak::default();
        assert_eq!(streak.clear(), None);
        assert!(streak.record());
        assert!(!streak.record());
        assert!(!streak.record());
        assert_eq!(streak.clear(), Some(3));
        assert!(streak.record());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = panic::catch_unwind(|| panic!("model exploded")).expect_err("panics");
        assert_eq!(panic_message(&*payload), "model exploded");

        let code = 7;
        let payload = panic::catch_unwind(|| panic!("bad tensor {code}")).expect_err("panics");
        assert_eq!(panic_message(&*payload), "bad tensor 7");
    }
}
