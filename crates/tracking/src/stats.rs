use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct TrackingStats {
    cycles: AtomicU64,
    frames: AtomicU64,
    frame_misses: AtomicU64,
    detector_failures: AtomicU64,
    forced_resets: AtomicU64,
    events_emitted: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cycles: u64,
    pub frames: u64,
    pub frame_misses: u64,
    pub detector_failures: u64,
    pub forced_resets: u64,
    pub events_emitted: u64,
}

impl TrackingStats {
    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_miss(&self) {
        self.frame_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_detector_failure(&self) {
        self.detector_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forced_reset(&self) {
        self.forced_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_events(&self, count: usize) {
        self.events_emitted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            frame_misses: self.frame_misses.load(Ordering::Relaxed),
            detector_failures: self.detector_failures.load(Ordering::Relaxed),
            forced_resets: self.forced_resets.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
        }
    }
}
