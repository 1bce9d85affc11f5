//! Script-driven stand-ins for the camera and the landmark detector.
//!
//! A [`GestureScript`] is a list of steps; each step yields one frame (or one
//! "not ready" poll) and fixes what the detector reports for that frame.

use std::{
    fs,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use shared::domain::{Hand, NormalizedLandmark};
use tracing::debug;

use crate::{
    error::ScriptError,
    source::{Frame, FrameSource, HandDetector},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    Miss,
    NoHand,
    /// One hand with the index tip and thumb tip at the given points.
    Pointer { index: [f32; 2], thumb: [f32; 2] },
    Hands { hands: Vec<Hand> },
    DetectorFailure { reason: String },
}

impl StepAction {
    pub fn pointer(index: (f32, f32), thumb: (f32, f32)) -> Self {
        Self::Pointer {
            index: [index.0, index.1],
            thumb: [thumb.0, thumb.1],
        }
    }
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStep {
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_frame_width() -> u32 {
    640
}

fn default_frame_height() -> u32 {
    480
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GestureScript {
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
    /// Makes the scripted camera fail to open.
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Default for GestureScript {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            unavailable: false,
            steps: Vec::new(),
        }
    }
}

impl GestureScript {
    pub fn from_json(raw: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn step(self, action: StepAction) -> Self {
        self.repeat(action, 1)
    }

    pub fn repeat(mut self, action: StepAction, repeat: u32) -> Self {
        self.steps.push(ScriptStep { action, repeat });
        self
    }

    /// Steps with repeats expanded, one entry per source poll.
    pub fn timeline(&self) -> Vec<StepAction> {
        self.steps
            .iter()
            .flat_map(|step| std::iter::repeat(step.action.clone()).take(step.repeat as usize))
            .collect()
    }

    pub fn into_collaborators(self) -> (ScriptedFrameSource, ScriptedDetector, ScriptProgress) {
        let timeline: Arc<[StepAction]> = self.timeline().into();
        let consumed = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicBool::new(false));

        let progress = ScriptProgress {
            consumed: Arc::clone(&consumed),
            released: Arc::clone(&released),
            total: timeline.len(),
        };
        let source = ScriptedFrameSource {
            timeline: Arc::clone(&timeline),
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            unavailable: self.unavailable,
            next: 0,
            consumed,
            released,
        };
        let detector = ScriptedDetector { timeline };
        (source, detector, progress)
    }
}

/// Observer for how far the engine has read into a script.
#[derive(Debug, Clone)]
pub struct ScriptProgress {
    consumed: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
    total: usize,
}

impl ScriptProgress {
    pub fn consumed(&self) -> usize {
        self.consumed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.consumed() >= self.total
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

pub struct ScriptedFrameSource {
    timeline: Arc<[StepAction]>,
    frame_width: u32,
    frame_height: u32,
    unavailable: bool,
    next: usize,
    consumed: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl FrameSource for ScriptedFrameSource {
    fn open(&mut self) -> Result<()> {
        if self.unavailable {
            return Err(anyhow!("scripted camera is marked unavailable"));
        }
        Ok(())
    }

    fn try_get_frame(&mut self) -> Result<Option<Frame>> {
        let Some(action) = self.timeline.get(self.next) else {
            return Ok(None);
        };
        let sequence = self.next as u64;
        self.next += 1;
        self.consumed.store(self.next, Ordering::Release);

        if *action == StepAction::Miss {
            return Ok(None);
        }
        // Scripted frames carry no pixel data; the detector reads the script.
        Ok(Some(Frame {
            sequence,
            width: self.frame_width,
            height: self.frame_height,
            pixels: Vec::new(),
        }))
    }

    fn release(&mut self) {
        if self.released.swap(true, Ordering::AcqRel) {
            debug!("scripted camera released twice");
        }
    }
}

pub struct ScriptedDetector {
    timeline: Arc<[StepAction]>,
}

impl HandDetector for ScriptedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>> {
        let step = usize::try_from(frame.sequence)
            .ok()
            .and_then(|index| self.timeline.get(index))
            .ok_or_else(|| anyhow!("no scripted step for frame {}", frame.sequence))?;

        match step {
            StepAction::Miss | StepAction::NoHand => Ok(Vec::new()),
            StepAction::Pointer { index, thumb } => Ok(vec![Hand::pointer(
                NormalizedLandmark::new(index[0], index[1]),
                NormalizedLandmark::new(thumb[0], thumb[1]),
            )]),
            StepAction::Hands { hands } => Ok(hands.clone()),
            StepAction::DetectorFailure { reason } => Err(anyhow!("{reason}")),
        }
    }
}
