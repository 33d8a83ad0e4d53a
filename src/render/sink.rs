use std::io::Write;

use crate::{
    animation::pose::Pose,
    choreo::element::ElementKind,
    choreo::grab_cycle::{GrabState, StateChange},
    foundation::core::{Millis, Viewport},
    foundation::error::{ClawError, ClawResult},
    particles::field::ParticleSample,
};

/// Everything the renderer needs to draw one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderFrame {
    pub at: Millis,
    pub state: GrabState,
    /// State flips that happened since the previous frame.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<StateChange>,
    pub elements: Vec<ElementPose>,
    pub particles: Vec<ParticleSample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reveals: Vec<NamedPose>,
    #[serde(default, skip_serializing_if = "Pose::is_empty")]
    pub bob: Pose,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementPose {
    pub element: ElementKind,
    pub pose: Pose,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NamedPose {
    pub id: String,
    pub pose: Pose,
}

/// Consumer of rendered instants, the boundary to whatever draws them.
///
/// Ordering contract: `push_frame` is called with non-decreasing `at`.
pub trait RenderSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, viewport: Viewport) -> ClawResult<()>;
    fn push_frame(&mut self, frame: &RenderFrame) -> ClawResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> ClawResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    viewport: Option<Viewport>,
    frames: Vec<RenderFrame>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }
}

impl RenderSink for InMemorySink {
    fn begin(&mut self, viewport: Viewport) -> ClawResult<()> {
        self.viewport = Some(viewport);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &RenderFrame) -> ClawResult<()> {
        if let Some(last) = self.frames.last()
            && frame.at < last.at
        {
            return Err(ClawError::FrameOrder {
                at: frame.at,
                last: last.at,
            });
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> ClawResult<()> {
        Ok(())
    }
}

/// Writes one JSON object per frame, newline separated.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn begin(&mut self, _viewport: Viewport) -> ClawResult<()> {
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &RenderFrame) -> ClawResult<()> {
        serde_json::to_writer(&mut self.out, frame)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> ClawResult<()> {
        Ok(self.out.flush()?)
    }
}
