//! clawfx drives the animated layer of the OpenClaw landing page.
//!
//! Two independent pieces run on a simulated millisecond clock:
//!
//! - **Grab cycle**: a [`GrabCycleController`] flips between `Resting` and
//!   `Grabbing` on a fixed period. The claw parts ([`MotionElement`]) observe
//!   each flip and ease toward their own pose after their own delay, so the
//!   body drops before the arms close.
//! - **Particle field**: a [`ParticleField`] of independently looping
//!   particles with randomized origin, cycle length and start delay, drawn
//!   from an injected random source.
//!
//! A [`Scene`] mounts both, plus the one-shot section entrances
//! ([`RevealSequence`]) and the scroll-hint [`Bob`], and pushes one
//! [`RenderFrame`] per sampled instant into a [`RenderSink`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: time only moves through `advance_to`, randomness only
//!   through the caller's RNG.
//! - **Owned timers**: every timer belongs to a component's [`Scheduler`] and
//!   is cancelled by that component's `teardown`.
#![forbid(unsafe_code)]

mod animation;
mod choreo;
mod foundation;
mod intro;
mod particles;
mod render;
mod scene;
mod timing;

pub use animation::ease::Ease;
pub use animation::keyframes::{Keyframe, Keyframes, Lerp};
pub use animation::pose::{Pose, PoseParam};
pub use animation::tween::Tween;
pub use choreo::element::{Choreography, ElementKind, MotionElement, MotionSpec};
pub use choreo::grab_cycle::{
    GrabCycleConfig, GrabCycleController, GrabState, StateChange, StateObserver,
};
pub use choreo::rig::ClawRig;
pub use foundation::core::{Millis, Point, Viewport};
pub use foundation::error::{ClawError, ClawResult};
pub use intro::bob::Bob;
pub use intro::reveal::{Reveal, RevealSection, RevealSequence};
pub use particles::field::{
    MsRange, Particle, ParticleField, ParticleFieldConfig, ParticleId, ParticleSample,
    ParticleTravel,
};
pub use render::sink::{
    ElementPose, InMemorySink, JsonLinesSink, NamedPose, RenderFrame, RenderSink,
};
pub use scene::config::SceneConfig;
pub use scene::stage::Scene;
pub use timing::scheduler::{Fired, Scheduler, TimerId};
