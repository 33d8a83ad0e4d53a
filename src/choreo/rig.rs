use std::collections::BTreeMap;

use crate::{
    animation::pose::Pose,
    choreo::element::{Choreography, ElementKind, MotionElement, MotionSpec},
    choreo::grab_cycle::{
        GrabCycleConfig, GrabCycleController, GrabState, StateChange, StateObserver,
    },
    foundation::core::Millis,
    foundation::error::ClawResult,
};

/// A grab-cycle controller wired to the claw parts that follow it.
#[derive(Debug)]
pub struct ClawRig {
    controller: GrabCycleController,
    choreography: Choreography,
}

impl ClawRig {
    pub fn mount(cfg: GrabCycleConfig, at: Millis) -> ClawResult<Self> {
        Self::mount_with(cfg, &BTreeMap::new(), at)
    }

    /// Mount with per-element overrides; parts not listed use their stock motion.
    pub fn mount_with(
        cfg: GrabCycleConfig,
        overrides: &BTreeMap<ElementKind, MotionSpec>,
        at: Millis,
    ) -> ClawResult<Self> {
        let elements = ElementKind::ALL
            .into_iter()
            .map(|kind| {
                let spec = overrides
                    .get(&kind)
                    .cloned()
                    .unwrap_or_else(|| MotionSpec::stock(kind));
                spec.validate()?;
                Ok(MotionElement::new(kind, spec))
            })
            .collect::<ClawResult<Vec<_>>>()?;
        Ok(Self {
            controller: GrabCycleController::mount(cfg, at)?,
            choreography: Choreography::new(elements),
        })
    }

    pub fn controller(&self) -> &GrabCycleController {
        &self.controller
    }

    pub fn choreography(&self) -> &Choreography {
        &self.choreography
    }

    pub fn state(&self) -> GrabState {
        self.controller.state()
    }

    /// Advance the controller and fan its flips out to every part. Returns the
    /// flips in the order they happened.
    pub fn advance_to(&mut self, now: Millis) -> Vec<StateChange> {
        let mut changes = Vec::new();
        self.controller.advance_to(now, &mut changes);
        for change in &changes {
            self.choreography.on_state_change(*change);
        }
        changes
    }

    pub fn poses_at(&self, now: Millis) -> Vec<(ElementKind, Pose)> {
        self.choreography.poses_at(now).collect()
    }

    pub fn teardown(&mut self) {
        self.controller.teardown();
    }
}
