use crate::{
    animation::{
        ease::Ease,
        pose::{Pose, PoseParam},
        tween::Tween,
    },
    choreo::grab_cycle::{GrabState, StateChange, StateObserver},
    foundation::core::Millis,
    foundation::error::{ClawError, ClawResult},
};

/// The claw parts that follow the grab cycle.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Cable,
    ClawBody,
    LeftArm,
    RightArm,
    CenterArm,
}

impl ElementKind {
    pub const ALL: [Self; 5] = [
        Self::Cable,
        Self::ClawBody,
        Self::LeftArm,
        Self::RightArm,
        Self::CenterArm,
    ];

    pub fn is_arm(self) -> bool {
        matches!(self, Self::LeftArm | Self::RightArm | Self::CenterArm)
    }
}

/// How one element responds to the grab state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionSpec {
    pub rest: Pose,
    pub active: Pose,
    #[serde(default)]
    pub delay_ms: u64,
    pub transition_ms: u64,
    #[serde(default)]
    pub ease: Ease,
}

impl MotionSpec {
    /// The claw's stock choreography: the body drops first, the arms close
    /// 600 ms later.
    pub fn stock(kind: ElementKind) -> Self {
        let (param, rest, active) = match kind {
            ElementKind::Cable => (PoseParam::Height, 40.0, 100.0),
            ElementKind::ClawBody => (PoseParam::OffsetY, 40.0, 100.0),
            ElementKind::LeftArm => (PoseParam::RotateDeg, -15.0, -30.0),
            ElementKind::RightArm => (PoseParam::RotateDeg, 15.0, 30.0),
            ElementKind::CenterArm => (PoseParam::ScaleY, 1.0, 1.1),
        };
        let (delay_ms, transition_ms) = if kind.is_arm() { (600, 500) } else { (0, 800) };
        Self {
            rest: Pose::new().with(param, rest),
            active: Pose::new().with(param, active),
            delay_ms,
            transition_ms,
            ease: Ease::EaseInOut,
        }
    }

    pub fn target(&self, state: GrabState) -> &Pose {
        match state {
            GrabState::Resting => &self.rest,
            GrabState::Grabbing => &self.active,
        }
    }

    pub fn validate(&self) -> ClawResult<()> {
        if self.rest.is_empty() || self.active.is_empty() {
            return Err(ClawError::validation("motion poses must not be empty"));
        }
        if self
            .rest
            .iter()
            .chain(self.active.iter())
            .any(|(_, v)| !v.is_finite())
        {
            return Err(ClawError::validation("motion pose values must be finite"));
        }
        Ok(())
    }
}

/// A claw part that eases toward the pose matching the last observed state.
///
/// A flip that lands mid-transition replaces it, starting from whatever pose
/// is on screen at the flip.
#[derive(Clone, Debug)]
pub struct MotionElement {
    kind: ElementKind,
    spec: MotionSpec,
    state: GrabState,
    tween: Option<Tween>,
}

impl MotionElement {
    pub fn new(kind: ElementKind, spec: MotionSpec) -> Self {
        Self {
            kind,
            spec,
            state: GrabState::Resting,
            tween: None,
        }
    }

    pub fn stock(kind: ElementKind) -> Self {
        Self::new(kind, MotionSpec::stock(kind))
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn spec(&self) -> &MotionSpec {
        &self.spec
    }

    /// Last state this element was told about.
    pub fn state(&self) -> GrabState {
        self.state
    }

    /// When the current transition starts (or started) moving.
    pub fn transition_start(&self) -> Option<Millis> {
        self.tween.as_ref().map(|t| t.starts_at)
    }

    pub fn observe(&mut self, change: StateChange) {
        let from = self.pose_at(change.at);
        self.state = change.state;
        self.tween = Some(Tween {
            from,
            to: self.spec.target(change.state).clone(),
            starts_at: change.at.after(self.spec.delay_ms),
            duration_ms: self.spec.transition_ms,
            ease: self.spec.ease,
        });
    }

    pub fn pose_at(&self, now: Millis) -> Pose {
        match &self.tween {
            Some(tween) => tween.sample(now),
            None => self.spec.rest.clone(),
        }
    }

    pub fn is_settled(&self, now: Millis) -> bool {
        self.tween.as_ref().is_none_or(|t| t.is_finished(now))
    }
}

/// The set of elements sharing one controller. Every element sees a flip
/// with the same timestamp before the next flip is delivered.
#[derive(Clone, Debug)]
pub struct Choreography {
    elements: Vec<MotionElement>,
}

impl Choreography {
    pub fn new(elements: Vec<MotionElement>) -> Self {
        Self { elements }
    }

    pub fn stock() -> Self {
        Self::new(ElementKind::ALL.into_iter().map(MotionElement::stock).collect())
    }

    pub fn elements(&self) -> &[MotionElement] {
        &self.elements
    }

    pub fn get(&self, kind: ElementKind) -> Option<&MotionElement> {
        self.elements.iter().find(|e| e.kind == kind)
    }

    pub fn poses_at(&self, now: Millis) -> impl Iterator<Item = (ElementKind, Pose)> + '_ {
        self.elements.iter().map(move |e| (e.kind, e.pose_at(now)))
    }
}

impl StateObserver for Choreography {
    fn on_state_change(&mut self, change: StateChange) {
        for element in &mut self.elements {
            element.observe(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grab(at: u64) -> StateChange {
        StateChange {
            state: GrabState::Grabbing,
            at: Millis(at),
        }
    }

    fn release(at: u64) -> StateChange {
        StateChange {
            state: GrabState::Resting,
            at: Millis(at),
        }
    }

    #[test]
    fn starts_at_rest_pose() {
        let e = MotionElement::stock(ElementKind::Cable);
        assert_eq!(e.pose_at(Millis(0)).get(PoseParam::Height), Some(40.0));
        assert!(e.is_settled(Millis(0)));
        assert_eq!(e.transition_start(), None);
    }

    #[test]
    fn arms_wait_before_moving() {
        let mut arm = MotionElement::stock(ElementKind::LeftArm);
        arm.observe(grab(4000));
        assert_eq!(arm.transition_start(), Some(Millis(4600)));
        assert_eq!(arm.pose_at(Millis(4599)).get(PoseParam::RotateDeg), Some(-15.0));
        assert_eq!(arm.pose_at(Millis(5100)).get(PoseParam::RotateDeg), Some(-30.0));
        assert!(arm.is_settled(Millis(5100)));
    }

    #[test]
    fn arms_ease_in_and_out() {
        let mut arm = MotionElement::stock(ElementKind::RightArm);
        assert_eq!(arm.spec().ease, Ease::EaseInOut);
        arm.observe(grab(0));
        let at = |t: u64| arm.pose_at(Millis(t)).get(PoseParam::RotateDeg).unwrap();
        assert!((at(850) - 22.5).abs() < 1e-4);
        // Slow start: after a fifth of the time, under half the linear travel.
        assert!(at(700) - 15.0 < 1.5);
    }

    #[test]
    fn body_moves_immediately() {
        let mut body = MotionElement::stock(ElementKind::ClawBody);
        body.observe(grab(4000));
        assert_eq!(body.transition_start(), Some(Millis(4000)));
        let mid = body.pose_at(Millis(4400)).get(PoseParam::OffsetY).unwrap();
        assert!((mid - 70.0).abs() < 1e-4);
        assert_eq!(body.pose_at(Millis(4800)).get(PoseParam::OffsetY), Some(100.0));
    }

    #[test]
    fn interrupted_transition_restarts_from_current_pose() {
        let spec = MotionSpec {
            ease: Ease::Linear,
            ..MotionSpec::stock(ElementKind::Cable)
        };
        let mut cable = MotionElement::new(ElementKind::Cable, spec);
        cable.observe(grab(0));
        cable.observe(release(400));
        // Halfway down when released; goes back up from 70.
        assert_eq!(cable.pose_at(Millis(400)).get(PoseParam::Height), Some(70.0));
        assert_eq!(cable.pose_at(Millis(800)).get(PoseParam::Height), Some(55.0));
        assert_eq!(cable.pose_at(Millis(1200)).get(PoseParam::Height), Some(40.0));
        assert_eq!(cable.state(), GrabState::Resting);
    }

    #[test]
    fn choreography_delivers_common_timestamp() {
        let mut set = Choreography::stock();
        set.on_state_change(grab(8000));
        for e in set.elements() {
            let expected = if e.kind().is_arm() { 8600 } else { 8000 };
            assert_eq!(e.transition_start(), Some(Millis(expected)), "{:?}", e.kind());
            assert_eq!(e.state(), GrabState::Grabbing);
        }
    }

    #[test]
    fn stock_specs_validate() {
        for kind in ElementKind::ALL {
            MotionSpec::stock(kind).validate().unwrap();
        }
        let empty = MotionSpec {
            rest: Pose::new(),
            ..MotionSpec::stock(ElementKind::Cable)
        };
        assert!(empty.validate().is_err());
    }
}
