use crate::{
    animation::{
        ease::Ease,
        keyframes::Keyframes,
        pose::{Pose, PoseParam},
    },
    foundation::core::Millis,
    foundation::error::{ClawError, ClawResult},
};

/// An endless keyframe loop on one pose parameter, e.g. the scroll hint that
/// nudges down and back.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bob {
    pub param: PoseParam,
    pub track: Keyframes<f64>,
    pub period_ms: u64,
    #[serde(default)]
    pub started_at: Millis,
}

impl Default for Bob {
    fn default() -> Self {
        Self {
            param: PoseParam::OffsetY,
            track: Keyframes::evenly([0.0, 10.0, 0.0], Ease::EaseInOut),
            period_ms: 1500,
            started_at: Millis::ZERO,
        }
    }
}

impl Bob {
    pub fn validate(&self) -> ClawResult<()> {
        if self.period_ms == 0 {
            return Err(ClawError::validation("bob period_ms must be > 0"));
        }
        self.track.validate()
    }

    pub fn pose_at(&self, now: Millis) -> Pose {
        let local = now.since(self.started_at) % self.period_ms.max(1);
        let progress = local as f64 / self.period_ms.max(1) as f64;
        Pose::new().with(self.param, self.track.sample(progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loops_over_period() {
        let bob = Bob::default();
        let y = |t: u64| bob.pose_at(Millis(t)).get(PoseParam::OffsetY).unwrap();
        assert_eq!(y(0), 0.0);
        assert!((y(750) - 10.0).abs() < 1e-9);
        assert_eq!(y(1500), 0.0);
        assert!((y(2250) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn respects_start_offset() {
        let bob = Bob {
            started_at: Millis(1000),
            ..Bob::default()
        };
        assert_eq!(bob.pose_at(Millis(500)).get(PoseParam::OffsetY), Some(0.0));
        assert!((bob.pose_at(Millis(1750)).get(PoseParam::OffsetY).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_period_rejected() {
        let bob = Bob {
            period_ms: 0,
            ..Bob::default()
        };
        assert!(bob.validate().is_err());
    }
}
