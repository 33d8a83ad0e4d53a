use crate::{
    animation::{ease::Ease, keyframes::Lerp, pose::Pose},
    foundation::core::Millis,
};

/// A single scheduled move between two poses.
///
/// Before `starts_at` the tween shows `from`; after `starts_at + duration_ms`
/// it shows `to`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub from: Pose,
    pub to: Pose,
    pub starts_at: Millis,
    pub duration_ms: u64,
    pub ease: Ease,
}

impl Tween {
    pub fn ends_at(&self) -> Millis {
        self.starts_at.after(self.duration_ms)
    }

    pub fn progress(&self, now: Millis) -> f64 {
        if now < self.starts_at {
            return 0.0;
        }
        if self.duration_ms == 0 {
            return 1.0;
        }
        (now.since(self.starts_at) as f64 / self.duration_ms as f64).min(1.0)
    }

    pub fn sample(&self, now: Millis) -> Pose {
        let t = self.progress(now);
        if t <= 0.0 {
            return self.from.clone();
        }
        if t >= 1.0 {
            return self.to.clone();
        }
        Pose::lerp(&self.from, &self.to, self.ease.apply(t))
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        now >= self.ends_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::pose::PoseParam;

    fn tween() -> Tween {
        Tween {
            from: Pose::new().with(PoseParam::Height, 40.0),
            to: Pose::new().with(PoseParam::Height, 100.0),
            starts_at: Millis(1000),
            duration_ms: 800,
            ease: Ease::Linear,
        }
    }

    #[test]
    fn holds_start_pose_until_start() {
        let tw = tween();
        assert_eq!(tw.sample(Millis(0)).get(PoseParam::Height), Some(40.0));
        assert_eq!(tw.sample(Millis(1000)).get(PoseParam::Height), Some(40.0));
    }

    #[test]
    fn interpolates_and_settles() {
        let tw = tween();
        assert_eq!(tw.sample(Millis(1400)).get(PoseParam::Height), Some(70.0));
        assert_eq!(tw.sample(Millis(1800)).get(PoseParam::Height), Some(100.0));
        assert!(tw.is_finished(Millis(1800)));
        assert!(!tw.is_finished(Millis(1799)));
    }

    #[test]
    fn zero_duration_jumps() {
        let tw = Tween {
            duration_ms: 0,
            ..tween()
        };
        assert_eq!(tw.sample(Millis(1000)).get(PoseParam::Height), Some(100.0));
    }
}
