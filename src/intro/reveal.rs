use crate::{
    animation::{
        ease::Ease,
        pose::{Pose, PoseParam},
        tween::Tween,
    },
    foundation::core::Millis,
};

/// A one-shot entrance tween, measured from the moment its sequence is triggered.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reveal {
    pub id: String,
    pub from: Pose,
    pub to: Pose,
    #[serde(default)]
    pub delay_ms: u64,
    pub duration_ms: u64,
    #[serde(default = "default_reveal_ease")]
    pub ease: Ease,
}

fn default_reveal_ease() -> Ease {
    Ease::EaseInOut
}

impl Reveal {
    pub fn new(id: impl Into<String>, from: Pose, to: Pose, delay_ms: u64, duration_ms: u64) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            delay_ms,
            duration_ms,
            ease: default_reveal_ease(),
        }
    }

    fn tween(&self, triggered_at: Millis) -> Tween {
        Tween {
            from: self.from.clone(),
            to: self.to.clone(),
            starts_at: triggered_at.after(self.delay_ms),
            duration_ms: self.duration_ms,
            ease: self.ease,
        }
    }
}

fn faded() -> Pose {
    Pose::new().with(PoseParam::Opacity, 0.0)
}

fn shown() -> Pose {
    Pose::new().with(PoseParam::Opacity, 1.0)
}

/// A block of the landing page with its own entrance.
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
pub enum RevealSection {
    /// Plays on mount.
    Hero,
    /// Episode cards; play when scrolled into view.
    Episodes,
    /// Stat counters; play when scrolled into view.
    Stats,
}

impl RevealSection {
    pub const ALL: [RevealSection; 3] = [Self::Hero, Self::Episodes, Self::Stats];

    pub fn sequence(self) -> RevealSequence {
        match self {
            Self::Hero => RevealSequence::hero(),
            Self::Episodes => RevealSequence::episodes(),
            Self::Stats => RevealSequence::stats(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Playback {
    #[default]
    Idle,
    Playing(Millis),
    /// Shown in its final pose without animating.
    Settled,
}

/// Entrance tweens that play once. Triggering again is ignored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RevealSequence {
    reveals: Vec<Reveal>,
    #[serde(skip)]
    playback: Playback,
}

impl RevealSequence {
    /// The landing hero: badge, claw, title, call-to-action, scroll hint.
    pub fn hero() -> Self {
        let slide = |dy: f64| faded().with(PoseParam::OffsetY, dy);
        let settle = || shown().with(PoseParam::OffsetY, 0.0);
        Self {
            reveals: vec![
                Reveal::new("badge", slide(-30.0), settle(), 0, 800),
                Reveal::new(
                    "claw",
                    faded().with(PoseParam::Scale, 0.9),
                    shown().with(PoseParam::Scale, 1.0),
                    200,
                    800,
                ),
                Reveal::new("title", slide(30.0), settle(), 400, 800),
                Reveal::new("actions", slide(20.0), settle(), 800, 600),
                Reveal::new("scroll_hint", faded(), shown(), 1500, 300),
            ],
            playback: Playback::Idle,
        }
    }

    /// The four episode cards, 100 ms apart starting at 100 ms.
    pub fn episodes() -> Self {
        Self::staggered("episode", 4, 100, 100, 30.0, 600)
    }

    /// The four stat counters, 100 ms apart starting at once.
    pub fn stats() -> Self {
        Self::staggered("stat", 4, 0, 100, 20.0, 300)
    }

    /// `count` items sliding up from `rise` units below. Item `i` waits
    /// `first_delay_ms + i * step_ms`.
    pub fn staggered(
        prefix: &str,
        count: usize,
        first_delay_ms: u64,
        step_ms: u64,
        rise: f64,
        duration_ms: u64,
    ) -> Self {
        let reveals = (0..count)
            .map(|i| {
                Reveal::new(
                    format!("{prefix}{i}"),
                    faded().with(PoseParam::OffsetY, rise),
                    shown().with(PoseParam::OffsetY, 0.0),
                    first_delay_ms.saturating_add(step_ms.saturating_mul(i as u64)),
                    duration_ms,
                )
            })
            .collect();
        Self {
            reveals,
            playback: Playback::Idle,
        }
    }

    pub fn reveals(&self) -> &[Reveal] {
        &self.reveals
    }

    pub fn triggered_at(&self) -> Option<Millis> {
        match self.playback {
            Playback::Playing(at) => Some(at),
            _ => None,
        }
    }

    /// Start the sequence. Returns false if it already ran or was settled.
    pub fn trigger(&mut self, at: Millis) -> bool {
        if self.playback != Playback::Idle {
            return false;
        }
        tracing::debug!(%at, reveals = self.reveals.len(), "reveal triggered");
        self.playback = Playback::Playing(at);
        true
    }

    /// Jump straight to the final poses. Returns false if it already ran.
    pub fn settle(&mut self) -> bool {
        if self.playback != Playback::Idle {
            return false;
        }
        self.playback = Playback::Settled;
        true
    }

    pub fn pose_of(&self, id: &str, now: Millis) -> Option<Pose> {
        let r = self.reveals.iter().find(|r| r.id == id)?;
        Some(self.sample(r, now))
    }

    pub fn poses_at(&self, now: Millis) -> Vec<(String, Pose)> {
        self.reveals
            .iter()
            .map(|r| (r.id.clone(), self.sample(r, now)))
            .collect()
    }

    pub fn is_complete(&self, now: Millis) -> bool {
        match self.playback {
            Playback::Idle => false,
            Playback::Playing(at) => self.reveals.iter().all(|r| r.tween(at).is_finished(now)),
            Playback::Settled => true,
        }
    }

    fn sample(&self, r: &Reveal, now: Millis) -> Pose {
        match self.playback {
            Playback::Idle => r.from.clone(),
            Playback::Playing(at) => r.tween(at).sample(now),
            Playback::Settled => r.to.clone(),
        }
    }
}
