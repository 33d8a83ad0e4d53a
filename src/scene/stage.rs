use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    choreo::grab_cycle::{GrabState, StateChange},
    choreo::rig::ClawRig,
    foundation::core::{Millis, Viewport},
    foundation::error::{ClawError, ClawResult},
    intro::bob::Bob,
    intro::reveal::{RevealSection, RevealSequence},
    particles::field::ParticleField,
    render::sink::{ElementPose, NamedPose, RenderFrame, RenderSink},
    scene::config::SceneConfig,
    timing::scheduler::Scheduler,
};

/// The animated layer of the landing page: the claw rig, the particle field,
/// the section entrances and the scroll hint, all on one clock.
#[derive(Debug)]
pub struct Scene {
    rig: ClawRig,
    field: ParticleField,
    sections: BTreeMap<RevealSection, RevealSequence>,
    /// Sections waiting to scroll into view.
    in_view: Scheduler<RevealSection>,
    bob: Bob,
    viewport: Viewport,
    mounted: bool,
}

impl Scene {
    #[tracing::instrument(level = "debug", skip(cfg, rng))]
    pub fn mount<R: Rng>(cfg: &SceneConfig, at: Millis, rng: &mut R) -> ClawResult<Self> {
        cfg.validate()?;
        let rig = ClawRig::mount_with(cfg.grab, &cfg.motions, at)?;
        let field = ParticleField::mount(cfg.particles.clone(), cfg.viewport, at, rng)?;
        let mut sections: BTreeMap<_, _> = RevealSection::ALL
            .into_iter()
            .map(|section| (section, section.sequence()))
            .collect();
        if let Some(hero) = sections.get_mut(&RevealSection::Hero) {
            if cfg.intro {
                hero.trigger(at);
            } else {
                hero.settle();
            }
        }
        let mut in_view = Scheduler::new(at);
        for (&section, offset) in &cfg.in_view {
            in_view.after(offset.0, section);
        }
        let bob = Bob {
            started_at: at.after(cfg.bob.started_at.0),
            ..cfg.bob.clone()
        };
        Ok(Self {
            rig,
            viewport: field.viewport(),
            field,
            sections,
            in_view,
            bob,
            mounted: true,
        })
    }

    /// Mount with the config's own seed.
    pub fn mount_seeded(cfg: &SceneConfig, at: Millis) -> ClawResult<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        Self::mount(cfg, at, &mut rng)
    }

    pub fn rig(&self) -> &ClawRig {
        &self.rig
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn section(&self, section: RevealSection) -> Option<&RevealSequence> {
        self.sections.get(&section)
    }

    /// Play a section's entrance from `at`, e.g. when it scrolls into view.
    /// Returns false if it already played or the scene is torn down.
    pub fn reveal(&mut self, section: RevealSection, at: Millis) -> bool {
        if !self.mounted {
            return false;
        }
        self.sections
            .get_mut(&section)
            .is_some_and(|seq| seq.trigger(at))
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> GrabState {
        self.rig.state()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn advance_to(&mut self, now: Millis) -> ClawResult<Vec<StateChange>> {
        if !self.mounted {
            return Ok(Vec::new());
        }
        while let Some(fired) = self.in_view.pop_due(now) {
            self.reveal(fired.key, fired.at);
        }
        self.in_view.settle(now);
        let changes = self.rig.advance_to(now);
        self.field.advance_to(now)?;
        Ok(changes)
    }

    pub fn frame(&self, now: Millis, changes: Vec<StateChange>) -> RenderFrame {
        RenderFrame {
            at: now,
            state: self.rig.state(),
            changes,
            elements: self
                .rig
                .poses_at(now)
                .into_iter()
                .map(|(element, pose)| ElementPose { element, pose })
                .collect(),
            particles: self.field.sample(now),
            reveals: self
                .sections
                .values()
                .flat_map(|seq| seq.poses_at(now))
                .map(|(id, pose)| NamedPose { id, pose })
                .collect(),
            bob: self.bob.pose_at(now),
        }
    }

    /// Advance to `now` and push the resulting frame.
    pub fn render(&mut self, now: Millis, sink: &mut dyn RenderSink) -> ClawResult<()> {
        let changes = self.advance_to(now)?;
        sink.push_frame(&self.frame(now, changes))
    }

    /// Render every `step_ms` from `from` through `until` inclusive.
    /// Returns the number of frames pushed.
    #[tracing::instrument(level = "debug", skip(self, sink))]
    pub fn run(
        &mut self,
        from: Millis,
        until: Millis,
        step_ms: u64,
        sink: &mut dyn RenderSink,
    ) -> ClawResult<usize> {
        if step_ms == 0 {
            return Err(ClawError::validation("step_ms must be > 0"));
        }
        sink.begin(self.viewport)?;
        let mut frames = 0;
        let mut t = from;
        while t <= until {
            self.render(t, sink)?;
            frames += 1;
            let next = t.after(step_ms);
            if next == t {
                break;
            }
            t = next;
        }
        sink.end()?;
        Ok(frames)
    }

    pub fn teardown(&mut self) {
        self.rig.teardown();
        self.field.teardown();
        self.in_view.cancel_all();
        self.mounted = false;
    }
}
