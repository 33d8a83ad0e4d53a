use rand::Rng;

use crate::{
    animation::{
        ease::Ease,
        keyframes::{Keyframes, Lerp},
    },
    foundation::core::{Millis, Point, Viewport},
    foundation::error::{ClawError, ClawResult},
    timing::scheduler::{Scheduler, TimerId},
};

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
#[serde(transparent)]
pub struct ParticleId(pub u32);

/// Inclusive millisecond range a random duration is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MsRange {
    pub min: u64,
    pub max: u64,
}

impl MsRange {
    pub fn new(min: u64, max: u64) -> ClawResult<Self> {
        let r = Self { min, max };
        r.validate()?;
        Ok(r)
    }

    pub fn validate(&self) -> ClawResult<()> {
        if self.min > self.max {
            return Err(ClawError::validation(format!(
                "range min ({}) must be <= max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, v: u64) -> bool {
        (self.min..=self.max).contains(&v)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.random_range(self.min..=self.max)
    }
}

/// Where a particle's y heads over one cycle. Negative is up.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleTravel {
    /// From the origin to an absolute y, whatever the origin.
    ToY(f64),
    /// From the origin by a fixed offset.
    By(f64),
}

impl Default for ParticleTravel {
    fn default() -> Self {
        Self::ToY(-100.0)
    }
}

impl ParticleTravel {
    pub fn y_at(&self, origin_y: f64, t: f64) -> f64 {
        match *self {
            Self::ToY(target) => <f64 as Lerp>::lerp(&origin_y, &target, t),
            Self::By(dy) => origin_y + dy * t,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Self::ToY(v) | Self::By(v) => v.is_finite(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleFieldConfig {
    pub count: u32,
    pub travel: ParticleTravel,
    pub cycle_ms: MsRange,
    pub start_delay_ms: MsRange,
    pub opacity: Keyframes<f64>,
    pub motion_ease: Ease,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            count: 20,
            travel: ParticleTravel::default(),
            cycle_ms: MsRange {
                min: 2000,
                max: 5000,
            },
            start_delay_ms: MsRange { min: 0, max: 2000 },
            opacity: Keyframes::evenly([0.0, 1.0, 0.0], Ease::Linear),
            motion_ease: Ease::Linear,
        }
    }
}

impl ParticleFieldConfig {
    pub fn validate(&self) -> ClawResult<()> {
        self.cycle_ms.validate()?;
        self.start_delay_ms.validate()?;
        if self.cycle_ms.min == 0 {
            return Err(ClawError::validation("particle cycle_ms.min must be > 0"));
        }
        if !self.travel.is_finite() {
            return Err(ClawError::validation("particle travel must be finite"));
        }
        self.opacity.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Waiting out the one-time start delay.
    Pending,
    Cycling { started_at: Millis, loops: u64 },
}

#[derive(Clone, Debug)]
pub struct Particle {
    id: ParticleId,
    origin: Point,
    cycle_ms: u64,
    start_delay_ms: u64,
    phase: Phase,
    timer: Option<TimerId>,
}

impl Particle {
    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn cycle_ms(&self) -> u64 {
        self.cycle_ms
    }

    pub fn start_delay_ms(&self) -> u64 {
        self.start_delay_ms
    }

    /// Completed loops; zero until the first cycle finishes.
    pub fn loops(&self) -> u64 {
        match self.phase {
            Phase::Pending => 0,
            Phase::Cycling { loops, .. } => loops,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }
}

/// Where a particle is and how visible it is at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParticleSample {
    pub id: ParticleId,
    pub position: Point,
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopTimer {
    Start(ParticleId),
    Restart(ParticleId),
}

/// A fixed pool of particles, each looping its own rise-and-fade cycle.
///
/// Every particle owns exactly one live timer while the field is mounted:
/// first its start delay, then its repeating cycle.
#[derive(Debug)]
pub struct ParticleField {
    cfg: ParticleFieldConfig,
    viewport: Viewport,
    particles: Vec<Particle>,
    timers: Scheduler<LoopTimer>,
    mounted: bool,
}

impl ParticleField {
    /// Create every particle up front. Random draws per particle, in order:
    /// x, y, cycle duration, start delay.
    #[tracing::instrument(level = "debug", skip(cfg, rng), fields(count = cfg.count))]
    pub fn mount<R: Rng>(
        cfg: ParticleFieldConfig,
        viewport: Option<Viewport>,
        at: Millis,
        rng: &mut R,
    ) -> ClawResult<Self> {
        cfg.validate()?;
        let viewport = Viewport::resolve(viewport);
        let mut timers = Scheduler::new(at);
        let particles = (0..cfg.count)
            .map(|i| {
                let id = ParticleId(i);
                let origin = Point::new(
                    rng.random_range(0.0..viewport.width),
                    rng.random_range(0.0..viewport.height),
                );
                let cycle_ms = cfg.cycle_ms.sample(rng);
                let start_delay_ms = cfg.start_delay_ms.sample(rng);
                let timer = timers.after(start_delay_ms, LoopTimer::Start(id));
                Particle {
                    id,
                    origin,
                    cycle_ms,
                    start_delay_ms,
                    phase: Phase::Pending,
                    timer: Some(timer),
                }
            })
            .collect();
        Ok(Self {
            cfg,
            viewport,
            particles,
            timers,
            mounted: true,
        })
    }

    pub fn config(&self) -> &ParticleFieldConfig {
        &self.cfg
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether the particle still has a scheduled loop.
    pub fn is_cycling(&self, id: ParticleId) -> bool {
        self.particle(id)
            .ok()
            .and_then(|p| p.timer)
            .is_some_and(|t| self.timers.is_live(t))
    }

    /// Particle loops currently scheduled.
    pub fn active_cycles(&self) -> usize {
        self.timers.live()
    }

    pub fn advance_to(&mut self, now: Millis) -> ClawResult<()> {
        if !self.mounted {
            return Ok(());
        }
        while let Some(fired) = self.timers.pop_due(now) {
            match fired.key {
                LoopTimer::Start(id) => {
                    let cycle_ms = self.particle(id)?.cycle_ms;
                    let timer = self.timers.every(cycle_ms, LoopTimer::Restart(id))?;
                    let p = self.particle_mut(id)?;
                    p.phase = Phase::Cycling {
                        started_at: fired.at,
                        loops: 0,
                    };
                    p.timer = Some(timer);
                }
                LoopTimer::Restart(id) => {
                    let p = self.particle_mut(id)?;
                    if let Phase::Cycling { started_at, loops } = &mut p.phase {
                        *started_at = fired.at;
                        *loops += 1;
                    }
                    tracing::trace!(particle = id.0, at = %fired.at, "particle loop restart");
                }
            }
        }
        self.timers.settle(now);
        Ok(())
    }

    pub fn sample(&self, now: Millis) -> Vec<ParticleSample> {
        self.particles.iter().map(|p| self.sample_one(p, now)).collect()
    }

    pub fn teardown(&mut self) {
        let cancelled = self.timers.cancel_all();
        for p in &mut self.particles {
            p.timer = None;
        }
        if self.mounted {
            tracing::debug!(cancelled, "particle field torn down");
        }
        self.mounted = false;
    }

    fn sample_one(&self, p: &Particle, now: Millis) -> ParticleSample {
        let progress = match p.phase {
            Phase::Pending => 0.0,
            Phase::Cycling { started_at, .. } => {
                // Modulo keeps sampling sane even if the clock was not advanced.
                (now.since(started_at) % p.cycle_ms) as f64 / p.cycle_ms as f64
            }
        };
        let y = self
            .cfg
            .travel
            .y_at(p.origin.y, self.cfg.motion_ease.apply(progress));
        ParticleSample {
            id: p.id,
            position: Point::new(p.origin.x, y),
            opacity: self.cfg.opacity.sample(progress),
        }
    }

    fn particle(&self, id: ParticleId) -> ClawResult<&Particle> {
        self.particles
            .get(id.0 as usize)
            .ok_or(ClawError::UnknownParticle(id.0))
    }

    fn particle_mut(&mut self, id: ParticleId) -> ClawResult<&mut Particle> {
        self.particles
            .get_mut(id.0 as usize)
            .ok_or(ClawError::UnknownParticle(id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn field(seed: u64) -> ParticleField {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        ParticleField::mount(
            ParticleFieldConfig::default(),
            Some(Viewport::new(800.0, 600.0)),
            Millis(0),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn draws_stay_in_range() {
        for seed in 0..8 {
            let f = field(seed);
            assert_eq!(f.particles().len(), 20);
            for p in f.particles() {
                assert!(f.viewport().contains(p.origin()));
                assert!((2000..=5000).contains(&p.cycle_ms()));
                assert!((0..=2000).contains(&p.start_delay_ms()));
            }
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = field(42);
        let b = field(42);
        let sa: Vec<_> = a.particles().iter().map(|p| (p.origin(), p.cycle_ms())).collect();
        let sb: Vec<_> = b.particles().iter().map(|p| (p.origin(), p.cycle_ms())).collect();
        assert_eq!(sa, sb);
    }

    #[test]
    fn one_live_cycle_per_particle() {
        let mut f = field(3);
        assert_eq!(f.active_cycles(), 20);
        for t in (0..30_000).step_by(250) {
            f.advance_to(Millis(t)).unwrap();
            assert_eq!(f.active_cycles(), 20, "at {t}");
        }
        assert!(f.particles().iter().all(|p| !p.is_pending()));
        assert!(f.is_cycling(ParticleId(7)));
        f.teardown();
        assert_eq!(f.active_cycles(), 0);
        assert!(!f.is_cycling(ParticleId(7)));
        f.advance_to(Millis(90_000)).unwrap();
        assert_eq!(f.active_cycles(), 0);
    }

    #[test]
    fn cycle_repeats_back_to_back_after_delay() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let cfg = ParticleFieldConfig {
            count: 1,
            cycle_ms: MsRange::new(1000, 1000).unwrap(),
            start_delay_ms: MsRange::new(500, 500).unwrap(),
            ..ParticleFieldConfig::default()
        };
        let mut f = ParticleField::mount(cfg, None, Millis(0), &mut rng).unwrap();
        assert_eq!(f.viewport(), Viewport::FALLBACK);
        let origin = f.particles()[0].origin();

        f.advance_to(Millis(400)).unwrap();
        let s = f.sample(Millis(400))[0];
        assert!(f.particles()[0].is_pending());
        assert_eq!(s.opacity, 0.0);
        assert_eq!(s.position, origin);

        let halfway = Point::new(origin.x, (origin.y - 100.0) / 2.0);
        f.advance_to(Millis(1000)).unwrap();
        let s = f.sample(Millis(1000))[0];
        assert_eq!(s.opacity, 1.0);
        assert!((s.position - halfway).hypot() < 1e-9, "{:?}", s.position);

        f.advance_to(Millis(3000)).unwrap();
        assert_eq!(f.particles()[0].loops(), 2);
        let s = f.sample(Millis(3000))[0];
        assert!((s.position - halfway).hypot() < 1e-9, "{:?}", s.position);
    }

    #[test]
    fn default_travel_ends_at_fixed_height() {
        let reference = field(11);
        for p in reference.particles() {
            let mut f = field(11);
            let end = Millis(p.start_delay_ms() + p.cycle_ms() - 1);
            f.advance_to(end).unwrap();
            let s = f.sample(end)[p.id().0 as usize];
            assert_eq!(s.position.x, p.origin().x);
            // One ms short of the wrap, so within one frame of the target.
            let slack = (p.origin().y + 100.0) / p.cycle_ms() as f64 + 1e-9;
            assert!(
                (s.position.y + 100.0).abs() <= slack,
                "{:?} from y={} ended at y={}",
                p.id(),
                p.origin().y,
                s.position.y
            );
        }
    }

    #[test]
    fn relative_travel_offsets_from_origin() {
        let travel = ParticleTravel::By(-100.0);
        assert_eq!(travel.y_at(300.0, 1.0), 200.0);
        assert_eq!(travel.y_at(20.0, 0.5), -30.0);
        assert_eq!(ParticleTravel::ToY(-100.0).y_at(300.0, 1.0), -100.0);
        assert_eq!(ParticleTravel::ToY(-100.0).y_at(20.0, 0.5), -40.0);
    }

    #[test]
    fn travel_parses_from_json() {
        let t: ParticleTravel = serde_json::from_str(r#"{"by":-40.0}"#).unwrap();
        assert_eq!(t, ParticleTravel::By(-40.0));
        assert_eq!(
            serde_json::to_string(&ParticleTravel::default()).unwrap(),
            r#"{"to_y":-100.0}"#
        );
    }

    #[test]
    fn lookup_of_missing_particle_fails() {
        let f = field(1);
        assert!(matches!(
            f.particle(ParticleId(20)),
            Err(ClawError::UnknownParticle(20))
        ));
    }

    #[test]
    fn rejects_zero_length_cycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let cfg = ParticleFieldConfig {
            cycle_ms: MsRange { min: 0, max: 10 },
            ..ParticleFieldConfig::default()
        };
        assert!(ParticleField::mount(cfg, None, Millis(0), &mut rng).is_err());
    }
}
