use crate::{
    foundation::core::Millis,
    foundation::error::{ClawError, ClawResult},
    timing::scheduler::{Scheduler, TimerId},
};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GrabState {
    #[default]
    Resting,
    Grabbing,
}

impl std::fmt::Display for GrabState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Resting => "resting",
            Self::Grabbing => "grabbing",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrabCycleConfig {
    pub cycle_interval_ms: u64,
    pub grab_hold_ms: u64,
}

impl Default for GrabCycleConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: 4000,
            grab_hold_ms: 1500,
        }
    }
}

impl GrabCycleConfig {
    pub fn validate(&self) -> ClawResult<()> {
        if self.cycle_interval_ms == 0 {
            return Err(ClawError::validation("cycle_interval_ms must be > 0"));
        }
        if self.grab_hold_ms == 0 {
            return Err(ClawError::validation("grab_hold_ms must be > 0"));
        }
        if self.grab_hold_ms >= self.cycle_interval_ms {
            return Err(ClawError::validation(format!(
                "grab_hold_ms ({}) must be < cycle_interval_ms ({})",
                self.grab_hold_ms, self.cycle_interval_ms
            )));
        }
        Ok(())
    }
}

/// One controller state flip and the instant it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateChange {
    pub state: GrabState,
    pub at: Millis,
}

/// Receives controller state flips in the order they occur.
pub trait StateObserver {
    fn on_state_change(&mut self, change: StateChange);
}

impl StateObserver for Vec<StateChange> {
    fn on_state_change(&mut self, change: StateChange) {
        self.push(change);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CycleTimer {
    Tick,
    Release,
}

/// Periodic RESTING -> GRABBING -> RESTING state machine.
///
/// The first grab starts one full interval after mount. Both timers live in
/// the controller's own [`Scheduler`] and die with [`GrabCycleController::teardown`].
#[derive(Debug)]
pub struct GrabCycleController {
    cfg: GrabCycleConfig,
    state: GrabState,
    timers: Scheduler<CycleTimer>,
    tick: Option<TimerId>,
    release: Option<TimerId>,
    cycles: u64,
    mounted: bool,
}

impl GrabCycleController {
    #[tracing::instrument(level = "debug")]
    pub fn mount(cfg: GrabCycleConfig, at: Millis) -> ClawResult<Self> {
        cfg.validate()?;
        let mut timers = Scheduler::new(at);
        let tick = timers.every(cfg.cycle_interval_ms, CycleTimer::Tick)?;
        Ok(Self {
            cfg,
            state: GrabState::Resting,
            timers,
            tick: Some(tick),
            release: None,
            cycles: 0,
            mounted: true,
        })
    }

    pub fn state(&self) -> GrabState {
        self.state
    }

    pub fn config(&self) -> GrabCycleConfig {
        self.cfg
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of grabs started since mount.
    pub fn cycles_started(&self) -> u64 {
        self.cycles
    }

    pub fn live_timers(&self) -> usize {
        self.timers.live()
    }

    /// Run every timer due up to and including `now`, reporting each flip to
    /// `observer`. Does nothing once torn down.
    pub fn advance_to<O>(&mut self, now: Millis, observer: &mut O)
    where
        O: StateObserver + ?Sized,
    {
        if !self.mounted {
            return;
        }
        while let Some(fired) = self.timers.pop_due(now) {
            match fired.key {
                CycleTimer::Tick => self.on_tick(fired.at, observer),
                CycleTimer::Release => self.on_release(fired.at, observer),
            }
        }
        self.timers.settle(now);
    }

    /// Cancel both timers. Safe to call repeatedly and after either timer fired.
    pub fn teardown(&mut self) {
        if let Some(id) = self.tick.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.release.take() {
            self.timers.cancel(id);
        }
        self.timers.cancel_all();
        if self.mounted {
            tracing::debug!(cycles = self.cycles, "grab cycle torn down");
        }
        self.mounted = false;
    }

    fn on_tick<O>(&mut self, at: Millis, observer: &mut O)
    where
        O: StateObserver + ?Sized,
    {
        if self.state == GrabState::Grabbing {
            tracing::warn!(%at, "grab tick while still grabbing, skipped");
            return;
        }
        self.state = GrabState::Grabbing;
        self.cycles += 1;
        self.release = Some(self.timers.after(self.cfg.grab_hold_ms, CycleTimer::Release));
        tracing::debug!(%at, cycle = self.cycles, "grab");
        observer.on_state_change(StateChange {
            state: GrabState::Grabbing,
            at,
        });
    }

    fn on_release<O>(&mut self, at: Millis, observer: &mut O)
    where
        O: StateObserver + ?Sized,
    {
        self.release = None;
        self.state = GrabState::Resting;
        tracing::debug!(%at, "release");
        observer.on_state_change(StateChange {
            state: GrabState::Resting,
            at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> GrabCycleController {
        GrabCycleController::mount(GrabCycleConfig::default(), Millis(0)).unwrap()
    }

    #[test]
    fn rejects_hold_not_shorter_than_interval() {
        let cfg = GrabCycleConfig {
            cycle_interval_ms: 1000,
            grab_hold_ms: 1000,
        };
        assert!(GrabCycleController::mount(cfg, Millis(0)).is_err());
        let cfg = GrabCycleConfig {
            cycle_interval_ms: 0,
            grab_hold_ms: 0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn first_grab_waits_one_interval() {
        let mut c = controller();
        let mut seen = Vec::new();
        c.advance_to(Millis(3999), &mut seen);
        assert!(seen.is_empty());
        assert_eq!(c.state(), GrabState::Resting);
        c.advance_to(Millis(4000), &mut seen);
        assert_eq!(
            seen,
            vec![StateChange {
                state: GrabState::Grabbing,
                at: Millis(4000)
            }]
        );
    }

    #[test]
    fn large_jump_replays_every_flip_in_order() {
        let mut c = controller();
        let mut seen = Vec::new();
        c.advance_to(Millis(12_000), &mut seen);
        let flips: Vec<(GrabState, u64)> = seen.iter().map(|s| (s.state, s.at.0)).collect();
        assert_eq!(
            flips,
            vec![
                (GrabState::Grabbing, 4000),
                (GrabState::Resting, 5500),
                (GrabState::Grabbing, 8000),
                (GrabState::Resting, 9500),
                (GrabState::Grabbing, 12_000),
            ]
        );
        assert_eq!(c.cycles_started(), 3);
    }

    #[test]
    fn mount_offset_shifts_schedule() {
        let mut c = GrabCycleController::mount(GrabCycleConfig::default(), Millis(250)).unwrap();
        let mut seen = Vec::new();
        c.advance_to(Millis(4250), &mut seen);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].at, Millis(4250));
    }

    #[test]
    fn teardown_is_idempotent_and_silences_timers() {
        let mut c = controller();
        let mut seen = Vec::new();
        c.advance_to(Millis(4100), &mut seen);
        assert_eq!(c.live_timers(), 2);
        c.teardown();
        c.teardown();
        assert_eq!(c.live_timers(), 0);
        assert!(!c.is_mounted());
        c.advance_to(Millis(60_000), &mut seen);
        assert_eq!(seen.len(), 1);
    }
}
