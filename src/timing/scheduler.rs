use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::foundation::core::Millis;
use crate::foundation::error::{ClawError, ClawResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// A timer that came due while advancing the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired<K> {
    pub id: TimerId,
    pub key: K,
    pub at: Millis,
}

#[derive(Clone, Debug)]
struct Timer<K> {
    key: K,
    period: Option<u64>,
    // Matches the live queue entry; older entries for this id are stale.
    seq: u64,
}

/// Deterministic single-threaded timer queue on a simulated millisecond clock.
///
/// Ordering rule: timers fire by due time, ties in scheduling order. Cancelled
/// timers are dropped from the live set immediately and their queue entries are
/// skipped lazily, so a cancelled timer can never fire.
#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    now: Millis,
    next_id: u64,
    next_seq: u64,
    timers: HashMap<TimerId, Timer<K>>,
    queue: BinaryHeap<Reverse<(Millis, u64, TimerId)>>,
}

impl<K: Copy> Scheduler<K> {
    pub fn new(start: Millis) -> Self {
        Self {
            now: start,
            next_id: 0,
            next_seq: 0,
            timers: HashMap::new(),
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// One-shot timer firing `delay_ms` from now.
    pub fn after(&mut self, delay_ms: u64, key: K) -> TimerId {
        self.insert(self.now.after(delay_ms), None, key)
    }

    /// Repeating timer, first firing one `period_ms` from now.
    pub fn every(&mut self, period_ms: u64, key: K) -> ClawResult<TimerId> {
        self.every_after(period_ms, period_ms, key)
    }

    /// Repeating timer with an explicit first delay.
    pub fn every_after(&mut self, first_ms: u64, period_ms: u64, key: K) -> ClawResult<TimerId> {
        if period_ms == 0 {
            return Err(ClawError::validation("repeating timer period must be > 0"));
        }
        Ok(self.insert(self.now.after(first_ms), Some(period_ms), key))
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was
    /// cancelled before; calling it again is harmless.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        self.queue.clear();
        n
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn live(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the earliest live timer.
    pub fn next_due(&mut self) -> Option<Millis> {
        self.drop_stale();
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Pop the earliest live timer due at or before `until`, moving the clock
    /// to its due time. Repeating timers are re-armed one period later.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<K>> {
        self.drop_stale();
        let Reverse((due, _, id)) = *self.queue.peek()?;
        if due > until {
            return None;
        }
        self.queue.pop();
        self.now = self.now.max(due);

        let (key, period) = self.timers.get(&id).map(|t| (t.key, t.period))?;
        match period {
            Some(period) => {
                let seq = self.bump_seq();
                if let Some(t) = self.timers.get_mut(&id) {
                    t.seq = seq;
                }
                self.queue.push(Reverse((due.after(period), seq, id)));
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(Fired { id, key, at: due })
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn settle(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, due: Millis, period: Option<u64>, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.timers.insert(id, Timer { key, period, seq });
        self.queue.push(Reverse((due, seq, id)));
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn drop_stale(&mut self) {
        while let Some(&Reverse((_, seq, id))) = self.queue.peek() {
            match self.timers.get(&id) {
                Some(t) if t.seq == seq => break,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }
}
