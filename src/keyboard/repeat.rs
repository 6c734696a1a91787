//! Accelerating key repeat.
//!
//! Holding a repeating key runs its action on a timer whose delay shrinks by
//! a fixed step after every tick until it reaches a floor, so a long hold
//! deletes faster and faster. The timer is driven by the host loop: it never
//! sleeps or spawns anything, it only answers "is a tick due at `now`" and
//! reschedules itself on each tick. Time comes from a [`Clock`],
//! which tests replace with a [`ManualClock`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock that only moves when told to. Clones share one time line.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock").finish_non_exhaustive()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Delay curve of a repeat cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatSchedule {
    /// Delay before the first repeat
    pub initial: Duration,
    /// Amount each following delay shrinks by
    pub step: Duration,
    /// Floor for the delay
    pub min: Duration,
}

impl Default for RepeatSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(400),
            step: Duration::from_millis(40),
            min: Duration::from_millis(50),
        }
    }
}

impl RepeatSchedule {
    /// The delay that follows `current`.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_sub(self.step).max(self.min)
    }

    /// The full, infinite sequence of delays, starting with `initial`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial.max(self.min)), |d| {
            Some(self.next_delay(*d))
        })
    }
}

/// Identifies one repeat cycle. A token stops matching once its cycle is
/// cancelled or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelToken(u64);

#[derive(Debug, Clone, Copy)]
struct RepeatCycle {
    token: CancelToken,
    deadline: Instant,
    delay: Duration,
    ticks: u64,
}

/// Shortest delay a timer will use, so polling always terminates.
pub const MIN_REPEAT_DELAY: Duration = Duration::from_millis(1);

/// At most one active accelerating repeat cycle.
#[derive(Debug, Clone)]
pub struct RepeatTimer {
    schedule: RepeatSchedule,
    generation: u64,
    cycle: Option<RepeatCycle>,
}

impl RepeatTimer {
    /// Creates an idle timer. A floor below [`MIN_REPEAT_DELAY`] is raised to it.
    #[must_use]
    pub fn new(mut schedule: RepeatSchedule) -> Self {
        schedule.min = schedule.min.max(MIN_REPEAT_DELAY);
        Self {
            schedule,
            generation: 0,
            cycle: None,
        }
    }

    /// The delay curve.
    #[must_use]
    pub fn schedule(&self) -> RepeatSchedule {
        self.schedule
    }

    /// Starts a new cycle at `now`, cancelling any running one.
    pub fn start(&mut self, now: Instant) -> CancelToken {
        self.cancel();
        self.generation += 1;
        let token = CancelToken(self.generation);
        let delay = self.schedule.initial.max(self.schedule.min);
        self.cycle = Some(RepeatCycle {
            token,
            deadline: now + delay,
            delay,
            ticks: 0,
        });
        token
    }

    /// Stops the running cycle. Safe to call when idle.
    ///
    /// Returns true if a cycle was running.
    pub fn cancel(&mut self) -> bool {
        self.cycle.take().is_some()
    }

    /// Returns true while a cycle is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cycle.is_some()
    }

    /// Returns true if `token` belongs to the running cycle.
    #[must_use]
    pub fn is_current(&self, token: CancelToken) -> bool {
        self.cycle.is_some_and(|c| c.token == token)
    }

    /// When the next tick is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.cycle.map(|c| c.deadline)
    }

    /// Delay between the previous tick and the next one.
    #[must_use]
    pub fn current_delay(&self) -> Option<Duration> {
        self.cycle.map(|c| c.delay)
    }

    /// Ticks fired so far in the running cycle.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.cycle.map_or(0, |c| c.ticks)
    }

    /// Fires at most one tick if one is due at `now`, then reschedules.
    ///
    /// Ticks missed while the host was stalled are dropped: the next deadline
    /// is counted from `now`, so a late wake-up never deletes in a burst.
    pub fn poll(&mut self, now: Instant) -> usize {
        let schedule = self.schedule;
        let Some(cycle) = self.cycle.as_mut() else {
            return 0;
        };
        if cycle.deadline > now {
            return 0;
        }

        cycle.ticks += 1;
        cycle.delay = schedule.next_delay(cycle.delay);
        let next = cycle.deadline + cycle.delay;
        cycle.deadline = if next <= now { now + cycle.delay } else { next };
        1
    }
}
