//! Scheduled callbacks owned by a client.
//!
//! Timers never run on their own. The IO loop asks [`Timers::until_next`]
//! how long it may sleep, and calls [`Timers::fire_due`] before every drain
//! pass.

use std::fmt;
use std::time::{Duration, Instant};

/// Handle returned when scheduling, used to cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

type Callback<C> = Box<dyn FnMut(&mut C) + Send>;

struct Timer<C> {
    id: TimerId,
    deadline: Instant,
    every: Option<Duration>,
    callback: Callback<C>,
}

/// Anything that owns a [`Timers`] firing into itself.
pub trait TimerHost: Sized {
    fn timers(&mut self) -> &mut Timers<Self>;
}

pub struct Timers<C> {
    next_id: u64,
    pending: Vec<Timer<C>>,
    cancelled: Vec<TimerId>,
}

impl<C> Default for Timers<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
            cancelled: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for Timers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<C> Timers<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once, `delay` from now.
    pub fn schedule_once<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut C) + Send + 'static,
    {
        self.schedule(delay, None, Box::new(callback))
    }

    /// Run `callback` every `interval`, starting one interval from now.
    pub fn schedule_repeating<F>(&mut self, interval: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut C) + Send + 'static,
    {
        self.schedule(interval, Some(interval), Box::new(callback))
    }

    fn schedule(&mut self, delay: Duration, every: Option<Duration>, callback: Callback<C>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            deadline: Instant::now() + delay,
            every,
            callback,
        });
        id
    }

    /// Cancel a timer. Returns `false` if it already ran or was never
    /// scheduled here. A repeating timer may cancel itself from its own
    /// callback.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        if self.pending.len() < before {
            return true;
        }
        // It may be firing right now.
        if id.0 < self.next_id && !self.cancelled.contains(&id) {
            self.cancelled.push(id);
        }
        false
    }

    /// Time from `now` until the earliest deadline, zero if one has passed.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.pending
            .iter()
            .map(|t| t.deadline.saturating_duration_since(now))
            .min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<C: TimerHost> Timers<C> {
    /// Run every callback whose deadline is at or before `now`.
    ///
    /// Returns how many fired.
    pub fn fire_due(ctx: &mut C, now: Instant) -> usize {
        let timers = ctx.timers();
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut timers.pending).into_iter().partition(|t| t.deadline <= now);
        timers.pending = rest;
        timers.cancelled.clear();
        due.sort_by_key(|t| t.deadline);

        let fired = due.len();
        for timer in due.iter_mut() {
            (timer.callback)(ctx);
        }

        let timers = ctx.timers();
        for mut timer in due {
            let Some(every) = timer.every else { continue };
            if timers.cancelled.contains(&timer.id) {
                continue;
            }
            timer.deadline = (timer.deadline + every).max(now);
            timers.pending.push(timer);
        }
        timers.cancelled.clear();

        fired
    }
}
