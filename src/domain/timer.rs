// Tick-counted one-shot and repeating callbacks.
//
// Delays are measured in simulation ticks, never wall-clock time. Callbacks
// receive the context `C` they are fired against; the world schedules
// callbacks against itself.

use std::collections::BTreeMap;

pub type OnceCallback<C> = Box<dyn FnOnce(&mut C) + Send>;
pub type RepeatingCallback<C> = Box<dyn FnMut(&mut C) + Send>;

/// Handle returned by the schedule calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A callback whose delay ran out, taken out of the service so it can run
/// against a context that owns the service.
pub enum DueCallback<C> {
    Once(OnceCallback<C>),
    Repeating(RepeatingCallback<C>),
}

struct Timeout<C> {
    callback: OnceCallback<C>,
    remaining: u64,
}

struct Interval<C> {
    // `None` while the callback is running.
    callback: Option<RepeatingCallback<C>>,
    period: u64,
    remaining: u64,
}

pub struct TimerService<C> {
    next_id: u64,
    timeouts: BTreeMap<TimerId, Timeout<C>>,
    intervals: BTreeMap<TimerId, Interval<C>>,
}

impl<C> Default for TimerService<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimerService<C> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            timeouts: BTreeMap::new(),
            intervals: BTreeMap::new(),
        }
    }

    fn allocate(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fires `callback` once after `delay` ticks. A delay of 0 fires on the next tick.
    pub fn schedule_once(
        &mut self,
        callback: impl FnOnce(&mut C) + Send + 'static,
        delay: u64,
    ) -> TimerId {
        let id = self.allocate();
        self.timeouts.insert(
            id,
            Timeout {
                callback: Box::new(callback),
                remaining: delay,
            },
        );
        id
    }

    /// Cancels a pending one-shot. Unknown or already fired ids are ignored.
    pub fn cancel_once(&mut self, id: TimerId) {
        self.timeouts.remove(&id);
    }

    /// Fires `callback` every `period` ticks until cancelled. A period of 0 is treated as 1.
    pub fn schedule_repeating(
        &mut self,
        callback: impl FnMut(&mut C) + Send + 'static,
        period: u64,
    ) -> TimerId {
        let id = self.allocate();
        let period = period.max(1);
        self.intervals.insert(
            id,
            Interval {
                callback: Some(Box::new(callback)),
                period,
                remaining: period,
            },
        );
        id
    }

    /// Cancels a repeating timer. Unknown ids are ignored.
    pub fn cancel_repeating(&mut self, id: TimerId) {
        self.intervals.remove(&id);
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timeouts.contains_key(&id) || self.intervals.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.timeouts.len() + self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.timeouts.clear();
        self.intervals.clear();
    }

    /// Counts every live entry down by one tick and returns the ids that reached zero.
    pub fn collect_due(&mut self) -> Vec<TimerId> {
        let mut due = Vec::new();
        for (id, timeout) in self.timeouts.iter_mut() {
            timeout.remaining = timeout.remaining.saturating_sub(1);
            if timeout.remaining == 0 {
                due.push(*id);
            }
        }
        for (id, interval) in self.intervals.iter_mut() {
            interval.remaining = interval.remaining.saturating_sub(1);
            if interval.remaining == 0 {
                due.push(*id);
            }
        }
        due
    }

    /// Takes a due callback out of the service.
    ///
    /// One-shots are removed for good; repeating entries are re-armed with their
    /// period and must be handed back through [`TimerService::restore_callback`].
    /// Returns `None` if the id was cancelled in the meantime.
    pub fn take_callback(&mut self, id: TimerId) -> Option<DueCallback<C>> {
        if let Some(timeout) = self.timeouts.remove(&id) {
            return Some(DueCallback::Once(timeout.callback));
        }
        let interval = self.intervals.get_mut(&id)?;
        interval.remaining = interval.period;
        interval.callback.take().map(DueCallback::Repeating)
    }

    /// Puts a repeating callback back after it ran, unless it was cancelled while running.
    pub fn restore_callback(&mut self, id: TimerId, callback: RepeatingCallback<C>) {
        if let Some(interval) = self.intervals.get_mut(&id) {
            interval.callback.get_or_insert(callback);
        }
    }

    /// Advances one tick and fires every due callback against `ctx`.
    pub fn advance(&mut self, ctx: &mut C) {
        for id in self.collect_due() {
            match self.take_callback(id) {
                Some(DueCallback::Once(callback)) => callback(ctx),
                Some(DueCallback::Repeating(mut callback)) => {
                    callback(ctx);
                    self.restore_callback(id, callback);
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_one_shot_delay_elapses_then_it_fires_exactly_once() {
        let mut timers = TimerService::<u32>::new();
        let mut fired = 0u32;
        timers.schedule_once(|count| *count += 1, 3);

        timers.advance(&mut fired);
        timers.advance(&mut fired);
        assert_eq!(fired, 0);

        timers.advance(&mut fired);
        assert_eq!(fired, 1);

        for _ in 0..10 {
            timers.advance(&mut fired);
        }
        assert_eq!(fired, 1);
        assert!(timers.is_empty());
    }

    #[test]
    fn when_repeating_timer_runs_then_it_rearms_with_its_period() {
        let mut timers = TimerService::<Vec<u32>>::new();
        let mut ticks = Vec::new();
        let mut counter = 0u32;
        timers.schedule_repeating(
            move |log: &mut Vec<u32>| {
                counter += 1;
                log.push(counter);
            },
            2,
        );

        for _ in 0..6 {
            timers.advance(&mut ticks);
        }

        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn when_cancelled_before_firing_then_callback_never_runs() {
        let mut timers = TimerService::<u32>::new();
        let mut fired = 0u32;
        let once = timers.schedule_once(|count| *count += 1, 1);
        let repeating = timers.schedule_repeating(|count| *count += 10, 1);

        timers.cancel_once(once);
        timers.cancel_repeating(repeating);
        timers.advance(&mut fired);

        assert_eq!(fired, 0);
    }

    #[test]
    fn when_cancelling_unknown_or_mismatched_ids_then_nothing_happens() {
        let mut timers = TimerService::<u32>::new();
        let repeating = timers.schedule_repeating(|count| *count += 1, 1);

        timers.cancel_once(repeating);
        timers.cancel_once(TimerId(999));
        timers.cancel_repeating(TimerId(999));

        assert!(timers.is_scheduled(repeating));
    }

    #[test]
    fn when_delay_is_zero_then_timer_fires_on_next_advance() {
        let mut timers = TimerService::<u32>::new();
        let mut fired = 0u32;
        timers.schedule_once(|count| *count += 1, 0);
        timers.advance(&mut fired);
        assert_eq!(fired, 1);
    }

    #[test]
    fn when_repeating_callback_is_cancelled_while_taken_then_restore_is_ignored() {
        let mut timers = TimerService::<u32>::new();
        let id = timers.schedule_repeating(|count| *count += 1, 1);

        let due = timers.collect_due();
        assert_eq!(due, vec![id]);
        let Some(DueCallback::Repeating(callback)) = timers.take_callback(id) else {
            panic!("expected repeating callback");
        };
        timers.cancel_repeating(id);
        timers.restore_callback(id, callback);

        assert!(!timers.is_scheduled(id));
    }
}
