//! The event clock: the simulation's execution loop.
//!
//! Pops events in `(time, id)` order, advances virtual time to each one
//! and hands it to a handler, which resumes exactly one suspended
//! computation. The loop is synchronous and single-threaded.

use crate::error::{SimError, SimResult};
use crate::event::{Event, EventId, EventType};
use crate::scheduler::Scheduler;
use crate::time::VirtualTime;

// ── Handler trait ─────────────────────────────────────────────────────

/// Reacts to dispatched events.
///
/// The handler receives a `ClockContext` so it can register follow-up
/// wakes. An error aborts the run.
pub trait EventHandler {
    fn handle(&mut self, ctx: &mut ClockContext, event: &Event) -> SimResult<()>;
}

/// Closures make convenient handlers in tests.
impl<F> EventHandler for F
where
    F: FnMut(&mut ClockContext, &Event) -> SimResult<()>,
{
    fn handle(&mut self, ctx: &mut ClockContext, event: &Event) -> SimResult<()> {
        (self)(ctx, event)
    }
}

// ── Clock Context ─────────────────────────────────────────────────────

/// Mutable view of the clock handed to a handler during dispatch.
///
/// Borrows the queue mutably, so a handler can only affect dispatch order
/// through `schedule`.
pub struct ClockContext<'a> {
    scheduler: &'a mut Scheduler,
    now: VirtualTime,
}

impl ClockContext<'_> {
    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> VirtualTime {
        self.now
    }

    /// Register a wake `delay` units from now.
    pub fn schedule(&mut self, delay: u64, payload: EventType) -> SimResult<EventId> {
        let at = self
            .now
            .plus(delay)
            .ok_or(SimError::TimeOverflow { delay })?;
        Ok(self.scheduler.schedule(at, payload))
    }

    /// Number of pending events.
    pub fn pending_count(&self) -> usize {
        self.scheduler.len()
    }
}

// ── EventClock ────────────────────────────────────────────────────────

/// Owns the event queue and the current virtual time.
///
/// Call `run_to_completion` to drain the queue, or `step` to dispatch one
/// event at a time.
#[derive(Debug, Clone, Default)]
pub struct EventClock {
    scheduler: Scheduler,
    current_time: VirtualTime,
    events_processed: u64,
}

impl EventClock {
    /// Create a clock at time zero with no pending events.
    pub fn new() -> Self {
        EventClock {
            scheduler: Scheduler::new(),
            current_time: VirtualTime::ZERO,
            events_processed: 0,
        }
    }

    pub fn current_time(&self) -> VirtualTime {
        self.current_time
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Schedule an event `delay` units after the current time, before or
    /// between dispatches.
    pub fn schedule(&mut self, delay: u64, payload: EventType) -> SimResult<EventId> {
        let at = self
            .current_time
            .plus(delay)
            .ok_or(SimError::TimeOverflow { delay })?;
        Ok(self.scheduler.schedule(at, payload))
    }

    /// Dispatch a single event.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    pub fn step(&mut self, handler: &mut dyn EventHandler) -> SimResult<Option<Event>> {
        let Some(event) = self.scheduler.pop_next() else {
            return Ok(None);
        };

        if event.scheduled_at < self.current_time {
            return Err(SimError::invariant(format!(
                "time went backward: current={}, event={}",
                self.current_time, event.scheduled_at
            )));
        }
        self.current_time = event.scheduled_at;
        self.events_processed += 1;
        tracing::trace!(
            time = %event.scheduled_at,
            id = %event.id,
            payload = %event.payload,
            "dispatch"
        );

        let mut ctx = ClockContext {
            scheduler: &mut self.scheduler,
            now: self.current_time,
        };
        handler.handle(&mut ctx, &event)?;

        Ok(Some(event))
    }

    /// Run until the queue is empty.
    ///
    /// Returns the number of events processed by this call.
    pub fn run_to_completion(&mut self, handler: &mut dyn EventHandler) -> SimResult<u64> {
        let start = self.events_processed;
        while self.step(handler)?.is_some() {}
        Ok(self.events_processed - start)
    }

    /// Run until the queue is empty or `max_steps` events have been
    /// dispatched, whichever comes first.
    pub fn run_for(&mut self, max_steps: u64, handler: &mut dyn EventHandler) -> SimResult<u64> {
        let start = self.events_processed;
        for _ in 0..max_steps {
            if self.step(handler)?.is_none() {
                break;
            }
        }
        Ok(self.events_processed - start)
    }

    /// Returns `true` if there are no more events to process.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessId;

    fn resume(pid: usize) -> EventType {
        EventType::Resume(ProcessId::new(pid))
    }

    #[test]
    fn test_basic_execution_loop() {
        let mut clock = EventClock::new();

        clock.schedule(10, resume(0)).unwrap();
        clock.schedule(2, resume(1)).unwrap();
        clock.schedule(30, resume(2)).unwrap();

        let mut seen = Vec::new();
        let mut handler = |_ctx: &mut ClockContext, event: &Event| -> SimResult<()> {
            if let EventType::Resume(pid) = event.payload {
                seen.push(pid.raw());
            }
            Ok(())
        };
        let processed = clock.run_to_completion(&mut handler).unwrap();

        assert_eq!(processed, 3);
        assert_eq!(seen, vec![1, 0, 2]);
        assert_eq!(clock.current_time(), VirtualTime::new(30));
    }

    #[test]
    fn test_handler_schedules_followup() {
        let mut clock = EventClock::new();
        clock.schedule(0, EventType::Arrival).unwrap();

        let mut times = Vec::new();
        let mut handler = |ctx: &mut ClockContext, _event: &Event| -> SimResult<()> {
            times.push(ctx.now().units());
            if ctx.now().units() < 3 {
                ctx.schedule(1, EventType::Arrival)?;
            }
            Ok(())
        };
        clock.run_to_completion(&mut handler).unwrap();

        assert_eq!(times, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_same_time_events_resume_in_schedule_order() {
        let mut clock = EventClock::new();
        clock.schedule(1, EventType::Arrival).unwrap();

        let mut order = Vec::new();
        let mut pending = Vec::new();
        let mut handler = |ctx: &mut ClockContext, event: &Event| -> SimResult<()> {
            match event.payload {
                EventType::Arrival => {
                    // Three zero-delay wakes registered during one dispatch.
                    for pid in [5, 3, 8] {
                        ctx.schedule(0, resume(pid))?;
                    }
                    pending.push(ctx.pending_count());
                }
                EventType::Resume(pid) => order.push((ctx.now().units(), pid.raw())),
            }
            Ok(())
        };
        clock.run_to_completion(&mut handler).unwrap();

        assert_eq!(pending, vec![3]);
        assert_eq!(order, vec![(1, 5), (1, 3), (1, 8)]);
    }

    #[test]
    fn test_overflowing_delay_is_rejected() {
        let mut clock = EventClock::new();
        clock.schedule(u64::MAX, EventType::Arrival).unwrap();

        let mut handler = |ctx: &mut ClockContext, _event: &Event| -> SimResult<()> {
            ctx.schedule(1, EventType::Arrival).map(|_| ())
        };
        let result = clock.run_to_completion(&mut handler);
        assert_eq!(result, Err(SimError::TimeOverflow { delay: 1 }));
    }

    #[test]
    fn test_handler_error_aborts_run() {
        let mut clock = EventClock::new();
        for i in 0..5 {
            clock.schedule(i, EventType::Arrival).unwrap();
        }

        let mut calls = 0;
        let mut handler = |_ctx: &mut ClockContext, _event: &Event| -> SimResult<()> {
            calls += 1;
            if calls == 2 {
                return Err(SimError::invariant("boom"));
            }
            Ok(())
        };
        let result = clock.run_to_completion(&mut handler);

        assert_eq!(result, Err(SimError::invariant("boom")));
        assert_eq!(calls, 2);
        assert!(!clock.is_finished());
    }

    #[test]
    fn test_step_and_run_for() {
        let mut clock = EventClock::new();
        for i in 0..10 {
            clock.schedule(i, EventType::Arrival).unwrap();
        }
        let mut idle = |_ctx: &mut ClockContext, _event: &Event| -> SimResult<()> { Ok(()) };

        let first = clock.step(&mut idle).unwrap().unwrap();
        assert_eq!(first.scheduled_at, VirtualTime::ZERO);

        assert_eq!(clock.run_for(4, &mut idle).unwrap(), 4);
        assert_eq!(clock.events_processed(), 5);
        assert_eq!(clock.run_to_completion(&mut idle).unwrap(), 5);
        assert!(clock.step(&mut idle).unwrap().is_none());
    }

    #[test]
    fn test_time_monotonicity() {
        let mut clock = EventClock::new();
        for delay in [100, 50, 75, 10] {
            clock.schedule(delay, EventType::Arrival).unwrap();
        }

        let mut times = Vec::new();
        let mut handler = |ctx: &mut ClockContext, _event: &Event| -> SimResult<()> {
            times.push(ctx.now().units());
            Ok(())
        };
        clock.run_to_completion(&mut handler).unwrap();

        assert_eq!(times, vec![10, 50, 75, 100]);
    }
}
