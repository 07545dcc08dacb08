//! `Process`: one simulated process and its resumable state machine.
//!
//! The clock resumes a process by dispatching `EventType::Resume` for it.
//! What a resume means depends on the current state:
//!
//! | State | On resume |
//! |---|---|
//! | `New` | request memory |
//! | `Ready` | request the CPU |
//! | `Running` | the tick is over: account work, release the CPU, branch |
//! | `Waiting` | the I/O is over: request the CPU again |
//!
//! A request that is granted immediately continues in the same dispatch;
//! one that has to queue returns control to the clock. Queued requests are
//! completed by [`Process::grant_ram`] and [`Process::grant_cpu`], which the
//! runner calls when a release hands a resource over.

use rand::Rng;

use crate::clock::ClockContext;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::EventType;
use crate::machine::{Handoff, Machine};
use crate::resource::{CpuGrant, CpuLease, RamGrant};
use crate::time::{VirtualTime, units_to_ticks};

use super::id::ProcessId;
use super::state::ProcessState;
use super::trace::TraceEntry;
use super::{IO_DELAY, TICK_DURATION};

/// What a resume left the process doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Control went back to the clock with a wake registered (or queued on
    /// a resource).
    Suspended,
    /// The process finished; `total_time` is its sojourn in the system.
    Terminated { total_time: f64 },
}

/// A simulated process.
#[derive(Debug)]
pub struct Process {
    id: ProcessId,
    memory_demand: u32,
    remaining_instructions: u32,
    arrival_time: VirtualTime,
    completion_time: Option<VirtualTime>,
    state: ProcessState,
    lease: Option<CpuLease>,
}

impl Process {
    /// A process arriving at `arrival_time`, in state `New`.
    pub fn new(
        id: ProcessId,
        memory_demand: u32,
        instructions: u32,
        arrival_time: VirtualTime,
    ) -> Self {
        Process {
            id,
            memory_demand,
            remaining_instructions: instructions,
            arrival_time,
            completion_time: None,
            state: ProcessState::New,
            lease: None,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn memory_demand(&self) -> u32 {
        self.memory_demand
    }

    pub fn remaining_instructions(&self) -> u32 {
        self.remaining_instructions
    }

    pub fn arrival_time(&self) -> VirtualTime {
        self.arrival_time
    }

    pub fn completion_time(&self) -> Option<VirtualTime> {
        self.completion_time
    }

    /// Time spent in the system, in ticks, once terminated.
    ///
    /// Computed from whole units, so a process that ran at least one tick
    /// reports at least `1.0`.
    pub fn total_time(&self) -> Option<f64> {
        self.completion_time?
            .duration_since(self.arrival_time)
            .map(units_to_ticks)
    }

    pub fn holds_cpu(&self) -> bool {
        self.lease.is_some()
    }

    /// Continue from the last suspension point.
    pub fn resume<R: Rng>(
        &mut self,
        ctx: &mut ClockContext,
        machine: &mut Machine,
        rng: &mut R,
        config: &SimConfig,
    ) -> SimResult<Outcome> {
        match self.state {
            ProcessState::New => self.admit(ctx, machine),
            ProcessState::Ready => self.request_cpu(ctx, machine),
            ProcessState::Running => self.finish_tick(ctx, machine, rng, config),
            ProcessState::Waiting => {
                self.transition(ctx.now(), machine, ProcessState::Ready);
                self.request_cpu(ctx, machine)
            }
            ProcessState::Terminated => Err(SimError::invariant(format!(
                "{} resumed after termination",
                self.id
            ))),
        }
    }

    /// A queued memory request was satisfied by someone else's release.
    pub fn grant_ram(&mut self, ctx: &mut ClockContext, machine: &mut Machine) -> SimResult<()> {
        if self.state != ProcessState::New {
            return Err(SimError::invariant(format!(
                "{} granted RAM in state {}",
                self.id, self.state
            )));
        }
        self.transition(ctx.now(), machine, ProcessState::Ready);
        ctx.schedule(0, EventType::Resume(self.id))?;
        Ok(())
    }

    /// The CPU was handed over by the previous holder; the tick starts now.
    pub fn grant_cpu(
        &mut self,
        lease: CpuLease,
        ctx: &mut ClockContext,
        machine: &mut Machine,
    ) -> SimResult<()> {
        if lease.holder() != self.id || self.state != ProcessState::Ready || self.lease.is_some() {
            return Err(SimError::invariant(format!(
                "{} in state {} cannot take a CPU lease for {}",
                self.id,
                self.state,
                lease.holder()
            )));
        }
        self.start_tick(lease, ctx, machine)
    }

    // ── Transitions ───────────────────────────────────────────

    fn admit(&mut self, ctx: &mut ClockContext, machine: &mut Machine) -> SimResult<Outcome> {
        match machine.ram_mut().acquire(self.id, self.memory_demand)? {
            RamGrant::Granted => {
                self.transition(ctx.now(), machine, ProcessState::Ready);
                self.request_cpu(ctx, machine)
            }
            RamGrant::Queued => Ok(Outcome::Suspended),
        }
    }

    fn request_cpu(&mut self, ctx: &mut ClockContext, machine: &mut Machine) -> SimResult<Outcome> {
        match machine.cpu_mut().request(self.id)? {
            CpuGrant::Granted(lease) => {
                self.start_tick(lease, ctx, machine)?;
                Ok(Outcome::Suspended)
            }
            CpuGrant::Queued => Ok(Outcome::Suspended),
        }
    }

    fn start_tick(
        &mut self,
        lease: CpuLease,
        ctx: &mut ClockContext,
        machine: &mut Machine,
    ) -> SimResult<()> {
        self.lease = Some(lease);
        self.transition(ctx.now(), machine, ProcessState::Running);
        ctx.schedule(TICK_DURATION, EventType::Resume(self.id))?;
        Ok(())
    }

    fn finish_tick<R: Rng>(
        &mut self,
        ctx: &mut ClockContext,
        machine: &mut Machine,
        rng: &mut R,
        config: &SimConfig,
    ) -> SimResult<Outcome> {
        let lease = self.lease.take().ok_or_else(|| {
            SimError::invariant(format!("{} finished a tick without the CPU", self.id))
        })?;
        self.remaining_instructions = self
            .remaining_instructions
            .saturating_sub(config.tick_capacity);

        // The CPU goes back before anything else can happen to this process.
        if let Some(next) = machine.cpu_mut().release(lease)? {
            machine.push_handoff(Handoff::Cpu(next));
        }

        if self.remaining_instructions == 0 {
            return self.terminate(ctx, machine);
        }

        if rng.random_range(1..=config.wait_denominator) == 1 {
            self.transition(ctx.now(), machine, ProcessState::Waiting);
            ctx.schedule(IO_DELAY, EventType::Resume(self.id))?;
            return Ok(Outcome::Suspended);
        }

        self.transition(ctx.now(), machine, ProcessState::Ready);
        self.request_cpu(ctx, machine)
    }

    fn terminate(&mut self, ctx: &mut ClockContext, machine: &mut Machine) -> SimResult<Outcome> {
        let now = ctx.now();
        for granted in machine.ram_mut().release(self.id, self.memory_demand)? {
            machine.push_handoff(Handoff::Ram(granted));
        }
        self.completion_time = Some(now);
        self.transition(now, machine, ProcessState::Terminated);

        let total_time = self.total_time().ok_or_else(|| {
            SimError::invariant(format!("{} completed before it arrived", self.id))
        })?;
        Ok(Outcome::Terminated { total_time })
    }

    fn transition(&mut self, now: VirtualTime, machine: &mut Machine, to: ProcessState) {
        let from = self.state;
        self.state = to;
        tracing::debug!(
            time = now.as_ticks(),
            pid = %self.id,
            %from,
            %to,
            remaining = self.remaining_instructions,
            "process transition"
        );
        machine.record(TraceEntry {
            time: now,
            process: self.id,
            from,
            to,
        });
    }
}
