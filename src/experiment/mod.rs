//! Experiment runner.
//!
//! One experiment = one workload size on a fresh clock, RAM pool and CPU.
//! A batch runs every configured size in order on one shared random
//! stream, so a fixed seed reproduces the whole batch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{ClockContext, EventClock, EventHandler};
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::{Event, EventType};
use crate::machine::{Handoff, Machine};
use crate::process::{Outcome, Process, ProcessId, ProcessState};
use crate::time::VirtualTime;
use crate::workload::ArrivalGenerator;


/// The output of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    pub workload_size: usize,
    /// Per-process time in the system, in completion order.
    pub completion_times: Vec<f64>,
    /// Virtual time when the last event fired.
    pub end_time: VirtualTime,
    pub events_processed: u64,
}

/// One entry of a batch: the size and how its run went.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentOutcome {
    pub workload_size: usize,
    pub result: SimResult<ExperimentResult>,
}

/// The event handler for a single experiment.
///
/// Owns the process table and the machine; borrows the configuration and
/// the batch's random stream.
pub struct Experiment<'a, R: Rng> {
    config: &'a SimConfig,
    rng: &'a mut R,
    workload_size: usize,
    generator: ArrivalGenerator,
    processes: Vec<Process>,
    machine: Machine,
    completion_times: Vec<f64>,
}

impl<'a, R: Rng> Experiment<'a, R> {
    /// Set up an experiment. The configuration is not validated here;
    /// [`run_experiment`] does that.
    pub fn new(config: &'a SimConfig, workload_size: usize, rng: &'a mut R) -> Self {
        Experiment {
            config,
            rng,
            workload_size,
            generator: ArrivalGenerator::new(workload_size, config.mean_interval),
            processes: Vec::new(),
            machine: Machine::new(config.ram_capacity),
            completion_times: Vec::new(),
        }
    }

    /// Record every life-cycle transition.
    pub fn with_trace(mut self) -> Self {
        self.machine.enable_trace();
        self
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn completion_times(&self) -> &[f64] {
        &self.completion_times
    }

    /// Draw the first arrival gap and schedule it.
    pub fn start(&mut self, clock: &mut EventClock) -> SimResult<()> {
        if let Some(gap) = self.generator.next_gap(self.rng)? {
            clock.schedule(gap, EventType::Arrival)?;
        }
        Ok(())
    }

    /// Check that every process finished and hand back the result.
    pub fn finish(self, clock: &EventClock) -> SimResult<ExperimentResult> {
        let unfinished = self
            .processes
            .iter()
            .filter(|p| p.state() != ProcessState::Terminated)
            .count();
        if unfinished > 0 {
            return Err(SimError::invariant(format!(
                "{} of {} processes never terminated",
                unfinished,
                self.processes.len()
            )));
        }
        if self.completion_times.len() != self.workload_size {
            return Err(SimError::invariant(format!(
                "recorded {} completion times for a workload of {}",
                self.completion_times.len(),
                self.workload_size
            )));
        }

        Ok(ExperimentResult {
            workload_size: self.workload_size,
            completion_times: self.completion_times,
            end_time: clock.current_time(),
            events_processed: clock.events_processed(),
        })
    }

    fn on_arrival(&mut self, ctx: &mut ClockContext) -> SimResult<()> {
        let process = self.generator.spawn(self.rng, self.config, ctx.now());
        tracing::debug!(
            time = ctx.now().as_ticks(),
            pid = %process.id(),
            memory = process.memory_demand(),
            instructions = process.remaining_instructions(),
            "process arrived"
        );
        ctx.schedule(0, EventType::Resume(process.id()))?;
        self.processes.push(process);

        if let Some(gap) = self.generator.next_gap(self.rng)? {
            ctx.schedule(gap, EventType::Arrival)?;
        }
        Ok(())
    }

    fn on_resume(&mut self, ctx: &mut ClockContext, pid: ProcessId) -> SimResult<()> {
        let process = self
            .processes
            .get_mut(pid.raw())
            .ok_or_else(|| SimError::invariant(format!("resume for unknown process {}", pid)))?;

        if let Outcome::Terminated { total_time } =
            process.resume(ctx, &mut self.machine, self.rng, self.config)?
        {
            self.completion_times.push(total_time);
        }
        Ok(())
    }

    /// Deliver the grants produced by releases during this dispatch.
    fn apply_handoffs(&mut self, ctx: &mut ClockContext) -> SimResult<()> {
        for handoff in self.machine.take_handoffs() {
            let pid = match &handoff {
                Handoff::Ram(pid) => *pid,
                Handoff::Cpu(lease) => lease.holder(),
            };
            let process = self.processes.get_mut(pid.raw()).ok_or_else(|| {
                SimError::invariant(format!("handoff to unknown process {}", pid))
            })?;
            match handoff {
                Handoff::Ram(_) => process.grant_ram(ctx, &mut self.machine)?,
                Handoff::Cpu(lease) => process.grant_cpu(lease, ctx, &mut self.machine)?,
            }
        }
        Ok(())
    }
}

impl<R: Rng> EventHandler for Experiment<'_, R> {
    fn handle(&mut self, ctx: &mut ClockContext, event: &Event) -> SimResult<()> {
        match event.payload {
            EventType::Arrival => self.on_arrival(ctx)?,
            EventType::Resume(pid) => self.on_resume(ctx, pid)?,
        }
        self.apply_handoffs(ctx)?;
        self.machine.audit(&self.processes)
    }
}

/// Run one workload size to completion on `rng`.
pub fn run_experiment<R: Rng>(
    config: &SimConfig,
    workload_size: usize,
    rng: &mut R,
) -> SimResult<ExperimentResult> {
    config.validate()?;
    if workload_size == 0 {
        return Err(SimError::InvalidConfig("workload size must be positive".into()));
    }

    let mut clock = EventClock::new();
    let mut experiment = Experiment::new(config, workload_size, rng);
    experiment.start(&mut clock)?;
    clock.run_to_completion(&mut experiment)?;
    experiment.finish(&clock)
}

/// Run every configured workload size, in order, on one random stream
/// seeded from `config.seed`.
///
/// A failed size is reported in its outcome and does not stop the rest.
pub fn run_experiments(config: &SimConfig) -> SimResult<Vec<ExperimentOutcome>> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let outcomes = config
        .workload_sizes
        .iter()
        .map(|&workload_size| {
            tracing::info!(workload_size, seed = config.seed, "starting experiment");
            let result = run_experiment(config, workload_size, &mut rng);
            match &result {
                Ok(r) => tracing::info!(
                    workload_size,
                    events = r.events_processed,
                    end_time = r.end_time.as_ticks(),
                    "experiment finished"
                ),
                Err(e) => tracing::warn!(workload_size, error = %e, "experiment failed"),
            }
            ExperimentOutcome {
                workload_size,
                result,
            }
        })
        .collect();
    Ok(outcomes)
}
