//! `Machine`: the simulated computer one experiment runs on.
//!
//! Bundles the RAM pool and the CPU with the grants that releases have
//! produced but the runner has not yet delivered, plus an optional
//! transition trace.

use crate::error::{SimError, SimResult};
use crate::process::{Process, ProcessId, ProcessState, TraceEntry};
use crate::resource::{Cpu, CpuLease, RamPool};

/// A grant made to a queued process during someone else's step.
#[derive(Debug, PartialEq, Eq)]
pub enum Handoff {
    /// The process's memory request was satisfied.
    Ram(ProcessId),
    /// The process became the CPU owner.
    Cpu(CpuLease),
}

/// One RAM pool, one CPU, and the bookkeeping around them.
#[derive(Debug)]
pub struct Machine {
    ram: RamPool,
    cpu: Cpu,
    handoffs: Vec<Handoff>,
    trace: Option<Vec<TraceEntry>>,
}

impl Machine {
    /// A machine with a full RAM pool of `ram_capacity` units and an idle
    /// CPU.
    pub fn new(ram_capacity: u32) -> Self {
        Machine {
            ram: RamPool::new(ram_capacity),
            cpu: Cpu::new(),
            handoffs: Vec::new(),
            trace: None,
        }
    }

    /// Record every life-cycle transition from now on.
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(Vec::new);
    }

    pub fn ram(&self) -> &RamPool {
        &self.ram
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The recorded transitions, if tracing is enabled.
    pub fn trace(&self) -> Option<&[TraceEntry]> {
        self.trace.as_deref()
    }

    pub(crate) fn ram_mut(&mut self) -> &mut RamPool {
        &mut self.ram
    }

    pub(crate) fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub(crate) fn push_handoff(&mut self, handoff: Handoff) {
        self.handoffs.push(handoff);
    }

    pub(crate) fn take_handoffs(&mut self) -> Vec<Handoff> {
        std::mem::take(&mut self.handoffs)
    }

    pub(crate) fn record(&mut self, entry: TraceEntry) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(entry);
        }
    }

    /// Cross-check the resources against the process table.
    ///
    /// - every unit of RAM is either available or held by a process that
    ///   is past admission and not yet terminated;
    /// - at most one process is running, and it is the CPU holder.
    pub fn audit(&self, processes: &[Process]) -> SimResult<()> {
        self.ram.check_conservation()?;

        let mut running = None;
        for process in processes {
            let expected = if process.state().holds_memory() {
                process.memory_demand()
            } else {
                0
            };
            let held = self.ram.held_by(process.id());
            if held != expected {
                return Err(SimError::invariant(format!(
                    "{} in state {} holds {} RAM units, expected {}",
                    process.id(),
                    process.state(),
                    held,
                    expected
                )));
            }

            if process.state() == ProcessState::Running {
                if let Some(other) = running.replace(process.id()) {
                    return Err(SimError::invariant(format!(
                        "{} and {} are both running",
                        other,
                        process.id()
                    )));
                }
            }
        }

        if running != self.cpu.holder() {
            return Err(SimError::invariant(format!(
                "CPU holder {:?} does not match running process {:?}",
                self.cpu.holder(),
                running
            )));
        }
        Ok(())
    }
}
