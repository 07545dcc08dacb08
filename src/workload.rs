//! Workload generator: exponential arrivals of randomly sized processes.
//!
//! All draws come from the caller's random stream, in a fixed order: the
//! gap before an arrival, then the new process's memory demand, then its
//! instruction count. Gaps are drawn in ticks and rounded to whole time
//! units.

use rand::Rng;

use crate::config::{DemandRange, SimConfig};
use crate::error::{SimError, SimResult};
use crate::process::{Process, ProcessId};
use crate::time::{VirtualTime, ticks_to_units};

/// Draw an exponential variate with the given mean (inverse transform).
pub fn exponential<R: Rng>(rng: &mut R, mean: f64) -> f64 {
    // 1 - u lies in (0, 1], so the logarithm is finite.
    let u: f64 = rng.random();
    -mean * (1.0 - u).ln()
}

fn draw<R: Rng>(rng: &mut R, range: DemandRange) -> u32 {
    rng.random_range(range.min..=range.max)
}

/// Creates a fixed number of processes, one per elapsed gap.
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    total: usize,
    created: usize,
    mean_interval: f64,
}

impl ArrivalGenerator {
    pub fn new(total: usize, mean_interval: f64) -> Self {
        ArrivalGenerator {
            total,
            created: 0,
            mean_interval,
        }
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn is_exhausted(&self) -> bool {
        self.created >= self.total
    }

    /// Draw the gap before the next arrival, in time units, or `None`
    /// once every process has been created.
    pub fn next_gap<R: Rng>(&self, rng: &mut R) -> SimResult<Option<u64>> {
        if self.is_exhausted() {
            return Ok(None);
        }
        let gap = exponential(rng, self.mean_interval);
        ticks_to_units(gap).map(Some).ok_or_else(|| {
            SimError::InvalidConfig(format!(
                "arrival gap of {} ticks does not fit in virtual time",
                gap
            ))
        })
    }

    /// Create the next process at `now`, drawing its memory demand and
    /// then its instruction count.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, config: &SimConfig, now: VirtualTime) -> Process {
        let id = ProcessId::new(self.created);
        self.created += 1;
        let memory = draw(rng, config.memory_demand);
        let instructions = draw(rng, config.instructions);
        Process::new(id, memory, instructions, now)
    }
}
