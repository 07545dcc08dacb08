//! `RamPool`: capacity-bounded memory with first-come-first-served grants.

use std::collections::{BTreeMap, VecDeque};

use crate::error::{SimError, SimResult};
use crate::process::ProcessId;

/// Outcome of [`RamPool::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamGrant {
    /// The units were taken immediately.
    Granted,
    /// The request waits in the FIFO queue.
    Queued,
}

/// A counting resource of fixed capacity.
///
/// Requests are served strictly in arrival order: a later request never
/// overtakes an earlier one, even if it is small enough to fit while the
/// head of the queue does not.
#[derive(Debug, Clone)]
pub struct RamPool {
    capacity: u32,
    available: u32,
    waiting: VecDeque<(ProcessId, u32)>,
    held: BTreeMap<ProcessId, u32>,
}

impl RamPool {
    /// Create a full pool.
    pub fn new(capacity: u32) -> Self {
        RamPool {
            capacity,
            available: capacity,
            waiting: VecDeque::new(),
            held: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// Units currently held by `pid`.
    pub fn held_by(&self, pid: ProcessId) -> u32 {
        self.held.get(&pid).copied().unwrap_or(0)
    }

    /// Total units held by all processes.
    pub fn total_held(&self) -> u32 {
        self.held.values().sum()
    }

    /// Processes waiting for memory, head first.
    pub fn queued(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.waiting.iter().map(|(pid, _)| *pid)
    }

    /// Request `units` for `pid`.
    ///
    /// A request larger than the whole pool can never be served and is
    /// rejected with [`SimError::CapacityExceeded`].
    pub fn acquire(&mut self, pid: ProcessId, units: u32) -> SimResult<RamGrant> {
        if units > self.capacity {
            return Err(SimError::CapacityExceeded {
                demand: units,
                capacity: self.capacity,
            });
        }
        if self.held.contains_key(&pid) || self.waiting.iter().any(|(p, _)| *p == pid) {
            return Err(SimError::invariant(format!(
                "{} requested RAM while already holding or awaiting it",
                pid
            )));
        }

        if self.waiting.is_empty() && self.available >= units {
            self.take(pid, units);
            tracing::trace!(%pid, units, available = self.available, "ram granted");
            return Ok(RamGrant::Granted);
        }

        self.waiting.push_back((pid, units));
        tracing::trace!(%pid, units, queued = self.waiting.len(), "ram queued");
        Ok(RamGrant::Queued)
    }

    /// Return `units` held by `pid`, then serve the queue from its head.
    ///
    /// Returns the processes granted by this release, in grant order.
    pub fn release(&mut self, pid: ProcessId, units: u32) -> SimResult<Vec<ProcessId>> {
        let held = self.held_by(pid);
        if units > held {
            return Err(SimError::invariant(format!(
                "{} released {} RAM units but holds {}",
                pid, units, held
            )));
        }

        if held == units {
            self.held.remove(&pid);
        } else {
            self.held.insert(pid, held - units);
        }
        self.available += units;

        let mut granted = Vec::new();
        while let Some(&(next, demand)) = self.waiting.front() {
            if demand > self.available {
                break;
            }
            self.waiting.pop_front();
            self.take(next, demand);
            granted.push(next);
        }
        Ok(granted)
    }

    /// Check `available + Σ held == capacity`.
    pub fn check_conservation(&self) -> SimResult<()> {
        let held = self.total_held();
        if self.available + held != self.capacity {
            return Err(SimError::invariant(format!(
                "RAM not conserved: available {} + held {} != capacity {}",
                self.available, held, self.capacity
            )));
        }
        Ok(())
    }

    fn take(&mut self, pid: ProcessId, units: u32) {
        self.available -= units;
        *self.held.entry(pid).or_insert(0) += units;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: usize) -> ProcessId {
        ProcessId::new(id)
    }

    #[test]
    fn test_immediate_grant() {
        let mut ram = RamPool::new(10);
        assert_eq!(ram.acquire(p(0), 4).unwrap(), RamGrant::Granted);
        assert_eq!(ram.available(), 6);
        assert_eq!(ram.held_by(p(0)), 4);
        ram.check_conservation().unwrap();
    }

    #[test]
    fn test_queue_until_release() {
        let mut ram = RamPool::new(10);
        ram.acquire(p(0), 8).unwrap();
        assert_eq!(ram.acquire(p(1), 5).unwrap(), RamGrant::Queued);
        assert_eq!(ram.available(), 2);

        let granted = ram.release(p(0), 8).unwrap();
        assert_eq!(granted, vec![p(1)]);
        assert_eq!(ram.available(), 5);
        assert_eq!(ram.held_by(p(0)), 0);
        ram.check_conservation().unwrap();
    }

    #[test]
    fn test_later_small_request_does_not_jump_queue() {
        let mut ram = RamPool::new(10);
        ram.acquire(p(0), 6).unwrap();
        ram.acquire(p(1), 3).unwrap();
        // One unit free: B (5) must wait, and C (1) must wait behind B.
        assert_eq!(ram.acquire(p(2), 5).unwrap(), RamGrant::Queued);
        assert_eq!(ram.acquire(p(3), 1).unwrap(), RamGrant::Queued);

        // Four free now: still not enough for B, so C keeps waiting too.
        assert!(ram.release(p(1), 3).unwrap().is_empty());
        assert_eq!(ram.queued().collect::<Vec<_>>(), vec![p(2), p(3)]);

        let granted = ram.release(p(0), 6).unwrap();
        assert_eq!(granted, vec![p(2), p(3)]);
        assert_eq!(ram.available(), 4);
        ram.check_conservation().unwrap();
    }

    #[test]
    fn test_release_serves_only_what_fits() {
        let mut ram = RamPool::new(10);
        ram.acquire(p(0), 10).unwrap();
        for (id, units) in [(1, 4), (2, 4), (3, 4)] {
            ram.acquire(p(id), units).unwrap();
        }
        assert_eq!(ram.release(p(0), 10).unwrap(), vec![p(1), p(2)]);
        assert_eq!(ram.queued().collect::<Vec<_>>(), vec![p(3)]);
        assert_eq!(ram.release(p(1), 4).unwrap(), vec![p(3)]);
    }

    #[test]
    fn test_request_larger_than_capacity_is_configuration_error() {
        let mut ram = RamPool::new(9);
        let err = ram.acquire(p(0), 10).unwrap_err();
        assert_eq!(
            err,
            SimError::CapacityExceeded {
                demand: 10,
                capacity: 9
            }
        );
        assert!(err.is_configuration());
        // Nothing was queued, so no one can wait on it forever.
        assert_eq!(ram.queued().count(), 0);
    }

    #[test]
    fn test_second_request_from_same_process_is_rejected() {
        let mut ram = RamPool::new(10);
        ram.acquire(p(0), 2).unwrap();
        assert!(ram.acquire(p(0), 2).is_err());
        ram.acquire(p(1), 9).unwrap();
        assert!(ram.acquire(p(1), 1).is_err());
    }

    #[test]
    fn test_over_release_is_invariant_violation() {
        let mut ram = RamPool::new(10);
        ram.acquire(p(0), 3).unwrap();
        let err = ram.release(p(0), 4).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation(_)));
        let err = ram.release(p(1), 1).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation(_)));
        ram.check_conservation().unwrap();
    }
}
