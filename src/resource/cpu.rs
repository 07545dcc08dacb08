//! `Cpu`: a single-core processor granted in strict arrival order.

use std::collections::VecDeque;

use crate::error::{SimError, SimResult};
use crate::process::ProcessId;

/// Proof of CPU ownership.
///
/// Only the `Cpu` mints leases, and there is never more than one alive.
/// Giving the CPU back consumes the lease, so a process cannot release
/// twice or release a CPU it never held.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a CPU lease must be handed back with Cpu::release"]
pub struct CpuLease {
    holder: ProcessId,
}

impl CpuLease {
    pub fn holder(&self) -> ProcessId {
        self.holder
    }
}

/// Outcome of [`Cpu::request`].
#[derive(Debug, PartialEq, Eq)]
pub enum CpuGrant {
    Granted(CpuLease),
    Queued,
}

/// Mutual-exclusion resource of concurrency 1.
#[derive(Debug, Clone, Default)]
pub struct Cpu {
    holder: Option<ProcessId>,
    waiting: VecDeque<ProcessId>,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            holder: None,
            waiting: VecDeque::new(),
        }
    }

    /// The current owner, if any.
    pub fn holder(&self) -> Option<ProcessId> {
        self.holder
    }

    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Ask for the CPU. Granted at once only if it is idle and nobody is
    /// waiting.
    pub fn request(&mut self, pid: ProcessId) -> SimResult<CpuGrant> {
        if self.holder == Some(pid) || self.waiting.contains(&pid) {
            return Err(SimError::invariant(format!(
                "{} requested the CPU twice",
                pid
            )));
        }

        if self.holder.is_none() && self.waiting.is_empty() {
            self.holder = Some(pid);
            return Ok(CpuGrant::Granted(CpuLease { holder: pid }));
        }

        self.waiting.push_back(pid);
        Ok(CpuGrant::Queued)
    }

    /// Give the CPU back. Ownership passes to the longest-waiting
    /// requester, whose lease is returned.
    pub fn release(&mut self, lease: CpuLease) -> SimResult<Option<CpuLease>> {
        if self.holder != Some(lease.holder) {
            return Err(SimError::invariant(format!(
                "{} released the CPU without holding it",
                lease.holder
            )));
        }

        self.holder = self.waiting.pop_front();
        Ok(self.holder.map(|holder| CpuLease { holder }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: usize) -> ProcessId {
        ProcessId::new(id)
    }

    fn lease(grant: CpuGrant) -> CpuLease {
        match grant {
            CpuGrant::Granted(lease) => lease,
            CpuGrant::Queued => panic!("expected a grant"),
        }
    }

    #[test]
    fn test_idle_cpu_grants_immediately() {
        let mut cpu = Cpu::new();
        let l = lease(cpu.request(p(0)).unwrap());
        assert_eq!(l.holder(), p(0));
        assert_eq!(cpu.holder(), Some(p(0)));
        assert_eq!(cpu.release(l).unwrap(), None);
        assert_eq!(cpu.holder(), None);
    }

    #[test]
    fn test_fifo_handoff() {
        let mut cpu = Cpu::new();
        let first = lease(cpu.request(p(0)).unwrap());
        assert_eq!(cpu.request(p(2)).unwrap(), CpuGrant::Queued);
        assert_eq!(cpu.request(p(1)).unwrap(), CpuGrant::Queued);
        assert_eq!(cpu.queue_len(), 2);

        let second = cpu.release(first).unwrap().unwrap();
        assert_eq!(second.holder(), p(2));
        assert_eq!(cpu.holder(), Some(p(2)));

        let third = cpu.release(second).unwrap().unwrap();
        assert_eq!(third.holder(), p(1));
        assert_eq!(cpu.release(third).unwrap(), None);
    }

    #[test]
    fn test_release_without_holding_is_invariant_violation() {
        let mut cpu = Cpu::new();
        let held = lease(cpu.request(p(0)).unwrap());
        let forged = CpuLease { holder: p(5) };
        assert!(matches!(
            cpu.release(forged),
            Err(SimError::InvariantViolation(_))
        ));
        // The real holder is unaffected.
        assert_eq!(cpu.holder(), Some(p(0)));
        assert_eq!(cpu.release(held).unwrap(), None);
    }

    #[test]
    fn test_double_request_is_rejected() {
        let mut cpu = Cpu::new();
        let _held = lease(cpu.request(p(0)).unwrap());
        assert!(cpu.request(p(0)).is_err());
        cpu.request(p(1)).unwrap();
        assert!(cpu.request(p(1)).is_err());
    }
}
