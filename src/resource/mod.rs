//! Contended resources of the simulated computer.
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`ram`] | [`RamPool`], a FIFO counting allocator |
//! | [`cpu`] | [`Cpu`] and its ownership token [`CpuLease`] |
//!
//! Neither resource schedules events itself. A release reports which
//! queued processes it served; the experiment runner turns those grants
//! into wake events.

pub mod cpu;
pub mod ram;

pub use cpu::{Cpu, CpuGrant, CpuLease};
pub use ram::{RamGrant, RamPool};
