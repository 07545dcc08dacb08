//! Simulated processes and their life-cycle state machine.
//!
//! A process acquires RAM once, then competes for CPU ticks until its
//! instruction budget is spent, sometimes detouring through an I/O wait,
//! and finally returns its memory and records how long it spent in the
//! system.
//!
//! # Module structure
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`id`] | [`ProcessId`] newtype |
//! | [`state`] | [`ProcessState`] |
//! | [`entity`] | [`Process`] and its resumable state machine |
//! | [`trace`] | [`TraceEntry`] |

pub mod entity;
pub mod id;
pub mod state;
pub mod trace;

pub use entity::{Outcome, Process};
pub use id::ProcessId;
pub use state::ProcessState;
pub use trace::TraceEntry;

use crate::time::UNITS_PER_TICK;

/// Length of one CPU tick, in time units.
pub const TICK_DURATION: u64 = UNITS_PER_TICK;

/// Length of one I/O detour, in time units.
pub const IO_DELAY: u64 = UNITS_PER_TICK;
