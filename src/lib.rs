//! # procsim: deterministic process-scheduling simulator
//!
//! A discrete-event model of processes competing for one CPU and a bounded
//! pool of RAM. No threads, no wall-clock time: processes are resumable
//! state machines driven by a virtual clock, and every random draw comes
//! from one seeded stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      run_experiments         │ ← one seeded stream per batch
//! │  ┌────────────────────────┐  │
//! │  │      Experiment        │  │ ← arrivals, resumes, handoffs
//! │  │  ┌──────────────────┐  │  │
//! │  │  │   EventClock     │  │  │ ← execution loop
//! │  │  │  ┌────────────┐  │  │  │
//! │  │  │  │ Scheduler  │  │  │  │ ← deterministic min-heap
//! │  │  │  └────────────┘  │  │  │
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Machine          │  │  │ ← RamPool + Cpu, audited per event
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Process          │  │  │ ← NEW → READY ⇄ RUNNING → ...
//! │  │  └──────────────────┘  │  │
//! │  └────────────────────────┘  │
//! └──────────────────────────────┘
//!            │
//!            ▼
//!        report::Summary
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod experiment;
pub mod machine;
pub mod process;
pub mod report;
pub mod resource;
pub mod scheduler;
pub mod time;
pub mod workload;

// Re-exports for convenience.
pub use clock::{ClockContext, EventClock, EventHandler};
pub use config::{ConfigError, DemandRange, SimConfig, load_config};
pub use error::{SimError, SimResult};
pub use event::{Event, EventId, EventIdGen, EventType};
pub use experiment::{
    Experiment, ExperimentOutcome, ExperimentResult, run_experiment, run_experiments,
};
pub use machine::{Handoff, Machine};
pub use process::{Outcome, Process, ProcessId, ProcessState, TraceEntry};
pub use report::{Summary, summarize, write_csv};
pub use resource::{Cpu, CpuGrant, CpuLease, RamGrant, RamPool};
pub use scheduler::Scheduler;
pub use time::{UNITS_PER_TICK, VirtualTime};
