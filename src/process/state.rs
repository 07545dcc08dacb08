//! `ProcessState`: the five life-cycle states.

/// Where a process is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// Created; waiting for its memory.
    New,
    /// Holds memory; waiting for the CPU.
    Ready,
    /// Holds the CPU for the current tick.
    Running,
    /// Performing I/O after a tick.
    Waiting,
    /// Finished; memory returned.
    Terminated,
}

impl ProcessState {
    /// Whether a process in this state holds its memory allocation.
    pub fn holds_memory(self) -> bool {
        matches!(
            self,
            ProcessState::Ready | ProcessState::Running | ProcessState::Waiting
        )
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::Waiting => "WAITING",
            ProcessState::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}
