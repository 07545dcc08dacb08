//! TraceEntry: records every life-cycle transition.

use crate::time::VirtualTime;

use super::id::ProcessId;
use super::state::ProcessState;

/// A single state change of one process.
///
/// Appended by the machine when tracing is enabled; useful for test
/// assertions and post-mortem debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub time: VirtualTime,
    pub process: ProcessId,
    pub from: ProcessState,
    pub to: ProcessState,
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {}] {} -> {}",
            self.time, self.process, self.from, self.to
        )
    }
}
