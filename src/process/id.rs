//! Process ID: an ordered, copyable process identifier.

/// Identifies a process within one experiment run.
///
/// IDs are handed out in creation order, starting at zero, and double as
/// the index into the run's process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(usize);

impl ProcessId {
    #[inline]
    pub fn new(id: usize) -> Self {
        ProcessId(id)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}
