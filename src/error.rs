//! Structured error types for procsim.
//!
//! All fallible simulation APIs return `Result<T, SimError>`. Callers can
//! tell configuration problems (a request that could never be satisfied,
//! an out-of-range parameter) apart from broken invariants, which abort
//! the run that produced them.

use thiserror::Error;

/// The top-level error type for the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    // ── Configuration errors ──────────────────────────────

    /// A single allocation can never fit in the RAM pool.
    #[error("configuration error: request for {demand} units exceeds RAM capacity {capacity}")]
    CapacityExceeded { demand: u32, capacity: u32 },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Fatal run errors ──────────────────────────────────

    /// A resource or life-cycle invariant was broken.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Scheduling `delay` units ahead would overflow virtual time.
    #[error("cannot schedule an event {delay} units ahead: virtual time overflow")]
    TimeOverflow { delay: u64 },
}

impl SimError {
    /// Returns `true` for errors caused by the configuration rather than
    /// by the simulation itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimError::CapacityExceeded { .. } | SimError::InvalidConfig(_)
        )
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        SimError::InvariantViolation(msg.into())
    }
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_capacity() {
        let e = SimError::CapacityExceeded {
            demand: 10,
            capacity: 9,
        };
        let s = e.to_string();
        assert!(s.contains("10 units"));
        assert!(s.contains("capacity 9"));
    }

    #[test]
    fn test_error_display_overflow() {
        let e = SimError::TimeOverflow { delay: 15 };
        assert!(e.to_string().contains("15 units"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(
            SimError::CapacityExceeded {
                demand: 2,
                capacity: 1
            }
            .is_configuration()
        );
        assert!(SimError::InvalidConfig("x".into()).is_configuration());
        assert!(!SimError::invariant("cpu").is_configuration());
        assert!(!SimError::TimeOverflow { delay: 1 }.is_configuration());
    }

    #[test]
    fn test_error_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(SimError::invariant("double release"));
        assert_eq!(e.to_string(), "invariant violation: double release");
    }
}
