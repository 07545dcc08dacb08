//! Virtual time for the simulation clock.
//!
//! Time is an integer count of fixed-size units, `UNITS_PER_TICK` to one
//! CPU tick. Ticks and I/O waits are exact multiples of a unit, so a
//! duration of one tick is exactly one tick however late it starts.
//! Exponential arrival gaps are rounded to the nearest unit.
//!
//! Time advances only when the clock pops an event.

/// Number of time units in one CPU tick.
pub const UNITS_PER_TICK: u64 = 1_000_000_000;

/// A point in simulation time, in units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtualTime(u64);

impl VirtualTime {
    /// The zero-point of simulation time.
    pub const ZERO: VirtualTime = VirtualTime(0);

    /// Create a `VirtualTime` from a raw unit count.
    #[inline]
    pub const fn new(units: u64) -> Self {
        VirtualTime(units)
    }

    /// The time `ticks` whole ticks after zero.
    #[inline]
    pub const fn from_ticks(ticks: u64) -> Option<Self> {
        match ticks.checked_mul(UNITS_PER_TICK) {
            Some(units) => Some(VirtualTime(units)),
            None => None,
        }
    }

    /// Return the raw unit count.
    #[inline]
    pub fn units(self) -> u64 {
        self.0
    }

    /// This instant in (fractional) ticks.
    #[inline]
    pub fn as_ticks(self) -> f64 {
        units_to_ticks(self.0)
    }

    /// Advance time by `delta` units.
    /// Returns `None` on overflow.
    #[inline]
    pub fn advance(self, delta: u64) -> Option<VirtualTime> {
        self.0.checked_add(delta).map(VirtualTime)
    }

    /// The time `delay` units after `self`. Alias for `advance` that reads
    /// better where events are scheduled.
    #[inline]
    pub fn plus(self, delay: u64) -> Option<VirtualTime> {
        self.advance(delay)
    }

    #[inline]
    pub fn is_before(self, other: VirtualTime) -> bool {
        self.0 < other.0
    }

    /// Units elapsed between `earlier` and `self`.
    /// Returns `None` if `earlier` is after `self`.
    #[inline]
    pub fn duration_since(self, earlier: VirtualTime) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

/// Convert a duration in ticks to whole units, rounding to nearest.
///
/// Returns `None` for negative, non-finite or unrepresentable durations.
pub fn ticks_to_units(ticks: f64) -> Option<u64> {
    let units = (ticks * UNITS_PER_TICK as f64).round();
    // u64::MAX as f64 rounds up to 2^64, which is itself out of range.
    (units.is_finite() && units >= 0.0 && units < u64::MAX as f64).then_some(units as u64)
}

/// Convert a unit count to (fractional) ticks.
#[inline]
pub fn units_to_ticks(units: u64) -> f64 {
    units as f64 / UNITS_PER_TICK as f64
}

impl std::fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={:.3}", self.as_ticks())
    }
}
