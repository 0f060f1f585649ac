/// Virtual time for the sequential simulation kernel.
///
/// Time is a real-valued scalar with no dependency on `std::time`. The
/// unit is defined by the application: an interval of 1 may be read as a
/// second, a year, or anything else. Time advances only when the main
/// loop dispatches an action — never from wall-clock observation.

use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// A point (or interval) in virtual time.
///
/// `Time` wraps an `f64` and imposes a total order via
/// [`f64::total_cmp`] so it can key the action schedule's heap. Delays
/// are also expressed as `Time`; the signalling API rejects negative
/// delays.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(f64);

/// The beginning of time. Doubles as the "disabled" sentinel for
/// [`Simulation::set_stop_time`](crate::Simulation::set_stop_time).
pub const INIT_TIME: Time = Time(0.0);

impl Time {
    /// Create a `Time` from a raw scalar.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Time(value)
    }

    /// Return the raw scalar.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: Time) -> bool {
        self < other
    }

    /// Returns `true` for a valid, non-negative delay.
    ///
    /// Uses IEEE comparison rather than the total order, so `-0.0`
    /// counts as non-negative and `NaN` does not.
    #[inline]
    pub fn is_valid_delay(self) -> bool {
        self.0 >= 0.0
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Time {
    type Output = Time;

    #[inline]
    fn add(self, rhs: Time) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl Sub for Time {
    type Output = Time;

    #[inline]
    fn sub(self, rhs: Time) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_time_is_zero() {
        assert_eq!(INIT_TIME.value(), 0.0);
    }

    #[test]
    fn test_ordering() {
        let t1 = Time::new(1.5);
        let t2 = Time::new(2.25);
        assert!(t1 < t2);
        assert!(t1.is_before(t2));
        assert!(!t2.is_before(t1));
    }

    #[test]
    fn test_equality() {
        assert_eq!(Time::new(3.0), Time::new(3.0));
        assert_ne!(Time::new(3.0), Time::new(3.5));
    }

    #[test]
    fn test_arithmetic() {
        let t = Time::new(10.0) + Time::new(2.5);
        assert_eq!(t, Time::new(12.5));
        assert_eq!(t - Time::new(2.5), Time::new(10.0));
    }

    #[test]
    fn test_delay_validity() {
        assert!(Time::new(0.0).is_valid_delay());
        assert!(Time::new(-0.0).is_valid_delay());
        assert!(Time::new(7.0).is_valid_delay());
        assert!(!Time::new(-1.0).is_valid_delay());
        assert!(!Time::new(f64::NAN).is_valid_delay());
    }

    #[test]
    fn test_total_order_handles_negative_zero() {
        // total_cmp puts -0.0 before +0.0; both remain valid delays.
        assert!(Time::new(-0.0) < Time::new(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Time::new(4.5)), "T=4.5");
    }
}
