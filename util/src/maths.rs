//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that two values are equal to within the given tolerance.
pub fn epsilon_equals<T>(a: T, b: T, epsilon: T) -> bool
where
    T: Float
{
    (a - epsilon <= b) && (a + epsilon >= b)
}

/// Return the sign of a value as `1.0` or `-1.0`.
///
/// Unlike `f64::signum` a value of exactly zero maps to `1.0`, so the result
/// is always usable as a direction multiplier.
pub fn sign_num<T>(value: T) -> T
where
    T: Float
{
    if value < T::from(0).unwrap() {
        T::from(-1).unwrap()
    }
    else {
        T::from(1).unwrap()
    }
}

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_epsilon_equals() {
        assert!(epsilon_equals(1.0, 1.0 + 1e-9, 1e-6));
        assert!(epsilon_equals(1.0 + 1e-9, 1.0, 1e-6));
        assert!(!epsilon_equals(1.0, 1.1, 1e-6));

        // NaNs are never equal to anything
        assert!(!epsilon_equals(f64::NAN, 0.0, 1e-6));
    }

    #[test]
    fn test_sign_num() {
        assert_eq!(sign_num(2.5), 1.0);
        assert_eq!(sign_num(-2.5), -1.0);
        assert_eq!(sign_num(0.0), 1.0);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 1.0), (0.0, 10.0), 0.5), 5.0);
        assert_eq!(lin_map((4.0, 12.0), (0.3, 0.9), 4.0), 0.3);
        assert_eq!(lin_map((4.0, 12.0), (0.3, 0.9), 12.0), 0.9);
    }
}
