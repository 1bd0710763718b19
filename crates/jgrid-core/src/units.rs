//! Unit newtypes for the quantities the network model carries.
//!
//! Capacities are in gigawatts, positions in decimal degrees and synthetic
//! impedances in per-unit. Keeping them as distinct types stops a latitude
//! from being added to a capacity by accident.
//!
//! ```
//! use jgrid_core::units::{Degrees, Gigawatts};
//!
//! let total = Gigawatts(8.5) + Gigawatts(17.2);
//! assert!((total.value() - 25.7).abs() < 1e-12);
//!
//! let lat = Degrees(35.7);
//! assert_eq!(lat.value(), 35.7);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.1} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Generation capacity in gigawatts (GW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Gigawatts(pub f64);

impl_unit_ops!(Gigawatts, "GW");

impl Gigawatts {
    pub const ZERO: Self = Self(0.0);
}

/// Latitude or longitude in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

/// Synthetic impedance in per-unit (pu)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ImpedancePu(pub f64);

impl_unit_ops!(ImpedancePu, "pu");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gigawatts_arithmetic() {
        let a = Gigawatts(52.8);
        let b = Gigawatts(2.8);

        assert!(((a - b).value() - 50.0).abs() < 1e-10);
        assert!(((a * 0.5).value() - 26.4).abs() < 1e-10);
        assert!((Gigawatts(10.0) / Gigawatts(4.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_sum_iterator() {
        let capacities = [Gigawatts(8.5), Gigawatts(17.2), Gigawatts(52.8)];
        let total: Gigawatts = capacities.iter().sum();
        assert!((total.value() - 78.5).abs() < 1e-10);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Gigawatts(52.8)), "52.8 GW");
        assert_eq!(format!("{}", Degrees(35.7)), "35.7 °");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Gigawatts(7.3)).unwrap();
        assert_eq!(json, "7.3");
        let back: Gigawatts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Gigawatts(7.3));
    }
}
