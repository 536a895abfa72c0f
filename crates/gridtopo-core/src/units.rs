//! Compile-time unit safety for grid quantities.
//!
//! Prevents mixing incompatible units like ohms and ohms per kilometre, or
//! metres and kilometres.
//!
//! # Design Philosophy
//!
//! Topology analysis works with a handful of physical quantities:
//! - Nominal voltages (kV) and voltage set points (per-unit)
//! - Resistances and reactances (Ω), and their per-length variants (Ω/km)
//! - Line lengths (km) and geodesic distances (m)
//!
//! Using raw `f64` values throughout the codebase makes it easy to accidentally
//! multiply a per-length resistance with a length in metres, or to compare a
//! haversine distance in metres against a line length in kilometres. The
//! newtype wrappers below catch such errors at compile time.
//!
//! # Zero Runtime Overhead
//!
//! All types use `#[repr(transparent)]` ensuring they have the same memory
//! layout as `f64`.
//!
//! # Usage
//!
//! ```
//! use gridtopo_core::units::{Kilometres, Metres, OhmsPerKilometre};
//!
//! let r = OhmsPerKilometre(0.2);
//! let length = Kilometres(1.5);
//!
//! // Ω/km × km = Ω
//! let resistance = r * length;
//! assert!((resistance.value() - 0.3).abs() < 1e-12);
//!
//! // Explicit length conversions
//! let metres: Metres = length.to_metres();
//! assert_eq!(metres.value(), 1500.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
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

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
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
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Maximum of two values
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
    };
}

// =============================================================================
// Voltage Units
// =============================================================================

/// Voltage in kilovolts (kV)
///
/// Used for nominal voltages of voltage levels and rated voltages of
/// transformer windings.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Voltage magnitude in per-unit (pu)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

impl PerUnit {
    /// One per-unit (nominal voltage)
    pub const ONE: Self = Self(1.0);
}

// =============================================================================
// Impedance Units
// =============================================================================

/// Resistance or reactance in ohms (Ω)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ohms(pub f64);

impl_unit_ops!(Ohms, "Ω");

/// Resistance or reactance per unit length (Ω/km), as carried by line types
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct OhmsPerKilometre(pub f64);

impl_unit_ops!(OhmsPerKilometre, "Ω/km");

impl Mul<Kilometres> for OhmsPerKilometre {
    type Output = Ohms;
    fn mul(self, rhs: Kilometres) -> Self::Output {
        Ohms(self.0 * rhs.0)
    }
}

// =============================================================================
// Length Units
// =============================================================================

/// Length in kilometres (km)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilometres(pub f64);

impl_unit_ops!(Kilometres, "km");

/// Length in metres (m)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Metres(pub f64);

impl_unit_ops!(Metres, "m");

impl Kilometres {
    #[inline]
    pub fn to_metres(self) -> Metres {
        Metres(self.0 * 1000.0)
    }
}

impl Metres {
    #[inline]
    pub fn to_kilometres(self) -> Kilometres {
        Kilometres(self.0 / 1000.0)
    }
}

// =============================================================================
// Rating Units
// =============================================================================

/// Apparent power rating in kilovolt-amperes (kVA)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilovoltAmperes(pub f64);

impl_unit_ops!(KilovoltAmperes, "kVA");

/// Current rating in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

// =============================================================================
// Tests
// =============================================================================
