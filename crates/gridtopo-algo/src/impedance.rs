//! Impedance magnitudes of grid elements.
//!
//! `|Z| = √(R² + X²)`; per-length line data is scaled by the line length first.

use gridtopo_core::{Kilometres, Ohms, OhmsPerKilometre};

/// Magnitude of the complex impedance `R + jX`.
#[inline]
pub fn calc_impedance(r: Ohms, x: Ohms) -> Ohms {
    Ohms(r.value().hypot(x.value()))
}

/// Magnitude of a per-length impedance over `length`.
#[inline]
pub fn calc_impedance_per_length(
    r: OhmsPerKilometre,
    x: OhmsPerKilometre,
    length: Kilometres,
) -> Ohms {
    calc_impedance(r * length, x * length)
}
