// Copyright 2025 The eten developers
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! # Eten
//!
//! Pairwise force, energy, and curvature kernels for the 12-10-6 "ETEN"
//! power-law potential,
//! $$ u(r) = \frac{a}{r^{12}} - \frac{b}{r^{10}} + \frac{c}{r^6}, $$
//! as used in coarse-grained Gō-like particle models.
//!
//! The crate owns the per-type-pair coefficient table ([`EtenTable`]) and the
//! evaluation kernels, including the multiple-timescale (rRESPA) shell split
//! ([`respa`]) and a binary restart codec ([`restart`]). Positions, neighbor
//! enumeration, and force accumulation belong to the enclosing simulation
//! engine: all kernels here are pure functions of a squared distance and a
//! type pair.

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;
use num::{Float, NumCast};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod respa;
pub mod restart;
pub mod table;
pub mod tail;
pub mod twobody;

pub use error::EtenError;
pub use respa::{RespaLevel, ShellBounds};
pub use table::EtenTable;
pub use twobody::{Eten, PairPotential};

/// Defines a cutoff distance
pub trait Cutoff {
    /// Squared cutoff distance
    fn cutoff_squared(&self) -> f64 {
        self.cutoff().powi(2)
    }

    /// Cutoff distance
    fn cutoff(&self) -> f64;
}

/// Mixing rules for deriving a cross-pair cutoff distance from the two
/// homogeneous (i,i) and (j,j) cutoffs.
///
/// The 12-10-6 coefficients themselves have no physical mixing rule; only the
/// cutoff distance is mixed (see [`table::EtenTable::finalize_pair`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum DistanceMixing {
    /// Arithmetic mean of the two distances (Lorentz-style)
    #[default]
    Arithmetic,
    /// Geometric mean of the two distances
    Geometric,
}

impl DistanceMixing {
    /// Combine two cutoff distances using the selected rule
    pub fn mix_distance(&self, distances: (f64, f64)) -> f64 {
        match self {
            Self::Arithmetic => arithmetic_mean(distances),
            Self::Geometric => geometric_mean(distances),
        }
    }
}

/// See Pythagorean means on [Wikipedia](https://en.wikipedia.org/wiki/Pythagorean_means)
fn geometric_mean<T: Float>(values: (T, T)) -> T {
    T::sqrt(values.0 * values.1)
}

/// See Pythagorean means on [Wikipedia](https://en.wikipedia.org/wiki/Pythagorean_means)
fn arithmetic_mean<T: Float>(values: (T, T)) -> T {
    (values.0 + values.1) * NumCast::from(0.5).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_mixing_rules() {
        assert_relative_eq!(
            DistanceMixing::Arithmetic.mix_distance((8.0, 12.0)),
            10.0
        );
        assert_relative_eq!(
            DistanceMixing::Geometric.mix_distance((4.0, 9.0)),
            6.0
        );
        assert_eq!(DistanceMixing::default(), DistanceMixing::Arithmetic);
    }
}
