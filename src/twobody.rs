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

//! The analytic 12-10-6 pair potential and the two-body evaluation trait.

use crate::{Cutoff, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Potential energy between a pair of isotropic particles, 𝑈(𝑟)
pub trait PairPotential: Debug {
    /// Interaction energy at a given squared separation.
    fn pair_energy(&self, distance_squared: f64) -> f64;

    /// Force magnitude, 𝐹(𝑟) = −d𝑈/d𝑟.
    ///
    /// The default implementation uses a central difference and should be
    /// overridden with the analytical expression for speed and accuracy.
    fn pair_force(&self, distance_squared: f64) -> f64 {
        const EPS: f64 = 1e-6;
        let delta_u = self.pair_energy(distance_squared + EPS)
            - self.pair_energy(distance_squared - EPS);
        let dudrsq = delta_u / (2.0 * EPS);
        -dudrsq * 2.0 * distance_squared.sqrt()
    }

    /// Force vector acting on the first particle of the pair, given the
    /// separation vector pointing from the second particle to the first.
    fn pair_force_vector(&self, separation: &Vector3) -> Vector3 {
        let distance_squared = separation.norm_squared();
        self.pair_force(distance_squared) * separation / distance_squared.sqrt()
    }
}

/// The 12-10-6 "ETEN" pair potential,
/// $$ u(r) = \frac{a}{r^{12}} - \frac{b}{r^{10}} + \frac{c}{r^6} $$
///
/// The three coefficients are fitted physical parameters with no underlying
/// sigma/epsilon parameterization, so no combination rule applies to them.
///
/// # Examples:
/// ~~~
/// use eten::twobody::{Eten, PairPotential};
/// let eten = Eten::new(1000.0, 2000.0, 50.0);
/// let rsq: f64 = 25.0;
/// let (r2inv, r6inv) = (1.0 / rsq, (1.0 / rsq).powi(3));
/// let expected = r6inv * (1000.0 * r6inv - 2000.0 * r2inv * r2inv + 50.0);
/// assert_eq!(eten.pair_energy(rsq), expected);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct Eten {
    /// Repulsive r⁻¹² coefficient
    pub a: f64,
    /// r⁻¹⁰ coefficient
    pub b: f64,
    /// r⁻⁶ coefficient
    pub c: f64,
}

impl Eten {
    /// Create from the three fundamental coefficients.
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Force magnitude divided by the separation distance, 𝐹(𝑟)/𝑟.
    ///
    /// This is the quantity the engine multiplies onto the separation
    /// components when accumulating per-particle forces; no square root is
    /// needed.
    #[inline]
    pub fn force_over_r(&self, distance_squared: f64) -> f64 {
        let r2inv = 1.0 / distance_squared;
        let r6inv = r2inv * r2inv * r2inv;
        r2inv
            * r6inv
            * (12.0 * self.a * r6inv - 10.0 * self.b * r2inv * r2inv + 6.0 * self.c)
    }
}

/// The analytic form extends to all distances; truncation is applied by the
/// per-pair cutoffs of [`crate::EtenTable`].
impl Cutoff for Eten {
    fn cutoff(&self) -> f64 {
        f64::INFINITY
    }
    fn cutoff_squared(&self) -> f64 {
        f64::INFINITY
    }
}

impl PairPotential for Eten {
    #[inline]
    fn pair_energy(&self, distance_squared: f64) -> f64 {
        let r2inv = 1.0 / distance_squared;
        let r6inv = r2inv * r2inv * r2inv;
        r6inv * (self.a * r6inv - self.b * r2inv * r2inv + self.c)
    }

    #[inline]
    fn pair_force(&self, distance_squared: f64) -> f64 {
        self.force_over_r(distance_squared) * distance_squared.sqrt()
    }
}
