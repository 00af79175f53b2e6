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

//! Multiple-timescale (rRESPA) shell splitting of the ETEN potential.
//!
//! A multiple-timescale integrator evaluates cheap short-range forces at a
//! fine step and longer-range forces at coarser steps. The potential is
//! split into three radial shells joined by cubic Hermite switching
//! functions, so each shell's force is continuous in value and first
//! derivative at the shell boundaries and the three shells sum to the full
//! force everywhere:
//!
//! - **Inner**: $r < r_\text{inner,on}$, faded out over
//!   $(r_\text{inner,off}, r_\text{inner,on})$;
//! - **Middle**: $r_\text{inner,off} < r < r_\text{outer,off}$, faded in
//!   over the inner window, faded out over the outer window;
//! - **Outer**: $r_\text{outer,on} < r < r_c$, faded in over
//!   $(r_\text{outer,on}, r_\text{outer,off})$; the only shell that also
//!   reports energy.
//!
//! All shells apply their switching to the identical raw force magnitude of
//! the plain-cutoff kernel.

use crate::error::EtenError;
use crate::table::EtenTable;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The four switching radii of a multiple-timescale integrator,
/// `inner_off ≤ inner_on ≤ outer_on ≤ outer_off`.
///
/// Owned by the integrator and passed by reference into shell evaluation;
/// the kernel never allocates or retains these.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct ShellBounds {
    /// Start of the inner fade-out window
    pub inner_off: f64,
    /// End of the inner shell; the inner force vanishes here
    pub inner_on: f64,
    /// Start of the outer fade-in window
    pub outer_on: f64,
    /// Outermost shell radius; pair cutoffs must not be smaller
    pub outer_off: f64,
}

impl ShellBounds {
    /// Validate and construct shell bounds. The radii must be positive,
    /// finite, and monotonically non-decreasing.
    pub fn new(
        inner_off: f64,
        inner_on: f64,
        outer_on: f64,
        outer_off: f64,
    ) -> Result<Self, EtenError> {
        let radii = [inner_off, inner_on, outer_on, outer_off];
        if radii.iter().any(|r| !r.is_finite()) || inner_off <= 0.0 {
            return Err(EtenError::coefficients(
                "shell radii must be positive and finite",
            ));
        }
        if radii.windows(2).any(|w| w[0] > w[1]) {
            return Err(EtenError::coefficients(
                "shell radii must be monotonically non-decreasing",
            ));
        }
        Ok(Self {
            inner_off,
            inner_on,
            outer_on,
            outer_off,
        })
    }
}

/// Which timescale level the caller is currently integrating.
///
/// One level is selected per force-evaluation pass; `Full` is the plain
/// single-timescale path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespaLevel {
    /// Plain cutoff evaluation, no shell splitting
    Full,
    /// Innermost shell, evaluated at the finest step
    Inner,
    /// Middle shell
    Middle,
    /// Outermost shell; also carries the energy tally
    Outer,
}

/// Cubic Hermite ramp from 0 at `lo` to 1 at `hi`.
///
/// `1 - ramp` is the matching fade-out, so adjacent shells sum to one
/// inside a switching window.
#[inline]
fn ramp(r: f64, lo: f64, hi: f64) -> f64 {
    let t = (r - lo) / (hi - lo);
    t * t * (3.0 - 2.0 * t)
}

impl EtenTable {
    /// Evaluate one shell level for one pair.
    ///
    /// Returns `(force / r, energy)` as in [`EtenTable::evaluate`]; the
    /// energy slot is populated only for `Full` and `Outer` when `eflag` is
    /// set (the outer pass runs once per global step and carries the whole
    /// energy tally, over the full cutoff range).
    pub fn evaluate_level(
        &self,
        level: RespaLevel,
        bounds: &ShellBounds,
        rsq: f64,
        i: usize,
        j: usize,
        factor: f64,
        eflag: bool,
    ) -> (f64, f64) {
        match level {
            RespaLevel::Full => self.evaluate(rsq, i, j, factor, eflag),
            RespaLevel::Inner => {
                if rsq >= bounds.inner_on * bounds.inner_on {
                    return (0.0, 0.0);
                }
                let mut force = factor * self.entry(i, j).force_over_r(rsq);
                if rsq > bounds.inner_off * bounds.inner_off {
                    force *= 1.0 - ramp(rsq.sqrt(), bounds.inner_off, bounds.inner_on);
                }
                (force, 0.0)
            }
            RespaLevel::Middle => {
                if rsq >= bounds.outer_off * bounds.outer_off
                    || rsq <= bounds.inner_off * bounds.inner_off
                {
                    return (0.0, 0.0);
                }
                let mut force = factor * self.entry(i, j).force_over_r(rsq);
                if rsq < bounds.inner_on * bounds.inner_on {
                    force *= ramp(rsq.sqrt(), bounds.inner_off, bounds.inner_on);
                }
                if rsq > bounds.outer_on * bounds.outer_on {
                    force *= 1.0 - ramp(rsq.sqrt(), bounds.outer_on, bounds.outer_off);
                }
                (force, 0.0)
            }
            RespaLevel::Outer => {
                let entry = self.entry(i, j);
                if rsq >= entry.cut * entry.cut {
                    return (0.0, 0.0);
                }
                let mut force = 0.0;
                if rsq > bounds.outer_on * bounds.outer_on {
                    force = factor * entry.force_over_r(rsq);
                    if rsq < bounds.outer_off * bounds.outer_off {
                        force *= ramp(rsq.sqrt(), bounds.outer_on, bounds.outer_off);
                    }
                }
                let energy = if eflag { factor * entry.energy(rsq) } else { 0.0 };
                (force, energy)
            }
        }
    }

    /// Force magnitude the outer pass feeds its virial tally.
    ///
    /// The virial re-derivation always uses the unswitched force: below the
    /// outer fade window the original recomputes it from scratch, inside the
    /// window it strips the switching factor, and beyond the window the
    /// force is unswitched to begin with. Zero beyond the pair cutoff.
    #[inline]
    pub fn outer_virial_force(&self, rsq: f64, i: usize, j: usize, factor: f64) -> f64 {
        let entry = self.entry(i, j);
        if rsq >= entry.cut * entry.cut {
            return 0.0;
        }
        factor * entry.force_over_r(rsq)
    }
}
