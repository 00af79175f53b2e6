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

//! Long-range tail corrections to energy and pressure.
//!
//! Off by default and ported as documented: the formula treats the `a`
//! coefficient as a sigma-like length, which is inconsistent with the
//! 12-10-6 parameterization, and the original authors explicitly distrust
//! this path. It is kept isolated here so it can be tested for formula
//! reproduction without touching the force kernels.
//!
//! The per-type particle counts entering the correction must already be
//! globally reduced across workers by the caller; this is a one-time
//! setup-phase reduction, not a per-step concern.

use crate::table::EtenTable;
use log::warn;
use std::f64::consts::PI;

/// Energy and pressure tail contributions for one type pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailCorrection {
    /// Energy correction beyond the cutoff
    pub energy: f64,
    /// Pressure correction beyond the cutoff
    pub pressure: f64,
}

/// Tail correction for one pair of types with fundamental coefficients
/// `a`, `b`, cutoff `cut`, and globally reduced particle counts
/// `count_i`, `count_j`.
pub fn pair_tail(a: f64, b: f64, cut: f64, count_i: f64, count_j: f64) -> TailCorrection {
    let sig2 = a * a;
    let sig6 = sig2 * sig2 * sig2;
    let rc3 = cut * cut * cut;
    let rc6 = rc3 * rc3;
    let rc9 = rc3 * rc6;
    let prefactor = 8.0 * PI * count_i * count_j * b * sig6 / (9.0 * rc9);
    TailCorrection {
        energy: prefactor * (sig6 - 3.0 * rc6),
        pressure: 2.0 * prefactor * (2.0 * sig6 - 3.0 * rc6),
    }
}

impl EtenTable {
    /// Toggle the tail correction. Disabled by default; enabling it logs a
    /// warning because the formula is unverified for this potential.
    pub fn enable_tail(&mut self, on: bool) {
        if on && !self.tail_flag {
            warn!("enabling unverified ETEN tail correction");
        }
        self.tail_flag = on;
    }

    /// Whether the tail correction is enabled
    pub fn tail_enabled(&self) -> bool {
        self.tail_flag
    }

    /// Tail correction for one finalized type pair, or `None` while the
    /// correction is disabled.
    ///
    /// `counts` holds the globally reduced particle count per type,
    /// 1-indexed like the table itself (`counts[0]` is unused).
    pub fn tail_correction(&self, i: usize, j: usize, counts: &[f64]) -> Option<TailCorrection> {
        if !self.tail_flag {
            return None;
        }
        let entry = self.entry(i, j);
        Some(pair_tail(entry.a, entry.b, entry.cut, counts[i], counts[j]))
    }
}
