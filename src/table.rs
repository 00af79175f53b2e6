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

//! Per-type-pair coefficient table and the plain-cutoff evaluation kernels.
//!
//! The table is the only shared state of the crate: it is mutated during
//! setup (coefficient assignment, finalization, restart load) and read-only
//! during force evaluation, so a finalized table may be shared across worker
//! threads without synchronization.

use crate::error::EtenError;
use crate::DistanceMixing;
use itertools::iproduct;
use log::debug;
use std::ops::RangeInclusive;

/// Coefficients and derived constants for one type pair.
///
/// The derived constants are recomputed by [`EtenTable::finalize_pair`] and
/// are never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCoeff {
    /// Repulsive r⁻¹² coefficient
    pub a: f64,
    /// r⁻¹⁰ coefficient
    pub b: f64,
    /// r⁻⁶ coefficient
    pub c: f64,
    /// Pair cutoff distance
    pub cut: f64,
    /// Whether this pair was explicitly parameterized
    pub set: bool,
    /// Derived force constants (12a, 10b, 6c)
    pub force_coeff: [f64; 3],
    /// Derived energy constants (a, b, c)
    pub energy_coeff: [f64; 3],
    /// Potential shift at the cutoff. The shift computation of the original
    /// implementation is permanently disabled, so this is always zero.
    pub offset: f64,
}

impl PairCoeff {
    fn unset(cut: f64) -> Self {
        Self {
            a: 0.0,
            b: 0.0,
            c: 0.0,
            cut,
            set: false,
            force_coeff: [0.0; 3],
            energy_coeff: [0.0; 3],
            offset: 0.0,
        }
    }

    /// Raw force magnitude divided by r, without the bond-exclusion factor.
    #[inline]
    pub(crate) fn force_over_r(&self, rsq: f64) -> f64 {
        let r2inv = 1.0 / rsq;
        let r6inv = r2inv * r2inv * r2inv;
        r2inv
            * r6inv
            * (self.force_coeff[0] * r6inv - self.force_coeff[1] * r2inv * r2inv
                + self.force_coeff[2])
    }

    /// Raw pair energy, without the bond-exclusion factor.
    #[inline]
    pub(crate) fn energy(&self, rsq: f64) -> f64 {
        let r2inv = 1.0 / rsq;
        let r6inv = r2inv * r2inv * r2inv;
        r6inv
            * (self.energy_coeff[0] * r6inv - self.energy_coeff[1] * r2inv * r2inv
                + self.energy_coeff[2])
            - self.offset
    }
}

/// Dense, symmetric per-type-pair coefficient table for the ETEN potential.
///
/// Particle types are 1-indexed; storage is a flat `(ntypes + 1)²` vector so
/// that type indices can be used directly (row/column 0 is unused). Storage
/// is allocated lazily on the first coefficient assignment. Every pair
/// (i, j) with i ≤ j must be finalized before evaluation; finalization
/// mirrors the entry into (j, i).
///
/// # Examples:
/// ~~~
/// use eten::EtenTable;
/// let mut table = EtenTable::new(2, 10.0);
/// table.set_coeff(1..=1, 1..=1, &[1000.0, 2000.0, 50.0]).unwrap();
/// table.set_coeff(2..=2, 2..=2, &[500.0, 800.0, 25.0, 8.0]).unwrap();
/// table.finalize_all(None).unwrap();
/// let (force, energy) = table.evaluate(25.0, 1, 1, 1.0, true);
/// assert!(force > 0.0 && energy > 0.0);
/// ~~~
#[derive(Debug, Clone)]
pub struct EtenTable {
    ntypes: usize,
    pub(crate) cut_global: f64,
    pub(crate) mixing: DistanceMixing,
    pub(crate) offset_flag: bool,
    pub(crate) tail_flag: bool,
    pub(crate) coeffs: Vec<PairCoeff>,
}

impl EtenTable {
    /// Create an empty table for `ntypes` particle types with a global
    /// default cutoff.
    pub fn new(ntypes: usize, cut_global: f64) -> Self {
        assert!(ntypes > 0, "at least one particle type is required");
        assert!(cut_global > 0.0, "global cutoff must be positive");
        Self {
            ntypes,
            cut_global,
            mixing: DistanceMixing::default(),
            offset_flag: false,
            tail_flag: false,
            coeffs: Vec::new(),
        }
    }

    /// Number of particle types the table is sized for
    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    /// The global default cutoff
    pub fn global_cutoff(&self) -> f64 {
        self.cut_global
    }

    /// Select the cutoff mixing rule for unset cross pairs
    pub fn set_mixing(&mut self, mixing: DistanceMixing) {
        self.mixing = mixing;
    }

    /// Toggle the potential-shift flag. Retained for restart compatibility;
    /// the shift itself is disabled and the energy offset stays zero.
    pub fn set_offset_flag(&mut self, on: bool) {
        self.offset_flag = on;
    }

    #[inline]
    pub(crate) fn idx(&self, i: usize, j: usize) -> usize {
        i * (self.ntypes + 1) + j
    }

    pub(crate) fn is_allocated(&self) -> bool {
        !self.coeffs.is_empty()
    }

    pub(crate) fn allocate(&mut self) {
        if self.is_allocated() {
            return;
        }
        let n = self.ntypes + 1;
        self.coeffs = vec![PairCoeff::unset(self.cut_global); n * n];
        debug!("allocated {}x{} ETEN pair coefficient table", n, n);
    }

    #[inline]
    pub(crate) fn entry(&self, i: usize, j: usize) -> &PairCoeff {
        &self.coeffs[self.idx(i, j)]
    }

    /// Update the global cutoff and reset the cutoff of every explicitly
    /// set pair to the new value.
    pub fn set_global_cutoff(&mut self, cut: f64) {
        assert!(cut > 0.0, "global cutoff must be positive");
        self.cut_global = cut;
        if self.is_allocated() {
            for (i, j) in iproduct!(1..=self.ntypes, 1..=self.ntypes).filter(|(i, j)| i <= j) {
                let idx = self.idx(i, j);
                if self.coeffs[idx].set {
                    self.coeffs[idx].cut = cut;
                }
            }
        }
    }

    /// Assign coefficients to a rectangular range of type pairs.
    ///
    /// `params` holds the three fundamental coefficients `a, b, c`, followed
    /// by an optional cutoff override; pairs are assigned over the canonical
    /// sweep `i in itypes, j in max(jtypes.start, i)..=jtypes.end`. Fails
    /// without modifying the table when the parameter count is wrong, a
    /// range leaves `1..=ntypes`, the cutoff override is non-positive, or
    /// the sweep selects no pair.
    pub fn set_coeff(
        &mut self,
        itypes: RangeInclusive<usize>,
        jtypes: RangeInclusive<usize>,
        params: &[f64],
    ) -> Result<(), EtenError> {
        if params.len() < 3 || params.len() > 4 {
            return Err(EtenError::coefficients(format!(
                "expected 3 or 4 values (a, b, c[, cutoff]), got {}",
                params.len()
            )));
        }
        let (a, b, c) = (params[0], params[1], params[2]);
        let cut = params.get(3).copied().unwrap_or(self.cut_global);
        if cut <= 0.0 {
            return Err(EtenError::coefficients(format!(
                "cutoff must be positive, got {cut}"
            )));
        }
        let (ilo, ihi) = (*itypes.start(), *itypes.end());
        let (jlo, jhi) = (*jtypes.start(), *jtypes.end());
        if ilo < 1 || ihi > self.ntypes || jlo < 1 || jhi > self.ntypes {
            return Err(EtenError::coefficients(format!(
                "type range outside 1..={}",
                self.ntypes
            )));
        }
        let count: usize = (ilo..=ihi)
            .map(|i| (jlo.max(i)..=jhi).count())
            .sum();
        if count == 0 {
            return Err(EtenError::coefficients("empty type-pair range"));
        }

        self.allocate();
        for i in ilo..=ihi {
            for j in jlo.max(i)..=jhi {
                let idx = self.idx(i, j);
                let entry = &mut self.coeffs[idx];
                entry.a = a;
                entry.b = b;
                entry.c = c;
                entry.cut = cut;
                entry.set = true;
            }
        }
        Ok(())
    }

    /// Finalize one type pair and its mirror: mix an unset cross term,
    /// recompute the derived constants, and copy the entry into (j, i).
    ///
    /// With shell bounds given, fails when the pair cutoff is smaller than
    /// the integrator's outermost shell radius. Returns the finalized
    /// cutoff, which the engine uses to size its neighbor enumerator.
    /// Idempotent for an unmodified entry.
    pub fn finalize_pair(
        &mut self,
        i: usize,
        j: usize,
        respa: Option<&crate::ShellBounds>,
    ) -> Result<f64, EtenError> {
        self.allocate();
        let (i, j) = (i.min(j), i.max(j));

        if !self.entry(i, j).set {
            // No mixing rule exists for the fundamental coefficients; an
            // unmixed cross pair is inert and only its cutoff is derived.
            let mixed = self
                .mixing
                .mix_distance((self.entry(i, i).cut, self.entry(j, j).cut));
            let idx = self.idx(i, j);
            let entry = &mut self.coeffs[idx];
            entry.a = 0.0;
            entry.b = 0.0;
            entry.c = 0.0;
            entry.cut = mixed;
        }

        let idx = self.idx(i, j);
        let entry = &mut self.coeffs[idx];
        entry.force_coeff = [12.0 * entry.a, 10.0 * entry.b, 6.0 * entry.c];
        entry.energy_coeff = [entry.a, entry.b, entry.c];
        // Shift-at-cutoff is permanently disabled for this potential.
        entry.offset = 0.0;
        let finalized = *entry;

        let mirror = self.idx(j, i);
        self.coeffs[mirror] = finalized;

        if let Some(bounds) = respa {
            if finalized.cut < bounds.outer_off {
                return Err(EtenError::RespaCutoff {
                    cutoff: finalized.cut,
                    outer_off: bounds.outer_off,
                });
            }
        }
        Ok(finalized.cut)
    }

    /// Finalize every type pair (i ≤ j); must run before any evaluation.
    pub fn finalize_all(&mut self, respa: Option<&crate::ShellBounds>) -> Result<(), EtenError> {
        for (i, j) in iproduct!(1..=self.ntypes, 1..=self.ntypes).filter(|(i, j)| i <= j) {
            self.finalize_pair(i, j, respa)?;
        }
        debug!("finalized ETEN table for {} particle types", self.ntypes);
        Ok(())
    }

    /// Evaluate force and (optionally) energy for one pair.
    ///
    /// Returns `(force / r, energy)`: the force term is divided by the
    /// separation distance so the caller can multiply it directly onto the
    /// separation components. `factor` is the bond-exclusion scaling in
    /// `[0, 1]`. Contributions vanish for `rsq ≥ cutoff²`. Energy is only
    /// computed when `eflag` is set.
    ///
    /// The table must be finalized for the pair; evaluation itself cannot
    /// fail.
    #[inline]
    pub fn evaluate(&self, rsq: f64, i: usize, j: usize, factor: f64, eflag: bool) -> (f64, f64) {
        let entry = self.entry(i, j);
        if rsq >= entry.cut * entry.cut {
            return (0.0, 0.0);
        }
        let force = factor * entry.force_over_r(rsq);
        let energy = if eflag { factor * entry.energy(rsq) } else { 0.0 };
        (force, energy)
    }

    /// First and second derivative of the pair energy with respect to
    /// distance, `(dU/dr, d²U/dr²)`, each scaled by the bond-exclusion
    /// factor.
    ///
    /// Ported as documented in the original implementation, whose authors
    /// note the expression derives from a 12-6 form and is not validated for
    /// this potential; use for compatibility, not as a verified physical
    /// property.
    #[inline]
    pub fn curvature(&self, rsq: f64, i: usize, j: usize, factor: f64) -> (f64, f64) {
        let entry = self.entry(i, j);
        let r2inv = 1.0 / rsq;
        let rinv = r2inv.sqrt();
        let r6inv = r2inv * r2inv * r2inv;

        let du = r6inv * rinv * (entry.force_coeff[1] - entry.force_coeff[0] * r6inv);
        let du2 = r6inv * r2inv * (13.0 * entry.force_coeff[0] * r6inv - 7.0 * entry.force_coeff[1]);
        (factor * du, factor * du2)
    }

    /// Flat copy of one fundamental-coefficient table (`"a"`, `"b"`, or
    /// `"c"`), `(ntypes + 1)²` entries in row-major order. `None` for
    /// unknown names or before allocation.
    pub fn parameter(&self, name: &str) -> Option<Vec<f64>> {
        if !self.is_allocated() {
            return None;
        }
        let pick: fn(&PairCoeff) -> f64 = match name {
            "a" => |p| p.a,
            "b" => |p| p.b,
            "c" => |p| p.c,
            _ => return None,
        };
        Some(self.coeffs.iter().map(pick).collect())
    }

    /// Coefficients and derived constants for a type pair
    pub fn pair_coeff(&self, i: usize, j: usize) -> &PairCoeff {
        self.entry(i, j)
    }

    /// Cutoff distance for a type pair
    pub fn cutoff(&self, i: usize, j: usize) -> f64 {
        self.entry(i, j).cut
    }

    /// Whether a type pair was explicitly parameterized
    pub fn is_set(&self, i: usize, j: usize) -> bool {
        self.entry(i, j).set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twobody::{Eten, PairPotential};
    use approx::assert_relative_eq;

    fn reference_table() -> EtenTable {
        let mut table = EtenTable::new(3, 10.0);
        table
            .set_coeff(1..=1, 1..=1, &[1000.0, 2000.0, 50.0])
            .unwrap();
        table
            .set_coeff(2..=2, 2..=2, &[500.0, 800.0, 25.0, 8.0])
            .unwrap();
        table
            .set_coeff(3..=3, 3..=3, &[200.0, 300.0, 10.0, 12.0])
            .unwrap();
        table.finalize_all(None).unwrap();
        table
    }

    #[test]
    fn reproduces_reference_force_and_energy() {
        // a=1000, b=2000, c=50, cutoff=10 at rsq=25
        let table = reference_table();
        let (force, energy) = table.evaluate(25.0, 1, 1, 1.0, true);

        let r2inv = 0.04;
        let r6inv = 6.4e-5;
        let expected_force =
            r2inv * r6inv * (12000.0 * r6inv - 20000.0 * r2inv * r2inv + 300.0);
        let expected_energy = r6inv * (1000.0 * r6inv - 2000.0 * r2inv * r2inv + 50.0);
        assert_relative_eq!(force, expected_force);
        assert_relative_eq!(energy, expected_energy);

        // table kernel agrees with the analytic potential
        let eten = Eten::new(1000.0, 2000.0, 50.0);
        assert_relative_eq!(force, eten.force_over_r(25.0));
        assert_relative_eq!(energy, eten.pair_energy(25.0));
    }

    #[test]
    fn bond_exclusion_factor_scales_both_terms() {
        let table = reference_table();
        let (f1, e1) = table.evaluate(25.0, 1, 1, 1.0, true);
        let (fh, eh) = table.evaluate(25.0, 1, 1, 0.5, true);
        assert_relative_eq!(fh, 0.5 * f1);
        assert_relative_eq!(eh, 0.5 * e1);
    }

    #[test]
    fn no_contribution_beyond_cutoff() {
        let table = reference_table();
        assert_eq!(table.evaluate(100.0, 1, 1, 1.0, true), (0.0, 0.0));
        assert_eq!(table.evaluate(150.0, 1, 1, 1.0, true), (0.0, 0.0));
        // pair (2,2) has an 8 Å override
        assert_eq!(table.evaluate(64.0, 2, 2, 1.0, true), (0.0, 0.0));
        assert_ne!(table.evaluate(63.9, 2, 2, 1.0, false).0, 0.0);
    }

    #[test]
    fn energy_skipped_unless_requested() {
        let table = reference_table();
        let (force, energy) = table.evaluate(25.0, 1, 1, 1.0, false);
        assert_ne!(force, 0.0);
        assert_eq!(energy, 0.0);
    }

    #[test]
    fn finalization_is_symmetric_and_idempotent() {
        let mut table = EtenTable::new(2, 10.0);
        table
            .set_coeff(1..=1, 2..=2, &[100.0, 200.0, 5.0])
            .unwrap();
        table.set_coeff(1..=1, 1..=1, &[1.0, 2.0, 3.0]).unwrap();
        table.set_coeff(2..=2, 2..=2, &[4.0, 5.0, 6.0]).unwrap();

        let cut_ij = table.finalize_pair(1, 2, None).unwrap();
        let cut_ji = table.finalize_pair(2, 1, None).unwrap();
        assert_eq!(cut_ij, cut_ji);
        assert_eq!(table.entry(1, 2), table.entry(2, 1));

        let before = *table.entry(1, 2);
        table.finalize_pair(1, 2, None).unwrap();
        assert_eq!(before, *table.entry(1, 2));
    }

    #[test]
    fn unset_cross_pair_mixes_cutoff_and_stays_inert() {
        let table = reference_table();
        // (2,3) never set: coefficients zero, cutoff mixed from 8 and 12
        assert!(!table.is_set(2, 3));
        let entry = table.entry(2, 3);
        assert_eq!((entry.a, entry.b, entry.c), (0.0, 0.0, 0.0));
        assert_relative_eq!(entry.cut, 10.0);
        assert_eq!(table.evaluate(25.0, 2, 3, 1.0, true), (0.0, 0.0));
        assert_eq!(table.evaluate(1.0, 3, 2, 1.0, true), (0.0, 0.0));
    }

    #[test]
    fn geometric_mixing_is_selectable() {
        let mut table = EtenTable::new(2, 10.0);
        table.set_mixing(crate::DistanceMixing::Geometric);
        table.set_coeff(1..=1, 1..=1, &[1.0, 1.0, 1.0, 4.0]).unwrap();
        table.set_coeff(2..=2, 2..=2, &[1.0, 1.0, 1.0, 9.0]).unwrap();
        let cut = table.finalize_pair(1, 2, None).unwrap();
        assert_relative_eq!(cut, 6.0);
    }

    #[test]
    fn rejects_wrong_parameter_count() {
        let mut table = EtenTable::new(2, 10.0);
        let err = table.set_coeff(1..=1, 1..=1, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EtenError::Coefficients { .. }));
        // table untouched, not even allocated
        assert!(!table.is_allocated());

        let err = table
            .set_coeff(1..=1, 1..=1, &[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap_err();
        assert!(matches!(err, EtenError::Coefficients { .. }));
    }

    #[test]
    fn rejects_bad_ranges_and_cutoffs() {
        let mut table = EtenTable::new(2, 10.0);
        assert!(table.set_coeff(1..=3, 1..=1, &[1.0, 2.0, 3.0]).is_err());
        assert!(table.set_coeff(0..=1, 1..=1, &[1.0, 2.0, 3.0]).is_err());
        // empty canonical sweep: j range entirely below i range
        assert!(table.set_coeff(2..=2, 1..=1, &[1.0, 2.0, 3.0]).is_err());
        // non-positive cutoff override
        assert!(table
            .set_coeff(1..=1, 1..=1, &[1.0, 2.0, 3.0, -1.0])
            .is_err());
        assert!(!table.is_allocated());
    }

    #[test]
    fn rectangular_range_assignment() {
        let mut table = EtenTable::new(3, 10.0);
        table.set_coeff(1..=2, 1..=3, &[1.0, 2.0, 3.0]).unwrap();
        for (i, j) in [(1, 1), (1, 2), (1, 3), (2, 2), (2, 3)] {
            assert!(table.is_set(i, j), "({i},{j}) should be set");
        }
        assert!(!table.is_set(3, 3));
    }

    #[test]
    fn global_cutoff_reset_touches_only_set_pairs() {
        let mut table = EtenTable::new(2, 10.0);
        table.set_coeff(1..=1, 1..=1, &[1.0, 2.0, 3.0, 7.0]).unwrap();
        table.set_global_cutoff(9.0);
        assert_relative_eq!(table.cutoff(1, 1), 9.0);
        assert_relative_eq!(table.global_cutoff(), 9.0);
        assert!(!table.is_set(2, 2));
    }

    #[test]
    fn curvature_reproduces_documented_formula() {
        // Formula reproduction only; the expression is not validated for
        // the 12-10-6 form.
        let table = reference_table();
        let rsq: f64 = 25.0;
        let (du, du2) = table.curvature(rsq, 1, 1, 1.0);

        let r2inv = 1.0 / rsq;
        let rinv = r2inv.sqrt();
        let r6inv = r2inv * r2inv * r2inv;
        assert_relative_eq!(du, r6inv * rinv * (20000.0 - 12000.0 * r6inv));
        assert_relative_eq!(du2, r6inv * r2inv * (13.0 * 12000.0 * r6inv - 7.0 * 20000.0));

        let (du_half, du2_half) = table.curvature(rsq, 1, 1, 0.5);
        assert_relative_eq!(du_half, 0.5 * du);
        assert_relative_eq!(du2_half, 0.5 * du2);
    }

    #[test]
    fn parameter_extraction() {
        let table = reference_table();
        let a = table.parameter("a").unwrap();
        assert_relative_eq!(a[table.idx(1, 1)], 1000.0);
        assert_relative_eq!(a[table.idx(2, 2)], 500.0);
        assert!(table.parameter("sigma").is_none());
        assert!(EtenTable::new(2, 10.0).parameter("a").is_none());
    }
}
