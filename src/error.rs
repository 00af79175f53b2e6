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

//! Error types for table setup, rRESPA geometry, and restart I/O.
//!
//! Evaluation itself never fails: once every relevant type pair has been
//! finalized, the force/energy/curvature kernels are total functions.

use thiserror::Error;

/// All failure modes of the ETEN coefficient table and its codecs
#[derive(Debug, Error)]
pub enum EtenError {
    /// Malformed setup arguments: wrong coefficient count, empty or
    /// out-of-range type range, a non-positive cutoff override, or invalid
    /// shell radii. The table is left unmodified by the failing call.
    #[error("Configuration error: {reason}")]
    Coefficients { reason: String },

    /// The pair cutoff is smaller than the integrator's outermost shell
    /// radius; raised at finalization, never at evaluation time.
    #[error("Pair cutoff {cutoff} < rRESPA interior cutoff {outer_off}")]
    RespaCutoff { cutoff: f64, outer_off: f64 },

    /// Truncated or unreadable restart stream; the load fails as a whole.
    #[error("Restart stream error: {0}")]
    Restart(#[from] std::io::Error),
}

impl EtenError {
    pub(crate) fn coefficients(reason: impl Into<String>) -> Self {
        Self::Coefficients {
            reason: reason.into(),
        }
    }
}
