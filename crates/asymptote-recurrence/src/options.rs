//! Solver configuration.

use serde::{Deserialize, Serialize};

/// Limits and tolerances shared by all solvers.
///
/// Every loop in the engine is bounded by one of these values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Maximum number of unrolling levels or recursion depth.
    pub max_depth: usize,
    /// Number of input sizes probed for termination above the largest base
    /// case.
    pub probe_size: usize,
    /// Number of unrolled levels shown in the derivation.
    pub preview_levels: usize,
    /// Number of sample points for the Master Theorem regularity check.
    pub regularity_samples: usize,
    /// How often the substitution threshold may move past a base case.
    pub max_threshold_shifts: usize,
    /// Numeric tolerance for coefficients and residuals.
    pub tolerance: f64,
    /// Iteration cap for numeric root finding.
    pub root_max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_depth: 10_000,
            probe_size: 64,
            preview_levels: 3,
            regularity_samples: 8,
            max_threshold_shifts: 4,
            tolerance: 1e-9,
            root_max_iterations: 500,
        }
    }
}
