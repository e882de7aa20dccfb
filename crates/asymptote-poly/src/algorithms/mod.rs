//! Polynomial algorithms.
//!
//! This module contains:
//! - Euclidean division and GCD over a field
//! - Yun squarefree decomposition
//! - Root finding (rational roots, quadratic surds, Aberth iteration)
//! - Interpolation through sample points

pub mod gcd;
pub mod interpolate;
pub mod roots;
pub mod squarefree;
