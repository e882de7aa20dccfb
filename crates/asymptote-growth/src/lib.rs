//! # asymptote-growth
//!
//! Asymptotic growth classes for the Asymptote recurrence solver.
//!
//! This crate provides:
//! - [`Quantity`]: exact, log-ratio, real or symbolic growth parameters
//! - [`GrowthOrder`]: canonical growth classes under Big-O dominance
//! - [`analyze`]: the dominant term of an [`Expr`](asymptote_core::Expr)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod order;
pub mod quantity;

#[cfg(test)]
mod proptests;

pub use analysis::{analyze, growth_of, LeadingTerm};
pub use order::{GrowthError, GrowthOrder};
pub use quantity::Quantity;
