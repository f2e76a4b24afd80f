//! # Meridian Decision Engines
//!
//! This crate contains the two monthly decision rules of the system. Each
//! engine consumes statistics from `analytics` and emits one immutable
//! record per evaluable as-of date.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   data providers or report files. It depends only on `core-types`,
//!   `configuration` and `analytics`.
//! - **Skip, never default:** when a statistic cannot be computed for an
//!   as-of date, the date is skipped and a structured `Gap` is recorded.
//!   No decision is ever made from substituted numbers.
//!
//! ## Public API
//!
//! - `DualMomentum`: relative momentum across candidates with a bond
//!   fallback on absolute momentum.
//! - `Laa`: the price-vs-SMA / unemployment timing switch.
//! - `Candidate`: an instrument paired with its month-end series.

// Declare all the modules that constitute this crate.
pub mod dual_momentum;
pub mod error;
pub mod laa;

// Re-export the key components to create a clean, public-facing API.
pub use dual_momentum::{Candidate, DualMomentum};
pub use error::StrategyError;
pub use laa::Laa;
