//! # Meridian Analytics Engine
//!
//! This crate holds the numeric core of the system: the month-end resampler,
//! the trailing-window statistics, and the synthetic composite index used for
//! multi-leg candidates.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   data providers or report files. It depends only on `core-types`.
//! - **Stateless Calculation:** Every function is a pure function of a
//!   read-only series and an as-of date. There is nothing to construct and
//!   nothing to reset between as-of dates, which keeps the decision engines
//!   trivially testable.
//! - **Value or reason, never a default:** a statistic either produces a
//!   number or a structured error naming why the date cannot be computed.
//!   Callers turn those errors into reported gaps; nothing here substitutes
//!   a zero or an infinity.

// Declare the modules that constitute this crate.
pub mod calendar;
pub mod composite;
pub mod error;
pub mod resample;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use composite::composite_index;
pub use error::AnalyticsError;
pub use resample::{resample_month_end, Resampled};
pub use stats::{lagged_macro_sma, latest_lagged_value, sma_at, trailing_return};
