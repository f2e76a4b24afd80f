pub mod error;
pub mod instrument;
pub mod series;
pub mod signal;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use instrument::Instrument;
pub use series::{MacroSeries, MonthEndPoint, MonthEndSeries, PriceSeries, SeriesPoint};
pub use signal::{
    CandidateReturn, DecisionHistory, DualMomentumRecord, Gap, GapReason, LaaRecord,
};
