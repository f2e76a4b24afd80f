use crate::instrument::Instrument;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One candidate's trailing return at an as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReturn {
    pub symbol: String,
    pub name: String,
    pub trailing_return: f64,
}

/// The full Dual Momentum decision for one month-end, including every input
/// that justified it. Created once by the decision engine, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualMomentumRecord {
    pub as_of: NaiveDate,
    pub candidates: Vec<CandidateReturn>,
    /// The candidate with the highest trailing return, before the threshold
    /// comparison.
    pub winner: Instrument,
    pub winner_return: f64,
    /// The bond's trailing return, or 0.0 under the zero-floor mode.
    pub threshold_return: f64,
    pub selection: Instrument,
}

/// The LAA timing decision for one scheduled trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaaRecord {
    pub as_of: NaiveDate,
    pub price: f64,
    pub sma: f64,
    pub macro_current: f64,
    pub macro_sma: f64,
    /// True when both defensive conditions held (price below its moving
    /// average and the macro value above its own).
    pub risk_off: bool,
    pub selection: Instrument,
}

/// Why an as-of date produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapReason {
    /// No usable observation for the target month or date.
    NoObservation,
    /// Fewer trailing observations than the window requires.
    InsufficientHistory { required: usize, available: usize },
    /// The return base (the value a window back) was zero or not finite.
    NonPositiveBase,
    /// The inputs for the date were present but unusable.
    Invalid(String),
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::NoObservation => write!(f, "no usable observation for the target date"),
            GapReason::InsufficientHistory {
                required,
                available,
            } => write!(
                f,
                "insufficient history ({available} of {required} observations)"
            ),
            GapReason::NonPositiveBase => write!(f, "return base was zero or not finite"),
            GapReason::Invalid(detail) => write!(f, "unusable input: {detail}"),
        }
    }
}

/// A skipped as-of date: which series caused the skip and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub as_of: NaiveDate,
    /// Symbol or macro series id the missing data belongs to.
    pub series: String,
    pub reason: GapReason,
}

/// Everything a run makes observable: the records it emitted and the dates it
/// skipped, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionHistory<R> {
    pub records: Vec<R>,
    pub gaps: Vec<Gap>,
}

impl<R> DecisionHistory<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            gaps: Vec::new(),
        }
    }
}

impl<R> Default for DecisionHistory<R> {
    fn default() -> Self {
        Self::new()
    }
}
