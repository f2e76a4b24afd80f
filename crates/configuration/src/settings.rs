use crate::error::ConfigError;
use core_types::Instrument;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    pub provider: ProviderConfig,
    pub dual_momentum: DualMomentumConfig,
    pub laa: LaaConfig,
}

/// Parameters for a single signal-computation run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// First calendar year of the evaluation range.
    pub start_year: i32,
    /// Last calendar year of the evaluation range (inclusive).
    pub end_year: i32,
    /// Extra years of history fetched before `start_year` so the trailing
    /// windows are populated from the first evaluation date.
    pub warmup_years: u32,
    /// Directory the CSV artifacts are written into.
    pub output_dir: PathBuf,
}

/// Retry behavior for the data-provider collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Additional attempts after the first failure before the fetch is
    /// surfaced as data-unavailable.
    pub max_retries: u32,
    /// Delay between attempts, in whole seconds.
    pub retry_delay_secs: u64,
}

/// A symbol/display-name pair as it appears in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub name: String,
}

impl InstrumentConfig {
    pub fn to_instrument(&self) -> Instrument {
        Instrument::new(self.symbol.clone(), self.name.clone())
    }
}

/// One weighted leg of a (possibly composite) candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct LegConfig {
    pub symbol: String,
    pub weight: f64,
}

/// A Dual Momentum candidate. A single full-weight leg is an ordinary
/// instrument; several legs define a synthetic index rebalanced monthly at
/// the configured weights.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateConfig {
    pub name: String,
    pub legs: Vec<LegConfig>,
}

impl CandidateConfig {
    /// The symbol reported for this candidate: the single leg's symbol, or a
    /// `+`-joined composite label.
    pub fn display_symbol(&self) -> String {
        if self.legs.len() == 1 {
            self.legs[0].symbol.clone()
        } else {
            self.legs
                .iter()
                .map(|l| l.symbol.as_str())
                .collect::<Vec<_>>()
                .join("+")
        }
    }

    pub fn to_instrument(&self) -> Instrument {
        Instrument::new(self.display_symbol(), self.name.clone())
    }
}

/// The absolute-momentum threshold the winning candidate must clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Compare against the bond's own trailing return.
    Bond,
    /// Compare against a literal 0% floor.
    Zero,
}

/// Parameters for the Dual Momentum rule.
#[derive(Debug, Clone, Deserialize)]
pub struct DualMomentumConfig {
    /// Trailing return window, in months.
    pub return_window_months: usize,
    pub threshold_mode: ThresholdMode,
    pub bond: InstrumentConfig,
    pub candidates: Vec<CandidateConfig>,
}

/// Which trading day of each month triggers an LAA evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationSchedule {
    /// Last trading day observed in the month.
    MonthEnd,
    /// First trading day observed in the month.
    MonthStart,
}

/// One fixed leg of the LAA target allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationLeg {
    pub name: String,
    pub symbol: String,
    pub weight: f64,
}

/// Parameters for the LAA timing rule.
#[derive(Debug, Clone, Deserialize)]
pub struct LaaConfig {
    /// Index whose price and moving average drive the timing condition.
    pub market: InstrumentConfig,
    pub sma_window_days: usize,
    /// Provider id of the macro series (e.g. "UNRATE").
    pub macro_series: String,
    pub macro_sma_months: usize,
    /// Publication delay applied to the macro series, in months.
    pub fred_lag_months: u32,
    pub schedule: EvaluationSchedule,
    /// Held when the timing condition stays risk-on.
    pub risk: InstrumentConfig,
    /// Held when both defensive conditions trigger.
    pub defensive: InstrumentConfig,
    /// Buy-and-hold legs of the target allocation.
    pub fixed_legs: Vec<AllocationLeg>,
    /// Weight of the timing slot within the target allocation.
    pub timing_weight: f64,
}

const WEIGHT_TOLERANCE: f64 = 1e-6;

impl Config {
    /// Rejects malformed configuration before any data is fetched or any
    /// computation begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.start_year > self.run.end_year {
            return Err(ConfigError::ValidationError(format!(
                "run.start_year ({}) is after run.end_year ({})",
                self.run.start_year, self.run.end_year
            )));
        }

        if self.dual_momentum.return_window_months == 0 {
            return Err(ConfigError::ValidationError(
                "dual_momentum.return_window_months must be positive".to_string(),
            ));
        }
        if self.dual_momentum.candidates.is_empty() {
            return Err(ConfigError::ValidationError(
                "dual_momentum.candidates must not be empty".to_string(),
            ));
        }
        for candidate in &self.dual_momentum.candidates {
            if candidate.legs.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "candidate '{}' has no legs",
                    candidate.name
                )));
            }
            let weight_sum: f64 = candidate.legs.iter().map(|l| l.weight).sum();
            if (weight_sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(ConfigError::ValidationError(format!(
                    "candidate '{}' leg weights sum to {weight_sum}, expected 1.0",
                    candidate.name
                )));
            }
        }

        if self.laa.sma_window_days == 0 {
            return Err(ConfigError::ValidationError(
                "laa.sma_window_days must be positive".to_string(),
            ));
        }
        if self.laa.macro_sma_months == 0 {
            return Err(ConfigError::ValidationError(
                "laa.macro_sma_months must be positive".to_string(),
            ));
        }
        let allocation_sum: f64 =
            self.laa.fixed_legs.iter().map(|l| l.weight).sum::<f64>() + self.laa.timing_weight;
        if (allocation_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::ValidationError(format!(
                "laa fixed legs plus timing weight sum to {allocation_sum}, expected 1.0"
            )));
        }

        Ok(())
    }
}
