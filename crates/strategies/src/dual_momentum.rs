use crate::error::StrategyError;
use analytics::{trailing_return, AnalyticsError};
use chrono::NaiveDate;
use configuration::{DualMomentumConfig, ThresholdMode};
use core_types::{
    CandidateReturn, DecisionHistory, DualMomentumRecord, Gap, GapReason, Instrument,
    MonthEndSeries,
};

/// An instrument paired with its month-end sampled series for one run.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub instrument: Instrument,
    pub series: MonthEndSeries,
}

/// The Dual Momentum rule.
///
/// Relative momentum picks the candidate with the highest trailing return;
/// absolute momentum then compares the winner against the bond threshold and
/// falls back to the bond when the winner is weaker.
pub struct DualMomentum {
    window_months: usize,
    threshold_mode: ThresholdMode,
    candidates: Vec<Candidate>,
    bond: Candidate,
}

fn gap_for(as_of: NaiveDate, series: &str, err: AnalyticsError) -> Gap {
    let reason = match err {
        AnalyticsError::NoObservation(_) => GapReason::NoObservation,
        AnalyticsError::InsufficientHistory {
            required,
            available,
        } => GapReason::InsufficientHistory {
            required,
            available,
        },
        AnalyticsError::NonPositiveBase(_) => GapReason::NonPositiveBase,
        AnalyticsError::InvalidInput(detail) => GapReason::Invalid(detail),
    };
    Gap {
        as_of,
        series: series.to_string(),
        reason,
    }
}

impl DualMomentum {
    /// Creates a new `DualMomentum` engine over a materialized universe.
    ///
    /// It performs validation to ensure the parameters are logical.
    pub fn new(
        params: &DualMomentumConfig,
        candidates: Vec<Candidate>,
        bond: Candidate,
    ) -> Result<Self, StrategyError> {
        if params.return_window_months == 0 {
            return Err(StrategyError::InvalidParameters(
                "return window must be positive".to_string(),
            ));
        }
        if candidates.is_empty() {
            return Err(StrategyError::InvalidParameters(
                "at least one candidate is required".to_string(),
            ));
        }

        Ok(Self {
            window_months: params.return_window_months,
            threshold_mode: params.threshold_mode,
            candidates,
            bond,
        })
    }

    /// Evaluates every scheduled month-end, emitting a record per evaluable
    /// date and a gap per skipped one. Never fatal: a fully gapped schedule
    /// simply yields an empty record list.
    pub fn run(&self, schedule: &[NaiveDate]) -> DecisionHistory<DualMomentumRecord> {
        let mut history = DecisionHistory::new();

        for &as_of in schedule {
            match self.evaluate(as_of) {
                Ok(record) => {
                    tracing::debug!(
                        %as_of,
                        selection = %record.selection.symbol,
                        winner = %record.winner.symbol,
                        "dual momentum decision"
                    );
                    history.records.push(record);
                }
                Err(gap) => {
                    tracing::warn!(
                        as_of = %gap.as_of,
                        series = %gap.series,
                        reason = %gap.reason,
                        "skipping dual momentum date"
                    );
                    history.gaps.push(gap);
                }
            }
        }

        history
    }

    fn evaluate(&self, as_of: NaiveDate) -> Result<DualMomentumRecord, Gap> {
        let mut returns = Vec::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            let trailing = trailing_return(&candidate.series, as_of, self.window_months)
                .map_err(|e| gap_for(as_of, &candidate.instrument.symbol, e))?;
            returns.push(CandidateReturn {
                symbol: candidate.instrument.symbol.clone(),
                name: candidate.instrument.name.clone(),
                trailing_return: trailing,
            });
        }

        // Strictly-greater replacement keeps the earliest configured
        // candidate on exact ties, independent of iteration order.
        let mut winner_idx = 0;
        for (idx, candidate_return) in returns.iter().enumerate().skip(1) {
            if candidate_return.trailing_return > returns[winner_idx].trailing_return {
                winner_idx = idx;
            }
        }

        let threshold_return = match self.threshold_mode {
            ThresholdMode::Bond => {
                trailing_return(&self.bond.series, as_of, self.window_months)
                    .map_err(|e| gap_for(as_of, &self.bond.instrument.symbol, e))?
            }
            ThresholdMode::Zero => 0.0,
        };

        let winner = self.candidates[winner_idx].instrument.clone();
        let winner_return = returns[winner_idx].trailing_return;

        // Strict `<`: a winner exactly at the threshold stays selected.
        let selection = if winner_return < threshold_return {
            self.bond.instrument.clone()
        } else {
            winner.clone()
        };

        Ok(DualMomentumRecord {
            as_of,
            candidates: returns,
            winner,
            winner_return,
            threshold_return,
            selection,
        })
    }
}
