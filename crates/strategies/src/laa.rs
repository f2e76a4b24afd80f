use crate::error::StrategyError;
use analytics::{lagged_macro_sma, latest_lagged_value, sma_at, AnalyticsError};
use chrono::{Datelike, NaiveDate};
use configuration::{EvaluationSchedule, LaaConfig};
use core_types::{DecisionHistory, Gap, GapReason, Instrument, LaaRecord, MacroSeries, PriceSeries};
use rust_decimal::prelude::*;

/// The LAA timing rule.
///
/// Holds the defensive instrument only while the market trades below its
/// 200-day moving average AND the unemployment indicator sits above its own
/// lagged 12-month average; any other state, including exact equality on
/// either comparison, holds the risk instrument.
pub struct Laa {
    sma_window_days: usize,
    macro_sma_months: usize,
    fred_lag_months: u32,
    schedule: EvaluationSchedule,
    market: Instrument,
    macro_id: String,
    risk: Instrument,
    defensive: Instrument,
    prices: PriceSeries,
    macro_series: MacroSeries,
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

impl Laa {
    /// Creates a new `Laa` engine over a run's market and macro snapshots.
    pub fn new(
        params: &LaaConfig,
        prices: PriceSeries,
        macro_series: MacroSeries,
    ) -> Result<Self, StrategyError> {
        if params.sma_window_days == 0 {
            return Err(StrategyError::InvalidParameters(
                "SMA window must be positive".to_string(),
            ));
        }
        if params.macro_sma_months == 0 {
            return Err(StrategyError::InvalidParameters(
                "macro SMA window must be positive".to_string(),
            ));
        }

        Ok(Self {
            sma_window_days: params.sma_window_days,
            macro_sma_months: params.macro_sma_months,
            fred_lag_months: params.fred_lag_months,
            schedule: params.schedule,
            market: params.market.to_instrument(),
            macro_id: params.macro_series.clone(),
            risk: params.risk.to_instrument(),
            defensive: params.defensive.to_instrument(),
            prices,
            macro_series,
        })
    }

    /// Evaluates one scheduled trading date per calendar month in `months`
    /// (given as month-end dates), skipping months that cannot be computed.
    pub fn run(&self, months: &[NaiveDate]) -> DecisionHistory<LaaRecord> {
        let mut history = DecisionHistory::new();

        for &month_end in months {
            match self.evaluate(month_end) {
                Ok(record) => {
                    tracing::debug!(
                        as_of = %record.as_of,
                        selection = %record.selection.symbol,
                        risk_off = record.risk_off,
                        "laa decision"
                    );
                    history.records.push(record);
                }
                Err(gap) => {
                    tracing::warn!(
                        as_of = %gap.as_of,
                        series = %gap.series,
                        reason = %gap.reason,
                        "skipping laa date"
                    );
                    history.gaps.push(gap);
                }
            }
        }

        history
    }

    /// The trading day within the month that triggers the evaluation.
    fn evaluation_day(&self, month_end: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        let first = month_end.with_day(1)?;
        let points = self.prices.points();
        let in_month = {
            let start = points.partition_point(|p| p.date < first);
            let end = points.partition_point(|p| p.date <= month_end);
            &points[start..end]
        };

        let point = match self.schedule {
            EvaluationSchedule::MonthEnd => in_month.last()?,
            EvaluationSchedule::MonthStart => in_month.first()?,
        };
        Some((point.date, point.value))
    }

    fn evaluate(&self, month_end: NaiveDate) -> Result<LaaRecord, Gap> {
        let (as_of, close) = self.evaluation_day(month_end).ok_or_else(|| Gap {
            as_of: month_end,
            series: self.market.symbol.clone(),
            reason: GapReason::NoObservation,
        })?;

        let price = close.to_f64().ok_or_else(|| Gap {
            as_of,
            series: self.market.symbol.clone(),
            reason: GapReason::Invalid(format!("close at {as_of} not representable as f64")),
        })?;

        let sma = sma_at(&self.prices, as_of, self.sma_window_days)
            .map_err(|e| gap_for(as_of, &self.market.symbol, e))?;
        let macro_current = latest_lagged_value(&self.macro_series, as_of, self.fred_lag_months)
            .map_err(|e| gap_for(as_of, &self.macro_id, e))?;
        let macro_sma = lagged_macro_sma(
            &self.macro_series,
            as_of,
            self.macro_sma_months,
            self.fred_lag_months,
        )
        .map_err(|e| gap_for(as_of, &self.macro_id, e))?;

        // Both comparisons strict: equality on either resolves risk-on.
        let risk_off = price < sma && macro_current > macro_sma;
        let selection = if risk_off {
            self.defensive.clone()
        } else {
            self.risk.clone()
        };

        Ok(LaaRecord {
            as_of,
            price,
            sma,
            macro_current,
            macro_sma,
            risk_off,
            selection,
        })
    }
}
