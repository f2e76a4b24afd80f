use crate::error::AnalyticsError;
use chrono::{Months, NaiveDate};
use core_types::{MacroSeries, MonthEndSeries, PriceSeries};
use rust_decimal::prelude::*;
use ta::indicators::SimpleMovingAverage as Sma;
use ta::Next;

fn to_f64(value: Decimal, date: NaiveDate) -> Result<f64, AnalyticsError> {
    value
        .to_f64()
        .ok_or_else(|| AnalyticsError::InvalidInput(format!("value at {date} is not representable as f64")))
}

/// The date an observation becomes visible once publication lag is applied.
fn visible_from(observed: NaiveDate, lag_months: u32) -> NaiveDate {
    observed
        .checked_add_months(Months::new(lag_months))
        .unwrap_or(NaiveDate::MAX)
}

/// Trailing simple return over `window_months` month-end observations:
/// `value[t] / value[t - window] - 1`.
///
/// The as-of date must be an entry of the sampled series; fewer than
/// `window_months + 1` observations up to and including it is insufficient
/// history, and a zero base is an error rather than an infinity.
pub fn trailing_return(
    series: &MonthEndSeries,
    as_of: NaiveDate,
    window_months: usize,
) -> Result<f64, AnalyticsError> {
    if window_months == 0 {
        return Err(AnalyticsError::InvalidInput(
            "return window must be positive".to_string(),
        ));
    }

    let idx = series
        .index_of(as_of)
        .ok_or(AnalyticsError::NoObservation(as_of))?;
    if idx < window_months {
        return Err(AnalyticsError::InsufficientHistory {
            required: window_months + 1,
            available: idx + 1,
        });
    }

    let points = series.points();
    let base_point = points[idx - window_months];

    // Guard against month gaps inside the window: the base entry must sit
    // exactly `window_months` calendar months back, or the computed span
    // would silently be longer than requested.
    let expected_base = as_of
        .checked_sub_months(Months::new(window_months as u32))
        .map(crate::calendar::month_end_of);
    if expected_base != Some(base_point.month_end) {
        return Err(AnalyticsError::NoObservation(
            expected_base.unwrap_or(base_point.month_end),
        ));
    }

    let current = to_f64(points[idx].value, as_of)?;
    let base = to_f64(base_point.value, base_point.month_end)?;

    if base == 0.0 || !base.is_finite() {
        return Err(AnalyticsError::NonPositiveBase(base_point.month_end));
    }

    Ok(current / base - 1.0)
}

/// Simple moving average of the most recent `window_days` daily closes up to
/// and including the as-of trading date.
pub fn sma_at(
    prices: &PriceSeries,
    as_of: NaiveDate,
    window_days: usize,
) -> Result<f64, AnalyticsError> {
    let points = prices.points();
    let end = points.partition_point(|p| p.date <= as_of);
    if end == 0 {
        return Err(AnalyticsError::NoObservation(as_of));
    }
    if end < window_days {
        return Err(AnalyticsError::InsufficientHistory {
            required: window_days,
            available: end,
        });
    }

    let mut sma = Sma::new(window_days)
        .map_err(|_| AnalyticsError::InvalidInput("SMA window must be positive".to_string()))?;

    // The `ta` crate works in f64; feeding exactly `window_days` closes makes
    // the last output the arithmetic mean of that window.
    let mut value = 0.0;
    for point in &points[end - window_days..end] {
        value = sma.next(to_f64(point.value, point.date)?);
    }

    Ok(value)
}

/// Mean of the most recent `window_months` lag-shifted macro values visible
/// at the as-of date.
///
/// Each observation only becomes usable `lag_months` after its observation
/// date, so nothing dated later than `as_of - lag` can influence the result.
pub fn lagged_macro_sma(
    series: &MacroSeries,
    as_of: NaiveDate,
    window_months: usize,
    lag_months: u32,
) -> Result<f64, AnalyticsError> {
    if window_months == 0 {
        return Err(AnalyticsError::InvalidInput(
            "macro SMA window must be positive".to_string(),
        ));
    }

    let visible = series
        .points()
        .iter()
        .filter(|p| visible_from(p.date, lag_months) <= as_of)
        .map(|p| to_f64(p.value, p.date))
        .collect::<Result<Vec<_>, _>>()?;

    if visible.len() < window_months {
        return Err(AnalyticsError::InsufficientHistory {
            required: window_months,
            available: visible.len(),
        });
    }

    let window = &visible[visible.len() - window_months..];
    Ok(window.iter().sum::<f64>() / window_months as f64)
}

/// The most recent lag-shifted raw macro value visible at the as-of date.
pub fn latest_lagged_value(
    series: &MacroSeries,
    as_of: NaiveDate,
    lag_months: u32,
) -> Result<f64, AnalyticsError> {
    series
        .points()
        .iter()
        .rev()
        .find(|p| visible_from(p.date, lag_months) <= as_of)
        .map(|p| to_f64(p.value, p.date))
        .transpose()?
        .ok_or(AnalyticsError::InsufficientHistory {
            required: 1,
            available: 0,
        })
}
