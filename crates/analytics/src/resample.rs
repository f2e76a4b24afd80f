use crate::error::AnalyticsError;
use chrono::{Datelike, NaiveDate};
use core_types::{Gap, GapReason, MonthEndPoint, MonthEndSeries, PriceSeries};

/// The outcome of a resampling pass: the sampled series plus every target
/// month that could not be sampled.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub series: MonthEndSeries,
    pub gaps: Vec<Gap>,
}

/// Samples a daily price series onto a month-end grid.
///
/// Each target month-end takes the last observation dated at or before it,
/// provided that observation falls inside the target month. A month with no
/// observation of its own is skipped and reported as a gap; the previous
/// month's close is never carried forward silently.
pub fn resample_month_end(
    prices: &PriceSeries,
    symbol: &str,
    targets: &[NaiveDate],
) -> Result<Resampled, AnalyticsError> {
    let points = prices.points();
    let mut sampled = Vec::with_capacity(targets.len());
    let mut gaps = Vec::new();

    for &target in targets {
        let idx = points.partition_point(|p| p.date <= target);
        let observation = points[..idx].last();

        let in_target_month = observation.map(|obs| {
            obs.date.year() == target.year() && obs.date.month() == target.month()
        });

        match (observation, in_target_month) {
            (Some(obs), Some(true)) => sampled.push(MonthEndPoint {
                month_end: target,
                value: obs.value,
            }),
            _ => {
                tracing::debug!(symbol, %target, "no observation in target month, skipping");
                gaps.push(Gap {
                    as_of: target,
                    series: symbol.to_string(),
                    reason: GapReason::NoObservation,
                });
            }
        }
    }

    let series =
        MonthEndSeries::new(sampled).map_err(|e| AnalyticsError::InvalidInput(e.to_string()))?;

    Ok(Resampled { series, gaps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SeriesPoint;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(points: Vec<(NaiveDate, rust_decimal::Decimal)>) -> PriceSeries {
        PriceSeries::new(
            points
                .into_iter()
                .map(|(date, value)| SeriesPoint::new(date, value))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn samples_last_trading_day_of_each_month() {
        let prices = daily(vec![
            (d(2024, 1, 30), dec!(100)),
            (d(2024, 1, 31), dec!(101)),
            (d(2024, 2, 28), dec!(102)),
            (d(2024, 3, 29), dec!(103)),
        ]);

        let targets = vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)];
        let resampled = resample_month_end(&prices, "SPY", &targets).unwrap();

        assert!(resampled.gaps.is_empty());
        let points = resampled.series.points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, dec!(101));
        assert_eq!(points[1].value, dec!(102));
        assert_eq!(points[2].value, dec!(103));
        assert_eq!(points[2].month_end, d(2024, 3, 31));
    }

    #[test]
    fn month_before_first_observation_is_a_gap() {
        let prices = daily(vec![(d(2024, 2, 15), dec!(100))]);
        let targets = vec![d(2024, 1, 31), d(2024, 2, 29)];

        let resampled = resample_month_end(&prices, "SPY", &targets).unwrap();

        assert_eq!(resampled.series.len(), 1);
        assert_eq!(resampled.gaps.len(), 1);
        assert_eq!(resampled.gaps[0].as_of, d(2024, 1, 31));
        assert_eq!(resampled.gaps[0].series, "SPY");
        assert_eq!(resampled.gaps[0].reason, GapReason::NoObservation);
    }

    #[test]
    fn month_with_no_trading_days_is_not_carried_forward() {
        // Nothing observed in February at all; its month-end must gap rather
        // than silently reuse the January close.
        let prices = daily(vec![
            (d(2024, 1, 31), dec!(100)),
            (d(2024, 3, 15), dec!(110)),
        ]);
        let targets = vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)];

        let resampled = resample_month_end(&prices, "SPY", &targets).unwrap();

        assert_eq!(resampled.series.len(), 2);
        assert_eq!(resampled.gaps.len(), 1);
        assert_eq!(resampled.gaps[0].as_of, d(2024, 2, 29));
    }

    #[test]
    fn resampling_a_month_end_series_is_idempotent() {
        let prices = daily(vec![
            (d(2024, 1, 31), dec!(100)),
            (d(2024, 2, 29), dec!(101)),
            (d(2024, 3, 31), dec!(102)),
        ]);
        let targets = vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)];

        let once = resample_month_end(&prices, "SPY", &targets).unwrap();
        assert!(once.gaps.is_empty());

        // Feed the sampled values back through as a daily series on the same
        // grid; the output must be identical.
        let again_input = daily(
            once.series
                .points()
                .iter()
                .map(|p| (p.month_end, p.value))
                .collect(),
        );
        let again = resample_month_end(&again_input, "SPY", &targets).unwrap();

        assert_eq!(once.series, again.series);
        assert!(again.gaps.is_empty());
    }
}
