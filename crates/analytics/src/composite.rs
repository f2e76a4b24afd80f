use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{MonthEndPoint, MonthEndSeries};
use rust_decimal::prelude::*;
use std::collections::BTreeSet;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Synthesizes a composite month-end index from weighted legs.
///
/// The grid is the intersection of the legs' months. Each month's composite
/// return is the weighted mean of the legs' simple monthly returns, and the
/// index is the cumulative product of those returns seeded at 1.0, so a
/// trailing return computed on the output reads exactly like one computed on
/// a real instrument rebalanced monthly at the given weights.
pub fn composite_index(
    legs: &[MonthEndSeries],
    weights: &[f64],
) -> Result<MonthEndSeries, AnalyticsError> {
    if legs.is_empty() {
        return Err(AnalyticsError::InvalidInput(
            "composite index needs at least one leg".to_string(),
        ));
    }
    if legs.len() != weights.len() {
        return Err(AnalyticsError::InvalidInput(format!(
            "{} legs but {} weights",
            legs.len(),
            weights.len()
        )));
    }
    let weight_sum: f64 = weights.iter().sum();
    if (weight_sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AnalyticsError::InvalidInput(format!(
            "leg weights sum to {weight_sum}, expected 1.0"
        )));
    }

    // Months every leg can price.
    let mut grid: Vec<NaiveDate> = legs[0].points().iter().map(|p| p.month_end).collect();
    for leg in &legs[1..] {
        let months: BTreeSet<NaiveDate> = leg.points().iter().map(|p| p.month_end).collect();
        grid.retain(|month| months.contains(month));
    }

    let value_at = |leg: &MonthEndSeries, month: NaiveDate| -> Result<f64, AnalyticsError> {
        let idx = leg
            .index_of(month)
            .ok_or(AnalyticsError::NoObservation(month))?;
        leg.points()[idx]
            .value
            .to_f64()
            .ok_or_else(|| AnalyticsError::InvalidInput(format!("leg value at {month} not representable as f64")))
    };

    let mut level = 1.0f64;
    let mut index = Vec::with_capacity(grid.len());
    for (t, &month) in grid.iter().enumerate() {
        if t > 0 {
            let mut composite_return = 0.0;
            for (leg, &weight) in legs.iter().zip(weights) {
                let current = value_at(leg, month)?;
                let previous = value_at(leg, grid[t - 1])?;
                if previous == 0.0 || !previous.is_finite() {
                    return Err(AnalyticsError::NonPositiveBase(grid[t - 1]));
                }
                composite_return += weight * (current / previous - 1.0);
            }
            level *= 1.0 + composite_return;
        }
        index.push(MonthEndPoint {
            month_end: month,
            value: Decimal::from_f64(level).ok_or_else(|| {
                AnalyticsError::InvalidInput(format!("composite level at {month} not representable"))
            })?,
        });
    }

    MonthEndSeries::new(index).map_err(|e| AnalyticsError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::trailing_return;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(months: &[(i32, u32, u32)], values: &[Decimal]) -> MonthEndSeries {
        MonthEndSeries::new(
            months
                .iter()
                .zip(values)
                .map(|(&(y, m, day), &value)| MonthEndPoint {
                    month_end: d(y, m, day),
                    value,
                })
                .collect(),
        )
        .unwrap()
    }

    const Q1: [(i32, u32, u32); 3] = [(2024, 1, 31), (2024, 2, 29), (2024, 3, 31)];

    #[test]
    fn single_full_weight_leg_reproduces_its_returns() {
        let leg = series(&Q1, &[dec!(100), dec!(110), dec!(99)]);
        let index = composite_index(std::slice::from_ref(&leg), &[1.0]).unwrap();

        let leg_return = trailing_return(&leg, d(2024, 3, 31), 2).unwrap();
        let index_return = trailing_return(&index, d(2024, 3, 31), 2).unwrap();
        assert!((leg_return - index_return).abs() < 1e-9);
    }

    #[test]
    fn fifty_fifty_blend_averages_monthly_returns() {
        // Leg A: +10% then +10%; leg B: flat. Composite: +5% then +5%.
        let a = series(&Q1, &[dec!(100), dec!(110), dec!(121)]);
        let b = series(&Q1, &[dec!(50), dec!(50), dec!(50)]);

        let index = composite_index(&[a, b], &[0.5, 0.5]).unwrap();
        let points = index.points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, dec!(1));

        let level: f64 = points[2].value.to_f64().unwrap();
        assert!((level - 1.05f64 * 1.05).abs() < 1e-9);
    }

    #[test]
    fn grid_is_the_intersection_of_leg_months() {
        let a = series(&Q1, &[dec!(100), dec!(110), dec!(121)]);
        let b = series(&Q1[1..], &[dec!(50), dec!(55)]);

        let index = composite_index(&[a, b], &[0.5, 0.5]).unwrap();
        let months: Vec<NaiveDate> = index.points().iter().map(|p| p.month_end).collect();
        assert_eq!(months, vec![d(2024, 2, 29), d(2024, 3, 31)]);
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let a = series(&Q1, &[dec!(100), dec!(110), dec!(121)]);

        assert!(composite_index(std::slice::from_ref(&a), &[0.9]).is_err());
        assert!(composite_index(&[a], &[0.5, 0.5]).is_err());
    }
}
