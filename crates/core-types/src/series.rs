use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self { date, value }
    }
}

/// Daily close observations for one instrument, date-ascending, one point per
/// trading day.
///
/// Invariant: dates strictly increasing, no duplicates. The constructor is the
/// only way to build one, so the invariant holds for the life of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<SeriesPoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, CoreError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::InvalidInput(
                    "PriceSeries".to_string(),
                    format!(
                        "dates must be strictly increasing ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }
}

/// Monthly observations of a macroeconomic indicator at its native frequency.
///
/// Invariant: each point falls in a strictly later calendar month than the
/// one before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSeries {
    points: Vec<SeriesPoint>,
}

impl MacroSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, CoreError> {
        for pair in points.windows(2) {
            let prev = (pair[0].date.year(), pair[0].date.month());
            let next = (pair[1].date.year(), pair[1].date.month());
            if next <= prev {
                return Err(CoreError::InvalidInput(
                    "MacroSeries".to_string(),
                    format!(
                        "observations must advance by month ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One sampled month: the last observed value at or before the month's last
/// calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthEndPoint {
    pub month_end: NaiveDate,
    pub value: Decimal,
}

/// A month-end sampled series.
///
/// Invariant: every `month_end` is the last calendar day of its month (which
/// need not be a trading day), months strictly increasing, at most one entry
/// per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEndSeries {
    points: Vec<MonthEndPoint>,
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    match date.succ_opt() {
        Some(next) => next.month() != date.month(),
        None => true,
    }
}

impl MonthEndSeries {
    pub fn new(points: Vec<MonthEndPoint>) -> Result<Self, CoreError> {
        for point in &points {
            if !is_last_day_of_month(point.month_end) {
                return Err(CoreError::InvalidInput(
                    "MonthEndSeries".to_string(),
                    format!("{} is not the last calendar day of its month", point.month_end),
                ));
            }
        }
        for pair in points.windows(2) {
            if pair[1].month_end <= pair[0].month_end {
                return Err(CoreError::InvalidInput(
                    "MonthEndSeries".to_string(),
                    format!(
                        "month-ends must be strictly increasing ({} followed by {})",
                        pair[0].month_end, pair[1].month_end
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[MonthEndPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position of the entry sampled exactly at `month_end`, if present.
    pub fn index_of(&self, month_end: NaiveDate) -> Option<usize> {
        self.points
            .binary_search_by_key(&month_end, |p| p.month_end)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn price_series_rejects_unordered_dates() {
        let points = vec![
            SeriesPoint::new(d(2024, 1, 3), dec!(100)),
            SeriesPoint::new(d(2024, 1, 2), dec!(101)),
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn price_series_rejects_duplicate_dates() {
        let points = vec![
            SeriesPoint::new(d(2024, 1, 2), dec!(100)),
            SeriesPoint::new(d(2024, 1, 2), dec!(101)),
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn macro_series_rejects_two_points_in_same_month() {
        let points = vec![
            SeriesPoint::new(d(2024, 1, 1), dec!(3.7)),
            SeriesPoint::new(d(2024, 1, 15), dec!(3.8)),
        ];
        assert!(MacroSeries::new(points).is_err());
    }

    #[test]
    fn month_end_series_requires_last_calendar_day() {
        let bad = vec![MonthEndPoint {
            month_end: d(2024, 2, 28), // 2024 is a leap year
            value: dec!(100),
        }];
        assert!(MonthEndSeries::new(bad).is_err());

        let good = vec![MonthEndPoint {
            month_end: d(2024, 2, 29),
            value: dec!(100),
        }];
        assert!(MonthEndSeries::new(good).is_ok());
    }

    #[test]
    fn month_end_index_lookup() {
        let series = MonthEndSeries::new(vec![
            MonthEndPoint {
                month_end: d(2024, 1, 31),
                value: dec!(100),
            },
            MonthEndPoint {
                month_end: d(2024, 2, 29),
                value: dec!(101),
            },
        ])
        .unwrap();

        assert_eq!(series.index_of(d(2024, 2, 29)), Some(1));
        assert_eq!(series.index_of(d(2024, 3, 31)), None);
    }
}
