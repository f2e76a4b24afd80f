use chrono::{Datelike, NaiveDate};

/// The last calendar day of the month `date` falls in (not necessarily a
/// trading day).
pub fn month_end_of(date: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    // Create the first day of next month, then step back one day to get the
    // last day of the current month. Only unreachable at chrono's upper bound.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Month-end dates for every calendar month whose last day falls within
/// `[start, end]`, ascending.
pub fn month_ends(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut ends = Vec::new();
    let mut cursor = month_end_of(start);

    while cursor <= end {
        ends.push(cursor);
        cursor = match cursor.succ_opt() {
            Some(next_day) => month_end_of(next_day),
            None => break,
        };
    }

    ends
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_end_handles_leap_february() {
        assert_eq!(month_end_of(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end_of(d(2023, 2, 10)), d(2023, 2, 28));
    }

    #[test]
    fn month_end_handles_december() {
        assert_eq!(month_end_of(d(2024, 12, 5)), d(2024, 12, 31));
    }

    #[test]
    fn month_ends_covers_every_month_in_range() {
        let ends = month_ends(d(2024, 1, 1), d(2024, 12, 31));
        assert_eq!(ends.len(), 12);
        assert_eq!(ends[0], d(2024, 1, 31));
        assert_eq!(ends[11], d(2024, 12, 31));
    }

    #[test]
    fn month_ends_excludes_partial_final_month() {
        // March 31 falls after the range end, so March is not included.
        let ends = month_ends(d(2024, 1, 1), d(2024, 3, 15));
        assert_eq!(ends, vec![d(2024, 1, 31), d(2024, 2, 29)]);
    }
}
