use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Utc};

/// Current UTC instant without offset, as stamped on stored records.
pub fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Today's date in the device's local timezone.
///
/// Transactions and loans created without an explicit date use the user's
/// calendar day, not the UTC one.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// First and last day of the given month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Whether `date` falls inside the given calendar month.
pub fn is_in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}
