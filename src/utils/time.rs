use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// English ordinal suffix for a day of the month
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Heading for a day in the agenda, e.g. "Today", "Tomorrow" or "Monday 4th March"
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if Some(date) == today.checked_add_signed(Duration::days(1)) {
        return "Tomorrow".to_string();
    }
    format!(
        "{} {}{} {}",
        date.format("%A"),
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%B")
    )
}

/// Start time of an event as shown in the agenda, e.g. "09:05"
pub fn clock(time: &NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Column of the first day of the month (Monday = 0) and the number of days in it
pub fn month_layout(date: NaiveDate) -> (u32, u32) {
    let first = date.with_day(1).unwrap_or(date);
    let offset = first.weekday().num_days_from_monday();

    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let days = next_month
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31);

    (offset, days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(31), "st");
    }

    #[test]
    fn test_day_label() {
        let today = date(2024, 3, 4);
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(date(2024, 3, 5), today), "Tomorrow");
        assert_eq!(day_label(date(2024, 3, 6), today), "Wednesday 6th March");
        assert_eq!(day_label(date(2024, 4, 1), today), "Monday 1st April");
    }

    #[test]
    fn test_clock() {
        let t = date(2024, 3, 4).and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(clock(&t), "09:05");
    }

    #[test]
    fn test_month_layout() {
        // March 2024 starts on a Friday
        assert_eq!(month_layout(date(2024, 3, 17)), (4, 31));
        // Leap year February starts on a Thursday
        assert_eq!(month_layout(date(2024, 2, 10)), (3, 29));
        // December rolls over into the next year
        assert_eq!(month_layout(date(2023, 12, 25)), (4, 31));
    }
}
