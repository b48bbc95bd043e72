//! Rendering of upstream UTC timestamps in Central time.
//!
//! The daylight-saving window is approximated by whole days: CDT applies from
//! midnight of the second Sunday in March up to midnight of the first Sunday in
//! November, compared against the UTC wall-clock time. Real transitions happen
//! at 2 AM local, so timestamps in the few hours around a change can carry the
//! "wrong" offset; existing exports depend on this exact output.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

const FALLBACK_LEN: usize = 16;

/// Format a UTC timestamp as `YYYY-MM-DD H:MM AM/PM CDT|CST`.
///
/// Unparseable input is returned truncated to its first 16 characters.
pub fn to_central_display(utc: &str) -> String {
    match parse_utc(utc).and_then(central_display) {
        Some(display) => display,
        None => utc.chars().take(FALLBACK_LEN).collect(),
    }
}

fn parse_utc(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.naive_utc());
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
}

fn central_display(utc: NaiveDateTime) -> Option<String> {
    let (start, end) = dst_window(utc.year())?;
    let (offset_hours, label) = if start <= utc && utc < end {
        (-5, "CDT")
    } else {
        (-6, "CST")
    };
    let local = utc.checked_add_signed(Duration::hours(offset_hours))?;
    Some(format!("{} {label}", local.format("%Y-%m-%d %-I:%M %p")))
}

/// Midnight of the second Sunday of March and of the first Sunday of November.
fn dst_window(year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)?;
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)?;
    Some((start.and_hms_opt(0, 0, 0)?, end.and_hms_opt(0, 0, 0)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summer_timestamp_uses_cdt() {
        assert_eq!(
            to_central_display("2024-07-04T18:00:00Z"),
            "2024-07-04 1:00 PM CDT"
        );
    }

    #[test]
    fn winter_timestamp_uses_cst() {
        assert_eq!(
            to_central_display("2024-01-04T18:00:00Z"),
            "2024-01-04 12:00 PM CST"
        );
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        assert_eq!(
            to_central_display("2024-07-04T18:00:00.000Z"),
            "2024-07-04 1:00 PM CDT"
        );
    }

    #[test]
    fn offset_can_cross_midnight() {
        assert_eq!(
            to_central_display("2024-01-05T03:30:00Z"),
            "2024-01-04 9:30 PM CST"
        );
    }

    #[test]
    fn window_boundaries_are_whole_days() {
        // 2024: second Sunday of March is the 10th, first Sunday of November the 3rd.
        assert_eq!(
            to_central_display("2024-03-09T23:59:00Z"),
            "2024-03-09 5:59 PM CST"
        );
        assert_eq!(
            to_central_display("2024-03-10T00:00:00Z"),
            "2024-03-09 7:00 PM CDT"
        );
        assert_eq!(
            to_central_display("2024-11-02T23:00:00Z"),
            "2024-11-02 6:00 PM CDT"
        );
        assert_eq!(
            to_central_display("2024-11-03T00:00:00Z"),
            "2024-11-02 6:00 PM CST"
        );
    }

    #[test]
    fn dst_window_for_2025() {
        let (start, end) = dst_window(2025).unwrap();
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2025, 11, 2).unwrap());
    }

    #[test]
    fn minute_precision_is_accepted() {
        assert_eq!(
            to_central_display("2024-07-04T18:00Z"),
            "2024-07-04 1:00 PM CDT"
        );
        assert_eq!(
            to_central_display("2024-01-04T18:00+00:00"),
            "2024-01-04 12:00 PM CST"
        );
        assert_eq!(
            to_central_display("2024-01-04T18:00:00"),
            "2024-01-04 12:00 PM CST"
        );
    }

    #[test]
    fn out_of_range_year_falls_back_to_raw_prefix() {
        assert_eq!(
            to_central_display("-262143-01-01T00:00:00"),
            "-262143-01-01T00"
        );
    }

    #[test]
    fn malformed_input_is_truncated() {
        assert_eq!(to_central_display("not-a-date"), "not-a-date");
        assert_eq!(
            to_central_display("definitely not a timestamp"),
            "definitely not a"
        );
        assert_eq!(to_central_display(""), "");
    }
}
