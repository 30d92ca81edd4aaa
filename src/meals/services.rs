use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration,
    OffsetDateTime,
};

use crate::error::AppError;

const DEFAULT_RANGE_DAYS: i64 = 7;

/// A query parameter sent with an empty value counts as absent.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date.
pub fn parse_day(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| {
            let t = OffsetDateTime::parse(raw, &Rfc3339).ok()?;
            OffsetDateTime::from_unix_timestamp(t.unix_timestamp())
                .ok()
                .map(|utc| utc.date())
        })
}

/// Half-open UTC bounds `[00:00, next 00:00)` of a calendar day. `None` for
/// the last representable day, which has no next midnight.
pub fn day_bounds(day: Date) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let next = day.next_day()?;
    Some((day.midnight().assume_utc(), next.midnight().assume_utc()))
}

/// The `date` query parameter and its bounds; anything unusable is a 400.
pub fn required_day(raw: &str) -> Result<(Date, (OffsetDateTime, OffsetDateTime)), AppError> {
    parse_day(raw)
        .and_then(|day| Some((day, day_bounds(day)?)))
        .ok_or_else(|| AppError::BadRequest("Invalid date format".into()))
}

/// Inclusive bounds for a log listing. Either side may be a date or an
/// RFC 3339 timestamp; a date-only end covers that whole day. Missing or
/// unparsable sides fall back to the last seven days ending at `now`.
pub fn log_range(
    start: Option<&str>,
    end: Option<&str>,
    now: OffsetDateTime,
) -> (OffsetDateTime, OffsetDateTime) {
    let from = start
        .and_then(|s| parse_bound(s, false))
        .unwrap_or(now - Duration::days(DEFAULT_RANGE_DAYS));
    let to = end.and_then(|s| parse_bound(s, true)).unwrap_or(now);
    (from, to)
}

fn parse_bound(raw: &str, end_of_day: bool) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(t) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(t);
    }
    let day = Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()?;
    let (start, next) = day_bounds(day)?;
    Some(if end_of_day {
        next - Duration::microseconds(1)
    } else {
        start
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_plain_dates_and_timestamps() {
        assert_eq!(parse_day("2024-03-09"), Some(date!(2024-03-09)));
        assert_eq!(
            parse_day("2024-03-09T23:30:00-02:00"),
            Some(date!(2024-03-10))
        );
        assert_eq!(parse_day("yesterday"), None);
        assert!(matches!(required_day("03/09/2024"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn day_bounds_are_utc_midnights() {
        let (start, end) = day_bounds(date!(2024-02-28)).unwrap();
        assert_eq!(start, datetime!(2024-02-28 0:00 UTC));
        assert_eq!(end, datetime!(2024-02-29 0:00 UTC));

        let (day, bounds) = required_day("2024-12-31").unwrap();
        assert_eq!(day, date!(2024-12-31));
        assert_eq!(bounds.1, datetime!(2025-01-01 0:00 UTC));
    }

    #[test]
    fn last_representable_day_has_no_bounds() {
        assert_eq!(day_bounds(date!(9999-12-31)), None);
        assert!(matches!(required_day("9999-12-31"), Err(AppError::BadRequest(_))));
        assert!(matches!(
            required_day("9999-12-31T23:00:00-05:00"),
            Err(AppError::BadRequest(_))
        ));
        assert!(required_day("9999-12-30").is_ok());
    }

    #[test]
    fn end_date_without_a_next_day_falls_back_to_now() {
        let now = datetime!(2024-05-10 12:00 UTC);
        let (from, to) = log_range(Some("2024-05-01"), Some("9999-12-31"), now);
        assert_eq!(from, datetime!(2024-05-01 0:00 UTC));
        assert_eq!(to, now);
    }

    #[test]
    fn empty_parameters_count_as_absent() {
        assert_eq!(present(Some("")), None);
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(Some("2024-05-01")), Some("2024-05-01"));
        assert_eq!(present(None), None);
    }

    #[test]
    fn range_defaults_to_last_week() {
        let now = datetime!(2024-05-10 12:00 UTC);
        let (from, to) = log_range(None, Some("not a date"), now);
        assert_eq!(from, datetime!(2024-05-03 12:00 UTC));
        assert_eq!(to, now);
    }

    #[test]
    fn date_only_end_covers_the_whole_day() {
        let now = datetime!(2024-05-10 12:00 UTC);
        let (from, to) = log_range(Some("2024-05-01"), Some("2024-05-02"), now);
        assert_eq!(from, datetime!(2024-05-01 0:00 UTC));
        assert!(to > datetime!(2024-05-02 23:59:59 UTC));
        assert!(to < datetime!(2024-05-03 0:00 UTC));

        let (from, _) = log_range(Some("2024-05-01T08:00:00Z"), None, now);
        assert_eq!(from, datetime!(2024-05-01 8:00 UTC));
    }
}
