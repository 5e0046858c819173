//! Calendar-day helpers. A single `UtcOffset` is the reference clock for
//! every day boundary computed in one call.

use time::{macros::format_description, Date, Duration, OffsetDateTime, UtcOffset};

pub fn local_date(at: OffsetDateTime, offset: UtcOffset) -> Date {
    at.to_offset(offset).date()
}

pub fn today(offset: UtcOffset) -> Date {
    local_date(OffsetDateTime::now_utc(), offset)
}

/// Half-open instant window `[first_day 00:00, last_day + 1 00:00)`.
/// `None` when the end falls outside the supported calendar.
pub fn day_window(
    first_day: Date,
    num_days: u32,
    offset: UtcOffset,
) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let end_day = first_day.checked_add(Duration::days(i64::from(num_days)))?;
    let start = first_day.midnight().assume_offset(offset);
    let end = end_day.midnight().assume_offset(offset);
    Some((start, end))
}

pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}

pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}

/// serde adapter for `YYYY-MM-DD` dates.
pub mod iso_date {
    use serde::{ser::Error as _, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_date(*date).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub mod option {
        use serde::{de::Error as _, Deserialize, Deserializer};
        use time::Date;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) if !text.trim().is_empty() => super::super::parse_date(text.trim())
                    .map(Some)
                    .map_err(D::Error::custom),
                _ => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    #[test]
    fn local_date_follows_offset() {
        let at = datetime!(2025-03-10 23:30 UTC);
        assert_eq!(local_date(at, offset!(UTC)), date!(2025 - 03 - 10));
        assert_eq!(local_date(at, offset!(+2)), date!(2025 - 03 - 11));
        assert_eq!(local_date(at, offset!(-5)), date!(2025 - 03 - 10));
    }

    #[test]
    fn window_covers_whole_days() {
        let (start, end) = day_window(date!(2025 - 03 - 10), 7, offset!(+1)).unwrap();
        assert_eq!(start, datetime!(2025-03-10 00:00 +1));
        assert_eq!(end, datetime!(2025-03-17 00:00 +1));
    }

    #[test]
    fn window_past_last_supported_day_is_none() {
        let last = parse_date("9999-12-31").unwrap();
        assert_eq!(day_window(last, 1, offset!(UTC)), None);
        assert_eq!(day_window(date!(9999 - 12 - 25), 7, offset!(+2)), None);
        let (_, end) = day_window(date!(9999 - 12 - 30), 1, offset!(UTC)).unwrap();
        assert_eq!(end, datetime!(9999-12-31 00:00 UTC));
    }

    #[test]
    fn iso_round_trip() {
        let d = parse_date("2024-02-29").unwrap();
        assert_eq!(d, date!(2024 - 02 - 29));
        assert_eq!(format_date(d).unwrap(), "2024-02-29");
        assert!(parse_date("2024-13-01").is_err());
    }
}
