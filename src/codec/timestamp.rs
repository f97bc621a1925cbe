//! Capture timestamps and calendar day keys.

use chrono::{DateTime, Datelike, Local, NaiveDate};
use std::num::ParseIntError;
use thiserror::Error;

/// Suffix shared by every input photo filename.
pub const IMAGE_SUFFIX: &str = "-image.jpg";

/// Extension of files considered by the scanner.
pub const IMAGE_EXTENSION: &str = "jpg";

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Errors decoding a filename timestamp or a day key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The filename lacks the `-image.jpg` suffix.
    #[error("filename {0:?} does not end with \"-image.jpg\"")]
    MissingSuffix(String),

    /// The filename prefix is not a base-10 integer.
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        /// Prefix that failed to parse.
        value: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },

    /// The seconds value cannot be represented as a date.
    #[error("timestamp {0} is out of range")]
    OutOfRange(i64),

    /// The string is not a `YYYY-MM-DD` day key.
    #[error("invalid day key {value:?}: {source}")]
    InvalidDayKey {
        /// Key that failed to parse.
        value: String,
        /// Date parse failure.
        #[source]
        source: chrono::ParseError,
    },
}

/// Decodes the capture time embedded in a filename like `1500872173-image.jpg`.
///
/// The prefix is a base-10 count of seconds since the Unix epoch; the result
/// is expressed in the local time zone.
pub fn decode_filename_timestamp(name: &str) -> Result<DateTime<Local>, FormatError> {
    let prefix = name
        .strip_suffix(IMAGE_SUFFIX)
        .ok_or_else(|| FormatError::MissingSuffix(name.to_string()))?;

    let seconds: i64 = prefix
        .parse()
        .map_err(|source| FormatError::InvalidTimestamp {
            value: prefix.to_string(),
            source,
        })?;

    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or(FormatError::OutOfRange(seconds))
}

/// Builds the filename a photo captured at `time` would have.
pub fn encode_filename_timestamp(time: &DateTime<Local>) -> String {
    format!("{}{}", time.timestamp(), IMAGE_SUFFIX)
}

/// Renders the day key (`YYYY-MM-DD`) for a timestamp or date.
pub fn format_day_key(day: &impl Datelike) -> String {
    format!("{:04}-{:02}-{:02}", day.year(), day.month(), day.day())
}

/// Parses a day key produced by [`format_day_key`].
pub fn decode_day_key(key: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).map_err(|source| FormatError::InvalidDayKey {
        value: key.to_string(),
        source,
    })
}

/// Returns true if both values fall on the same calendar day.
#[inline]
pub fn same_day(a: &impl Datelike, b: &impl Datelike) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn test_decode_filename_timestamp() {
        let time = decode_filename_timestamp("1500872173-image.jpg").unwrap();
        assert_eq!(time.timestamp(), 1_500_872_173);
    }

    #[test]
    fn test_non_numeric_prefix_fails() {
        assert!(matches!(
            decode_filename_timestamp("invalid-image.jpg"),
            Err(FormatError::InvalidTimestamp { ref value, .. }) if value == "invalid"
        ));
    }

    #[test]
    fn test_missing_suffix_fails() {
        assert!(matches!(
            decode_filename_timestamp("1500872173.jpg"),
            Err(FormatError::MissingSuffix(_))
        ));
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let name = format!("{}-image.jpg", i64::MAX);
        assert!(matches!(
            decode_filename_timestamp(&name),
            Err(FormatError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_format_day_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2017, 7, 3).unwrap();
        assert_eq!(format_day_key(&date), "2017-07-03");
    }

    #[test]
    fn test_decode_day_key() {
        let date = decode_day_key("2017-07-23").unwrap();
        assert_eq!(date.year(), 2017);
        assert_eq!(date.month(), 7);
        assert_eq!(date.day(), 23);
    }

    #[test]
    fn test_decode_day_key_rejects_garbage() {
        assert!(decode_day_key("notes").is_err());
        assert!(decode_day_key("2017-13-01").is_err());
    }

    #[test]
    fn test_same_day() {
        let morning = Local.with_ymd_and_hms(2017, 7, 23, 6, 0, 0).unwrap();
        let evening = Local.with_ymd_and_hms(2017, 7, 23, 21, 30, 0).unwrap();
        let next = Local.with_ymd_and_hms(2017, 7, 24, 6, 0, 0).unwrap();

        assert!(same_day(&morning, &evening));
        assert!(!same_day(&evening, &next));
        assert!(same_day(&morning, &morning.date_naive()));
    }

    proptest! {
        #[test]
        fn prop_filename_timestamp_roundtrip(seconds in 0i64..4_102_444_800) {
            let name = format!("{}-image.jpg", seconds);
            let time = decode_filename_timestamp(&name).unwrap();
            prop_assert_eq!(time.timestamp(), seconds);
            prop_assert_eq!(encode_filename_timestamp(&time), name);
        }

        #[test]
        fn prop_day_key_roundtrip(days in 1i32..=3_652_059) {
            let date = NaiveDate::from_num_days_from_ce_opt(days).unwrap();
            prop_assert_eq!(decode_day_key(&format_day_key(&date)).unwrap(), date);
        }
    }
}
