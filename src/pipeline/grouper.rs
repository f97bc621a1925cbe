//! Brightness filtering and day bucketing.

use super::record::ImageRecord;
use crate::codec::{format_day_key, same_day};
use chrono::NaiveDate;

/// Default minimum brightness for a photo to appear in a timelapse.
///
/// Night-time frames score well below this.
pub const BRIGHTNESS_THRESHOLD: f64 = 0.25;

/// Photos from a single calendar day, in capture order.
///
/// Never empty: a group only exists once its first record is pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    day: NaiveDate,
    records: Vec<ImageRecord>,
}

impl DayGroup {
    fn start(record: ImageRecord) -> Self {
        Self {
            day: record.timestamp().date_naive(),
            records: vec![record],
        }
    }

    /// Calendar day shared by every record in the group.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Day key of the first record, used as the output filename stem.
    pub fn day_key(&self) -> String {
        format_day_key(&self.first().timestamp())
    }

    /// Earliest record of the day.
    pub fn first(&self) -> &ImageRecord {
        &self.records[0]
    }

    fn last(&self) -> &ImageRecord {
        &self.records[self.records.len() - 1]
    }

    /// Records in capture order.
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Consumes the group, returning its records.
    pub fn into_records(self) -> Vec<ImageRecord> {
        self.records
    }
}

/// Splits records into one group per calendar day.
///
/// `records` must already be sorted ascending by timestamp; the grouper
/// walks them once and never re-sorts. Records scoring below `threshold`
/// (or NaN) are dropped before bucketing.
pub fn group_by_day<I>(records: I, threshold: f64) -> Vec<DayGroup>
where
    I: IntoIterator<Item = ImageRecord>,
{
    let mut groups: Vec<DayGroup> = Vec::new();

    for record in records {
        if record.brightness().is_nan() || record.brightness() < threshold {
            tracing::debug!(
                file = record.filename(),
                brightness = record.brightness(),
                "Skipping dark file"
            );
            continue;
        }

        match groups.last_mut() {
            Some(group) if same_day(&group.last().timestamp(), &record.timestamp()) => {
                group.records.push(record);
            }
            _ => groups.push(DayGroup::start(record)),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};
    use proptest::prelude::*;

    fn record(day: u32, hour: u32, brightness: f64) -> ImageRecord {
        let ts = Local.with_ymd_and_hms(2017, 7, day, hour, 0, 0).unwrap();
        ImageRecord::new(format!("{}-image.jpg", ts.timestamp()), ts, brightness)
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_by_day(Vec::new(), BRIGHTNESS_THRESHOLD).is_empty());
    }

    #[test]
    fn test_groups_by_calendar_day() {
        let records = vec![
            record(23, 8, 0.5),
            record(23, 12, 0.6),
            record(24, 9, 0.4),
            record(24, 17, 0.3),
            record(26, 10, 0.9),
        ];

        let groups = group_by_day(records, BRIGHTNESS_THRESHOLD);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].records().len(), 2);
        assert_eq!(groups[1].records().len(), 2);
        assert_eq!(groups[2].records().len(), 1);
        assert_eq!(groups[0].day_key(), "2017-07-23");
        assert_eq!(groups[2].day(), NaiveDate::from_ymd_opt(2017, 7, 26).unwrap());
    }

    #[test]
    fn test_dark_records_are_dropped() {
        let records = vec![
            record(23, 2, 0.05),
            record(23, 12, 0.6),
            record(24, 1, 0.1),
            record(24, 3, 0.24),
        ];

        let groups = group_by_day(records, BRIGHTNESS_THRESHOLD);

        // Day 24 is entirely dark and must not produce an empty group.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].records().len(), 1);
        assert_eq!(groups[0].first().brightness(), 0.6);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let groups = group_by_day(vec![record(23, 12, BRIGHTNESS_THRESHOLD)], BRIGHTNESS_THRESHOLD);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_nan_brightness_is_dropped() {
        let groups = group_by_day(vec![record(23, 12, f64::NAN)], BRIGHTNESS_THRESHOLD);
        assert!(groups.is_empty());
    }

    fn sorted_records() -> impl Strategy<Value = Vec<ImageRecord>> {
        prop::collection::vec((0i64..900, 0.0f64..1.0), 0..80).prop_map(|steps| {
            let mut ts = Local.with_ymd_and_hms(2017, 7, 20, 0, 0, 0).unwrap();
            steps
                .into_iter()
                .map(|(minutes, brightness)| {
                    ts += Duration::minutes(minutes);
                    ImageRecord::new(format!("{}-image.jpg", ts.timestamp()), ts, brightness)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_groups_partition_filtered_input(records in sorted_records()) {
            let expected: Vec<ImageRecord> = records
                .iter()
                .filter(|r| r.brightness() >= BRIGHTNESS_THRESHOLD)
                .cloned()
                .collect();

            let groups = group_by_day(records, BRIGHTNESS_THRESHOLD);

            for group in &groups {
                prop_assert!(!group.records().is_empty());
                for r in group.records() {
                    prop_assert!(same_day(&r.timestamp(), &group.day()));
                }
            }
            for pair in groups.windows(2) {
                prop_assert!(pair[0].day() < pair[1].day());
            }

            let flattened: Vec<ImageRecord> =
                groups.into_iter().flat_map(DayGroup::into_records).collect();
            prop_assert_eq!(flattened, expected);
        }
    }
}
