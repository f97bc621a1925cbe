//! Detection of already-rendered days.

use super::ListError;
use crate::codec::decode_day_key;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;

/// Lists `out_dir` and decodes the day of every rendered video.
///
/// Only files with the `container` extension are considered. Names that do
/// not decode as a day key are logged and skipped. Dates are returned in
/// directory listing order.
pub fn detect_existing(out_dir: &Path, container: &str) -> Result<Vec<NaiveDate>, ListError> {
    let entries = std::fs::read_dir(out_dir).map_err(|e| ListError::new(out_dir, e))?;
    let mut days = Vec::new();

    for entry in entries {
        let path = entry.map_err(|e| ListError::new(out_dir, e))?.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some(container) {
            continue;
        }

        let decoded = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(decode_day_key);

        match decoded {
            Some(Ok(day)) => days.push(day),
            Some(Err(e)) => {
                tracing::warn!(file = %path.display(), error = %e, "Unable to parse date from timelapse file");
            }
            None => {
                tracing::warn!(file = %path.display(), "Timelapse filename is not valid UTF-8");
            }
        }
    }

    Ok(days)
}

/// Days the scanner must skip this cycle.
///
/// Built from the rendered days minus the most recent one: the latest video
/// may have been rendered while its day was still being captured, so that
/// day is always regenerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    days: BTreeSet<NaiveDate>,
    most_recent: Option<NaiveDate>,
}

impl ExclusionSet {
    /// Builds the set from rendered days in any order.
    pub fn from_rendered(rendered: &[NaiveDate]) -> Self {
        let mut days: BTreeSet<NaiveDate> = rendered.iter().copied().collect();
        let most_recent = days.pop_last();
        Self { days, most_recent }
    }

    /// Returns true if photos from `day` must be skipped.
    #[inline]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    /// The most recently rendered day, which stays eligible for re-rendering.
    pub fn most_recent(&self) -> Option<NaiveDate> {
        self.most_recent
    }

    /// Number of excluded days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if no day is excluded.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Excluded days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 7, d).unwrap()
    }

    #[test]
    fn test_detect_existing_parses_video_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2017-07-23.avi", "2017-07-25.avi", "2017-07-24.avi"] {
            std::fs::write(dir.path().join(name), b"video").unwrap();
        }
        std::fs::write(dir.path().join("index.html"), b"<html>").unwrap();
        std::fs::write(dir.path().join("2017-07-22.mp4"), b"other").unwrap();

        let mut days = detect_existing(dir.path(), "avi").unwrap();
        days.sort();

        assert_eq!(days, vec![day(23), day(24), day(25)]);
    }

    #[test]
    fn test_detect_existing_skips_unparsable_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("garbage.avi"), b"video").unwrap();
        std::fs::write(dir.path().join("2017-07-23.avi"), b"video").unwrap();

        assert_eq!(detect_existing(dir.path(), "avi").unwrap(), vec![day(23)]);
    }

    #[test]
    fn test_detect_existing_missing_dir_is_list_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = detect_existing(&missing, "avi").unwrap_err();
        assert_eq!(err.path, missing);
    }

    #[test]
    fn test_exclusion_keeps_most_recent_day() {
        // Listing order is arbitrary; the most recent day is chosen by date.
        let rendered = vec![day(25), day(23), day(27), day(24)];
        let exclusions = ExclusionSet::from_rendered(&rendered);

        assert_eq!(exclusions.len(), rendered.len() - 1);
        assert_eq!(exclusions.most_recent(), Some(day(27)));
        assert!(!exclusions.contains(day(27)));
        assert!(exclusions.contains(day(23)));
        assert!(exclusions.contains(day(24)));
        assert!(exclusions.contains(day(25)));
    }

    #[test]
    fn test_exclusion_of_single_day_is_empty() {
        let exclusions = ExclusionSet::from_rendered(&[day(23)]);
        assert!(exclusions.is_empty());
        assert_eq!(exclusions.most_recent(), Some(day(23)));
    }

    #[test]
    fn test_exclusion_of_nothing() {
        let exclusions = ExclusionSet::from_rendered(&[]);
        assert!(exclusions.is_empty());
        assert_eq!(exclusions.most_recent(), None);
    }
}
