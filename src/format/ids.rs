use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{CalcError, Result};

/// Return the numeric suffix of an element id built as `prefix` + index,
/// e.g. ("abcdefgh_", "abcdefgh_2") -> 2
pub fn extract_trailing_index(prefix: &str, full_id: &str) -> Result<usize> {
    let invalid = || CalcError::InvalidIndex {
        prefix: prefix.to_string(),
        id: full_id.to_string(),
    };

    let suffix = full_id.strip_prefix(prefix).ok_or_else(invalid)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    suffix.parse().map_err(|_| invalid())
}

/// Calendar date split into parts.
///
/// `month` is zero-based (January = 0), the convention of calendar objects
/// the values are handed to. Keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IsoDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl IsoDate {
    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day)
    }
}

impl From<NaiveDate> for IsoDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            day: date.day(),
        }
    }
}

/// Parse "YYYY-MM-DD" into an `IsoDate` with a zero-based month
pub fn parse_iso_date(input: &str) -> Result<IsoDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(IsoDate::from)
        .map_err(|_| CalcError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_trailing_index() {
        assert_eq!(extract_trailing_index("abcdefgh_", "abcdefgh_2").unwrap(), 2);
        assert_eq!(extract_trailing_index("line_", "line_104").unwrap(), 104);
    }

    #[test]
    fn test_extract_trailing_index_rejects_bad_ids() {
        assert!(matches!(
            extract_trailing_index("abcdefgh_", "abcdefgh_x"),
            Err(CalcError::InvalidIndex { .. })
        ));
        assert!(extract_trailing_index("abcdefgh_", "abcdefgh_").is_err());
        assert!(extract_trailing_index("abcdefgh_", "other_2").is_err());
        assert!(extract_trailing_index("abcdefgh_", "abcdefgh_-2").is_err());
    }

    #[test]
    fn test_parse_iso_date_month_is_zero_based() {
        let date = parse_iso_date("2012-12-25").unwrap();
        assert_eq!(
            date,
            IsoDate {
                year: 2012,
                month: 11,
                day: 25
            }
        );
        assert_eq!(
            date.to_naive_date(),
            NaiveDate::from_ymd_opt(2012, 12, 25)
        );

        let january = parse_iso_date("2013-01-02").unwrap();
        assert_eq!(january.month, 0);
    }

    #[test]
    fn test_parse_iso_date_invalid() {
        assert!(matches!(
            parse_iso_date("2012-13-01"),
            Err(CalcError::InvalidDate(_))
        ));
        assert!(parse_iso_date("25/12/2012").is_err());
    }
}
