use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Calendar-date layouts seen in the network exports.
///
/// Day-first is the only slash layout accepted besides year-first, so a date
/// such as `03/04/2024` is never read two ways.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Timestamp layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse an export `Time` cell into its calendar date.
///
/// Returns `None` for empty strings or unrecognised layouts.
pub fn parse_time(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    debug!("could not parse time value \"{}\"", s);
    None
}

/// Current local calendar date, used to stamp the report file name.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `Site_Availability_<YYYYMMDD>`, the stem shared by every output artifact.
pub fn report_file_stem(date: NaiveDate) -> String {
    format!("Site_Availability_{}", date.format("%Y%m%d"))
}

/// `Site_Availability_<YYYYMMDD>.<ext>`.
pub fn report_file_name(date: NaiveDate, ext: &str) -> String {
    format!("{}.{}", report_file_stem(date), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_time_iso_date() {
        assert_eq!(parse_time("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_time(" 2024/03/05 "), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_parse_time_day_first() {
        assert_eq!(parse_time("05/03/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_time("05.03.2024"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_parse_time_datetime_keeps_date() {
        assert_eq!(parse_time("2024-03-05 00:00:00"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_time("2024-03-05T23:59:59"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_time("2024-03-05 12:30"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_time("05/03/2024 08:15"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("yesterday"), None);
        assert_eq!(parse_time("2024-13-40"), None);
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(ymd(2024, 7, 1), "json"),
            "Site_Availability_20240701.json"
        );
        assert_eq!(report_file_stem(ymd(2023, 12, 31)), "Site_Availability_20231231");
    }
}
