use chrono::{Local, NaiveDateTime};

/// Build date and time as they are written into the version file,
/// already wrapped in double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    pub date: String,
    pub time: String,
}

impl BuildStamp {
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(when: NaiveDateTime) -> Self {
        Self {
            date: format!("\"{}\"", when.format("%d/%m/%y")),
            time: format!("\"{}\"", when.format("%H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn formats_day_month_short_year() {
        let when = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap();
        let stamp = BuildStamp::at(when);
        assert_eq!(stamp.date, "\"07/03/26\"");
        assert_eq!(stamp.time, "\"09:05:02\"");
    }

    #[test]
    fn now_has_fixed_width() {
        let stamp = BuildStamp::now();
        assert_eq!(stamp.date.len(), 10);
        assert_eq!(stamp.time.len(), 10);
        assert!(stamp.date.starts_with('"') && stamp.date.ends_with('"'));
    }
}
