//! Backend Timestamps
//!
//! The backend writes `datetime.now().isoformat()` (no offset) but older
//! records and other deployments carry full RFC 3339 stamps. Both are kept
//! as received so calendar dates can be derived without guessing an offset.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Carries an explicit offset
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time of the backend host
    Naive(NaiveDateTime),
}

impl Timestamp {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(Self::Zoned(dt));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(Self::Naive)
    }

    /// Instant in UTC. Naive stamps are read as local wall time.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Zoned(dt) => dt.with_timezone(&Utc),
            Self::Naive(naive) => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(naive)),
        }
    }

    /// Calendar date as seen from `tz`
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        match self {
            Self::Zoned(dt) => dt.with_timezone(tz).date_naive(),
            Self::Naive(naive) => naive.date(),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_isoformat() {
        let ts = Timestamp::parse("2025-01-06T14:03:22.512345").unwrap();
        assert!(matches!(ts, Timestamp::Naive(_)));
        assert_eq!(ts.date_in(&Utc), NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_shifts_date_by_zone() {
        let ts = Timestamp::parse("2025-01-06T23:30:00Z").unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(ts.date_in(&Utc), NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(ts.date_in(&plus_two), NaiveDate::from_ymd_opt(2025, 1, 7).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Timestamp::parse(""), None);
        assert_eq!(Timestamp::parse("yesterday"), None);
    }
}
