use anyhow::{Result, anyhow};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone used to decide what "today" is and to stamp pubDate values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Local,
    Named(Tz),
}

impl Zone {
    // Accepts "local" (or empty) and IANA names like "Europe/Paris".
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|e| anyhow!("unknown timezone {s:?}: {e}"))
    }
}

/// The pipeline's only source of "now". Built once per run and passed down,
/// so tests can pin it.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    now: DateTime<Utc>,
    zone: Zone,
}

impl Clock {
    pub fn system(zone: Zone) -> Self {
        Self::fixed(Utc::now(), zone)
    }

    pub fn fixed(now: DateTime<Utc>, zone: Zone) -> Self {
        Self { now, zone }
    }

    pub fn today(&self) -> NaiveDate {
        match self.zone {
            Zone::Local => self.now.with_timezone(&Local).date_naive(),
            Zone::Named(tz) => self.now.with_timezone(&tz).date_naive(),
        }
    }

    pub fn current_year(&self) -> i32 { self.today().year() }

    pub fn now_rfc2822(&self) -> String {
        match self.zone {
            Zone::Local => self.now.with_timezone(&Local).to_rfc2822(),
            Zone::Named(tz) => self.now.with_timezone(&tz).to_rfc2822(),
        }
    }

    // Midnight of `date` in the clock's zone. None when that instant does not
    // exist locally (DST gap at midnight).
    pub fn midnight_rfc2822(&self, date: NaiveDate) -> Option<String> {
        let naive = date.and_hms_opt(0, 0, 0)?;
        match self.zone {
            Zone::Local => Local.from_local_datetime(&naive).earliest().map(|dt| dt.to_rfc2822()),
            Zone::Named(tz) => tz.from_local_datetime(&naive).earliest().map(|dt| dt.to_rfc2822()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn zone_parse_accepts_local_and_iana() {
        assert_eq!(Zone::parse("local").unwrap(), Zone::Local);
        assert_eq!(Zone::parse("").unwrap(), Zone::Local);
        assert_eq!(Zone::parse("Europe/Paris").unwrap(), Zone::Named(chrono_tz::Europe::Paris));
        assert!(Zone::parse("Mars/Olympus").is_err());
    }

    #[test]
    fn today_follows_the_configured_zone() {
        // 23:30 UTC is already the next day in Paris
        let now = at("2025-09-18T23:30:00Z");
        let utc = Clock::fixed(now, Zone::Named(chrono_tz::UTC));
        let paris = Clock::fixed(now, Zone::Named(chrono_tz::Europe::Paris));
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2025, 9, 18).unwrap());
        assert_eq!(paris.today(), NaiveDate::from_ymd_opt(2025, 9, 19).unwrap());
        assert_eq!(paris.current_year(), 2025);
    }

    #[test]
    fn midnight_is_rendered_with_zone_offset() {
        let clock = Clock::fixed(at("2025-01-01T00:00:00Z"), Zone::Named(chrono_tz::Europe::Paris));
        let d = NaiveDate::from_ymd_opt(2025, 9, 19).unwrap();
        assert_eq!(clock.midnight_rfc2822(d).unwrap(), "Fri, 19 Sep 2025 00:00:00 +0200");
    }

    #[test]
    fn now_is_pinned() {
        let clock = Clock::fixed(at("2025-10-14T12:00:00Z"), Zone::Named(chrono_tz::UTC));
        assert_eq!(clock.now_rfc2822(), "Tue, 14 Oct 2025 12:00:00 +0000");
    }
}
