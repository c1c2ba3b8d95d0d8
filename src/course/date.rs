use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::StartDate;

// "du 08/09 au 19/09/2025"
static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)du\s+(\d{1,2})[/.](\d{1,2})\s+au\s+(\d{1,2})[/.](\d{1,2})[/.](\d{4})").unwrap()
});
static ISO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").unwrap());
// structured values: a date, optionally followed by a time part
static STRUCTURED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[T ]|$)").unwrap());

/// Pulls a start date out of free text, falling back to a structured field.
#[derive(Clone, Copy, Debug)]
pub struct DateResolver {
    current_year: i32,
}

impl DateResolver {
    /// `current_year` fills in dates written without a year ("19/09").
    pub fn new(current_year: i32) -> Self { Self { current_year } }

    /// `structured` holds candidate values in preference order; the first
    /// one shaped like a date wins.
    pub fn resolve<'v>(&self, text: Option<&str>, structured: impl IntoIterator<Item = &'v Value>) -> Option<StartDate> {
        text.and_then(|t| self.from_text(t))
            .or_else(|| structured.into_iter().find_map(from_structured))
    }

    pub fn from_text(&self, text: &str) -> Option<StartDate> {
        if let Some(c) = RANGE.captures(text) {
            return Some(StartDate::from_parts(&c[5], &c[2], &c[1]));
        }
        if let Some(c) = ISO.captures(text) {
            return Some(StartDate::from_parts(&c[1], &c[2], &c[3]));
        }
        if let Some(c) = DAY_MONTH_YEAR.captures(text) {
            return Some(StartDate::from_parts(&c[3], &c[2], &c[1]));
        }
        if let Some(c) = DAY_MONTH.captures(text) {
            let year = self.current_year.to_string();
            return Some(StartDate::from_parts(&year, &c[2], &c[1]));
        }
        None
    }
}

fn from_structured(value: &Value) -> Option<StartDate> {
    let s = match value {
        Value::String(s) => s.trim(),
        // Wix date objects: {"$date": "2025-09-08T00:00:00.000Z"}
        Value::Object(map) => map.get("$date")?.as_str()?.trim(),
        _ => return None,
    };
    let c = STRUCTURED.captures(s)?;
    Some(StartDate::from_parts(&c[1], &c[2], &c[3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(text: &str) -> Option<String> {
        DateResolver::new(2031).from_text(text).map(|d| d.as_str().to_string())
    }

    #[test]
    fn range_takes_first_day_with_trailing_year() {
        assert_eq!(resolve("du 08/09 au 19/09/2025").as_deref(), Some("2025-09-08"));
        assert_eq!(resolve("Paris, Du 8.9 au 19.9.2025").as_deref(), Some("2025-09-08"));
    }

    #[test]
    fn iso_substring_anywhere() {
        assert_eq!(resolve("2025-09-08 quelque chose").as_deref(), Some("2025-09-08"));
        assert_eq!(resolve("début le 2026-01-15, Lyon").as_deref(), Some("2026-01-15"));
    }

    #[test]
    fn day_month_year() {
        assert_eq!(resolve("19/09/2025").as_deref(), Some("2025-09-19"));
        assert_eq!(resolve("le 3/2/2026 à Nantes").as_deref(), Some("2026-02-03"));
    }

    #[test]
    fn day_month_uses_current_year() {
        assert_eq!(resolve("19/09").as_deref(), Some("2031-09-19"));
    }

    #[test]
    fn no_date_is_absent() {
        assert_eq!(resolve("no date here"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn invalid_calendar_dates_still_match() {
        assert_eq!(resolve("31/02/2025").as_deref(), Some("2025-02-31"));
    }

    #[test]
    fn structured_field_is_the_last_resort() {
        let r = DateResolver::new(2031);
        let structured = json!("2025-10-01");
        assert_eq!(r.resolve(Some("sans date"), Some(&structured)).unwrap().as_str(), "2025-10-01");
        assert_eq!(r.resolve(Some("19/09/2025"), Some(&structured)).unwrap().as_str(), "2025-09-19");
        assert_eq!(r.resolve(None, Some(&json!("2025-10-01T09:00:00.000Z"))).unwrap().as_str(), "2025-10-01");
        assert_eq!(r.resolve(None, Some(&json!({"$date": "2025-11-02T00:00:00Z"}))).unwrap().as_str(), "2025-11-02");
        assert!(r.resolve(None, Some(&json!("demain"))).is_none());
        assert!(r.resolve(None, Some(&json!(1757289600000u64))).is_none());
        assert!(r.resolve(None, None).is_none());
    }
}
