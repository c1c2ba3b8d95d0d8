//! Canonical course items and the pure stages that produce them.
//!
//! Everything under `course` is free of I/O: records come in as JSON maps,
//! items come out as plain values, and "now" is always handed in.

pub mod date;
pub mod filter;
pub mod image;
pub mod mapper;
pub mod payload;
pub mod sort;

use chrono::NaiveDate;
use serde::Serialize;

/// One upstream CMS record. Keys and value types vary between records.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A `YYYY-MM-DD` start date. Only `date::DateResolver` builds these; the
/// day/month are not checked against the calendar.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StartDate(String);

impl StartDate {
    pub(crate) fn from_parts(year: &str, month: &str, day: &str) -> Self {
        StartDate(format!("{year}-{month:0>2}-{day:0>2}"))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// The real calendar date, when the string names one.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }

    // Both sides are zero-padded YYYY-MM-DD, so string order is date order.
    pub fn is_before(&self, day: NaiveDate) -> bool {
        self.0.as_str() < day.format("%Y-%m-%d").to_string().as_str()
    }
}

impl std::fmt::Display for StartDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseItem {
    pub title: String,
    pub link: String,
    pub image: Option<String>,
    pub date_start: Option<StartDate>,
    pub lieu_et_date: Option<String>,
    pub nb_jours: Option<String>,
    pub prix: Option<String>,
    pub complet: bool,
    pub visible: bool,
    pub order: Option<f64>,
    pub raw_description_html: Option<String>,
    pub tags: Vec<String>,
}

/// Per-run knobs for the item stages of the pipeline.
#[derive(Clone, Debug)]
pub struct ItemOptions {
    pub site_url: String,
    pub media_host: String,
    pub limit: usize,
    pub filter: filter::FilterOptions,
    pub prefer_explicit_order: bool,
    pub show_completion: bool,
}
