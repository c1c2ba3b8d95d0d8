use chrono::NaiveDate;

use super::CourseItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOptions {
    pub only_visible: bool,
    pub only_upcoming: bool,
    pub exclude_complete: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self { only_visible: true, only_upcoming: false, exclude_complete: false }
    }
}

pub struct ItemFilter {
    opts: FilterOptions,
    today: NaiveDate,
}

impl ItemFilter {
    pub fn new(opts: FilterOptions, today: NaiveDate) -> Self { Self { opts, today } }

    pub fn keeps(&self, item: &CourseItem) -> bool {
        if self.opts.only_visible && !item.visible { return false; }
        if self.opts.exclude_complete && item.complet { return false; }
        if self.opts.only_upcoming {
            // undated items cannot be judged and stay in
            if let Some(d) = &item.date_start {
                if d.is_before(self.today) { return false; }
            }
        }
        true
    }

    pub fn apply(&self, items: Vec<CourseItem>) -> Vec<CourseItem> {
        items.into_iter().filter(|it| self.keeps(it)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::testing::{dated, item};

    fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 9, 10).unwrap() }

    fn titles(items: &[CourseItem]) -> Vec<&str> { items.iter().map(|i| i.title.as_str()).collect() }

    fn sample() -> Vec<CourseItem> {
        vec![
            dated("Past", "2025-09-09"),
            dated("Today", "2025-09-10"),
            dated("Later", "2026-01-01"),
            item("Undated"),
            CourseItem { visible: false, ..item("Hidden") },
            CourseItem { complet: true, ..dated("Full", "2025-12-01") },
        ]
    }

    #[test]
    fn no_predicates_keeps_everything() {
        let opts = FilterOptions { only_visible: false, only_upcoming: false, exclude_complete: false };
        assert_eq!(ItemFilter::new(opts, today()).apply(sample()).len(), 6);
    }

    #[test]
    fn only_visible_drops_hidden() {
        let out = ItemFilter::new(FilterOptions::default(), today()).apply(sample());
        assert!(!titles(&out).contains(&"Hidden"));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn only_upcoming_never_returns_past_items() {
        let opts = FilterOptions { only_visible: false, only_upcoming: true, exclude_complete: false };
        let out = ItemFilter::new(opts, today()).apply(sample());
        assert_eq!(titles(&out), vec!["Today", "Later", "Undated", "Hidden", "Full"]);
        assert!(out.iter().all(|i| i.date_start.as_ref().is_none_or(|d| !d.is_before(today()))));
    }

    #[test]
    fn exclude_complete_drops_full_sessions() {
        let opts = FilterOptions { only_visible: false, only_upcoming: false, exclude_complete: true };
        let out = ItemFilter::new(opts, today()).apply(sample());
        assert!(!titles(&out).contains(&"Full"));
    }

    #[test]
    fn predicates_combine() {
        let opts = FilterOptions { only_visible: true, only_upcoming: true, exclude_complete: true };
        let out = ItemFilter::new(opts, today()).apply(sample());
        assert_eq!(titles(&out), vec!["Today", "Later", "Undated"]);
    }
}
