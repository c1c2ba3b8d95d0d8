use std::cmp::Ordering;

use super::CourseItem;

/// Stand-in for a missing explicit order; such items go after ordered ones.
pub const ORDER_SENTINEL: f64 = f64::MAX;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortKey {
    ExplicitOrder,
    StartDate,
}

pub fn sort_key_for(items: &[CourseItem], prefer_explicit_order: bool) -> SortKey {
    if prefer_explicit_order && items.iter().any(|i| i.order.is_some()) {
        SortKey::ExplicitOrder
    } else {
        SortKey::StartDate
    }
}

/// Stable sort; ties (and items with neither key) keep their input order.
pub fn sort_items(mut items: Vec<CourseItem>, prefer_explicit_order: bool) -> Vec<CourseItem> {
    match sort_key_for(&items, prefer_explicit_order) {
        SortKey::ExplicitOrder => items.sort_by(|a, b| {
            a.order.unwrap_or(ORDER_SENTINEL).total_cmp(&b.order.unwrap_or(ORDER_SENTINEL))
        }),
        SortKey::StartDate => items.sort_by(|a, b| match (&a.date_start, &b.date_start) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
    items
}

/// Keeps the first `limit` items; 0 means no limit.
pub fn truncate(mut items: Vec<CourseItem>, limit: usize) -> Vec<CourseItem> {
    if limit > 0 {
        items.truncate(limit);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::testing::{dated, item};

    fn ordered(title: &str, order: f64) -> CourseItem { CourseItem { order: Some(order), ..item(title) } }

    fn titles(items: &[CourseItem]) -> Vec<&str> { items.iter().map(|i| i.title.as_str()).collect() }

    #[test]
    fn explicit_order_ascending_with_stable_ties() {
        let out = sort_items(vec![ordered("c", 3.0), ordered("a1", 1.0), ordered("b", 2.0), ordered("a2", 1.0)], true);
        assert_eq!(titles(&out), vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn unordered_items_sort_after_ordered_ones() {
        let out = sort_items(vec![dated("early", "2020-01-01"), ordered("second", 2.0), item("plain"), ordered("first", -1.0)], true);
        assert_eq!(titles(&out), vec!["first", "second", "early", "plain"]);
    }

    #[test]
    fn dates_when_no_order_present() {
        let out = sort_items(vec![item("none"), dated("b", "2025-10-01"), dated("a", "2025-09-08"), item("none2")], true);
        assert_eq!(titles(&out), vec!["a", "b", "none", "none2"]);
    }

    #[test]
    fn order_ignored_when_not_preferred() {
        let items = vec![CourseItem { order: Some(1.0), ..dated("late", "2026-01-01") }, dated("soon", "2025-01-01")];
        assert_eq!(sort_key_for(&items, false), SortKey::StartDate);
        assert_eq!(titles(&sort_items(items, false)), vec!["soon", "late"]);
    }

    #[test]
    fn input_order_kept_without_any_key() {
        let out = sort_items(vec![item("x"), item("y"), item("z")], true);
        assert_eq!(titles(&out), vec!["x", "y", "z"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let items = vec![dated("b", "2025-10-01"), item("n"), dated("a", "2025-09-08"), dated("a-bis", "2025-09-08")];
        let once = sort_items(items, true);
        let twice = sort_items(once.clone(), true);
        assert_eq!(once, twice);
    }

    #[test]
    fn truncate_limits_and_zero_is_unlimited() {
        let items = vec![item("a"), item("b"), item("c")];
        assert_eq!(truncate(items.clone(), 2).len(), 2);
        assert_eq!(truncate(items.clone(), 0).len(), 3);
        assert_eq!(truncate(items, 10).len(), 3);
    }
}
