use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use url::Url;

use crate::course::RawRecord;
use crate::course::payload;

// Likely per-course containers, most specific first.
const CONTAINERS: &[&str] = &[
    "[data-course]",
    ".course",
    ".formation",
    "article",
    "[role=listitem]",
    "li",
];

const HEADINGS: &str = "h1, h2, h3, h4, [data-title]";

/// Best-effort records from a listing page. Returns an empty list when the
/// page has no recognisable structure.
pub fn scrape_records(html: &str, base: Option<&Url>) -> Vec<RawRecord> {
    let doc = Html::parse_document(html);

    // pages that ship their data as JSON are the easy case
    if let Some(records) = embedded_json(&doc) {
        return records;
    }

    for sel in CONTAINERS.iter() {
        let records = scrape_with_selector(&doc, sel, base);
        if !records.is_empty() {
            tracing::debug!(selector = *sel, count = records.len(), "scraped records");
            return records;
        }
    }
    Vec::new()
}

fn embedded_json(doc: &Html) -> Option<Vec<RawRecord>> {
    let sel = Selector::parse(r#"script[type="application/json"]"#).ok()?;
    doc.select(&sel).find_map(|node| {
        let text = node.text().collect::<String>();
        payload::parse_records(text.trim()).ok().filter(|r| !r.is_empty())
    })
}

fn scrape_with_selector(doc: &Html, selector: &str, base: Option<&Url>) -> Vec<RawRecord> {
    let Ok(sel) = Selector::parse(selector) else { return Vec::new() };
    doc.select(&sel).filter_map(|node| record_from(node, base)).collect()
}

fn record_from(node: ElementRef<'_>, base: Option<&Url>) -> Option<RawRecord> {
    let title = first_text(node, HEADINGS)?;
    let mut rec = Map::new();
    rec.insert("title".into(), Value::String(title));

    if let Some(href) = first_attr(node, "a[href]", "href") {
        rec.insert("link".into(), Value::String(resolve(base, &href)));
    }
    if let Some(src) = first_attr(node, "img[src]", "src").or_else(|| first_attr(node, "img[data-src]", "data-src")) {
        rec.insert("image".into(), Value::String(resolve(base, &src)));
    }

    let text = collapse_whitespace(&node.text().collect::<String>());
    if !text.is_empty() {
        rec.insert("lieuEtDate".into(), Value::String(text));
    }

    // data-order="2" → "order": "2", so the field table picks them up
    for (name, value) in node.value().attrs() {
        if let Some(key) = name.strip_prefix("data-") {
            if key != "course" && !value.trim().is_empty() {
                rec.entry(key.to_string()).or_insert_with(|| Value::String(value.trim().to_string()));
            }
        }
    }
    Some(rec)
}

fn first_text(node: ElementRef<'_>, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let found = node.select(&sel).next()?;
    let s = collapse_whitespace(&found.text().collect::<String>());
    if s.is_empty() { None } else { Some(s) }
}

fn first_attr(node: ElementRef<'_>, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let v = node.select(&sel).next()?.value().attr(attr)?.trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}

fn resolve(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
