use serde_json::Value;

use super::date::DateResolver;
use super::image::normalize_image;
use super::{CourseItem, RawRecord};

pub const DEFAULT_TITLE: &str = "Formation";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Title,
    Link,
    Image,
    DateStart,
    LieuEtDate,
    NbJours,
    Prix,
    Complet,
    Visible,
    Order,
    RawHtml,
    Tags,
}

/// Upstream keys accepted for one canonical field, most specific first.
#[derive(Copy, Clone, Debug)]
pub struct FieldRule {
    pub field: Field,
    pub keys: &'static [&'static str],
}

pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule { field: Field::Title, keys: &["title", "Titre", "titre", "name", "nom"] },
    FieldRule { field: Field::Link, keys: &["link", "url", "href", "lien"] },
    FieldRule { field: Field::Image, keys: &["image", "nouveauChamp", "imageUrl", "photo"] },
    FieldRule { field: Field::DateStart, keys: &["dateStart", "startDate", "date"] },
    FieldRule { field: Field::LieuEtDate, keys: &["lieuEtDate", "dates", "lieu"] },
    FieldRule { field: Field::NbJours, keys: &["nbJours", "nbDeJoursheures", "duree"] },
    FieldRule { field: Field::Prix, keys: &["prix", "price", "tarif"] },
    FieldRule { field: Field::Complet, keys: &["complet", "full", "soldOut"] },
    FieldRule { field: Field::Visible, keys: &["visible", "isVisible", "published"] },
    FieldRule { field: Field::Order, keys: &["order", "ordre", "position"] },
    FieldRule { field: Field::RawHtml, keys: &["rssHtml", "descriptionHtml", "html"] },
    FieldRule { field: Field::Tags, keys: &["tags", "categories", "categorie"] },
];

pub fn keys_for(field: Field) -> &'static [&'static str] {
    FIELD_RULES
        .iter()
        .find(|r| r.field == field)
        .map(|r| r.keys)
        .unwrap_or(&[])
}

/// Maps loosely-shaped CMS records onto [`CourseItem`].
pub struct FieldMapper<'a> {
    site_url: &'a str,
    media_host: &'a str,
    dates: DateResolver,
}

impl<'a> FieldMapper<'a> {
    pub fn new(site_url: &'a str, media_host: &'a str, dates: DateResolver) -> Self {
        Self { site_url, media_host, dates }
    }

    pub fn map(&self, record: &RawRecord) -> CourseItem {
        let title = lookup(record, Field::Title, as_text).unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let link = lookup(record, Field::Link, as_text).unwrap_or_else(|| self.site_url.to_string());
        let image = lookup(record, Field::Image, |v| {
            v.as_str().and_then(|s| normalize_image(s, self.media_host))
        });
        let lieu_et_date = lookup(record, Field::LieuEtDate, as_text);
        let date_start = self.dates.resolve(lieu_et_date.as_deref(), candidates(record, Field::DateStart));

        CourseItem {
            title,
            link,
            image,
            date_start,
            lieu_et_date,
            nb_jours: lookup(record, Field::NbJours, as_text),
            prix: lookup(record, Field::Prix, as_text),
            complet: lookup(record, Field::Complet, as_flag).unwrap_or(false),
            visible: lookup(record, Field::Visible, as_flag).unwrap_or(true),
            order: lookup(record, Field::Order, as_order),
            raw_description_html: lookup(record, Field::RawHtml, |v| v.as_str().map(str::to_string)),
            tags: lookup(record, Field::Tags, |v| Some(as_tags(v)).filter(|t| !t.is_empty())).unwrap_or_default(),
        }
    }
}

/// Present, non-empty values for `field`, in key order.
pub fn candidates<'r>(record: &'r RawRecord, field: Field) -> impl Iterator<Item = &'r Value> + 'r {
    keys_for(field)
        .iter()
        .filter_map(move |k| record.get(*k))
        .filter(|v| !is_empty(v))
}

/// First candidate `coerce` accepts. A value of the wrong shape falls through
/// to the next key.
pub fn lookup<'r, T>(record: &'r RawRecord, field: Field, coerce: impl FnMut(&'r Value) -> Option<T>) -> Option<T> {
    candidates(record, field).find_map(coerce)
}

fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_flag(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "oui" | "yes" | "1" => Some(true),
            "false" | "non" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_order(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn as_tags(v: &Value) -> Vec<String> {
    match v {
        Value::Array(a) => a.iter().filter_map(as_text).filter(|t| !t.is_empty()).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
