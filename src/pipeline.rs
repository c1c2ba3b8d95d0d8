//! raw records → canonical items → filter → sort → limit → RSS.
//!
//! Pure: the caller supplies configuration and the clock.

use anyhow::Result;
use serde::Serialize;

use crate::course::date::DateResolver;
use crate::course::filter::ItemFilter;
use crate::course::mapper::FieldMapper;
use crate::course::sort::{self, SortKey};
use crate::course::{CourseItem, ItemOptions, RawRecord};
use crate::render::feed::{ChannelMeta, FeedBuilder};
use crate::util::time::Clock;

#[derive(Debug, Clone, Serialize)]
pub struct Counts {
    pub records: usize,
    pub kept: usize,
    pub emitted: usize,
    pub sort_key: &'static str,
}

pub struct Prepared {
    pub items: Vec<CourseItem>,
    pub counts: Counts,
}

pub struct Rendered {
    pub xml: String,
    pub items: Vec<CourseItem>,
    pub counts: Counts,
}

pub fn map_records(records: &[RawRecord], opts: &ItemOptions, clock: &Clock) -> Vec<CourseItem> {
    let mapper = FieldMapper::new(&opts.site_url, &opts.media_host, DateResolver::new(clock.current_year()));
    records.iter().map(|r| mapper.map(r)).collect()
}

pub fn prepare(records: &[RawRecord], opts: &ItemOptions, clock: &Clock) -> Prepared {
    let mapped = map_records(records, opts, clock);
    let kept = ItemFilter::new(opts.filter, clock.today()).apply(mapped);
    let kept_len = kept.len();
    let key = sort::sort_key_for(&kept, opts.prefer_explicit_order);
    let items = sort::truncate(sort::sort_items(kept, opts.prefer_explicit_order), opts.limit);
    let counts = Counts {
        records: records.len(),
        kept: kept_len,
        emitted: items.len(),
        sort_key: match key {
            SortKey::ExplicitOrder => "order",
            SortKey::StartDate => "date_start",
        },
    };
    Prepared { items, counts }
}

/// Serializes already prepared items; blank channel fields get defaults.
pub fn render_items(items: &[CourseItem], meta: &ChannelMeta, opts: &ItemOptions, clock: &Clock) -> Result<String> {
    let meta = meta.with_defaults(&opts.site_url);
    FeedBuilder::new(&meta, clock, opts.show_completion).render(items)
}

/// The whole pipeline in one call: prepared items, their counts and the XML.
pub fn render(records: &[RawRecord], meta: &ChannelMeta, opts: &ItemOptions, clock: &Clock) -> Result<Rendered> {
    let Prepared { items, counts } = prepare(records, opts, clock);
    let xml = render_items(&items, meta, opts, clock)?;
    Ok(Rendered { xml, items, counts })
}

/// Zero-item document written when the upstream could not be read.
pub fn render_fallback(meta: &ChannelMeta, opts: &ItemOptions, clock: &Clock) -> Result<String> {
    render_items(&[], meta, opts, clock)
}
