use anyhow::{Context, Result};
use rss::{Category, CategoryBuilder, Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, Item, ItemBuilder};

use super::description::Description;
use crate::course::CourseItem;
use crate::course::image::enclosure_mime;
use crate::util::time::Clock;

pub const DEFAULT_FEED_TITLE: &str = "Formations";
pub const DEFAULT_FEED_DESCRIPTION: &str = "Flux des formations (CMS).";
pub const DEFAULT_LANGUAGE: &str = "fr-FR";
const GENERATOR: &str = concat!("course-feed ", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
}

impl ChannelMeta {
    /// Blank fields replaced by defaults; `site_url` stands in for the link.
    pub fn with_defaults(&self, site_url: &str) -> ChannelMeta {
        fn or(v: &str, d: &str) -> String {
            if v.trim().is_empty() { d.to_string() } else { v.trim().to_string() }
        }
        ChannelMeta {
            title: or(&self.title, DEFAULT_FEED_TITLE),
            link: or(&self.link, site_url),
            description: or(&self.description, DEFAULT_FEED_DESCRIPTION),
            language: or(&self.language, DEFAULT_LANGUAGE),
        }
    }
}

pub struct FeedBuilder<'a> {
    meta: &'a ChannelMeta,
    clock: &'a Clock,
    show_completion: bool,
}

impl<'a> FeedBuilder<'a> {
    pub fn new(meta: &'a ChannelMeta, clock: &'a Clock, show_completion: bool) -> Self {
        Self { meta, clock, show_completion }
    }

    pub fn channel(&self, items: &[CourseItem]) -> Channel {
        ChannelBuilder::default()
            .title(self.meta.title.clone())
            .link(self.meta.link.clone())
            .description(self.meta.description.clone())
            .language(Some(self.meta.language.clone()))
            .generator(Some(GENERATOR.to_string()))
            .items(items.iter().map(|it| self.item(it)).collect::<Vec<_>>())
            .build()
    }

    /// Pretty-printed RSS 2.0 document, XML declaration included.
    pub fn render(&self, items: &[CourseItem]) -> Result<String> {
        let buf = self
            .channel(items)
            .pretty_write_to(Vec::new(), b' ', 2)
            .context("serializing RSS channel")?;
        String::from_utf8(buf).context("RSS output is not UTF-8")
    }

    fn item(&self, it: &CourseItem) -> Item {
        let pub_date = it
            .date_start
            .as_ref()
            .and_then(|d| d.to_naive())
            .and_then(|d| self.clock.midnight_rfc2822(d))
            .unwrap_or_else(|| self.clock.now_rfc2822());

        let enclosure = it.image.as_ref().map(|url| {
            EnclosureBuilder::default()
                .url(url.clone())
                .length("0".to_string())
                .mime_type(enclosure_mime(url))
                .build()
        });

        let categories: Vec<Category> = it
            .tags
            .iter()
            .map(|t| CategoryBuilder::default().name(t.clone()).build())
            .collect();

        ItemBuilder::default()
            .title(Some(it.title.clone()))
            .link(Some(it.link.clone()))
            .guid(Some(GuidBuilder::default().value(it.link.clone()).permalink(true).build()))
            .pub_date(Some(pub_date))
            .description(Some(Description::for_item(it, self.show_completion).render()))
            .enclosure(enclosure)
            .categories(categories)
            .build()
    }
}
