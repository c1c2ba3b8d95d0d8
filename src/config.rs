use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::course::ItemOptions;
use crate::course::filter::FilterOptions;
use crate::course::image::DEFAULT_MEDIA_HOST;
use crate::ingestion::fetch::FetchConfig;
use crate::ingestion::retry::RetryPolicy;
use crate::render::feed::{ChannelMeta, DEFAULT_LANGUAGE};
use crate::util::time::Zone;

const DEFAULT_SITE_URL: &str = "https://www.tissual-balancing.com";
const DEFAULT_TITLE: &str = "Tissual Balancing® – Formations";
const DEFAULT_DESCRIPTION: &str = "Flux des formations (CMS).";
const DEFAULT_LIMIT: usize = 0;
const DEFAULT_OUTPUT: &str = "docs/rss.xml";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub source_url: Option<String>,
    pub channel: ChannelMeta,
    pub items: ItemOptions,
    pub output: PathBuf,
    pub zone: Zone,
    pub fetch: FetchConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            channel: ChannelMeta {
                title: DEFAULT_TITLE.to_string(),
                link: DEFAULT_SITE_URL.to_string(),
                description: DEFAULT_DESCRIPTION.to_string(),
                language: DEFAULT_LANGUAGE.to_string(),
            },
            items: ItemOptions {
                site_url: DEFAULT_SITE_URL.to_string(),
                media_host: DEFAULT_MEDIA_HOST.to_string(),
                limit: DEFAULT_LIMIT,
                filter: FilterOptions::default(),
                prefer_explicit_order: true,
                show_completion: false,
            },
            output: PathBuf::from(DEFAULT_OUTPUT),
            zone: Zone::Local,
            fetch: FetchConfig {
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                retry: RetryPolicy::default(),
            },
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from any key lookup; unset keys keep defaults,
    /// unparsable numbers/booleans are ignored with a warning.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        cfg.source_url = get("SOURCE_URL");
        if let Some(site) = get("SITE_URL") {
            cfg.channel.link = site.clone();
            cfg.items.site_url = site;
        }
        if let Some(v) = get("RSS_TITLE") { cfg.channel.title = v; }
        if let Some(v) = get("RSS_DESCRIPTION") { cfg.channel.description = v; }
        if let Some(v) = get("RSS_LANGUAGE") { cfg.channel.language = v; }
        if let Some(v) = get("RSS_OUTPUT") { cfg.output = PathBuf::from(v); }
        if let Some(v) = get("RSS_MEDIA_HOST") { cfg.items.media_host = v; }
        if let Some(v) = get("RSS_TIMEZONE") { cfg.zone = Zone::parse(&v)?; }

        if let Some(n) = parse_num::<usize>("RSS_LIMIT", get("RSS_LIMIT")) { cfg.items.limit = n; }
        if let Some(n) = parse_num::<u64>("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS")) {
            cfg.fetch.timeout = Duration::from_secs(n);
        }
        if let Some(n) = parse_num::<u32>("FETCH_RETRIES", get("FETCH_RETRIES")) { cfg.fetch.retry.max_retries = n; }

        let flags: [(&str, &mut bool); 5] = [
            ("RSS_ONLY_VISIBLE", &mut cfg.items.filter.only_visible),
            ("RSS_ONLY_UPCOMING", &mut cfg.items.filter.only_upcoming),
            ("RSS_EXCLUDE_COMPLETE", &mut cfg.items.filter.exclude_complete),
            ("RSS_PREFER_EXPLICIT_ORDER", &mut cfg.items.prefer_explicit_order),
            ("RSS_SHOW_COMPLETION", &mut cfg.items.show_completion),
        ];
        for (key, slot) in flags {
            if let Some(v) = get(key) {
                match parse_bool(&v) {
                    Some(b) => *slot = b,
                    None => tracing::warn!(key, value = %v, "ignoring invalid boolean"),
                }
            }
        }

        Ok(cfg)
    }
}

pub fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, v: Option<String>) -> Option<T> {
    let v = v?;
    match v.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = %v, "ignoring invalid number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<FeedConfig> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        FeedConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.source_url, None);
        assert_eq!(c.channel.language, "fr-FR");
        assert_eq!(c.items.limit, 0);
        assert_eq!(c.output, PathBuf::from("docs/rss.xml"));
        assert!(c.items.filter.only_visible);
        assert!(!c.items.filter.only_upcoming);
        assert!(c.items.prefer_explicit_order);
        assert_eq!(c.zone, Zone::Local);
        assert_eq!(c.fetch.timeout, Duration::from_secs(20));
    }

    #[test]
    fn env_values_override_defaults() {
        let c = cfg(&[
            ("SOURCE_URL", "https://cms.test/api"),
            ("SITE_URL", "https://site.test"),
            ("RSS_TITLE", "Stages"),
            ("RSS_LIMIT", "25"),
            ("RSS_ONLY_UPCOMING", "yes"),
            ("RSS_PREFER_EXPLICIT_ORDER", "off"),
            ("RSS_TIMEZONE", "Europe/Paris"),
            ("FETCH_RETRIES", "5"),
        ])
        .unwrap();
        assert_eq!(c.source_url.as_deref(), Some("https://cms.test/api"));
        assert_eq!(c.channel.link, "https://site.test");
        assert_eq!(c.items.site_url, "https://site.test");
        assert_eq!(c.channel.title, "Stages");
        assert_eq!(c.items.limit, 25);
        assert!(c.items.filter.only_upcoming);
        assert!(!c.items.prefer_explicit_order);
        assert_eq!(c.zone, Zone::Named(chrono_tz::Europe::Paris));
        assert_eq!(c.fetch.retry.max_retries, 5);
    }

    #[test]
    fn invalid_values_are_ignored_blank_values_unset() {
        let c = cfg(&[("RSS_LIMIT", "lots"), ("RSS_ONLY_VISIBLE", "maybe"), ("RSS_TITLE", "  ")]).unwrap();
        assert_eq!(c.items.limit, 0);
        assert!(c.items.filter.only_visible);
        assert_eq!(c.channel.title, DEFAULT_TITLE);
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert!(cfg(&[("RSS_TIMEZONE", "Nowhere/Land")]).is_err());
    }
}
