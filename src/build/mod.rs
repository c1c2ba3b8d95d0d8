use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::config::FeedConfig;
use crate::ingestion::{self, Source};
use crate::output::types::Meta;
use crate::pipeline;
use crate::publish;
use crate::telemetry;
use crate::telemetry::ops::build::Phase as BuildPhase;
use crate::util::time::{Clock, Zone};

mod types;

/// Where the course listing comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Listing endpoint, overrides SOURCE_URL
    #[arg(long)]
    pub source: Option<String>,
    /// Read a local JSON or HTML file instead of fetching
    #[arg(long, conflicts_with = "source")]
    pub input: Option<PathBuf>,
}

impl SourceArgs {
    pub fn resolve(&self, cfg: &FeedConfig) -> Result<Source> {
        if let Some(path) = &self.input {
            return Ok(Source::File(path.clone()));
        }
        match self.source.clone().or_else(|| cfg.source_url.clone()) {
            Some(url) => Ok(Source::Url(url)),
            None => bail!("no source: pass --source/--input or set SOURCE_URL"),
        }
    }
}

/// `course-feed build ...`
#[derive(Args, Debug)]
pub struct BuildCmd {
    #[command(flatten)]
    pub source: SourceArgs,
    #[arg(long)] pub output: Option<PathBuf>,
    /// Maximum number of items, 0 for no limit
    #[arg(long)] pub limit: Option<usize>,
    #[arg(long)] pub only_upcoming: bool,
    #[arg(long)] pub exclude_complete: bool,
    /// Keep items flagged as not visible
    #[arg(long)] pub include_hidden: bool,
    /// Sort by start date even when items carry an explicit order
    #[arg(long)] pub ignore_order: bool,
    #[arg(long)] pub show_completion: bool,
    /// IANA timezone ("Europe/Paris") or "local"
    #[arg(long)] pub timezone: Option<String>,
    /// Print the feed instead of writing it
    #[arg(long, default_value_t = false)] pub stdout: bool,
    #[arg(long, default_value_t = false)] pub apply: bool,
    /// Exit with an error when the fallback feed had to be used
    #[arg(long, default_value_t = false)] pub strict: bool,
    #[arg(long, default_value_t = 5)] pub plan_limit: usize,
}

impl BuildCmd {
    fn apply_to(&self, cfg: &mut FeedConfig) -> Result<()> {
        if let Some(p) = &self.output { cfg.output = p.clone(); }
        if let Some(n) = self.limit { cfg.items.limit = n; }
        if self.only_upcoming { cfg.items.filter.only_upcoming = true; }
        if self.exclude_complete { cfg.items.filter.exclude_complete = true; }
        if self.include_hidden { cfg.items.filter.only_visible = false; }
        if self.ignore_order { cfg.items.prefer_explicit_order = false; }
        if self.show_completion { cfg.items.show_completion = true; }
        if let Some(tz) = &self.timezone { cfg.zone = Zone::parse(tz)?; }
        Ok(())
    }
}

pub async fn run(mut cfg: FeedConfig, args: BuildCmd) -> Result<()> {
    let t0 = Instant::now();
    args.apply_to(&mut cfg)?;

    let log = telemetry::build();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("stdout", args.stdout.to_string()),
        ("limit", cfg.items.limit.to_string()),
        ("only_visible", cfg.items.filter.only_visible.to_string()),
        ("only_upcoming", cfg.items.filter.only_upcoming.to_string()),
        ("exclude_complete", cfg.items.filter.exclude_complete.to_string()),
        ("prefer_explicit_order", cfg.items.prefer_explicit_order.to_string()),
    ]).entered();

    let source = args.source.resolve(&cfg)?;
    let clock = Clock::system(cfg.zone);
    let output = cfg.output.display().to_string();
    let writes = args.apply || args.stdout;
    log.debug(format!("zone={:?} output={}", cfg.zone, output));

    let loaded = {
        let _s = log.span_kv(&BuildPhase::Load, [("source", source.to_string())]).entered();
        ingestion::load_records(&source, &cfg.fetch).await
    };

    let loaded = match loaded {
        Ok(l) => l,
        Err(err) if writes => {
            // still publish a valid, empty feed
            let _s = log.span(&BuildPhase::Fallback).entered();
            log.warn_kv("⚠️ source unavailable, writing fallback feed", [("error", err.to_string())]);
            let xml = pipeline::render_fallback(&cfg.channel, &cfg.items, &clock)?;
            emit_feed(&log, &args, &cfg, &xml, 0)?;
            if telemetry::config::json_mode() && !args.stdout {
                let result = types::BuildResult {
                    source: source.to_string(),
                    output: Some(output),
                    bytes: xml.len(),
                    counts: None,
                    fallback: true,
                    error: Some(err.to_string()),
                };
                log.result(&result, Some(elapsed(t0)))?;
            }
            if args.strict {
                return Err(err).context(format!("loading courses from {source}"));
            }
            return Ok(());
        }
        Err(err) => return Err(err).context(format!("loading courses from {source}")),
    };

    log.info_kv("📥 Source loaded", [
        ("records", loaded.records.len().to_string()),
        ("payload", loaded.kind.as_str().to_string()),
        ("bytes", loaded.bytes.to_string()),
    ]);
    if loaded.records.is_empty() {
        log.warn("⚠️ No course received, the feed will be empty");
    }

    if !writes {
        let prepared = {
            let _s = log.span_kv(&BuildPhase::Prepare, [("records", loaded.records.len().to_string())]).entered();
            pipeline::prepare(&loaded.records, &cfg.items, &clock)
        };
        let c = &prepared.counts;
        log.counts(c.records, c.kept, c.emitted, c.sort_key);

        let _sp = log.span(&BuildPhase::Plan).entered();
        if telemetry::config::json_mode() {
            let plan = types::BuildPlan {
                source: source.to_string(),
                payload: loaded.kind.as_str(),
                output,
                counts: prepared.counts.clone(),
                sample_items: prepared.items.iter().take(args.plan_limit).map(types::ItemSample::from).collect(),
            };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Build plan: source={} payload={} output={} items={}", source, loaded.kind.as_str(), output, prepared.items.len()));
            for it in prepared.items.iter().take(args.plan_limit) {
                let date = it.date_start.as_ref().map(|d| d.as_str()).unwrap_or("-");
                log.info(format!("  {} {} <{}>", date, it.title, it.link));
            }
            if prepared.items.len() > args.plan_limit { log.info(format!("  ... ({} more)", prepared.items.len() - args.plan_limit)); }
            log.info("   Use --apply to write the feed, or --stdout to print it.");
        }
        return Ok(());
    }

    let rendered = {
        let _s = log.span_kv(&BuildPhase::Render, [("records", loaded.records.len().to_string())]).entered();
        pipeline::render(&loaded.records, &cfg.channel, &cfg.items, &clock)?
    };
    let c = &rendered.counts;
    log.counts(c.records, c.kept, c.emitted, c.sort_key);
    emit_feed(&log, &args, &cfg, &rendered.xml, rendered.items.len())?;

    if telemetry::config::json_mode() && !args.stdout {
        let result = types::BuildResult {
            source: source.to_string(),
            output: Some(output),
            bytes: rendered.xml.len(),
            counts: Some(rendered.counts),
            fallback: false,
            error: None,
        };
        log.result(&result, Some(elapsed(t0)))?;
    }
    Ok(())
}

fn emit_feed(
    log: &telemetry::ctx::LogCtx<telemetry::ops::build::Build>,
    args: &BuildCmd,
    cfg: &FeedConfig,
    xml: &str,
    items: usize,
) -> Result<()> {
    if args.stdout {
        println!("{xml}");
        return Ok(());
    }
    let _s = log.span_kv(&BuildPhase::Write, [("path", cfg.output.display().to_string())]).entered();
    publish::write_feed(&cfg.output, xml)?;
    log.written(&cfg.output.display().to_string(), xml.len(), items);
    Ok(())
}

fn elapsed(t0: Instant) -> Meta {
    Meta { duration_ms: Some(t0.elapsed().as_millis()), run_id: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrap {
        #[command(flatten)]
        cmd: BuildCmd,
    }

    fn parse(args: &[&str]) -> BuildCmd {
        let mut argv = vec!["build"];
        argv.extend_from_slice(args);
        Wrap::parse_from(argv).cmd
    }

    #[test]
    fn flags_override_config() {
        let cmd = parse(&["--limit", "3", "--only-upcoming", "--include-hidden", "--ignore-order", "--timezone", "Europe/Paris", "--output", "out/feed.xml"]);
        let mut cfg = FeedConfig::default();
        cmd.apply_to(&mut cfg).unwrap();
        assert_eq!(cfg.items.limit, 3);
        assert!(cfg.items.filter.only_upcoming);
        assert!(!cfg.items.filter.only_visible);
        assert!(!cfg.items.prefer_explicit_order);
        assert_eq!(cfg.zone, Zone::Named(chrono_tz::Europe::Paris));
        assert_eq!(cfg.output, PathBuf::from("out/feed.xml"));
    }

    #[test]
    fn absent_flags_keep_config() {
        let cmd = parse(&[]);
        let mut cfg = FeedConfig::default();
        cfg.items.filter.exclude_complete = true;
        cmd.apply_to(&mut cfg).unwrap();
        assert!(cfg.items.filter.exclude_complete);
        assert_eq!(cfg.items.limit, 0);
        assert!(!cmd.apply);
    }

    #[test]
    fn source_resolution() {
        let mut cfg = FeedConfig::default();
        assert!(parse(&[]).source.resolve(&cfg).is_err());

        cfg.source_url = Some("https://cms.test/env".into());
        assert_eq!(parse(&[]).source.resolve(&cfg).unwrap(), Source::Url("https://cms.test/env".into()));
        assert_eq!(
            parse(&["--source", "https://cms.test/flag"]).source.resolve(&cfg).unwrap(),
            Source::Url("https://cms.test/flag".into())
        );
        assert_eq!(
            parse(&["--input", "fixtures/courses.json"]).source.resolve(&cfg).unwrap(),
            Source::File("fixtures/courses.json".into())
        );
    }

    #[test]
    fn source_and_input_conflict() {
        let r = Wrap::try_parse_from(["build", "--source", "https://a.test", "--input", "x.json"]);
        assert!(r.is_err());
    }
}
