use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use crate::build::SourceArgs;
use crate::config::FeedConfig;
use crate::course::{CourseItem, RawRecord};
use crate::ingestion;
use crate::pipeline;
use crate::telemetry;
use crate::telemetry::ops::inspect::Phase as InspectPhase;
use crate::util::time::Clock;

#[derive(Args, Debug)]
pub struct InspectCmd {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Only show the record at this position (0-based)
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Serialize)]
struct Inspected<'a> {
    index: usize,
    raw: &'a RawRecord,
    item: &'a CourseItem,
}

#[derive(Serialize)]
struct InspectResult<'a> {
    source: String,
    payload: &'static str,
    records: usize,
    entries: Vec<Inspected<'a>>,
}

/// entry point for inspect
pub async fn run(cfg: FeedConfig, args: InspectCmd) -> Result<()> {
    let log = telemetry::inspect();
    let source = args.source.resolve(&cfg)?;
    let _g = log.root_span_kv([("source", source.to_string())]).entered();

    let loaded = {
        let _s = log.span(&InspectPhase::Load).entered();
        ingestion::load_records(&source, &cfg.fetch)
            .await
            .with_context(|| format!("loading courses from {source}"))?
    };

    let items = {
        let _s = log.span(&InspectPhase::Map).entered();
        pipeline::map_records(&loaded.records, &cfg.items, &Clock::system(cfg.zone))
    };

    let picked: Vec<usize> = match args.index {
        Some(i) if i >= loaded.records.len() => {
            bail!("index {} out of range ({} records)", i, loaded.records.len())
        }
        Some(i) => vec![i],
        None => (0..loaded.records.len()).collect(),
    };

    if telemetry::config::json_mode() {
        let result = InspectResult {
            source: source.to_string(),
            payload: loaded.kind.as_str(),
            records: loaded.records.len(),
            entries: picked
                .iter()
                .map(|&i| Inspected { index: i, raw: &loaded.records[i], item: &items[i] })
                .collect(),
        };
        return log.result(&result, None);
    }

    println!("🔎 {}: {} records ({}, {} bytes)", source, loaded.records.len(), loaded.kind.as_str(), loaded.bytes);
    for i in picked {
        let it = &items[i];
        println!("\n#{} raw: {}", i, serde_json::to_string(&loaded.records[i])?);
        println!("  Title: {}", it.title);
        println!("  Link: {}", it.link);
        println!("  Image: {:?}", it.image);
        println!("  Start: {:?}", it.date_start.as_ref().map(|d| d.to_string()));
        println!("  Lieu & dates: {:?}", it.lieu_et_date);
        println!("  Durée: {:?}", it.nb_jours);
        println!("  Prix: {:?}", it.prix);
        println!("  Complet: {}  Visible: {}  Order: {:?}", it.complet, it.visible, it.order);
        if !it.tags.is_empty() { println!("  Tags: {}", it.tags.join(", ")); }
        if it.raw_description_html.is_some() { println!("  Description: verbatim HTML"); }
    }
    Ok(())
}
