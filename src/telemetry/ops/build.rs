use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Build;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Prepare, Render, Plan, Write, Fallback }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Load => "load",
        Phase::Prepare => "prepare",
        Phase::Render => "render",
        Phase::Plan => "plan",
        Phase::Write => "write",
        Phase::Fallback => "fallback",
    }}
    fn span(&self) -> Span { match self {
        Phase::Load => info_span!("load"),
        Phase::Prepare => info_span!("prepare"),
        Phase::Render => info_span!("render"),
        Phase::Plan => info_span!("plan"),
        Phase::Write => info_span!("write"),
        Phase::Fallback => info_span!("fallback"),
    }}
}

impl OpMarker for Build {
    const NAME: &'static str = "build";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("build") }
}
