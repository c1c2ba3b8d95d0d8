use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Inspect;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Map }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Load => "load", Phase::Map => "map" } }
    fn span(&self) -> Span { match self { Phase::Load => info_span!("load"), Phase::Map => info_span!("map") } }
}

impl OpMarker for Inspect {
    const NAME: &'static str = "inspect";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("inspect") }
}
