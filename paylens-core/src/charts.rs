//! Chart kinds the presentation layer can draw.
//!
//! Registration is process-wide and happens once; call
//! [`register_chart_kinds`] before rendering any chart. Later calls return the
//! same registry.

use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

impl ChartKind {
    /// Pie <-> bar switch used by the category chart.
    pub fn toggled(self) -> Self {
        match self {
            ChartKind::Pie => ChartKind::Bar,
            ChartKind::Bar => ChartKind::Pie,
            ChartKind::Line => ChartKind::Line,
        }
    }
}

#[derive(Debug)]
pub struct ChartRegistry {
    kinds: Vec<ChartKind>,
}

impl ChartRegistry {
    pub fn supports(&self, kind: ChartKind) -> bool {
        self.kinds.contains(&kind)
    }
}

static REGISTRY: OnceLock<ChartRegistry> = OnceLock::new();

pub fn register_chart_kinds() -> &'static ChartRegistry {
    REGISTRY.get_or_init(|| {
        tracing::debug!("registering chart kinds");
        ChartRegistry {
            kinds: vec![ChartKind::Pie, ChartKind::Bar, ChartKind::Line],
        }
    })
}

pub fn is_registered() -> bool {
    REGISTRY.get().is_some()
}
