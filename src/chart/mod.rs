//! Chart specifications, the colour palette and point aggregation.

pub mod aggregate;

pub use aggregate::{ChartData, ChartPoint, LinePoint, LineSeries, aggregate, export_csv};

use crate::services::ChartDescriptor;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

/// Point colours, cycled by point position.
pub const PALETTE: [Color; 8] = [
    Color::Rgb(0x3b, 0x82, 0xf6),
    Color::Rgb(0xf5, 0x9e, 0x42),
    Color::Rgb(0xef, 0x44, 0x44),
    Color::Rgb(0x10, 0xb9, 0x81),
    Color::Rgb(0xa8, 0x55, 0xf7),
    Color::Rgb(0xfb, 0xbf, 0x24),
    Color::Rgb(0x63, 0x66, 0xf1),
    Color::Rgb(0x14, 0xb8, 0xa6),
];

pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

impl ChartKind {
    /// Resolve the backend's chart type. Missing means pie; anything
    /// unrecognised is drawn as a bar chart.
    pub fn resolve(kind: Option<&str>) -> Self {
        match kind.map(str::trim) {
            None | Some("") => ChartKind::Pie,
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!("Unknown chart type '{name}', falling back to bar");
                ChartKind::Bar
            }),
        }
    }
}

/// What to plot: chart kind plus the category and value columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_key: String,
    pub y_key: String,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, x_key: impl Into<String>, y_key: impl Into<String>) -> Self {
        Self {
            kind,
            x_key: x_key.into(),
            y_key: y_key.into(),
        }
    }

    /// Spec for a backend chart description; `None` unless both keys are set.
    pub fn from_descriptor(desc: &ChartDescriptor) -> Option<Self> {
        let (x_key, y_key) = desc.keys()?;
        Some(Self::new(ChartKind::resolve(desc.kind.as_deref()), x_key, y_key))
    }
}
