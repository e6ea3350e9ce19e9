//! Dashboard windows and their content.

use crate::chart::{ChartData, ChartSpec, aggregate};
use crate::core::{Dataset, TabularFrame, WindowId};
use crate::drilldown::MatchMode;
use crate::table::TableView;

#[derive(Debug, Clone)]
pub enum WindowContent {
    Text(String),
    Table(TableView),
    Chart {
        spec: ChartSpec,
        frame: TabularFrame,
    },
    /// Rows behind one chart category
    Detail {
        chart_title: String,
        label: String,
        field: String,
        match_mode: MatchMode,
        view: TableView,
    },
}

impl WindowContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            WindowContent::Text(_) => "text",
            WindowContent::Table(_) => "table",
            WindowContent::Chart { .. } => "chart",
            WindowContent::Detail { .. } => "detail",
        }
    }
}

/// One dashboard panel.
///
/// `source` is the dataset that was loaded when the window was created. Drill
/// downs run against it, so a later upload does not change what an existing
/// chart resolves to.
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    pub title: String,
    pub collapsed: bool,
    pub content: WindowContent,
    pub source: Option<Dataset>,
}

impl Window {
    pub fn new(title: impl Into<String>, content: WindowContent, source: Option<Dataset>) -> Self {
        Self {
            id: WindowId::new(),
            title: title.into(),
            collapsed: false,
            content,
            source,
        }
    }

    /// Chart points, recomputed from the frame on every call.
    pub fn chart_data(&self) -> Option<ChartData> {
        match &self.content {
            WindowContent::Chart { spec, frame } => Some(aggregate(&frame.data, spec)),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&TableView> {
        match &self.content {
            WindowContent::Table(view) | WindowContent::Detail { view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut TableView> {
        match &mut self.content {
            WindowContent::Table(view) | WindowContent::Detail { view, .. } => Some(view),
            _ => None,
        }
    }
}
