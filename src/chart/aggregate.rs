//! Turning rows into chart points.
//!
//! Aggregation is a pure function of the rows and the [`ChartSpec`]; there is no
//! grouping or summing, each surviving row becomes one point.

use super::{ChartKind, ChartSpec, PALETTE};
use crate::core::Row;
use crate::core::value::{coerce_number, display_opt, format_number, is_present};
use crate::error::Result;
use crate::services::export::write_delimited;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: f64,
    pub color_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub id: String,
    pub points: Vec<LinePoint>,
}

/// Aggregated chart data, shaped by chart kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    Points(Vec<ChartPoint>),
    Line(LineSeries),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Points(points) => points.len(),
            ChartData::Line(series) => series.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category labels in point order
    pub fn categories(&self) -> Vec<&str> {
        match self {
            ChartData::Points(points) => points.iter().map(|p| p.category.as_str()).collect(),
            ChartData::Line(series) => series.points.iter().map(|p| p.x.as_str()).collect(),
        }
    }

    pub fn pairs(&self) -> Vec<(&str, f64)> {
        match self {
            ChartData::Points(points) => points
                .iter()
                .map(|p| (p.category.as_str(), p.value))
                .collect(),
            ChartData::Line(series) => series.points.iter().map(|p| (p.x.as_str(), p.y)).collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.pairs().iter().map(|(_, v)| v).sum()
    }
}

/// Build chart points from rows. Rows missing either key (absent or null) are
/// skipped; values that are not numeric count as zero.
pub fn aggregate(rows: &[Row], spec: &ChartSpec) -> ChartData {
    let surviving = rows.iter().filter_map(|row| {
        let x = row.get(&spec.x_key);
        let y = row.get(&spec.y_key);
        if is_present(x) && is_present(y) {
            Some((display_opt(x), coerce_number(y)))
        } else {
            None
        }
    });

    match spec.kind {
        ChartKind::Line => ChartData::Line(LineSeries {
            id: spec.y_key.clone(),
            points: surviving.map(|(x, y)| LinePoint { x, y }).collect(),
        }),
        ChartKind::Pie | ChartKind::Bar => ChartData::Points(
            surviving
                .enumerate()
                .map(|(i, (category, value))| ChartPoint {
                    category,
                    value,
                    color_index: i % PALETTE.len(),
                })
                .collect(),
        ),
    }
}

/// Serialize chart data as `xKey,yKey` CSV.
pub fn export_csv(data: &ChartData, spec: &ChartSpec) -> Result<String> {
    write_delimited(
        [spec.x_key.as_str(), spec.y_key.as_str()],
        data.pairs()
            .into_iter()
            .map(|(category, value)| [category.to_string(), format_number(value)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("Supplier", json!("Acme")), ("Qty", json!(10))]),
            Row::from_pairs([("Supplier", json!("Globex")), ("Qty", json!("n/a"))]),
            Row::from_pairs([("Supplier", Value::Null), ("Qty", json!(4))]),
            Row::from_pairs([("Qty", json!(2))]),
            Row::from_pairs([("Supplier", json!("Initech")), ("Qty", json!("7"))]),
        ]
    }

    #[test]
    fn test_bar_points_skip_missing_keys() {
        let data = aggregate(&rows(), &ChartSpec::new(ChartKind::Bar, "Supplier", "Qty"));
        assert_eq!(
            data,
            ChartData::Points(vec![
                ChartPoint { category: "Acme".into(), value: 10.0, color_index: 0 },
                ChartPoint { category: "Globex".into(), value: 0.0, color_index: 1 },
                ChartPoint { category: "Initech".into(), value: 7.0, color_index: 2 },
            ])
        );
        assert_eq!(data.total(), 17.0);
    }

    #[test]
    fn test_line_series_keeps_row_order() {
        let data = aggregate(&rows(), &ChartSpec::new(ChartKind::Line, "Supplier", "Qty"));
        match data {
            ChartData::Line(series) => {
                assert_eq!(series.id, "Qty");
                assert_eq!(
                    series.points.iter().map(|p| p.x.as_str()).collect::<Vec<_>>(),
                    vec!["Acme", "Globex", "Initech"]
                );
            }
            other => panic!("expected a line series, got {other:?}"),
        }
    }

    #[test]
    fn test_color_index_wraps() {
        let many: Vec<Row> = (0..10)
            .map(|i| Row::from_pairs([("k", json!(format!("c{i}"))), ("v", json!(i))]))
            .collect();
        let data = aggregate(&many, &ChartSpec::new(ChartKind::Pie, "k", "v"));
        let ChartData::Points(points) = data else {
            panic!("expected points");
        };
        assert_eq!(points[8].color_index, 0);
        assert_eq!(points[9].color_index, 1);
    }

    #[test]
    fn test_export_csv() {
        let spec = ChartSpec::new(ChartKind::Bar, "Supplier", "Qty");
        let data = ChartData::Points(vec![
            ChartPoint { category: "Acme, Inc".into(), value: 10.0, color_index: 0 },
            ChartPoint { category: "Globex".into(), value: 2.5, color_index: 1 },
        ]);
        assert_eq!(
            export_csv(&data, &spec).unwrap(),
            "Supplier,Qty\n\"Acme, Inc\",10\nGlobex,2.5"
        );

        let empty = ChartData::Points(Vec::new());
        assert_eq!(export_csv(&empty, &spec).unwrap(), "Supplier,Qty");
    }
}
