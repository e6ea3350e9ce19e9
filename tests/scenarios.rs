//! End-to-end checks of the chart, drill-down and table behaviour on small
//! inventory datasets.

use optix::chart::{ChartData, ChartKind, ChartSpec, aggregate};
use optix::config::TableConfig;
use optix::core::{CsvImportOptions, Row};
use optix::drilldown::{DrillOutcome, MatchMode, drill_down, resolve_field};
use optix::services::csv_loader::parse_rows;
use optix::table::TableView;
use pretty_assertions::assert_eq;
use serde_json::json;

fn scenario_a_rows() -> Vec<Row> {
    vec![
        Row::from_pairs([
            ("Supplier", json!("Acme")),
            ("Qty", json!(10)),
            ("Cost", json!(2.5)),
        ]),
        Row::from_pairs([
            ("Supplier", json!("Globex")),
            ("Qty", json!(0)),
            ("Cost", json!(5)),
        ]),
    ]
}

#[test]
fn scenario_a_bar_chart_and_drill_down() {
    let rows = scenario_a_rows();
    let spec = ChartSpec::new(ChartKind::Bar, "Supplier", "Qty");

    let data = aggregate(&rows, &spec);
    assert_eq!(data.pairs(), vec![("Acme", 10.0), ("Globex", 0.0)]);

    let DrillOutcome::Found(result) = drill_down(&rows, "Acme", "Supplier") else {
        panic!("expected rows for Acme");
    };
    assert_eq!(result.field, "Supplier");
    assert_eq!(result.match_mode, MatchMode::Exact);
    assert_eq!(result.rows, vec![rows[0].clone()]);
}

#[test]
fn scenario_b_substring_fallback() {
    let rows = vec![
        Row::from_pairs([("Supplier", json!("Acme Corp")), ("Qty", json!(4))]),
        Row::from_pairs([("Supplier", json!("Globex")), ("Qty", json!(7))]),
    ];

    let DrillOutcome::Found(result) = drill_down(&rows, "acme", "Supplier") else {
        panic!("expected the substring fallback to find Acme Corp");
    };
    assert_eq!(result.match_mode, MatchMode::Substring);
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].display("Supplier"), "Acme Corp");
}

#[test]
fn scenario_c_inventory_value_coercion() {
    let rows = vec![
        Row::from_pairs([("Item", json!("Bolt")), ("Qty", json!("12")), ("Cost", json!(3))]),
        Row::from_pairs([("Item", json!("Nut")), ("Qty", json!("abc")), ("Cost", json!(3))]),
    ];
    let view = TableView::from_rows(rows, &TableConfig::default().detail_options());

    assert_eq!(view.columns().last().map(String::as_str), Some("Inventory_Value"));
    let values: Vec<f64> = view
        .rows()
        .iter()
        .map(|r| r.get("Inventory_Value").and_then(|v| v.as_f64()).unwrap())
        .collect();
    assert_eq!(values, vec![36.0, 0.0]);
}

#[test]
fn scenario_d_first_page_of_120_rows() {
    let rows: Vec<Row> = (1..=120)
        .map(|i| Row::from_pairs([("Id", json!(i)), ("Name", json!(format!("Item {i}")))]))
        .collect();
    let view = TableView::from_rows(rows, &TableConfig::default().options());

    let page = view.page_rows();
    assert_eq!(page.len(), 25);
    assert_eq!(page.first().unwrap().display("Id"), "1");
    assert_eq!(page.last().unwrap().display("Id"), "25");
    assert_eq!(view.page_summary(), "Showing 1-25 of 120 items");
    assert_eq!(view.page_count(), 5);
}

#[test]
fn scenario_e_empty_chart_is_not_an_error() {
    let rows = vec![Row::from_pairs([("Supplier", json!(null)), ("Qty", json!(3))])];
    let spec = ChartSpec::new(ChartKind::Pie, "Supplier", "Qty");

    let data = aggregate(&rows, &spec);
    assert!(data.is_empty());
    assert_eq!(data.total(), 0.0);
    assert_eq!(optix::chart::export_csv(&data, &spec).unwrap(), "Supplier,Qty");
}

#[test]
fn point_count_never_exceeds_rows() {
    let rows = vec![
        Row::from_pairs([("Month", json!("Jan")), ("Sales", json!(1))]),
        Row::from_pairs([("Month", json!("Feb"))]),
        Row::from_pairs([("Month", json!("Mar")), ("Sales", json!("7"))]),
    ];
    for kind in [ChartKind::Pie, ChartKind::Bar, ChartKind::Line] {
        let data = aggregate(&rows, &ChartSpec::new(kind, "Month", "Sales"));
        assert_eq!(data.len(), 2, "{kind} keeps rows with both keys");
    }

    let ChartData::Line(series) = aggregate(&rows, &ChartSpec::new(ChartKind::Line, "Month", "Sales"))
    else {
        panic!("line charts produce a series");
    };
    assert_eq!(series.id, "Sales");
    assert_eq!(series.points[1].y, 7.0);
}

#[test]
fn drill_down_is_idempotent() {
    let rows = scenario_a_rows();
    let first = drill_down(&rows, "globex", "Supplier");
    let second = drill_down(&rows, "globex", "Supplier");
    assert_eq!(first, second);
    assert_eq!(resolve_field(&rows, "globex", "Supplier"), "Supplier");
}

#[test]
fn export_round_trip_reproduces_visible_rows() {
    let text = "Supplier,Item,Qty,Notes\n\"Acme, Inc\",Bolt,10,\"say \"\"hi\"\"\"\nGlobex,Nut,2,plain\n";
    let rows = parse_rows(text, &CsvImportOptions::default()).unwrap();
    let mut view = TableView::from_rows(rows, &TableConfig::default().options());
    view.set_column_visible("Item", false);
    view.cycle_sort("Qty");

    let exported = view.export_csv().unwrap();
    let reparsed = parse_rows(&exported, &CsvImportOptions::default()).unwrap();

    assert_eq!(reparsed.len(), 2);
    assert_eq!(
        reparsed[0].columns().collect::<Vec<_>>(),
        vec!["Supplier", "Qty", "Notes"]
    );
    assert_eq!(reparsed[0].display("Supplier"), "Globex");
    assert_eq!(reparsed[1].display("Supplier"), "Acme, Inc");
    assert_eq!(reparsed[1].display("Notes"), "say \"hi\"");
    assert_eq!(reparsed[1].get("Qty"), Some(&json!(10)));
}

#[test]
fn sort_is_stable_under_reapplication() {
    let rows = vec![
        Row::from_pairs([("Id", json!(1)), ("Grade", json!("b"))]),
        Row::from_pairs([("Id", json!(2)), ("Grade", json!(3))]),
        Row::from_pairs([("Id", json!(3)), ("Grade", json!("b"))]),
        Row::from_pairs([("Id", json!(4)), ("Grade", json!(null))]),
        Row::from_pairs([("Id", json!(5)), ("Grade", json!(1))]),
    ];
    let mut view = TableView::from_rows(rows, &TableConfig::default().options());
    view.cycle_sort("Grade");
    let order = |v: &TableView| v.filtered_rows().map(|r| r.display("Id")).collect::<Vec<_>>();
    let first = order(&view);
    assert_eq!(first, vec!["5", "2", "1", "3", "4"]);

    view.clear_sort();
    view.cycle_sort("Grade");
    assert_eq!(order(&view), first);
}
