//! Computed inventory value for detail tables.

use crate::core::Row;
use crate::core::value::{coerce_number, number_value};
use serde::{Deserialize, Serialize};

/// Synonym lists for the quantity and cost columns, tried in order, and the
/// name of the computed `quantity × cost` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumns {
    pub quantity_fields: Vec<String>,
    pub cost_fields: Vec<String>,
    pub output_field: String,
}

impl Default for DerivedColumns {
    fn default() -> Self {
        Self {
            quantity_fields: owned(&[
                "Quantity_on_Hand",
                "QTY_ON_HAND",
                "Qty_On_Hand",
                "Quantity",
                "Qty",
            ]),
            cost_fields: owned(&["Avg_Cost", "AVG_COST", "Unit_Cost", "Cost"]),
            output_field: "Inventory_Value".to_string(),
        }
    }
}

impl DerivedColumns {
    /// Whether any row carries a quantity or cost column.
    pub fn applies_to(&self, rows: &[Row]) -> bool {
        rows.iter().any(|row| {
            self.quantity_fields
                .iter()
                .chain(self.cost_fields.iter())
                .any(|name| row.contains(name))
        })
    }

    /// Coerce the quantity and cost cells to numbers in place and append the
    /// computed value. Rows are left untouched when no row has either column.
    pub fn apply(&self, rows: &mut [Row]) {
        if !self.applies_to(rows) {
            return;
        }
        for row in rows.iter_mut() {
            let qty = coerce_synonym(row, &self.quantity_fields);
            let cost = coerce_synonym(row, &self.cost_fields);
            row.insert(self.output_field.as_str(), number_value(qty * cost));
        }
    }

    /// Columns that should be shown with digit grouping.
    pub fn quantity_columns(&self) -> &[String] {
        &self.quantity_fields
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn coerce_synonym(row: &mut Row, synonyms: &[String]) -> f64 {
    let found = row
        .first_present(synonyms)
        .map(|(name, value)| (name, coerce_number(Some(value))));
    match found {
        Some((name, n)) => {
            row.insert(name, number_value(n));
            n
        }
        None => 0.0,
    }
}
