//! CSV export of projection results

use super::yearly::YearlyProjection;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct YearRow {
    year: i32,
    maintenance_cost: f64,
    replacement_cost: f64,
    total_budget_needed: f64,
    assets_requiring_attention: usize,
}

#[derive(Serialize)]
struct AttentionRow<'a> {
    year: i32,
    asset_id: &'a str,
    asset_name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    estimated_cost: f64,
}

/// Write one row per projected year
pub fn write_projections_csv<W: Write>(writer: W, years: &[YearlyProjection]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record([
        "year",
        "maintenance_cost",
        "replacement_cost",
        "total_budget_needed",
        "assets_requiring_attention",
    ])?;
    for y in years {
        wtr.serialize(YearRow {
            year: y.year,
            maintenance_cost: y.maintenance_cost,
            replacement_cost: y.replacement_cost,
            total_budget_needed: y.total_budget_needed,
            assets_requiring_attention: y.assets_requiring_attention.len(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one row per flagged asset per year
pub fn write_attention_csv<W: Write>(writer: W, years: &[YearlyProjection]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    // Header written explicitly so an empty horizon still yields one
    wtr.write_record(["year", "asset_id", "asset_name", "type", "estimated_cost"])?;
    for y in years {
        for item in &y.assets_requiring_attention {
            wtr.serialize(AttentionRow {
                year: y.year,
                asset_id: &item.id,
                asset_name: &item.name,
                kind: item.kind.as_str(),
                estimated_cost: item.estimated_cost,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}
