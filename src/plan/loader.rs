//! Read and append financial plans in CSV form
//!
//! Columns: `id,asset_id,year,amount,description,status`

use super::data::check_amount;
use super::{FinancialPlan, PlanStatus};
use crate::error::{StoreError, ValidationError};
use csv::{Reader, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// Raw CSV row; status stays as text until validated
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    asset_id: String,
    year: i32,
    amount: f64,
    #[serde(default)]
    description: Option<String>,
    status: String,
}

impl CsvRow {
    fn to_plan(self) -> Result<FinancialPlan, ValidationError> {
        let status: PlanStatus = self.status.trim().parse()?;
        check_amount(self.amount)?;

        Ok(FinancialPlan {
            id: self.id,
            asset_id: self.asset_id,
            year: self.year,
            amount: self.amount,
            description: self.description.filter(|d| !d.trim().is_empty()),
            status,
        })
    }
}

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    id: &'a str,
    asset_id: &'a str,
    year: i32,
    amount: f64,
    description: &'a str,
    status: &'static str,
}

impl<'a> From<&'a FinancialPlan> for CsvRecord<'a> {
    fn from(plan: &'a FinancialPlan) -> Self {
        Self {
            id: &plan.id,
            asset_id: &plan.asset_id,
            year: plan.year,
            amount: plan.amount,
            description: plan.description.as_deref().unwrap_or(""),
            status: plan.status.as_str(),
        }
    }
}

pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<FinancialPlan>, StoreError> {
    read_plans(Reader::from_path(path)?)
}

pub fn load_plans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<FinancialPlan>, StoreError> {
    read_plans(Reader::from_reader(reader))
}

fn read_plans<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<FinancialPlan>, StoreError> {
    let headers = reader.headers()?.clone();
    let mut plans = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        plans.push(row.to_plan().map_err(|source| StoreError::InvalidRecord { line, source })?);
    }

    Ok(plans)
}

/// Append one plan, creating the file with a header row if needed
pub fn append_plan<P: AsRef<Path>>(path: P, plan: &FinancialPlan) -> Result<(), StoreError> {
    let path = path.as_ref();
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(needs_header).from_writer(file);
    writer.serialize(CsvRecord::from(plan))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: &str, status: PlanStatus) -> FinancialPlan {
        FinancialPlan {
            id: id.into(),
            asset_id: "road-1".into(),
            year: 2026,
            amount: 4200.5,
            description: Some("Resurface, phase 1".into()),
            status,
        }
    }

    #[test]
    fn test_load_from_reader() {
        let data = "\
id,asset_id,year,amount,description,status
fp-1,road-1,2025,1000,,DRAFT
fp-2,bus-7,2026,250000,Replace bus,APPROVED
";
        let plans = load_plans_from_reader(data.as_bytes()).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].description, None);
        assert_eq!(plans[1].status, PlanStatus::Approved);
        assert_eq!(plans[1].description.as_deref(), Some("Replace bus"));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let data = "id,asset_id,year,amount,description,status\nfp-1,road-1,2025,1000,,PENDING\n";
        let err = load_plans_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidRecord { line: 2, source: ValidationError::UnknownPlanStatus(_) }
        ));
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.csv");

        append_plan(&path, &plan("fp-1", PlanStatus::Draft)).unwrap();
        append_plan(&path, &plan("fp-2", PlanStatus::Submitted)).unwrap();

        let plans = load_plans(&path).unwrap();
        assert_eq!(plans, vec![plan("fp-1", PlanStatus::Draft), plan("fp-2", PlanStatus::Submitted)]);
    }
}
