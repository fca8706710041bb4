//! Load assets from CSV
//!
//! Expected columns: `id,name,type,status,value,condition,purchase_date,expected_lifespan`,
//! optionally followed by `created_by`

use super::data::check_value;
use super::{Asset, AssetStatus, AssetType, Condition};
use crate::error::{StoreError, ValidationError};
use chrono::NaiveDate;
use csv::{Reader, WriterBuilder};
use std::fs::OpenOptions;
use std::path::Path;

/// Raw CSV row; enums stay as text until validated
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    #[serde(rename = "type", default)]
    asset_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
    value: f64,
    condition: String,
    purchase_date: String,
    expected_lifespan: u32,
    #[serde(default)]
    created_by: Option<String>,
}

impl CsvRow {
    fn to_asset(self) -> Result<Asset, ValidationError> {
        let condition: Condition = self.condition.trim().parse()?;

        let asset_type = match self.asset_type.as_deref().map(str::trim) {
            None | Some("") => AssetType::Other,
            Some(s) => s.parse()?,
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => AssetStatus::Active,
            Some(s) => s.parse()?,
        };

        let purchase_date = NaiveDate::parse_from_str(self.purchase_date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(self.purchase_date.clone()))?;

        check_value(&self.id, self.value)?;

        Ok(Asset {
            created_by: self.created_by.filter(|u| !u.trim().is_empty()),
            ..Asset::new(self.id, self.name, self.value, condition, purchase_date, self.expected_lifespan)
                .with_classification(asset_type, status)
        })
    }
}

/// Load all assets from a CSV file
pub fn load_assets<P: AsRef<Path>>(path: P) -> Result<Vec<Asset>, StoreError> {
    let reader = Reader::from_path(path)?;
    read_assets(reader)
}

/// Load assets from any reader (e.g., string buffer, network stream)
pub fn load_assets_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Asset>, StoreError> {
    read_assets(Reader::from_reader(reader))
}

fn read_assets<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Asset>, StoreError> {
    let headers = reader.headers()?.clone();
    let mut assets = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        let asset = row
            .to_asset()
            .map_err(|source| StoreError::InvalidRecord { line, source })?;
        assets.push(asset);
    }

    Ok(assets)
}

/// Append one asset to an existing CSV file, following the file's own header
pub fn append_asset<P: AsRef<Path>>(path: P, asset: &Asset) -> Result<(), StoreError> {
    let path = path.as_ref();
    let headers = Reader::from_path(path)?.headers()?.clone();
    let record: Vec<String> = headers.iter().map(|column| column_value(asset, column)).collect();

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(&record)?;
    writer.flush()?;
    Ok(())
}

fn column_value(asset: &Asset, column: &str) -> String {
    match column.trim() {
        "id" => asset.id.clone(),
        "name" => asset.name.clone(),
        "type" => asset.asset_type.as_str().to_string(),
        "status" => asset.status.as_str().to_string(),
        "value" => asset.value.to_string(),
        "condition" => asset.condition.as_str().to_string(),
        "purchase_date" => asset.purchase_date.format("%Y-%m-%d").to_string(),
        "expected_lifespan" => asset.expected_lifespan.to_string(),
        "created_by" => asset.created_by.clone().unwrap_or_default(),
        _ => String::new(),
    }
}
