//! Asset data structures, CSV loading and the asset store

mod data;
pub mod loader;
pub mod store;

pub use data::{Asset, AssetStatus, AssetType, Condition, NewAsset, Priority, RiskLevel};
pub use loader::{append_asset, load_assets, load_assets_from_reader};
pub use store::{AssetQuery, AssetStore, CsvAssetStore, InMemoryAssetStore};
