//! Access to asset records
//!
//! Stores have an explicit connect/disconnect lifecycle owned by the serving
//! process. Reads and writes before `connect()` or after `disconnect()` fail
//! with [`StoreError::NotConnected`].

use super::{append_asset, load_assets, Asset, AssetStatus, AssetType};
use crate::error::StoreError;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Filter and pagination for asset listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    pub asset_type: Option<AssetType>,
    pub status: Option<AssetStatus>,
    pub skip: usize,
    pub take: usize,
}

impl Default for AssetQuery {
    fn default() -> Self {
        Self {
            asset_type: None,
            status: None,
            skip: 0,
            take: 10,
        }
    }
}

impl AssetQuery {
    /// Whether `asset` passes the type and status filters
    pub fn matches(&self, asset: &Asset) -> bool {
        self.asset_type.map_or(true, |t| asset.asset_type == t)
            && self.status.map_or(true, |s| asset.status == s)
    }
}

/// Source of asset records
pub trait AssetStore: Send + Sync {
    fn connect(&mut self) -> Result<(), StoreError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Every asset, in stored order
    fn find_all(&self) -> Result<Vec<Asset>, StoreError>;

    /// Add an asset after the existing ones. Fails with
    /// [`StoreError::Conflict`] if the id is taken.
    fn insert(&self, asset: Asset) -> Result<Asset, StoreError>;

    /// Filtered page of assets
    fn find_many(&self, query: &AssetQuery) -> Result<Vec<Asset>, StoreError> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|a| query.matches(a))
            .skip(query.skip)
            .take(query.take)
            .collect())
    }

    /// Number of assets matching the filters, ignoring pagination
    fn count(&self, query: &AssetQuery) -> Result<usize, StoreError> {
        Ok(self.find_all()?.iter().filter(|a| query.matches(a)).count())
    }

    fn find_unique(&self, id: &str) -> Result<Option<Asset>, StoreError> {
        Ok(self.find_all()?.into_iter().find(|a| a.id == id))
    }
}

fn ensure_new_id(assets: &[Asset], id: &str) -> Result<(), StoreError> {
    if assets.iter().any(|a| a.id == id) {
        return Err(StoreError::Conflict(id.to_string()));
    }
    Ok(())
}

/// Store holding assets in memory
#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    assets: RwLock<Vec<Asset>>,
    connected: bool,
}

impl InMemoryAssetStore {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets: RwLock::new(assets), connected: false }
    }

    /// Create an already-connected store
    pub fn connected(assets: Vec<Asset>) -> Self {
        Self { assets: RwLock::new(assets), connected: true }
    }
}

impl AssetStore for InMemoryAssetStore {
    fn connect(&mut self) -> Result<(), StoreError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn find_all(&self) -> Result<Vec<Asset>, StoreError> {
        if !self.connected {
            return Err(StoreError::NotConnected);
        }
        Ok(self.assets.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn insert(&self, asset: Asset) -> Result<Asset, StoreError> {
        if !self.connected {
            return Err(StoreError::NotConnected);
        }
        let mut assets = self.assets.write().map_err(|_| StoreError::Poisoned)?;
        ensure_new_id(&assets, &asset.id)?;
        assets.push(asset.clone());
        Ok(asset)
    }
}

/// Store backed by a CSV file, read once on `connect()`. New assets are
/// appended to the file as they are inserted.
#[derive(Debug)]
pub struct CsvAssetStore {
    path: PathBuf,
    assets: RwLock<Option<Vec<Asset>>>,
}

impl CsvAssetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), assets: RwLock::new(None) }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn with_loaded<T>(&self, f: impl FnOnce(&[Asset]) -> T) -> Result<T, StoreError> {
        let guard = self.assets.read().map_err(|_| StoreError::Poisoned)?;
        let assets = guard.as_deref().ok_or(StoreError::NotConnected)?;
        Ok(f(assets))
    }
}

impl AssetStore for CsvAssetStore {
    fn connect(&mut self) -> Result<(), StoreError> {
        let assets = load_assets(&self.path)?;
        log::info!("loaded {} assets from {}", assets.len(), self.path.display());
        *self.assets.get_mut().map_err(|_| StoreError::Poisoned)? = Some(assets);
        Ok(())
    }

    fn disconnect(&mut self) {
        *self.assets.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn is_connected(&self) -> bool {
        self.assets.read().map(|a| a.is_some()).unwrap_or(false)
    }

    fn find_all(&self) -> Result<Vec<Asset>, StoreError> {
        self.with_loaded(|assets| assets.to_vec())
    }

    fn insert(&self, asset: Asset) -> Result<Asset, StoreError> {
        let mut guard = self.assets.write().map_err(|_| StoreError::Poisoned)?;
        let assets = guard.as_mut().ok_or(StoreError::NotConnected)?;
        ensure_new_id(assets, &asset.id)?;

        append_asset(&self.path, &asset)?;
        assets.push(asset.clone());
        log::debug!("appended asset {} to {}", asset.id, self.path.display());
        Ok(asset)
    }

    fn find_many(&self, query: &AssetQuery) -> Result<Vec<Asset>, StoreError> {
        self.with_loaded(|assets| {
            assets
                .iter()
                .filter(|a| query.matches(a))
                .skip(query.skip)
                .take(query.take)
                .cloned()
                .collect()
        })
    }

    fn count(&self, query: &AssetQuery) -> Result<usize, StoreError> {
        self.with_loaded(|assets| assets.iter().filter(|a| query.matches(a)).count())
    }

    fn find_unique(&self, id: &str) -> Result<Option<Asset>, StoreError> {
        self.with_loaded(|assets| assets.iter().find(|a| a.id == id).cloned())
    }
}
