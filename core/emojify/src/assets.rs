use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::classify::ExpressionCategory;
use crate::error::EmojifyError;

/// Source of overlay images, one per [`ExpressionCategory`].
pub trait AssetStore: Send + Sync {
    /// Load the overlay drawn for `category`.
    fn load(&self, category: ExpressionCategory) -> Result<RgbaImage, EmojifyError>;
}

/// Overlay images held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<ExpressionCategory, RgbaImage>,
}

impl MemoryAssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the overlay for `category`.
    pub fn with_asset(mut self, category: ExpressionCategory, image: RgbaImage) -> Self {
        self.assets.insert(category, image);
        self
    }

    /// Register (or replace) the overlay for `category` in place.
    pub fn insert(&mut self, category: ExpressionCategory, image: RgbaImage) {
        self.assets.insert(category, image);
    }
}

impl AssetStore for MemoryAssetStore {
    fn load(&self, category: ExpressionCategory) -> Result<RgbaImage, EmojifyError> {
        self.assets
            .get(&category)
            .cloned()
            .ok_or_else(|| EmojifyError::AssetLoad {
                category,
                reason: "no asset registered".to_string(),
            })
    }
}

/// Overlay images stored as `<dir>/<asset_name>.png`, decoded on every load.
#[derive(Debug, Clone)]
pub struct DirectoryAssetStore {
    root: PathBuf,
}

impl DirectoryAssetStore {
    /// Create a store reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the overlays are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the overlay for `category` is read from.
    pub fn path_for(&self, category: ExpressionCategory) -> PathBuf {
        self.root.join(format!("{}.png", category.asset_name()))
    }
}

impl AssetStore for DirectoryAssetStore {
    fn load(&self, category: ExpressionCategory) -> Result<RgbaImage, EmojifyError> {
        let path = self.path_for(category);
        image::open(&path)
            .map(|image| image.to_rgba8())
            .map_err(|e| EmojifyError::AssetLoad {
                category,
                reason: format!("{}: {e}", path.display()),
            })
    }
}
