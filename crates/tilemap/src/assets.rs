use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::classify::TileId;
use crate::flags::TileFlags;
use crate::map_data::{MapData, MapDataError, Wrap};
use crate::surface::{Surface, SurfaceError};
use crate::tileset::{TilesetImages, TilesetSlot, TILESET_SLOT_COUNT};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("map {path} is inconsistent: {source}")]
    InvalidMap {
        path: PathBuf,
        #[source]
        source: MapDataError,
    },
    #[error("map {path} has unknown scrollType {value} (expected 0..=3)")]
    InvalidScrollType { path: PathBuf, value: u8 },
    #[error("tileset {path} names {count} images, at most 9 are supported")]
    TooManyTilesetImages { path: PathBuf, count: usize },
    #[error(transparent)]
    Image(#[from] SurfaceError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub scroll_type: u8,
    pub data: Vec<TileId>,
}

impl MapDocument {
    pub fn wrap(&self) -> Option<Wrap> {
        let (horizontal, vertical) = match self.scroll_type {
            0 => (false, false),
            1 => (false, true),
            2 => (true, false),
            3 => (true, true),
            _ => return None,
        };
        Some(Wrap {
            horizontal,
            vertical,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDocument {
    #[serde(default)]
    pub flags: Vec<u16>,
    #[serde(default)]
    pub tileset_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub map: MapData,
    pub wrap: Wrap,
}

#[derive(Debug, Clone)]
pub struct LoadedTileset {
    pub flags: TileFlags,
    pub images: TilesetImages,
}

pub fn load_map(path: &Path) -> Result<LoadedMap, AssetError> {
    let document: MapDocument = read_json(path)?;
    let wrap = document.wrap().ok_or_else(|| AssetError::InvalidScrollType {
        path: path.to_path_buf(),
        value: document.scroll_type,
    })?;
    let map = MapData::new(document.width, document.height, document.data).map_err(|source| {
        AssetError::InvalidMap {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(
        path = %path.display(),
        map_width = map.width(),
        map_height = map.height(),
        horizontal_wrap = wrap.horizontal,
        vertical_wrap = wrap.vertical,
        "map_document_loaded"
    );
    Ok(LoadedMap { map, wrap })
}

pub fn load_tileset_document(path: &Path) -> Result<TilesetDocument, AssetError> {
    let document: TilesetDocument = read_json(path)?;
    if document.tileset_names.len() > TILESET_SLOT_COUNT {
        return Err(AssetError::TooManyTilesetImages {
            path: path.to_path_buf(),
            count: document.tileset_names.len(),
        });
    }
    Ok(document)
}

pub fn load_tileset_images(
    document: &TilesetDocument,
    assets_dir: &Path,
) -> Result<TilesetImages, AssetError> {
    let mut images = TilesetImages::new();
    for (index, name) in document.tileset_names.iter().enumerate() {
        let Some(slot) = TilesetSlot::from_index(index) else {
            break;
        };
        if name.is_empty() {
            continue;
        }
        let path = assets_dir.join(format!("{name}.png"));
        let image = Surface::load_png(&path)?;
        let (width, height) = image.size();
        debug!(
            slot = slot.label(),
            path = %path.display(),
            width,
            height,
            "tileset_image_loaded"
        );
        images.set(slot, Some(image));
    }
    Ok(images)
}

pub fn load_tileset(path: &Path, assets_dir: &Path) -> Result<LoadedTileset, AssetError> {
    let document = load_tileset_document(path)?;
    let images = load_tileset_images(&document, assets_dir)?;
    Ok(LoadedTileset {
        flags: TileFlags::new(document.flags),
        images,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AssetError> {
    let raw = fs::read_to_string(path).map_err(|source| AssetError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AssetError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}
