use serde::Deserialize;
use thiserror::Error;

pub const MAX_LAYER_SIDE: u32 = 32_768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TilemapConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub margin: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        Self {
            screen_width: 816,
            screen_height: 624,
            margin: 20,
            tile_width: 48,
            tile_height: 48,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("screen size must be non-zero, got {width}x{height}")]
    ZeroScreen { width: u32, height: u32 },
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroTile { width: u32, height: u32 },
    #[error("tile size must be even so quadrants split exactly, got {width}x{height}")]
    OddTile { width: u32, height: u32 },
    #[error("layer surfaces would exceed {max}px per side (screen {screen_width}x{screen_height}, margin {margin}, tile {tile_width}x{tile_height})")]
    LayerTooLarge {
        screen_width: u32,
        screen_height: u32,
        margin: u32,
        tile_width: u32,
        tile_height: u32,
        max: u32,
    },
}

impl TilemapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::ZeroScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ConfigError::ZeroTile {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        if self.tile_width % 2 != 0 || self.tile_height % 2 != 0 {
            return Err(ConfigError::OddTile {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        match self.checked_layer_size() {
            Some((width, height)) if width <= MAX_LAYER_SIDE && height <= MAX_LAYER_SIDE => Ok(()),
            _ => Err(ConfigError::LayerTooLarge {
                screen_width: self.screen_width,
                screen_height: self.screen_height,
                margin: self.margin,
                tile_width: self.tile_width,
                tile_height: self.tile_height,
                max: MAX_LAYER_SIDE,
            }),
        }
    }

    pub fn padded_size(&self) -> (u32, u32) {
        let margins = self.margin.saturating_mul(2);
        (
            self.screen_width.saturating_add(margins),
            self.screen_height.saturating_add(margins),
        )
    }

    pub fn layer_grid(&self) -> (u32, u32) {
        let (width, height) = self.padded_size();
        (
            width.div_ceil(self.tile_width.max(1)).saturating_add(1),
            height.div_ceil(self.tile_height.max(1)).saturating_add(1),
        )
    }

    pub fn layer_size(&self) -> (u32, u32) {
        let (cols, rows) = self.layer_grid();
        (
            cols.saturating_mul(self.tile_width),
            rows.saturating_mul(self.tile_height),
        )
    }

    fn checked_layer_size(&self) -> Option<(u32, u32)> {
        let margins = self.margin.checked_mul(2)?;
        let padded_width = self.screen_width.checked_add(margins)?;
        let padded_height = self.screen_height.checked_add(margins)?;
        let cols = padded_width.div_ceil(self.tile_width).checked_add(1)?;
        let rows = padded_height.div_ceil(self.tile_height).checked_add(1)?;
        Some((
            cols.checked_mul(self.tile_width)?,
            rows.checked_mul(self.tile_height)?,
        ))
    }
}
