use thiserror::Error;

use crate::classify::TileId;

pub const TILE_LAYER_COUNT: usize = 4;
pub const SHADOW_PLANE: usize = 4;

/// Flat z-major map buffer: value `(x, y, z)` lives at `(z * height + y) * width + x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapData {
    width: u32,
    height: u32,
    data: Vec<TileId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapDataError {
    #[error("map buffer too short: need at least {expected} values for {width}x{height}, got {actual}")]
    TooShort {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("map buffer length {actual} is not a whole number of {plane_len}-value planes")]
    PartialPlane { plane_len: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wrap {
    pub horizontal: bool,
    pub vertical: bool,
}

impl MapData {
    pub fn new(width: u32, height: u32, data: Vec<TileId>) -> Result<Self, MapDataError> {
        let plane_len = width as usize * height as usize;
        let expected = plane_len * TILE_LAYER_COUNT;
        let actual = data.len();
        if actual < expected {
            return Err(MapDataError::TooShort {
                width,
                height,
                expected,
                actual,
            });
        }
        if plane_len > 0 && actual % plane_len != 0 {
            return Err(MapDataError::PartialPlane { plane_len, actual });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn plane_count(&self) -> usize {
        let plane_len = self.width as usize * self.height as usize;
        if plane_len == 0 {
            0
        } else {
            self.data.len() / plane_len
        }
    }

    pub fn read(&self, x: i32, y: i32, z: usize, wrap: Wrap) -> TileId {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        let x = if wrap.horizontal {
            i64::from(x).rem_euclid(i64::from(self.width))
        } else {
            i64::from(x)
        };
        let y = if wrap.vertical {
            i64::from(y).rem_euclid(i64::from(self.height))
        } else {
            i64::from(y)
        };
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        let index = (z * self.height as usize + y as usize) * self.width as usize + x as usize;
        self.data.get(index).copied().unwrap_or(0)
    }
}
