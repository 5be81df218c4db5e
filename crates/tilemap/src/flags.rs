use crate::classify::{is_tile_a2, TileId};

pub const FLAG_HIGHER: u16 = 0x10;
pub const FLAG_TABLE: u16 = 0x80;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileFlags {
    flags: Vec<u16>,
}

impl TileFlags {
    pub fn new(flags: Vec<u16>) -> Self {
        Self { flags }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn get(&self, tile_id: TileId) -> u16 {
        self.flags.get(usize::from(tile_id)).copied().unwrap_or(0)
    }

    pub fn is_higher(&self, tile_id: TileId) -> bool {
        self.get(tile_id) & FLAG_HIGHER != 0
    }

    pub fn is_table(&self, tile_id: TileId) -> bool {
        is_tile_a2(tile_id) && self.get(tile_id) & FLAG_TABLE != 0
    }
}

impl From<Vec<u16>> for TileFlags {
    fn from(flags: Vec<u16>) -> Self {
        Self::new(flags)
    }
}
