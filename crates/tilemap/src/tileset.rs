use crate::classify::{is_tile_a5, TileFamily, TileId};
use crate::surface::Surface;

pub const TILESET_SLOT_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilesetSlot {
    A1,
    A2,
    A3,
    A4,
    A5,
    B,
    C,
    D,
    E,
}

impl TilesetSlot {
    pub const ALL: [TilesetSlot; TILESET_SLOT_COUNT] = [
        TilesetSlot::A1,
        TilesetSlot::A2,
        TilesetSlot::A3,
        TilesetSlot::A4,
        TilesetSlot::A5,
        TilesetSlot::B,
        TilesetSlot::C,
        TilesetSlot::D,
        TilesetSlot::E,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            TilesetSlot::A1 => "A1",
            TilesetSlot::A2 => "A2",
            TilesetSlot::A3 => "A3",
            TilesetSlot::A4 => "A4",
            TilesetSlot::A5 => "A5",
            TilesetSlot::B => "B",
            TilesetSlot::C => "C",
            TilesetSlot::D => "D",
            TilesetSlot::E => "E",
        }
    }

    pub fn for_family(family: TileFamily) -> Self {
        match family {
            TileFamily::A1 => TilesetSlot::A1,
            TileFamily::A2 => TilesetSlot::A2,
            TileFamily::A3 => TilesetSlot::A3,
            TileFamily::A4 => TilesetSlot::A4,
            TileFamily::A5 => TilesetSlot::A5,
            TileFamily::B => TilesetSlot::B,
            TileFamily::C => TilesetSlot::C,
            TileFamily::D => TilesetSlot::D,
            TileFamily::E => TilesetSlot::E,
        }
    }

    pub fn for_plain_tile(tile_id: TileId) -> Option<Self> {
        if is_tile_a5(tile_id) {
            return Some(TilesetSlot::A5);
        }
        Self::from_index(TilesetSlot::B.index() + usize::from(tile_id / 256))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TilesetImages {
    slots: [Option<Surface>; TILESET_SLOT_COUNT],
}

impl TilesetImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(images: Vec<Option<Surface>>) -> Self {
        let mut out = Self::default();
        for (index, image) in images.into_iter().enumerate().take(TILESET_SLOT_COUNT) {
            out.slots[index] = image;
        }
        out
    }

    pub fn set(&mut self, slot: TilesetSlot, image: Option<Surface>) {
        self.slots[slot.index()] = image;
    }

    pub fn get(&self, slot: TilesetSlot) -> Option<&Surface> {
        self.slots[slot.index()].as_ref()
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
