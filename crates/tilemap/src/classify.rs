pub type TileId = u16;

pub const TILE_ID_B: TileId = 0;
pub const TILE_ID_C: TileId = 256;
pub const TILE_ID_D: TileId = 512;
pub const TILE_ID_E: TileId = 768;
pub const TILE_ID_A5: TileId = 1536;
pub const TILE_ID_A1: TileId = 2048;
pub const TILE_ID_A2: TileId = 2816;
pub const TILE_ID_A3: TileId = 4352;
pub const TILE_ID_A4: TileId = 5888;
pub const TILE_ID_MAX: TileId = 8192;

pub const AUTOTILE_SHAPE_COUNT: u16 = 48;
pub const AUTOTILE_KIND_COUNT: u16 = (TILE_ID_MAX - TILE_ID_A1) / AUTOTILE_SHAPE_COUNT;

const WATER_DECORATION_START: TileId = TILE_ID_A1 + 96;
const WATER_DECORATION_END: TileId = TILE_ID_A1 + 192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFamily {
    B,
    C,
    D,
    E,
    A5,
    A1,
    A2,
    A3,
    A4,
}

impl TileFamily {
    pub const ALL: [TileFamily; 9] = [
        TileFamily::B,
        TileFamily::C,
        TileFamily::D,
        TileFamily::E,
        TileFamily::A5,
        TileFamily::A1,
        TileFamily::A2,
        TileFamily::A3,
        TileFamily::A4,
    ];

    pub fn of(tile_id: TileId) -> Option<Self> {
        if !is_visible(tile_id) {
            return None;
        }
        let family = match tile_id {
            id if id < TILE_ID_C => TileFamily::B,
            id if id < TILE_ID_D => TileFamily::C,
            id if id < TILE_ID_E => TileFamily::D,
            id if id < TILE_ID_A5 => TileFamily::E,
            id if id < TILE_ID_A1 => TileFamily::A5,
            id if id < TILE_ID_A2 => TileFamily::A1,
            id if id < TILE_ID_A3 => TileFamily::A2,
            id if id < TILE_ID_A4 => TileFamily::A3,
            _ => TileFamily::A4,
        };
        Some(family)
    }

    pub fn contains(self, tile_id: TileId) -> bool {
        Self::of(tile_id) == Some(self)
    }

    pub fn is_autotile(self) -> bool {
        matches!(
            self,
            TileFamily::A1 | TileFamily::A2 | TileFamily::A3 | TileFamily::A4
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutotileParts {
    pub kind: u16,
    pub shape: u16,
}

pub fn is_visible(tile_id: TileId) -> bool {
    tile_id > 0 && tile_id < TILE_ID_MAX
}

pub fn is_autotile(tile_id: TileId) -> bool {
    tile_id >= TILE_ID_A1
}

pub fn decompose(tile_id: TileId) -> Option<AutotileParts> {
    if !is_autotile(tile_id) || tile_id >= TILE_ID_MAX {
        return None;
    }
    let offset = tile_id - TILE_ID_A1;
    Some(AutotileParts {
        kind: offset / AUTOTILE_SHAPE_COUNT,
        shape: offset % AUTOTILE_SHAPE_COUNT,
    })
}

pub fn autotile_kind(tile_id: TileId) -> Option<u16> {
    decompose(tile_id).map(|parts| parts.kind)
}

pub fn autotile_shape(tile_id: TileId) -> Option<u16> {
    decompose(tile_id).map(|parts| parts.shape)
}

pub fn make_autotile_id(kind: u16, shape: u16) -> Option<TileId> {
    if kind >= AUTOTILE_KIND_COUNT || shape >= AUTOTILE_SHAPE_COUNT {
        return None;
    }
    Some(TILE_ID_A1 + kind * AUTOTILE_SHAPE_COUNT + shape)
}

pub fn is_same_kind_tile(a: TileId, b: TileId) -> bool {
    match (decompose(a), decompose(b)) {
        (Some(left), Some(right)) => left.kind == right.kind,
        _ => a == b,
    }
}

pub fn is_tile_a1(tile_id: TileId) -> bool {
    (TILE_ID_A1..TILE_ID_A2).contains(&tile_id)
}

pub fn is_tile_a2(tile_id: TileId) -> bool {
    (TILE_ID_A2..TILE_ID_A3).contains(&tile_id)
}

pub fn is_tile_a3(tile_id: TileId) -> bool {
    (TILE_ID_A3..TILE_ID_A4).contains(&tile_id)
}

pub fn is_tile_a4(tile_id: TileId) -> bool {
    (TILE_ID_A4..TILE_ID_MAX).contains(&tile_id)
}

pub fn is_tile_a5(tile_id: TileId) -> bool {
    (TILE_ID_A5..TILE_ID_A1).contains(&tile_id)
}

pub fn is_water_tile(tile_id: TileId) -> bool {
    is_tile_a1(tile_id)
        && !(WATER_DECORATION_START..WATER_DECORATION_END).contains(&tile_id)
}

pub fn is_waterfall_tile(tile_id: TileId) -> bool {
    (WATER_DECORATION_END..TILE_ID_A2).contains(&tile_id)
        && autotile_kind(tile_id).is_some_and(|kind| kind % 2 == 1)
}

pub fn is_ground_tile(tile_id: TileId) -> bool {
    is_tile_a1(tile_id) || is_tile_a2(tile_id) || is_tile_a5(tile_id)
}

pub fn is_shadowing_tile(tile_id: TileId) -> bool {
    is_tile_a3(tile_id) || is_tile_a4(tile_id)
}

pub fn is_roof_tile(tile_id: TileId) -> bool {
    is_tile_a3(tile_id) && autotile_kind(tile_id).is_some_and(|kind| kind % 16 < 8)
}

pub fn is_wall_top_tile(tile_id: TileId) -> bool {
    is_tile_a4(tile_id) && autotile_kind(tile_id).is_some_and(|kind| kind % 16 < 8)
}

pub fn is_wall_side_tile(tile_id: TileId) -> bool {
    is_shadowing_tile(tile_id) && autotile_kind(tile_id).is_some_and(|kind| kind % 16 >= 8)
}

pub fn is_wall_tile(tile_id: TileId) -> bool {
    is_wall_top_tile(tile_id) || is_wall_side_tile(tile_id)
}

pub fn is_floor_type_autotile(tile_id: TileId) -> bool {
    (is_tile_a1(tile_id) && !is_waterfall_tile(tile_id))
        || is_tile_a2(tile_id)
        || is_wall_top_tile(tile_id)
}

pub fn is_wall_type_autotile(tile_id: TileId) -> bool {
    is_roof_tile(tile_id) || is_wall_side_tile(tile_id)
}

pub fn is_waterfall_type_autotile(tile_id: TileId) -> bool {
    is_waterfall_tile(tile_id)
}
