pub mod animation;
pub mod assets;
pub mod cache;
pub mod classify;
pub mod compositor;
pub mod config;
pub mod flags;
pub mod map_data;
pub mod shapes;
pub mod surface;
pub mod tilemap;
pub mod tileset;

pub use animation::{AnimationClock, AnimationFrame, TICKS_PER_ANIMATION_FRAME};
pub use assets::{
    load_map, load_tileset, load_tileset_document, load_tileset_images, AssetError, LoadedMap,
    LoadedTileset, MapDocument, TilesetDocument,
};
pub use cache::{CachedCell, LayerKind, RenderCache};
pub use classify::{
    decompose, is_autotile, is_visible, make_autotile_id, AutotileParts, TileFamily, TileId,
};
pub use compositor::{
    resolve_cell_stack, CellStack, Compositor, NoOverpass, OverpassRule, PaintStats, StackEntry,
    SHADOW_COLOR,
};
pub use config::{ConfigError, TilemapConfig, MAX_LAYER_SIDE};
pub use flags::{TileFlags, FLAG_HIGHER, FLAG_TABLE};
pub use map_data::{MapData, MapDataError, Wrap, SHADOW_PLANE, TILE_LAYER_COUNT};
pub use shapes::{QuadrantOffsets, ShapeTable};
pub use surface::{PixelRect, RasterTarget, Surface, SurfaceError, TRANSPARENT};
pub use tilemap::{FrameStats, LayerSlice, Tilemap};
pub use tileset::{TilesetImages, TilesetSlot, TILESET_SLOT_COUNT};
