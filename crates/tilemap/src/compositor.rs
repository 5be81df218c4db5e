use crate::animation::AnimationFrame;
use crate::classify::{
    autotile_shape, decompose, is_autotile, is_shadowing_tile, is_tile_a1, is_tile_a2, is_visible, TileFamily,
    TileId,
};
use crate::flags::TileFlags;
use crate::map_data::{MapData, Wrap, SHADOW_PLANE};
use crate::shapes::ShapeTable;
use crate::surface::{PixelRect, RasterTarget};
use crate::tileset::{TilesetImages, TilesetSlot, TILESET_SLOT_COUNT};

pub const SHADOW_COLOR: [u8; 4] = [0, 0, 0, 128];
const SHADOW_MASK: u16 = 0x0f;
const TABLE_FRONT_COLUMN: [u8; 4] = [0, 3, 2, 1];
const TABLE_FRONT_ROW: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackEntry {
    Tile(TileId),
    Shadow(u16),
    TableEdge(TileId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStack {
    pub lower: Vec<StackEntry>,
    pub upper: Vec<StackEntry>,
}

impl CellStack {
    fn place(&mut self, tile_id: TileId, flags: &TileFlags) {
        if flags.is_higher(tile_id) {
            self.upper.push(StackEntry::Tile(tile_id));
        } else {
            self.lower.push(StackEntry::Tile(tile_id));
        }
    }

    pub fn lower_is_animated(&self) -> bool {
        is_animated(&self.lower)
    }
}

pub fn is_animated(entries: &[StackEntry]) -> bool {
    entries
        .iter()
        .any(|entry| matches!(entry, StackEntry::Tile(id) if is_tile_a1(*id)))
}

pub trait OverpassRule {
    fn is_overpass(&self, map_x: i32, map_y: i32) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverpass;

impl OverpassRule for NoOverpass {
    fn is_overpass(&self, _map_x: i32, _map_y: i32) -> bool {
        false
    }
}

impl<F> OverpassRule for F
where
    F: Fn(i32, i32) -> bool,
{
    fn is_overpass(&self, map_x: i32, map_y: i32) -> bool {
        self(map_x, map_y)
    }
}

pub fn resolve_cell_stack(
    map: &MapData,
    wrap: Wrap,
    flags: &TileFlags,
    overpass: &dyn OverpassRule,
    map_x: i32,
    map_y: i32,
) -> CellStack {
    let tile0 = map.read(map_x, map_y, 0, wrap);
    let tile1 = map.read(map_x, map_y, 1, wrap);
    let tile2 = map.read(map_x, map_y, 2, wrap);
    let tile3 = map.read(map_x, map_y, 3, wrap);
    let shadow_bits = map.read(map_x, map_y, SHADOW_PLANE, wrap);
    let tile1_above = map.read(map_x, map_y.saturating_sub(1), 1, wrap);

    let mut stack = CellStack::default();
    stack.place(tile0, flags);
    stack.place(tile1, flags);
    stack.lower.push(StackEntry::Shadow(shadow_bits));

    if flags.is_table(tile1_above) && !flags.is_table(tile1) && !is_shadowing_tile(tile0) {
        stack.lower.push(StackEntry::TableEdge(tile1_above));
    }

    if overpass.is_overpass(map_x, map_y) {
        stack.upper.push(StackEntry::Tile(tile2));
        stack.upper.push(StackEntry::Tile(tile3));
    } else {
        stack.place(tile2, flags);
        stack.place(tile3, flags);
    }
    stack
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub blits: u32,
    pub fills: u32,
    pub clears: u32,
    pub missing_slots: u16,
}

impl PaintStats {
    pub fn draw_calls(&self) -> u32 {
        self.blits + self.fills + self.clears
    }

    pub fn merge(&mut self, other: PaintStats) {
        self.blits += other.blits;
        self.fills += other.fills;
        self.clears += other.clears;
        self.missing_slots |= other.missing_slots;
    }

    pub fn missing(&self) -> impl Iterator<Item = TilesetSlot> + '_ {
        (0..TILESET_SLOT_COUNT)
            .filter(|index| self.missing_slots & (1 << index) != 0)
            .filter_map(TilesetSlot::from_index)
    }

    fn note_missing(&mut self, slot: TilesetSlot) {
        self.missing_slots |= 1 << slot.index();
    }
}

struct AutotileSource {
    slot: TilesetSlot,
    table: ShapeTable,
    base_x: u32,
    base_y: u32,
    is_table: bool,
}

pub struct Compositor<'a> {
    images: &'a TilesetImages,
    flags: &'a TileFlags,
    tile_width: u32,
    tile_height: u32,
    stats: PaintStats,
}

impl<'a> Compositor<'a> {
    pub fn new(
        images: &'a TilesetImages,
        flags: &'a TileFlags,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        Self {
            images,
            flags,
            tile_width,
            tile_height,
            stats: PaintStats::default(),
        }
    }

    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    pub fn repaint_cell(
        &mut self,
        target: &mut dyn RasterTarget,
        entries: &[StackEntry],
        dx: i32,
        dy: i32,
        frame: AnimationFrame,
    ) {
        target.clear_rect(PixelRect::new(dx, dy, self.tile_width, self.tile_height));
        self.stats.clears += 1;
        for entry in entries {
            match *entry {
                StackEntry::Tile(tile_id) => self.draw_tile(target, tile_id, dx, dy, frame),
                StackEntry::Shadow(bits) => self.draw_shadow(target, bits, dx, dy),
                StackEntry::TableEdge(tile_id) => self.draw_table_edge(target, tile_id, dx, dy),
            }
        }
    }

    pub fn draw_tile(
        &mut self,
        target: &mut dyn RasterTarget,
        tile_id: TileId,
        dx: i32,
        dy: i32,
        frame: AnimationFrame,
    ) {
        if !is_visible(tile_id) {
            return;
        }
        if is_autotile(tile_id) {
            self.draw_autotile(target, tile_id, dx, dy, frame);
        } else {
            self.draw_normal_tile(target, tile_id, dx, dy);
        }
    }

    fn draw_normal_tile(
        &mut self,
        target: &mut dyn RasterTarget,
        tile_id: TileId,
        dx: i32,
        dy: i32,
    ) {
        let Some(slot) = TilesetSlot::for_plain_tile(tile_id) else {
            return;
        };
        let Some(source) = self.images.get(slot) else {
            self.stats.note_missing(slot);
            return;
        };
        let id = u32::from(tile_id);
        let column = (id / 128) % 2 * 8 + id % 8;
        let row = (id % 256 / 8) % 16;
        let src = PixelRect::new(
            (column * self.tile_width) as i32,
            (row * self.tile_height) as i32,
            self.tile_width,
            self.tile_height,
        );
        target.blit(source, src, dx, dy);
        self.stats.blits += 1;
    }

    fn draw_autotile(
        &mut self,
        target: &mut dyn RasterTarget,
        tile_id: TileId,
        dx: i32,
        dy: i32,
        frame: AnimationFrame,
    ) {
        let Some(layout) = self.autotile_source(tile_id, frame) else {
            return;
        };
        let Some(shape) = autotile_shape(tile_id) else {
            return;
        };
        let Some(offsets) = layout.table.lookup(shape) else {
            return;
        };
        let Some(source) = self.images.get(layout.slot) else {
            self.stats.note_missing(layout.slot);
            return;
        };

        let half_w = self.tile_width / 2;
        let half_h = self.tile_height / 2;
        for (quadrant, [qx, qy]) in offsets.iter().copied().enumerate() {
            let src_x = (layout.base_x * 2 + u32::from(qx)) * half_w;
            let src_y = (layout.base_y * 2 + u32::from(qy)) * half_h;
            let dst_x = dx + ((quadrant as u32 % 2) * half_w) as i32;
            let dst_y = dy + ((quadrant as u32 / 2) * half_h) as i32;

            if layout.is_table && (qy == 1 || qy == 5) {
                let front_x = if qy == 1 {
                    TABLE_FRONT_COLUMN[usize::from(qx)]
                } else {
                    qx
                };
                let front = PixelRect::new(
                    ((layout.base_x * 2 + u32::from(front_x)) * half_w) as i32,
                    ((layout.base_y * 2 + u32::from(TABLE_FRONT_ROW)) * half_h) as i32,
                    half_w,
                    half_h,
                );
                target.blit(source, front, dst_x, dst_y);
                let top = PixelRect::new(src_x as i32, src_y as i32, half_w, half_h / 2);
                target.blit(source, top, dst_x, dst_y + (half_h / 2) as i32);
                self.stats.blits += 2;
            } else {
                let quarter = PixelRect::new(src_x as i32, src_y as i32, half_w, half_h);
                target.blit(source, quarter, dst_x, dst_y);
                self.stats.blits += 1;
            }
        }
    }

    fn autotile_source(&self, tile_id: TileId, frame: AnimationFrame) -> Option<AutotileSource> {
        let parts = decompose(tile_id)?;
        let kind = u32::from(parts.kind);
        let tx = kind % 8;
        let ty = kind / 8;
        let family = TileFamily::of(tile_id)?;
        let slot = TilesetSlot::for_family(family);

        let source = match family {
            TileFamily::A1 => {
                let water = u32::from(frame.water_surface_index());
                let (base_x, base_y, table) = match kind {
                    0 => (water * 2, 0, ShapeTable::Floor),
                    1 => (water * 2, 3, ShapeTable::Floor),
                    2 => (6, 0, ShapeTable::Floor),
                    3 => (6, 3, ShapeTable::Floor),
                    _ => {
                        let block_x = tx / 4 * 8;
                        let block_y = ty * 6 + tx / 2 % 2 * 3;
                        if kind % 2 == 0 {
                            (block_x + water * 2, block_y, ShapeTable::Floor)
                        } else {
                            let fall = u32::from(frame.waterfall_index());
                            (block_x + 6, block_y + fall, ShapeTable::Waterfall)
                        }
                    }
                };
                AutotileSource {
                    slot,
                    table,
                    base_x,
                    base_y,
                    is_table: false,
                }
            }
            TileFamily::A2 => AutotileSource {
                slot,
                table: ShapeTable::Floor,
                base_x: tx * 2,
                base_y: (ty - 2) * 3,
                is_table: self.flags.is_table(tile_id),
            },
            TileFamily::A3 => AutotileSource {
                slot,
                table: ShapeTable::Wall,
                base_x: tx * 2,
                base_y: (ty - 6) * 2,
                is_table: false,
            },
            TileFamily::A4 => {
                // Rows alternate between 3-tile wall tops and 2-tile wall sides.
                let odd_row = ty % 2 == 1;
                let base_y = ((ty - 10) * 5 + u32::from(odd_row)) / 2;
                AutotileSource {
                    slot,
                    table: if odd_row {
                        ShapeTable::Wall
                    } else {
                        ShapeTable::Floor
                    },
                    base_x: tx * 2,
                    base_y,
                    is_table: false,
                }
            }
            _ => return None,
        };
        Some(source)
    }

    /// Bottom strip of the two lower quadrants of the A2 table tile above,
    /// drawn across the top of this cell.
    pub fn draw_table_edge(
        &mut self,
        target: &mut dyn RasterTarget,
        tile_id: TileId,
        dx: i32,
        dy: i32,
    ) {
        if !is_tile_a2(tile_id) {
            return;
        }
        let Some(parts) = decompose(tile_id) else {
            return;
        };
        let Some(offsets) = ShapeTable::Floor.lookup(parts.shape) else {
            return;
        };
        let Some(source) = self.images.get(TilesetSlot::A2) else {
            self.stats.note_missing(TilesetSlot::A2);
            return;
        };

        let kind = u32::from(parts.kind);
        let base_x = kind % 8 * 2;
        let base_y = (kind / 8 - 2) * 3;
        let half_w = self.tile_width / 2;
        let half_h = self.tile_height / 2;
        for (column, [qx, qy]) in offsets[2..].iter().copied().enumerate() {
            let src = PixelRect::new(
                ((base_x * 2 + u32::from(qx)) * half_w) as i32,
                ((base_y * 2 + u32::from(qy)) * half_h + half_h / 2) as i32,
                half_w,
                half_h / 2,
            );
            target.blit(source, src, dx + (column as u32 * half_w) as i32, dy);
            self.stats.blits += 1;
        }
    }

    /// One translucent quarter-tile per set bit: bit 0 top-left, 1 top-right,
    /// 2 bottom-left, 3 bottom-right.
    pub fn draw_shadow(&mut self, target: &mut dyn RasterTarget, bits: u16, dx: i32, dy: i32) {
        if bits & SHADOW_MASK == 0 {
            return;
        }
        let half_w = self.tile_width / 2;
        let half_h = self.tile_height / 2;
        for quadrant in 0..4u32 {
            if bits & (1 << quadrant) == 0 {
                continue;
            }
            let rect = PixelRect::new(
                dx + ((quadrant % 2) * half_w) as i32,
                dy + ((quadrant / 2) * half_h) as i32,
                half_w,
                half_h,
            );
            target.fill_rect(rect, SHADOW_COLOR);
            self.stats.fills += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{make_autotile_id, TILE_ID_A2, TILE_ID_A3, TILE_ID_A5, TILE_ID_C};
    use crate::flags::{FLAG_HIGHER, FLAG_TABLE};
    use crate::surface::Surface;

    const TILE: u32 = 4;

    // Sheet whose every half-tile block has a unique opaque colour, so a
    // painted quadrant identifies its source block.
    fn coded_sheet(blocks_x: u32, blocks_y: u32) -> Surface {
        let half = TILE / 2;
        let mut sheet = Surface::new(blocks_x * half, blocks_y * half);
        for by in 0..blocks_y {
            for bx in 0..blocks_x {
                let color = [bx as u8, by as u8, 7, 255];
                sheet.fill_rect(
                    PixelRect::new((bx * half) as i32, (by * half) as i32, half, half),
                    color,
                );
            }
        }
        sheet
    }

    fn images_with(slot: TilesetSlot, sheet: Surface) -> TilesetImages {
        let mut images = TilesetImages::new();
        images.set(slot, Some(sheet));
        images
    }

    fn flags_with(entries: &[(TileId, u16)]) -> TileFlags {
        let mut raw = vec![0u16; 8192];
        for (id, value) in entries {
            raw[usize::from(*id)] = *value;
        }
        TileFlags::new(raw)
    }

    fn block_at(target: &Surface, x: u32, y: u32) -> (u8, u8) {
        let pixel = target.pixel(x, y).expect("pixel");
        (pixel[0], pixel[1])
    }

    fn map_from_planes(width: u32, height: u32, planes: &[&[TileId]]) -> MapData {
        let data = planes.iter().flat_map(|plane| plane.iter().copied()).collect();
        MapData::new(width, height, data).expect("map")
    }

    #[test]
    fn stack_sorts_by_higher_flag_and_keeps_shadow_low() {
        let flags = flags_with(&[(3, FLAG_HIGHER), (5, FLAG_HIGHER)]);
        let map = map_from_planes(1, 1, &[&[2], &[3], &[4], &[5], &[0b0101]]);
        let stack = resolve_cell_stack(&map, Wrap::default(), &flags, &NoOverpass, 0, 0);

        assert_eq!(
            stack.lower,
            vec![
                StackEntry::Tile(2),
                StackEntry::Shadow(0b0101),
                StackEntry::Tile(4)
            ]
        );
        assert_eq!(stack.upper, vec![StackEntry::Tile(3), StackEntry::Tile(5)]);
    }

    #[test]
    fn overpass_hook_lifts_top_two_layers() {
        let flags = TileFlags::default();
        let map = map_from_planes(1, 1, &[&[2], &[3], &[4], &[5]]);
        let bridge = |_x: i32, _y: i32| true;
        let stack = resolve_cell_stack(&map, Wrap::default(), &flags, &bridge, 0, 0);

        assert_eq!(
            stack.lower,
            vec![StackEntry::Tile(2), StackEntry::Tile(3), StackEntry::Shadow(0)]
        );
        assert_eq!(stack.upper, vec![StackEntry::Tile(4), StackEntry::Tile(5)]);
    }

    #[test]
    fn table_above_adds_edge_entry_after_shadow() {
        let table = TILE_ID_A2 + 3;
        let flags = flags_with(&[(table, FLAG_TABLE)]);
        let map = map_from_planes(1, 2, &[&[1, 1], &[table, 0], &[0, 0], &[0, 0]]);
        let stack = resolve_cell_stack(&map, Wrap::default(), &flags, &NoOverpass, 0, 1);

        assert_eq!(
            stack.lower,
            vec![
                StackEntry::Tile(1),
                StackEntry::Tile(0),
                StackEntry::Shadow(0),
                StackEntry::TableEdge(table),
                StackEntry::Tile(0),
                StackEntry::Tile(0),
            ]
        );
    }

    #[test]
    fn table_edge_is_suppressed_under_tables_and_on_shadowing_ground() {
        let table = TILE_ID_A2 + 3;
        let flags = flags_with(&[(table, FLAG_TABLE)]);

        let stacked_tables = map_from_planes(1, 2, &[&[1, 1], &[table, table], &[0, 0], &[0, 0]]);
        let stack = resolve_cell_stack(&stacked_tables, Wrap::default(), &flags, &NoOverpass, 0, 1);
        assert!(!stack.lower.iter().any(|e| matches!(e, StackEntry::TableEdge(_))));

        let wall_below = map_from_planes(1, 2, &[&[1, TILE_ID_A3], &[table, 0], &[0, 0], &[0, 0]]);
        let stack = resolve_cell_stack(&wall_below, Wrap::default(), &flags, &NoOverpass, 0, 1);
        assert!(!stack.lower.iter().any(|e| matches!(e, StackEntry::TableEdge(_))));
    }

    #[test]
    fn animated_lower_detects_water_only() {
        let water = CellStack {
            lower: vec![StackEntry::Tile(make_autotile_id(0, 0).expect("id"))],
            upper: Vec::new(),
        };
        let grass = CellStack {
            lower: vec![StackEntry::Tile(TILE_ID_A2)],
            upper: Vec::new(),
        };
        assert!(water.lower_is_animated());
        assert!(!grass.lower_is_animated());
    }

    #[test]
    fn normal_tile_blits_whole_tile_from_band_sheet() {
        let images = images_with(TilesetSlot::C, coded_sheet(32, 32));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        // C + 137: column (137/128)%2*8 + 137%8 = 9, row (137/8)%16 = 1.
        compositor.draw_tile(&mut target, TILE_ID_C + 137, 0, 0, AnimationFrame(0));

        assert_eq!(block_at(&target, 0, 0), (18, 2));
        assert_eq!(block_at(&target, 3, 3), (19, 3));
        assert_eq!(compositor.stats().blits, 1);
    }

    #[test]
    fn a5_tiles_use_their_own_sheet() {
        let images = images_with(TilesetSlot::A5, coded_sheet(32, 32));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        compositor.draw_tile(&mut target, TILE_ID_A5 + 10, 0, 0, AnimationFrame(0));
        // 1546: column 0*8 + 2 = 2, row (1546 % 256 / 8) % 16 = 1.
        assert_eq!(block_at(&target, 0, 0), (4, 2));
    }

    #[test]
    fn floor_autotile_assembles_four_quadrants() {
        let images = images_with(TilesetSlot::A2, coded_sheet(32, 24));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        // Kind 17 (tx 1, ty 2) shape 0 -> base block (2, 0), offsets
        // [[2,4],[1,4],[2,3],[1,3]].
        let id = make_autotile_id(17, 0).expect("id");
        compositor.draw_tile(&mut target, id, 0, 0, AnimationFrame(0));

        assert_eq!(block_at(&target, 0, 0), (6, 4));
        assert_eq!(block_at(&target, 2, 0), (5, 4));
        assert_eq!(block_at(&target, 0, 2), (6, 3));
        assert_eq!(block_at(&target, 2, 2), (5, 3));
        assert_eq!(compositor.stats().blits, 4);
    }

    #[test]
    fn water_autotile_follows_animation_frame() {
        let images = images_with(TilesetSlot::A1, coded_sheet(32, 24));
        let flags = TileFlags::default();
        let id = make_autotile_id(0, 47).expect("id");

        let observed: Vec<(u8, u8)> = (0..4)
            .map(|frame| {
                let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
                let mut target = Surface::new(TILE, TILE);
                compositor.draw_tile(&mut target, id, 0, 0, AnimationFrame(frame));
                block_at(&target, 0, 0)
            })
            .collect();

        // Surface index 0,1,2,1 moves the base block by two tiles each step.
        assert_eq!(observed, vec![(0, 0), (4, 0), (8, 0), (4, 0)]);
    }

    #[test]
    fn waterfall_uses_waterfall_table_and_vertical_frames() {
        let images = images_with(TilesetSlot::A1, coded_sheet(32, 24));
        let flags = TileFlags::default();
        // Kind 5: tx 5, ty 0 -> block (8 + 6, 0 + 0 + frame % 3).
        let id = make_autotile_id(5, 1).expect("id");

        for (frame, expected_y) in [(0, 0u8), (1, 2), (2, 4), (3, 0)] {
            let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
            let mut target = Surface::new(TILE, TILE);
            compositor.draw_tile(&mut target, id, 0, 0, AnimationFrame(frame));
            // Waterfall shape 1 top-left offset is (0, 0).
            assert_eq!(block_at(&target, 0, 0), (28, expected_y), "frame={frame}");
        }
    }

    #[test]
    fn shapes_missing_from_wall_table_draw_nothing() {
        let images = images_with(TilesetSlot::A3, coded_sheet(32, 16));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        compositor.draw_tile(&mut target, TILE_ID_A3 + 20, 0, 0, AnimationFrame(0));
        assert_eq!(compositor.stats().blits, 0);
        assert!(target.as_rgba().iter().all(|byte| *byte == 0));

        compositor.draw_tile(&mut target, TILE_ID_A3 + 15, 0, 0, AnimationFrame(0));
        assert_eq!(compositor.stats().blits, 4);
    }

    #[test]
    fn a4_rows_alternate_floor_and_wall_tables() {
        let images = images_with(TilesetSlot::A4, coded_sheet(32, 32));
        let flags = TileFlags::default();

        // Kind 88 (tx 0, ty 11): base y = (1 * 5 + 1) / 2 = 3, wall shape 0
        // top-left offset (2, 2).
        let wall_side = make_autotile_id(88, 0).expect("id");
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);
        compositor.draw_tile(&mut target, wall_side, 0, 0, AnimationFrame(0));
        assert_eq!(block_at(&target, 0, 0), (2, 8));

        // Kind 96 (tx 0, ty 12): base y = 10 / 2 = 5, floor shape 0 (2, 4).
        let wall_top = make_autotile_id(96, 0).expect("id");
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);
        compositor.draw_tile(&mut target, wall_top, 0, 0, AnimationFrame(0));
        assert_eq!(block_at(&target, 0, 0), (2, 14));
    }

    #[test]
    fn table_tiles_split_front_quadrants() {
        let id = make_autotile_id(16, 0).expect("id");
        let images = images_with(TilesetSlot::A2, coded_sheet(32, 24));
        let flags = flags_with(&[(id, FLAG_TABLE)]);
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        // Shape 0 has no quadrant with y offset 1 or 5: plain four blits.
        compositor.draw_tile(&mut target, id, 0, 0, AnimationFrame(0));
        assert_eq!(compositor.stats().blits, 4);

        // Shape 4 bottom-right offset is (3, 1): front block (1, 3) under the
        // top half of (3, 1).
        let split = make_autotile_id(16, 4).expect("id");
        let flags = flags_with(&[(split, FLAG_TABLE)]);
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);
        compositor.draw_tile(&mut target, split, 0, 0, AnimationFrame(0));
        assert_eq!(compositor.stats().blits, 5);
        assert_eq!(block_at(&target, 2, 2), (1, 3));
        assert_eq!(block_at(&target, 2, 3), (3, 1));
    }

    #[test]
    fn table_edge_draws_two_half_height_strips() {
        let id = make_autotile_id(16, 0).expect("id");
        let images = images_with(TilesetSlot::A2, coded_sheet(32, 24));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        compositor.draw_table_edge(&mut target, id, 0, 0);

        // Shape 0 bottom quadrants: (2, 3) and (1, 3), quarter-tile tall strips.
        assert_eq!(block_at(&target, 0, 0), (2, 3));
        assert_eq!(block_at(&target, 2, 0), (1, 3));
        assert_eq!(target.pixel(0, 1).map(|p| p[3]), Some(0));
        assert_eq!(compositor.stats().blits, 2);
    }

    #[test]
    fn table_edge_ignores_non_a2_tiles() {
        let images = images_with(TilesetSlot::A2, coded_sheet(32, 24));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);
        compositor.draw_table_edge(&mut target, TILE_ID_A3, 0, 0);
        assert_eq!(compositor.stats().blits, 0);
    }

    #[test]
    fn shadow_fills_one_quarter_per_set_bit() {
        let images = TilesetImages::new();
        let flags = TileFlags::default();
        for bits in 0u16..16 {
            let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
            let mut target = Surface::new(TILE, TILE);
            compositor.draw_shadow(&mut target, bits, 0, 0);
            assert_eq!(compositor.stats().fills, bits.count_ones(), "bits={bits:#06b}");
        }
    }

    #[test]
    fn shadow_bit_order_is_row_major() {
        let images = TilesetImages::new();
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);
        compositor.draw_shadow(&mut target, 0b0010, 0, 0);

        assert_eq!(target.pixel(2, 0), Some(SHADOW_COLOR));
        assert_eq!(target.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(target.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn missing_sheet_is_skipped_and_reported() {
        let images = TilesetImages::new();
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);

        compositor.draw_tile(&mut target, TILE_ID_A2, 0, 0, AnimationFrame(0));
        compositor.draw_tile(&mut target, 5, 0, 0, AnimationFrame(0));

        assert_eq!(compositor.stats().blits, 0);
        let missing: Vec<_> = compositor.stats().missing().collect();
        assert_eq!(missing, vec![TilesetSlot::A2, TilesetSlot::B]);
    }

    #[test]
    fn invisible_ids_issue_no_draws() {
        let images = images_with(TilesetSlot::B, coded_sheet(32, 32));
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::new(TILE, TILE);
        for id in [0, 8192, u16::MAX] {
            compositor.draw_tile(&mut target, id, 0, 0, AnimationFrame(0));
        }
        assert_eq!(compositor.stats(), PaintStats::default());
    }

    #[test]
    fn repaint_cell_clears_before_drawing() {
        let images = TilesetImages::new();
        let flags = TileFlags::default();
        let mut compositor = Compositor::new(&images, &flags, TILE, TILE);
        let mut target = Surface::filled(TILE * 2, TILE, [9, 9, 9, 255]);

        compositor.repaint_cell(&mut target, &[StackEntry::Shadow(0)], TILE as i32, 0, AnimationFrame(0));

        assert_eq!(target.pixel(TILE, 0), Some([0, 0, 0, 0]));
        assert_eq!(target.pixel(0, 0), Some([9, 9, 9, 255]));
        assert_eq!(compositor.stats().clears, 1);
        assert_eq!(compositor.stats().draw_calls(), 1);
    }
}
