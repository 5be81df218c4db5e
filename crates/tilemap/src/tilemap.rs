use tracing::{debug, warn};

use crate::animation::AnimationClock;
use crate::cache::{LayerKind, RenderCache};
use crate::classify::TileId;
use crate::compositor::{
    is_animated, resolve_cell_stack, Compositor, NoOverpass, OverpassRule, PaintStats,
};
use crate::config::{ConfigError, TilemapConfig};
use crate::flags::TileFlags;
use crate::map_data::{MapData, MapDataError, Wrap};
use crate::surface::{PixelRect, RasterTarget, Surface};
use crate::tileset::{TilesetImages, TilesetSlot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerSlice {
    pub src: PixelRect,
    pub dst_x: i32,
    pub dst_y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub lower_repainted: u32,
    pub upper_repainted: u32,
    pub paint: PaintStats,
}

impl FrameStats {
    pub fn cells_repainted(&self) -> u32 {
        self.lower_repainted + self.upper_repainted
    }

    pub fn draw_calls(&self) -> u32 {
        self.paint.draw_calls()
    }
}

pub struct Tilemap {
    config: TilemapConfig,
    map: MapData,
    flags: TileFlags,
    images: TilesetImages,
    wrap: Wrap,
    origin_x: f64,
    origin_y: f64,
    clock: AnimationClock,
    cache: RenderCache,
    lower: Surface,
    upper: Surface,
    slices: [LayerSlice; 4],
    overpass: Box<dyn OverpassRule>,
    warned_missing_slots: u16,
}

impl Tilemap {
    pub fn new(config: TilemapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut tilemap = Self {
            config,
            map: MapData::default(),
            flags: TileFlags::default(),
            images: TilesetImages::default(),
            wrap: Wrap::default(),
            origin_x: 0.0,
            origin_y: 0.0,
            clock: AnimationClock::new(),
            cache: RenderCache::default(),
            lower: Surface::new(0, 0),
            upper: Surface::new(0, 0),
            slices: [LayerSlice::default(); 4],
            overpass: Box::new(NoOverpass),
            warned_missing_slots: 0,
        };
        tilemap.rebuild_layers();
        Ok(tilemap)
    }

    pub fn config(&self) -> &TilemapConfig {
        &self.config
    }

    pub fn configure(&mut self, tile_width: u32, tile_height: u32) -> Result<(), ConfigError> {
        self.apply_config(TilemapConfig {
            tile_width,
            tile_height,
            ..self.config
        })
    }

    pub fn resize(&mut self, screen_width: u32, screen_height: u32) -> Result<(), ConfigError> {
        self.apply_config(TilemapConfig {
            screen_width,
            screen_height,
            ..self.config
        })
    }

    pub fn apply_config(&mut self, config: TilemapConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.rebuild_layers();
        Ok(())
    }

    /// Replaces the map. Cells pick up the new ids on the next render
    /// through the per-cell comparison; no refresh is needed.
    pub fn set_data(
        &mut self,
        width: u32,
        height: u32,
        data: Vec<TileId>,
    ) -> Result<(), MapDataError> {
        self.set_map(MapData::new(width, height, data)?);
        Ok(())
    }

    pub fn set_map(&mut self, map: MapData) {
        debug!(
            map_width = map.width(),
            map_height = map.height(),
            planes = map.plane_count(),
            "tilemap_data_set"
        );
        self.map = map;
    }

    pub fn map_data(&self) -> &MapData {
        &self.map
    }

    pub fn set_tileset_images(&mut self, images: TilesetImages) {
        self.images = images;
        self.warned_missing_slots = 0;
    }

    pub fn tileset_images(&self) -> &TilesetImages {
        &self.images
    }

    pub fn set_flags(&mut self, flags: TileFlags) {
        self.flags = flags;
    }

    pub fn set_wrap(&mut self, horizontal: bool, vertical: bool) {
        self.wrap = Wrap {
            horizontal,
            vertical,
        };
    }

    pub fn wrap(&self) -> Wrap {
        self.wrap
    }

    pub fn set_overpass_rule(&mut self, rule: impl OverpassRule + 'static) {
        self.overpass = Box::new(rule);
    }

    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.origin_x = x;
        self.origin_y = y;
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    pub fn update(&mut self) {
        self.clock.advance();
    }

    pub fn animation_clock(&self) -> AnimationClock {
        self.clock
    }

    pub fn refresh(&mut self) {
        self.cache.clear();
        debug!("tilemap_cache_cleared");
    }

    pub fn is_ready(&self) -> bool {
        TilesetSlot::ALL
            .iter()
            .filter_map(|slot| self.images.get(*slot))
            .all(|image| {
                let (width, height) = image.size();
                width > 0 && height > 0
            })
    }

    pub fn render(&mut self) -> FrameStats {
        let margin = i64::from(self.config.margin);
        let origin_x = pixel_origin(self.origin_x);
        let origin_y = pixel_origin(self.origin_y);
        self.update_slices(origin_x - margin, origin_y - margin);

        let start_x = (origin_x - margin).div_euclid(i64::from(self.config.tile_width));
        let start_y = (origin_y - margin).div_euclid(i64::from(self.config.tile_height));
        let stats = self.paint_all(start_x, start_y);

        let unwarned = stats.paint.missing_slots & !self.warned_missing_slots;
        if unwarned != 0 {
            for slot in TilesetSlot::ALL {
                if unwarned & (1 << slot.index()) != 0 {
                    warn!(slot = slot.label(), "tileset_slot_missing");
                }
            }
            self.warned_missing_slots |= unwarned;
        }
        stats
    }

    pub fn lower_surface(&self) -> &Surface {
        &self.lower
    }

    pub fn upper_surface(&self) -> &Surface {
        &self.upper
    }

    pub fn layer_surface(&self, layer: LayerKind) -> &Surface {
        match layer {
            LayerKind::Lower => &self.lower,
            LayerKind::Upper => &self.upper,
        }
    }

    pub fn slices(&self) -> &[LayerSlice; 4] {
        &self.slices
    }

    pub fn compose_layer(&self, layer: LayerKind, target: &mut dyn RasterTarget) {
        let margin = self.config.margin as i32;
        let surface = self.layer_surface(layer);
        for slice in &self.slices {
            if slice.src.is_empty() {
                continue;
            }
            target.blit(surface, slice.src, slice.dst_x - margin, slice.dst_y - margin);
        }
    }

    pub fn compose_frame(&self, target: &mut dyn RasterTarget) {
        self.compose_layer(LayerKind::Lower, target);
        self.compose_layer(LayerKind::Upper, target);
    }

    fn rebuild_layers(&mut self) {
        let (cols, rows) = self.config.layer_grid();
        let (layer_width, layer_height) = self.config.layer_size();
        self.lower = Surface::new(layer_width, layer_height);
        self.upper = Surface::new(layer_width, layer_height);
        self.cache = RenderCache::new(cols, rows);
        debug!(
            cols,
            rows,
            layer_width,
            layer_height,
            tile_width = self.config.tile_width,
            tile_height = self.config.tile_height,
            "tilemap_layers_rebuilt"
        );
    }

    fn update_slices(&mut self, left: i64, top: i64) {
        let (layer_width, layer_height) = self.config.layer_size();
        let (width, height) = self.config.padded_size();
        let x2 = left.rem_euclid(i64::from(layer_width)) as u32;
        let y2 = top.rem_euclid(i64::from(layer_height)) as u32;
        let w1 = (layer_width - x2).min(width);
        let h1 = (layer_height - y2).min(height);
        let w2 = width - w1;
        let h2 = height - h1;
        let (x2, y2) = (x2 as i32, y2 as i32);

        self.slices = [
            LayerSlice {
                src: PixelRect::new(x2, y2, w1, h1),
                dst_x: 0,
                dst_y: 0,
            },
            LayerSlice {
                src: PixelRect::new(0, y2, w2, h1),
                dst_x: w1 as i32,
                dst_y: 0,
            },
            LayerSlice {
                src: PixelRect::new(x2, 0, w1, h2),
                dst_x: 0,
                dst_y: h1 as i32,
            },
            LayerSlice {
                src: PixelRect::new(0, 0, w2, h2),
                dst_x: w1 as i32,
                dst_y: h1 as i32,
            },
        ];
    }

    fn paint_all(&mut self, start_x: i64, start_y: i64) -> FrameStats {
        let (cols, rows) = (self.cache.cols(), self.cache.rows());
        let tile_width = self.config.tile_width;
        let tile_height = self.config.tile_height;
        let mut compositor = Compositor::new(&self.images, &self.flags, tile_width, tile_height);
        let mut stats = FrameStats::default();

        for y in 0..rows {
            let map_y = saturate_i32(start_y + i64::from(y));
            let layer_row = i64::from(map_y).rem_euclid(i64::from(rows)) as u32;
            let dy = (layer_row * tile_height) as i32;
            let frame = self.clock.frame_for_row(map_y);

            for x in 0..cols {
                let map_x = saturate_i32(start_x + i64::from(x));
                let layer_col = i64::from(map_x).rem_euclid(i64::from(cols)) as u32;
                let dx = (layer_col * tile_width) as i32;

                let stack = resolve_cell_stack(
                    &self.map,
                    self.wrap,
                    &self.flags,
                    self.overpass.as_ref(),
                    map_x,
                    map_y,
                );

                for (layer, entries) in [
                    (LayerKind::Lower, stack.lower),
                    (LayerKind::Upper, stack.upper),
                ] {
                    let stale = match self.cache.read(layer, layer_row, layer_col) {
                        None => true,
                        Some(cached) => {
                            cached.entries != entries
                                || (is_animated(&entries) && cached.frame != frame)
                        }
                    };
                    if !stale {
                        continue;
                    }
                    let surface = match layer {
                        LayerKind::Lower => &mut self.lower,
                        LayerKind::Upper => &mut self.upper,
                    };
                    compositor.repaint_cell(surface, &entries, dx, dy, frame);
                    self.cache.write(layer, layer_row, layer_col, entries, frame);
                    match layer {
                        LayerKind::Lower => stats.lower_repainted += 1,
                        LayerKind::Upper => stats.upper_repainted += 1,
                    }
                }
            }
        }

        stats.paint = compositor.stats();
        stats
    }
}

// NaN maps to 0. Clamping keeps `origin - margin` inside i64.
fn pixel_origin(value: f64) -> i64 {
    saturate_i32(value.floor() as i64).into()
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
