use thiserror::Error;
use tilemap::{
    load_map, load_tileset, AssetError, ConfigError, FrameStats, Surface, SurfaceError, Tilemap,
    TilemapConfig,
};
use tracing::info;

use crate::cli::ViewerOptions;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid tilemap configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] winit::error::EventLoopError),
    #[error("failed to create viewer window: {0}")]
    CreateWindow(#[source] winit::error::OsError),
    #[error("failed to initialize pixel buffer: {0}")]
    CreatePixels(#[source] pixels::Error),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] winit::error::EventLoopError),
}

pub struct ViewerSession {
    tilemap: Tilemap,
    scroll_x: f64,
    scroll_y: f64,
    frame: Surface,
}

impl ViewerSession {
    pub fn load(options: &ViewerOptions) -> Result<Self, ViewerError> {
        let mut tilemap = Tilemap::new(TilemapConfig::default())?;
        let map = load_map(&options.map_path)?;
        let tileset = load_tileset(&options.tileset_path, &options.assets_dir)?;

        info!(
            map = %options.map_path.display(),
            map_width = map.map.width(),
            map_height = map.map.height(),
            horizontal_wrap = map.wrap.horizontal,
            vertical_wrap = map.wrap.vertical,
            tileset_images = tileset.images.loaded_count(),
            "viewer_session_loaded"
        );

        tilemap.set_map(map.map);
        tilemap.set_wrap(map.wrap.horizontal, map.wrap.vertical);
        tilemap.set_flags(tileset.flags);
        tilemap.set_tileset_images(tileset.images);
        tilemap.refresh();
        Ok(Self::new(tilemap, options.scroll_x, options.scroll_y))
    }

    pub fn new(tilemap: Tilemap, scroll_x: f64, scroll_y: f64) -> Self {
        let config = tilemap.config();
        let frame = Surface::new(config.screen_width, config.screen_height);
        Self {
            tilemap,
            scroll_x,
            scroll_y,
            frame,
        }
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn screen_size(&self) -> (u32, u32) {
        self.frame.size()
    }

    pub fn nudge_scroll(&mut self, dx: f64, dy: f64) {
        self.scroll_x += dx;
        self.scroll_y += dy;
    }

    pub fn step(&mut self) {
        self.tilemap.update();
        let (x, y) = self.tilemap.origin();
        self.tilemap.set_origin(x + self.scroll_x, y + self.scroll_y);
    }

    pub fn render_frame(&mut self) -> FrameStats {
        let stats = self.tilemap.render();
        self.frame.clear();
        self.tilemap.compose_frame(&mut self.frame);
        stats
    }

    pub fn frame(&self) -> &Surface {
        &self.frame
    }
}
