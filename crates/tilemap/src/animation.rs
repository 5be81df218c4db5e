pub const TICKS_PER_ANIMATION_FRAME: i64 = 30;
pub const WATER_SURFACE_SEQUENCE: [u16; 4] = [0, 1, 2, 1];
pub const WATERFALL_FRAME_COUNT: i64 = 3;
const ROW_STAGGER_BASE: i64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationClock {
    tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationFrame(pub i64);

impl AnimationFrame {
    pub fn water_surface_index(self) -> u16 {
        let slot = self.0.rem_euclid(WATER_SURFACE_SEQUENCE.len() as i64);
        WATER_SURFACE_SEQUENCE[slot as usize]
    }

    pub fn waterfall_index(self) -> u16 {
        self.0.rem_euclid(WATERFALL_FRAME_COUNT) as u16
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(tick: u64) -> Self {
        Self { tick }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn frame(&self) -> AnimationFrame {
        AnimationFrame(self.signed_tick() / TICKS_PER_ANIMATION_FRAME)
    }

    pub fn water_surface_index(&self) -> u16 {
        self.frame().water_surface_index()
    }

    pub fn waterfall_index(&self) -> u16 {
        self.frame().waterfall_index()
    }

    /// Frame used when painting map row `map_y`.
    ///
    /// Each row lags the one above it by a tick, so water ripples travel
    /// diagonally instead of flipping the whole screen at once.
    pub fn frame_for_row(&self, map_y: i32) -> AnimationFrame {
        let count = ROW_STAGGER_BASE + self.signed_tick() - i64::from(map_y);
        AnimationFrame(count.div_euclid(TICKS_PER_ANIMATION_FRAME))
    }

    fn signed_tick(&self) -> i64 {
        i64::try_from(self.tick).unwrap_or(i64::MAX)
    }
}
