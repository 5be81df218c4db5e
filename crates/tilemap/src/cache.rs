use crate::animation::AnimationFrame;
use crate::compositor::StackEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Lower,
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCell {
    pub entries: Vec<StackEntry>,
    pub frame: AnimationFrame,
}

/// Dense per-layer memo of painted cells, addressed by the cell's position
/// on the layer surface (not by map coordinate).
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    cols: u32,
    rows: u32,
    lower: Vec<Option<CachedCell>>,
    upper: Vec<Option<CachedCell>>,
}

impl RenderCache {
    pub fn new(cols: u32, rows: u32) -> Self {
        let len = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            lower: vec![None; len],
            upper: vec![None; len],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn read(&self, layer: LayerKind, row: u32, col: u32) -> Option<&CachedCell> {
        let index = self.index_of(row, col)?;
        self.grid(layer)[index].as_ref()
    }

    pub fn write(
        &mut self,
        layer: LayerKind,
        row: u32,
        col: u32,
        entries: Vec<StackEntry>,
        frame: AnimationFrame,
    ) {
        let Some(index) = self.index_of(row, col) else {
            return;
        };
        let grid = match layer {
            LayerKind::Lower => &mut self.lower,
            LayerKind::Upper => &mut self.upper,
        };
        grid[index] = Some(CachedCell { entries, frame });
    }

    pub fn clear(&mut self) {
        self.lower.iter_mut().for_each(|cell| *cell = None);
        self.upper.iter_mut().for_each(|cell| *cell = None);
    }

    pub fn occupied(&self, layer: LayerKind) -> usize {
        self.grid(layer).iter().filter(|cell| cell.is_some()).count()
    }

    fn grid(&self, layer: LayerKind) -> &[Option<CachedCell>] {
        match layer {
            LayerKind::Lower => &self.lower,
            LayerKind::Upper => &self.upper,
        }
    }

    fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_cells_are_absent_not_empty() {
        let mut cache = RenderCache::new(3, 2);
        assert!(cache.read(LayerKind::Lower, 1, 2).is_none());

        cache.write(LayerKind::Lower, 1, 2, Vec::new(), AnimationFrame(0));
        let cell = cache.read(LayerKind::Lower, 1, 2).expect("cell");
        assert!(cell.entries.is_empty());
    }

    #[test]
    fn layers_are_independent() {
        let mut cache = RenderCache::new(2, 2);
        cache.write(
            LayerKind::Upper,
            0,
            1,
            vec![StackEntry::Tile(5)],
            AnimationFrame(7),
        );
        assert!(cache.read(LayerKind::Lower, 0, 1).is_none());
        let cell = cache.read(LayerKind::Upper, 0, 1).expect("cell");
        assert_eq!(cell.entries, vec![StackEntry::Tile(5)]);
        assert_eq!(cell.frame, AnimationFrame(7));
    }

    #[test]
    fn writes_overwrite_previous_entries() {
        let mut cache = RenderCache::new(1, 1);
        cache.write(LayerKind::Lower, 0, 0, vec![StackEntry::Tile(1)], AnimationFrame(0));
        cache.write(LayerKind::Lower, 0, 0, vec![StackEntry::Shadow(3)], AnimationFrame(1));
        let cell = cache.read(LayerKind::Lower, 0, 0).expect("cell");
        assert_eq!(cell.entries, vec![StackEntry::Shadow(3)]);
        assert_eq!(cell.frame, AnimationFrame(1));
    }

    #[test]
    fn out_of_grid_access_is_ignored() {
        let mut cache = RenderCache::new(2, 2);
        cache.write(LayerKind::Lower, 2, 0, vec![StackEntry::Tile(1)], AnimationFrame(0));
        assert_eq!(cache.occupied(LayerKind::Lower), 0);
        assert!(cache.read(LayerKind::Lower, 0, 2).is_none());
    }

    #[test]
    fn clear_drops_both_layers() {
        let mut cache = RenderCache::new(2, 2);
        cache.write(LayerKind::Lower, 0, 0, Vec::new(), AnimationFrame(0));
        cache.write(LayerKind::Upper, 1, 1, Vec::new(), AnimationFrame(0));
        cache.clear();
        assert_eq!(cache.occupied(LayerKind::Lower), 0);
        assert_eq!(cache.occupied(LayerKind::Upper), 0);
        assert_eq!((cache.cols(), cache.rows()), (2, 2));
    }
}
