use std::path::Path;

use sha2::{Digest, Sha256};
use tilemap::Surface;
use tracing::info;

use crate::session::{ViewerError, ViewerSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub frames: u32,
    pub cells_repainted: u64,
    pub draw_calls: u64,
    pub digest_hex: String,
}

pub fn run_snapshot(
    session: &mut ViewerSession,
    frames: u32,
    path: &Path,
) -> Result<SnapshotSummary, ViewerError> {
    let frames = frames.max(1);
    let mut cells_repainted = 0u64;
    let mut draw_calls = 0u64;
    for index in 0..frames {
        if index > 0 {
            session.step();
        }
        let stats = session.render_frame();
        cells_repainted += u64::from(stats.cells_repainted());
        draw_calls += u64::from(stats.draw_calls());
    }

    session.frame().save_png(path)?;
    let digest_hex = frame_digest(session.frame());
    info!(
        path = %path.display(),
        frames,
        cells_repainted,
        draw_calls,
        digest = %digest_hex,
        "snapshot_written"
    );
    Ok(SnapshotSummary {
        frames,
        cells_repainted,
        draw_calls,
        digest_hex,
    })
}

pub fn frame_digest(frame: &Surface) -> String {
    let (width, height) = frame.size();
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(frame.as_rgba());
    to_hex_lower(&hasher.finalize())
}

fn to_hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
