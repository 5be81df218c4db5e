use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader, RgbaImage};
use thiserror::Error;

pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub trait RasterTarget {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn blit(&mut self, source: &Surface, src: PixelRect, dst_x: i32, dst_y: i32);
    fn fill_rect(&mut self, rect: PixelRect, color: [u8; 4]);
    fn clear_rect(&mut self, rect: PixelRect);
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("rgba buffer for {width}x{height} must be {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, SurfaceError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SurfaceError::SizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn load_png(path: &Path) -> Result<Self, SurfaceError> {
        let reader = ImageReader::open(path).map_err(|source| SurfaceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| SurfaceError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decoded.to_rgba8();
        Ok(Self {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), SurfaceError> {
        let expected = self.width as usize * self.height as usize * 4;
        let Some(image) = RgbaImage::from_raw(self.width, self.height, self.rgba.clone()) else {
            return Err(SurfaceError::SizeMismatch {
                width: self.width,
                height: self.height,
                expected,
                actual: self.rgba.len(),
            });
        };
        image.save(path).map_err(|source| SurfaceError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }

    pub fn clear(&mut self) {
        self.rgba.fill(0);
    }

    fn clip_to_self(&self, rect: PixelRect) -> Option<(u32, u32, u32, u32)> {
        let left = rect.x.max(0);
        let top = rect.y.max(0);
        let right = (i64::from(rect.x) + i64::from(rect.width)).min(i64::from(self.width));
        let bottom = (i64::from(rect.y) + i64::from(rect.height)).min(i64::from(self.height));
        if i64::from(left) >= right || i64::from(top) >= bottom {
            return None;
        }
        Some((left as u32, top as u32, right as u32, bottom as u32))
    }
}

impl RasterTarget for Surface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn blit(&mut self, source: &Surface, src: PixelRect, dst_x: i32, dst_y: i32) {
        if src.is_empty() {
            return;
        }
        let Some((src_left, src_top, src_right, src_bottom)) = source.clip_to_self(src) else {
            return;
        };
        // Shift the destination by however much the source was clipped.
        let dst_left = i64::from(dst_x) + i64::from(src_left) - i64::from(src.x);
        let dst_top = i64::from(dst_y) + i64::from(src_top) - i64::from(src.y);

        let dst_width = self.width as usize;
        let src_width = source.width as usize;
        for row in 0..(src_bottom - src_top) {
            let out_y = dst_top + i64::from(row);
            if out_y < 0 || out_y >= i64::from(self.height) {
                continue;
            }
            let sy = (src_top + row) as usize;
            for col in 0..(src_right - src_left) {
                let out_x = dst_left + i64::from(col);
                if out_x < 0 || out_x >= i64::from(self.width) {
                    continue;
                }
                let sx = (src_left + col) as usize;
                let src_offset = (sy * src_width + sx) * 4;
                let mut color = [0u8; 4];
                color.copy_from_slice(&source.rgba[src_offset..src_offset + 4]);
                let dst_offset = (out_y as usize * dst_width + out_x as usize) * 4;
                blend_source_over(&mut self.rgba[dst_offset..dst_offset + 4], color);
            }
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, color: [u8; 4]) {
        let Some((left, top, right, bottom)) = self.clip_to_self(rect) else {
            return;
        };
        let width = self.width as usize;
        for y in top..bottom {
            for x in left..right {
                let offset = (y as usize * width + x as usize) * 4;
                blend_source_over(&mut self.rgba[offset..offset + 4], color);
            }
        }
    }

    fn clear_rect(&mut self, rect: PixelRect) {
        let Some((left, top, right, bottom)) = self.clip_to_self(rect) else {
            return;
        };
        let width = self.width as usize;
        for y in top..bottom {
            let start = (y as usize * width + left as usize) * 4;
            let end = (y as usize * width + right as usize) * 4;
            self.rgba[start..end].fill(0);
        }
    }
}

fn blend_source_over(dst: &mut [u8], src: [u8; 4]) {
    let src_alpha = u32::from(src[3]);
    if src_alpha == 0 {
        return;
    }
    if src_alpha == 255 {
        dst.copy_from_slice(&src);
        return;
    }
    let dst_alpha = u32::from(dst[3]);
    let dst_weight = dst_alpha * (255 - src_alpha) / 255;
    let out_alpha = src_alpha + dst_weight;
    for channel in 0..3 {
        let blended =
            (u32::from(src[channel]) * src_alpha + u32::from(dst[channel]) * dst_weight) / out_alpha;
        dst[channel] = blended as u8;
    }
    dst[3] = out_alpha as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn checker(width: u32, height: u32) -> Surface {
        let mut surface = Surface::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let color = if (x + y) % 2 == 0 { RED } else { BLUE };
                surface.fill_rect(PixelRect::new(x as i32, y as i32, 1, 1), color);
            }
        }
        surface
    }

    #[test]
    fn blit_copies_opaque_region() {
        let source = checker(4, 4);
        let mut target = Surface::new(8, 8);
        target.blit(&source, PixelRect::new(1, 1, 2, 2), 5, 6);

        assert_eq!(target.pixel(5, 6), Some(RED));
        assert_eq!(target.pixel(6, 6), Some(BLUE));
        assert_eq!(target.pixel(5, 7), Some(BLUE));
        assert_eq!(target.pixel(4, 6), Some(TRANSPARENT));
    }

    #[test]
    fn blit_clips_against_source_and_destination() {
        let source = Surface::filled(4, 4, RED);
        let mut target = Surface::new(4, 4);
        target.blit(&source, PixelRect::new(-2, 2, 4, 4), 0, -1);

        // Source rows 2..4 and columns 0..2 survive, shifted by the clip.
        assert_eq!(target.pixel(2, 0), Some(RED));
        assert_eq!(target.pixel(3, 0), Some(RED));
        assert_eq!(target.pixel(3, 1), Some(TRANSPARENT));
        assert_eq!(target.pixel(1, 0), Some(TRANSPARENT));
    }

    #[test]
    fn blit_with_out_of_range_rect_is_a_no_op() {
        let source = Surface::filled(2, 2, RED);
        let mut target = Surface::new(2, 2);
        target.blit(&source, PixelRect::new(5, 5, 2, 2), 0, 0);
        target.blit(&source, PixelRect::new(0, 0, 2, 2), 10, 10);
        assert!(target.as_rgba().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn transparent_source_pixels_leave_destination_untouched() {
        let source = Surface::new(2, 2);
        let mut target = Surface::filled(2, 2, BLUE);
        target.blit(&source, PixelRect::new(0, 0, 2, 2), 0, 0);
        assert_eq!(target.pixel(1, 1), Some(BLUE));
    }

    #[test]
    fn half_alpha_fill_darkens_opaque_pixels() {
        let mut target = Surface::filled(2, 2, [200, 100, 50, 255]);
        target.fill_rect(PixelRect::new(0, 0, 1, 1), [0, 0, 0, 128]);
        assert_eq!(target.pixel(0, 0), Some([99, 49, 24, 255]));
        assert_eq!(target.pixel(1, 0), Some([200, 100, 50, 255]));
    }

    #[test]
    fn half_alpha_fill_on_transparent_keeps_its_own_alpha() {
        let mut target = Surface::new(1, 1);
        target.fill_rect(PixelRect::new(0, 0, 1, 1), [0, 0, 0, 128]);
        assert_eq!(target.pixel(0, 0), Some([0, 0, 0, 128]));
    }

    #[test]
    fn clear_rect_resets_only_the_region() {
        let mut target = Surface::filled(3, 3, RED);
        target.clear_rect(PixelRect::new(1, 1, 5, 5));
        assert_eq!(target.pixel(0, 0), Some(RED));
        assert_eq!(target.pixel(1, 1), Some(TRANSPARENT));
        assert_eq!(target.pixel(2, 2), Some(TRANSPARENT));
        assert_eq!(target.pixel(2, 0), Some(RED));
    }

    #[test]
    fn from_rgba_validates_length() {
        let err = Surface::from_rgba(2, 2, vec![0; 15]).expect_err("err");
        assert!(matches!(
            err,
            SurfaceError::SizeMismatch {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("checker.png");
        let source = checker(3, 2);
        source.save_png(&path).expect("save");
        let loaded = Surface::load_png(&path).expect("load");
        assert_eq!(loaded, source);
    }

    #[test]
    fn load_png_reports_missing_file() {
        let temp = TempDir::new().expect("temp");
        let err = Surface::load_png(&temp.path().join("missing.png")).expect_err("err");
        assert!(matches!(err, SurfaceError::Open { .. }));
    }
}
