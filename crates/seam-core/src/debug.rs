use std::path::Path;
use std::time::Duration;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::frame::Frame;
use crate::rect::PixelRect;

const TEXT_SCALE: f32 = 16.0;
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_LINE_HEIGHT: i32 = 18;
const PANEL_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Renders merged frames with panel outlines and timing text.
pub struct DebugRenderer {
    font: Option<FontVec>,
}

impl DebugRenderer {
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = font_path.and_then(Self::load_font);
        Self { font }
    }

    /// Dump every merged frame, numbered in playback order.
    pub fn save_frames(&self, frames: &[Frame], panels: &[PixelRect], dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut start = Duration::ZERO;
        for (index, frame) in frames.iter().enumerate() {
            self.save_frame(index, frame, start, panels, dir)?;
            start += frame.duration.unwrap_or_default();
        }

        info!(?dir, frames = frames.len(), "saved debug frames");
        Ok(())
    }

    pub fn save_frame(
        &self,
        index: usize,
        frame: &Frame,
        start: Duration,
        panels: &[PixelRect],
        dir: &Path,
    ) -> Result<()> {
        let mut img = frame.image.clone();

        for panel in panels {
            let rect = Rect::at(panel.x as i32, panel.y as i32).of_size(panel.w, panel.h);
            draw_hollow_rect_mut(&mut img, rect, PANEL_COLOR);
        }

        self.draw_text_overlay(&mut img, index, frame, start);

        let path = dir.join(format!("frame_{index:06}.png"));
        img.save(&path)
            .with_context(|| format!("failed to save debug frame to {}", path.display()))?;

        debug!(?path, "saved debug frame");
        Ok(())
    }

    fn draw_text_overlay(&self, img: &mut RgbaImage, index: usize, frame: &Frame, start: Duration) {
        let Some(font) = &self.font else { return };
        let scale = PxScale::from(TEXT_SCALE);
        let x = 4;
        let mut y = 4;

        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &format!("#{index}"));
        y += TEXT_LINE_HEIGHT;

        let start_text = format!("t:{}ms", start.as_millis());
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &start_text);
        y += TEXT_LINE_HEIGHT;

        let duration_text = match frame.duration {
            Some(d) => format!("d:{}ms", d.as_millis()),
            None => "d:--".to_string(),
        };
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &duration_text);
    }

    fn load_font(path: &Path) -> Option<FontVec> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(?path, error = %e, "failed to read font file");
                return None;
            }
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(?path, "loaded debug font");
                Some(font)
            }
            Err(e) => {
                warn!(?path, error = %e, "failed to parse font file");
                None
            }
        }
    }
}
