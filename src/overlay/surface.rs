//! Overlay drawing surfaces
//!
//! The renderer talks to a [`DrawSurface`]; the raster implementation paints
//! into an RGBA buffer sized to the displayed image.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rectangle in surface coordinates; may extend past the surface bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Drawing operations the annotation renderer needs
pub trait DrawSurface {
    /// Resize the surface; contents are discarded
    fn resize(&mut self, width: u32, height: u32);
    fn dimensions(&self) -> (u32, u32);
    /// Make every pixel transparent
    fn clear(&mut self);
    fn stroke_rect(&mut self, rect: SurfaceRect, color: Rgba<u8>, line_width: f32);
    fn fill_rect(&mut self, rect: SurfaceRect, color: Rgba<u8>);
    /// Advance width of `text` in the active font
    fn measure_text(&self, text: &str) -> f32;
    /// Draw `text` with its baseline starting at (x, y)
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba<u8>);
}

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/truetype/nanum/NanumGothicBold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\malgunbd.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Load the label font from `path`, or from the first readable system font
pub fn load_font(path: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = path {
        match read_font(path) {
            Some(font) => return Some(font),
            None => warn!("Configured font {:?} could not be loaded, probing system fonts", path),
        }
    }

    FONT_CANDIDATES.iter().find_map(|candidate| {
        let font = read_font(Path::new(candidate))?;
        info!("Using label font {}", candidate);
        Some(font)
    })
}

fn read_font(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    FontArc::try_from_vec(data).ok()
}

/// RGBA raster surface
pub struct RasterSurface {
    canvas: RgbaImage,
    font: Option<FontArc>,
    font_size: f32,
    warned_missing_font: bool,
}

impl RasterSurface {
    pub fn new(font: Option<FontArc>, font_size: f32) -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            font,
            font_size,
            warned_missing_font: false,
        }
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }

    fn scale(&self) -> PxScale {
        PxScale::from(self.font_size)
    }
}

/// Integer rect for imageproc, `None` when it would be empty
fn pixel_rect(x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
    let w = width.round();
    let h = height.round();
    if w < 1.0 || h < 1.0 {
        return None;
    }
    Some(Rect::at(x.round() as i32, y.round() as i32).of_size(w as u32, h as u32))
}

impl DrawSurface for RasterSurface {
    fn resize(&mut self, width: u32, height: u32) {
        debug!("Overlay surface resized to {}x{}", width, height);
        self.canvas = RgbaImage::new(width, height);
    }

    fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn stroke_rect(&mut self, rect: SurfaceRect, color: Rgba<u8>, line_width: f32) {
        // The stroke is centered on the rectangle outline
        let passes = line_width.round().max(1.0) as i32;
        let half = line_width / 2.0;
        for i in 0..passes {
            let inset = i as f32;
            let outline = pixel_rect(
                rect.x - half + inset,
                rect.y - half + inset,
                rect.width + line_width - 2.0 * inset,
                rect.height + line_width - 2.0 * inset,
            );
            if let Some(outline) = outline {
                draw_hollow_rect_mut(&mut self.canvas, outline, color);
            }
        }
    }

    fn fill_rect(&mut self, rect: SurfaceRect, color: Rgba<u8>) {
        if let Some(area) = pixel_rect(rect.x, rect.y, rect.width, rect.height) {
            draw_filled_rect_mut(&mut self.canvas, area, color);
        }
    }

    fn measure_text(&self, text: &str) -> f32 {
        match &self.font {
            Some(font) => text_size(self.scale(), font, text).0 as f32,
            // Rough advance of a bold sans face
            None => text.chars().count() as f32 * self.font_size * 0.6,
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba<u8>) {
        let Some(font) = &self.font else {
            if !self.warned_missing_font {
                warn!("No label font available; labels are drawn without text");
                self.warned_missing_font = true;
            }
            return;
        };

        let scale = self.scale();
        let ascent = font.as_scaled(scale).ascent();
        let top = (y - ascent).round() as i32;
        draw_text_mut(&mut self.canvas, color, x.round() as i32, top, scale, font, text);
    }
}
