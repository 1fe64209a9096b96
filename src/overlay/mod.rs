//! Overlay Presentation Layer
//!
//! Draws detection boxes, labels and risk colors on a surface aligned
//! pixel-for-pixel with the displayed image, plus the legend listed below it.

pub mod events;
pub mod geometry;
pub mod legend;
pub mod renderer;
pub mod surface;
pub mod sync;
pub mod widgets;

use image::{imageops, DynamicImage, RgbaImage};

pub use events::ViewportEvents;
pub use legend::{render_legend, LegendEntry};
pub use surface::{load_font, DrawSurface, RasterSurface};
pub use sync::OverlayController;

/// Scale `image` to the overlay size and paint the overlay on top
pub fn compose_annotated(image: &DynamicImage, overlay: &RgbaImage) -> RgbaImage {
    let (width, height) = overlay.dimensions();
    let mut base = if image.width() == width && image.height() == height {
        image.to_rgba8()
    } else {
        imageops::resize(&image.to_rgba8(), width, height, imageops::FilterType::Triangle)
    };
    imageops::overlay(&mut base, overlay, 0, 0);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_compose_scales_base_to_overlay() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([0, 0, 255, 255])));
        let mut overlay = RgbaImage::new(50, 25);
        overlay.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

        let composed = compose_annotated(&image, &overlay);

        assert_eq!(composed.dimensions(), (50, 25));
        assert_eq!(*composed.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        let base = composed.get_pixel(10, 10);
        assert!(base.0[2] > 250 && base.0[0] < 5);
    }
}
