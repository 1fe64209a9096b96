//! Coordinate mapping between original image pixels and the displayed image

use serde::{Deserialize, Serialize};

use crate::vision::BoundingBox;

/// Natural and displayed size of the annotated image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub natural_width: u32,
    pub natural_height: u32,
    pub displayed_width: u32,
    pub displayed_height: u32,
}

impl ImageGeometry {
    /// Whether the natural size is known, i.e. the image finished loading
    pub fn is_ready(&self) -> bool {
        self.natural_width > 0 && self.natural_height > 0
    }
}

/// Per-axis ratio of displayed to natural pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ScaleFactor {
    /// Map a box from natural to displayed coordinates, each axis independently
    pub fn apply(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: bbox.x1 * self.scale_x,
            y1: bbox.y1 * self.scale_y,
            x2: bbox.x2 * self.scale_x,
            y2: bbox.y2 * self.scale_y,
        }
    }
}

/// Scale factor for the given geometry, or `None` before the image has a
/// natural size.
pub fn compute_scale(geometry: &ImageGeometry) -> Option<ScaleFactor> {
    if !geometry.is_ready() {
        return None;
    }
    Some(ScaleFactor {
        scale_x: geometry.displayed_width as f64 / geometry.natural_width as f64,
        scale_y: geometry.displayed_height as f64 / geometry.natural_height as f64,
    })
}

/// Constraints the page applies when laying out the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstraints {
    /// Maximum displayed height in pixels
    pub max_height: u32,
    /// Maximum displayed width as a fraction of the viewport width
    pub max_width_fraction: f64,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            max_height: 400,
            max_width_fraction: 1.0,
        }
    }
}

impl LayoutConstraints {
    /// Displayed size of an image of `natural` size inside a viewport.
    ///
    /// Aspect ratio is preserved and the image is never upscaled. Returns
    /// `None` if the natural size is unknown.
    pub fn displayed_size(&self, natural: (u32, u32), viewport: (u32, u32)) -> Option<(u32, u32)> {
        let (nw, nh) = natural;
        if nw == 0 || nh == 0 {
            return None;
        }

        let max_w = (viewport.0 as f64 * self.max_width_fraction).max(1.0);
        let max_h = (self.max_height as f64).max(1.0);
        let ratio = (max_w / nw as f64).min(max_h / nh as f64).min(1.0);

        let w = ((nw as f64 * ratio).round() as u32).max(1);
        let h = ((nh as f64 * ratio).round() as u32).max(1);
        Some((w, h))
    }

    /// Full geometry for the current viewport
    pub fn measure(&self, natural: (u32, u32), viewport: (u32, u32)) -> Option<ImageGeometry> {
        let (displayed_width, displayed_height) = self.displayed_size(natural, viewport)?;
        Some(ImageGeometry {
            natural_width: natural.0,
            natural_height: natural.1,
            displayed_width,
            displayed_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_scale() {
        let geometry = ImageGeometry {
            natural_width: 1000,
            natural_height: 500,
            displayed_width: 500,
            displayed_height: 250,
        };
        let scale = compute_scale(&geometry).unwrap();
        assert_eq!(scale.scale_x, 0.5);
        assert_eq!(scale.scale_y, 0.5);

        let scaled = scale.apply(&BoundingBox::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(scaled, BoundingBox::new(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn test_not_ready_without_natural_size() {
        let geometry = ImageGeometry {
            natural_width: 0,
            natural_height: 500,
            displayed_width: 500,
            displayed_height: 250,
        };
        assert!(compute_scale(&geometry).is_none());
    }

    #[test]
    fn test_axes_independent() {
        let geometry = ImageGeometry {
            natural_width: 200,
            natural_height: 100,
            displayed_width: 100,
            displayed_height: 100,
        };
        let scale = compute_scale(&geometry).unwrap();
        assert_eq!(scale.scale_x, 0.5);
        assert_eq!(scale.scale_y, 1.0);
    }

    #[test]
    fn test_layout_height_bound() {
        let layout = LayoutConstraints::default();
        assert_eq!(layout.displayed_size((1000, 800), (1920, 1080)), Some((500, 400)));
    }

    #[test]
    fn test_layout_width_bound() {
        let layout = LayoutConstraints::default();
        assert_eq!(layout.displayed_size((1000, 200), (500, 900)), Some((500, 100)));
    }

    #[test]
    fn test_layout_never_upscales() {
        let layout = LayoutConstraints::default();
        assert_eq!(layout.displayed_size((320, 240), (1920, 1080)), Some((320, 240)));
    }

    #[test]
    fn test_layout_unknown_natural_size() {
        let layout = LayoutConstraints::default();
        assert!(layout.measure((0, 0), (800, 600)).is_none());
    }
}
