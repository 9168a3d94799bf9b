// Render surface collaborator: the handful of 2D primitives the wheel needs.
// Implemented by the web canvas and by the recording display list.

use serde::{Deserialize, Serialize};

use crate::error::WheelError;

/// Straight (non-premultiplied) RGBA color, alpha in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    /// CSS color string, `#rrggbb` when opaque.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Pixel dimensions of a surface or layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        SurfaceSize { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Radius of the inscribed circle.
    pub fn inner_radius(&self) -> f64 {
        (self.width.min(self.height) as f64) / 2.0
    }
}

/// A pie slice from `start` to `end` (radians, clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub center: Point,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Text drawn right-aligned at (`x`, `y`) in a frame rotated by `rotation`
/// about `origin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub origin: Point,
    pub rotation: f64,
    pub x: f64,
    pub y: f64,
    pub font_px: u32,
    pub color: Rgba,
}

impl Label {
    /// CSS font shorthand for the label.
    pub fn font(&self) -> String {
        format!("bold {}px Arial", self.font_px)
    }
}

/// Drawing primitives for an off-screen layer.
pub trait Painter {
    /// Wipe to transparent.
    fn clear(&mut self) -> Result<(), WheelError>;

    fn draw_sector(
        &mut self,
        sector: &Sector,
        fill: Rgba,
        outline: Option<Outline>,
    ) -> Result<(), WheelError>;

    /// Fill a full disc with a radial gradient running from the center outwards.
    fn shade_disc(
        &mut self,
        center: Point,
        radius: f64,
        stops: &[GradientStop],
    ) -> Result<(), WheelError>;

    fn draw_label(&mut self, label: &Label) -> Result<(), WheelError>;
}

/// The visible drawing surface.
pub trait Surface {
    /// Off-screen image the surface can create and blit.
    type Layer: Painter;

    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize) -> Result<(), WheelError>;

    fn create_layer(&mut self, size: SurfaceSize) -> Result<Self::Layer, WheelError>;

    fn layer_size(layer: &Self::Layer) -> SurfaceSize;

    /// Clear, then copy `layer` rotated by `rotation` about the surface center.
    fn blit_rotated(&mut self, layer: &Self::Layer, rotation: f64) -> Result<(), WheelError>;
}
