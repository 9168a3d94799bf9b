// Display-list surface: records every primitive instead of rasterizing.
// Used for headless rendering and for inspecting what the engine drew.

use serde::{Deserialize, Serialize};

use crate::error::WheelError;
use crate::surface::*;

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum DrawOp {
    Clear,
    Sector {
        sector: Sector,
        fill: Rgba,
        outline: Option<Outline>,
    },
    Shade {
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
    Label(Label),
    /// A layer copied onto the surface; `layer_ops` is the layer's op count.
    Blit { rotation: f64, layer_ops: usize },
}

/// Off-screen layer of a [`RecordingSurface`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedLayer {
    size: SurfaceSize,
    ops: Vec<DrawOp>,
}

impl RecordedLayer {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn sectors(&self) -> impl Iterator<Item = (&Sector, &Rgba)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Sector { sector, fill, .. } => Some((sector, fill)),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Label(label) => Some(label),
            _ => None,
        })
    }
}

fn record_clear(ops: &mut Vec<DrawOp>) {
    // Clearing discards everything drawn so far.
    ops.clear();
    ops.push(DrawOp::Clear);
}

impl Painter for RecordedLayer {
    fn clear(&mut self) -> Result<(), WheelError> {
        record_clear(&mut self.ops);
        Ok(())
    }

    fn draw_sector(
        &mut self,
        sector: &Sector,
        fill: Rgba,
        outline: Option<Outline>,
    ) -> Result<(), WheelError> {
        self.ops.push(DrawOp::Sector {
            sector: *sector,
            fill,
            outline,
        });
        Ok(())
    }

    fn shade_disc(
        &mut self,
        center: Point,
        radius: f64,
        stops: &[GradientStop],
    ) -> Result<(), WheelError> {
        self.ops.push(DrawOp::Shade {
            center,
            radius,
            stops: stops.to_vec(),
        });
        Ok(())
    }

    fn draw_label(&mut self, label: &Label) -> Result<(), WheelError> {
        self.ops.push(DrawOp::Label(label.clone()));
        Ok(())
    }
}

/// Visible surface that keeps the ops of the current frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingSurface {
    size: SurfaceSize,
    ops: Vec<DrawOp>,
    layers_created: usize,
    frames_presented: usize,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        RecordingSurface {
            size,
            ..Default::default()
        }
    }

    /// Ops drawn since the last clear.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Rotation of the most recent blit, if any.
    pub fn last_rotation(&self) -> Option<f64> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Blit { rotation, .. } => Some(*rotation),
            _ => None,
        })
    }

    pub fn layers_created(&self) -> usize {
        self.layers_created
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// The current frame as JSON.
    pub fn to_json(&self) -> Result<String, WheelError> {
        Ok(serde_json::to_string(&self.ops)?)
    }
}

impl Surface for RecordingSurface {
    type Layer = RecordedLayer;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), WheelError> {
        self.size = size;
        self.ops.clear();
        Ok(())
    }

    fn create_layer(&mut self, size: SurfaceSize) -> Result<RecordedLayer, WheelError> {
        self.layers_created += 1;
        Ok(RecordedLayer {
            size,
            ops: Vec::new(),
        })
    }

    fn layer_size(layer: &RecordedLayer) -> SurfaceSize {
        layer.size
    }

    fn blit_rotated(&mut self, layer: &RecordedLayer, rotation: f64) -> Result<(), WheelError> {
        record_clear(&mut self.ops);
        self.ops.push(DrawOp::Blit {
            rotation,
            layer_ops: layer.ops.len(),
        });
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_replaces_previous_frame() {
        let mut surface = RecordingSurface::new(SurfaceSize::new(100, 100));
        let layer = surface.create_layer(SurfaceSize::new(100, 100)).unwrap();
        surface.blit_rotated(&layer, 0.5).unwrap();
        surface.blit_rotated(&layer, 1.5).unwrap();

        assert_eq!(surface.ops().len(), 2);
        assert_eq!(surface.last_rotation(), Some(1.5));
        assert_eq!(surface.frames_presented(), 2);
        assert_eq!(surface.layers_created(), 1);
    }

    #[test]
    fn frame_serializes_with_op_tags() {
        let mut surface = RecordingSurface::new(SurfaceSize::new(10, 10));
        let layer = surface.create_layer(SurfaceSize::new(10, 10)).unwrap();
        surface.blit_rotated(&layer, 0.0).unwrap();
        let json = surface.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"op":"Clear"},{"op":"Blit","rotation":0.0,"layer_ops":0}]"#
        );
    }
}
