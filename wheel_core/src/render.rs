// Render cache: the unrotated wheel drawn once into an off-screen layer, then
// blitted under a single rotation per frame. Rebuilt only when entries or size change.

use log::debug;

use crate::entries::EntryList;
use crate::error::WheelError;
use crate::geometry::{color_for_segment, label_color_for, segment_span, PALETTE};
use crate::surface::*;

/// Segments drawn when there are no entries.
pub const PLACEHOLDER_SEGMENTS: usize = 10;

/// Gap between the wheel rim and the surface edge.
const RIM_INSET: f64 = 5.0;
/// Labels end this far inside the rim.
const LABEL_RIM_OFFSET: f64 = 20.0;
/// Baseline shift so labels sit centred on the segment's bisector.
const LABEL_BASELINE: f64 = 5.0;

const SEGMENT_OUTLINE: Outline = Outline {
    color: Rgba::rgba(0, 0, 0, 0.1),
    width: 1.0,
};

const SHADING: [GradientStop; 3] = [
    GradientStop {
        offset: 0.0,
        color: Rgba::rgba(255, 255, 255, 0.1),
    },
    GradientStop {
        offset: 0.5,
        color: Rgba::TRANSPARENT,
    },
    GradientStop {
        offset: 1.0,
        color: Rgba::rgba(0, 0, 0, 0.15),
    },
];

/// Which segments get a text label, bounding draw cost on big lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelDensity {
    All,
    /// Every n-th segment, starting at 0.
    Every(usize),
    Hidden,
}

impl LabelDensity {
    pub fn for_count(count: usize) -> Self {
        match count {
            0..=100 => LabelDensity::All,
            101..=300 => LabelDensity::Every(count.div_ceil(50)),
            _ => LabelDensity::Hidden,
        }
    }

    pub fn labels(&self, index: usize) -> bool {
        match *self {
            LabelDensity::All => true,
            LabelDensity::Every(n) => index % n == 0,
            LabelDensity::Hidden => false,
        }
    }
}

/// Font size and truncation for labels, shrinking as the wheel fills up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTier {
    pub font_px: u32,
    pub max_chars: usize,
}

impl LabelTier {
    pub fn for_count(count: usize) -> Self {
        match count {
            0..=50 => LabelTier {
                font_px: 14,
                max_chars: 15,
            },
            51..=100 => LabelTier {
                font_px: 12,
                max_chars: 10,
            },
            _ => LabelTier {
                font_px: 10,
                max_chars: 8,
            },
        }
    }

    pub fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_chars) {
            Some((cut, _)) => &text[..cut],
            None => text,
        }
    }
}

/// Radius of the drawn wheel on a surface of `size`.
pub fn wheel_radius(size: SurfaceSize) -> f64 {
    (size.inner_radius() - RIM_INSET).max(0.0)
}

/// Draw the complete unrotated wheel onto `painter`.
pub fn paint_wheel<P: Painter + ?Sized>(
    painter: &mut P,
    entries: &EntryList,
    size: SurfaceSize,
) -> Result<(), WheelError> {
    let center = size.center();
    let radius = wheel_radius(size);

    painter.clear()?;

    let count = entries.len();
    let total = if count == 0 { PLACEHOLDER_SEGMENTS } else { count };
    let density = LabelDensity::for_count(count);
    let tier = LabelTier::for_count(count);

    for i in 0..total {
        let (start, end) = segment_span(i, total);
        let color_index = color_for_segment(i, total);
        let sector = Sector {
            center,
            radius,
            start,
            end,
        };
        painter.draw_sector(&sector, PALETTE[color_index], Some(SEGMENT_OUTLINE))?;

        let Some(text) = entries.get(i) else {
            continue;
        };
        if density.labels(i) {
            painter.draw_label(&Label {
                text: tier.truncate(text).to_string(),
                origin: center,
                rotation: (start + end) / 2.0,
                x: radius - LABEL_RIM_OFFSET,
                y: LABEL_BASELINE,
                font_px: tier.font_px,
                color: label_color_for(color_index),
            })?;
        }
    }

    painter.shade_disc(center, radius, &SHADING)
}

/// Off-screen copy of the unrotated wheel plus its validity flag.
pub struct RenderCache<L> {
    layer: Option<L>,
    valid: bool,
    rebuilds: u64,
}

impl<L> Default for RenderCache<L> {
    fn default() -> Self {
        RenderCache {
            layer: None,
            valid: false,
            rebuilds: 0,
        }
    }
}

impl<L> RenderCache<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark stale. The next present rebuilds first.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// How many times the layer has been redrawn.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Redraw the layer from `entries` at the surface's current size.
    pub fn rebuild<S>(&mut self, surface: &mut S, entries: &EntryList) -> Result<(), WheelError>
    where
        S: Surface<Layer = L>,
        L: Painter,
    {
        let size = surface.size();
        let reusable = matches!(&self.layer, Some(layer) if S::layer_size(layer) == size);
        if !reusable {
            self.layer = Some(surface.create_layer(size)?);
        }
        if let Some(layer) = self.layer.as_mut() {
            paint_wheel(layer, entries, size)?;
        }
        self.valid = true;
        self.rebuilds += 1;
        debug!(
            "Wheel cache rebuilt: {} entries at {}x{}",
            entries.len(),
            size.width,
            size.height
        );
        Ok(())
    }

    /// Draw the wheel rotated by `orientation`, rebuilding first if stale.
    pub fn present<S>(
        &mut self,
        surface: &mut S,
        entries: &EntryList,
        orientation: f64,
    ) -> Result<(), WheelError>
    where
        S: Surface<Layer = L>,
        L: Painter,
    {
        let size_changed = self
            .layer
            .as_ref()
            .is_some_and(|layer| S::layer_size(layer) != surface.size());
        if !self.valid || size_changed {
            self.rebuild(surface, entries)?;
        }
        match self.layer.as_ref() {
            Some(layer) => surface.blit_rotated(layer, orientation),
            None => Ok(()),
        }
    }

    pub fn layer(&self) -> Option<&L> {
        self.layer.as_ref()
    }
}
