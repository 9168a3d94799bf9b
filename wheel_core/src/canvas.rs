// Canvas 2D surface: the visible wheel canvas and off-screen layer canvases.
// JS exceptions from the context surface as WheelError::Surface.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::WheelError;
use crate::surface::*;

/// A canvas element with its 2D context.
pub struct Canvas2d {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, WheelError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| WheelError::Surface("no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| WheelError::Surface("not a 2d context".to_string()))?;
        Ok(Canvas2d { canvas, ctx })
    }

    /// A detached canvas of `size`, not attached to the document.
    pub fn offscreen(size: SurfaceSize) -> Result<Self, WheelError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| WheelError::Surface("no document".to_string()))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| WheelError::Surface("created element is not a canvas".to_string()))?;
        canvas.set_width(size.width);
        canvas.set_height(size.height);
        Canvas2d::new(canvas)
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.width(), self.canvas.height())
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Painter for Canvas2d {
    fn clear(&mut self) -> Result<(), WheelError> {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        let size = self.size();
        self.ctx
            .clear_rect(0.0, 0.0, size.width as f64, size.height as f64);
        Ok(())
    }

    fn draw_sector(
        &mut self,
        sector: &Sector,
        fill: Rgba,
        outline: Option<Outline>,
    ) -> Result<(), WheelError> {
        let Sector {
            center,
            radius,
            start,
            end,
        } = *sector;
        self.ctx.begin_path();
        self.ctx.move_to(center.x, center.y);
        self.ctx.arc(center.x, center.y, radius, start, end)?;
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&fill.to_css());
        self.ctx.fill();
        if let Some(outline) = outline {
            self.ctx.set_stroke_style_str(&outline.color.to_css());
            self.ctx.set_line_width(outline.width);
            self.ctx.stroke();
        }
        Ok(())
    }

    fn shade_disc(
        &mut self,
        center: Point,
        radius: f64,
        stops: &[GradientStop],
    ) -> Result<(), WheelError> {
        let gradient = self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)?;
        for stop in stops {
            gradient.add_color_stop(stop.offset, &stop.color.to_css())?;
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU)?;
        self.ctx.fill();
        Ok(())
    }

    fn draw_label(&mut self, label: &Label) -> Result<(), WheelError> {
        self.ctx.save();
        self.ctx.translate(label.origin.x, label.origin.y)?;
        self.ctx.rotate(label.rotation)?;
        self.ctx.set_text_align("right");
        self.ctx.set_fill_style_str(&label.color.to_css());
        self.ctx.set_font(&label.font());
        let drawn = self.ctx.fill_text(&label.text, label.x, label.y);
        self.ctx.restore();
        drawn?;
        Ok(())
    }
}

/// The on-page wheel canvas.
pub struct CanvasSurface {
    screen: Canvas2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, WheelError> {
        Ok(CanvasSurface {
            screen: Canvas2d::new(canvas)?,
        })
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        self.screen.element()
    }
}

impl Surface for CanvasSurface {
    type Layer = Canvas2d;

    fn size(&self) -> SurfaceSize {
        self.screen.size()
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), WheelError> {
        // Setting the backing size also wipes the canvas.
        self.screen.canvas.set_width(size.width);
        self.screen.canvas.set_height(size.height);
        Ok(())
    }

    fn create_layer(&mut self, size: SurfaceSize) -> Result<Canvas2d, WheelError> {
        Canvas2d::offscreen(size)
    }

    fn layer_size(layer: &Canvas2d) -> SurfaceSize {
        layer.size()
    }

    fn blit_rotated(&mut self, layer: &Canvas2d, rotation: f64) -> Result<(), WheelError> {
        self.screen.clear()?;
        let center = self.size().center();
        let ctx = &self.screen.ctx;
        ctx.save();
        let drawn = ctx
            .translate(center.x, center.y)
            .and_then(|_| ctx.rotate(rotation))
            .and_then(|_| ctx.translate(-center.x, -center.y))
            .and_then(|_| ctx.draw_image_with_html_canvas_element(&layer.canvas, 0.0, 0.0));
        ctx.restore();
        drawn?;
        Ok(())
    }
}
