use wasm_bindgen::JsCast;
use web_sys::{self, Document, HtmlCanvasElement};

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::backends::webgl::WebGLVisitor;
use crate::video::backends::Visitor;

use super::super::{Surface, SurfaceParams};

/// A `<canvas>` element of the current document.
pub struct WebSurface {
    document: Document,
    canvas: HtmlCanvasElement,
}

impl WebSurface {
    /// Looks up the canvas with the element id `params.id`.
    pub fn new(params: &SurfaceParams) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|v| v.document())
            .ok_or_else(|| Error::SurfaceNotFound("document".into()))?;

        let canvas = document
            .get_element_by_id(&params.id)
            .ok_or_else(|| Error::SurfaceNotFound(params.id.clone()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::SurfaceNotFound(format!("{} (not a canvas)", params.id)))?;

        info!(
            "[Web] Found canvas `{}` of {}x{}.",
            params.id,
            canvas.client_width(),
            canvas.client_height()
        );

        Ok(WebSurface { document, canvas })
    }
}

impl Surface for WebSurface {
    #[inline]
    fn display_dimensions(&self) -> Vector2<u32> {
        Vector2::new(
            self.canvas.client_width().max(0) as u32,
            self.canvas.client_height().max(0) as u32,
        )
    }

    #[inline]
    fn drawing_buffer_dimensions(&self) -> Vector2<u32> {
        Vector2::new(self.canvas.width(), self.canvas.height())
    }

    fn set_drawing_buffer_dimensions(&self, dimensions: Vector2<u32>) -> Result<()> {
        self.canvas.set_width(dimensions.x);
        self.canvas.set_height(dimensions.y);
        Ok(())
    }

    fn show_notice(&self, text: &str) {
        match self.document.body() {
            Some(body) => body.set_inner_html(text),
            None => warn!("[Web] Document has no body to show `{}` in.", text),
        }
    }

    fn create_visitor(&self) -> Result<Box<dyn Visitor>> {
        let visitor = unsafe { WebGLVisitor::new(&self.canvas)? };
        Ok(Box::new(visitor))
    }
}
