use std::cell::{Cell, RefCell};

use glutin::GlContext;

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::backends::gl::GLVisitor;
use crate::video::backends::Visitor;

use super::super::{Surface, SurfaceParams};

/// A native window with an OpenGL ES 2.0 context.
pub struct GlutinSurface {
    window: glutin::GlWindow,
    events_loop: RefCell<glutin::EventsLoop>,
    dimensions: Cell<Vector2<u32>>,
}

impl GlutinSurface {
    pub fn new(params: &SurfaceParams) -> Result<Self> {
        let builder = glutin::WindowBuilder::new()
            .with_title(params.title.clone())
            .with_dimensions(glutin::dpi::LogicalSize::new(
                f64::from(params.size.x),
                f64::from(params.size.y),
            ));

        // The shaders are GLSL ES 1.00, which desktop core profiles reject.
        let context = glutin::ContextBuilder::new()
            .with_multisampling(params.multisample)
            .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGlEs, (2, 0)))
            .with_vsync(params.vsync);

        let events_loop = glutin::EventsLoop::new();
        let window = glutin::GlWindow::new(builder, context, &events_loop)?;

        let surface = GlutinSurface {
            window,
            events_loop: RefCell::new(events_loop),
            dimensions: Cell::new(Vector2::new(0, 0)),
        };

        surface.dimensions.set(surface.display_dimensions());
        info!(
            "[Glutin] Created window `{}` of {:?}.",
            params.title,
            surface.dimensions.get()
        );

        Ok(surface)
    }

    /// Blocks until the window is closed.
    pub fn wait_until_closed(&self) {
        self.events_loop.borrow_mut().run_forever(|event| match event {
            glutin::Event::WindowEvent {
                event: glutin::WindowEvent::CloseRequested,
                ..
            } => glutin::ControlFlow::Break,
            glutin::Event::WindowEvent {
                event: glutin::WindowEvent::Refresh,
                ..
            } => {
                // The frame is never redrawn, so present what is left in the back buffer.
                if let Err(err) = self.window.swap_buffers() {
                    warn!("[Glutin] {}", err);
                }

                glutin::ControlFlow::Continue
            }
            _ => glutin::ControlFlow::Continue,
        });
    }
}

impl Surface for GlutinSurface {
    fn display_dimensions(&self) -> Vector2<u32> {
        let dpr = self.window.get_hidpi_factor();
        match self.window.get_inner_size() {
            Some(size) => {
                let size = size.to_physical(dpr);
                Vector2::new(size.width as u32, size.height as u32)
            }
            None => Vector2::new(0, 0),
        }
    }

    #[inline]
    fn drawing_buffer_dimensions(&self) -> Vector2<u32> {
        self.dimensions.get()
    }

    fn set_drawing_buffer_dimensions(&self, dimensions: Vector2<u32>) -> Result<()> {
        let size = glutin::dpi::PhysicalSize::new(f64::from(dimensions.x), f64::from(dimensions.y));
        self.window.resize(size);
        self.dimensions.set(dimensions);
        Ok(())
    }

    fn show_notice(&self, text: &str) {
        self.window.set_title(text);
        error!("[Glutin] {}", text);
    }

    fn create_visitor(&self) -> Result<Box<dyn Visitor>> {
        let visitor = unsafe { GLVisitor::glutin(&self.window)? };
        Ok(Box::new(visitor))
    }

    fn present(&self) -> Result<()> {
        self.window.swap_buffers()?;
        Ok(())
    }
}
