use std::cell::RefCell;

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::backends::headless::HeadlessVisitor;
use crate::video::backends::Visitor;

use super::super::Surface;

/// The drawing buffer size of a freshly created canvas.
pub const DEFAULT_DRAWING_BUFFER: (u32, u32) = (300, 150);

/// A surface backed by the software device, for running the pipeline without a
/// display. Every visitor it creates renders into the same device.
pub struct HeadlessSurface {
    display: Vector2<u32>,
    available: bool,
    device: HeadlessVisitor,
    notice: RefCell<Option<String>>,
}

impl HeadlessSurface {
    /// Creates a surface that occupies `display` pixels on a virtual screen.
    pub fn new(display: Vector2<u32>) -> Self {
        HeadlessSurface {
            display,
            available: true,
            device: HeadlessVisitor::new(DEFAULT_DRAWING_BUFFER.into()),
            notice: RefCell::new(None),
        }
    }

    /// Creates a surface whose platform refuses to provide a graphics context.
    pub fn unavailable(display: Vector2<u32>) -> Self {
        HeadlessSurface {
            available: false,
            ..HeadlessSurface::new(display)
        }
    }

    /// The device all visitors of this surface render into.
    #[inline]
    pub fn device(&self) -> &HeadlessVisitor {
        &self.device
    }

    /// The notice that replaced the visible output, if any.
    pub fn notice(&self) -> Option<String> {
        self.notice.borrow().clone()
    }
}

impl Surface for HeadlessSurface {
    #[inline]
    fn display_dimensions(&self) -> Vector2<u32> {
        self.display
    }

    #[inline]
    fn drawing_buffer_dimensions(&self) -> Vector2<u32> {
        self.device.dimensions()
    }

    fn set_drawing_buffer_dimensions(&self, dimensions: Vector2<u32>) -> Result<()> {
        self.device.resize(dimensions);
        Ok(())
    }

    fn show_notice(&self, text: &str) {
        *self.notice.borrow_mut() = Some(text.to_owned());
    }

    fn create_visitor(&self) -> Result<Box<dyn Visitor>> {
        if !self.available {
            return Err(Error::ContextUnavailable(
                "the headless surface was created without a device.".into(),
            ));
        }

        Ok(Box::new(self.device.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sizes() {
        let surface = HeadlessSurface::new(Vector2::new(320, 200));
        assert_eq!(surface.display_dimensions(), Vector2::new(320, 200));
        assert_eq!(surface.drawing_buffer_dimensions(), Vector2::new(300, 150));

        surface
            .set_drawing_buffer_dimensions(Vector2::new(64, 32))
            .unwrap();
        assert_eq!(surface.drawing_buffer_dimensions(), Vector2::new(64, 32));
        assert_eq!(surface.device().dimensions(), Vector2::new(64, 32));
    }

    #[test]
    fn unavailable() {
        let surface = HeadlessSurface::unavailable(Vector2::new(8, 8));
        assert!(surface.create_visitor().is_err());
        assert_eq!(surface.notice(), None);

        surface.show_notice("gone");
        assert_eq!(surface.notice().as_ref().map(|v| v.as_str()), Some("gone"));
    }
}
