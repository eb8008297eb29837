use crate::math::prelude::Vector2;

/// The rectangle of the drawing buffer rendering output is mapped into, in pixels
/// relative to the lower-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceViewport {
    pub position: Vector2<i32>,
    pub size: Vector2<u32>,
}

impl SurfaceViewport {
    /// A viewport covering the whole drawing buffer.
    pub fn fill(size: Vector2<u32>) -> Self {
        SurfaceViewport {
            position: Vector2::new(0, 0),
            size,
        }
    }
}

impl Default for SurfaceViewport {
    fn default() -> Self {
        SurfaceViewport::fill(Vector2::new(0, 0))
    }
}
