//! Represents the drawable surface a graphics context renders into.
//!
//! A surface has two sizes: the display size it occupies on screen, and the size of
//! the drawing buffer backing it. They are independent until something copies one
//! into the other, which is the job of `VideoSystem::resize`.

pub mod backends;

pub mod prelude {
    pub use super::backends::headless::HeadlessSurface;
    pub use super::{Surface, SurfaceParams};
}

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::backends::Visitor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    /// The element id of the canvas to render into. Only used in browsers.
    pub id: String,
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        SurfaceParams {
            id: "stage".to_owned(),
            title: "Hello Triangle".to_owned(),
            size: Vector2::new(640, 480),
            multisample: 0,
            vsync: true,
        }
    }
}

pub trait Surface {
    /// The size the surface occupies on screen, in pixels.
    fn display_dimensions(&self) -> Vector2<u32>;

    /// The size of the drawing buffer, in pixels.
    fn drawing_buffer_dimensions(&self) -> Vector2<u32>;

    fn set_drawing_buffer_dimensions(&self, dimensions: Vector2<u32>) -> Result<()>;

    /// Replaces the visible output with a plain text notice.
    fn show_notice(&self, text: &str);

    /// Creates a graphics backend bound to this surface.
    fn create_visitor(&self) -> Result<Box<dyn Visitor>>;

    /// Makes the rendered frame visible. Browsers do this implicitly.
    fn present(&self) -> Result<()> {
        Ok(())
    }
}
