//! Math types shared by surfaces and video backends, mainly re-exported from `cgmath`.

pub mod color;

pub mod prelude {
    pub use super::color::Color;
    pub use cgmath::Vector2;
}
