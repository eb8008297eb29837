pub mod buffer;
pub mod shader;
pub mod surface;

pub use self::buffer::{AttributeLayout, BufferHandle, BufferHint, Primitive, VertexFormat};
pub use self::shader::{Program, ProgramHandle, ShaderHandle, ShaderStage};
pub use self::surface::SurfaceViewport;

pub mod prelude {
    pub use super::buffer::{AttributeLayout, BufferHandle, BufferHint, Primitive, VertexFormat};
    pub use super::shader::{Program, ProgramHandle, ShaderHandle, ShaderStage};
    pub use super::surface::SurfaceViewport;
}
