use web_sys::WebGlRenderingContext as WebGL;

use crate::video::assets::prelude::*;

impl From<BufferHint> for u32 {
    fn from(hint: BufferHint) -> Self {
        match hint {
            BufferHint::Immutable => WebGL::STATIC_DRAW,
        }
    }
}

impl From<VertexFormat> for u32 {
    fn from(format: VertexFormat) -> Self {
        match format {
            VertexFormat::Float => WebGL::FLOAT,
        }
    }
}

impl From<Primitive> for u32 {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Triangles => WebGL::TRIANGLES,
        }
    }
}

impl From<ShaderStage> for u32 {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => WebGL::VERTEX_SHADER,
            ShaderStage::Fragment => WebGL::FRAGMENT_SHADER,
        }
    }
}
