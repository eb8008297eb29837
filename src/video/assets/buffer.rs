//! Vertex buffers and the layout used to feed them into shader attributes.

use std::mem;

impl_handle!(BufferHandle);

/// Hint abouts the intended update strategy of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BufferHint {
    /// The resource is initialized with data and cannot be changed later, this
    /// is the most common and most efficient usage.
    Immutable,
}

/// Defines how the input vertex data is used to assemble primitives.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Primitive {
    /// Separate triangles.
    Triangles,
}

/// The data type in the vertex component.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VertexFormat {
    Float,
}

impl VertexFormat {
    /// Size in bytes of a single component.
    pub fn size(self) -> u8 {
        match self {
            VertexFormat::Float => mem::size_of::<f32>() as u8,
        }
    }
}

/// Describes how a vertex attribute reads its components out of a buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AttributeLayout {
    /// Number of components per vertex, between 1 and 4.
    pub size: u8,
    pub format: VertexFormat,
    pub normalized: bool,
    /// Byte distance between consecutive vertices, `0` means tightly packed.
    pub stride: u8,
    /// Byte offset of the first component.
    pub offset: u8,
}

impl AttributeLayout {
    /// Tightly packed 32-bit float vectors with `size` components.
    pub fn float(size: u8) -> Self {
        AttributeLayout {
            size,
            format: VertexFormat::Float,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// The byte distance between consecutive vertices, resolving a zero stride.
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            self.size as usize * self.format.size() as usize
        } else {
            self.stride as usize
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stride() {
        let layout = AttributeLayout::float(2);
        assert_eq!(layout.stride, 0);
        assert_eq!(layout.effective_stride(), 8);

        let mut layout = AttributeLayout::float(3);
        layout.stride = 16;
        assert_eq!(layout.effective_stride(), 16);
    }
}
