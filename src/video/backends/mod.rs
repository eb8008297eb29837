//! The backend of renderer, which should be responsible for only one thing:
//! forwarding pipeline calls to a low-level graphics API.

pub mod headless;
mod utils;

use crate::errors::*;
use crate::math::prelude::Color;

use super::assets::prelude::*;

/// The graphics API surface consumed by `VideoSystem`. Handles are allocated by the
/// caller, backends only map them to native objects.
///
/// An unsuccessful compile or link is not an error of the call itself, it shows up
/// in the status and info-log queries afterwards.
pub trait Visitor {
    /// Creates a shader object, submits its source and compiles it.
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()>;

    unsafe fn shader_compile_status(&self, handle: ShaderHandle) -> Result<bool>;

    unsafe fn shader_info_log(&self, handle: ShaderHandle) -> Result<String>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()>;

    unsafe fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle)
        -> Result<()>;

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()>;

    unsafe fn program_link_status(&self, handle: ProgramHandle) -> Result<bool>;

    unsafe fn program_info_log(&self, handle: ProgramHandle) -> Result<String>;

    /// Returns the location of a named vertex input, or `None` if the program does
    /// not declare it or failed to link.
    unsafe fn attribute_location(&self, program: ProgramHandle, name: &str)
        -> Result<Option<u32>>;

    /// Creates a buffer object, binds it as the array buffer and uploads `data`.
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        hint: BufferHint,
        data: &[u8],
    ) -> Result<()>;

    /// Binds `buffer`, enables the attribute `location` and describes how it reads
    /// from the buffer.
    unsafe fn bind_attribute(
        &mut self,
        location: u32,
        buffer: BufferHandle,
        layout: AttributeLayout,
    ) -> Result<()>;

    /// Set the viewport relative to the lower-left corner of the drawing buffer, in pixels.
    unsafe fn update_surface_viewport(&mut self, vp: SurfaceViewport) -> Result<()>;

    unsafe fn clear(&mut self, color: Color<f32>) -> Result<()>;

    unsafe fn use_program(&mut self, handle: ProgramHandle) -> Result<()>;

    unsafe fn draw(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()>;

    /// Blocks until all execution is complete.
    unsafe fn flush(&mut self) -> Result<()>;
}

#[cfg(all(not(target_arch = "wasm32"), feature = "native"))]
pub mod gl;

#[cfg(target_arch = "wasm32")]
pub mod webgl;
