//! A thin, stage-by-stage front end over a graphics backend.
//!
//! Every stage of the triangle pipeline is a method of `VideoSystem` returning a typed
//! result. Handles are allocated here and handed to the backend `Visitor`, which only
//! maps them to native objects.
//!
//! ```ignore
//! let mut video = VideoSystem::acquire(&surface)?;
//! let vs = video.compile(ShaderStage::Vertex, VS)?;
//! let fs = video.compile(ShaderStage::Fragment, FS)?;
//! let program = video.link(vs, fs)?;
//! let vbo = video.upload(&TRIANGLE, BufferHint::Immutable)?;
//! video.bind_attribute(&program, "aPosition", vbo, AttributeLayout::float(2))?;
//! video.resize(&surface)?;
//! video.render(&program, Color::transparent())?;
//! ```

pub mod assets;
pub mod backends;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::headless::HeadlessVisitor;
    pub use super::backends::Visitor;
    pub use super::{VideoSystem, UNSUPPORTED_NOTICE};
}

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::*;
use crate::math::prelude::Color;
use crate::utils::HandlePool;
use crate::window::Surface;

use self::assets::prelude::*;
use self::backends::Visitor;

/// The text that replaces the visible output when no graphics context is available.
pub const UNSUPPORTED_NOTICE: &str = "WebGL is unsupported on your device :(";

/// The graphics context of a drawable surface, together with the handles of every
/// object created through it. Nothing is released explicitly; the context lives as
/// long as the run.
pub struct VideoSystem {
    visitor: Box<dyn Visitor>,
    shaders: HandlePool,
    programs: HandlePool,
    buffers: HandlePool,
}

impl VideoSystem {
    /// Obtains a graphics context bound to `surface`.
    ///
    /// If the platform cannot provide one, the visible output of the surface is
    /// replaced with `UNSUPPORTED_NOTICE` and `Error::ContextUnavailable` is returned.
    pub fn acquire(surface: &dyn Surface) -> Result<Self> {
        match surface.create_visitor() {
            Ok(visitor) => {
                info!("[Video] Acquired graphics context.");
                Ok(VideoSystem::new(visitor))
            }
            Err(err) => {
                error!("[Video] {}", err);
                surface.show_notice(UNSUPPORTED_NOTICE);

                match err {
                    Error::ContextUnavailable(_) => Err(err),
                    other => Err(Error::ContextUnavailable(format!("{}", other))),
                }
            }
        }
    }

    /// Wraps an already created backend.
    pub fn new(visitor: Box<dyn Visitor>) -> Self {
        VideoSystem {
            visitor,
            shaders: HandlePool::new(),
            programs: HandlePool::new(),
            buffers: HandlePool::new(),
        }
    }

    /// Compiles `source` into a shader object of `stage`.
    ///
    /// On failure the info log is written to the `warn` log, the shader object is
    /// deleted and the log is returned in `Error::ShaderCompilation`.
    pub fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        let handle: ShaderHandle = self.shaders.create().into();

        unsafe {
            if let Err(err) = self.visitor.create_shader(handle, stage, source) {
                self.shaders.free(handle);
                return Err(err);
            }

            let log = match self.visitor.shader_compile_status(handle) {
                Ok(true) => {
                    debug!("[Video] Compiled {:?} shader {}.", stage, handle);
                    return Ok(handle);
                }
                Ok(false) => self.visitor.shader_info_log(handle),
                Err(err) => Err(err),
            };

            // The handle is released whether or not the backend could report.
            let deleted = self.visitor.delete_shader(handle);
            self.shaders.free(handle);

            let log = log?;
            warn!("[Video] Failed to compile {:?} shader.\n{}", stage, log);

            deleted?;
            Err(Error::ShaderCompilation { stage, log })
        }
    }

    /// Attaches `vs` and `fs` to a new program object and links it.
    ///
    /// A shader handle the backend does not know is logged and skipped, the link
    /// itself always happens. The returned `Program` is proof of a successful link;
    /// on failure `Error::ProgramLink` carries the unusable program handle.
    pub fn link(&mut self, vs: ShaderHandle, fs: ShaderHandle) -> Result<Program> {
        let handle: ProgramHandle = self.programs.create().into();

        unsafe {
            if let Err(err) = self.visitor.create_program(handle) {
                self.programs.free(handle);
                return Err(err);
            }

            for &shader in &[vs, fs] {
                if let Err(err) = self.visitor.attach_shader(handle, shader) {
                    warn!("[Video] Skipped attaching {} to {}. {}", shader, handle, err);
                }
            }

            let log = match self
                .visitor
                .link_program(handle)
                .and_then(|_| self.visitor.program_link_status(handle))
            {
                Ok(true) => {
                    debug!("[Video] Linked {}.", handle);
                    return Ok(Program::linked(handle));
                }
                Ok(false) => self.visitor.program_info_log(handle),
                Err(err) => Err(err),
            };

            let log = match log {
                Ok(log) => log,
                Err(err) => {
                    self.programs.free(handle);
                    return Err(err);
                }
            };

            warn!("[Video] Failed to link {}.\n{}", handle, log);
            Err(Error::ProgramLink {
                program: handle,
                log,
            })
        }
    }

    /// Allocates a buffer object and uploads `vertices` as little-endian 32-bit floats.
    pub fn upload(&mut self, vertices: &[f32], hint: BufferHint) -> Result<BufferHandle> {
        let mut bytes = vec![0; vertices.len() * 4];
        LittleEndian::write_f32_into(vertices, &mut bytes);

        let handle: BufferHandle = self.buffers.create().into();
        unsafe {
            if let Err(err) = self.visitor.create_buffer(handle, hint, &bytes) {
                self.buffers.free(handle);
                return Err(err);
            }
        }

        debug!(
            "[Video] Uploaded {} floats into {:?} {}.",
            vertices.len(),
            hint,
            handle
        );

        Ok(handle)
    }

    /// Wires the vertex input `name` of `program` to `buffer`, returning its location.
    pub fn bind_attribute(
        &mut self,
        program: &Program,
        name: &str,
        buffer: BufferHandle,
        layout: AttributeLayout,
    ) -> Result<u32> {
        unsafe {
            let location = self
                .visitor
                .attribute_location(program.handle(), name)?
                .ok_or_else(|| Error::AttributeUndefined(name.to_owned()))?;

            self.visitor.bind_attribute(location, buffer, layout)?;

            debug!(
                "[Video] Bound {}({}) to {} with {:?}.",
                name, location, buffer, layout
            );

            Ok(location)
        }
    }

    /// Sets the drawing buffer of `surface` to its display size, and the viewport to
    /// cover all of it. This happens once; later display changes are not tracked.
    pub fn resize(&mut self, surface: &dyn Surface) -> Result<SurfaceViewport> {
        let dimensions = surface.display_dimensions();
        surface.set_drawing_buffer_dimensions(dimensions)?;

        let vp = SurfaceViewport::fill(surface.drawing_buffer_dimensions());
        unsafe {
            self.visitor.update_surface_viewport(vp)?;
        }

        info!(
            "[Video] Viewport set to ({}, {}, {}, {}).",
            vp.position.x, vp.position.y, vp.size.x, vp.size.y
        );

        Ok(vp)
    }

    /// Clears the color buffer with `clear_color` and draws the three vertices of
    /// the bound attributes as a triangle with `program`.
    pub fn render(&mut self, program: &Program, clear_color: Color<f32>) -> Result<()> {
        unsafe {
            self.visitor.clear(clear_color)?;

            // A failed program activation leaves the previous state in place, the
            // draw call is issued regardless and the first error is reported.
            let used = self.visitor.use_program(program.handle());
            let drawn = self.visitor.draw(Primitive::Triangles, 0, 3);
            used.and(drawn)?;

            self.visitor.flush()?;
        }

        info!("[Video] Drew 3 vertices with {}.", program.handle());
        Ok(())
    }

    /// Returns true if `handle` refers to a shader that compiled and was not released.
    pub fn is_shader_alive(&self, handle: ShaderHandle) -> bool {
        self.shaders.is_alive(handle)
    }

    pub fn is_buffer_alive(&self, handle: BufferHandle) -> bool {
        self.buffers.is_alive(handle)
    }
}
