//! The linear bootstrap that takes a surface all the way to one drawn triangle.

use crate::errors::*;
use crate::settings::PipelineParams;
use crate::video::prelude::*;
use crate::window::Surface;

/// Passes the position attribute straight through.
pub const VERTEX_SHADER: &str = r#"
// receives data from a buffer
attribute vec4 a_position;

void main() {
    gl_Position = a_position;
}
"#;

/// Fills every fragment with a constant cyan.
pub const FRAGMENT_SHADER: &str = r#"
// fragment shaders have no default precision
precision mediump float;

void main() {
    gl_FragColor = vec4(0.02, 1, 0.894, 1); // rgba
}
"#;

/// The color `FRAGMENT_SHADER` writes.
pub const TRIANGLE_COLOR: [f32; 4] = [0.02, 1.0, 0.894, 1.0];

/// Three 2D points in clip space.
pub const TRIANGLE: [f32; 6] = [-0.7, 0.7, -0.7, -0.5, 0.5, -0.5];

pub const POSITION_ATTRIBUTE: &str = "a_position";

/// The objects a completed run created.
#[derive(Debug)]
pub struct Frame {
    /// The program the draw call used. Only verified in strict mode.
    pub program: Program,
    pub buffer: BufferHandle,
    /// The location `a_position` was bound to, if it resolved.
    pub location: Option<u32>,
    pub viewport: SurfaceViewport,
    /// Stage failures that were logged and passed over in lenient mode.
    pub failures: Vec<Error>,
}

/// Runs the triangle pipeline on a surface, once.
pub struct Launcher<'a> {
    params: PipelineParams,
    vertex: &'a str,
    fragment: &'a str,
    vertices: &'a [f32],
}

impl<'a> Launcher<'a> {
    pub fn new(params: PipelineParams) -> Self {
        Launcher {
            params,
            vertex: VERTEX_SHADER,
            fragment: FRAGMENT_SHADER,
            vertices: &TRIANGLE,
        }
    }

    /// Replaces the shader sources.
    pub fn with_shaders(mut self, vertex: &'a str, fragment: &'a str) -> Self {
        self.vertex = vertex;
        self.fragment = fragment;
        self
    }

    /// Replaces the triangle, given as 2D points.
    pub fn with_vertices(mut self, vertices: &'a [f32]) -> Self {
        self.vertices = vertices;
        self
    }

    /// Runs context → shaders → program → buffer → attribute → viewport → draw.
    pub fn launch(&self, surface: &dyn Surface) -> Result<Frame> {
        let mut video = VideoSystem::acquire(surface)?;

        info!(
            "[Launcher] Running {} pipeline.",
            if self.params.strict {
                "strict"
            } else {
                "lenient"
            }
        );

        if self.params.strict {
            self.strict(&mut video, surface)
        } else {
            self.lenient(&mut video, surface)
        }
    }

    fn strict(&self, video: &mut VideoSystem, surface: &dyn Surface) -> Result<Frame> {
        let vs = video.compile(ShaderStage::Vertex, self.vertex)?;
        let fs = video.compile(ShaderStage::Fragment, self.fragment)?;
        let program = video.link(vs, fs)?;
        let buffer = video.upload(self.vertices, BufferHint::Immutable)?;
        let layout = AttributeLayout::float(2);
        let location = video.bind_attribute(&program, POSITION_ATTRIBUTE, buffer, layout)?;
        let viewport = video.resize(surface)?;
        video.render(&program, self.params.clear_color)?;

        Ok(Frame {
            program,
            buffer,
            location: Some(location),
            viewport,
            failures: Vec::new(),
        })
    }

    fn lenient(&self, video: &mut VideoSystem, surface: &dyn Surface) -> Result<Frame> {
        let mut failures = Vec::new();

        let mut compile = |stage, source| match video.compile(stage, source) {
            Ok(handle) => handle,
            Err(err) => {
                failures.push(err);
                ShaderHandle::nil()
            }
        };

        let vs = compile(ShaderStage::Vertex, self.vertex);
        let fs = compile(ShaderStage::Fragment, self.fragment);

        let program = match video.link(vs, fs) {
            Ok(program) => program,
            Err(Error::ProgramLink { program, log }) => {
                failures.push(Error::ProgramLink { program, log });
                Program::assume_linked(program)
            }
            Err(err) => return Err(err),
        };

        let buffer = video.upload(self.vertices, BufferHint::Immutable)?;

        let layout = AttributeLayout::float(2);
        let location = match video.bind_attribute(&program, POSITION_ATTRIBUTE, buffer, layout) {
            Ok(location) => Some(location),
            Err(err) => {
                warn!("[Launcher] {}", err);
                failures.push(err);
                None
            }
        };

        let viewport = video.resize(surface)?;

        if let Err(err) = video.render(&program, self.params.clear_color) {
            warn!("[Launcher] {}", err);
            failures.push(err);
        }

        if !failures.is_empty() {
            warn!("[Launcher] Finished with {} failed stages.", failures.len());
        }

        Ok(Frame {
            program,
            buffer,
            location,
            viewport,
            failures,
        })
    }
}
