use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlShader};

use web_sys::WebGlRenderingContext as WebGL;

use crate::errors::*;
use crate::math::prelude::Color;
use crate::video::assets::prelude::*;

use super::super::utils::DataVec;
use super::super::Visitor;

#[derive(Debug, Clone)]
struct GLShaderData {
    id: WebGlShader,
    stage: ShaderStage,
}

#[derive(Debug, Clone)]
struct GLProgramData {
    id: WebGlProgram,
}

#[derive(Debug, Clone)]
struct GLBufferData {
    id: WebGlBuffer,
    hint: BufferHint,
    len: usize,
}

pub struct WebGLVisitor {
    ctx: WebGL,
    view: Option<SurfaceViewport>,
    shaders: DataVec<GLShaderData>,
    programs: DataVec<GLProgramData>,
    buffers: DataVec<GLBufferData>,
}

impl WebGLVisitor {
    /// Requests a `webgl` context from the canvas.
    pub unsafe fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("webgl")
            .map_err(|err| Error::ContextUnavailable(format!("{:?}", err)))?
            .ok_or_else(|| Error::ContextUnavailable("the canvas returned no `webgl` context.".into()))?
            .dyn_into::<WebGL>()
            .map_err(|_| Error::ContextUnavailable("not a WebGLRenderingContext.".into()))?;

        info!(
            "[WebGL] Created context. {}x{} drawing buffer.",
            ctx.drawing_buffer_width(),
            ctx.drawing_buffer_height()
        );

        Ok(WebGLVisitor {
            ctx,
            view: None,
            shaders: DataVec::new(),
            programs: DataVec::new(),
            buffers: DataVec::new(),
        })
    }

    fn shader(&self, handle: ShaderHandle) -> Result<&GLShaderData> {
        self.shaders
            .get(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }

    fn program(&self, handle: ProgramHandle) -> Result<&GLProgramData> {
        self.programs
            .get(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }
}

impl Visitor for WebGLVisitor {
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let id = self
            .ctx
            .create_shader(stage.into())
            .ok_or_else(|| err_format!("Unable to create {:?} shader object.", stage))?;

        self.ctx.shader_source(&id, source);
        self.ctx.compile_shader(&id);
        check(&self.ctx)?;

        self.shaders.create(handle, GLShaderData { id, stage });
        Ok(())
    }

    unsafe fn shader_compile_status(&self, handle: ShaderHandle) -> Result<bool> {
        let shader = self.shader(handle)?;
        Ok(self
            .ctx
            .get_shader_parameter(&shader.id, WebGL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false))
    }

    unsafe fn shader_info_log(&self, handle: ShaderHandle) -> Result<String> {
        let shader = self.shader(handle)?;
        Ok(self
            .ctx
            .get_shader_info_log(&shader.id)
            .unwrap_or_else(|| format!("Unknown error compiling {:?} shader.", shader.stage)))
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .free(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        self.ctx.delete_shader(Some(&shader.id));
        check(&self.ctx)
    }

    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let id = self
            .ctx
            .create_program()
            .ok_or_else(|| err_format!("Unable to create program object."))?;

        self.programs.create(handle, GLProgramData { id });
        Ok(())
    }

    unsafe fn attach_shader(
        &mut self,
        program: ProgramHandle,
        shader: ShaderHandle,
    ) -> Result<()> {
        let p = self.program(program)?;
        let s = self.shader(shader)?;
        self.ctx.attach_shader(&p.id, &s.id);
        check(&self.ctx)
    }

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let program = self.program(handle)?;
        self.ctx.link_program(&program.id);
        check(&self.ctx)
    }

    unsafe fn program_link_status(&self, handle: ProgramHandle) -> Result<bool> {
        let program = self.program(handle)?;
        Ok(self
            .ctx
            .get_program_parameter(&program.id, WebGL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false))
    }

    unsafe fn program_info_log(&self, handle: ProgramHandle) -> Result<String> {
        let program = self.program(handle)?;
        Ok(self
            .ctx
            .get_program_info_log(&program.id)
            .unwrap_or_else(|| "Unknown error linking program object.".into()))
    }

    unsafe fn attribute_location(
        &self,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>> {
        let program = self.program(program)?;
        let location = self.ctx.get_attrib_location(&program.id, name);
        check(&self.ctx)?;

        if location >= 0 {
            Ok(Some(location as u32))
        } else {
            Ok(None)
        }
    }

    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        hint: BufferHint,
        data: &[u8],
    ) -> Result<()> {
        let id = self
            .ctx
            .create_buffer()
            .ok_or_else(|| err_format!("Unable to create buffer object."))?;

        self.ctx.bind_buffer(WebGL::ARRAY_BUFFER, Some(&id));
        check(&self.ctx)?;

        let mut bytes = data.to_vec();
        self.ctx
            .buffer_data_with_u8_array(WebGL::ARRAY_BUFFER, &mut bytes, hint.into());
        check(&self.ctx)?;

        let len = data.len();
        self.buffers.create(handle, GLBufferData { id, hint, len });
        Ok(())
    }

    unsafe fn bind_attribute(
        &mut self,
        location: u32,
        buffer: BufferHandle,
        layout: AttributeLayout,
    ) -> Result<()> {
        let buffer = self
            .buffers
            .get(buffer)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", buffer)))?;

        if layout.offset as usize >= buffer.len {
            bail!(
                "Attribute offset {} is out of the {:?} buffer of {} bytes.",
                layout.offset,
                buffer.hint,
                buffer.len
            );
        }

        self.ctx.bind_buffer(WebGL::ARRAY_BUFFER, Some(&buffer.id));
        self.ctx.enable_vertex_attrib_array(location);
        self.ctx.vertex_attrib_pointer_with_i32(
            location,
            i32::from(layout.size),
            layout.format.into(),
            layout.normalized,
            i32::from(layout.stride),
            i32::from(layout.offset),
        );

        check(&self.ctx)
    }

    unsafe fn update_surface_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        if self.view != Some(vp) {
            self.ctx.viewport(
                vp.position.x,
                vp.position.y,
                vp.size.x as i32,
                vp.size.y as i32,
            );

            self.view = Some(vp);
            check(&self.ctx)?;
        }

        Ok(())
    }

    unsafe fn clear(&mut self, color: Color<f32>) -> Result<()> {
        self.ctx.clear_color(color.r, color.g, color.b, color.a);
        self.ctx.clear(WebGL::COLOR_BUFFER_BIT);
        check(&self.ctx)
    }

    unsafe fn use_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let program = self.program(handle)?;
        self.ctx.use_program(Some(&program.id));
        check(&self.ctx)
    }

    unsafe fn draw(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        self.ctx
            .draw_arrays(primitive.into(), first as i32, count as i32);
        check(&self.ctx)
    }

    unsafe fn flush(&mut self) -> Result<()> {
        self.ctx.finish();
        check(&self.ctx)
    }
}

unsafe fn check(ctx: &WebGL) -> Result<()> {
    match ctx.get_error() {
        WebGL::NO_ERROR => Ok(()),

        WebGL::INVALID_ENUM => {
            bail!("[WebGL] An unacceptable value is specified for an enumerated argument.")
        }

        WebGL::INVALID_VALUE => bail!("[WebGL] A numeric argument is out of range."),

        WebGL::INVALID_OPERATION => {
            bail!("[WebGL] The specified operation is not allowed in the current state.")
        }

        WebGL::INVALID_FRAMEBUFFER_OPERATION => bail!(
            "[WebGL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        ),

        WebGL::OUT_OF_MEMORY => {
            bail!("[WebGL] There is not enough memory left to execute the command.")
        }

        WebGL::CONTEXT_LOST_WEBGL => bail!("[WebGL] The context has been lost."),

        _ => bail!("[WebGL] Oops, Unknown WebGL error."),
    }
}
