use std::ffi::{CStr, CString};

use gl::types::*;
use glutin::GlContext;

use crate::errors::*;
use crate::math::prelude::Color;
use crate::video::assets::prelude::*;

use super::super::utils::DataVec;
use super::super::Visitor;

#[derive(Debug, Clone, Copy)]
struct GLShaderData {
    id: GLuint,
    stage: ShaderStage,
}

#[derive(Debug, Clone, Copy)]
struct GLProgramData {
    id: GLuint,
}

#[derive(Debug, Clone, Copy)]
struct GLBufferData {
    id: GLuint,
    hint: BufferHint,
    len: usize,
}

pub struct GLVisitor {
    view: Option<SurfaceViewport>,
    shaders: DataVec<GLShaderData>,
    programs: DataVec<GLProgramData>,
    buffers: DataVec<GLBufferData>,
}

impl GLVisitor {
    /// Makes the window's context current in this thread and loads the GL function
    /// pointers from it.
    pub unsafe fn glutin(window: &glutin::GlWindow) -> Result<Self> {
        window.make_current()?;
        gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);
        Self::new()
    }

    /// *Safety*: a GL context must be current in this thread with its functions loaded.
    pub unsafe fn new() -> Result<Self> {
        if !gl::CreateShader::is_loaded() || !gl::DrawArrays::is_loaded() {
            return Err(Error::ContextUnavailable(
                "OpenGL functions could not be loaded.".into(),
            ));
        }

        info!(
            "[GL] Created context. {} ({}).",
            get_string(gl::VERSION),
            get_string(gl::RENDERER)
        );

        Ok(GLVisitor {
            view: None,
            shaders: DataVec::new(),
            programs: DataVec::new(),
            buffers: DataVec::new(),
        })
    }

    fn shader(&self, handle: ShaderHandle) -> Result<GLShaderData> {
        self.shaders
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }

    fn program(&self, handle: ProgramHandle) -> Result<GLProgramData> {
        self.programs
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let c_str = CString::new(source.as_bytes())
            .map_err(|_| err_format!("{:?} shader source contains a nul byte.", stage))?;

        let id = gl::CreateShader(stage.into());
        if id == 0 {
            bail!("Unable to create {:?} shader object.", stage);
        }

        gl::ShaderSource(id, 1, &c_str.as_ptr(), ::std::ptr::null());
        gl::CompileShader(id);
        check()?;

        self.shaders.create(handle, GLShaderData { id, stage });
        Ok(())
    }

    unsafe fn shader_compile_status(&self, handle: ShaderHandle) -> Result<bool> {
        let shader = self.shader(handle)?;
        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader.id, gl::COMPILE_STATUS, &mut status);
        check()?;

        Ok(status == GLint::from(gl::TRUE))
    }

    unsafe fn shader_info_log(&self, handle: ShaderHandle) -> Result<String> {
        let shader = self.shader(handle)?;
        let mut len = 0;
        gl::GetShaderiv(shader.id, gl::INFO_LOG_LENGTH, &mut len);
        if len <= 1 {
            return Ok(format!("Unknown error compiling {:?} shader.", shader.stage));
        }

        let mut buf = vec![0u8; len as usize];
        gl::GetShaderInfoLog(
            shader.id,
            len,
            ::std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut GLchar,
        );

        check()?;
        Ok(from_log(buf))
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .free(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        gl::DeleteShader(shader.id);
        check()
    }

    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let id = gl::CreateProgram();
        if id == 0 {
            bail!("Unable to create program object.");
        }

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
        gl::AttachShader(p.id, s.id);
        check()
    }

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let program = self.program(handle)?;
        gl::LinkProgram(program.id);
        check()
    }

    unsafe fn program_link_status(&self, handle: ProgramHandle) -> Result<bool> {
        let program = self.program(handle)?;
        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program.id, gl::LINK_STATUS, &mut status);
        check()?;

        Ok(status == GLint::from(gl::TRUE))
    }

    unsafe fn program_info_log(&self, handle: ProgramHandle) -> Result<String> {
        let program = self.program(handle)?;
        let mut len: GLint = 0;
        gl::GetProgramiv(program.id, gl::INFO_LOG_LENGTH, &mut len);
        if len <= 1 {
            return Ok("Unknown error linking program object.".into());
        }

        let mut buf = vec![0u8; len as usize];
        gl::GetProgramInfoLog(
            program.id,
            len,
            ::std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut GLchar,
        );

        check()?;
        Ok(from_log(buf))
    }

    unsafe fn attribute_location(
        &self,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>> {
        let program = self.program(program)?;
        let c_name = match CString::new(name.as_bytes()) {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };

        let location = gl::GetAttribLocation(program.id, c_name.as_ptr());
        check()?;

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
        let mut id = 0;
        gl::GenBuffers(1, &mut id);
        if id == 0 {
            bail!("Unable to create buffer object.");
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, id);

        let value = match data {
            v if !v.is_empty() => v.as_ptr() as *const ::std::os::raw::c_void,
            _ => ::std::ptr::null(),
        };

        gl::BufferData(gl::ARRAY_BUFFER, data.len() as isize, value, hint.into());
        check()?;

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
            .cloned()
            .ok_or_else(|| Error::HandleInvalid(format!("{}", buffer)))?;

        if layout.offset as usize >= buffer.len {
            bail!(
                "Attribute offset {} is out of the {:?} buffer of {} bytes.",
                layout.offset,
                buffer.hint,
                buffer.len
            );
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, buffer.id);
        gl::EnableVertexAttribArray(location);
        gl::VertexAttribPointer(
            location,
            GLint::from(layout.size),
            layout.format.into(),
            layout.normalized as u8,
            GLsizei::from(layout.stride),
            layout.offset as usize as *const ::std::os::raw::c_void,
        );

        check()
    }

    unsafe fn update_surface_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        if self.view != Some(vp) {
            gl::Viewport(
                vp.position.x,
                vp.position.y,
                vp.size.x as i32,
                vp.size.y as i32,
            );

            self.view = Some(vp);
            check()?;
        }

        Ok(())
    }

    unsafe fn clear(&mut self, color: Color<f32>) -> Result<()> {
        gl::ClearColor(color.r, color.g, color.b, color.a);
        gl::Clear(gl::COLOR_BUFFER_BIT);
        check()
    }

    unsafe fn use_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let program = self.program(handle)?;
        gl::UseProgram(program.id);
        check()
    }

    unsafe fn draw(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        gl::DrawArrays(primitive.into(), first as GLint, count as GLsizei);
        check()
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }
}

unsafe fn get_string(name: GLenum) -> String {
    let ptr = gl::GetString(name);
    if ptr.is_null() {
        return "unknown".into();
    }

    CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned()
}

fn from_log(mut buf: Vec<u8>) -> String {
    // Drops the trailing nul character.
    while buf.last() == Some(&0) {
        buf.pop();
    }

    String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }

        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),

        gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => bail!(
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        ),

        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        _ => bail!("[GL] Oops, Unknown OpenGL error."),
    }
}
