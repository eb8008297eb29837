//! A software device that implements the backend contract on the CPU.
//!
//! It compiles a small GLSL subset, links programs, keeps buffer contents and
//! rasterizes triangles into an in-memory framebuffer, so the whole pipeline can be
//! exercised and read back without a GPU.

mod glsl;
pub mod raster;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::*;
use crate::math::prelude::{Color, Vector2};

use self::glsl::{Module, Output};
use self::raster::Framebuffer;
use super::super::assets::prelude::*;
use super::utils::DataVec;
use super::Visitor;

/// The number of generic vertex attributes the device supports.
pub const MAX_VERTEX_ATTRIBUTES: u32 = 16;

/// A draw call as it was issued, whether or not it produced any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub program: Option<ProgramHandle>,
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Clone)]
struct ShaderData {
    stage: ShaderStage,
    module: Option<Module>,
    log: String,
}

#[derive(Debug, Clone)]
struct Linked {
    vertex: Module,
    fragment: Module,
    /// Active attribute names, indexed by location.
    locations: Vec<String>,
}

#[derive(Debug, Clone)]
struct ProgramData {
    attached: Vec<ShaderData>,
    linked: Option<Linked>,
    log: String,
}

#[derive(Debug, Clone)]
struct BufferData {
    hint: BufferHint,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct AttributeBinding {
    buffer: BufferHandle,
    layout: AttributeLayout,
}

struct Device {
    framebuffer: Framebuffer,
    view: SurfaceViewport,
    clear_color: Color<f32>,
    shaders: DataVec<ShaderData>,
    programs: DataVec<ProgramData>,
    buffers: DataVec<BufferData>,
    attributes: Vec<Option<AttributeBinding>>,
    current: Option<ProgramHandle>,
    draws: Vec<DrawCall>,
}

/// A shared handle to a software device. Clones refer to the same device, which
/// lets a surface resize the drawing buffer the visitor renders into.
#[derive(Clone)]
pub struct HeadlessVisitor {
    device: Rc<RefCell<Device>>,
}

impl HeadlessVisitor {
    /// Creates a device with a drawing buffer of `dimensions`.
    pub fn new(dimensions: Vector2<u32>) -> Self {
        let device = Device {
            framebuffer: Framebuffer::new(dimensions),
            view: SurfaceViewport::default(),
            clear_color: Color::transparent(),
            shaders: DataVec::new(),
            programs: DataVec::new(),
            buffers: DataVec::new(),
            attributes: vec![None; MAX_VERTEX_ATTRIBUTES as usize],
            current: None,
            draws: Vec::new(),
        };

        HeadlessVisitor {
            device: Rc::new(RefCell::new(device)),
        }
    }

    /// Resizes the drawing buffer, discarding its contents.
    pub fn resize(&self, dimensions: Vector2<u32>) {
        self.device.borrow_mut().framebuffer.resize(dimensions);
    }

    /// Returns the drawing buffer dimensions.
    pub fn dimensions(&self) -> Vector2<u32> {
        self.device.borrow().framebuffer.dimensions()
    }

    pub fn viewport(&self) -> SurfaceViewport {
        self.device.borrow().view
    }

    /// Reads back a pixel of the drawing buffer, counted from the lower-left corner.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color<f32>> {
        self.device.borrow().framebuffer.pixel(x, y)
    }

    /// Reads back the contents of a buffer object.
    pub fn buffer(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        self.device
            .borrow()
            .buffers
            .get(handle)
            .map(|v| v.bytes.clone())
    }

    /// Reads back the contents of a buffer object as 32-bit floats.
    pub fn buffer_f32(&self, handle: BufferHandle) -> Option<Vec<f32>> {
        let bytes = self.buffer(handle)?;
        let mut values = vec![0.0; bytes.len() / 4];
        LittleEndian::read_f32_into(&bytes[0..values.len() * 4], &mut values);
        Some(values)
    }

    pub fn buffer_hint(&self, handle: BufferHandle) -> Option<BufferHint> {
        self.device.borrow().buffers.get(handle).map(|v| v.hint)
    }

    /// Returns true if `handle` refers to a shader object that has not been deleted.
    pub fn is_shader_alive(&self, handle: ShaderHandle) -> bool {
        self.device.borrow().shaders.get(handle).is_some()
    }

    /// Reads back the info log of a shader object, empty after a clean compile.
    pub fn shader_log(&self, handle: ShaderHandle) -> Option<String> {
        self.device
            .borrow()
            .shaders
            .get(handle)
            .map(|v| v.log.clone())
    }

    /// Returns the buffer and layout an enabled attribute location reads from.
    pub fn attribute(&self, location: u32) -> Option<(BufferHandle, AttributeLayout)> {
        self.device
            .borrow()
            .attributes
            .get(location as usize)
            .cloned()
            .and_then(|v| v.map(|v| (v.buffer, v.layout)))
    }

    /// Returns the draw calls issued so far.
    pub fn draws(&self) -> Ref<[DrawCall]> {
        Ref::map(self.device.borrow(), |v| v.draws.as_slice())
    }
}

impl Device {
    fn shader(&self, handle: ShaderHandle) -> Result<&ShaderData> {
        self.shaders
            .get(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }

    fn program(&self, handle: ProgramHandle) -> Result<&ProgramData> {
        self.programs
            .get(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }

    fn program_mut(&mut self, handle: ProgramHandle) -> Result<&mut ProgramData> {
        self.programs
            .get_mut(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }

    fn link(attached: &[ShaderData]) -> ::std::result::Result<Linked, String> {
        let mut vertex = None;
        let mut fragment = None;

        for shader in attached {
            let module = shader.module.as_ref().ok_or_else(|| {
                format!("error: attached {:?} shader is not compiled.", shader.stage)
            })?;

            let slot = match shader.stage {
                ShaderStage::Vertex => &mut vertex,
                ShaderStage::Fragment => &mut fragment,
            };

            if slot.is_some() {
                return Err(format!(
                    "error: more than one {:?} shader attached.",
                    shader.stage
                ));
            }

            *slot = Some(module.clone());
        }

        let vertex = vertex.ok_or_else(|| "error: missing vertex shader.".to_owned())?;
        let fragment = fragment.ok_or_else(|| "error: missing fragment shader.".to_owned())?;

        let locations: Vec<String> = vertex.attributes().map(|v| v.name.clone()).collect();
        if locations.len() > MAX_VERTEX_ATTRIBUTES as usize {
            return Err(format!(
                "error: too many active attributes ({} > {}).",
                locations.len(),
                MAX_VERTEX_ATTRIBUTES
            ));
        }

        for uniform in fragment.declarations.iter() {
            let conflict = vertex
                .declarations
                .iter()
                .find(|v| v.name == uniform.name && v.size != uniform.size);

            if conflict.is_some() {
                return Err(format!(
                    "error: uniform '{}' differs between shader stages.",
                    uniform.name
                ));
            }
        }

        Ok(Linked {
            vertex,
            fragment,
            locations,
        })
    }

    /// Reads the `index`th vertex of an attribute, filling missing components with
    /// `(0, 0, 0, 1)`.
    fn fetch(&self, binding: &AttributeBinding, index: u32) -> Result<[f32; 4]> {
        let buffer = self
            .buffers
            .get(binding.buffer)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", binding.buffer)))?;

        let layout = binding.layout;
        let component = layout.format.size() as usize;
        let start = layout.offset as usize + index as usize * layout.effective_stride();
        let end = start + component * layout.size as usize;

        if end > buffer.bytes.len() {
            bail!(
                "[Headless] Vertex {} reads past the end of {} ({} > {} bytes).",
                index,
                binding.buffer,
                end,
                buffer.bytes.len()
            );
        }

        let mut v = [0.0, 0.0, 0.0, 1.0];
        for i in 0..layout.size as usize {
            let bytes = &buffer.bytes[start + i * component..];
            v[i] = match layout.format {
                VertexFormat::Float => LittleEndian::read_f32(bytes),
            };
        }

        Ok(v)
    }

    fn draw(&mut self, linked: &Linked, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        let color = linked.fragment.run(Output::FragColor, |_| None);
        let color = Color::from(color);

        let mut positions = Vec::with_capacity(count as usize);
        for index in first..first + count {
            let mut inputs = Vec::with_capacity(linked.locations.len());
            for (location, name) in linked.locations.iter().enumerate() {
                let value = match self.attributes[location] {
                    Some(ref binding) => self.fetch(binding, index)?,
                    None => [0.0, 0.0, 0.0, 1.0],
                };

                inputs.push((name.as_str(), value));
            }

            let position = linked.vertex.run(Output::Position, |name| {
                inputs.iter().find(|v| v.0 == name).map(|v| v.1)
            });

            positions.push(position);
        }

        let vp = self.view;
        match primitive {
            Primitive::Triangles => {
                for v in positions.chunks(3).filter(|v| v.len() == 3) {
                    self.framebuffer.fill_triangle(vp, [v[0], v[1], v[2]], color);
                }
            }
        }

        Ok(())
    }
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let (module, log) = match glsl::compile(stage, source) {
            Ok(module) => (Some(module), String::new()),
            Err(log) => (None, log),
        };

        let shader = ShaderData { stage, module, log };
        self.device.borrow_mut().shaders.create(handle, shader);
        Ok(())
    }

    unsafe fn shader_compile_status(&self, handle: ShaderHandle) -> Result<bool> {
        let device = self.device.borrow();
        Ok(device.shader(handle)?.module.is_some())
    }

    unsafe fn shader_info_log(&self, handle: ShaderHandle) -> Result<String> {
        let device = self.device.borrow();
        Ok(device.shader(handle)?.log.clone())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        self.device
            .borrow_mut()
            .shaders
            .free(handle)
            .map(|_| ())
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }

    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let program = ProgramData {
            attached: Vec::new(),
            linked: None,
            log: String::new(),
        };

        self.device.borrow_mut().programs.create(handle, program);
        Ok(())
    }

    unsafe fn attach_shader(
        &mut self,
        program: ProgramHandle,
        shader: ShaderHandle,
    ) -> Result<()> {
        let mut device = self.device.borrow_mut();
        let shader = device.shader(shader)?.clone();
        device.program_mut(program)?.attached.push(shader);
        Ok(())
    }

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let mut device = self.device.borrow_mut();
        let program = device.program_mut(handle)?;

        match Device::link(&program.attached) {
            Ok(linked) => {
                program.linked = Some(linked);
                program.log.clear();
            }
            Err(log) => {
                program.linked = None;
                program.log = log;
            }
        }

        Ok(())
    }

    unsafe fn program_link_status(&self, handle: ProgramHandle) -> Result<bool> {
        let device = self.device.borrow();
        Ok(device.program(handle)?.linked.is_some())
    }

    unsafe fn program_info_log(&self, handle: ProgramHandle) -> Result<String> {
        let device = self.device.borrow();
        Ok(device.program(handle)?.log.clone())
    }

    unsafe fn attribute_location(
        &self,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>> {
        let device = self.device.borrow();
        let program = device.program(program)?;

        Ok(program.linked.as_ref().and_then(|linked| {
            linked
                .locations
                .iter()
                .position(|v| v == name)
                .map(|v| v as u32)
        }))
    }

    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        hint: BufferHint,
        data: &[u8],
    ) -> Result<()> {
        let buffer = BufferData {
            hint,
            bytes: data.to_vec(),
        };

        self.device.borrow_mut().buffers.create(handle, buffer);
        Ok(())
    }

    unsafe fn bind_attribute(
        &mut self,
        location: u32,
        buffer: BufferHandle,
        layout: AttributeLayout,
    ) -> Result<()> {
        let mut device = self.device.borrow_mut();
        if device.buffers.get(buffer).is_none() {
            return Err(Error::HandleInvalid(format!("{}", buffer)));
        }

        if location >= MAX_VERTEX_ATTRIBUTES {
            bail!("[Headless] A numeric argument is out of range.");
        }

        if layout.size == 0 || layout.size > 4 {
            bail!("[Headless] A numeric argument is out of range.");
        }

        device.attributes[location as usize] = Some(AttributeBinding { buffer, layout });
        Ok(())
    }

    unsafe fn update_surface_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        self.device.borrow_mut().view = vp;
        Ok(())
    }

    unsafe fn clear(&mut self, color: Color<f32>) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.clear_color = color;
        device.framebuffer.clear(color);
        Ok(())
    }

    unsafe fn use_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.program(handle)?;
        device.current = Some(handle);
        Ok(())
    }

    unsafe fn draw(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        let mut device = self.device.borrow_mut();
        let program = device.current;
        device.draws.push(DrawCall {
            program,
            primitive,
            first,
            count,
        });

        let linked = program
            .and_then(|v| device.programs.get(v))
            .and_then(|v| v.linked.clone());

        match linked {
            Some(linked) => device.draw(&linked, primitive, first, count),
            None => bail!("[Headless] The specified operation is not allowed in the current state."),
        }
    }

    unsafe fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::Handle;

    const VS: &str = "attribute float aUnused;\nattribute vec2 aPosition;\nattribute vec4 aColor;\nvoid main() {\n    gl_Position = vec4(aPosition, 0.0, 1.0) + aColor * 0.0;\n}\n";
    const FS: &str = "precision mediump float;\nuniform vec4 uTint;\nvoid main() {\n    gl_FragColor = vec4(0.5, 0.25, 1.0, 1.0) + uTint;\n}\n";

    fn handle<T: From<Handle>>(index: u32) -> T {
        Handle::new(index, 1).into()
    }

    fn program(device: &mut HeadlessVisitor, vs: &str, fs: &str) -> ProgramHandle {
        let program = handle(1);
        unsafe {
            device.create_shader(handle(1), ShaderStage::Vertex, vs).unwrap();
            device.create_shader(handle(2), ShaderStage::Fragment, fs).unwrap();
            device.create_program(program).unwrap();
            device.attach_shader(program, handle(1)).unwrap();
            device.attach_shader(program, handle(2)).unwrap();
            device.link_program(program).unwrap();
        }

        program
    }

    #[test]
    fn locations() {
        let mut device = HeadlessVisitor::new(Vector2::new(4, 4));
        let program = program(&mut device, VS, FS);

        unsafe {
            assert!(device.program_link_status(program).unwrap());
            assert_eq!(device.program_info_log(program).unwrap(), "");

            // Unused attributes are inactive and get no location.
            let position = device.attribute_location(program, "aPosition").unwrap();
            let color = device.attribute_location(program, "aColor").unwrap();
            assert_eq!(position, Some(0));
            assert_eq!(color, Some(1));
            assert_eq!(device.attribute_location(program, "aUnused").unwrap(), None);
            assert_eq!(device.attribute_location(program, "uTint").unwrap(), None);
        }
    }

    #[test]
    fn link_failure() {
        let mut device = HeadlessVisitor::new(Vector2::new(4, 4));
        let program = program(&mut device, VS, "void main() { gl_FragColor = ; }");

        unsafe {
            assert!(!device.shader_compile_status(handle(2)).unwrap());
            assert!(!device.shader_info_log(handle(2)).unwrap().is_empty());
            assert!(!device.program_link_status(program).unwrap());
            assert!(device
                .program_info_log(program)
                .unwrap()
                .contains("not compiled"));

            assert_eq!(device.attribute_location(program, "aPosition").unwrap(), None);
        }
    }

    #[test]
    fn draw_unlinked() {
        let mut device = HeadlessVisitor::new(Vector2::new(4, 4));

        unsafe {
            assert!(device.draw(Primitive::Triangles, 0, 3).is_err());
            device.create_program(handle(7)).unwrap();
            device.use_program(handle(7)).unwrap();
            assert!(device.draw(Primitive::Triangles, 0, 3).is_err());
            assert!(device.use_program(handle(8)).is_err());
        }

        let draws = device.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].program, None);
        assert_eq!(draws[1].program, Some(handle(7)));
    }

    #[test]
    fn interleaved() {
        let mut device = HeadlessVisitor::new(Vector2::new(8, 8));
        let program = program(&mut device, VS, FS);

        // Interleaved as [x, y, padding], covering the whole buffer with two triangles.
        let vertices: [f32; 18] = [
            -1.0, -1.0, 9.0, 1.0, -1.0, 9.0, -1.0, 1.0, 9.0, //
            1.0, -1.0, 9.0, 1.0, 1.0, 9.0, -1.0, 1.0, 9.0,
        ];

        let mut bytes = vec![0; vertices.len() * 4];
        LittleEndian::write_f32_into(&vertices, &mut bytes);

        let mut layout = AttributeLayout::float(2);
        layout.stride = 12;

        unsafe {
            device
                .create_buffer(handle(1), BufferHint::Immutable, &bytes)
                .unwrap();
            device.bind_attribute(0, handle(1), layout).unwrap();
            device
                .update_surface_viewport(SurfaceViewport::fill(Vector2::new(8, 8)))
                .unwrap();
            device.clear(Color::transparent()).unwrap();
            device.use_program(program).unwrap();
            device.draw(Primitive::Triangles, 0, 6).unwrap();

            // A seventh vertex would read past the end of the buffer.
            assert!(device.draw(Primitive::Triangles, 0, 7).is_err());
        }

        let color = Color::new(0.5, 0.25, 1.0, 1.0);
        for &(x, y) in &[(0, 0), (7, 0), (0, 7), (7, 7), (3, 4)] {
            assert_eq!(device.pixel(x, y), Some(color));
        }
    }

    #[test]
    fn fetch_with_offset() {
        let mut device = HeadlessVisitor::new(Vector2::new(4, 4));
        let mut layout = AttributeLayout::float(2);
        layout.offset = 4;

        let mut bytes = vec![0; 16];
        LittleEndian::write_f32_into(&[7.0, 0.5, -0.25, 3.0], &mut bytes);

        unsafe {
            device
                .create_buffer(handle(1), BufferHint::Immutable, &bytes)
                .unwrap();
            device.bind_attribute(3, handle(1), layout).unwrap();
            assert!(device.bind_attribute(16, handle(1), layout).is_err());
            assert!(device.bind_attribute(0, handle(2), layout).is_err());
        }

        assert_eq!(device.attribute(3), Some((handle(1), layout)));

        let binding = AttributeBinding {
            buffer: handle(1),
            layout,
        };

        let device = device.device.borrow();
        assert_eq!(device.fetch(&binding, 0).unwrap(), [0.5, -0.25, 0.0, 1.0]);
        assert!(device.fetch(&binding, 1).is_err());
    }
}
