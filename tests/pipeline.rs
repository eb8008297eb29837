use hello_triangle::launcher::{FRAGMENT_SHADER, POSITION_ATTRIBUTE, VERTEX_SHADER};
use hello_triangle::prelude::*;

fn acquire(width: u32, height: u32) -> (HeadlessSurface, VideoSystem) {
    let _ = env_logger::try_init();

    let surface = HeadlessSurface::new(Vector2::new(width, height));
    let video = VideoSystem::acquire(&surface).unwrap();
    (surface, video)
}

#[test]
fn compile() {
    let (surface, mut video) = acquire(32, 32);

    let vs = video.compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
    let fs = video.compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
    assert!(vs.is_valid());
    assert!(fs.is_valid());
    assert_ne!(vs, fs);

    let again = video.compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
    assert_ne!(vs, again);

    assert!(surface.device().is_shader_alive(vs));
    assert!(surface.device().is_shader_alive(fs));
    assert!(surface.device().is_shader_alive(again));

    // No diagnostic for valid sources.
    for &shader in &[vs, fs, again] {
        assert!(video.is_shader_alive(shader));
        assert_eq!(surface.device().shader_log(shader), Some(String::new()));
    }
}

#[test]
fn compile_failure() {
    let (surface, mut video) = acquire(32, 32);

    let source = "attribute vec4 a_position;\nvoid main() {\n    gl_Position = a_position\n}\n";
    let log = match video.compile(ShaderStage::Vertex, source) {
        Err(Error::ShaderCompilation { stage, log }) => {
            assert_eq!(stage, ShaderStage::Vertex);
            log
        }
        other => panic!("unexpected result {:?}", other),
    };

    assert!(log.contains("ERROR: 0:4: '}' : syntax error"));

    // The failed shader object is released, and its handle with it.
    let handle = ShaderHandle::from(hello_triangle::utils::Handle::new(1, 1));
    assert!(!surface.device().is_shader_alive(handle));
    assert!(!video.is_shader_alive(handle));

    // Stage mismatches are reported too.
    let err = video.compile(ShaderStage::Fragment, VERTEX_SHADER).unwrap_err();
    match err {
        Error::ShaderCompilation { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn link() {
    let (_, mut video) = acquire(32, 32);

    let vs = video.compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
    let fs = video.compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
    let program = video.link(vs, fs).unwrap();
    assert!(program.handle().is_valid());

    // Two vertex shaders.
    match video.link(vs, vs) {
        Err(Error::ProgramLink { program, log }) => {
            assert!(program.is_valid());
            assert!(log.contains("vertex") || log.contains("Vertex"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn upload() {
    let (surface, mut video) = acquire(32, 32);

    let buffer = video.upload(&TRIANGLE, BufferHint::Immutable).unwrap();
    assert!(video.is_buffer_alive(buffer));

    let device = surface.device();
    assert_eq!(device.buffer_f32(buffer), Some(TRIANGLE.to_vec()));
    assert_eq!(device.buffer(buffer).map(|v| v.len()), Some(24));
    assert_eq!(device.buffer_hint(buffer), Some(BufferHint::Immutable));
}

#[test]
fn bind_attribute() {
    let (surface, mut video) = acquire(32, 32);

    let vs = video.compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
    let fs = video.compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
    let program = video.link(vs, fs).unwrap();
    let buffer = video.upload(&TRIANGLE, BufferHint::Immutable).unwrap();

    let layout = AttributeLayout::float(2);
    let location = video
        .bind_attribute(&program, POSITION_ATTRIBUTE, buffer, layout)
        .unwrap();

    assert_eq!(surface.device().attribute(location), Some((buffer, layout)));

    match video.bind_attribute(&program, "a_color", buffer, layout) {
        Err(Error::AttributeUndefined(name)) => assert_eq!(name, "a_color"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn resize() {
    let (surface, mut video) = acquire(123, 45);
    assert_eq!(surface.drawing_buffer_dimensions(), Vector2::new(300, 150));

    let vp = video.resize(&surface).unwrap();
    assert_eq!(vp.position, Vector2::new(0, 0));
    assert_eq!(vp.size, Vector2::new(123, 45));
    assert_eq!(surface.drawing_buffer_dimensions(), Vector2::new(123, 45));
    assert_eq!(surface.device().viewport(), vp);
}

#[test]
fn render() {
    let (surface, mut video) = acquire(100, 100);

    let vs = video.compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
    let fs = video.compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
    let program = video.link(vs, fs).unwrap();
    let buffer = video.upload(&TRIANGLE, BufferHint::Immutable).unwrap();
    video
        .bind_attribute(&program, POSITION_ATTRIBUTE, buffer, AttributeLayout::float(2))
        .unwrap();

    video.resize(&surface).unwrap();
    video.render(&program, Color::transparent()).unwrap();

    let device = surface.device();
    let color = Color::from(TRIANGLE_COLOR);

    // Interior samples.
    assert_eq!(device.pixel(35, 45), Some(color));
    assert_eq!(device.pixel(20, 70), Some(color));
    assert_eq!(device.pixel(60, 30), Some(color));

    // Cleared to transparent black outside.
    assert_eq!(device.pixel(80, 80), Some(Color::transparent()));
    assert_eq!(device.pixel(2, 98), Some(Color::transparent()));

    let draws = device.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].program, Some(program.handle()));
    assert_eq!(draws[0].primitive, Primitive::Triangles);
    assert_eq!(draws[0].first, 0);
    assert_eq!(draws[0].count, 3);
}
