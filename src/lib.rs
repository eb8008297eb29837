//! # hello-triangle
//!
//! Acquires a graphics context for a drawable surface, compiles a pass-through
//! vertex shader and a constant-color fragment shader, uploads three vertices and
//! draws them once.
//!
//! The same pipeline runs on WebGL in browsers, on OpenGL ES 2.0 through `glutin`
//! natively (feature `native`), and on a software device that needs no GPU at all:
//!
//! ```rust
//! use hello_triangle::prelude::*;
//!
//! let surface = HeadlessSurface::new(Vector2::new(64, 64));
//! let frame = Launcher::new(PipelineParams::default()).launch(&surface).unwrap();
//!
//! assert_eq!(frame.viewport.size, Vector2::new(64, 64));
//! assert_eq!(surface.device().pixel(24, 28), Some(Color::from(TRIANGLE_COLOR)));
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate nom;

#[macro_use]
pub mod errors;
#[macro_use]
pub mod utils;

pub mod launcher;
pub mod math;
pub mod settings;
pub mod sys;
pub mod video;
pub mod window;

pub mod prelude {
    pub use crate::errors::{Error, Result};
    pub use crate::launcher::{Frame, Launcher, TRIANGLE, TRIANGLE_COLOR};
    pub use crate::math::prelude::*;
    pub use crate::settings::{PipelineParams, Settings};
    pub use crate::video::prelude::*;
    pub use crate::window::prelude::*;
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point of the wasm module. Looks up the canvas and runs the pipeline once
/// with default settings.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    let settings = settings::Settings::default();
    sys::init(settings.log_level().unwrap_or(log::LevelFilter::Info));

    let result = window::backends::web::WebSurface::new(&settings.surface)
        .and_then(|surface| launcher::Launcher::new(settings.pipeline).launch(&surface));

    if let Err(err) = result {
        error!("{}", err);
    }
}
