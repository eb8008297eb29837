use failure::Fail;

use crate::video::assets::{ProgramHandle, ShaderStage};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Graphics context is unavailable: {}", _0)]
    ContextUnavailable(String),
    #[fail(display = "Drawable surface `{}` does not exist.", _0)]
    SurfaceNotFound(String),
    #[fail(display = "Failed to compile {:?} shader, errors: \n{}", stage, log)]
    ShaderCompilation { stage: ShaderStage, log: String },
    #[fail(display = "Failed to link {}, errors: \n{}", program, log)]
    ProgramLink { program: ProgramHandle, log: String },
    #[fail(display = "Attribute({:?}) is undefined in shader sources.", _0)]
    AttributeUndefined(String),
    #[fail(display = "{} is invalid.", _0)]
    HandleInvalid(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "Settings: {}", _0)]
    Settings(String),
    #[fail(display = "IO: {}", _0)]
    Io(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

macro_rules! err_format {
    ($e:expr) => {
        $crate::errors::Error::Backend(String::from($e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Backend(format!($fmt, $($arg)+))
    };
}

macro_rules! bail {
    ($($arg:tt)+) => {
        return Err(err_format!($($arg)+))
    };
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Settings(format!("{}", err))
    }
}

impl From<::std::io::Error> for Error {
    fn from(err: ::std::io::Error) -> Error {
        Error::Io(format!("{}", err))
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "native"))]
impl From<glutin::CreationError> for Error {
    fn from(err: glutin::CreationError) -> Error {
        Error::ContextUnavailable(format!("{}", err))
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "native"))]
impl From<glutin::ContextError> for Error {
    fn from(err: glutin::ContextError) -> Error {
        Error::Backend(format!("{}", err))
    }
}
