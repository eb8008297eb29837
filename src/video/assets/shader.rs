//! Shader objects and the programs linked from them.

impl_handle!(ShaderHandle);
impl_handle!(ProgramHandle);

/// The pipeline stage a shader object is compiled for.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// A program object whose link status has been checked and found successful.
///
/// Only `VideoSystem::link` hands these out, which makes it impossible to render
/// with a program that failed to link unless the caller asks for it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Program {
    handle: ProgramHandle,
}

impl Program {
    #[inline]
    pub(crate) fn linked(handle: ProgramHandle) -> Self {
        Program { handle }
    }

    /// Wraps a program object without any link guarantee. Drawing with it
    /// reproduces whatever the backend does with an unlinked program.
    #[inline]
    pub fn assume_linked(handle: ProgramHandle) -> Self {
        Program { handle }
    }

    #[inline]
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }
}
