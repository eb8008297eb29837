pub mod headless;

#[cfg(all(not(target_arch = "wasm32"), feature = "native"))]
pub mod glutin;

#[cfg(target_arch = "wasm32")]
pub mod web;
