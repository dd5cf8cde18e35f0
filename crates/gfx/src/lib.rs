//! Graphics backend for the frameloop harness.
//!
//! This crate provides:
//! - The [`GraphicsApi`] trait: device, context, swap chain, and back-buffer
//!   view creation as RAII handles
//! - The Direct3D 11 / DXGI implementation (Windows only)
//! - An in-memory mock backend with a resource tracker, used by loop tests
//! - The [`Display`] manager that owns the device context set and handles
//!   resize and present

mod error;

pub mod api;
pub mod display;
pub mod mock;

#[cfg(windows)]
pub mod d3d11;

pub use api::GraphicsApi;
pub use display::Display;
pub use error::{GfxError, GfxResult};

#[cfg(windows)]
pub use d3d11::D3d11Api;
