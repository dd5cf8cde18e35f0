//! Platform layer for the frameloop harness.
//!
//! This crate provides:
//! - A platform-neutral window event model and loop signal context
//! - Double-buffered keyboard/mouse input state
//! - The Win32 window subsystem (class registration, message pump, teardown)

mod event;
mod input;

#[cfg(windows)]
mod win32;

pub use event::{route_event, EventSource, LoopSignals, MouseButton, ScriptedEvents, WindowEvent};
pub use input::{keys, InputBuffer, InputState, KEY_TABLE_LEN};

#[cfg(windows)]
pub use win32::Win32Window;
