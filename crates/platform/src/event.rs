//! Window events and loop signals.
//!
//! The window subsystem delivers raw events through the [`EventSource`]
//! trait; [`route_event`] is the single callback that turns each event into
//! either a loop signal or an input mutation. Keeping the signals in an
//! explicit [`LoopSignals`] context (instead of flags behind a user-data
//! pointer) lets the main loop poll them directly.

use std::collections::VecDeque;

use frameloop_core::Result;

use crate::input::InputBuffer;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Raw event delivered by the window subsystem.
///
/// Coordinates are signed pixels relative to the window client area; key
/// codes are the platform's raw virtual-key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user asked to close the window.
    CloseRequested,
    /// The window client area changed size.
    Resized { width: u32, height: u32 },
    /// Absolute cursor position within the client area.
    MouseMoved { x: i32, y: i32 },
    /// Raw wheel movement (positive away from the user).
    MouseWheel { delta: i32 },
    /// A mouse button changed state.
    MouseButton { button: MouseButton, pressed: bool },
    /// A key changed state.
    Key { code: u32, pressed: bool },
}

/// Flags flipped by the event callback and polled by the main loop.
#[derive(Debug)]
pub struct LoopSignals {
    running: bool,
    resize_pending: bool,
}

impl LoopSignals {
    /// Fresh signals: running, no resize pending.
    pub fn new() -> Self {
        Self {
            running: true,
            resize_pending: false,
        }
    }

    /// Whether the loop should keep running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Transition to the stopped state. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Note that a resize was observed; handled once per frame.
    pub fn mark_resized(&mut self) {
        self.resize_pending = true;
    }

    /// Whether a resize is waiting to be handled.
    #[inline]
    pub fn resize_pending(&self) -> bool {
        self.resize_pending
    }

    /// Consume the pending resize flag, returning whether one was set.
    pub fn take_resize(&mut self) -> bool {
        std::mem::take(&mut self.resize_pending)
    }
}

impl Default for LoopSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes one raw event to its destination.
///
/// Close and resize flip loop signals; everything else mutates the current
/// input slot. Runs synchronously on the loop thread during the message
/// drain.
pub fn route_event(event: WindowEvent, signals: &mut LoopSignals, input: &mut InputBuffer) {
    match event {
        WindowEvent::CloseRequested => signals.stop(),
        WindowEvent::Resized { .. } => signals.mark_resized(),
        _ => input.record(&event),
    }
}

/// A source of window events, drained once per frame.
pub trait EventSource {
    /// Drain all pending events without blocking, handing each to `sink` in
    /// arrival order.
    fn pump(&mut self, sink: &mut dyn FnMut(WindowEvent)) -> Result<()>;
}

/// Event source that replays a scripted sequence, one frame per pump.
///
/// Used by loop tests to synthesize exact per-frame event timing. Once the
/// script is exhausted every further pump reports a close request, so a loop
/// driven by this source always terminates.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    frames: VecDeque<Vec<WindowEvent>>,
}

impl ScriptedEvents {
    /// Build a source from per-frame event batches.
    pub fn new(frames: Vec<Vec<WindowEvent>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn pump(&mut self, sink: &mut dyn FnMut(WindowEvent)) -> Result<()> {
        match self.frames.pop_front() {
            Some(events) => {
                for event in events {
                    sink(event);
                }
            }
            None => sink(WindowEvent::CloseRequested),
        }
        Ok(())
    }
}
