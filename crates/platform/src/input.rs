//! Double-buffered keyboard and mouse state.
//!
//! Two slots rotate once per frame: the event callback writes into the
//! current slot, the main loop compares current against previous to derive
//! edge-triggered conditions ("just pressed"). Both slots are plain `Copy`
//! data; nothing allocates after startup.

use crate::event::{MouseButton, WindowEvent};

/// Size of the fixed key table. Raw virtual-key codes fit in one byte;
/// anything outside the table is ignored on record.
pub const KEY_TABLE_LEN: usize = 256;

/// Named key codes for the keys the harness reacts to.
pub mod keys {
    /// Virtual-key code for the letter T.
    pub const KEY_T: u32 = 0x54;
}

/// Mouse state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    /// Cursor position in client-area pixels.
    pub x: i32,
    pub y: i32,
    /// Wheel movement this frame; zeroed by every rotation.
    pub wheel: i32,
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

/// One input slot: key levels plus mouse state.
#[derive(Debug, Clone, Copy)]
pub struct InputState {
    keys: [bool; KEY_TABLE_LEN],
    mouse: MouseState,
}

impl InputState {
    fn new() -> Self {
        Self {
            keys: [false; KEY_TABLE_LEN],
            mouse: MouseState::default(),
        }
    }

    /// Whether the key with the given raw code is down. Out-of-range codes
    /// read as not-down.
    #[inline]
    pub fn key_down(&self, code: u32) -> bool {
        self.keys.get(code as usize).copied().unwrap_or(false)
    }

    /// Whether the given mouse button is down.
    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.mouse.left,
            MouseButton::Middle => self.mouse.middle,
            MouseButton::Right => self.mouse.right,
        }
    }

    /// Cursor position in client-area pixels.
    #[inline]
    pub fn mouse_position(&self) -> (i32, i32) {
        (self.mouse.x, self.mouse.y)
    }

    /// Wheel movement recorded this frame.
    #[inline]
    pub fn wheel_delta(&self) -> i32 {
        self.mouse.wheel
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-slot rotating input record.
pub struct InputBuffer {
    slots: [InputState; 2],
    current: usize,
}

impl InputBuffer {
    /// Create a buffer with both slots empty.
    pub fn new() -> Self {
        Self {
            slots: [InputState::new(); 2],
            current: 0,
        }
    }

    /// Rotate the active slot at the start of a frame.
    ///
    /// The new current slot starts as a copy of the previous frame's
    /// persistent state (key and button levels, cursor position) with the
    /// transient wheel delta reset to zero.
    pub fn advance(&mut self) {
        let previous = self.current;
        self.current ^= 1;
        self.slots[self.current] = self.slots[previous];
        self.slots[self.current].mouse.wheel = 0;
    }

    /// Record one raw event into the current slot.
    ///
    /// Non-input events (close, resize) are ignored here; they are routed to
    /// the loop signals instead. Key codes outside the fixed table are
    /// dropped rather than indexing out of range.
    pub fn record(&mut self, event: &WindowEvent) {
        let mouse = &mut self.slots[self.current].mouse;
        match *event {
            WindowEvent::MouseMoved { x, y } => {
                mouse.x = x;
                mouse.y = y;
            }
            WindowEvent::MouseWheel { delta } => {
                mouse.wheel += delta;
            }
            WindowEvent::MouseButton { button, pressed } => match button {
                MouseButton::Left => mouse.left = pressed,
                MouseButton::Middle => mouse.middle = pressed,
                MouseButton::Right => mouse.right = pressed,
            },
            WindowEvent::Key { code, pressed } => {
                if let Some(slot) = self.slots[self.current].keys.get_mut(code as usize) {
                    *slot = pressed;
                }
            }
            WindowEvent::CloseRequested | WindowEvent::Resized { .. } => {}
        }
    }

    /// The slot being written this frame.
    #[inline]
    pub fn current(&self) -> &InputState {
        &self.slots[self.current]
    }

    /// The slot from the previous frame.
    #[inline]
    pub fn previous(&self) -> &InputState {
        &self.slots[self.current ^ 1]
    }

    /// Whether a key is down this frame.
    #[inline]
    pub fn key_down(&self, code: u32) -> bool {
        self.current().key_down(code)
    }

    /// Whether a key transitioned not-down -> down this frame.
    #[inline]
    pub fn key_just_pressed(&self, code: u32) -> bool {
        self.current().key_down(code) && !self.previous().key_down(code)
    }

    /// Whether a key transitioned down -> not-down this frame.
    #[inline]
    pub fn key_just_released(&self, code: u32) -> bool {
        !self.current().key_down(code) && self.previous().key_down(code)
    }

    /// Whether a mouse button transitioned not-down -> down this frame.
    #[inline]
    pub fn button_just_pressed(&self, button: MouseButton) -> bool {
        self.current().button_down(button) && !self.previous().button_down(button)
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: u32, pressed: bool) -> WindowEvent {
        WindowEvent::Key { code, pressed }
    }

    #[test]
    fn test_just_pressed_fires_only_on_transition_frame() {
        let mut input = InputBuffer::new();

        // Frame 1: key goes down.
        input.advance();
        input.record(&key(keys::KEY_T, true));
        assert!(input.key_just_pressed(keys::KEY_T));

        // Frame 2: key held, no event. Level persists, edge does not.
        input.advance();
        assert!(input.key_down(keys::KEY_T));
        assert!(!input.key_just_pressed(keys::KEY_T));

        // Frame 3: key released.
        input.advance();
        input.record(&key(keys::KEY_T, false));
        assert!(!input.key_just_pressed(keys::KEY_T));
        assert!(input.key_just_released(keys::KEY_T));

        // Frame 4: pressed again -> edge fires again.
        input.advance();
        input.record(&key(keys::KEY_T, true));
        assert!(input.key_just_pressed(keys::KEY_T));
    }

    #[test]
    fn test_wheel_delta_is_per_frame_only() {
        let mut input = InputBuffer::new();

        input.advance();
        assert_eq!(input.current().wheel_delta(), 0, "zero before any event");
        input.record(&WindowEvent::MouseWheel { delta: 120 });
        input.record(&WindowEvent::MouseWheel { delta: -240 });
        assert_eq!(input.current().wheel_delta(), -120, "accumulates within a frame");

        input.advance();
        assert_eq!(input.current().wheel_delta(), 0, "reset by rotation");
    }

    #[test]
    fn test_persistent_state_survives_two_rotations() {
        let mut input = InputBuffer::new();

        input.advance();
        input.record(&key(0x41, true));
        input.record(&WindowEvent::MouseMoved { x: 7, y: 9 });
        input.record(&WindowEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });

        // Two rotations with no events: both slots now carry the same
        // persistent state as the frame the events landed in.
        input.advance();
        input.advance();
        assert!(input.key_down(0x41));
        assert!(input.previous().key_down(0x41));
        assert_eq!(input.current().mouse_position(), (7, 9));
        assert!(input.current().button_down(MouseButton::Left));

        // An event recorded in between composes on top.
        input.advance();
        input.record(&key(0x41, false));
        assert!(!input.key_down(0x41));
        assert!(input.previous().key_down(0x41));
    }

    #[test]
    fn test_out_of_range_key_code_is_ignored() {
        let mut input = InputBuffer::new();
        input.advance();
        input.record(&key(KEY_TABLE_LEN as u32, true));
        input.record(&key(u32::MAX, true));
        assert!(!input.key_down(KEY_TABLE_LEN as u32));
        assert!(!input.key_down(u32::MAX));
    }

    #[test]
    fn test_button_edge_detection() {
        let mut input = InputBuffer::new();

        input.advance();
        input.record(&WindowEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
        });
        assert!(input.button_just_pressed(MouseButton::Right));

        input.advance();
        assert!(input.current().button_down(MouseButton::Right));
        assert!(!input.button_just_pressed(MouseButton::Right));
    }
}
