//! The main loop of the harness.
//!
//! [`run`] ties the pieces together: it drains window events into the
//! double-buffered input state, reacts to resize and close signals, derives
//! edge-triggered input, and clears/presents every frame until the window is
//! closed. It is generic over the event source and the graphics backend so
//! the loop tests can drive it with scripted events and the mock backend.

use tracing::{info, trace, warn};

use frameloop_core::Timer;
use frameloop_gfx::{Display, GfxError, GraphicsApi};
use frameloop_platform::{keys, route_event, EventSource, InputBuffer, LoopSignals};

/// Fixed clear color for every frame.
pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.2, 0.6, 1.0];

/// Run the clear/present loop until a close is requested.
///
/// Each iteration: advance the input buffer, drain all pending window
/// events, handle a pending resize, then clear and present. Once a close is
/// observed the loop exits before rendering, so no present is issued on or
/// after the close frame. Device loss during present rebuilds the whole
/// device context set from `api` and continues.
pub fn run<E, A>(events: &mut E, api: A) -> anyhow::Result<()>
where
    E: EventSource,
    A: GraphicsApi + Clone,
{
    let mut signals = LoopSignals::new();
    let mut input = InputBuffer::new();
    let mut display = Display::new(api.clone())?;
    let mut timer = Timer::new();

    info!("Entering main loop");
    while signals.is_running() {
        input.advance();
        events.pump(&mut |event| route_event(event, &mut signals, &mut input))?;

        display.resize_if_needed(&mut signals)?;

        if !signals.is_running() {
            break;
        }

        if input.key_just_pressed(keys::KEY_T) {
            trace!("Just pressed T");
        }

        match display.render(CLEAR_COLOR) {
            Ok(()) => {}
            Err(GfxError::DeviceLost(reason)) => {
                warn!("Graphics device lost ({reason}), recreating device context set");
                // The window can host only one swap chain, so the old set
                // must be fully released before its replacement is created.
                drop(display);
                display = Display::new(api.clone())?;
            }
            Err(e) => return Err(e.into()),
        }

        trace!("Frame time: {:.3} ms", timer.delta_secs() * 1000.0);
    }

    info!("Main loop stopped, releasing graphics resources");
    Ok(())
}
