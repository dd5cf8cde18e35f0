//! Display lifecycle management.
//!
//! [`Display`] owns the device context set — device, immediate context,
//! swap chain, back-buffer view — created in that order and released in
//! strict reverse order on drop. It reacts to resize signals by recreating
//! the view, and turns clear/present into one call for the main loop.

use tracing::{debug, warn};

use frameloop_platform::LoopSignals;

use crate::api::GraphicsApi;
use crate::error::{GfxError, GfxResult};

/// Owner of the device context set for one window.
pub struct Display<A: GraphicsApi> {
    // Field order is drop order: the view goes before the swap chain, the
    // swap chain before the context, the context before the device.
    view: Option<A::TargetView>,
    swap_chain: A::SwapChain,
    context: A::Context,
    device: A::Device,
    api: A,
}

impl<A: GraphicsApi> Display<A> {
    /// Create the full device context set: device and context, then the
    /// swap chain, then the back-buffer view. Any failure is fatal.
    pub fn new(mut api: A) -> GfxResult<Self> {
        let (device, context) = api.create_device()?;
        let swap_chain = api.create_swap_chain(&device)?;
        let view = api.back_buffer_view(&swap_chain, &device)?;
        Ok(Self {
            view: Some(view),
            swap_chain,
            context,
            device,
            api,
        })
    }

    /// Handle a pending resize, if any. A no-op when no resize is pending.
    ///
    /// Releases exactly one view, resizes the buffers preserving count and
    /// format, and fetches exactly one new view. If the buffer resize
    /// itself fails the previous buffers stay in use; only a failure to
    /// re-fetch the view is fatal.
    pub fn resize_if_needed(&mut self, signals: &mut LoopSignals) -> GfxResult<()> {
        if !signals.take_resize() {
            return Ok(());
        }
        debug!("Resize observed, recreating back-buffer view");

        // Every back-buffer reference must be gone before the resize.
        self.view = None;
        if let Err(e) = self.api.resize_buffers(&self.context, &self.swap_chain) {
            warn!("Buffer resize failed, keeping previous back buffer: {e}");
        }
        self.view = Some(self.api.back_buffer_view(&self.swap_chain, &self.device)?);
        Ok(())
    }

    /// Clear the back buffer to `color` and present with vsync.
    ///
    /// Present failures are logged and swallowed, except device loss, which
    /// is returned so the caller can rebuild the whole device context set.
    pub fn render(&mut self, color: [f32; 4]) -> GfxResult<()> {
        if let Some(view) = &self.view {
            self.api.clear(&self.context, view, color);
        }
        match self.api.present(&self.swap_chain) {
            Ok(()) => Ok(()),
            Err(e @ GfxError::DeviceLost(_)) => Err(e),
            Err(e) => {
                warn!("Present failed: {e}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockGraphics, ResourceKind};

    const COLOR: [f32; 4] = [0.0; 4];

    #[test]
    fn test_creation_acquires_full_device_context_set() {
        let api = MockGraphics::new();
        let tracker = api.tracker();

        let display = Display::new(api).unwrap();
        assert_eq!(tracker.live(), 4);
        assert_eq!(tracker.created_count(ResourceKind::Device), 1);
        assert_eq!(tracker.created_count(ResourceKind::Context), 1);
        assert_eq!(tracker.created_count(ResourceKind::SwapChain), 1);
        assert_eq!(tracker.created_count(ResourceKind::TargetView), 1);
        drop(display);
    }

    #[test]
    fn test_drop_releases_in_reverse_creation_order() {
        let api = MockGraphics::new();
        let tracker = api.tracker();

        drop(Display::new(api).unwrap());
        assert_eq!(tracker.live(), 0);
        assert_eq!(
            tracker.release_order(),
            vec![
                ResourceKind::TargetView,
                ResourceKind::SwapChain,
                ResourceKind::Context,
                ResourceKind::Device,
            ]
        );
    }

    #[test]
    fn test_resize_without_pending_flag_is_a_noop() {
        let api = MockGraphics::new();
        let tracker = api.tracker();
        let mut display = Display::new(api).unwrap();
        let mut signals = LoopSignals::new();

        display.resize_if_needed(&mut signals).unwrap();
        assert_eq!(tracker.resizes(), 0);
        assert_eq!(tracker.created_count(ResourceKind::TargetView), 1);
        assert_eq!(tracker.released_count(ResourceKind::TargetView), 0);
    }

    #[test]
    fn test_resize_swaps_exactly_one_view() {
        let api = MockGraphics::new();
        let tracker = api.tracker();
        let mut display = Display::new(api).unwrap();
        let mut signals = LoopSignals::new();

        signals.mark_resized();
        display.resize_if_needed(&mut signals).unwrap();
        assert_eq!(tracker.resizes(), 1);
        assert_eq!(tracker.released_count(ResourceKind::TargetView), 1);
        assert_eq!(tracker.created_count(ResourceKind::TargetView), 2);
        assert!(!signals.resize_pending(), "flag consumed by the resize");

        // A second call without a new resize event does nothing.
        display.resize_if_needed(&mut signals).unwrap();
        assert_eq!(tracker.resizes(), 1);
    }

    #[test]
    fn test_failed_buffer_resize_keeps_previous_buffers() {
        let mut api = MockGraphics::new();
        api.fail_resize = true;
        let tracker = api.tracker();
        let mut display = Display::new(api).unwrap();
        let mut signals = LoopSignals::new();

        signals.mark_resized();
        display.resize_if_needed(&mut signals).unwrap();
        // The view is still swapped so rendering continues on the old size.
        assert_eq!(tracker.created_count(ResourceKind::TargetView), 2);
        display.render(COLOR).unwrap();
    }

    #[test]
    fn test_present_failure_is_swallowed_with_a_warning() {
        let mut api = MockGraphics::new();
        api.fail_present = true;
        let tracker = api.tracker();
        let mut display = Display::new(api).unwrap();

        display.render(COLOR).unwrap();
        assert_eq!(tracker.presents(), 1);
        assert_eq!(tracker.clears(), 1);
    }

    #[test]
    fn test_device_loss_propagates() {
        let mut api = MockGraphics::new();
        api.lose_device_at_present = Some(1);
        let mut display = Display::new(api).unwrap();

        match display.render(COLOR) {
            Err(GfxError::DeviceLost(_)) => {}
            other => panic!("expected device loss, got {other:?}"),
        }
    }
}
