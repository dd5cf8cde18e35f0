//! The graphics backend trait.

use crate::error::GfxResult;

/// Low-level graphics operations behind the [`Display`](crate::Display)
/// manager.
///
/// Every associated type is an owned RAII handle: dropping it releases the
/// underlying resource exactly once. The manager relies on that to release
/// the device context set in strict reverse-creation order.
///
/// Implementations: [`D3d11Api`](crate::D3d11Api) on Windows, and
/// [`mock::MockGraphics`](crate::mock::MockGraphics) for tests.
pub trait GraphicsApi {
    /// The graphics device.
    type Device;
    /// The immediate context used for clears and state resets.
    type Context;
    /// The swap chain bound to the window.
    type SwapChain;
    /// A render-target view over the swap chain's back buffer.
    type TargetView;

    /// Create a hardware device and its immediate context. Fails fatally if
    /// no hardware device at the minimum feature level is available.
    fn create_device(&mut self) -> GfxResult<(Self::Device, Self::Context)>;

    /// Create a double-buffered flip-model swap chain sized to the window's
    /// current client area.
    fn create_swap_chain(&mut self, device: &Self::Device) -> GfxResult<Self::SwapChain>;

    /// Fetch the swap chain's buffer 0 and wrap it in a render-target view.
    /// Must be re-invoked after every buffer resize.
    fn back_buffer_view(
        &mut self,
        swap_chain: &Self::SwapChain,
        device: &Self::Device,
    ) -> GfxResult<Self::TargetView>;

    /// Clear bound pipeline state and resize the swap chain buffers to the
    /// window's new size, preserving buffer count and format. The caller
    /// must have released every back-buffer reference first.
    fn resize_buffers(
        &mut self,
        context: &Self::Context,
        swap_chain: &Self::SwapChain,
    ) -> GfxResult<()>;

    /// Clear the view to a solid color.
    fn clear(&mut self, context: &Self::Context, view: &Self::TargetView, color: [f32; 4]);

    /// Present with vsync interval 1. Device loss is reported as
    /// [`GfxError::DeviceLost`](crate::GfxError::DeviceLost), distinct from
    /// other present failures.
    fn present(&mut self, swap_chain: &Self::SwapChain) -> GfxResult<()>;
}
