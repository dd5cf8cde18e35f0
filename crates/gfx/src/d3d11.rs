//! Direct3D 11 / DXGI backend.
//!
//! Creates the hardware device, the flip-model swap chain bound to the
//! window, and the back-buffer render-target view. The COM wrappers from the
//! `windows` crate release their resources on drop, which gives the
//! [`Display`](crate::Display) manager its reverse-creation release order
//! for free.

use tracing::{info, warn};
use windows::core::Interface;
use windows::Win32::Foundation::{HMODULE, HWND};
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use crate::api::GraphicsApi;
use crate::error::{GfxError, GfxResult};

const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 1] = [D3D_FEATURE_LEVEL_11_0];

/// Direct3D 11 backend bound to one window.
#[derive(Clone)]
pub struct D3d11Api {
    hwnd: HWND,
}

impl D3d11Api {
    /// Bind the backend to a window handle. No resources are created until
    /// the display manager asks for them.
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }
}

impl GraphicsApi for D3d11Api {
    type Device = ID3D11Device;
    type Context = ID3D11DeviceContext;
    type SwapChain = IDXGISwapChain1;
    type TargetView = ID3D11RenderTargetView;

    fn create_device(&mut self) -> GfxResult<(ID3D11Device, ID3D11DeviceContext)> {
        let flags = if cfg!(debug_assertions) {
            D3D11_CREATE_DEVICE_DEBUG
        } else {
            D3D11_CREATE_DEVICE_FLAG(0)
        };

        let mut device: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;
        // SAFETY: out pointers are valid for the duration of the call.
        unsafe {
            D3D11CreateDevice(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                HMODULE::default(),
                flags,
                Some(&FEATURE_LEVELS),
                D3D11_SDK_VERSION,
                Some(&mut device),
                None,
                Some(&mut context),
            )
            .map_err(|e| GfxError::Device(format!("D3D11CreateDevice failed: {e}")))?;
        }
        let device =
            device.ok_or_else(|| GfxError::Device("D3D11CreateDevice returned no device".into()))?;
        let context = context
            .ok_or_else(|| GfxError::Device("D3D11CreateDevice returned no context".into()))?;

        if cfg!(debug_assertions) {
            break_on_errors(&device);
        }

        info!("Created D3D11 hardware device (feature level 11.0)");
        Ok((device, context))
    }

    fn create_swap_chain(&mut self, device: &ID3D11Device) -> GfxResult<IDXGISwapChain1> {
        // SAFETY: the device is live; the factory is derived from it so the
        // swap chain lands on the same adapter.
        unsafe {
            let dxgi_device = device
                .cast::<IDXGIDevice>()
                .map_err(|e| GfxError::SwapChain(format!("IDXGIDevice query failed: {e}")))?;
            let adapter = dxgi_device
                .GetAdapter()
                .map_err(|e| GfxError::SwapChain(format!("GetAdapter failed: {e}")))?;
            let factory: IDXGIFactory2 = adapter
                .GetParent()
                .map_err(|e| GfxError::SwapChain(format!("GetParent failed: {e}")))?;

            // Width/Height 0: take the size from the window's client area.
            let desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: 0,
                Height: 0,
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: 2,
                Scaling: DXGI_SCALING_NONE,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                AlphaMode: DXGI_ALPHA_MODE_UNSPECIFIED,
                Flags: 0,
                ..Default::default()
            };
            let swap_chain = factory
                .CreateSwapChainForHwnd(device, self.hwnd, &desc, None, None)
                .map_err(|e| GfxError::SwapChain(format!("CreateSwapChainForHwnd failed: {e}")))?;

            // Alt+Enter would otherwise switch the monitor resolution to
            // match the window size.
            if let Err(e) = factory.MakeWindowAssociation(self.hwnd, DXGI_MWA_NO_ALT_ENTER) {
                warn!("MakeWindowAssociation failed: {e}");
            }

            info!("Created flip-model swap chain (2 buffers, R8G8B8A8_UNORM)");
            Ok(swap_chain)
        }
    }

    fn back_buffer_view(
        &mut self,
        swap_chain: &IDXGISwapChain1,
        device: &ID3D11Device,
    ) -> GfxResult<ID3D11RenderTargetView> {
        // SAFETY: buffer 0 always exists on a live swap chain.
        unsafe {
            let back_buffer: ID3D11Texture2D = swap_chain
                .GetBuffer(0)
                .map_err(|e| GfxError::BackBuffer(format!("GetBuffer(0) failed: {e}")))?;
            let mut view: Option<ID3D11RenderTargetView> = None;
            device
                .CreateRenderTargetView(&back_buffer, None, Some(&mut view))
                .map_err(|e| {
                    GfxError::BackBuffer(format!("CreateRenderTargetView failed: {e}"))
                })?;
            view.ok_or_else(|| GfxError::BackBuffer("no render-target view returned".into()))
        }
    }

    fn resize_buffers(
        &mut self,
        context: &ID3D11DeviceContext,
        swap_chain: &IDXGISwapChain1,
    ) -> GfxResult<()> {
        // SAFETY: the caller released every back-buffer reference; 0/0 keeps
        // the buffer count and format and derives the size from the window.
        unsafe {
            context.ClearState();
            swap_chain
                .ResizeBuffers(0, 0, 0, DXGI_FORMAT_UNKNOWN, DXGI_SWAP_CHAIN_FLAG(0))
                .map_err(|e| GfxError::ResizeBuffers(format!("ResizeBuffers failed: {e}")))
        }
    }

    fn clear(&mut self, context: &ID3D11DeviceContext, view: &ID3D11RenderTargetView, color: [f32; 4]) {
        // SAFETY: view and context belong to the same live device.
        unsafe {
            context.ClearRenderTargetView(view, &color);
        }
    }

    fn present(&mut self, swap_chain: &IDXGISwapChain1) -> GfxResult<()> {
        // SAFETY: present on a live swap chain; the HRESULT is inspected
        // rather than discarded.
        let hr = unsafe { swap_chain.Present(1, DXGI_PRESENT(0)) };
        if hr.is_ok() {
            return Ok(());
        }
        if hr == DXGI_ERROR_DEVICE_REMOVED || hr == DXGI_ERROR_DEVICE_RESET {
            Err(GfxError::DeviceLost(hr.message()))
        } else {
            Err(GfxError::Present(hr.message()))
        }
    }
}

/// Ask the D3D11 and DXGI info queues to break on corruption and errors.
///
/// Debug aid only: every failure is a warning and execution continues.
fn break_on_errors(device: &ID3D11Device) {
    // SAFETY: interface queries on a live device.
    unsafe {
        match device.cast::<ID3D11InfoQueue>() {
            Ok(info) => {
                if let Err(e) = info.SetBreakOnSeverity(D3D11_MESSAGE_SEVERITY_CORRUPTION, true) {
                    warn!("SetBreakOnSeverity(corruption) failed: {e}");
                }
                if let Err(e) = info.SetBreakOnSeverity(D3D11_MESSAGE_SEVERITY_ERROR, true) {
                    warn!("SetBreakOnSeverity(error) failed: {e}");
                }
            }
            Err(e) => warn!("ID3D11InfoQueue unavailable: {e}"),
        }

        match DXGIGetDebugInterface1::<IDXGIInfoQueue>(0) {
            Ok(info) => {
                if let Err(e) = info.SetBreakOnSeverity(
                    DXGI_DEBUG_ALL,
                    DXGI_INFO_QUEUE_MESSAGE_SEVERITY_CORRUPTION,
                    true,
                ) {
                    warn!("DXGI SetBreakOnSeverity(corruption) failed: {e}");
                }
                if let Err(e) = info.SetBreakOnSeverity(
                    DXGI_DEBUG_ALL,
                    DXGI_INFO_QUEUE_MESSAGE_SEVERITY_ERROR,
                    true,
                ) {
                    warn!("DXGI SetBreakOnSeverity(error) failed: {e}");
                }
            }
            Err(e) => warn!("IDXGIInfoQueue unavailable: {e}"),
        }
    }
}
