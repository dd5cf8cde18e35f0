//! Win32 window subsystem.
//!
//! Owns window class registration, window creation, DPI awareness, and the
//! non-blocking message pump. The window procedure translates raw Win32
//! messages into [`WindowEvent`]s and parks them in a queue owned by the
//! window; [`EventSource::pump`] drains that queue once per frame, after
//! dispatching all pending messages.

use std::cell::RefCell;
use std::collections::VecDeque;

use tracing::{debug, info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetWindowLongPtrW, LoadCursorW, PeekMessageW, RegisterClassExW,
    SetWindowLongPtrW, ShowWindow, TranslateMessage, UnregisterClassW, CS_HREDRAW, CS_VREDRAW,
    CW_USEDEFAULT, GWLP_USERDATA, IDC_ARROW, MSG, PM_REMOVE, SW_SHOW, WINDOW_EX_STYLE,
    WM_CLOSE, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP,
    WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SIZE, WNDCLASSEXW,
    WS_OVERLAPPEDWINDOW,
};

use frameloop_core::{Error, Result};

use crate::event::{EventSource, MouseButton, WindowEvent};

const CLASS_NAME: PCWSTR = w!("FrameloopWindowClass");

/// Queue filled by the window procedure during message dispatch.
///
/// The window procedure runs synchronously on the loop thread, so a
/// `RefCell` is enough; the borrow is never held across dispatch.
#[derive(Default)]
struct EventQueue {
    events: RefCell<VecDeque<WindowEvent>>,
}

impl EventQueue {
    fn push(&self, event: WindowEvent) {
        self.events.borrow_mut().push_back(event);
    }

    fn pop(&self) -> Option<WindowEvent> {
        self.events.borrow_mut().pop_front()
    }
}

/// A native Win32 window.
///
/// Creating one registers the window class; dropping it destroys the window
/// and unregisters the class. The harness opens exactly one.
pub struct Win32Window {
    hwnd: HWND,
    // Boxed so the address handed to GWLP_USERDATA stays stable.
    queue: Box<EventQueue>,
}

impl Win32Window {
    /// Create and show an overlapped window with the given client size.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        // SAFETY: plain Win32 calls; the wndproc only dereferences the
        // user-data pointer after it is installed below.
        unsafe {
            if let Err(e) =
                SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2)
            {
                warn!("Failed to opt into per-monitor DPI awareness: {e:?}");
            }

            let instance = GetModuleHandleW(None)
                .map_err(|e| Error::Window(format!("GetModuleHandleW failed: {e}")))?;

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(wndproc),
                hInstance: instance.into(),
                hCursor: LoadCursorW(None, IDC_ARROW)
                    .map_err(|e| Error::Window(format!("LoadCursorW failed: {e}")))?,
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            if RegisterClassExW(&wc) == 0 {
                return Err(Error::Window("failed to register window class".into()));
            }

            // Grow the outer rect so the client area matches the requested size.
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: width as i32,
                bottom: height as i32,
            };
            if let Err(e) = AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false) {
                warn!("AdjustWindowRect failed: {e}");
            }

            let title_w: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                CLASS_NAME,
                PCWSTR(title_w.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                rect.right - rect.left,
                rect.bottom - rect.top,
                None,
                None,
                Some(instance.into()),
                None,
            )
            .map_err(|e| Error::Window(format!("CreateWindowExW failed: {e}")))?;

            let queue = Box::new(EventQueue::default());
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, &*queue as *const EventQueue as isize);

            let _ = ShowWindow(hwnd, SW_SHOW);
            info!("Window created: {}x{}", width, height);

            Ok(Self { hwnd, queue })
        }
    }

    /// The native window handle, for swap chain creation.
    #[inline]
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl EventSource for Win32Window {
    fn pump(&mut self, sink: &mut dyn FnMut(WindowEvent)) -> Result<()> {
        // Drain every pending message without blocking; dispatch runs the
        // window procedure, which fills the queue.
        // SAFETY: standard message pump on the thread that created the window.
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        while let Some(event) = self.queue.pop() {
            sink(event);
        }
        Ok(())
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        // SAFETY: hwnd is still valid; the user-data pointer is cleared
        // before the queue it points at goes away.
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            if let Err(e) = DestroyWindow(self.hwnd) {
                warn!("DestroyWindow failed: {e}");
            }
            match GetModuleHandleW(None) {
                Ok(instance) => {
                    if let Err(e) = UnregisterClassW(CLASS_NAME, Some(instance.into())) {
                        warn!("UnregisterClassW failed: {e}");
                    }
                }
                Err(e) => warn!("GetModuleHandleW failed during teardown: {e}"),
            }
        }
        debug!("Window destroyed and class unregistered");
    }
}

fn signed_loword(value: isize) -> i32 {
    (value & 0xffff) as u16 as i16 as i32
}

fn signed_hiword(value: isize) -> i32 {
    ((value >> 16) & 0xffff) as u16 as i16 as i32
}

/// Translates raw messages into [`WindowEvent`]s.
///
/// Messages arriving before the user-data pointer is installed (during
/// `CreateWindowExW`) fall through to the default procedure.
unsafe extern "system" fn wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let queue = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const EventQueue;
    if queue.is_null() {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    let queue = &*queue;

    match msg {
        WM_CLOSE => {
            queue.push(WindowEvent::CloseRequested);
            LRESULT(0)
        }
        WM_SIZE => {
            queue.push(WindowEvent::Resized {
                width: (lparam.0 & 0xffff) as u32,
                height: ((lparam.0 >> 16) & 0xffff) as u32,
            });
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            queue.push(WindowEvent::MouseMoved {
                x: signed_loword(lparam.0),
                y: signed_hiword(lparam.0),
            });
            LRESULT(0)
        }
        WM_MOUSEWHEEL => {
            queue.push(WindowEvent::MouseWheel {
                delta: signed_hiword(wparam.0 as isize),
            });
            LRESULT(0)
        }
        WM_LBUTTONDOWN | WM_LBUTTONUP => {
            queue.push(WindowEvent::MouseButton {
                button: MouseButton::Left,
                pressed: msg == WM_LBUTTONDOWN,
            });
            LRESULT(0)
        }
        WM_MBUTTONDOWN | WM_MBUTTONUP => {
            queue.push(WindowEvent::MouseButton {
                button: MouseButton::Middle,
                pressed: msg == WM_MBUTTONDOWN,
            });
            LRESULT(0)
        }
        WM_RBUTTONDOWN | WM_RBUTTONUP => {
            queue.push(WindowEvent::MouseButton {
                button: MouseButton::Right,
                pressed: msg == WM_RBUTTONDOWN,
            });
            LRESULT(0)
        }
        WM_KEYDOWN | WM_KEYUP => {
            queue.push(WindowEvent::Key {
                code: wparam.0 as u32,
                pressed: msg == WM_KEYDOWN,
            });
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
