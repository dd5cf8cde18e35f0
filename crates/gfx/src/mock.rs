//! In-memory backend used by loop and lifecycle tests.
//!
//! Every handle the backend hands out registers itself with a shared
//! [`ResourceTracker`]; dropping a handle records the release. The tracker
//! keeps one chronological ledger of creations and releases, panics on a
//! double release, and refuses to create a second swap chain while one is
//! live, matching the one-swap-chain-per-window rule of the real backend.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::GraphicsApi;
use crate::error::{GfxError, GfxResult};

/// Kind of a tracked mock resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Device,
    Context,
    SwapChain,
    TargetView,
}

/// One entry in the tracker's chronological ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    Created(ResourceKind),
    Released(ResourceKind),
}

#[derive(Default)]
struct TrackerState {
    next_id: u32,
    log: Vec<(u32, ResourceEvent)>,
    presents: u32,
    clears: u32,
    resizes: u32,
}

/// Shared ledger of every mock resource ever created or released.
#[derive(Clone, Default)]
pub struct ResourceTracker {
    state: Rc<RefCell<TrackerState>>,
}

impl ResourceTracker {
    fn acquire(&self, kind: ResourceKind) -> MockResource {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.log.push((id, ResourceEvent::Created(kind)));
        MockResource {
            id,
            kind,
            tracker: self.clone(),
        }
    }

    fn release(&self, id: u32, kind: ResourceKind) {
        let mut state = self.state.borrow_mut();
        assert!(
            !state
                .log
                .iter()
                .any(|&(logged_id, event)| logged_id == id
                    && matches!(event, ResourceEvent::Released(_))),
            "double release of {kind:?} handle {id}"
        );
        state.log.push((id, ResourceEvent::Released(kind)));
    }

    /// Number of created handles not yet released.
    pub fn live(&self) -> usize {
        self.live_of_any() as usize
    }

    fn live_of_any(&self) -> i64 {
        self.state
            .borrow()
            .log
            .iter()
            .map(|&(_, event)| match event {
                ResourceEvent::Created(_) => 1,
                ResourceEvent::Released(_) => -1,
            })
            .sum()
    }

    fn live_of(&self, kind: ResourceKind) -> i64 {
        self.state
            .borrow()
            .log
            .iter()
            .map(|&(_, event)| match event {
                ResourceEvent::Created(k) if k == kind => 1,
                ResourceEvent::Released(k) if k == kind => -1,
                _ => 0,
            })
            .sum()
    }

    /// How many handles of the given kind were created.
    pub fn created_count(&self, kind: ResourceKind) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|&&(_, event)| event == ResourceEvent::Created(kind))
            .count()
    }

    /// How many handles of the given kind were released.
    pub fn released_count(&self, kind: ResourceKind) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|&&(_, event)| event == ResourceEvent::Released(kind))
            .count()
    }

    /// Kinds in chronological release order.
    pub fn release_order(&self) -> Vec<ResourceKind> {
        self.state
            .borrow()
            .log
            .iter()
            .filter_map(|&(_, event)| match event {
                ResourceEvent::Released(kind) => Some(kind),
                ResourceEvent::Created(_) => None,
            })
            .collect()
    }

    /// The full creation/release ledger in chronological order.
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.state.borrow().log.iter().map(|&(_, event)| event).collect()
    }

    /// Total presents attempted (including failed ones).
    pub fn presents(&self) -> u32 {
        self.state.borrow().presents
    }

    /// Total clears issued.
    pub fn clears(&self) -> u32 {
        self.state.borrow().clears
    }

    /// Total buffer resizes attempted.
    pub fn resizes(&self) -> u32 {
        self.state.borrow().resizes
    }
}

/// An owned mock handle; dropping it records the release.
pub struct MockResource {
    id: u32,
    kind: ResourceKind,
    tracker: ResourceTracker,
}

impl Drop for MockResource {
    fn drop(&mut self) {
        self.tracker.release(self.id, self.kind);
    }
}

/// Mock graphics backend.
///
/// Failure injection is by public field: `fail_resize` makes every buffer
/// resize fail, `fail_present` makes every present fail (non-fatally), and
/// `lose_device_at_present` reports device loss on the n-th present attempt
/// (counted from 1, across clones).
#[derive(Clone, Default)]
pub struct MockGraphics {
    tracker: ResourceTracker,
    pub fail_resize: bool,
    pub fail_present: bool,
    pub lose_device_at_present: Option<u32>,
}

impl MockGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle onto the shared ledger, kept valid after the backend itself
    /// moves into the display manager.
    pub fn tracker(&self) -> ResourceTracker {
        self.tracker.clone()
    }
}

impl GraphicsApi for MockGraphics {
    type Device = MockResource;
    type Context = MockResource;
    type SwapChain = MockResource;
    type TargetView = MockResource;

    fn create_device(&mut self) -> GfxResult<(MockResource, MockResource)> {
        let device = self.tracker.acquire(ResourceKind::Device);
        let context = self.tracker.acquire(ResourceKind::Context);
        Ok((device, context))
    }

    fn create_swap_chain(&mut self, _device: &MockResource) -> GfxResult<MockResource> {
        // The window hosts at most one swap chain; the previous one must be
        // released before a replacement is created.
        assert_eq!(
            self.tracker.live_of(ResourceKind::SwapChain),
            0,
            "at most one swap chain may be live per window"
        );
        Ok(self.tracker.acquire(ResourceKind::SwapChain))
    }

    fn back_buffer_view(
        &mut self,
        _swap_chain: &MockResource,
        _device: &MockResource,
    ) -> GfxResult<MockResource> {
        Ok(self.tracker.acquire(ResourceKind::TargetView))
    }

    fn resize_buffers(
        &mut self,
        _context: &MockResource,
        _swap_chain: &MockResource,
    ) -> GfxResult<()> {
        self.tracker.state.borrow_mut().resizes += 1;
        if self.fail_resize {
            Err(GfxError::ResizeBuffers("injected resize failure".into()))
        } else {
            Ok(())
        }
    }

    fn clear(&mut self, _context: &MockResource, _view: &MockResource, _color: [f32; 4]) {
        self.tracker.state.borrow_mut().clears += 1;
    }

    fn present(&mut self, _swap_chain: &MockResource) -> GfxResult<()> {
        let presents = {
            let mut state = self.tracker.state.borrow_mut();
            state.presents += 1;
            state.presents
        };
        if self.lose_device_at_present == Some(presents) {
            Err(GfxError::DeviceLost("injected device loss".into()))
        } else if self.fail_present {
            Err(GfxError::Present("injected present failure".into()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_records_creation_and_release() {
        let api = MockGraphics::new();
        let tracker = api.tracker();

        let handle = api.tracker.acquire(ResourceKind::Device);
        assert_eq!(tracker.live(), 1);
        drop(handle);
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.release_order(), vec![ResourceKind::Device]);
        assert_eq!(
            tracker.events(),
            vec![
                ResourceEvent::Created(ResourceKind::Device),
                ResourceEvent::Released(ResourceKind::Device),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "double release")]
    fn test_tracker_panics_on_double_release() {
        let api = MockGraphics::new();
        let handle = api.tracker.acquire(ResourceKind::TargetView);
        api.tracker.release(handle.id, handle.kind);
        drop(handle); // second release of the same id
    }

    #[test]
    #[should_panic(expected = "one swap chain")]
    fn test_second_live_swap_chain_is_rejected() {
        let mut api = MockGraphics::new();
        let (device, _context) = api.create_device().unwrap();
        let _first = api.create_swap_chain(&device).unwrap();
        let _second = api.create_swap_chain(&device).unwrap();
    }

    #[test]
    fn test_swap_chain_can_be_recreated_after_release() {
        let mut api = MockGraphics::new();
        let (device, _context) = api.create_device().unwrap();
        let first = api.create_swap_chain(&device).unwrap();
        drop(first);
        let _second = api.create_swap_chain(&device).unwrap();
        assert_eq!(api.tracker().created_count(ResourceKind::SwapChain), 2);
    }
}
