//! End-to-end loop tests driven by scripted events and the mock backend.

use frameloop_gfx::mock::{MockGraphics, ResourceEvent, ResourceKind};
use frameloop_platform::{MouseButton, ScriptedEvents, WindowEvent};

fn close() -> WindowEvent {
    WindowEvent::CloseRequested
}

#[test]
fn test_close_on_third_iteration_stops_before_present() {
    let mut events = ScriptedEvents::new(vec![vec![], vec![], vec![close()]]);
    let api = MockGraphics::new();
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

    // Iterations 1 and 2 present; iteration 3 observes the close during its
    // message drain and exits before rendering.
    assert_eq!(tracker.presents(), 2);
    assert_eq!(tracker.clears(), 2);
    assert_eq!(tracker.live(), 0, "every handle released on shutdown");
}

#[test]
fn test_shutdown_releases_in_reverse_creation_order() {
    let mut events = ScriptedEvents::new(vec![vec![]]);
    let api = MockGraphics::new();
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

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
fn test_resize_event_swaps_exactly_one_view() {
    let mut events = ScriptedEvents::new(vec![
        vec![WindowEvent::Resized {
            width: 800,
            height: 600,
        }],
        vec![],
        vec![close()],
    ]);
    let api = MockGraphics::new();
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

    assert_eq!(tracker.resizes(), 1);
    assert_eq!(tracker.created_count(ResourceKind::TargetView), 2);
    assert_eq!(tracker.released_count(ResourceKind::TargetView), 2);
    assert_eq!(tracker.created_count(ResourceKind::Device), 1);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_device_loss_rebuilds_the_device_context_set() {
    let mut events = ScriptedEvents::new(vec![vec![], vec![], vec![close()]]);
    let mut api = MockGraphics::new();
    api.lose_device_at_present = Some(1);
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

    // The first present reports device loss; the loop rebuilds and the
    // second frame presents on the new set.
    assert_eq!(tracker.created_count(ResourceKind::Device), 2);
    assert_eq!(tracker.presents(), 2);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_device_loss_releases_old_set_before_creating_new() {
    let mut events = ScriptedEvents::new(vec![vec![], vec![], vec![close()]]);
    let mut api = MockGraphics::new();
    api.lose_device_at_present = Some(1);
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

    // The window hosts at most one swap chain, so every handle of the lost
    // set must be released before the rebuild creates its first resource.
    let log = tracker.events();
    let rebuild_start = log
        .iter()
        .position(|&e| e == ResourceEvent::Released(ResourceKind::Device))
        .expect("old device released")
        + 1;
    let released_before = log[..rebuild_start]
        .iter()
        .filter(|e| matches!(e, ResourceEvent::Released(_)))
        .count();
    let created_before = log[..rebuild_start]
        .iter()
        .filter(|e| matches!(e, ResourceEvent::Created(_)))
        .count();
    assert_eq!(released_before, 4, "whole lost set released");
    assert_eq!(created_before, 4, "no replacement created before that");
}

#[test]
fn test_failed_resize_does_not_stop_the_loop() {
    let mut events = ScriptedEvents::new(vec![
        vec![WindowEvent::Resized {
            width: 640,
            height: 480,
        }],
        vec![close()],
    ]);
    let mut api = MockGraphics::new();
    api.fail_resize = true;
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

    assert_eq!(tracker.presents(), 1, "frame after the failed resize still presents");
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_input_events_do_not_disturb_the_loop() {
    let mut events = ScriptedEvents::new(vec![
        vec![
            WindowEvent::Key {
                code: 0x54,
                pressed: true,
            },
            WindowEvent::MouseMoved { x: 5, y: 6 },
            WindowEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            },
            WindowEvent::MouseWheel { delta: 120 },
        ],
        vec![close()],
    ]);
    let api = MockGraphics::new();
    let tracker = api.tracker();

    frameloop::run(&mut events, api).unwrap();

    assert_eq!(tracker.presents(), 1);
    assert_eq!(tracker.live(), 0);
}
