//! Integration tests for the pull-to-refresh recogniser.
//!
//! The refresh action here is gated on a `Notify`, so the tests can observe
//! the recogniser while a refresh is still in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lexboard::{
    Phase, PullConfig, PullToRefresh, RefreshAction, RefreshOutcome, ScrollContainer, TouchEvent,
    TouchPoint,
};
use tokio::sync::Notify;

/// Refresh action that blocks until released by the test.
#[derive(Clone, Default)]
struct GatedRefresh {
    calls: Arc<AtomicUsize>,
    gate: Arc<Notify>,
}

impl RefreshAction for GatedRefresh {
    async fn refresh(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(())
    }
}

fn touches(y: f32) -> Vec<TouchPoint> {
    vec![TouchPoint { x: 0.0, y }]
}

async fn wait_for_phase<R: RefreshAction>(ptr: &PullToRefresh<R>, phase: Phase) {
    for _ in 0..100 {
        if ptr.snapshot().phase == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("recogniser never reached {:?}", phase);
}

#[tokio::test]
async fn test_no_new_gesture_while_refreshing() {
    let action = GatedRefresh::default();
    let ptr = PullToRefresh::new(PullConfig::default(), action.clone());

    ptr.touch_start(0.0, 0.0);
    ptr.touch_move(200.0, 0.0);

    let releasing = ptr.clone();
    let handle = tokio::spawn(async move { releasing.touch_end().await });
    wait_for_phase(&ptr, Phase::Refreshing).await;

    // The in-flight refresh keeps its indicator; new touches are refused.
    let during = ptr.snapshot();
    assert!(during.is_refreshing);
    assert_eq!(during.pull_distance, 100.0);
    assert!(during.indicator.spinning);
    assert_eq!(during.indicator.rotation_deg, None);

    assert!(!ptr.touch_start(5.0, 0.0));
    assert!(!ptr.touch_move(300.0, 0.0));
    assert!(matches!(ptr.touch_end().await, RefreshOutcome::Ignored));

    action.gate.notify_one();
    let outcome = handle.await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Refreshed));
    assert_eq!(action.calls.load(Ordering::SeqCst), 1);

    let after = ptr.snapshot();
    assert_eq!(after.phase, Phase::Idle);
    assert_eq!(after.pull_distance, 0.0);
    assert!(!after.can_refresh);
}

#[tokio::test]
async fn test_gesture_after_refresh_is_accepted() {
    let action = GatedRefresh::default();
    let ptr = PullToRefresh::new(PullConfig::default(), action.clone());

    for round in 1..=2 {
        ptr.touch_start(0.0, 0.0);
        ptr.touch_move(180.0, 0.0);
        action.gate.notify_one();
        assert!(matches!(ptr.touch_end().await, RefreshOutcome::Refreshed));
        assert_eq!(action.calls.load(Ordering::SeqCst), round);
    }
}

#[tokio::test]
async fn test_container_drives_refresh() {
    let action = GatedRefresh::default();
    let ptr = PullToRefresh::new(PullConfig::default(), action.clone());
    let container = ScrollContainer::new();
    let guard = ptr.mount(&container);

    container.dispatch(&TouchEvent::Start { touches: touches(50.0) });
    let moved = container.dispatch(&TouchEvent::Move { touches: touches(250.0) });
    assert!(moved.default_prevented);
    assert!(ptr.snapshot().can_refresh);

    container.dispatch(&TouchEvent::End);
    wait_for_phase(&ptr, Phase::Refreshing).await;

    // A second release from the same gesture is a no-op.
    container.dispatch(&TouchEvent::End);

    action.gate.notify_one();
    wait_for_phase(&ptr, Phase::Idle).await;
    assert_eq!(action.calls.load(Ordering::SeqCst), 1);

    drop(guard);
    assert_eq!(container.listener_count(), 0);

    // Unmounted: events no longer reach the recogniser.
    container.dispatch(&TouchEvent::Start { touches: touches(0.0) });
    container.dispatch(&TouchEvent::Move { touches: touches(400.0) });
    assert_eq!(ptr.snapshot().pull_distance, 0.0);
}

#[tokio::test]
async fn test_scrolled_container_is_ordinary_scrolling() {
    let action = GatedRefresh::default();
    let ptr = PullToRefresh::new(PullConfig::default(), action.clone());
    let container = ScrollContainer::new();
    let _guard = ptr.mount(&container);

    container.set_scroll_top(240.0);
    container.dispatch(&TouchEvent::Start { touches: touches(0.0) });
    let moved = container.dispatch(&TouchEvent::Move { touches: touches(300.0) });

    assert!(!moved.default_prevented);
    assert_eq!(ptr.snapshot().phase, Phase::Idle);
    assert_eq!(ptr.snapshot().pull_distance, 0.0);
}

#[tokio::test]
async fn test_events_after_armed_release_do_not_steal_refresh() {
    let action = GatedRefresh::default();
    let ptr = PullToRefresh::new(PullConfig::default(), action.clone());
    let container = ScrollContainer::new();
    let _guard = ptr.mount(&container);

    container.dispatch(&TouchEvent::Start { touches: touches(0.0) });
    container.dispatch(&TouchEvent::Move { touches: touches(400.0) });
    container.dispatch(&TouchEvent::End);
    container.dispatch(&TouchEvent::Start { touches: touches(0.0) });
    container.dispatch(&TouchEvent::Move { touches: touches(100.0) });

    assert_eq!(ptr.snapshot().phase, Phase::Refreshing);

    action.gate.notify_one();
    wait_for_phase(&ptr, Phase::Idle).await;
    assert_eq!(action.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ptr.snapshot().pull_distance, 0.0);
}
