//! Touch listener registration scoped to the lifetime of a guard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::controller::{PullToRefresh, RefreshAction};
use super::state::Release;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    Start { touches: Vec<TouchPoint> },
    Move { touches: Vec<TouchPoint> },
    End,
}

impl TouchEvent {
    /// Only the first touch point takes part in a gesture.
    pub fn primary_y(&self) -> Option<f32> {
        match self {
            TouchEvent::Start { touches } | TouchEvent::Move { touches } => {
                touches.first().map(|t| t.y)
            }
            TouchEvent::End => None,
        }
    }
}

pub trait TouchListener: Send + Sync {
    /// Handle one event. Returning `true` suppresses the container's default behaviour.
    fn on_touch(&self, event: &TouchEvent, scroll_top: f32) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of dispatching one event to every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub default_prevented: bool,
}

struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ListenerId, Arc<dyn TouchListener>)>>,
}

/// A scrollable container that fans touch events out to its listeners.
#[derive(Clone)]
pub struct ScrollContainer {
    scroll_top: Arc<Mutex<f32>>,
    listeners: Arc<Listeners>,
}

impl ScrollContainer {
    pub fn new() -> Self {
        Self {
            scroll_top: Arc::new(Mutex::new(0.0)),
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(ListenerId, Arc<dyn TouchListener>)>> {
        self.listeners
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn scroll_top(&self) -> f32 {
        *self.scroll_top.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_scroll_top(&self, offset: f32) {
        *self.scroll_top.lock().unwrap_or_else(PoisonError::into_inner) = offset.max(0.0);
    }

    pub fn listener_count(&self) -> usize {
        self.entries().len()
    }

    /// Register a listener until the returned guard is dropped.
    #[must_use = "dropping the guard unregisters the listener immediately"]
    pub fn subscribe(&self, listener: Arc<dyn TouchListener>) -> ListenerGuard {
        let id = ListenerId(self.listeners.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().push((id, listener));
        tracing::trace!(?id, "touch listener registered");
        ListenerGuard {
            container: self.clone(),
            id,
        }
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.entries().retain(|(entry_id, _)| *entry_id != id);
        tracing::trace!(?id, "touch listener removed");
    }

    pub fn dispatch(&self, event: &TouchEvent) -> Dispatch {
        let scroll_top = self.scroll_top();
        // Listeners run without the registry lock so they may subscribe or drop guards.
        let listeners: Vec<_> = self.entries().iter().map(|(_, l)| Arc::clone(l)).collect();

        let mut default_prevented = false;
        for listener in listeners {
            default_prevented |= listener.on_touch(event, scroll_top);
        }
        Dispatch { default_prevented }
    }
}

impl Default for ScrollContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a listener registered; unregisters it on drop, whatever the exit path.
pub struct ListenerGuard {
    container: ScrollContainer,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.container.unsubscribe(self.id);
    }
}

impl<R: RefreshAction + 'static> TouchListener for PullToRefresh<R> {
    fn on_touch(&self, event: &TouchEvent, scroll_top: f32) -> bool {
        match event {
            TouchEvent::Start { .. } => {
                if let Some(y) = event.primary_y() {
                    self.touch_start(y, scroll_top);
                }
                false
            }
            TouchEvent::Move { .. } => event
                .primary_y()
                .is_some_and(|y| self.touch_move(y, scroll_top)),
            TouchEvent::End => {
                // The reset or the switch to refreshing lands before the next
                // event is dispatched; only the refresh itself runs later.
                let Release::Refresh(ticket) = self.release() else {
                    return false;
                };
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        let this = self.clone();
                        handle.spawn(async move {
                            this.run_refresh(ticket).await;
                        });
                    }
                    Err(_) => {
                        tracing::warn!("No async runtime available, releasing pull without refresh");
                        self.abandon(ticket);
                    }
                }
                false
            }
        }
    }
}

impl<R: RefreshAction + 'static> PullToRefresh<R> {
    /// Attach this controller to a container for as long as the guard lives.
    pub fn mount(&self, container: &ScrollContainer) -> ListenerGuard {
        container.subscribe(Arc::new(self.clone()))
    }
}
