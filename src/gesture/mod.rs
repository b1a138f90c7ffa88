//! Pull-to-refresh gesture recogniser.
//!
//! - [`state`]: the synchronous state machine (`Idle → Pulling → Refreshing → Idle`)
//! - [`indicator`]: opacity, rotation and content offset derived from the pull
//! - [`controller`]: couples the state machine to an async refresh action
//! - [`binding`]: scoped registration on a scroll container

pub mod binding;
pub mod controller;
pub mod indicator;
pub mod state;

pub use binding::{Dispatch, ListenerGuard, ScrollContainer, TouchEvent, TouchListener, TouchPoint};
pub use controller::{PullSnapshot, PullToRefresh, RefreshAction, RefreshError, RefreshFn, RefreshOutcome};
pub use indicator::{IndicatorStyle, indicator_opacity, indicator_rotation};
pub use state::{DRAG_DAMPING, Phase, PullState, RefreshTicket, Release, damped_distance};
