//! Pull-to-refresh state machine.
//!
//! The machine is synchronous and owns nothing but numbers: callers feed it
//! touch coordinates and the container's scroll offset, and it tells them
//! whether to suppress the default scroll and when a refresh is due.

use crate::config::PullConfig;

/// Visible displacement per pixel of finger travel.
pub const DRAG_DAMPING: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pulling,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveTouch {
    start_y: f32,
    current_y: f32,
}

/// Proof that a refresh was started; hand it back to [`PullState::finish_refresh`].
#[derive(Debug)]
#[must_use = "a started refresh must be finished to unlock the gesture"]
pub struct RefreshTicket {
    _private: (),
}

/// What a touch-end did to the gesture.
#[derive(Debug)]
pub enum Release {
    /// No gesture was active.
    Ignored,
    /// The pull was below the threshold; state is back to idle.
    Cancelled,
    /// The pull was armed; the caller must run the refresh action.
    Refresh(RefreshTicket),
}

#[derive(Debug, Clone)]
pub struct PullState {
    config: PullConfig,
    pull_distance: f32,
    is_refreshing: bool,
    can_refresh: bool,
    touch: Option<ActiveTouch>,
}

impl PullState {
    pub fn new(config: PullConfig) -> Self {
        Self {
            config,
            pull_distance: 0.0,
            is_refreshing: false,
            can_refresh: false,
            touch: None,
        }
    }

    pub fn config(&self) -> PullConfig {
        self.config
    }

    pub fn pull_distance(&self) -> f32 {
        self.pull_distance
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    pub fn can_refresh(&self) -> bool {
        self.can_refresh
    }

    /// Raw `(start_y, current_y)` of the active gesture.
    pub fn touch_coordinates(&self) -> Option<(f32, f32)> {
        self.touch.map(|t| (t.start_y, t.current_y))
    }

    pub fn phase(&self) -> Phase {
        if self.is_refreshing {
            Phase::Refreshing
        } else if self.touch.is_some() {
            Phase::Pulling
        } else {
            Phase::Idle
        }
    }

    /// Begin a gesture. Only accepted at scroll top and while no refresh runs.
    pub fn touch_start(&mut self, y: f32, scroll_top: f32) -> bool {
        if scroll_top != 0.0 || self.is_refreshing {
            return false;
        }

        self.touch = Some(ActiveTouch {
            start_y: y,
            current_y: y,
        });
        tracing::trace!(start_y = y, "pull gesture started");
        true
    }

    /// Track a finger movement.
    ///
    /// Returns `true` when the move was consumed as a pull, meaning the
    /// container's own scroll or bounce must be suppressed.
    pub fn touch_move(&mut self, y: f32, scroll_top: f32) -> bool {
        if self.is_refreshing || scroll_top != 0.0 {
            return false;
        }
        let Some(touch) = self.touch.as_mut() else {
            return false;
        };

        touch.current_y = y;
        let delta = touch.current_y - touch.start_y;
        if delta <= 0.0 {
            return false;
        }

        self.pull_distance = damped_distance(delta, self.config.max_pull);
        self.can_refresh = self.pull_distance >= self.config.threshold;
        true
    }

    /// End the gesture.
    ///
    /// The active touch is always cleared here, so a second touch-end
    /// without a new touch-start is ignored.
    pub fn touch_end(&mut self) -> Release {
        if self.touch.take().is_none() {
            return Release::Ignored;
        }

        if self.can_refresh && !self.is_refreshing {
            self.is_refreshing = true;
            tracing::debug!(pull_distance = self.pull_distance, "pull released past threshold");
            return Release::Refresh(RefreshTicket { _private: () });
        }

        self.reset();
        Release::Cancelled
    }

    /// Close a refresh started by [`PullState::touch_end`], whatever its outcome.
    pub fn finish_refresh(&mut self, ticket: RefreshTicket) {
        let RefreshTicket { .. } = ticket;
        self.is_refreshing = false;
        self.reset();
    }

    /// Drop the current gesture without refreshing.
    pub fn cancel(&mut self) {
        self.touch = None;
        if !self.is_refreshing {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.pull_distance = 0.0;
        self.can_refresh = false;
    }
}

impl Default for PullState {
    fn default() -> Self {
        Self::new(PullConfig::default())
    }
}

/// `min(delta * 0.5, max_pull)` for positive deltas, `0` otherwise.
pub fn damped_distance(delta: f32, max_pull: f32) -> f32 {
    (delta.max(0.0) * DRAG_DAMPING).min(max_pull)
}
