use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use thiserror::Error;

use super::indicator::IndicatorStyle;
use super::state::{Phase, PullState, RefreshTicket, Release};
use crate::config::PullConfig;

/// The asynchronous work a completed pull triggers.
pub trait RefreshAction: Send + Sync {
    fn refresh(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Adapter that turns an async closure into a [`RefreshAction`].
pub struct RefreshFn<F>(pub F);

impl<F, Fut> RefreshAction for RefreshFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    fn refresh(&self) -> impl Future<Output = Result<()>> + Send {
        (self.0)()
    }
}

#[derive(Debug, Clone, Error)]
#[error("Refresh failed: {0}")]
pub struct RefreshError(pub String);

/// Result of a touch-end as seen by the surrounding UI.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// There was no gesture to end.
    Ignored,
    /// Released below the threshold.
    NotArmed,
    Refreshed,
    Failed(RefreshError),
}

/// Point-in-time view of the recogniser for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullSnapshot {
    pub phase: Phase,
    pub pull_distance: f32,
    pub can_refresh: bool,
    pub is_refreshing: bool,
    pub indicator: IndicatorStyle,
}

/// Pull-to-refresh controller: a [`PullState`] plus the action it triggers.
///
/// Clones share one state, so a touch-start arriving while another clone is
/// awaiting the refresh sees `is_refreshing` and is rejected.
pub struct PullToRefresh<R> {
    state: Arc<Mutex<PullState>>,
    action: Arc<R>,
}

impl<R> Clone for PullToRefresh<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            action: Arc::clone(&self.action),
        }
    }
}

impl<R: RefreshAction> PullToRefresh<R> {
    pub fn new(config: PullConfig, action: R) -> Self {
        Self {
            state: Arc::new(Mutex::new(PullState::new(config))),
            action: Arc::new(action),
        }
    }

    fn state(&self) -> MutexGuard<'_, PullState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PullSnapshot {
        let state = self.state();
        PullSnapshot {
            phase: state.phase(),
            pull_distance: state.pull_distance(),
            can_refresh: state.can_refresh(),
            is_refreshing: state.is_refreshing(),
            indicator: IndicatorStyle::new(
                state.pull_distance(),
                state.config().threshold,
                state.is_refreshing(),
            ),
        }
    }

    pub fn touch_start(&self, y: f32, scroll_top: f32) -> bool {
        self.state().touch_start(y, scroll_top)
    }

    /// Returns `true` when the container's default scrolling must be suppressed.
    pub fn touch_move(&self, y: f32, scroll_top: f32) -> bool {
        self.state().touch_move(y, scroll_top)
    }

    pub fn cancel(&self) {
        self.state().cancel();
    }

    /// Finish the gesture, running the refresh action if the pull was armed.
    ///
    /// Refresh failures are logged and reported in the outcome; the pull
    /// state is reset either way.
    pub async fn touch_end(&self) -> RefreshOutcome {
        match self.release() {
            Release::Ignored => RefreshOutcome::Ignored,
            Release::Cancelled => RefreshOutcome::NotArmed,
            Release::Refresh(ticket) => self.run_refresh(ticket).await,
        }
    }

    /// Synchronous half of a touch-end: clears the touch and either resets
    /// the pull or marks the recogniser as refreshing.
    pub(super) fn release(&self) -> Release {
        self.state().touch_end()
    }

    /// Drop an armed refresh without running it.
    pub(super) fn abandon(&self, ticket: RefreshTicket) {
        self.state().finish_refresh(ticket);
    }

    pub(super) async fn run_refresh(&self, ticket: RefreshTicket) -> RefreshOutcome {
        tracing::debug!("Refreshing");
        let result = self.action.refresh().await;
        self.state().finish_refresh(ticket);

        match result {
            Ok(()) => {
                tracing::info!("Refresh completed");
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                tracing::error!("Refresh failed: {:#}", e);
                RefreshOutcome::Failed(RefreshError(format!("{:#}", e)))
            }
        }
    }
}
