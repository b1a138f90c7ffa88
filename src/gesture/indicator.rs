//! Visual feedback derived from the pull distance.

/// Indicator opacity: `min(pull / threshold, 1)`.
pub fn indicator_opacity(pull_distance: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 1.0;
    }
    (pull_distance / threshold).clamp(0.0, 1.0)
}

/// Indicator rotation in degrees, one full turn per threshold of pull.
///
/// `None` while refreshing; the indicator spins on its own then.
pub fn indicator_rotation(pull_distance: f32, threshold: f32, is_refreshing: bool) -> Option<f32> {
    if is_refreshing || threshold <= 0.0 {
        return None;
    }
    Some(pull_distance / threshold * 360.0)
}

/// Everything a renderer needs to draw the indicator and offset the content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorStyle {
    pub opacity: f32,
    pub rotation_deg: Option<f32>,
    pub spinning: bool,
    /// Downward translation applied to the wrapped content.
    pub content_offset: f32,
}

impl IndicatorStyle {
    pub fn new(pull_distance: f32, threshold: f32, is_refreshing: bool) -> Self {
        Self {
            opacity: indicator_opacity(pull_distance, threshold),
            rotation_deg: indicator_rotation(pull_distance, threshold, is_refreshing),
            spinning: is_refreshing,
            content_offset: pull_distance,
        }
    }
}
