use thiserror::Error;

/// Rejected configuration, reported by [`crate::VirtList::new`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("an item key accessor is required")]
    MissingItemKey,
    #[error("min_size must be finite and positive (got {0})")]
    InvalidMinSize(f64),
    #[error("item_gap must be finite and non-negative (got {0})")]
    InvalidItemGap(f64),
    #[error("scroll_distance must be finite and non-negative (got {0})")]
    InvalidScrollDistance(f64),
    #[error("client_size must be finite and non-negative (got {0})")]
    InvalidClientSize(f64),
    #[error("walk_tolerance must be finite and non-negative (got {0})")]
    InvalidWalkTolerance(f64),
    #[error("max_walk_steps must be at least 1")]
    ZeroWalkSteps,
    #[error("frame_ms must be at least 1")]
    ZeroFrameInterval,
}
