use thiserror::Error;

/// A cooperative abort requested through a [`crate::status::TaskStatus`].
///
/// Distinct from data outcomes: degenerate input or insufficient evidence is
/// reported through a "not found" result, never through this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("detection cancelled")]
pub struct Cancelled;
