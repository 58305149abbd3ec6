//! Edge processing utilities: Sobel gradients and directional derivatives.
//!
//! Borders are handled by clamping indices (replicate). The tracers use the
//! derivative along the content bounds' direction; the snake refiner uses the
//! derivative along the page's "down" vector.

pub mod grad;

pub use grad::{directional_derivative, normalize_symmetric, sobel_gradients, Grad};
