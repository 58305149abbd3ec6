//! Page dewarping detector.
//!
//! Overview
//! - Downscales the page to a working DPI and binarizes it (Otsu level,
//!   small-component removal, content rectangle).
//! - Finds the left and right vertical content bounds from the column
//!   envelopes of the ink mask.
//! - Traces candidate text-line / edge curves between the bounds and refines
//!   them with an active-contour (snake) pass.
//! - Maps the bounds and the surviving curves back to input coordinates and
//!   hands them to a [`DistortionModelSink`].
//!
//! Modules
//! - [`params`] – configuration types used by the detector and the demo tool.
//! - `pipeline` – the [`DewarpDetector`] implementation.
//! - `scaling` – input ↔ working resolution mapping.
//! - `sink` – the [`DistortionModelSink`] seam and a collecting sink.

pub mod params;
mod pipeline;
mod scaling;
mod sink;

pub use params::DewarpParams;
pub use pipeline::DewarpDetector;
pub use scaling::WorkingScale;
pub use sink::{DistortionCurves, DistortionModelSink};
