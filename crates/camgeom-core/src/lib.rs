//! Core batched camera-geometry kernels for metric-depth pipelines.
//!
//! This crate contains:
//! - linear algebra aliases and intrinsics-matrix helpers ([`math`]),
//! - spherical/angular/Euclidean coordinate transforms ([`spherical`]),
//! - the generalized unified camera model ([`camera`]),
//! - per-pixel ray-field generation ([`rays`]).
//!
//! All kernels operate on batched `f32` arrays with the batch dimension on
//! axis 0. Degenerate numeric cases (model singularities, behind-camera
//! points) are reported through validity masks rather than errors; shape
//! contract violations fail fast with a descriptive error.

/// Generalized unified camera model (pinhole as the `alpha = 0` case).
pub mod camera;
/// Linear algebra aliases and intrinsics helpers.
pub mod math;
/// Per-pixel ray fields and their angular encoding.
pub mod rays;
/// Spherical/angular/Euclidean coordinate transforms.
pub mod spherical;

pub use camera::*;
pub use math::*;
pub use rays::*;
pub use spherical::*;
