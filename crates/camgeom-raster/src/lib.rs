//! Image-space operators over batched depth and mask arrays.
//!
//! This crate contains:
//! - scatter-accumulate point-cloud rasterization ([`raster`]),
//! - resolution-changing utilities ([`resample`]),
//! - binary morphology and mask overlap scoring ([`morph`]).
//!
//! The depth-map convention throughout is `(B, 1, H, W)` with the value `0`
//! reserved as the missing-measurement sentinel.

/// Binary morphology and mask overlap scoring.
pub mod morph;
/// Point-cloud to depth-buffer rasterization.
pub mod raster;
/// Resolution-changing utilities.
pub mod resample;

pub use morph::*;
pub use raster::*;
pub use resample::*;
