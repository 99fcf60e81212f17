//! High-level entry crate for the `camgeom` workspace.
//!
//! `camgeom` bundles batched camera-geometry kernels for monocular
//! metric-depth pipelines:
//!
//! - [`geom`] — coordinate transforms, the generalized unified camera model
//!   (pinhole as its `alpha = 0, beta = 1` specialization), and per-pixel
//!   ray-field generation;
//! - [`raster`] — point-cloud splatting into mean-depth buffers, flat
//!   feature resampling, sentinel-preserving min-downsampling, and binary
//!   morphology.
//!
//! All kernels are pure functions over batched `f32` arrays (batch on axis
//! 0) returning validity masks wherever a numerically defined result can be
//! physically meaningless.
//!
//! ```no_run
//! use camgeom::geom::{generate_rays, unproject_points_pinhole};
//! use camgeom::raster::rasterize_depth;
//! use ndarray::{Array3, Array4};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut k = Array3::<f32>::zeros((1, 3, 3));
//! k[[0, 0, 0]] = 500.0;
//! k[[0, 1, 1]] = 500.0;
//! k[[0, 0, 2]] = 320.0;
//! k[[0, 1, 2]] = 240.0;
//! k[[0, 2, 2]] = 1.0;
//!
//! let (directions, angles) = generate_rays(k.view(), (480, 640), false)?;
//! assert_eq!(directions.dim(), (1, 480 * 640, 3));
//! assert_eq!(angles.dim(), (1, 480 * 640, 2));
//!
//! let depth = Array4::<f32>::from_elem((1, 1, 480, 640), 2.0);
//! let points = unproject_points_pinhole(depth.view(), k.view())?;
//! assert_eq!(points.dim(), (1, 3, 480, 640));
//! # Ok(())
//! # }
//! ```

pub use camgeom_core as geom;
pub use camgeom_raster as raster;
