//! Generalized unified camera model.
//!
//! A single two-parameter family covers ideal pinhole cameras and
//! wide-FOV/fisheye-like projections: `alpha` blends between perspective and
//! sphere-based projection, `beta` stretches the projection surface. The
//! pinhole camera is the `alpha = 0, beta = 1` specialization, so there is
//! one parameterized code path rather than a model hierarchy.
//!
//! Both directions report validity per element: unprojection marks pixels
//! outside the re-projectable cone of the distortion model, projection marks
//! points that land outside the image or sit behind the camera. Degenerate
//! denominators are clamped so every output stays finite; consumers are
//! expected to honor the masks.

use ndarray::{Array2, Array3, Array4, ArrayView3, ArrayView4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Mat3;

/// Smallest admissible forward depth; outputs are clamped here and anything
/// at or below it is masked invalid.
const Z_FLOOR: f32 = 1e-3;
/// Floor for the distortion square root, keeps the argument positive.
const SQRT_FLOOR: f32 = 1e-5;
/// Epsilon inside the normalization denominator.
const NORM_EPS: f32 = 1e-5;
/// Stand-in bound when the model accepts the whole plane (`alpha < 0.5`).
const UNBOUNDED_R2: f32 = 1e6;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("pixel array must be (batch, n, 2), got {0:?}")]
    BadPixelShape(Vec<usize>),
    #[error("point array must be (batch, n, 3), got {0:?}")]
    BadPointShape(Vec<usize>),
    #[error("depth array must be (batch, 1, height, width), got {0:?}")]
    BadDepthShape(Vec<usize>),
    #[error("intrinsics array must be (batch, 3, 3), got {0:?}")]
    BadIntrinsicsShape(Vec<usize>),
    #[error("got {params} parameter sets for batch size {batch}")]
    ParamCountMismatch { params: usize, batch: usize },
    #[error("batch size mismatch: {left} vs {right}")]
    BatchMismatch { left: usize, right: usize },
}

/// Per-sample parameters of the generalized unified camera model.
///
/// `fx`, `fy`, `cx`, `cy` are the usual pixel-space intrinsics and must
/// satisfy `fx, fy > 0`. `alpha ∈ [0, 1)` and `beta > 0` shape the
/// distortion; see [`UnifiedParams::pinhole`] for the undistorted case.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnifiedParams {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub alpha: f32,
    pub beta: f32,
}

impl UnifiedParams {
    /// Ideal pinhole parameters (`alpha = 0, beta = 1`).
    pub fn pinhole(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            alpha: 0.0,
            beta: 1.0,
        }
    }

    /// Pinhole parameters read off an intrinsics matrix.
    pub fn from_k(k: &Mat3) -> Self {
        Self::pinhole(k[(0, 0)], k[(1, 1)], k[(0, 2)], k[(1, 2)])
    }

    /// The 3×3 intrinsics matrix K (distortion parameters do not appear).
    pub fn k_matrix(&self) -> Mat3 {
        Mat3::new(
            self.fx, 0.0, self.cx, 0.0, self.fy, self.cy, 0.0, 0.0, 1.0,
        )
    }
}

/// Unproject pixel coordinates to unit ray directions.
///
/// `pixels` is `(B, N, 2)` and `params` holds one parameter set per batch
/// element. Returns `(B, N, 3)` unit directions and a `(B, N)` validity
/// mask. A pixel is invalid when its normalized radius falls outside the
/// re-projectable cone of the distortion model, or when the resulting ray
/// points sideways or backwards (`z ≤ 1e-3`); the output `z` is clamped to
/// that floor so downstream division stays finite.
pub fn unproject(
    pixels: ArrayView3<'_, f32>,
    params: &[UnifiedParams],
) -> Result<(Array3<f32>, Array2<bool>), CameraError> {
    let (b, n, c) = pixels.dim();
    if c != 2 {
        return Err(CameraError::BadPixelShape(pixels.shape().to_vec()));
    }
    if params.len() != b {
        return Err(CameraError::ParamCountMismatch {
            params: params.len(),
            batch: b,
        });
    }

    let mut dirs = Array3::zeros((b, n, 3));
    let mut valid = Array2::from_elem((b, n), false);
    for (bi, p) in params.iter().enumerate() {
        let r2_bound = if p.alpha < 0.5 {
            UNBOUNDED_R2
        } else {
            1.0 / (p.beta * (2.0 * p.alpha - 1.0))
        };
        for i in 0..n {
            let mx = (pixels[[bi, i, 0]] - p.cx) / p.fx;
            let my = (pixels[[bi, i, 1]] - p.cy) / p.fy;
            let r2 = mx * mx + my * my;

            let sqrt_val = (1.0 - (2.0 * p.alpha - 1.0) * p.beta * r2).max(SQRT_FLOOR);
            let mz = (1.0 - p.beta * p.alpha * p.alpha * r2)
                / (p.alpha * sqrt_val.sqrt() + (1.0 - p.alpha));
            let coeff = 1.0 / (mx * mx + my * my + mz * mz + NORM_EPS).sqrt();

            let z = coeff * mz;
            dirs[[bi, i, 0]] = coeff * mx;
            dirs[[bi, i, 1]] = coeff * my;
            dirs[[bi, i, 2]] = z.max(Z_FLOOR);
            valid[[bi, i]] = r2 < r2_bound && z > Z_FLOOR;
        }
    }
    Ok((dirs, valid))
}

/// Project 3D points to pixel coordinates.
///
/// `points` is `(B, N, 3)`; `image_shape` is `(height, width)`. Returns
/// `(B, N, 2)` pixel coordinates and a `(B, N)` mask that is false for
/// points projecting outside `[0, W] × [0, H]` or sitting behind the camera.
/// The projective denominator is clipped at `1e-3`, so coordinates are
/// always finite even for grazing points.
pub fn project(
    points: ArrayView3<'_, f32>,
    params: &[UnifiedParams],
    image_shape: (usize, usize),
) -> Result<(Array3<f32>, Array2<bool>), CameraError> {
    let (b, n, c) = points.dim();
    if c != 3 {
        return Err(CameraError::BadPointShape(points.shape().to_vec()));
    }
    if params.len() != b {
        return Err(CameraError::ParamCountMismatch {
            params: params.len(),
            batch: b,
        });
    }

    let (h, w) = image_shape;
    let (hf, wf) = (h as f32, w as f32);
    let mut coords = Array3::zeros((b, n, 2));
    let mut valid = Array2::from_elem((b, n), false);
    for (bi, p) in params.iter().enumerate() {
        for i in 0..n {
            let x = points[[bi, i, 0]];
            let y = points[[bi, i, 1]];
            let z = points[[bi, i, 2]];

            let d = (p.beta * (x * x + y * y) + z * z).sqrt();
            let denom = (p.alpha * d + (1.0 - p.alpha) * z).max(Z_FLOOR);

            let u = p.fx * (x / denom) + p.cx;
            let v = p.fy * (y / denom) + p.cy;
            coords[[bi, i, 0]] = u;
            coords[[bi, i, 1]] = v;
            valid[[bi, i]] = u >= 0.0 && u <= wf && v >= 0.0 && v <= hf && z >= 0.0;
        }
    }
    Ok((coords, valid))
}

/// Unproject a dense depth map to a `(B, 3, H, W)` point grid.
///
/// The pixel grid uses integer coordinates `(u, v, 1)` and is pushed through
/// a fast inverse of the intrinsics in which only the focal terms are
/// reciprocated; the principal-point column is deliberately left untouched.
/// This matches the simplified pinhole assumption used by the dense paths of
/// the pipeline, so the grid is off by `(cx, cy)` in normalized units
/// compared to the exact inverse. Use [`crate::rays::generate_rays`] where
/// the exact inverse matters.
pub fn unproject_points_pinhole(
    depth: ArrayView4<'_, f32>,
    intrinsics: ArrayView3<'_, f32>,
) -> Result<Array4<f32>, CameraError> {
    let (b, c, h, w) = depth.dim();
    if c != 1 {
        return Err(CameraError::BadDepthShape(depth.shape().to_vec()));
    }
    let kdim = intrinsics.dim();
    if kdim.1 != 3 || kdim.2 != 3 {
        return Err(CameraError::BadIntrinsicsShape(intrinsics.shape().to_vec()));
    }
    if kdim.0 != b {
        return Err(CameraError::BatchMismatch {
            left: b,
            right: kdim.0,
        });
    }

    let mut points = Array4::zeros((b, 3, h, w));
    for bi in 0..b {
        // Diagonal-only inverse: reciprocate fx and fy, keep every other
        // entry (including cx, cy) exactly as in K.
        let inv_fx = 1.0 / intrinsics[[bi, 0, 0]];
        let inv_fy = 1.0 / intrinsics[[bi, 1, 1]];
        let k01 = intrinsics[[bi, 0, 1]];
        let k02 = intrinsics[[bi, 0, 2]];
        let k10 = intrinsics[[bi, 1, 0]];
        let k12 = intrinsics[[bi, 1, 2]];
        let k20 = intrinsics[[bi, 2, 0]];
        let k21 = intrinsics[[bi, 2, 1]];
        let k22 = intrinsics[[bi, 2, 2]];

        for yi in 0..h {
            let v = yi as f32;
            for xi in 0..w {
                let u = xi as f32;
                let d = depth[[bi, 0, yi, xi]];
                points[[bi, 0, yi, xi]] = (inv_fx * u + k01 * v + k02) * d;
                points[[bi, 1, yi, xi]] = (k10 * u + inv_fy * v + k12) * d;
                points[[bi, 2, yi, xi]] = (k20 * u + k21 * v + k22) * d;
            }
        }
    }
    Ok(points)
}
