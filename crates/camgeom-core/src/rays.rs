//! Per-pixel ray fields and their angular encoding.

use log::debug;
use nalgebra::Vector3;
use ndarray::{Array3, ArrayView3, Axis};
use rand::Rng;
use thiserror::Error;

use crate::math::{invert_mat3_exact, mat3_from_view};

#[derive(Debug, Error)]
pub enum RayError {
    #[error("intrinsics array must be (batch, 3, 3), got {0:?}")]
    BadIntrinsicsShape(Vec<usize>),
    #[error("ray array must be (batch, n, 3), got {0:?}")]
    BadRayShape(Vec<usize>),
    #[error("image shape must be positive, got {height}x{width}")]
    EmptyImage { height: usize, width: usize },
    #[error("intrinsics matrix for sample {batch} is singular")]
    SingularIntrinsics { batch: usize },
}

/// Encode ray directions as `(theta, phi)` angle pairs.
///
/// `theta = atan2(x, z)`, `phi = acos(y)`. A deterministic bijection of the
/// direction for `phi ∈ [0, π]`; the `acos` argument is clamped against
/// floating-point drift on unit vectors.
pub fn rays_to_angles(rays: ArrayView3<'_, f32>) -> Result<Array3<f32>, RayError> {
    let (b, n, c) = rays.dim();
    if c != 3 {
        return Err(RayError::BadRayShape(rays.shape().to_vec()));
    }
    let mut angles = Array3::zeros((b, n, 2));
    for bi in 0..b {
        for i in 0..n {
            let x = rays[[bi, i, 0]];
            let y = rays[[bi, i, 1]];
            let z = rays[[bi, i, 2]];
            angles[[bi, i, 0]] = x.atan2(z);
            angles[[bi, i, 1]] = y.clamp(-1.0, 1.0).acos();
        }
    }
    Ok(angles)
}

/// Build the per-pixel ray field of a camera.
///
/// Pixel sample positions follow the pixel-center convention (`i + 0.5`);
/// with `noisy` set, each 1D coordinate axis is additionally jittered by
/// uniform noise in `[-0.5, 0.5)` before centering, so a jittered column
/// shares its offset across rows and vice versa. Each sample is unprojected
/// through the exact matrix inverse of its intrinsics (computed in double
/// precision) and normalized to unit length.
///
/// Returns `(B, H·W, 3)` unit directions and `(B, H·W, 2)` angles, both
/// flattened row-major over `(H, W)`.
pub fn generate_rays(
    intrinsics: ArrayView3<'_, f32>,
    image_shape: (usize, usize),
    noisy: bool,
) -> Result<(Array3<f32>, Array3<f32>), RayError> {
    let (b, rows, cols) = intrinsics.dim();
    if rows != 3 || cols != 3 {
        return Err(RayError::BadIntrinsicsShape(intrinsics.shape().to_vec()));
    }
    let (h, w) = image_shape;
    if h == 0 || w == 0 {
        return Err(RayError::EmptyImage {
            height: h,
            width: w,
        });
    }

    let mut xs: Vec<f32> = (0..w).map(|x| x as f32 + 0.5).collect();
    let mut ys: Vec<f32> = (0..h).map(|y| y as f32 + 0.5).collect();
    if noisy {
        let mut rng = rand::rng();
        for x in xs.iter_mut() {
            *x += rng.random_range(-0.5..0.5);
        }
        for y in ys.iter_mut() {
            *y += rng.random_range(-0.5..0.5);
        }
    }

    let mut dirs = Array3::zeros((b, h * w, 3));
    for bi in 0..b {
        let k = mat3_from_view(intrinsics.index_axis(Axis(0), bi));
        let k_inv =
            invert_mat3_exact(&k).ok_or(RayError::SingularIntrinsics { batch: bi })?;
        for (yi, &y) in ys.iter().enumerate() {
            for (xi, &x) in xs.iter().enumerate() {
                let p = k_inv * Vector3::new(x, y, 1.0);
                let norm = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt().max(1e-12);
                let i = yi * w + xi;
                dirs[[bi, i, 0]] = p.x / norm;
                dirs[[bi, i, 1]] = p.y / norm;
                dirs[[bi, i, 2]] = p.z / norm;
            }
        }
    }
    let angles = rays_to_angles(dirs.view())?;
    debug!("generated {} rays for {} samples (noisy: {noisy})", h * w, b);
    Ok((dirs, angles))
}
