//! Conversions between spherical, angular, and Euclidean 3D coordinates.
//!
//! All functions here are pure and operate on batched `(B, N, 3)` arrays,
//! converting each entry independently. The angular convention matches the
//! ray encoding used throughout the workspace: `theta = atan2(x, z)` and
//! `phi = acos(y)`, with `phi ∈ [0, π]`.

use ndarray::{Array3, ArrayView3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SphericalError {
    #[error("coordinate array must be (batch, n, 3), got {0:?}")]
    BadShape(Vec<usize>),
}

fn check_lanes(arr: &ArrayView3<'_, f32>) -> Result<(usize, usize), SphericalError> {
    let (b, n, c) = arr.dim();
    if c != 3 {
        return Err(SphericalError::BadShape(arr.shape().to_vec()));
    }
    Ok((b, n))
}

/// Convert `(theta, phi, z)` spherical z-buffer coordinates to Euclidean.
///
/// Uses `x = z·tan(theta)` and `y = z / tan(phi) / cos(theta)`; the z-buffer
/// depth is passed through unchanged.
///
/// Degenerate when `cos(theta) = 0` or `tan(phi) = 0` (axis-aligned rays).
/// These cases are not guarded; callers must keep the input away from them.
pub fn spherical_zbuffer_to_euclidean(
    sph: ArrayView3<'_, f32>,
) -> Result<Array3<f32>, SphericalError> {
    let (b, n) = check_lanes(&sph)?;
    let mut out = Array3::zeros((b, n, 3));
    for bi in 0..b {
        for i in 0..n {
            let theta = sph[[bi, i, 0]];
            let phi = sph[[bi, i, 1]];
            let z = sph[[bi, i, 2]];
            out[[bi, i, 0]] = z * theta.tan();
            out[[bi, i, 1]] = z / phi.tan() / theta.cos();
            out[[bi, i, 2]] = z;
        }
    }
    Ok(out)
}

/// Convert `(theta, phi, r)` spherical coordinates to Euclidean `(x, y, z)`.
///
/// Exact inverse of [`euclidean_to_spherical`] for `r > 0`:
/// `x = r·sin(phi)·sin(theta)`, `y = r·cos(phi)`, `z = r·sin(phi)·cos(theta)`.
pub fn spherical_to_euclidean(sph: ArrayView3<'_, f32>) -> Result<Array3<f32>, SphericalError> {
    let (b, n) = check_lanes(&sph)?;
    let mut out = Array3::zeros((b, n, 3));
    for bi in 0..b {
        for i in 0..n {
            let theta = sph[[bi, i, 0]];
            let phi = sph[[bi, i, 1]];
            let r = sph[[bi, i, 2]];
            out[[bi, i, 0]] = r * phi.sin() * theta.sin();
            out[[bi, i, 1]] = r * phi.cos();
            out[[bi, i, 2]] = r * phi.sin() * theta.cos();
        }
    }
    Ok(out)
}

/// Convert Euclidean `(x, y, z)` to spherical `(theta, phi, r)`.
///
/// `r = |p|`, `theta = atan2(x/r, z/r)`, `phi = acos(y/r)`. The `acos`
/// argument is clamped to `[-1, 1]` against floating-point drift.
pub fn euclidean_to_spherical(points: ArrayView3<'_, f32>) -> Result<Array3<f32>, SphericalError> {
    let (b, n) = check_lanes(&points)?;
    let mut out = Array3::zeros((b, n, 3));
    for bi in 0..b {
        for i in 0..n {
            let x = points[[bi, i, 0]];
            let y = points[[bi, i, 1]];
            let z = points[[bi, i, 2]];
            let r = (x * x + y * y + z * z).sqrt();
            out[[bi, i, 0]] = (x / r).atan2(z / r);
            out[[bi, i, 1]] = (y / r).clamp(-1.0, 1.0).acos();
            out[[bi, i, 2]] = r;
        }
    }
    Ok(out)
}

/// Convert a normalized direction `(x, y, z)` to `(pitch, yaw, z)`.
///
/// `pitch = asin(y)`, `yaw = atan2(x, z)`. Only valid for unit-norm input;
/// this is not a general inverse of the z-buffer transform.
pub fn euclidean_to_spherical_zbuffer(
    dirs: ArrayView3<'_, f32>,
) -> Result<Array3<f32>, SphericalError> {
    let (b, n) = check_lanes(&dirs)?;
    let mut out = Array3::zeros((b, n, 3));
    for bi in 0..b {
        for i in 0..n {
            let x = dirs[[bi, i, 0]];
            let y = dirs[[bi, i, 1]];
            let z = dirs[[bi, i, 2]];
            out[[bi, i, 0]] = y.clamp(-1.0, 1.0).asin();
            out[[bi, i, 1]] = x.atan2(z);
            out[[bi, i, 2]] = z;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr3;

    #[test]
    fn spherical_roundtrip() {
        let sph = arr3(&[[[0.3, 1.2, 2.0], [-0.7, 0.4, 5.5], [1.1, 2.6, 0.25]]]);
        let eucl = spherical_to_euclidean(sph.view()).unwrap();
        let back = euclidean_to_spherical(eucl.view()).unwrap();
        for i in 0..3 {
            for c in 0..3 {
                assert!(
                    (back[[0, i, c]] - sph[[0, i, c]]).abs() < 1e-5,
                    "component {c} of entry {i} drifted: {} vs {}",
                    back[[0, i, c]],
                    sph[[0, i, c]]
                );
            }
        }
    }

    #[test]
    fn zbuffer_transform_agrees_with_radial_form() {
        // For a ray with angles (theta, phi) and z-buffer depth z, the
        // z-buffer transform must land on the same point as the radial
        // transform with r = z / (sin(phi) cos(theta)).
        let theta = 0.35f32;
        let phi = 1.1f32;
        let z = 3.0f32;
        let r = z / (phi.sin() * theta.cos());

        let from_z =
            spherical_zbuffer_to_euclidean(arr3(&[[[theta, phi, z]]]).view()).unwrap();
        let from_r = spherical_to_euclidean(arr3(&[[[theta, phi, r]]]).view()).unwrap();
        for c in 0..3 {
            assert!((from_z[[0, 0, c]] - from_r[[0, 0, c]]).abs() < 1e-4);
        }
    }

    #[test]
    fn unit_direction_pitch_yaw() {
        // Direction along +z: pitch 0, yaw 0.
        let out =
            euclidean_to_spherical_zbuffer(arr3(&[[[0.0, 0.0, 1.0]]]).view()).unwrap();
        assert!(out[[0, 0, 0]].abs() < 1e-6);
        assert!(out[[0, 0, 1]].abs() < 1e-6);
        assert_eq!(out[[0, 0, 2]], 1.0);

        // Direction along +y: pitch pi/2.
        let up = euclidean_to_spherical_zbuffer(arr3(&[[[0.0, 1.0, 0.0]]]).view()).unwrap();
        assert!((up[[0, 0, 0]] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn wrong_lane_width_fails_fast() {
        let bad = Array3::<f32>::zeros((1, 4, 2));
        assert!(matches!(
            spherical_zbuffer_to_euclidean(bad.view()),
            Err(SphericalError::BadShape(_))
        ));
        assert!(matches!(
            spherical_to_euclidean(bad.view()),
            Err(SphericalError::BadShape(_))
        ));
        assert!(matches!(
            euclidean_to_spherical(bad.view()),
            Err(SphericalError::BadShape(_))
        ));
        assert!(matches!(
            euclidean_to_spherical_zbuffer(bad.view()),
            Err(SphericalError::BadShape(_))
        ));
    }
}
