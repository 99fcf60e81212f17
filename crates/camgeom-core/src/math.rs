//! Mathematical aliases and intrinsics-matrix helpers.

use nalgebra::Matrix3;
use ndarray::ArrayView2;

/// 3×3 single-precision matrix.
pub type Mat3 = Matrix3<f32>;

/// Read a 3×3 matrix out of a `(3, 3)` array view.
pub fn mat3_from_view(k: ArrayView2<'_, f32>) -> Mat3 {
    debug_assert_eq!(k.shape(), &[3, 3]);
    Mat3::new(
        k[[0, 0]],
        k[[0, 1]],
        k[[0, 2]],
        k[[1, 0]],
        k[[1, 1]],
        k[[1, 2]],
        k[[2, 0]],
        k[[2, 1]],
        k[[2, 2]],
    )
}

/// Exact inverse of an intrinsics matrix.
///
/// The inversion runs in double precision and is cast back to `f32`, so the
/// result stays accurate for large focal lengths. Returns `None` when the
/// matrix is singular.
pub fn invert_mat3_exact(k: &Mat3) -> Option<Mat3> {
    let kd = k.cast::<f64>();
    kd.try_inverse().map(|inv| inv.cast::<f32>())
}
