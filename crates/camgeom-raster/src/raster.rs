//! Forward-splatting of 3D point clouds into regular depth buffers.

use camgeom_core::math::mat3_from_view;
use log::debug;
use ndarray::{Array4, ArrayView3, Axis};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("point array must be (batch, n, 3), got {0:?}")]
    BadPointShape(Vec<usize>),
    #[error("intrinsics array must be (batch, 3, 3), got {0:?}")]
    BadIntrinsicsShape(Vec<usize>),
    #[error("batch size mismatch: {points} point sets vs {intrinsics} intrinsics")]
    BatchMismatch { points: usize, intrinsics: usize },
}

/// Rasterize a point cloud into a mean-depth buffer.
///
/// Each point is projected through its sample's intrinsics, divided by the
/// homogeneous third coordinate, and rounded to the nearest pixel. Rounding
/// is a quantization step: nothing differentiable flows through it. Points
/// whose rounded pixel falls outside `[0, W) × [0, H)` are dropped; the
/// rest scatter-add their z-depth and a hit count into the target pixel, so
/// co-located points average instead of overwriting each other. Pixels that
/// receive no points read the missing-depth sentinel `0`.
///
/// Accumulation runs in a separate buffer pair per batch element; samples
/// never alias each other's pixels.
pub fn rasterize_depth(
    points: ArrayView3<'_, f32>,
    intrinsics: ArrayView3<'_, f32>,
    image_shape: (usize, usize),
) -> Result<Array4<f32>, RasterError> {
    let (b, n, c) = points.dim();
    if c != 3 {
        return Err(RasterError::BadPointShape(points.shape().to_vec()));
    }
    let kdim = intrinsics.dim();
    if kdim.1 != 3 || kdim.2 != 3 {
        return Err(RasterError::BadIntrinsicsShape(intrinsics.shape().to_vec()));
    }
    if kdim.0 != b {
        return Err(RasterError::BatchMismatch {
            points: b,
            intrinsics: kdim.0,
        });
    }

    let (h, w) = image_shape;
    let (hf, wf) = (h as f32, w as f32);
    let mut depth = Array4::zeros((b, 1, h, w));
    let mut splatted = 0usize;
    for bi in 0..b {
        let k = mat3_from_view(intrinsics.index_axis(Axis(0), bi));
        let mut acc = vec![0.0f32; h * w];
        let mut count = vec![0.0f32; h * w];
        for i in 0..n {
            let x = points[[bi, i, 0]];
            let y = points[[bi, i, 1]];
            let z = points[[bi, i, 2]];

            let pu = k[(0, 0)] * x + k[(0, 1)] * y + k[(0, 2)] * z;
            let pv = k[(1, 0)] * x + k[(1, 1)] * y + k[(1, 2)] * z;
            let pw = k[(2, 0)] * x + k[(2, 1)] * y + k[(2, 2)] * z;

            let u = (pu / pw).round();
            let v = (pv / pw).round();
            // Negated-range check also rejects NaN from a zero divisor.
            if !(u >= 0.0 && u < wf && v >= 0.0 && v < hf) {
                continue;
            }
            let idx = v as usize * w + u as usize;
            acc[idx] += z;
            count[idx] += 1.0;
            splatted += 1;
        }
        for yi in 0..h {
            for xi in 0..w {
                let idx = yi * w + xi;
                depth[[bi, 0, yi, xi]] = acc[idx] / count[idx].max(1.0);
            }
        }
    }
    debug!("splatted {splatted} of {} points into {b} buffers", b * n);
    Ok(depth)
}
