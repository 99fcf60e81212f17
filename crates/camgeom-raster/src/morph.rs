//! Binary morphology on mask arrays, plus mask overlap scoring.

use ndarray::{Array4, ArrayView4};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorphError {
    #[error("mask array must be (batch, 1, height, width), got {0:?}")]
    BadMaskShape(Vec<usize>),
    #[error("kernel size must be positive, got {height}x{width}")]
    EmptyKernel { height: usize, width: usize },
    #[error("mask shapes differ: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),
}

/// Structuring-element size, square or rectangular.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelSize {
    pub height: usize,
    pub width: usize,
}

impl From<usize> for KernelSize {
    fn from(side: usize) -> Self {
        Self {
            height: side,
            width: side,
        }
    }
}

impl From<(usize, usize)> for KernelSize {
    fn from((height, width): (usize, usize)) -> Self {
        Self { height, width }
    }
}

fn check_mask(mask: &ArrayView4<'_, f32>, kernel: KernelSize) -> Result<(), MorphError> {
    if mask.dim().1 != 1 {
        return Err(MorphError::BadMaskShape(mask.shape().to_vec()));
    }
    if kernel.height == 0 || kernel.width == 0 {
        return Err(MorphError::EmptyKernel {
            height: kernel.height,
            width: kernel.width,
        });
    }
    Ok(())
}

/// Box-window sums with zero padding, stride 1, same output size.
fn box_sum(mask: &ArrayView4<'_, f32>, kernel: KernelSize) -> Array4<f32> {
    let (b, _, h, w) = mask.dim();
    let (ph, pw) = (kernel.height / 2, kernel.width / 2);
    Array4::from_shape_fn((b, 1, h, w), |(bi, _, y, x)| {
        let mut sum = 0.0;
        for dy in 0..kernel.height {
            let yy = y as isize + dy as isize - ph as isize;
            if yy < 0 || yy >= h as isize {
                continue;
            }
            for dx in 0..kernel.width {
                let xx = x as isize + dx as isize - pw as isize;
                if xx < 0 || xx >= w as isize {
                    continue;
                }
                sum += mask[[bi, 0, yy as usize, xx as usize]];
            }
        }
        sum
    })
}

/// Dilate a binary mask: a pixel is set when any neighbor under the kernel
/// window is set.
pub fn dilate(
    mask: ArrayView4<'_, f32>,
    kernel: impl Into<KernelSize>,
) -> Result<Array4<f32>, MorphError> {
    let kernel = kernel.into();
    check_mask(&mask, kernel)?;
    Ok(box_sum(&mask, kernel).mapv(|s| if s > 0.0 { 1.0 } else { 0.0 }))
}

/// Erode a binary mask: a pixel survives only when the full kernel window is
/// set. Zero padding means borders always erode away.
pub fn erode(
    mask: ArrayView4<'_, f32>,
    kernel: impl Into<KernelSize>,
) -> Result<Array4<f32>, MorphError> {
    let kernel = kernel.into();
    check_mask(&mask, kernel)?;
    let area = (kernel.height * kernel.width) as f32;
    Ok(box_sum(&mask, kernel).mapv(|s| if s == area { 1.0 } else { 0.0 }))
}

/// Intersection over union of two binary masks.
///
/// Any non-zero entry counts as set. The union is floored at one element,
/// so two empty masks score `0` instead of dividing by zero.
pub fn iou(a: ArrayView4<'_, f32>, b: ArrayView4<'_, f32>) -> Result<f32, MorphError> {
    if a.shape() != b.shape() {
        return Err(MorphError::ShapeMismatch(
            a.shape().to_vec(),
            b.shape().to_vec(),
        ));
    }
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (sx, sy) = (x != 0.0, y != 0.0);
        if sx && sy {
            intersection += 1;
        }
        if sx || sy {
            union += 1;
        }
    }
    Ok(intersection as f32 / (union as f32).max(1.0))
}
