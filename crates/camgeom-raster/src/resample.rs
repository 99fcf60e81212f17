//! Resolution-changing utilities for flattened feature maps and depth maps.

use ndarray::{Array3, Array4, ArrayView3, ArrayView4};
use thiserror::Error;

/// Depth value substituted for the missing sentinel before min-pooling.
const MISSING_SUBSTITUTE: f32 = 1e5;
/// Block minima above this are mapped back to the missing sentinel.
const MISSING_CUTOFF: f32 = 1000.0;

#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("flat array must be (batch, h*w, channels) with h*w = {expected}, got {shape:?}")]
    BadFlatShape { shape: Vec<usize>, expected: usize },
    #[error("target shape must be positive, got {height}x{width}")]
    EmptyShape { height: usize, width: usize },
    #[error("depth array must be (batch, 1, height, width), got {0:?}")]
    BadDepthShape(Vec<usize>),
    #[error("downsample factor must be positive")]
    ZeroFactor,
    #[error("image {height}x{width} is not divisible by factor {factor}")]
    NotDivisible {
        height: usize,
        width: usize,
        factor: usize,
    },
}

/// Interpolation filter for [`flat_interpolate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpMode {
    Bilinear,
    Nearest,
}

/// Resample a flattened per-pixel feature tensor to a new resolution.
///
/// `flat` is `(B, old_h·old_w, C)`, flattened row-major; the result is
/// `(B, new_h·new_w, C)`. Sampling uses the half-pixel convention
/// (`src = (dst + 0.5)·scale − 0.5`) with border clamping; `antialias`
/// widens the bilinear triangle filter by the scale factor when minifying.
///
/// Equal shapes short-circuit to an exact copy — the input values pass
/// through bit-identical, untouched by any filter arithmetic.
pub fn flat_interpolate(
    flat: ArrayView3<'_, f32>,
    old: (usize, usize),
    new: (usize, usize),
    mode: InterpMode,
    antialias: bool,
) -> Result<Array3<f32>, ResampleError> {
    let (b, hw, ch) = flat.dim();
    if old.0 == 0 || old.1 == 0 {
        return Err(ResampleError::EmptyShape {
            height: old.0,
            width: old.1,
        });
    }
    if new.0 == 0 || new.1 == 0 {
        return Err(ResampleError::EmptyShape {
            height: new.0,
            width: new.1,
        });
    }
    if hw != old.0 * old.1 {
        return Err(ResampleError::BadFlatShape {
            shape: flat.shape().to_vec(),
            expected: old.0 * old.1,
        });
    }
    if old == new {
        return Ok(flat.to_owned());
    }

    let grid = Array4::from_shape_fn((b, old.0, old.1, ch), |(bi, y, x, c)| {
        flat[[bi, y * old.1 + x, c]]
    });

    let row_taps = filter_taps(old.0, new.0, mode, antialias);
    let col_taps = filter_taps(old.1, new.1, mode, antialias);

    let rows_done: Array4<f32> = Array4::from_shape_fn((b, new.0, old.1, ch), |(bi, oy, x, c)| {
        row_taps[oy]
            .iter()
            .map(|&(iy, wt)| wt * grid[[bi, iy, x, c]])
            .sum()
    });
    let resized: Array4<f32> = Array4::from_shape_fn((b, new.0, new.1, ch), |(bi, y, ox, c)| {
        col_taps[ox]
            .iter()
            .map(|&(ix, wt)| wt * rows_done[[bi, y, ix, c]])
            .sum()
    });

    Ok(Array3::from_shape_fn((b, new.0 * new.1, ch), |(bi, i, c)| {
        resized[[bi, i / new.1, i % new.1, c]]
    }))
}

/// Per-output-index filter taps along one axis.
///
/// For bilinear filtering the triangle support is 1 source pixel, widened to
/// the scale factor when `antialias` is set and the axis is minified. Taps
/// outside the image clamp to the border and merge, then the tap set is
/// normalized to unit weight.
fn filter_taps(
    in_len: usize,
    out_len: usize,
    mode: InterpMode,
    antialias: bool,
) -> Vec<Vec<(usize, f32)>> {
    let scale = in_len as f32 / out_len as f32;
    match mode {
        InterpMode::Nearest => (0..out_len)
            .map(|i| {
                let src = ((i as f32 * scale) as usize).min(in_len - 1);
                vec![(src, 1.0)]
            })
            .collect(),
        InterpMode::Bilinear => {
            let support = if antialias && scale > 1.0 { scale } else { 1.0 };
            (0..out_len)
                .map(|i| {
                    let center = (i as f32 + 0.5) * scale - 0.5;
                    let lo = (center - support).ceil() as isize;
                    let hi = (center + support).floor() as isize;
                    let mut taps: Vec<(usize, f32)> = Vec::new();
                    let mut total = 0.0;
                    for j in lo..=hi {
                        let wt = 1.0 - (j as f32 - center).abs() / support;
                        if wt <= 0.0 {
                            continue;
                        }
                        let idx = j.clamp(0, in_len as isize - 1) as usize;
                        total += wt;
                        match taps.last_mut() {
                            Some(last) if last.0 == idx => last.1 += wt,
                            _ => taps.push((idx, wt)),
                        }
                    }
                    for tap in taps.iter_mut() {
                        tap.1 /= total;
                    }
                    taps
                })
                .collect()
        }
    }
}

/// Block min-pool a depth map, preserving the missing-depth sentinel.
///
/// Within each `factor × factor` block, entries equal to `0` (missing) are
/// substituted with a large stand-in before taking the minimum, so a missing
/// sample never wins against valid neighbors; if the whole block is missing,
/// the oversized minimum is mapped back to `0`. Not differentiable — the
/// min selection is as gradient-opaque as any argmax.
///
/// `H` and `W` must be divisible by `factor`.
pub fn downsample_min(
    depth: ArrayView4<'_, f32>,
    factor: usize,
) -> Result<Array4<f32>, ResampleError> {
    if factor == 0 {
        return Err(ResampleError::ZeroFactor);
    }
    let (b, c, h, w) = depth.dim();
    if c != 1 {
        return Err(ResampleError::BadDepthShape(depth.shape().to_vec()));
    }
    if h % factor != 0 || w % factor != 0 {
        return Err(ResampleError::NotDivisible {
            height: h,
            width: w,
            factor,
        });
    }

    let (oh, ow) = (h / factor, w / factor);
    let mut out = Array4::zeros((b, 1, oh, ow));
    for bi in 0..b {
        for oy in 0..oh {
            for ox in 0..ow {
                let mut m = f32::INFINITY;
                for dy in 0..factor {
                    for dx in 0..factor {
                        let v = depth[[bi, 0, oy * factor + dy, ox * factor + dx]];
                        let v = if v == 0.0 { MISSING_SUBSTITUTE } else { v };
                        m = m.min(v);
                    }
                }
                out[[bi, 0, oy, ox]] = if m > MISSING_CUTOFF { 0.0 } else { m };
            }
        }
    }
    Ok(out)
}
