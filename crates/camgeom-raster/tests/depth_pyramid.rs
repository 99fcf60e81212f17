//! Splat a point cloud, then walk the result through the resolution
//! pipeline the way the training side does: min-downsample the depth and
//! resample a per-pixel feature field to match.

use approx::assert_abs_diff_eq;
use camgeom_raster::{downsample_min, flat_interpolate, rasterize_depth, InterpMode};
use ndarray::Array3;

fn unit_k() -> Array3<f32> {
    let mut k = Array3::zeros((1, 3, 3));
    k[[0, 0, 0]] = 1.0;
    k[[0, 1, 1]] = 1.0;
    k[[0, 2, 2]] = 1.0;
    k
}

#[test]
fn splatted_depth_downsamples_without_losing_sparse_hits() {
    // Four points, one per 2x2 block corner of a 4x4 buffer.
    let points = Array3::from_shape_vec(
        (1, 4, 3),
        vec![
            0.0, 0.0, 4.0, // pixel (0, 0)
            2.0, 0.0, 1.0, // pixel (2, 0)
            0.0, 2.0, 1.0, // pixel (0, 2)
            3.0, 3.0, 1.0, // pixel (3, 3)
        ],
    )
    .unwrap();
    let k = unit_k();
    let depth = rasterize_depth(points.view(), k.view(), (4, 4)).unwrap();
    assert_eq!(depth[[0, 0, 0, 0]], 4.0);
    assert_eq!(depth[[0, 0, 0, 2]], 1.0);

    // Each occupied block keeps its lone hit; the min never prefers the
    // empty (sentinel) pixels around it.
    let small = downsample_min(depth.view(), 2).unwrap();
    assert_eq!(small[[0, 0, 0, 0]], 4.0);
    assert_eq!(small[[0, 0, 0, 1]], 1.0);
    assert_eq!(small[[0, 0, 1, 0]], 1.0);
    assert_eq!(small[[0, 0, 1, 1]], 1.0);
}

#[test]
fn feature_field_tracks_depth_resolution() {
    // A flattened one-channel feature field at 4x4, brought down to 2x2
    // alongside the depth pyramid.
    let flat = Array3::from_shape_fn((1, 16, 1), |(_, i, _)| i as f32);
    let down = flat_interpolate(flat.view(), (4, 4), (2, 2), InterpMode::Bilinear, false).unwrap();
    assert_eq!(down.dim(), (1, 4, 1));

    // Each output samples the center of its 2x2 block.
    assert_abs_diff_eq!(down[[0, 0, 0]], 2.5, epsilon = 1e-5);
    assert_abs_diff_eq!(down[[0, 1, 0]], 4.5, epsilon = 1e-5);
    assert_abs_diff_eq!(down[[0, 2, 0]], 10.5, epsilon = 1e-5);
    assert_abs_diff_eq!(down[[0, 3, 0]], 12.5, epsilon = 1e-5);

    // And back up: an identity-shaped call is an exact copy.
    let same = flat_interpolate(down.view(), (2, 2), (2, 2), InterpMode::Bilinear, true).unwrap();
    assert_eq!(same, down);
}
