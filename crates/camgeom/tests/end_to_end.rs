//! End-to-end scenarios across the geometry and raster crates.

use approx::assert_abs_diff_eq;
use camgeom::geom::{
    generate_rays, rays_to_angles, spherical_to_euclidean, unproject, unproject_points_pinhole,
    UnifiedParams,
};
use camgeom::raster::{dilate, downsample_min, erode, iou, rasterize_depth};
use ndarray::{arr3, Array3, Array4};

fn unit_k(batch: usize) -> Array3<f32> {
    let mut k = Array3::zeros((batch, 3, 3));
    for bi in 0..batch {
        k[[bi, 0, 0]] = 1.0;
        k[[bi, 1, 1]] = 1.0;
        k[[bi, 2, 2]] = 1.0;
    }
    k
}

#[test]
fn tiny_camera_ray_field_is_consistent() {
    // Unit focals, centered principal point, 2x2 image: four rays, all unit
    // norm, whose angle pairs regenerate the directions through the radial
    // spherical transform.
    let k = unit_k(1);
    let (dirs, angles) = generate_rays(k.view(), (2, 2), false).unwrap();
    assert_eq!(dirs.dim(), (1, 4, 3));

    for i in 0..4 {
        let norm =
            (dirs[[0, i, 0]].powi(2) + dirs[[0, i, 1]].powi(2) + dirs[[0, i, 2]].powi(2)).sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "ray {i} has norm {norm}");
    }

    let mut sph = Array3::zeros((1, 4, 3));
    for i in 0..4 {
        sph[[0, i, 0]] = angles[[0, i, 0]];
        sph[[0, i, 1]] = angles[[0, i, 1]];
        sph[[0, i, 2]] = 1.0;
    }
    let rebuilt = spherical_to_euclidean(sph.view()).unwrap();
    for i in 0..4 {
        for c in 0..3 {
            assert_abs_diff_eq!(rebuilt[[0, i, c]], dirs[[0, i, c]], epsilon = 1e-5);
        }
    }

    // The standalone encoder agrees with the angles the generator returned.
    let reencoded = rays_to_angles(dirs.view()).unwrap();
    for i in 0..4 {
        for c in 0..2 {
            assert!((reencoded[[0, i, c]] - angles[[0, i, c]]).abs() < 1e-6);
        }
    }
}

#[test]
fn colocated_splats_average_to_the_mean() {
    let points = arr3(&[[[0.0, 0.0, 2.0], [0.0, 0.0, 4.0]]]);
    let k = unit_k(1);
    let depth = rasterize_depth(points.view(), k.view(), (2, 2)).unwrap();
    assert_eq!(depth[[0, 0, 0, 0]], 3.0);
}

#[test]
fn dense_depth_survives_unproject_then_splat() {
    // Under an integer-grid camera the dense unprojection followed by
    // rasterization must reproduce the depth map exactly, with missing
    // pixels staying missing.
    let (h, w) = (6usize, 8usize);
    let k = unit_k(1);
    let mut depth = Array4::<f32>::zeros((1, 1, h, w));
    for y in 0..h {
        for x in 0..w {
            depth[[0, 0, y, x]] = if (y + x) % 5 == 0 {
                0.0
            } else {
                1.0 + (y * w + x) as f32 * 0.25
            };
        }
    }

    let grid = unproject_points_pinhole(depth.view(), k.view()).unwrap();
    let points = Array3::from_shape_fn((1, h * w, 3), |(bi, i, c)| {
        grid[[bi, c, i / w, i % w]]
    });
    let splatted = rasterize_depth(points.view(), k.view(), (h, w)).unwrap();

    for y in 0..h {
        for x in 0..w {
            assert_eq!(splatted[[0, 0, y, x]], depth[[0, 0, y, x]], "pixel ({y}, {x})");
        }
    }
}

#[test]
fn unprojected_rays_reach_the_spherical_domain() {
    // Camera-model unprojection and the spherical encoding compose: pixel
    // rays from a distorted camera stay unit-norm, so their angle pairs are
    // a faithful re-encoding.
    let params = [UnifiedParams {
        fx: 300.0,
        fy: 300.0,
        cx: 64.0,
        cy: 48.0,
        alpha: 0.55,
        beta: 1.2,
    }];
    let pixels = arr3(&[[[64.0, 48.0], [10.0, 10.0], [120.0, 90.0]]]);
    let (dirs, valid) = unproject(pixels.view(), &params).unwrap();
    assert!(valid.iter().all(|&v| v));

    let angles = rays_to_angles(dirs.view()).unwrap();
    let mut sph = Array3::zeros((1, 3, 3));
    for i in 0..3 {
        sph[[0, i, 0]] = angles[[0, i, 0]];
        sph[[0, i, 1]] = angles[[0, i, 1]];
        sph[[0, i, 2]] = 1.0;
    }
    let rebuilt = spherical_to_euclidean(sph.view()).unwrap();
    for i in 0..3 {
        for c in 0..3 {
            assert!((rebuilt[[0, i, c]] - dirs[[0, i, c]]).abs() < 2e-3);
        }
    }
}

#[test]
fn mask_pipeline_scores_overlap_after_cleanup() {
    // Dilate a sparse detection mask, erode it back, and score it against
    // the reference region: the solid interior must survive untouched.
    let mut reference = Array4::<f32>::zeros((1, 1, 12, 12));
    for y in 3..9 {
        for x in 3..9 {
            reference[[0, 0, y, x]] = 1.0;
        }
    }

    let opened = dilate(reference.view(), 3).unwrap();
    let closed = erode(opened.view(), 3).unwrap();
    assert_eq!(closed, reference);
    assert_eq!(iou(closed.view(), reference.view()).unwrap(), 1.0);
}

#[test]
fn downsampled_depth_feeds_smaller_ray_grids() {
    // Downsample a depth map with missing entries, then generate rays at
    // the reduced resolution; shapes line up for loss-side consumers.
    let mut depth = Array4::<f32>::zeros((1, 1, 4, 4));
    for y in 0..4 {
        for x in 0..4 {
            depth[[0, 0, y, x]] = if y == 0 { 0.0 } else { (y + x) as f32 };
        }
    }
    let small = downsample_min(depth.view(), 2).unwrap();
    assert_eq!(small.dim(), (1, 1, 2, 2));
    // Top-left block holds 0, 0, 1, 2: the valid 1 wins over the sentinel.
    assert_eq!(small[[0, 0, 0, 0]], 1.0);

    let k = unit_k(1);
    let (dirs, _) = generate_rays(k.view(), (2, 2), false).unwrap();
    assert_eq!(dirs.dim().1, small.dim().2 * small.dim().3);
}
