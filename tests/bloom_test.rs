use neon_city::pipelines::bloom::{
    BLOOM_FACTORS, KERNEL_RADII, MIP_LEVELS, composite_factors, gaussian_coefficients,
    lerp_bloom_factor, mip_sizes,
};

#[test]
fn kernels_grow_per_level() {
    assert_eq!(KERNEL_RADII, [3, 5, 7, 9, 11]);
    assert_eq!(BLOOM_FACTORS, [1.0, 0.8, 0.6, 0.4, 0.2]);
    assert_eq!(MIP_LEVELS, 5);
}

#[test]
fn gaussian_weights_are_normalized_and_falling() {
    for radius in KERNEL_RADII {
        let weights = gaussian_coefficients(radius);
        assert_eq!(weights.len(), radius as usize);
        let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5, "radius {} sums to {}", radius, total);
        assert!(weights.windows(2).all(|w| w[0] > w[1]));
        assert!(weights.iter().all(|w| *w > 0.0));
    }
}

#[test]
fn radius_blends_factors_towards_their_mirror() {
    assert_eq!(composite_factors(0.0), BLOOM_FACTORS);
    let mirrored = composite_factors(1.0);
    for (f, m) in BLOOM_FACTORS.iter().zip(mirrored) {
        assert!((m - (1.2 - f)).abs() < 1e-5);
    }

    let expected = [0.68, 0.64, 0.6, 0.56, 0.52];
    for (actual, expected) in composite_factors(0.4).iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-5, "{} != {}", actual, expected);
    }
    assert!((lerp_bloom_factor(0.6, 0.75) - 0.6).abs() < 1e-5);
}

#[test]
fn mips_halve_from_half_resolution() {
    assert_eq!(
        mip_sizes([800, 600]),
        [[400, 300], [200, 150], [100, 75], [50, 38], [25, 19]]
    );
}

#[test]
fn mips_never_reach_zero() {
    assert_eq!(mip_sizes([1, 1]), [[1, 1]; 5]);
    assert_eq!(mip_sizes([0, 0]), [[1, 1]; 5]);
    let tall = mip_sizes([3, 2000]);
    assert!(tall.iter().all(|[w, h]| *w >= 1 && *h >= 1));
    assert_eq!(tall[4][0], 1);
}
