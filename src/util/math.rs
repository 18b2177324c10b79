//! Scale-space sigma ladder and Gaussian sampling helpers.

/// Returns the absolute blur of `level` within an octave of `levels` levels.
///
/// The ladder is `sigma0 * 2^(level / levels)`, so level `levels` doubles the
/// base blur and starts the next octave.
pub fn octave_sigma(sigma0: f32, level: usize, levels: usize) -> f64 {
    f64::from(sigma0) * 2.0_f64.powf(level as f64 / levels as f64)
}

/// Blur that must be added on top of `base` to reach `target`.
///
/// Gaussian blurs compose in quadrature, so this is `sqrt(target^2 - base^2)`.
/// Returns zero when `target <= base`.
pub(crate) fn blur_difference(target: f64, base: f64) -> f64 {
    (target * target - base * base).max(0.0).sqrt()
}

/// Returns true when `sigma` can parameterize a Gaussian kernel.
pub(crate) fn is_valid_sigma(sigma: f32) -> bool {
    sigma.is_finite() && sigma > 0.0
}

/// Writes a normalized half-sided Gaussian into `row`.
///
/// `row[0]` is the centre tap and `row[i]` the tap at offsets `+i` and `-i`.
/// Taps past `radius` are zeroed. Normalization is over the full symmetric
/// kernel, so `row[0] + 2 * sum(row[1..=radius]) == 1`.
pub(crate) fn gaussian_half_row(row: &mut [f32], radius: usize, sigma: f32) {
    debug_assert!(radius < row.len());
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;

    let mut taps = [0.0f64; crate::table::GAUSS_ALIGN];
    taps[0] = 1.0;
    let mut sum = 1.0f64;
    for (x, tap) in taps.iter_mut().enumerate().take(radius + 1).skip(1) {
        let xf = x as f64;
        *tap = (-(xf * xf) / denom).exp();
        sum += 2.0 * *tap;
    }

    for (x, value) in row.iter_mut().enumerate() {
        *value = if x <= radius {
            (taps[x] / sum) as f32
        } else {
            0.0
        };
    }
}
