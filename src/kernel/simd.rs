//! Lane-group dot products for the vectorized dense path
//!
//! The vectorized inner loop multiplies `L` elements of a row of `A` with `L`
//! elements of a row of `Bᵗ`, reduces the lane group horizontally and adds the
//! group sum to the running scalar sum. Elements left over after the last full
//! group are accumulated one at a time. Summation order therefore differs from
//! the scalar path and results agree only up to rounding.

use crate::arch::{detect_architecture, Architecture};

/// Dot product of two equally long slices
pub type DotFn = fn(&[f64], &[f64]) -> f64;

/// Sequential scalar dot product
#[inline]
pub fn dot_scalar(a: &[f64], b: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        sum += x * y;
    }
    sum
}

/// Portable lane-group dot product for a fixed lane count `L`
#[inline]
pub fn dot_lane_groups<const L: usize>(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let mut sum = 0.0;
    let a_groups = a.chunks_exact(L);
    let b_groups = b.chunks_exact(L);
    let (a_tail, b_tail) = (a_groups.remainder(), b_groups.remainder());

    for (ga, gb) in a_groups.zip(b_groups) {
        let mut lanes = [0.0f64; L];
        for l in 0..L {
            lanes[l] = ga[l] * gb[l];
        }
        sum += horizontal_sum(&lanes);
    }
    for (x, y) in a_tail.iter().zip(b_tail) {
        sum += x * y;
    }
    sum
}

/// Pairwise reduction of one lane group
#[inline]
fn horizontal_sum(lanes: &[f64]) -> f64 {
    match lanes.len() {
        0 => 0.0,
        1 => lanes[0],
        n => {
            let (lo, hi) = lanes.split_at(n / 2);
            horizontal_sum(lo) + horizontal_sum(hi)
        }
    }
}

#[cfg(target_arch = "x86_64")]
mod avx {
    use std::arch::x86_64::*;

    /// Four-lane dot product using 256-bit AVX registers
    ///
    /// # Safety
    ///
    /// The caller must ensure the CPU supports AVX.
    #[target_feature(enable = "avx")]
    pub unsafe fn dot(a: &[f64], b: &[f64]) -> f64 {
        let len = a.len().min(b.len());
        let mut sum = 0.0;
        let mut k = 0;

        while k + 4 <= len {
            let va = _mm256_loadu_pd(a.as_ptr().add(k));
            let vb = _mm256_loadu_pd(b.as_ptr().add(k));
            let prod = _mm256_mul_pd(va, vb);

            let mut lanes = [0.0f64; 4];
            _mm256_storeu_pd(lanes.as_mut_ptr(), prod);
            sum += (lanes[0] + lanes[1]) + (lanes[2] + lanes[3]);
            k += 4;
        }
        while k < len {
            sum += a[k] * b[k];
            k += 1;
        }
        sum
    }
}

#[cfg(target_arch = "x86_64")]
fn dot_avx(a: &[f64], b: &[f64]) -> f64 {
    // SAFETY: only handed out by `select_dot` after AVX was detected at runtime.
    unsafe { avx::dot(a, b) }
}

#[cfg(target_arch = "aarch64")]
fn dot_neon(a: &[f64], b: &[f64]) -> f64 {
    use std::arch::aarch64::*;

    let len = a.len().min(b.len());
    let mut sum = 0.0;
    let mut k = 0;

    while k + 2 <= len {
        // SAFETY: NEON is mandatory on aarch64 and k + 2 <= len keeps both loads in bounds.
        unsafe {
            let va = vld1q_f64(a.as_ptr().add(k));
            let vb = vld1q_f64(b.as_ptr().add(k));
            sum += vaddvq_f64(vmulq_f64(va, vb));
        }
        k += 2;
    }
    while k < len {
        sum += a[k] * b[k];
        k += 1;
    }
    sum
}

/// Lane-group dot product for a runtime lane count
pub fn dot_lanes(a: &[f64], b: &[f64], lanes: usize) -> f64 {
    portable_dot(lanes)(a, b)
}

/// Portable lane-group routine for `lanes` lanes of `f64`
pub fn portable_dot(lanes: usize) -> DotFn {
    match lanes {
        0 | 1 => dot_scalar,
        2 => dot_lane_groups::<2>,
        8 => dot_lane_groups::<8>,
        16 => dot_lane_groups::<16>,
        _ => dot_lane_groups::<4>,
    }
}

/// Picks the dot product used by the inner loop of the dense kernel
///
/// Hardware intrinsics are used where they match the host lane width;
/// otherwise a portable lane-group loop of the same width.
pub fn select_dot(vectorize: bool) -> DotFn {
    let arch = detect_architecture();
    if !vectorize || !arch.has_simd_support() {
        return dot_scalar;
    }

    match arch {
        #[cfg(target_arch = "x86_64")]
        Architecture::X86WithoutAVX512 if std::is_x86_feature_detected!("avx") => dot_avx,
        #[cfg(target_arch = "aarch64")]
        Architecture::ArmNeon => dot_neon,
        _ => portable_dot(arch.f64_lanes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> (Vec<f64>, Vec<f64>) {
        let a = (0..len).map(|i| (i as f64) * 0.5 - 3.0).collect();
        let b = (0..len).map(|i| 1.0 + (i % 7) as f64).collect();
        (a, b)
    }

    #[test]
    fn test_scalar_dot() {
        assert_eq!(dot_scalar(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot_scalar(&[], &[]), 0.0);
    }

    #[test]
    fn test_lane_groups_match_scalar_with_tail() {
        for len in [0, 1, 3, 4, 7, 8, 9, 33, 64] {
            let (a, b) = sample(len);
            let expected = dot_scalar(&a, &b);
            for lanes in [2, 4, 8] {
                let got = dot_lanes(&a, &b, lanes);
                assert!(
                    (got - expected).abs() <= 1e-9 * expected.abs().max(1.0),
                    "len={} lanes={}: {} vs {}",
                    len, lanes, got, expected
                );
            }
        }
    }

    #[test]
    fn test_portable_dot_for_every_lane_count() {
        let (a, b) = sample(45);
        let expected = dot_scalar(&a, &b);
        for lanes in [1, 2, 4, 8, 16, 3] {
            let got = portable_dot(lanes)(&a, &b);
            assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0), "lanes={}", lanes);
        }
    }

    #[test]
    fn test_selected_dot_is_close_to_scalar() {
        let (a, b) = sample(67);
        let expected = dot_scalar(&a, &b);
        let got = select_dot(true)(&a, &b);
        assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        assert_eq!(select_dot(false)(&a, &b), expected);
    }

    #[test]
    fn test_horizontal_sum() {
        assert_eq!(horizontal_sum(&[1.0, 2.0, 3.0, 4.0]), 10.0);
        assert_eq!(horizontal_sum(&[5.0]), 5.0);
    }
}
