//! Elementwise real/complex numerics, padding, reductions and dense
//! matrix multiply shared by every transform in the crate.
//!
//! Functions that change a buffer's length (the padders) allocate and
//! return a new `Vec`; elementwise functions operate in place on a
//! `&mut [f32]`, following the "optional destination, in-place on the
//! first argument when omitted" convention of the original design —
//! expressed here as a plain in-place function plus an `_into` variant
//! that writes to a caller-supplied destination.

use crate::error::AuroraError;
use num_complex::Complex32;

pub const TAU: f64 = std::f64::consts::TAU;
pub const PI: f64 = std::f64::consts::PI;

/// `sinc(x) = sin(pi*x) / (pi*x)`, `sinc(0) = 1`.
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Windowed-sinc lowpass impulse response of length `length` (order = length - 1)
/// with normalized cutoff `cut` in `(0, 1)` (fraction of Nyquist).
pub fn sinc_lowpass(cut: f64, length: usize) -> Vec<f32> {
    let center = (length as f64 - 1.0) / 2.0;
    (0..length)
        .map(|i| (cut * sinc(cut * (i as f64 - center))) as f32)
        .collect()
}

/// Windowed-sinc highpass impulse response. Requires an even order
/// (odd `length`), per the domain requirement in the original design.
pub fn sinc_highpass(cut: f64, length: usize) -> Result<Vec<f32>, AuroraError> {
    if (length - 1) % 2 != 0 {
        return Err(AuroraError::DomainRequirement {
            detail: "highpass sinc design requires even filter order",
        });
    }
    let center = (length as f64 - 1.0) / 2.0;
    Ok((0..length)
        .map(|i| {
            let d = i as f64 - center;
            let delta = if d == 0.0 { 1.0 } else { 0.0 };
            (delta - cut * sinc(cut * d)) as f32
        })
        .collect())
}

/// Windowed-sinc bandpass impulse response between `c1` and `c2` (normalized, `c1 < c2`).
pub fn sinc_bandpass(c1: f64, c2: f64, length: usize) -> Vec<f32> {
    let center = (length as f64 - 1.0) / 2.0;
    (0..length)
        .map(|i| {
            let d = i as f64 - center;
            (c2 * sinc(c2 * d) - c1 * sinc(c1 * d)) as f32
        })
        .collect()
}

/// Windowed-sinc bandstop impulse response. Requires an even order.
pub fn sinc_bandstop(c1: f64, c2: f64, length: usize) -> Result<Vec<f32>, AuroraError> {
    if (length - 1) % 2 != 0 {
        return Err(AuroraError::DomainRequirement {
            detail: "bandstop sinc design requires even filter order",
        });
    }
    let center = (length as f64 - 1.0) / 2.0;
    Ok((0..length)
        .map(|i| {
            let d = i as f64 - center;
            let delta = if d == 0.0 { 1.0 } else { 0.0 };
            (delta - (c2 * sinc(c2 * d) - c1 * sinc(c1 * d))) as f32
        })
        .collect())
}

/// Generates an in-place elementwise unary op plus an `_into` variant
/// writing to a caller-supplied destination, for each named `f32`
/// method or closure.
macro_rules! elementwise_unary {
    ($name:ident, $into:ident, $op:expr) => {
        #[inline]
        pub fn $name(data: &mut [f32]) {
            let op: fn(f32) -> f32 = $op;
            for v in data.iter_mut() {
                *v = op(*v);
            }
        }

        #[inline]
        pub fn $into(data: &[f32], out: &mut [f32]) {
            let op: fn(f32) -> f32 = $op;
            for (o, &v) in out.iter_mut().zip(data.iter()) {
                *o = op(v);
            }
        }
    };
}

elementwise_unary!(abs, abs_into, f32::abs);
elementwise_unary!(neg, neg_into, |x| -x);
elementwise_unary!(floor, floor_into, f32::floor);
elementwise_unary!(ceil, ceil_into, f32::ceil);
elementwise_unary!(round, round_into, f32::round);
elementwise_unary!(cos, cos_into, f32::cos);
elementwise_unary!(sin, sin_into, f32::sin);
elementwise_unary!(tan, tan_into, f32::tan);
elementwise_unary!(acos, acos_into, f32::acos);
elementwise_unary!(asin, asin_into, f32::asin);
elementwise_unary!(atan, atan_into, f32::atan);
elementwise_unary!(exp, exp_into, f32::exp);
elementwise_unary!(exp2, exp2_into, f32::exp2);
elementwise_unary!(sqrt, sqrt_into, f32::sqrt);
elementwise_unary!(log, log_into, f32::ln);
elementwise_unary!(log2, log2_into, f32::log2);
elementwise_unary!(log10, log10_into, f32::log10);

/// Linear interpolation of `data` at fractional index `x`. Indices
/// outside `[0, data.len()-1]` clamp to the nearest edge sample.
pub fn lerp_at(data: &[f32], x: f64) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    if x <= 0.0 {
        return data[0];
    }
    let last = data.len() - 1;
    if x >= last as f64 {
        return data[last];
    }
    let k = x.floor() as usize;
    let a = (x - k as f64) as f32;
    data[k] * (1.0 - a) + data[k + 1] * a
}

/// Mirror-reflect `data` by `pad` samples on each side without repeating
/// the boundary sample: `[x2, x1, x0, x1, ..., xN, xN-1, xN-2]`.
pub fn pad_reflect(data: &[f32], pad: usize) -> Vec<f32> {
    let n = data.len();
    let mut out = Vec::with_capacity(n + 2 * pad);
    for i in 0..pad {
        let idx = (pad - i).min(n.saturating_sub(1));
        out.push(data[idx]);
    }
    out.extend_from_slice(data);
    for i in 0..pad {
        let idx = n.saturating_sub(2).saturating_sub(i);
        out.push(data[idx.min(n - 1)]);
    }
    out
}

/// Symmetric padding: repeats the boundary sample (unlike reflect).
pub fn pad_symmetric(data: &[f32], pad: usize) -> Vec<f32> {
    let n = data.len();
    let mut out = Vec::with_capacity(n + 2 * pad);
    for i in 0..pad {
        let idx = (pad - 1 - i).min(n - 1);
        out.push(data[idx]);
    }
    out.extend_from_slice(data);
    for i in 0..pad {
        let idx = (n - 1).saturating_sub(i);
        out.push(data[idx]);
    }
    out
}

/// Wrap-around (circular) padding.
pub fn pad_wrap(data: &[f32], pad: usize) -> Vec<f32> {
    let n = data.len();
    let mut out = Vec::with_capacity(n + 2 * pad);
    for i in 0..pad {
        out.push(data[(n - pad + i) % n]);
    }
    out.extend_from_slice(data);
    for i in 0..pad {
        out.push(data[i % n]);
    }
    out
}

/// Edge (clamp) padding: repeats the first/last sample `pad` times.
pub fn pad_edge(data: &[f32], pad: usize) -> Vec<f32> {
    let n = data.len();
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.resize(pad, data[0]);
    out.extend_from_slice(data);
    out.resize(out.len() + pad, data[n - 1]);
    out
}

/// Constant-value padding.
pub fn pad_constant(data: &[f32], pad: usize, value: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(data.len() + 2 * pad);
    out.resize(pad, value);
    out.extend_from_slice(data);
    out.resize(out.len() + pad, value);
    out
}

/// Sum reduction.
pub fn sum(data: &[f32]) -> f32 {
    data.iter().sum()
}

/// Mean reduction.
pub fn mean(data: &[f32]) -> f32 {
    if data.is_empty() {
        0.0
    } else {
        sum(data) / data.len() as f32
    }
}

/// Maximum value and its index. Returns `(0.0, 0)` for an empty slice.
pub fn max_with_index(data: &[f32]) -> (f32, usize) {
    let mut best = f32::NEG_INFINITY;
    let mut idx = 0;
    for (i, &v) in data.iter().enumerate() {
        if v.is_finite() && v > best {
            best = v;
            idx = i;
        }
    }
    if best == f32::NEG_INFINITY {
        (0.0, 0)
    } else {
        (best, idx)
    }
}

/// p-norm for `p` in `{0 (count of nonzeros), inf, 1, 2}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Norm {
    Zero,
    Inf,
    L1,
    L2,
}

pub fn norm(data: &[f32], kind: Norm) -> f32 {
    match kind {
        Norm::Zero => data.iter().filter(|v| **v != 0.0).count() as f32,
        Norm::Inf => data.iter().fold(0.0f32, |a, v| a.max(v.abs())),
        Norm::L1 => data.iter().map(|v| v.abs()).sum(),
        Norm::L2 => data.iter().map(|v| v * v).sum::<f32>().sqrt(),
    }
}

/// Dense row-major matrix used for filterbank weight matrices and
/// time-frequency tiles.
#[derive(Clone, Debug)]
pub struct DenseMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl DenseMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Transpose variant for matrix multiply, matching the four-way
/// `{A·B, A·Bᵀ, Aᵀ·B, Aᵀ·Bᵀ}` enum of the original design.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatMulKind {
    AB,
    ABt,
    AtB,
    AtBt,
}

/// Dense matrix-matrix multiply with transpose-variant dispatch.
/// Fails with `ShapeMismatch` (destination untouched) when the inner
/// dimension check fails.
pub fn matmul(a: &DenseMatrix, b: &DenseMatrix, kind: MatMulKind) -> Result<DenseMatrix, AuroraError> {
    let (m, k_a, k_b, n) = match kind {
        MatMulKind::AB => (a.rows, a.cols, b.rows, b.cols),
        MatMulKind::ABt => (a.rows, a.cols, b.cols, b.rows),
        MatMulKind::AtB => (a.cols, a.rows, b.rows, b.cols),
        MatMulKind::AtBt => (a.cols, a.rows, b.cols, b.rows),
    };
    if k_a != k_b {
        return Err(AuroraError::ShapeMismatch {
            expected: (k_a, k_a),
            actual: (k_a, k_b),
        });
    }
    let mut out = DenseMatrix::zeros(m, n);
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0f32;
            for p in 0..k_a {
                let av = match kind {
                    MatMulKind::AB | MatMulKind::ABt => a.data[i * a.cols + p],
                    MatMulKind::AtB | MatMulKind::AtBt => a.data[p * a.cols + i],
                };
                let bv = match kind {
                    MatMulKind::AB | MatMulKind::AtB => b.data[p * b.cols + j],
                    MatMulKind::ABt | MatMulKind::AtBt => b.data[j * b.cols + p],
                };
                acc += av * bv;
            }
            out.data[i * n + j] = acc;
        }
    }
    Ok(out)
}

/// Complex elementwise multiply: `out[i] = a[i] * b[i]`.
pub fn complex_mul(a: &[Complex32], b: &[Complex32], out: &mut [Complex32]) {
    for i in 0..out.len() {
        out[i] = a[i] * b[i];
    }
}

/// Complex elementwise divide: `out[i] = a[i] / b[i]`.
pub fn complex_div(a: &[Complex32], b: &[Complex32], out: &mut [Complex32]) {
    for i in 0..out.len() {
        out[i] = a[i] / b[i];
    }
}

/// Complex elementwise magnitude.
pub fn complex_abs(a: &[Complex32], out: &mut [f32]) {
    for i in 0..out.len() {
        out[i] = a[i].norm();
    }
}

/// Complex elementwise magnitude squared.
pub fn complex_abs_sq(a: &[Complex32], out: &mut [f32]) {
    for i in 0..out.len() {
        out[i] = a[i].norm_sqr();
    }
}

/// Log-compression `log_c(x) = ln(gamma*x + beta)`.
#[inline]
pub fn log_compress(x: f32, gamma: f32, beta: f32) -> f32 {
    (gamma * x + beta).ln()
}

/// Smallest power of two `>= n`.
pub fn round_power_of_two(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    1usize << (usize::BITS - (n - 1).leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sinc_zero_is_one() {
        assert_relative_eq!(sinc(0.0), 1.0);
    }

    #[test]
    fn reflect_padding_no_repeat() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let padded = pad_reflect(&data, 2);
        // [3, 2, 1, 2, 3, 4, 3, 2]
        assert_eq!(padded, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn matmul_shape_mismatch_is_error() {
        let a = DenseMatrix::zeros(2, 3);
        let b = DenseMatrix::zeros(4, 5);
        assert!(matmul(&a, &b, MatMulKind::AB).is_err());
    }

    #[test]
    fn matmul_identity() {
        let mut a = DenseMatrix::zeros(2, 2);
        a.data = vec![1.0, 0.0, 0.0, 1.0];
        let mut b = DenseMatrix::zeros(2, 2);
        b.data = vec![1.0, 2.0, 3.0, 4.0];
        let c = matmul(&a, &b, MatMulKind::AB).unwrap();
        assert_eq!(c.data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn max_with_index_basic() {
        let (v, i) = max_with_index(&[0.1, 0.9, 0.8, 0.7]);
        assert_relative_eq!(v, 0.9);
        assert_eq!(i, 1);
    }

    #[test]
    fn round_power_of_two_basic() {
        assert_eq!(round_power_of_two(1), 1);
        assert_eq!(round_power_of_two(5), 8);
        assert_eq!(round_power_of_two(16), 16);
    }

    #[test]
    fn elementwise_abs_and_neg() {
        let mut data = vec![-1.0f32, 2.0, -3.0];
        abs(&mut data);
        assert_eq!(data, vec![1.0, 2.0, 3.0]);
        neg(&mut data);
        assert_eq!(data, vec![-1.0, -2.0, -3.0]);
    }

    #[test]
    fn elementwise_into_variant_preserves_source() {
        let data = [1.0f32, 4.0, 9.0];
        let mut out = [0.0f32; 3];
        sqrt_into(&data, &mut out);
        assert_eq!(out, [1.0, 2.0, 3.0]);
        assert_eq!(data, [1.0, 4.0, 9.0]);
    }

    #[test]
    fn elementwise_log_family() {
        let mut data = vec![1.0f32, std::f32::consts::E, 100.0];
        log(&mut data[..2]);
        assert_relative_eq!(data[0], 0.0);
        assert_relative_eq!(data[1], 1.0, epsilon = 1e-5);
        log10(&mut data[2..]);
        assert_relative_eq!(data[2], 2.0, epsilon = 1e-5);
    }
}
