//! Parameterized window generation.
//!
//! Every window has a symmetric form (length `N`) and a periodic form
//! (computed at length `N+1` and the last sample dropped — the
//! convention used when a window feeds an FFT of the same length).

use crate::error::AuroraError;
use crate::numeric::{PI, TAU};

/// Window family selector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowType {
    Hann,
    Hamm,
    Blackman,
    Kaiser,
    Gauss,
    Bartlett,
    Flattop,
    Triang,
    BlackmanHarris,
    BlackmanNuttall,
    BartlettHann,
    Bohman,
    Tukey,
}

/// Symmetric (`true`) vs periodic (`false`) window shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowShape {
    Symmetric,
    Periodic,
}

/// Extra shape parameters a handful of windows need. Each field is
/// `None` to request that window's documented default.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowParams {
    /// Kaiser beta, default 5.0.
    pub kaiser_beta: Option<f64>,
    /// Gauss alpha, default 2.5.
    pub gauss_alpha: Option<f64>,
    /// Tukey alpha in `[0, 1]`, default 0.5.
    pub tukey_alpha: Option<f64>,
}

/// Generate `length` samples of `kind` in the requested shape.
pub fn generate(
    kind: WindowType,
    length: usize,
    shape: WindowShape,
    params: WindowParams,
) -> Result<Vec<f32>, AuroraError> {
    if length == 0 {
        return Err(AuroraError::param_range("length", "window length must be > 0"));
    }
    if length == 1 {
        return Ok(vec![1.0]);
    }
    let n = match shape {
        WindowShape::Symmetric => length,
        WindowShape::Periodic => length + 1,
    };
    let mut full = match kind {
        WindowType::Hann => cosine_sum(n, &[0.5, 0.5]),
        WindowType::Hamm => cosine_sum(n, &[0.54, 0.46]),
        WindowType::Blackman => cosine_sum(n, &[0.42, 0.5, 0.08]),
        WindowType::BlackmanHarris => cosine_sum(n, &[0.35875, 0.48829, 0.14128, 0.01168]),
        WindowType::BlackmanNuttall => {
            cosine_sum(n, &[0.3635819, 0.4891775, 0.1365995, 0.0106411])
        }
        WindowType::Flattop => cosine_sum(
            n,
            &[
                0.21557895,
                0.41663158,
                0.277263158,
                0.083578947,
                0.006947368,
            ],
        ),
        WindowType::Bartlett => bartlett(n),
        WindowType::Triang => triang(n),
        WindowType::BartlettHann => bartlett_hann(n),
        WindowType::Bohman => bohman(n),
        WindowType::Kaiser => kaiser(n, params.kaiser_beta.unwrap_or(5.0)),
        WindowType::Gauss => gauss(n, params.gauss_alpha.unwrap_or(2.5)),
        WindowType::Tukey => {
            let alpha = params.tukey_alpha.unwrap_or(0.5);
            if !(0.0..=1.0).contains(&alpha) {
                return Err(AuroraError::param_range(
                    "tukey_alpha",
                    "tukey alpha must lie in [0, 1]",
                ));
            }
            tukey(n, alpha)
        }
    };
    if shape == WindowShape::Periodic {
        full.truncate(length);
    }
    Ok(full)
}

/// A generalized cosine-sum window: `sum_k (-1)^k a_k cos(2*pi*k*n/(N-1))`.
fn cosine_sum(n: usize, coefs: &[f64]) -> Vec<f32> {
    let denom = (n - 1).max(1) as f64;
    (0..n)
        .map(|i| {
            let mut acc = coefs[0];
            for (k, a) in coefs.iter().enumerate().skip(1) {
                let sign = if k % 2 == 1 { -1.0 } else { 1.0 };
                acc += sign * a * (TAU * k as f64 * i as f64 / denom).cos();
            }
            acc as f32
        })
        .collect()
}

/// Bartlett (zero-endpoint triangular) window.
fn bartlett(n: usize) -> Vec<f32> {
    let denom = (n - 1).max(1) as f64;
    (0..n)
        .map(|i| (1.0 - (2.0 * i as f64 / denom - 1.0).abs()) as f32)
        .collect()
}

/// Triangular window without forcing the endpoints to zero.
fn triang(n: usize) -> Vec<f32> {
    let center = (n - 1) as f64 / 2.0;
    let half = if n % 2 == 0 {
        n as f64 / 2.0
    } else {
        (n + 1) as f64 / 2.0
    };
    (0..n)
        .map(|i| (1.0 - ((i as f64 - center) / half).abs()) as f32)
        .collect()
}

fn bartlett_hann(n: usize) -> Vec<f32> {
    let denom = (n - 1).max(1) as f64;
    (0..n)
        .map(|i| {
            let x = i as f64 / denom;
            (0.62 - 0.48 * (x - 0.5).abs() - 0.38 * (TAU * x).cos()) as f32
        })
        .collect()
}

fn bohman(n: usize) -> Vec<f32> {
    let denom = (n - 1).max(1) as f64;
    (0..n)
        .map(|i| {
            let x = (2.0 * i as f64 / denom - 1.0).abs();
            if x >= 1.0 {
                0.0
            } else {
                ((1.0 - x) * (PI * x).cos() + (1.0 / PI) * (PI * x).sin()) as f32
            }
        })
        .collect()
}

/// Modified Bessel function of the first kind, order zero, truncated to
/// a 16-term series (matches the precision the original design uses).
pub fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let b = x / 2.0;
    let mut num = 1.0;
    let mut den = 1.0;
    for k in 1..16 {
        num *= b;
        den *= k as f64;
        let term = num / den;
        sum += term * term;
    }
    sum
}

fn kaiser(n: usize, beta: f64) -> Vec<f32> {
    let denom = (n - 1).max(1) as f64;
    let i0_beta = bessel_i0(beta);
    (0..n)
        .map(|i| {
            let r = 2.0 * i as f64 / denom - 1.0;
            let arg = beta * (1.0 - r * r).max(0.0).sqrt();
            (bessel_i0(arg) / i0_beta) as f32
        })
        .collect()
}

fn gauss(n: usize, alpha: f64) -> Vec<f32> {
    let center = (n - 1) as f64 / 2.0;
    let sigma = center / alpha.max(1e-9);
    (0..n)
        .map(|i| {
            let x = (i as f64 - center) / sigma;
            (-0.5 * x * x).exp() as f32
        })
        .collect()
}

/// Tukey (tapered cosine) window. Degenerates to rectangular at
/// `alpha = 0` and to a symmetric Hann window at `alpha = 1`.
fn tukey(n: usize, alpha: f64) -> Vec<f32> {
    if alpha == 0.0 {
        return vec![1.0; n];
    }
    let denom = (n - 1).max(1) as f64;
    let taper = alpha * denom / 2.0;
    (0..n)
        .map(|i| {
            let x = i as f64;
            if x < taper {
                (0.5 * (1.0 + (PI * (x / taper - 1.0)).cos())) as f32
            } else if x > denom - taper {
                (0.5 * (1.0 + (PI * ((x - denom) / taper + 1.0)).cos())) as f32
            } else {
                1.0
            }
        })
        .collect()
}

/// Given passband/stopband edge frequencies (as fractions of Nyquist)
/// and a target attenuation `atten_db`, returns the FIR order estimate
/// and a Kaiser beta suitable for that attenuation.
pub fn kaiser_order(w1: f64, w2: f64, atten_db: f64) -> Result<(usize, f64), AuroraError> {
    if !(0.0..1.0).contains(&w1) || w1 <= 0.0 || !(0.0..1.0).contains(&w2) || w2 <= 0.0 {
        return Err(AuroraError::param_range(
            "w1/w2",
            "edge frequencies must lie in (0, 1)",
        ));
    }
    let order = ((atten_db - 7.95) / (2.285 * PI * (w1 - w2).abs())).ceil();
    let order = order.max(0.0) as usize;
    let beta = if atten_db > 50.0 {
        0.1102 * (atten_db - 8.7)
    } else if atten_db >= 21.0 {
        0.5842 * (atten_db - 21.0).powf(0.4) + 0.07886 * (atten_db - 21.0)
    } else {
        0.0
    };
    Ok((order, beta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tukey_alpha_zero_is_rectangular() {
        let w = generate(
            WindowType::Tukey,
            16,
            WindowShape::Symmetric,
            WindowParams {
                tukey_alpha: Some(0.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(w.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn tukey_alpha_one_matches_hann() {
        let tukey_w = generate(
            WindowType::Tukey,
            16,
            WindowShape::Symmetric,
            WindowParams {
                tukey_alpha: Some(1.0),
                ..Default::default()
            },
        )
        .unwrap();
        let hann_w = generate(
            WindowType::Hann,
            16,
            WindowShape::Symmetric,
            WindowParams::default(),
        )
        .unwrap();
        for (a, b) in tukey_w.iter().zip(hann_w.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn hann_is_symmetric_about_center() {
        let w = generate(WindowType::Hann, 17, WindowShape::Symmetric, WindowParams::default())
            .unwrap();
        for i in 0..w.len() {
            assert_relative_eq!(w[i], w[w.len() - 1 - i], epsilon = 1e-6);
        }
    }

    #[test]
    fn periodic_drops_last_of_length_plus_one() {
        let sym = generate(WindowType::Hann, 8, WindowShape::Periodic, WindowParams::default())
            .unwrap();
        assert_eq!(sym.len(), 8);
    }

    #[test]
    fn kaiser_order_estimate_matches_classic_formula() {
        let (order, beta) = kaiser_order(0.3, 0.4, 60.0).unwrap();
        assert!(order > 0);
        assert_relative_eq!(beta, 0.1102 * (60.0 - 8.7), epsilon = 1e-9);
    }
}
