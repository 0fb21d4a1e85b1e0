//! Analytic wavelet kernels in the frequency domain, shared by CWT and
//! (for PWT) substituted by the auditory filterbank instead.

use crate::error::{AuroraError, AuroraResult};
use num_complex::Complex32;

/// Wavelet family. Each carries its own default `(gamma, beta)` shape
/// parameters, overridable at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaveletType {
    Morse,
    Morlet,
    Bump,
    Paul,
    Dog,
    Mexican,
    Hermit,
    Ricker,
}

impl WaveletType {
    fn defaults(self) -> (f64, f64) {
        match self {
            WaveletType::Morse => (3.0, 20.0),
            WaveletType::Morlet => (6.0, 2.0),
            WaveletType::Bump => (5.0, 0.6),
            WaveletType::Paul => (4.0, 0.0),
            WaveletType::Dog => (2.0, 2.0),
            WaveletType::Mexican => (2.0, 2.0),
            WaveletType::Hermit => (5.0, 2.0),
            WaveletType::Ricker => (4.0, 0.0),
        }
    }
}

/// `num x fftLength` real kernels in the frequency domain, one row per
/// band, plus the center frequencies and scales used to build them.
pub struct CwtFilterBank {
    pub num: usize,
    pub fft_length: usize,
    pub wavelet: WaveletType,
    pub gamma: f64,
    pub beta: f64,
    pub center_fre: Vec<f64>,
    pub scale: Vec<f64>,
    pub kernel: Vec<f32>,
}

impl CwtFilterBank {
    pub fn new(
        fft_length: usize,
        samplate: u32,
        wavelet: WaveletType,
        center_freqs: &[f64],
        gamma: Option<f64>,
        beta: Option<f64>,
    ) -> AuroraResult<Self> {
        if center_freqs.is_empty() {
            return Err(AuroraError::param_range("num", "band count must be > 0"));
        }
        let (def_gamma, def_beta) = wavelet.defaults();
        let mut gamma = gamma.unwrap_or(def_gamma);
        let beta = beta.unwrap_or(def_beta);
        if matches!(wavelet, WaveletType::Dog) {
            gamma = (gamma / 2.0).round() * 2.0;
        }

        let num = center_freqs.len();
        // The wavelet's own characteristic peak frequency, not the band
        // target frequency `f_k` used below to derive the scale.
        let cf = match wavelet {
            WaveletType::Morse => (beta / gamma).powf(1.0 / gamma),
            _ => 1.0,
        };
        let scale: Vec<f64> = center_freqs
            .iter()
            .map(|&f| cf / (f / samplate as f64 * std::f64::consts::TAU))
            .collect();

        let mut kernel = vec![0.0f32; num * fft_length];
        for k in 0..num {
            let s = scale[k];
            for n in 0..fft_length {
                let omega = mirrored_omega(n, fft_length);
                let x = s * omega;
                kernel[k * fft_length + n] = kernel_value(wavelet, x, cf, gamma, beta) as f32;
            }
        }

        #[cfg(feature = "debug-log")]
        log::debug!("built cwt kernel bank: num={num} wavelet={wavelet:?} fft_length={fft_length}");

        Ok(Self {
            num,
            fft_length,
            wavelet,
            gamma,
            beta,
            center_fre: center_freqs.to_vec(),
            scale,
            kernel,
        })
    }

    pub fn row(&self, k: usize) -> &[f32] {
        &self.kernel[k * self.fft_length..(k + 1) * self.fft_length]
    }

    /// `jω ⊙ ψ̂_k`, the phase-rate companion kernel used for
    /// synchrosqueezing.
    pub fn derivative_row(&self, k: usize) -> Vec<Complex32> {
        let row = self.row(k);
        (0..self.fft_length)
            .map(|n| {
                let omega = signed_omega(n, self.fft_length);
                Complex32::new(0.0, (omega * row[n] as f64) as f32)
            })
            .collect()
    }
}

/// `ω_n` folded into `[0, π]`, mirrored about `π` past Nyquist — the
/// nonnegative argument the kernel table is defined over.
fn mirrored_omega(n: usize, fft_length: usize) -> f64 {
    let raw = std::f64::consts::TAU * n as f64 / fft_length as f64;
    if n * 2 <= fft_length {
        raw
    } else {
        std::f64::consts::TAU - raw
    }
}

/// `ω_n` wrapped into `(-π, π]`, the signed digital angular frequency
/// used for the `jω` derivative operator.
fn signed_omega(n: usize, fft_length: usize) -> f64 {
    let raw = std::f64::consts::TAU * n as f64 / fft_length as f64;
    if n * 2 <= fft_length {
        raw
    } else {
        raw - std::f64::consts::TAU
    }
}

fn factorial(n: u32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

/// Lanczos approximation, accurate enough for the half-integer
/// arguments the DOG normalization constant needs.
fn gamma_fn(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma_fn(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = COEFFS[0];
        let t = x + G + 0.5;
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        (std::f64::consts::TAU).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}

fn kernel_value(wavelet: WaveletType, x: f64, cf: f64, gamma: f64, beta: f64) -> f64 {
    match wavelet {
        WaveletType::Morse => {
            if x <= 0.0 {
                0.0
            } else {
                let lead = -beta * cf.ln() + cf.powf(gamma);
                let tail = beta * x.abs().ln() - x.abs().powf(gamma);
                2.0 * (lead + tail).exp()
            }
        }
        WaveletType::Morlet => 2.0 * (-((x - cf).powi(2)) / beta).exp(),
        WaveletType::Bump => {
            let d = (x - cf) / beta;
            if d.abs() >= 1.0 {
                0.0
            } else {
                2.0 * std::f64::consts::E * (-1.0 / (1.0 - d * d)).exp()
            }
        }
        WaveletType::Paul => {
            let m = gamma.round() as u32;
            let km = 2f64.powf(gamma) / (gamma * factorial(2 * m - 1)).sqrt();
            if x <= 0.0 {
                0.0
            } else {
                km * x.powf(gamma) * (-x).exp()
            }
        }
        WaveletType::Dog | WaveletType::Mexican => {
            let m = gamma.round() as i64;
            let sign = (-1.0f64).powi((m / 2 + 1) as i32);
            let km = sign / gamma_fn(gamma + 0.5).sqrt();
            km * x.powf(gamma) * (-(x * x) / beta).exp()
        }
        WaveletType::Hermit => {
            let kg = 2.0 / (gamma.sqrt() * std::f64::consts::PI.powf(0.25));
            let d = x - gamma;
            kg * d * (1.0 + d) * (-(d * d) / beta).exp()
        }
        WaveletType::Ricker => {
            (2.0 / std::f64::consts::PI.sqrt()) * x * x / gamma.powi(3) * (-(x * x) / (gamma * gamma)).exp()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morlet_kernel_peaks_near_center_frequency() {
        let bank = CwtFilterBank::new(
            1024,
            16000,
            WaveletType::Morlet,
            &[100.0, 500.0, 2000.0],
            None,
            None,
        )
        .unwrap();
        for k in 0..bank.num {
            let row = bank.row(k);
            let (peak_val, peak_idx) = row
                .iter()
                .enumerate()
                .fold((f32::MIN, 0), |(bv, bi), (i, &v)| {
                    if v > bv { (v, i) } else { (bv, bi) }
                });
            assert!(peak_val > 0.0);
            assert!(peak_idx < bank.fft_length);
        }
    }

    #[test]
    fn dog_gamma_forced_even() {
        let bank = CwtFilterBank::new(
            512,
            16000,
            WaveletType::Dog,
            &[200.0],
            Some(3.0),
            None,
        )
        .unwrap();
        assert_eq!(bank.gamma % 2.0, 0.0);
    }

    #[test]
    fn bump_kernel_vanishes_outside_support() {
        let bank = CwtFilterBank::new(256, 16000, WaveletType::Bump, &[300.0], None, None).unwrap();
        let row = bank.row(0);
        assert!(row.iter().any(|&v| v == 0.0));
    }
}
