//! Phase vocoder and the time-stretch / pitch-shift operators built on
//! top of it: STFT, per-bin magnitude interpolation with unwrapped
//! phase advance, inverse STFT via windowed overlap-add.

use crate::error::{AuroraError, AuroraResult};
use crate::fft::FftPlanCache;
use crate::numeric::{lerp_at, PI, TAU};
use crate::transform::ComplexMatrix;
use crate::window::{self, WindowParams, WindowShape, WindowType};
use num_complex::Complex32;

/// Wraps `x` to its principal value in `[-pi, pi]`.
fn wrap(x: f64) -> f64 {
    (x + PI).rem_euclid(TAU) - PI
}

/// Operates directly on a complex half-spectrum STFT matrix (rows =
/// time frames, cols = `fftLength/2+1` frequency bins).
pub struct PhaseVocoder {
    fft_length: usize,
    slide_length: usize,
}

impl PhaseVocoder {
    pub fn new(fft_length: usize, slide_length: usize) -> Self {
        Self { fft_length, slide_length }
    }

    /// Resamples `input` in time by `rate`, producing `ceil(T/rate)`
    /// output frames with phases advanced by the unwrapped
    /// instantaneous-frequency estimate between adjacent input frames.
    pub fn process(&self, input: &ComplexMatrix, rate: f64) -> AuroraResult<ComplexMatrix> {
        if rate <= 0.0 {
            return Err(AuroraError::param_range("rate", "phase vocoder rate must be > 0"));
        }
        let bins = self.fft_length / 2 + 1;
        if input.cols != bins {
            return Err(AuroraError::ShapeMismatch {
                expected: (input.rows, bins),
                actual: (input.rows, input.cols),
            });
        }
        let t_in = input.rows;
        if t_in == 0 {
            return Ok(ComplexMatrix::zeros(0, bins));
        }
        let t_out = (t_in as f64 / rate).ceil().max(1.0) as usize;
        let mut out = ComplexMatrix::zeros(t_out, bins);

        let phi_prime: Vec<f64> = (0..bins)
            .map(|w| PI * self.slide_length as f64 * w as f64 / bins as f64)
            .collect();
        let mut phase_acc: Vec<f64> = input.row(0).iter().map(|c| c.arg() as f64).collect();

        for i in 0..t_out {
            let t_prime = i as f64 * rate;
            let k = (t_prime.floor() as usize).min(t_in - 1);
            let k1 = (k + 1).min(t_in - 1);
            let alpha = (t_prime - k as f64).clamp(0.0, 1.0) as f32;

            let row_k: Vec<Complex32> = input.row(k).to_vec();
            let row_k1: Vec<Complex32> = input.row(k1).to_vec();
            let row_out = out.row_mut(i);
            for w in 0..bins {
                let xk = row_k[w];
                let xk1 = row_k1[w];
                let mag = xk.norm() * (1.0 - alpha) + xk1.norm() * alpha;
                if i > 0 {
                    let measured = xk1.arg() as f64 - xk.arg() as f64;
                    let deviation = wrap(measured - phi_prime[w]);
                    phase_acc[w] += phi_prime[w] + deviation;
                }
                let (s, c) = phase_acc[w].sin_cos();
                row_out[w] = Complex32::new(mag * c as f32, mag * s as f32);
            }
        }
        Ok(out)
    }
}

fn hermitian_extend(half: &[Complex32], fft_length: usize) -> Vec<Complex32> {
    let mut full = vec![Complex32::new(0.0, 0.0); fft_length];
    let half_len = half.len();
    full[..half_len].copy_from_slice(half);
    for n in half_len..fft_length {
        full[n] = half[fft_length - n].conj();
    }
    full
}

#[derive(Clone, Debug)]
pub struct TimeStretchOptions {
    pub radix2_exp: u32,
    pub slide_length: Option<usize>,
    pub window_type: WindowType,
}

impl Default for TimeStretchOptions {
    fn default() -> Self {
        Self {
            radix2_exp: 12,
            slide_length: None,
            window_type: WindowType::Hann,
        }
    }
}

/// STFT -> phase vocoder -> inverse STFT.
pub struct TimeStretch {
    fft_length: usize,
    slide_length: usize,
    window: Vec<f32>,
    vocoder: PhaseVocoder,
    fft: FftPlanCache,
}

impl TimeStretch {
    pub fn new(opts: TimeStretchOptions) -> AuroraResult<Self> {
        if !(1..=30).contains(&opts.radix2_exp) {
            return Err(AuroraError::param_range("radix2_exp", "must lie in 1..=30"));
        }
        let fft_length = 1usize << opts.radix2_exp;
        let slide_length = opts.slide_length.unwrap_or(fft_length / 4);
        if slide_length == 0 {
            return Err(AuroraError::param_range("slide_length", "must be > 0"));
        }
        let window = window::generate(opts.window_type, fft_length, WindowShape::Periodic, WindowParams::default())?;
        Ok(Self {
            fft_length,
            slide_length,
            window,
            vocoder: PhaseVocoder::new(fft_length, slide_length),
            fft: FftPlanCache::new(),
        })
    }

    pub fn process(&mut self, data: &[f32], rate: f64) -> AuroraResult<Vec<f32>> {
        if data.len() < self.fft_length {
            return Err(AuroraError::param_range("data", "input shorter than one analysis frame"));
        }
        let stft_matrix = self.stft(data);
        let vocoded = self.vocoder.process(&stft_matrix, rate)?;
        Ok(self.istft(&vocoded))
    }

    fn stft(&mut self, data: &[f32]) -> ComplexMatrix {
        let time_length = (data.len() - self.fft_length) / self.slide_length + 1;
        let bins = self.fft_length / 2 + 1;
        let mut out = ComplexMatrix::zeros(time_length, bins);
        let mut windowed = vec![0.0f32; self.fft_length];
        for t in 0..time_length {
            let start = t * self.slide_length;
            for i in 0..self.fft_length {
                windowed[i] = data[start + i] * self.window[i];
            }
            self.fft.real_fft(&windowed, out.row_mut(t));
        }
        out
    }

    fn istft(&mut self, matrix: &ComplexMatrix) -> Vec<f32> {
        let frames = matrix.rows;
        let total = (frames.saturating_sub(1)) * self.slide_length + self.fft_length;
        let mut out = vec![0.0f32; total];
        let mut norm = vec![0.0f32; total];
        for t in 0..frames {
            let full = hermitian_extend(matrix.row(t), self.fft_length);
            let mut time_domain = full;
            self.fft.ifft(&mut time_domain);
            let start = t * self.slide_length;
            for i in 0..self.fft_length {
                let w = self.window[i];
                out[start + i] += time_domain[i].re * w;
                norm[start + i] += w * w;
            }
        }
        for i in 0..total {
            if norm[i] > 1e-8 {
                out[i] /= norm[i];
            }
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct PitchShiftOptions {
    pub radix2_exp: u32,
    pub slide_length: Option<usize>,
    pub window_type: WindowType,
}

impl Default for PitchShiftOptions {
    fn default() -> Self {
        Self {
            radix2_exp: 12,
            slide_length: None,
            window_type: WindowType::Hann,
        }
    }
}

/// Time stretch at `rate = 2^(-semitones/12)` followed by resampling
/// at the inverse ratio, shifting pitch while restoring duration.
pub struct PitchShift {
    stretch: TimeStretch,
}

impl PitchShift {
    pub fn new(opts: PitchShiftOptions) -> AuroraResult<Self> {
        Ok(Self {
            stretch: TimeStretch::new(TimeStretchOptions {
                radix2_exp: opts.radix2_exp,
                slide_length: opts.slide_length,
                window_type: opts.window_type,
            })?,
        })
    }

    pub fn process(&mut self, data: &[f32], semitones: f64) -> AuroraResult<Vec<f32>> {
        let rate = 2f64.powf(-semitones / 12.0);
        let stretched = self.stretch.process(data, rate)?;
        Ok(resample_linear(&stretched, 1.0 / rate))
    }
}

/// Linear-interpolation resampler: `out.len() ≈ data.len() * ratio`.
fn resample_linear(data: &[f32], ratio: f64) -> Vec<f32> {
    let out_len = ((data.len() as f64) * ratio).round().max(1.0) as usize;
    (0..out_len)
        .map(|i| lerp_at(data, i as f64 / ratio))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, samplate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f64 / samplate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn phase_vocoder_rejects_non_positive_rate() {
        let vocoder = PhaseVocoder::new(256, 64);
        let input = ComplexMatrix::zeros(4, 129);
        assert!(matches!(
            vocoder.process(&input, 0.0),
            Err(AuroraError::ParamRange { .. })
        ));
    }

    #[test]
    fn phase_vocoder_identity_rate_reproduces_frame_count() {
        let vocoder = PhaseVocoder::new(256, 64);
        let mut input = ComplexMatrix::zeros(32, 129);
        for t in 0..32 {
            for w in 0..129 {
                input.row_mut(t)[w] = Complex32::new((t as f32 + w as f32).cos(), 0.0);
            }
        }
        let out = vocoder.process(&input, 1.0).unwrap();
        assert_eq!(out.rows, 32);
    }

    #[test]
    fn time_stretch_rate_one_reproduces_signal_rms() {
        let mut stretch = TimeStretch::new(TimeStretchOptions {
            radix2_exp: 8,
            ..Default::default()
        })
        .unwrap();
        let data = sine(440.0, 32000, 4096);
        let out = stretch.process(&data, 1.0).unwrap();

        let rms = |d: &[f32]| (d.iter().map(|v| v * v).sum::<f32>() / d.len() as f32).sqrt();
        let ratio = rms(&out) / rms(&data[..out.len().min(data.len())]);
        assert!((ratio - 1.0).abs() < 0.3, "ratio={ratio}");
    }

    #[test]
    fn pitch_shift_preserves_approximate_duration() {
        let mut shifter = PitchShift::new(PitchShiftOptions {
            radix2_exp: 8,
            ..Default::default()
        })
        .unwrap();
        let data = sine(440.0, 32000, 4096);
        let out = shifter.process(&data, 3.0).unwrap();
        assert!(!out.is_empty());
    }
}
