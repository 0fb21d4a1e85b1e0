//! Streaming pitch estimators sharing the tail-buffer frame engine and
//! a common peak-pick routine, plus a supplemental harmonic-ratio
//! voicing measure.

use crate::error::AuroraResult;
use crate::fft::FftPlanCache;
use crate::numeric::lerp_at;
use crate::streaming::StreamingFrameEngine;
use crate::window::{self, WindowParams, WindowShape, WindowType};
use num_complex::Complex32;

#[derive(Clone, Debug)]
pub struct PitchOptions {
    pub samplate: u32,
    pub low_fre: f64,
    pub high_fre: f64,
    pub radix2_exp: u32,
    pub slide_length: Option<usize>,
    pub window_type: WindowType,
    pub harmonic_count: usize,
    pub is_continue: bool,
}

impl Default for PitchOptions {
    fn default() -> Self {
        Self {
            samplate: 32000,
            low_fre: 32.0,
            high_fre: 2000.0,
            radix2_exp: 12,
            slide_length: None,
            window_type: WindowType::Hann,
            harmonic_count: 5,
            is_continue: false,
        }
    }
}

/// Finds up to `num` local maxima in `data[start..=end]`, masking a
/// `distance`-wide neighborhood around each pick to `NaN` before
/// looking for the next one so repeated picks land on distinct peaks.
pub fn peak_pick(data: &mut [f32], start: usize, end: usize, num: usize, distance: usize) -> Vec<usize> {
    let end = end.min(data.len().saturating_sub(1));
    let mut picks = Vec::with_capacity(num);
    for _ in 0..num {
        let mut best = f32::NEG_INFINITY;
        let mut best_idx = None;
        for i in start..=end {
            let v = data[i];
            if v.is_finite() && v > best {
                best = v;
                best_idx = Some(i);
            }
        }
        match best_idx {
            Some(idx) => {
                picks.push(idx);
                let lo = idx.saturating_sub(distance).max(start);
                let hi = (idx + distance).min(end);
                for v in &mut data[lo..=hi] {
                    *v = f32::NAN;
                }
            }
            None => break,
        }
    }
    picks
}

fn lag_window(samplate: u32, low_fre: f64, high_fre: f64) -> (usize, usize) {
    let lo = (samplate as f64 / high_fre).ceil().max(1.0) as usize;
    let hi = (samplate as f64 / low_fre).ceil().max(1.0) as usize;
    (lo, hi)
}

/// Real cepstrum pitch estimator.
pub struct PitchCep {
    fft_length: usize,
    samplate: u32,
    low_fre: f64,
    high_fre: f64,
    window: Vec<f32>,
    engine: StreamingFrameEngine,
    fft: FftPlanCache,
}

impl PitchCep {
    pub fn new(opts: PitchOptions) -> AuroraResult<Self> {
        let fft_length = 1usize << opts.radix2_exp;
        let slide_length = opts.slide_length.unwrap_or(fft_length / 4);
        let window = window::generate(opts.window_type, fft_length, WindowShape::Symmetric, WindowParams::default())?;
        Ok(Self {
            fft_length,
            samplate: opts.samplate,
            low_fre: opts.low_fre,
            high_fre: opts.high_fre,
            window,
            engine: StreamingFrameEngine::new(fft_length, slide_length, opts.is_continue)?,
            fft: FftPlanCache::new(),
        })
    }

    pub fn process(&mut self, data: &[f32]) -> Vec<f32> {
        let frames = self.engine.process(data);
        frames.iter().map(|f| self.estimate(f)).collect()
    }

    fn estimate(&mut self, frame: &[f32]) -> f32 {
        let mut buf = vec![Complex32::new(0.0, 0.0); self.fft_length * 2];
        for i in 0..self.fft_length {
            buf[i] = Complex32::new(frame[i] * self.window[i], 0.0);
        }
        self.fft.fft(&mut buf);
        for v in buf.iter_mut() {
            let mag_sq = v.norm_sqr().max(1e-20);
            *v = Complex32::new(mag_sq.ln(), 0.0);
        }
        self.fft.ifft(&mut buf);
        let mut cepstrum: Vec<f32> = buf.iter().map(|c| c.re).collect();
        let (lo, hi) = lag_window(self.samplate, self.low_fre, self.high_fre);
        let picks = peak_pick(&mut cepstrum, lo, hi, 1, 1);
        picks
            .first()
            .map(|&k| self.samplate as f32 / (k as f32 + 1.0))
            .unwrap_or(0.0)
    }
}

/// Normalized-autocorrelation pitch estimator.
pub struct PitchNcf {
    fft_length: usize,
    samplate: u32,
    low_fre: f64,
    high_fre: f64,
    window: Vec<f32>,
    engine: StreamingFrameEngine,
    fft: FftPlanCache,
}

impl PitchNcf {
    pub fn new(opts: PitchOptions) -> AuroraResult<Self> {
        let fft_length = 1usize << opts.radix2_exp;
        let slide_length = opts.slide_length.unwrap_or(fft_length / 4);
        let window = window::generate(opts.window_type, fft_length, WindowShape::Symmetric, WindowParams::default())?;
        Ok(Self {
            fft_length,
            samplate: opts.samplate,
            low_fre: opts.low_fre,
            high_fre: opts.high_fre,
            window,
            engine: StreamingFrameEngine::new(fft_length, slide_length, opts.is_continue)?,
            fft: FftPlanCache::new(),
        })
    }

    pub fn process(&mut self, data: &[f32]) -> Vec<f32> {
        let frames = self.engine.process(data);
        frames.iter().map(|f| self.estimate(f)).collect()
    }

    fn estimate(&mut self, frame: &[f32]) -> f32 {
        let mut buf = vec![Complex32::new(0.0, 0.0); self.fft_length * 2];
        for i in 0..self.fft_length {
            buf[i] = Complex32::new(frame[i] * self.window[i], 0.0);
        }
        self.fft.fft(&mut buf);
        for v in buf.iter_mut() {
            *v = Complex32::new(v.norm_sqr(), 0.0);
        }
        self.fft.ifft(&mut buf);
        let (lo, hi) = lag_window(self.samplate, self.low_fre, self.high_fre);
        let hi = hi.min(buf.len() - 1);
        let r0 = buf[0].re.max(1e-20);
        let r_max = buf[lo..=hi].iter().map(|c| c.re).fold(0.0f32, f32::max).max(1e-20);
        let denom = (r0 * r_max).sqrt().max(1e-20);
        let mut normalized: Vec<f32> = buf.iter().map(|c| c.re / denom).collect();
        let picks = peak_pick(&mut normalized, lo, hi, 1, 1);
        picks
            .first()
            .map(|&k| self.samplate as f32 / (k as f32 + 1.0))
            .unwrap_or(0.0)
    }
}

fn interp_mag(mag: &[f32], samplate: u32, fft_length: usize, f_hz: f64) -> f32 {
    let bin = f_hz * fft_length as f64 / samplate as f64;
    lerp_at(mag, bin)
}

struct HarmonicCore {
    fft_length: usize,
    samplate: u32,
    low_fre: f64,
    high_fre: f64,
    harmonic_count: usize,
    window: Vec<f32>,
    engine: StreamingFrameEngine,
    fft: FftPlanCache,
}

impl HarmonicCore {
    fn new(opts: PitchOptions) -> AuroraResult<Self> {
        let fft_length = 1usize << opts.radix2_exp;
        let slide_length = opts.slide_length.unwrap_or(fft_length / 4);
        let window = window::generate(opts.window_type, fft_length, WindowShape::Symmetric, WindowParams::default())?;
        Ok(Self {
            fft_length,
            samplate: opts.samplate,
            low_fre: opts.low_fre,
            high_fre: opts.high_fre,
            harmonic_count: opts.harmonic_count,
            window,
            engine: StreamingFrameEngine::new(fft_length, slide_length, opts.is_continue)?,
            fft: FftPlanCache::new(),
        })
    }

    fn magnitude(&mut self, frame: &[f32]) -> Vec<f32> {
        let windowed: Vec<f32> = frame.iter().zip(self.window.iter()).map(|(a, b)| a * b).collect();
        let mut out = vec![Complex32::new(0.0, 0.0); self.fft_length / 2 + 1];
        self.fft.real_fft(&windowed, &mut out);
        out.iter().map(|c| c.norm()).collect()
    }

    fn harmonic_count_for_frame(&self) -> usize {
        let h_max = (self.samplate as f64 / (self.high_fre + 1.0)).floor().max(1.0) as usize;
        self.harmonic_count.min(h_max)
    }
}

/// Harmonic product spectrum pitch estimator.
pub struct PitchHps {
    core: HarmonicCore,
}

impl PitchHps {
    pub fn new(opts: PitchOptions) -> AuroraResult<Self> {
        Ok(Self { core: HarmonicCore::new(opts)? })
    }

    pub fn process(&mut self, data: &[f32]) -> Vec<f32> {
        let frames = self.core.engine.process(data);
        frames.iter().map(|f| self.estimate(f)).collect()
    }

    fn estimate(&mut self, frame: &[f32]) -> f32 {
        let mag = self.core.magnitude(frame);
        let h = self.core.harmonic_count_for_frame();
        let lo = self.core.low_fre.ceil() as i64;
        let hi = self.core.high_fre.floor() as i64;
        if hi < lo {
            return 0.0;
        }
        let mut acc: Vec<f32> = (lo..=hi)
            .map(|f| {
                (0..h)
                    .map(|k| interp_mag(&mag, self.core.samplate, self.core.fft_length, f as f64 * (k as f64 + 1.0)))
                    .product()
            })
            .collect();
        let acc_len = acc.len();
        let picks = peak_pick(&mut acc, 0, acc_len - 1, 1, 1);
        picks.first().map(|&i| (lo + i as i64) as f32).unwrap_or(0.0)
    }
}

/// Log harmonic sum pitch estimator.
pub struct PitchLhs {
    core: HarmonicCore,
}

impl PitchLhs {
    pub fn new(opts: PitchOptions) -> AuroraResult<Self> {
        Ok(Self { core: HarmonicCore::new(opts)? })
    }

    pub fn process(&mut self, data: &[f32]) -> Vec<f32> {
        let frames = self.core.engine.process(data);
        frames.iter().map(|f| self.estimate(f)).collect()
    }

    fn estimate(&mut self, frame: &[f32]) -> f32 {
        let mag = self.core.magnitude(frame);
        let h = self.core.harmonic_count_for_frame();
        let lo = self.core.low_fre.ceil() as i64;
        let hi = self.core.high_fre.floor() as i64;
        if hi < lo {
            return 0.0;
        }
        let mut acc: Vec<f32> = (lo..=hi)
            .map(|f| {
                (0..h)
                    .map(|k| {
                        interp_mag(&mag, self.core.samplate, self.core.fft_length, f as f64 * (k as f64 + 1.0))
                            .max(1e-12)
                            .ln()
                    })
                    .sum()
            })
            .collect();
        let acc_len = acc.len();
        let picks = peak_pick(&mut acc, 0, acc_len - 1, 1, 1);
        picks.first().map(|&i| (lo + i as i64) as f32).unwrap_or(0.0)
    }
}

/// Autocorrelation-based voicing confidence: the ratio of the largest
/// autocorrelation peak outside the zero lag to the zero-lag energy,
/// within the plausible pitch-period lag range.
pub fn harmonic_ratio(frame: &[f32], samplate: u32, low_fre: f64, high_fre: f64) -> f32 {
    let n = frame.len();
    let mut fft = FftPlanCache::new();
    let mut buf: Vec<Complex32> = frame.iter().map(|&v| Complex32::new(v, 0.0)).collect();
    buf.resize(n * 2, Complex32::new(0.0, 0.0));
    fft.fft(&mut buf);
    for v in buf.iter_mut() {
        *v = Complex32::new(v.norm_sqr(), 0.0);
    }
    fft.ifft(&mut buf);
    let r0 = buf[0].re.max(1e-20);
    let (lo, hi) = lag_window(samplate, low_fre, high_fre);
    let hi = hi.min(buf.len() - 1);
    if hi < lo {
        return 0.0;
    }
    let peak = buf[lo..=hi].iter().map(|c| c.re).fold(0.0f32, f32::max);
    (peak / r0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_frame(freq: f64, samplate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (std::f64::consts::TAU * freq * i as f64 / samplate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn peak_pick_masks_neighborhood() {
        let mut data = vec![0.0f32, 1.0, 0.9, 0.0, 0.0, 0.8, 0.0];
        let picks = peak_pick(&mut data, 0, 6, 2, 1);
        assert_eq!(picks, vec![1, 5]);
    }

    #[test]
    fn cep_recovers_approximate_pitch_of_pure_tone() {
        let mut cep = PitchCep::new(PitchOptions {
            radix2_exp: 11,
            low_fre: 80.0,
            high_fre: 400.0,
            ..Default::default()
        })
        .unwrap();
        let data = sine_frame(220.0, 32000, 2048 * 3);
        let freqs = cep.process(&data);
        assert!(!freqs.is_empty());
        for &f in &freqs {
            if f > 0.0 {
                assert!((f - 220.0).abs() < 40.0, "got {f}");
            }
        }
    }

    #[test]
    fn harmonic_ratio_is_high_for_periodic_signal() {
        let data = sine_frame(150.0, 32000, 4096);
        let ratio = harmonic_ratio(&data, 32000, 60.0, 400.0);
        assert!(ratio > 0.5);
    }
}
