//! Non-stationary Gabor transform: per-band adaptive-length windows
//! extracted (with wrap-around) from a single FFT, inverse-transformed
//! at their own small length, then resampled onto a common time grid.

use crate::error::{AuroraError, AuroraResult};
use crate::fft::FftPlanCache;
use crate::filterbank::auditory::Normalization;
use crate::filterbank::nsgt::{NsgtFilterBank, NsgtFilterBankType};
use crate::freq_axis::FreqAxis;
use crate::transform::ComplexMatrix;
use crate::window::WindowType;
use num_complex::Complex32;

#[derive(Clone, Debug)]
pub struct NsgtOptions {
    pub num: usize,
    pub radix2_exp: u32,
    pub samplate: u32,
    pub low_fre: f64,
    pub high_fre: f64,
    pub bin_per_octave: u32,
    pub min_length: usize,
    pub bank_type: NsgtFilterBankType,
    pub scale: FreqAxis,
    pub style: WindowType,
    pub normal: Normalization,
}

impl Default for NsgtOptions {
    fn default() -> Self {
        let bin_per_octave = 12;
        Self {
            num: 84,
            radix2_exp: 12,
            samplate: 32000,
            low_fre: 32.0,
            high_fre: 16000.0,
            bin_per_octave,
            min_length: 3,
            bank_type: NsgtFilterBankType::Efficient,
            scale: FreqAxis::Octave { bins_per_octave: bin_per_octave },
            style: WindowType::Hann,
            normal: Normalization::BandWidth,
        }
    }
}

/// Non-stationary Gabor transform.
pub struct Nsgt {
    fft_length: usize,
    samplate: u32,
    bank: NsgtFilterBank,
    fft: FftPlanCache,
}

impl Nsgt {
    pub fn new(opts: NsgtOptions) -> AuroraResult<Self> {
        if !(1..=30).contains(&opts.radix2_exp) {
            return Err(AuroraError::param_range("radix2_exp", "must lie in 1..=30"));
        }
        let fft_length = 1usize << opts.radix2_exp;
        let bank = NsgtFilterBank::new(
            opts.num,
            fft_length,
            opts.samplate,
            opts.low_fre,
            opts.high_fre,
            opts.scale,
            opts.min_length,
            opts.bank_type,
            opts.style,
            opts.normal,
        )?;
        Ok(Self {
            fft_length,
            samplate: opts.samplate,
            bank,
            fft: FftPlanCache::new(),
        })
    }

    pub fn num(&self) -> usize {
        self.bank.num
    }

    /// Transforms one frame of exactly `fftLength` samples into a
    /// `num x maxLength` time-frequency matrix (each band resampled
    /// onto `maxLength` equispaced points over its own time grid).
    pub fn transform(&mut self, data: &[f32]) -> AuroraResult<ComplexMatrix> {
        if data.len() != self.fft_length {
            return Err(AuroraError::ShapeMismatch {
                expected: (1, self.fft_length),
                actual: (1, data.len()),
            });
        }
        let mut spectrum: Vec<Complex32> = data.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.fft.fft(&mut spectrum);

        let num = self.bank.num;
        let t_total = self.fft_length as f64 / self.samplate as f64;
        let grid_len = self.bank.max_length.max(1);
        let mut out = ComplexMatrix::zeros(num, grid_len);

        for k in 0..num {
            let l = self.bank.length[k];
            let center = self.bank.edges.bin_band[k + 1] as i64;
            let window = self.bank.band(k);

            let mut seg = vec![Complex32::new(0.0, 0.0); l];
            for (i, slot) in seg.iter_mut().enumerate() {
                let rel = i as i64 - l as i64 / 2;
                let bin = (center + rel).rem_euclid(self.fft_length as i64) as usize;
                *slot = spectrum[bin] * window[i];
            }
            let band_time = self.fft.idft(&seg);

            let delta_k = t_total / (l as f64 + (l as i64 - 2).max(0) as f64);
            let span = t_total + 2.0 * delta_k;
            let row = out.row_mut(k);
            for (j, slot) in row.iter_mut().enumerate() {
                let t = -delta_k
                    + span * j as f64 / (grid_len as f64 - 1.0).max(1.0);
                let frac = (t / t_total).rem_euclid(1.0);
                let pos = frac * l as f64;
                let idx0 = pos.floor() as usize % l;
                let idx1 = (idx0 + 1) % l;
                let a = (pos - pos.floor()) as f32;
                let re = band_time[idx0].re * (1.0 - a) + band_time[idx1].re * a;
                let im = band_time[idx0].im * (1.0 - a) + band_time[idx1].im * a;
                *slot = Complex32::new(re, im);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nsgt_transform_produces_num_by_max_length_matrix() {
        let mut nsgt = Nsgt::new(NsgtOptions {
            num: 16,
            radix2_exp: 10,
            ..Default::default()
        })
        .unwrap();
        let data: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.02).sin()).collect();
        let max_length = nsgt.bank.max_length;
        let out = nsgt.transform(&data).unwrap();
        assert_eq!(out.rows, 16);
        assert_eq!(out.cols, max_length);
    }

    #[test]
    fn nsgt_rejects_wrong_length_input() {
        let mut nsgt = Nsgt::new(NsgtOptions {
            num: 8,
            radix2_exp: 8,
            ..Default::default()
        })
        .unwrap();
        let data = vec![0.0f32; 10];
        assert!(matches!(
            nsgt.transform(&data),
            Err(AuroraError::ShapeMismatch { .. })
        ));
    }
}
