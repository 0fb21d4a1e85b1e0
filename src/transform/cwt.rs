//! Continuous wavelet transform and its perceptual-filterbank sibling
//! PWT: reflect-pad, FFT, per-band pointwise multiply, per-band
//! inverse FFT, strip the padding back off.

use crate::error::{AuroraError, AuroraResult};
use crate::fft::FftPlanCache;
use crate::filterbank::auditory::{AuditoryFilterBank, AuditoryStyle, Normalization};
use crate::filterbank::cwt::{CwtFilterBank, WaveletType};
use crate::freq_axis::FreqAxis;
use crate::numeric::pad_reflect;
use crate::transform::{center_frequencies, reflect_pad_amount, ComplexMatrix};
use num_complex::Complex32;

#[derive(Clone, Debug)]
pub struct CwtOptions {
    pub num: usize,
    pub radix2_exp: u32,
    pub samplate: u32,
    pub low_fre: f64,
    pub high_fre: f64,
    pub bin_per_octave: u32,
    pub wavelet_type: WaveletType,
    pub scale_type: FreqAxis,
    pub gamma: Option<f64>,
    pub beta: Option<f64>,
    pub is_pad: bool,
}

impl Default for CwtOptions {
    fn default() -> Self {
        let bin_per_octave = 12;
        Self {
            num: 84,
            radix2_exp: 12,
            samplate: 32000,
            low_fre: 32.0,
            high_fre: 16000.0,
            bin_per_octave,
            wavelet_type: WaveletType::Morse,
            scale_type: FreqAxis::Octave { bins_per_octave: bin_per_octave },
            gamma: None,
            beta: None,
            is_pad: true,
        }
    }
}

/// Continuous wavelet transform.
pub struct Cwt {
    pub fft_length: usize,
    pub samplate: u32,
    pub is_pad: bool,
    kernels: CwtFilterBank,
    fft: FftPlanCache,
}

impl Cwt {
    pub fn new(opts: CwtOptions) -> AuroraResult<Self> {
        if !(1..=30).contains(&opts.radix2_exp) {
            return Err(AuroraError::param_range("radix2_exp", "must lie in 1..=30"));
        }
        let fft_length = 1usize << opts.radix2_exp;
        let nyquist = opts.samplate as f64 / 2.0;
        let centers = center_frequencies(opts.num, opts.low_fre, opts.high_fre, nyquist, opts.scale_type)?;
        let kernels = CwtFilterBank::new(
            fft_length,
            opts.samplate,
            opts.wavelet_type,
            &centers,
            opts.gamma,
            opts.beta,
        )?;
        Ok(Self {
            fft_length,
            samplate: opts.samplate,
            is_pad: opts.is_pad,
            kernels,
            fft: FftPlanCache::new(),
        })
    }

    pub fn num(&self) -> usize {
        self.kernels.num
    }

    /// Runs the forward pipeline, returning a `num x data.len()` matrix.
    pub fn transform(&mut self, data: &[f32]) -> AuroraResult<ComplexMatrix> {
        if data.is_empty() {
            return Err(AuroraError::param_range("data", "input must be non-empty"));
        }
        let (padded, start) = pad_to_fft_length(data, self.fft_length, self.is_pad);

        let mut spectrum: Vec<Complex32> = padded.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.fft.fft(&mut spectrum);

        let mut out = ComplexMatrix::zeros(self.kernels.num, data.len());
        let mut scratch = vec![Complex32::new(0.0, 0.0); self.fft_length];
        for k in 0..self.kernels.num {
            let kernel = self.kernels.row(k);
            for n in 0..self.fft_length {
                scratch[n] = spectrum[n] * kernel[n];
            }
            self.fft.ifft(&mut scratch);
            out.row_mut(k).copy_from_slice(&scratch[start..start + data.len()]);
        }
        Ok(out)
    }
}

/// Reflect-pads `data` up to `fft_length` (centered), or just
/// zero-pads/truncates when `is_pad` is false. Returns the padded
/// buffer and the start offset of the original data within it.
fn pad_to_fft_length(data: &[f32], fft_length: usize, is_pad: bool) -> (Vec<f32>, usize) {
    if data.len() >= fft_length {
        return (data[..fft_length].to_vec(), 0);
    }
    if !is_pad {
        let mut v = data.to_vec();
        v.resize(fft_length, 0.0);
        return (v, 0);
    }
    let pad = reflect_pad_amount(data.len()).min((fft_length - data.len()) / 2).max(0);
    let mut padded = pad_reflect(data, pad);
    if padded.len() < fft_length {
        padded.resize(fft_length, 0.0);
    } else if padded.len() > fft_length {
        padded.truncate(fft_length);
    }
    (padded, pad)
}

#[derive(Clone, Debug)]
pub struct PwtOptions {
    pub num: usize,
    pub radix2_exp: u32,
    pub samplate: u32,
    pub low_fre: f64,
    pub high_fre: f64,
    pub bin_per_octave: u32,
    pub scale_type: FreqAxis,
    pub style: AuditoryStyle,
    pub normal: Normalization,
    pub is_pad: bool,
}

impl Default for PwtOptions {
    fn default() -> Self {
        let bin_per_octave = 12;
        Self {
            num: 84,
            radix2_exp: 12,
            samplate: 32000,
            low_fre: 32.0,
            high_fre: 16000.0,
            bin_per_octave,
            scale_type: FreqAxis::Octave { bins_per_octave: bin_per_octave },
            style: AuditoryStyle::Slaney,
            normal: Normalization::None,
            is_pad: true,
        }
    }
}

/// Pseudo-wavelet transform: the CWT pipeline with a perceptual
/// filterbank standing in for the analytic wavelet kernels. Rejects
/// the gammatone style, which has no frequency-domain row shaped like
/// the rest of the filterbank.
pub struct Pwt {
    pub fft_length: usize,
    pub is_pad: bool,
    kernel: Vec<f32>,
    num: usize,
    fft: FftPlanCache,
}

impl Pwt {
    pub fn new(opts: PwtOptions) -> AuroraResult<Self> {
        if opts.style == AuditoryStyle::Gammatone {
            return Err(AuroraError::DomainRequirement {
                detail: "PWT rejects the gammatone filterbank style",
            });
        }
        if !(1..=30).contains(&opts.radix2_exp) {
            return Err(AuroraError::param_range("radix2_exp", "must lie in 1..=30"));
        }
        let fft_length = 1usize << opts.radix2_exp;
        let bank = AuditoryFilterBank::new(
            opts.num,
            fft_length,
            opts.samplate,
            opts.low_fre,
            opts.high_fre,
            opts.scale_type,
            opts.style,
            opts.normal,
        )?;
        let half = fft_length / 2 + 1;
        let mut kernel = vec![0.0f32; opts.num * fft_length];
        for k in 0..opts.num {
            let half_row = bank.matrix.row(k);
            let full = kernel[k * fft_length..(k + 1) * fft_length].as_mut();
            mirror_to_full_spectrum(half_row, half, full);
        }
        Ok(Self {
            fft_length,
            is_pad: opts.is_pad,
            kernel,
            num: opts.num,
            fft: FftPlanCache::new(),
        })
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn transform(&mut self, data: &[f32]) -> AuroraResult<ComplexMatrix> {
        if data.is_empty() {
            return Err(AuroraError::param_range("data", "input must be non-empty"));
        }
        let (padded, start) = pad_to_fft_length(data, self.fft_length, self.is_pad);
        let mut spectrum: Vec<Complex32> = padded.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.fft.fft(&mut spectrum);

        let mut out = ComplexMatrix::zeros(self.num, data.len());
        let mut scratch = vec![Complex32::new(0.0, 0.0); self.fft_length];
        for k in 0..self.num {
            let row = &self.kernel[k * self.fft_length..(k + 1) * self.fft_length];
            for n in 0..self.fft_length {
                scratch[n] = spectrum[n] * row[n];
            }
            self.fft.ifft(&mut scratch);
            out.row_mut(k).copy_from_slice(&scratch[start..start + data.len()]);
        }
        Ok(out)
    }
}

/// Extends a real one-sided spectrum row (length `half`) to a full
/// Hermitian-symmetric-real row of length `fft_length`.
fn mirror_to_full_spectrum(half_row: &[f32], half: usize, full: &mut [f32]) {
    let fft_length = full.len();
    full[..half].copy_from_slice(half_row);
    for n in half..fft_length {
        full[n] = half_row[fft_length - n];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cwt_transform_preserves_output_length() {
        let mut cwt = Cwt::new(CwtOptions {
            num: 12,
            radix2_exp: 10,
            ..Default::default()
        })
        .unwrap();
        let data: Vec<f32> = (0..300).map(|i| (i as f32 * 0.05).sin()).collect();
        let out = cwt.transform(&data).unwrap();
        assert_eq!(out.rows, 12);
        assert_eq!(out.cols, data.len());
    }

    #[test]
    fn pwt_rejects_gammatone() {
        let err = Pwt::new(PwtOptions {
            style: AuditoryStyle::Gammatone,
            ..Default::default()
        });
        assert!(matches!(err, Err(AuroraError::DomainRequirement { .. })));
    }

    #[test]
    fn pwt_transform_runs_with_slaney_style() {
        let mut pwt = Pwt::new(PwtOptions {
            num: 10,
            radix2_exp: 10,
            ..Default::default()
        })
        .unwrap();
        let data: Vec<f32> = (0..200).map(|i| (i as f32 * 0.1).cos()).collect();
        let out = pwt.transform(&data).unwrap();
        assert_eq!(out.rows, 10);
        assert_eq!(out.cols, data.len());
    }
}
