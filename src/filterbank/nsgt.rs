//! Nonuniform, frequency-adaptive windows for the non-stationary Gabor
//! transform: one window per band, each sized from its neighbors in
//! the band-edge bin sequence rather than a single global length.

use crate::error::{AuroraError, AuroraResult};
use crate::filterbank::auditory::{BandEdgeSet, Normalization};
use crate::freq_axis::FreqAxis;
use crate::window::{self, WindowParams, WindowShape, WindowType};

/// Selects how a band's window length is derived from its neighboring
/// bins in `binBand`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NsgtFilterBankType {
    /// Symmetric window, `L_k = max(minLength, 2*max(c-l, r-c) + 1)`.
    Efficient,
    /// Periodic window, `L_k = max(minLength, r - l + 1)`.
    Standard,
}

/// A packed set of per-band adaptive-length windows.
pub struct NsgtFilterBank {
    pub num: usize,
    pub edges: BandEdgeSet,
    pub bank_type: NsgtFilterBankType,
    /// Flat buffer of all window samples concatenated, `offset[]`
    /// giving each band's start (here just a running prefix sum since
    /// storage is dense, not overlapped).
    pub packed: Vec<f32>,
    pub length: Vec<usize>,
    pub offset: Vec<i64>,
    pub max_length: usize,
}

impl NsgtFilterBank {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num: usize,
        fft_length: usize,
        samplate: u32,
        low_fre: f64,
        high_fre: f64,
        scale: FreqAxis,
        min_length: usize,
        bank_type: NsgtFilterBankType,
        style: WindowType,
        normal: Normalization,
    ) -> AuroraResult<Self> {
        if num == 0 {
            return Err(AuroraError::param_range("num", "band count must be > 0"));
        }
        let nyquist = samplate as f64 / 2.0;
        let (low, high) = scale.revise_range(num, low_fre, high_fre, nyquist, false)?;

        let det = 2usize;
        let count = num + det;
        let lo_scale = scale.fre_to_scale(low);
        let hi_scale = scale.fre_to_scale(high);
        let step = (hi_scale - lo_scale) / (count as f64 - 1.0);
        let fre_band: Vec<f64> = (0..count)
            .map(|i| scale.scale_to_fre(lo_scale + step * i as f64))
            .collect();
        let bins_per_hz = fft_length as f64 / samplate as f64;
        let bin_band: Vec<usize> = fre_band
            .iter()
            .map(|&f| (f * bins_per_hz).round().max(0.0) as usize)
            .collect();
        let edges = BandEdgeSet {
            fre_band,
            bin_band,
            det,
        };

        let mut packed = Vec::new();
        let mut length = Vec::with_capacity(num);
        let mut offset = Vec::with_capacity(num);
        let mut max_length = 0usize;

        for k in 1..=num {
            let l = edges.bin_band[k - 1] as i64;
            let c = edges.bin_band[k] as i64;
            let r = edges.bin_band[k + 1] as i64;

            let (len, shape) = match bank_type {
                NsgtFilterBankType::Efficient => {
                    let len = min_length.max((2 * (c - l).max(r - c) + 1).max(0) as usize);
                    (len, WindowShape::Symmetric)
                }
                NsgtFilterBankType::Standard => {
                    let len = min_length.max((r - l + 1).max(0) as usize);
                    (len, WindowShape::Periodic)
                }
            };

            let off = c - len as i64 / 2;
            let off = off.max(0);

            let mut profile = window::generate(style, len, shape, WindowParams::default())?;

            match normal {
                Normalization::None => {}
                Normalization::Area => {
                    let s: f32 = profile.iter().sum();
                    if s.abs() > 1e-12 {
                        for v in profile.iter_mut() {
                            *v /= s;
                        }
                    }
                }
                Normalization::BandWidth => {
                    let scale_factor = (len as f32).sqrt().max(1.0);
                    for v in profile.iter_mut() {
                        *v /= scale_factor;
                    }
                }
            }

            max_length = max_length.max(len);
            length.push(len);
            offset.push(off);
            packed.extend_from_slice(&profile);
        }

        #[cfg(feature = "debug-log")]
        log::debug!("built nsgt filterbank: num={num} bank_type={bank_type:?} max_length={max_length}");

        Ok(Self {
            num,
            edges,
            bank_type,
            packed,
            length,
            offset,
            max_length,
        })
    }

    /// Band `k`'s window samples, sliced out of the packed buffer.
    pub fn band(&self, k: usize) -> &[f32] {
        let start: usize = self.length[..k].iter().sum();
        &self.packed[start..start + self.length[k]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficient_windows_are_longer_or_equal_to_min_length() {
        let bank = NsgtFilterBank::new(
            12,
            2048,
            32000,
            30.0,
            14000.0,
            FreqAxis::Octave { bins_per_octave: 12 },
            3,
            NsgtFilterBankType::Efficient,
            WindowType::Hann,
            Normalization::BandWidth,
        )
        .unwrap();
        for &len in &bank.length {
            assert!(len >= 3);
        }
        assert_eq!(bank.length.iter().sum::<usize>(), bank.packed.len());
    }

    #[test]
    fn standard_windows_use_periodic_shape_length() {
        let bank = NsgtFilterBank::new(
            8,
            1024,
            16000,
            40.0,
            7000.0,
            FreqAxis::Mel,
            4,
            NsgtFilterBankType::Standard,
            WindowType::Hamm,
            Normalization::None,
        )
        .unwrap();
        assert_eq!(bank.num, 8);
        assert!(bank.max_length >= *bank.length.iter().max().unwrap());
    }
}
