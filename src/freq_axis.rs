//! Bidirectional frequency <-> perceptual-scale maps, and the
//! frequency-range revision routines that keep a requested band count
//! exactly representable without exceeding Nyquist.

use crate::error::AuroraError;

/// A frequency axis. `Octave` and `LogChroma` carry their
/// `bins_per_octave` parameter inline rather than through a side
/// channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FreqAxis {
    Linear { fft_length: usize, samplate: u32 },
    Linspace,
    Mel,
    Bark,
    Erb,
    Octave { bins_per_octave: u32 },
    LogSpace,
    LogChroma { bins_per_octave: u32 },
    Midi,
}

impl FreqAxis {
    /// Normalizes a requested `bins_per_octave`, matching the clamp the
    /// original filterbank applies (valid range `4..=48`, else 12; for
    /// `LogChroma` it must additionally be a multiple of 12, else 12).
    pub fn normalized_bins_per_octave(&self) -> u32 {
        match self {
            FreqAxis::Octave { bins_per_octave } => {
                if (4..=48).contains(bins_per_octave) {
                    *bins_per_octave
                } else {
                    12
                }
            }
            FreqAxis::LogChroma { bins_per_octave } => {
                if *bins_per_octave >= 12 && bins_per_octave % 12 == 0 {
                    *bins_per_octave
                } else {
                    12
                }
            }
            _ => 12,
        }
    }

    /// Forward map: frequency (Hz) to scale value.
    pub fn fre_to_scale(&self, fre: f64) -> f64 {
        match self {
            FreqAxis::Linear { fft_length, samplate } => {
                let det = *samplate as f64 / *fft_length as f64;
                (fre / det).round()
            }
            FreqAxis::Linspace => fre,
            FreqAxis::Mel => fre_to_mel(fre),
            FreqAxis::Bark => fre_to_bark(fre),
            FreqAxis::Erb => fre_to_erb(fre),
            FreqAxis::Octave { .. } | FreqAxis::LogChroma { .. } => {
                let bpo = self.normalized_bins_per_octave() as f64;
                (bpo * (fre / 440.0).log2()).round()
            }
            FreqAxis::LogSpace => (fre / 440.0).log2(),
            FreqAxis::Midi => (12.0 * (fre / 440.0).log2() + 69.0).round(),
        }
    }

    /// Inverse map: scale value back to frequency (Hz).
    pub fn scale_to_fre(&self, value: f64) -> f64 {
        match self {
            FreqAxis::Linear { fft_length, samplate } => {
                value * (*samplate as f64 / *fft_length as f64)
            }
            FreqAxis::Linspace => value,
            FreqAxis::Mel => mel_to_fre(value),
            FreqAxis::Bark => bark_to_fre(value),
            FreqAxis::Erb => erb_to_fre(value),
            FreqAxis::Octave { .. } | FreqAxis::LogChroma { .. } => {
                let bpo = self.normalized_bins_per_octave() as f64;
                2f64.powf(value / bpo) * 440.0
            }
            FreqAxis::LogSpace => 2f64.powf(value) * 440.0,
            FreqAxis::Midi => 2f64.powf((value - 69.0) / 12.0) * 440.0,
        }
    }

    /// Revise `(low_fre, high_fre)` so that `num` bands at this axis'
    /// spacing are exactly representable without an edge exceeding
    /// Nyquist. `includes_edges` is true for styles whose band array
    /// semantically already covers the edges (e.g. gammatone).
    pub fn revise_range(
        &self,
        num: usize,
        low_fre: f64,
        high_fre: f64,
        nyquist: f64,
        includes_edges: bool,
    ) -> Result<(f64, f64), AuroraError> {
        if num == 0 {
            return Err(AuroraError::param_range("num", "band count must be > 0"));
        }
        let (det, offset) = if includes_edges { (0i64, 0i64) } else { (2, 1) };

        let (low, high) = match self {
            FreqAxis::Linspace => {
                if includes_edges {
                    (low_fre, high_fre)
                } else {
                    let step = (high_fre - low_fre) / (num as f64 - 1.0);
                    (low_fre - step, high_fre + step)
                }
            }
            FreqAxis::LogSpace => {
                if includes_edges {
                    (low_fre, high_fre)
                } else {
                    let lo = self.fre_to_scale(low_fre);
                    let hi = self.fre_to_scale(high_fre);
                    let step = (hi - lo) / (num as f64 - 1.0);
                    (
                        self.scale_to_fre(lo - step),
                        self.scale_to_fre(hi + step),
                    )
                }
            }
            FreqAxis::Linear { .. } => {
                let lo = self.fre_to_scale(low_fre) - offset as f64;
                let hi = lo + (num as f64 - 1.0) + det as f64;
                (self.scale_to_fre(lo), self.scale_to_fre(hi))
            }
            _ => {
                let lo = self.fre_to_scale(low_fre) - offset as f64;
                let hi = lo + (num as f64 - 1.0) + det as f64;
                (self.scale_to_fre(lo), self.scale_to_fre(hi))
            }
        };

        if low > nyquist || high > nyquist || low < 0.0 {
            return Err(AuroraError::EdgeOverflow {
                low_fre: low,
                high_fre: high,
                nyquist,
            });
        }
        Ok((low, high))
    }
}

/// `m = 2595 * log10(1 + f/700)`.
pub fn fre_to_mel(fre: f64) -> f64 {
    2595.0 * (1.0 + fre / 700.0).log10()
}

/// Inverse of [`fre_to_mel`].
pub fn mel_to_fre(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Bark scale with piecewise correction below 2 and above 20.1 so the
/// curve is continuous across both boundaries.
pub fn fre_to_bark(fre: f64) -> f64 {
    let mut bark = 26.81 * fre / (1960.0 + fre) - 0.53;
    if bark < 2.0 {
        bark += 0.15 * (2.0 - bark);
    } else if bark > 20.1 {
        bark += 0.22 * (bark - 20.1);
    }
    bark
}

/// Inverse of [`fre_to_bark`].
pub fn bark_to_fre(bark: f64) -> f64 {
    let adjusted = if bark < 2.0 {
        (bark - 0.3) / 0.85
    } else if bark > 20.1 {
        (bark + 4.422) / 1.22
    } else {
        bark
    };
    1960.0 * (adjusted + 0.53) / (26.28 - adjusted)
}

/// `e = 21.3654 * log10(1 + 0.004368*f)`.
pub fn fre_to_erb(fre: f64) -> f64 {
    21.3654 * (1.0 + fre * 0.004368).log10()
}

/// Inverse of [`fre_to_erb`].
pub fn erb_to_fre(erb: f64) -> f64 {
    (10f64.powf(erb / 21.3654) - 1.0) / 0.004368
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mel_axis_edges() {
        assert_relative_eq!(fre_to_mel(0.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(fre_to_mel(8000.0), 2840.0230, epsilon = 1e-2);
        let back = mel_to_fre(fre_to_mel(8000.0));
        assert_relative_eq!(back, 8000.0, epsilon = 1e-3 * 8000.0);
    }

    #[test]
    fn bark_continuous_at_boundaries() {
        let eps = 1e-4;
        let just_below = fre_to_bark(bark_to_fre(2.0) - eps);
        let just_above = fre_to_bark(bark_to_fre(2.0) + eps);
        assert!((just_below - just_above).abs() < 1e-2);
    }

    #[test]
    fn every_axis_round_trips() {
        let axes = [
            FreqAxis::Mel,
            FreqAxis::Bark,
            FreqAxis::Erb,
            FreqAxis::Octave { bins_per_octave: 12 },
            FreqAxis::LogSpace,
            FreqAxis::Midi,
        ];
        for axis in axes {
            for &f in &[30.0, 100.0, 440.0, 1000.0, 8000.0, 15000.0] {
                let scale = axis.fre_to_scale(f);
                let back = axis.scale_to_fre(scale);
                // Octave/Midi round to integers, so compare loosely.
                let tol = match axis {
                    FreqAxis::Octave { .. } | FreqAxis::Midi => 0.05 * f,
                    _ => 1e-5 * f,
                };
                assert!(
                    (back - f).abs() <= tol.max(1e-6),
                    "{:?} round-trip failed at f={f}: back={back}",
                    axis
                );
            }
        }
    }

    #[test]
    fn edge_overflow_detected() {
        let axis = FreqAxis::Linspace;
        let err = axis.revise_range(4, 0.0, 30000.0, 16000.0, false);
        assert!(matches!(err, Err(AuroraError::EdgeOverflow { .. })));
    }
}
