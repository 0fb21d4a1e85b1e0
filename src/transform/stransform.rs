//! S-transform and its dyadic-partition fast variant (FST).

use crate::error::{AuroraError, AuroraResult};
use crate::fft::FftPlanCache;
use crate::numeric::mean;
use crate::transform::ComplexMatrix;
use num_complex::Complex32;

#[derive(Clone, Debug)]
pub struct StOptions {
    pub radix2_exp: u32,
    pub min_index: usize,
    pub max_index: Option<usize>,
    pub factor: f64,
    pub norm: f64,
}

impl Default for StOptions {
    fn default() -> Self {
        Self {
            radix2_exp: 12,
            min_index: 0,
            max_index: None,
            factor: 1.0,
            norm: 1.0,
        }
    }
}

/// Classic S-transform: one Gaussian-windowed IFFT per requested
/// frequency bin.
pub struct St {
    fft_length: usize,
    min_index: usize,
    max_index: usize,
    windows: Vec<Vec<f32>>,
    fft: FftPlanCache,
}

impl St {
    pub fn new(opts: StOptions) -> AuroraResult<Self> {
        if !(1..=30).contains(&opts.radix2_exp) {
            return Err(AuroraError::param_range("radix2_exp", "must lie in 1..=30"));
        }
        let fft_length = 1usize << opts.radix2_exp;
        let max_index = opts.max_index.unwrap_or(fft_length / 2);
        if max_index > fft_length / 2 || opts.min_index > max_index {
            return Err(AuroraError::param_range(
                "min_index/max_index",
                "must satisfy min_index <= max_index <= fftLength/2",
            ));
        }
        let windows = build_gaussian_windows(fft_length, opts.min_index, max_index, opts.factor, opts.norm);
        Ok(Self {
            fft_length,
            min_index: opts.min_index,
            max_index,
            windows,
            fft: FftPlanCache::new(),
        })
    }

    pub fn rows(&self) -> usize {
        self.max_index - self.min_index + 1
    }

    pub fn transform(&mut self, data: &[f32]) -> AuroraResult<ComplexMatrix> {
        if data.len() != self.fft_length {
            return Err(AuroraError::ShapeMismatch {
                expected: (1, self.fft_length),
                actual: (1, data.len()),
            });
        }
        let mut spectrum: Vec<Complex32> = data.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.fft.fft(&mut spectrum);
        let mut extended = spectrum.clone();
        extended.extend_from_slice(&spectrum);

        let rows = self.rows();
        let mut out = ComplexMatrix::zeros(rows, self.fft_length);
        let dc_mean = mean(data);

        for (i, b) in (self.min_index..=self.max_index).enumerate() {
            if b == 0 {
                for v in out.row_mut(i).iter_mut() {
                    *v = Complex32::new(dc_mean, 0.0);
                }
                continue;
            }
            let slice = &extended[b..b + self.fft_length];
            let window = &self.windows[i];
            let mut product: Vec<Complex32> = slice
                .iter()
                .zip(window.iter())
                .map(|(&s, &w)| s * w)
                .collect();
            self.fft.ifft(&mut product);
            out.row_mut(i).copy_from_slice(&product);
        }
        Ok(out)
    }
}

/// `Ĝ_b(ω) = exp(-2*pi^2*factor*ω^2 / b^(2*norm))` sampled cyclically
/// over `ω ∈ (-fftLength/2, fftLength/2]`.
fn build_gaussian_windows(
    fft_length: usize,
    min_index: usize,
    max_index: usize,
    factor: f64,
    norm: f64,
) -> Vec<Vec<f32>> {
    (min_index..=max_index)
        .map(|b| {
            if b == 0 {
                return vec![0.0f32; fft_length];
            }
            let denom = (b as f64).powf(2.0 * norm);
            (0..fft_length)
                .map(|n| {
                    let signed = if n * 2 <= fft_length {
                        n as f64
                    } else {
                        n as f64 - fft_length as f64
                    };
                    (-2.0 * std::f64::consts::PI.powi(2) * factor * signed * signed / denom).exp() as f32
                })
                .collect()
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct FstOptions {
    pub radix2_exp: u32,
}

impl Default for FstOptions {
    fn default() -> Self {
        Self { radix2_exp: 12 }
    }
}

/// Fast S-transform: partitions the spectrum dyadically so that
/// nearby frequency rows share one cheap small-length IDFT instead of
/// each bin paying for its own full-length IFFT.
pub struct Fst {
    fft_length: usize,
    n: u32,
    segment_sizes: Vec<usize>,
    fft: FftPlanCache,
}

impl Fst {
    pub fn new(opts: FstOptions) -> AuroraResult<Self> {
        if opts.radix2_exp < 3 {
            return Err(AuroraError::param_range("radix2_exp", "FST requires radix2Exp >= 3"));
        }
        let n = opts.radix2_exp;
        let fft_length = 1usize << n;
        let segment_sizes = build_partition(n);
        Ok(Self {
            fft_length,
            n,
            segment_sizes,
            fft: FftPlanCache::new(),
        })
    }

    pub fn rows(&self) -> usize {
        self.fft_length / 2 + 1
    }

    pub fn transform(&mut self, data: &[f32]) -> AuroraResult<ComplexMatrix> {
        if data.len() != self.fft_length {
            return Err(AuroraError::ShapeMismatch {
                expected: (1, self.fft_length),
                actual: (1, data.len()),
            });
        }
        let mut spectrum: Vec<Complex32> = data.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.fft.fft(&mut spectrum);
        let shifted = fftshift(&spectrum);

        let mut offsets = Vec::with_capacity(self.segment_sizes.len());
        let mut acc = 0usize;
        for &sz in &self.segment_sizes {
            offsets.push(acc);
            acc += sz;
        }

        let rows = self.rows();
        let mut out = ComplexMatrix::zeros(rows, self.fft_length);
        let n = self.n as usize;
        let fft_length = self.fft_length;

        // Segment 0: Nyquist bin (row 0).
        let nyquist_row = self.segment_row(&shifted, offsets[0], self.segment_sizes[0]);
        out.row_mut(0).copy_from_slice(&tile(&nyquist_row, fft_length));

        // Segment n: DC bin (last row).
        let dc_row = self.segment_row(&shifted, offsets[n], self.segment_sizes[n]);
        out.row_mut(rows - 1).copy_from_slice(&tile(&dc_row, fft_length));

        // Segments n+1..2n-1: positive frequencies b = 1..fftLength/2-1, descending sizes.
        let mut b_start = 1usize;
        for p in (n + 1)..self.segment_sizes.len() {
            let sz = self.segment_sizes[p];
            let row_values = self.segment_row(&shifted, offsets[p], sz);
            let tiled = tile(&row_values, fft_length);
            for b in b_start..b_start + sz {
                let row = fft_length / 2 - b;
                out.row_mut(row).copy_from_slice(&tiled);
            }
            b_start += sz;
        }

        Ok(out)
    }

    fn segment_row(&mut self, shifted: &[Complex32], offset: usize, size: usize) -> Vec<Complex32> {
        let slice = &shifted[offset..offset + size];
        let unshifted = ifftshift(slice);
        let time = self.fft.idft(&unshifted);
        fftshift(&time)
    }
}

/// Segment sizes `1, 2, 4, ..., 2^(n-2), 1, 1, 2^(n-2), ..., 2, 1`
/// (`2n` entries summing to `2^n`).
fn build_partition(n: u32) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(2 * n as usize);
    for e in 0..(n - 1) {
        sizes.push(1usize << e);
    }
    sizes.push(1);
    sizes.push(1);
    for e in (0..(n - 1)).rev() {
        sizes.push(1usize << e);
    }
    sizes
}

fn fftshift(data: &[Complex32]) -> Vec<Complex32> {
    let mid = data.len() / 2;
    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[mid..]);
    out.extend_from_slice(&data[..mid]);
    out
}

fn ifftshift(data: &[Complex32]) -> Vec<Complex32> {
    let mid = data.len() - data.len() / 2;
    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[mid..]);
    out.extend_from_slice(&data[..mid]);
    out
}

/// Nearest-neighbor upsample of `values` to `length` columns.
fn tile(values: &[Complex32], length: usize) -> Vec<Complex32> {
    let sz = values.len();
    (0..length).map(|j| values[(j * sz) / length]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn st_row_zero_is_dc_mean() {
        let mut st = St::new(StOptions {
            radix2_exp: 8,
            ..Default::default()
        })
        .unwrap();
        let data: Vec<f32> = (0..256).map(|i| (i as f32 * 0.03).sin() + 0.5).collect();
        let expected_mean = mean(&data);
        let out = st.transform(&data).unwrap();
        for v in out.row(0) {
            assert!((v.re - expected_mean).abs() < 1e-4);
        }
    }

    #[test]
    fn fst_produces_expected_row_count() {
        let mut fst = Fst::new(FstOptions { radix2_exp: 6 }).unwrap();
        let data: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).cos()).collect();
        let out = fst.transform(&data).unwrap();
        assert_eq!(out.rows, 64 / 2 + 1);
        assert_eq!(out.cols, 64);
    }

    #[test]
    fn partition_sizes_sum_to_fft_length() {
        for n in 3..10 {
            let sizes = build_partition(n);
            assert_eq!(sizes.len(), 2 * n as usize);
            assert_eq!(sizes.iter().sum::<usize>(), 1usize << n);
        }
    }

    #[test]
    fn fst_requires_radix2_exp_at_least_three() {
        assert!(Fst::new(FstOptions { radix2_exp: 2 }).is_err());
    }
}
