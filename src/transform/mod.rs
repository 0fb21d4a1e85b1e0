//! Time-frequency transforms built on top of the shared FFT primitive
//! and the filterbank module: CWT/PWT, NSGT, and the S-transform
//! family.

pub mod cwt;
pub mod nsgt;
pub mod stransform;

pub use cwt::{Cwt, CwtOptions, Pwt, PwtOptions};
pub use nsgt::{Nsgt, NsgtOptions};
pub use stransform::{Fst, FstOptions, St, StOptions};

use crate::error::{AuroraError, AuroraResult};
use crate::freq_axis::FreqAxis;
use num_complex::Complex32;

/// A dense `rows x cols` matrix of complex time-frequency samples.
pub struct ComplexMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Complex32>,
}

impl ComplexMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Complex32::new(0.0, 0.0); rows * cols],
        }
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[Complex32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [Complex32] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Number of reflect-pad samples on each side for a buffer of this
/// length: `dataLength/2` up to 100,000 samples, else
/// `ceil(log2(dataLength))`.
pub fn reflect_pad_amount(data_length: usize) -> usize {
    if data_length <= 100_000 {
        data_length / 2
    } else {
        (data_length as f64).log2().ceil() as usize
    }
}

/// `num` equispaced band-center frequencies between `low_fre` and
/// `high_fre` on `axis`, after revising the range so no edge exceeds
/// Nyquist. Used by transforms whose bands have no guard edges (CWT,
/// PWT, NSGT bin projection).
pub fn center_frequencies(
    num: usize,
    low_fre: f64,
    high_fre: f64,
    nyquist: f64,
    axis: FreqAxis,
) -> AuroraResult<Vec<f64>> {
    if num == 0 {
        return Err(AuroraError::param_range("num", "band count must be > 0"));
    }
    let (low, high) = axis.revise_range(num, low_fre, high_fre, nyquist, true)?;
    let lo_scale = axis.fre_to_scale(low);
    let hi_scale = axis.fre_to_scale(high);
    let step = if num > 1 {
        (hi_scale - lo_scale) / (num as f64 - 1.0)
    } else {
        0.0
    };
    Ok((0..num)
        .map(|i| axis.scale_to_fre(lo_scale + step * i as f64))
        .collect())
}
