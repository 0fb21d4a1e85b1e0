//! Auditory filterbank weight-matrix construction: band-edge
//! resolution on a chosen frequency axis, then one of several styles
//! of row construction (triangular, gammatone biquad cascade, or a
//! scaled window profile between adjacent edges).

use crate::error::{AuroraError, AuroraResult};
use crate::freq_axis::FreqAxis;
use crate::numeric::DenseMatrix;
use crate::window::{self, WindowParams, WindowShape, WindowType};
use num_complex::Complex64;

/// Row-construction style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AuditoryStyle {
    /// Triangular ramps placed at rounded bin positions.
    Etsi,
    /// Triangular ramps placed at the first linear bin exceeding each
    /// target edge (Slaney's band-edge convention).
    Slaney,
    /// 4-section biquad cascade, magnitude response.
    Gammatone,
    Point,
    Rect,
    Hann,
    Hamm,
    Blackman,
    Bohman,
    Kaiser,
    Gauss,
}

impl AuditoryStyle {
    fn includes_edges(self) -> bool {
        matches!(self, AuditoryStyle::Gammatone)
    }

    fn window_kind(self) -> Option<WindowType> {
        match self {
            AuditoryStyle::Hann => Some(WindowType::Hann),
            AuditoryStyle::Hamm => Some(WindowType::Hamm),
            AuditoryStyle::Blackman => Some(WindowType::Blackman),
            AuditoryStyle::Bohman => Some(WindowType::Bohman),
            AuditoryStyle::Kaiser => Some(WindowType::Kaiser),
            AuditoryStyle::Gauss => Some(WindowType::Gauss),
            _ => None,
        }
    }
}

/// Row normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalization {
    None,
    Area,
    BandWidth,
}

/// Resolved band-edge set on a chosen axis: `num + det` frequencies and
/// their projected FFT-bin indices.
#[derive(Clone, Debug)]
pub struct BandEdgeSet {
    pub fre_band: Vec<f64>,
    pub bin_band: Vec<usize>,
    pub det: usize,
}

/// A constructed auditory filterbank: band edges plus the dense
/// `num x (fftLength/2+1)` weight matrix.
pub struct AuditoryFilterBank {
    pub num: usize,
    pub style: AuditoryStyle,
    pub normal: Normalization,
    pub fft_length: usize,
    pub samplate: u32,
    pub edges: BandEdgeSet,
    pub matrix: DenseMatrix,
}

impl AuditoryFilterBank {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num: usize,
        fft_length: usize,
        samplate: u32,
        low_fre: f64,
        high_fre: f64,
        axis: FreqAxis,
        style: AuditoryStyle,
        normal: Normalization,
    ) -> AuroraResult<Self> {
        if num == 0 {
            return Err(AuroraError::param_range("num", "band count must be > 0"));
        }
        let nyquist = samplate as f64 / 2.0;
        let includes_edges = style.includes_edges();
        let (low, high) = axis.revise_range(num, low_fre, high_fre, nyquist, includes_edges)?;

        let det = if includes_edges { 0 } else { 2 };
        let count = num + det;
        let lo_scale = axis.fre_to_scale(low);
        let hi_scale = axis.fre_to_scale(high);
        let step = if count > 1 {
            (hi_scale - lo_scale) / (count as f64 - 1.0)
        } else {
            0.0
        };
        let fre_band: Vec<f64> = (0..count)
            .map(|i| axis.scale_to_fre(lo_scale + step * i as f64))
            .collect();

        let bins_per_hz = fft_length as f64 / samplate as f64;
        let bin_band: Vec<usize> = match style {
            AuditoryStyle::Slaney => fre_band
                .iter()
                .map(|&f| (f * bins_per_hz).ceil().max(0.0) as usize)
                .collect(),
            _ => fre_band
                .iter()
                .map(|&f| (f * bins_per_hz).round().max(0.0) as usize)
                .collect(),
        };

        let edges = BandEdgeSet {
            fre_band,
            bin_band,
            det,
        };

        let half = fft_length / 2 + 1;
        let mut matrix = DenseMatrix::zeros(num, half);

        match style {
            AuditoryStyle::Gammatone => {
                for k in 0..num {
                    let cf = edges.fre_band[k];
                    let row = gammatone_row(cf, samplate as f64, fft_length);
                    matrix.row_mut(k).copy_from_slice(&row);
                }
            }
            AuditoryStyle::Etsi | AuditoryStyle::Slaney => {
                build_triangular(&edges, &mut matrix);
            }
            _ => {
                let kind = style.window_kind();
                build_window_shaped(&edges, style, kind, &mut matrix)?;
            }
        }

        normalize(&mut matrix, &edges, normal);

        #[cfg(feature = "debug-log")]
        log::debug!("built auditory filterbank: num={num} style={style:?} fft_length={fft_length}");

        Ok(Self {
            num,
            style,
            normal,
            fft_length,
            samplate,
            edges,
            matrix,
        })
    }
}

/// Ramp `0->1` then `1->0` between successive guard-inclusive band
/// edges, as used by the ETSI- and Slaney-style filterbanks.
fn build_triangular(edges: &BandEdgeSet, matrix: &mut DenseMatrix) {
    let bins = &edges.bin_band;
    for k in 1..=matrix.rows {
        let left = bins[k - 1];
        let center = bins[k];
        let right = bins[k + 1];
        let row = matrix.row_mut(k - 1);
        if center > left {
            for b in left..center {
                let w = (b - left) as f32 / (center - left) as f32;
                if b < row.len() {
                    row[b] = w;
                }
            }
        }
        if right > center {
            for b in center..=right.min(row.len().saturating_sub(1)) {
                let w = 1.0 - (b - center) as f32 / (right - center) as f32;
                if b < row.len() {
                    row[b] = w;
                }
            }
        } else if center < row.len() {
            row[center] = 1.0;
        }
    }
}

/// Place a scaled window profile (or a single unit spike for `Point`,
/// or a flat top for `Rect`) spanning the two guard edges around each
/// band center.
fn build_window_shaped(
    edges: &BandEdgeSet,
    style: AuditoryStyle,
    kind: Option<WindowType>,
    matrix: &mut DenseMatrix,
) -> AuroraResult<()> {
    let bins = &edges.bin_band;
    for k in 1..=matrix.rows {
        let left = bins[k - 1];
        let right = bins[k + 1];
        let center = bins[k];
        let row = matrix.row_mut(k - 1);
        let width = right.saturating_sub(left) + 1;
        match style {
            AuditoryStyle::Point => {
                if center < row.len() {
                    row[center] = 1.0;
                }
            }
            AuditoryStyle::Rect => {
                for b in left..=right.min(row.len().saturating_sub(1)) {
                    row[b] = 1.0;
                }
            }
            _ => {
                let kind = kind.expect("window-shaped style carries a window kind");
                let profile = window::generate(
                    kind,
                    width,
                    WindowShape::Symmetric,
                    WindowParams::default(),
                )?;
                for (i, &v) in profile.iter().enumerate() {
                    let b = left + i;
                    if b < row.len() {
                        row[b] = v;
                    }
                }
            }
        }
    }
    Ok(())
}

fn normalize(matrix: &mut DenseMatrix, edges: &BandEdgeSet, normal: Normalization) {
    match normal {
        Normalization::None => {}
        Normalization::Area => {
            for k in 0..matrix.rows {
                let row = matrix.row_mut(k);
                let s: f32 = row.iter().sum();
                if s.abs() > 1e-12 {
                    for v in row.iter_mut() {
                        *v /= s;
                    }
                }
            }
        }
        Normalization::BandWidth => {
            let det = edges.det;
            for k in 0..matrix.rows {
                let (left, right) = if det == 0 {
                    (edges.bin_band[k], edges.bin_band[(k + 1).min(edges.bin_band.len() - 1)])
                } else {
                    (edges.bin_band[k], edges.bin_band[k + 2])
                };
                let width = ((right as f64 - left as f64) / 2.0).max(1.0) as f32;
                let row = matrix.row_mut(k);
                for v in row.iter_mut() {
                    *v /= width;
                }
            }
        }
    }
}

/// Magnitude response of the 4-section gammatone biquad cascade at
/// center frequency `cf`, normalized to unit gain at `cf` and doubled
/// off-edge for the one-sided spectrum.
fn gammatone_row(cf: f64, samplate: f64, fft_length: usize) -> Vec<f32> {
    let t = 1.0 / samplate;
    let b = std::f64::consts::TAU * 1.019 * (cf / 9.26449 + 24.7);
    let c = (2.0 * cf * std::f64::consts::PI * t).cos();
    let s = (2.0 * cf * std::f64::consts::PI * t).sin();
    let e = (-b * t).exp();
    let pv = (3.0 + 2.0 * std::f64::consts::SQRT_2).sqrt();
    let nv = (3.0 - 2.0 * std::f64::consts::SQRT_2).sqrt();

    let a0 = t;
    let b1 = -2.0 * c * e;
    let b2 = e * e;
    let a_roots = [
        -(t * c * e + pv * t * s * e),
        -(t * c * e - pv * t * s * e),
        -(t * c * e + nv * t * s * e),
        -(t * c * e - nv * t * s * e),
    ];

    let section = |a1: f64, omega: f64| -> Complex64 {
        let zinv = Complex64::new(omega.cos(), -omega.sin());
        let num = Complex64::new(a0, 0.0) + zinv * a1;
        let den = Complex64::new(1.0, 0.0) + zinv * b1 + zinv * zinv * b2;
        num / den
    };

    let cascade = |omega: f64| -> Complex64 {
        a_roots
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, &a1| acc * section(a1, omega))
    };

    let cf_omega = std::f64::consts::TAU * cf / samplate;
    let gain = cascade(cf_omega).norm().max(1e-300);

    let half = fft_length / 2 + 1;
    (0..half)
        .map(|n| {
            let omega = std::f64::consts::TAU * n as f64 / fft_length as f64;
            let mag = cascade(omega).norm() / gain;
            let doubled = if n == 0 || n == fft_length / 2 { mag } else { mag * 2.0 };
            doubled as f32
        })
        .collect()
}
