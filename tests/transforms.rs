//! Cross-module integration tests exercising the public transform API
//! the way a caller outside the crate would.

use auroraflux::filterbank::{AuditoryStyle, Normalization, WaveletType};
use auroraflux::freq_axis::FreqAxis;
use auroraflux::numeric::norm;
use auroraflux::transform::{Cwt, CwtOptions, Fst, FstOptions, Pwt, PwtOptions, St, StOptions};

fn random_signal(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(2685821657736338717).wrapping_add(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ((state as i64 % 2000) as f32) / 1000.0
        })
        .collect()
}

fn l2(data: &[f32]) -> f32 {
    norm(data, auroraflux::numeric::Norm::L2)
}

#[test]
fn cwt_shape_and_bounded_magnitude() {
    let mut cwt = Cwt::new(CwtOptions {
        num: 8,
        radix2_exp: 10,
        wavelet_type: WaveletType::Morlet,
        gamma: Some(6.0),
        beta: Some(2.0),
        ..Default::default()
    })
    .unwrap();
    let data = random_signal(1024, 7);
    let out = cwt.transform(&data).unwrap();
    assert_eq!(out.rows, 8);
    assert_eq!(out.cols, 1024);

    let input_norm = l2(&data);
    for k in 0..out.rows {
        let row_norm: f32 = out
            .row(k)
            .iter()
            .map(|c| c.norm() * c.norm())
            .sum::<f32>()
            .sqrt();
        assert!(row_norm <= 2.0 * input_norm + 1.0, "row {k} norm {row_norm} vs input {input_norm}");
    }
}

#[test]
fn pwt_runs_end_to_end_with_etsi_style() {
    let mut pwt = Pwt::new(PwtOptions {
        num: 16,
        radix2_exp: 10,
        style: AuditoryStyle::Etsi,
        normal: Normalization::Area,
        ..Default::default()
    })
    .unwrap();
    let data = random_signal(500, 3);
    let out = pwt.transform(&data).unwrap();
    assert_eq!(out.rows, 16);
    assert_eq!(out.cols, data.len());
}

#[test]
fn st_and_fst_agree_on_row_count() {
    let mut st = St::new(StOptions {
        radix2_exp: 7,
        ..Default::default()
    })
    .unwrap();
    let mut fst = Fst::new(FstOptions { radix2_exp: 7 }).unwrap();
    let data = random_signal(128, 11);

    let st_out = st.transform(&data).unwrap();
    let fst_out = fst.transform(&data).unwrap();
    assert_eq!(st_out.rows, fst_out.rows);
    assert_eq!(st_out.cols, fst_out.cols);
}

#[test]
fn mel_axis_round_trips_through_public_api() {
    let axis = FreqAxis::Mel;
    for &f in &[100.0, 1000.0, 8000.0] {
        let scale = axis.fre_to_scale(f);
        let back = axis.scale_to_fre(scale);
        assert!((back - f).abs() < 1e-3 * f);
    }
}
