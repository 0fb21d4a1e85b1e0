//! Integration coverage for the streaming frame engine and the pitch
//! estimators built on top of it.

use auroraflux::pitch::{peak_pick, PitchCep, PitchOptions};
use auroraflux::streaming::StreamingFrameEngine;
use auroraflux::vocoder::{PhaseVocoder, TimeStretch, TimeStretchOptions};
use std::f64::consts::TAU;

fn sine(freq: f64, samplate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (TAU * freq * i as f64 / samplate as f64).sin() as f32)
        .collect()
}

#[test]
fn streaming_equivalence_for_pitch_cep() {
    let data = sine(220.0, 32000, 4096);

    let mut whole = PitchCep::new(PitchOptions {
        radix2_exp: 10,
        is_continue: true,
        ..Default::default()
    })
    .unwrap();
    let whole_freqs = whole.process(&data);

    let mut chunked = PitchCep::new(PitchOptions {
        radix2_exp: 10,
        is_continue: true,
        ..Default::default()
    })
    .unwrap();
    let mut chunked_freqs = Vec::new();
    for chunk in data.chunks(2048) {
        chunked_freqs.extend(chunked.process(chunk));
    }

    assert_eq!(whole_freqs.len(), chunked_freqs.len());
    for (a, b) in whole_freqs.iter().zip(chunked_freqs.iter()) {
        assert!((a - b).abs() < 1e-3, "a={a} b={b}");
    }
}

#[test]
fn peak_pick_concrete_scenario() {
    let mut data = vec![0.1f32, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];
    let picks = peak_pick(&mut data, 0, 7, 2, 2);
    assert_eq!(picks, vec![1, 4]);
}

#[test]
fn streaming_frame_engine_reports_zero_frames_on_underflow() {
    let mut engine = StreamingFrameEngine::new(1024, 256, true).unwrap();
    let frames = engine.process(&vec![0.0f32; 100]);
    assert!(frames.is_empty());
}

#[test]
fn phase_vocoder_identity_rate_reproduces_waveform_within_tolerance() {
    let mut stretch = TimeStretch::new(TimeStretchOptions {
        radix2_exp: 9,
        ..Default::default()
    })
    .unwrap();
    let data = sine(440.0, 32000, 32 * 128 + 512);
    let out = stretch.process(&data, 1.0).unwrap();

    let n = out.len().min(data.len());
    let rms = |d: &[f32]| (d.iter().map(|v| v * v).sum::<f32>() / d.len() as f32).sqrt();
    let diff_rms = {
        let diffs: Vec<f32> = (0..n).map(|i| out[i] - data[i]).collect();
        rms(&diffs)
    };
    let signal_rms = rms(&data[..n]);
    assert!(diff_rms < 0.5 * signal_rms.max(1e-6), "diff_rms={diff_rms} signal_rms={signal_rms}");
}

#[test]
fn phase_vocoder_rejects_shape_mismatch() {
    let vocoder = PhaseVocoder::new(256, 64);
    let input = auroraflux::transform::ComplexMatrix::zeros(4, 10);
    assert!(vocoder.process(&input, 1.0).is_err());
}
