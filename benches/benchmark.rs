use auroraflux::filterbank::WaveletType;
use auroraflux::transform::{Cwt, CwtOptions, Fst, FstOptions, Nsgt, NsgtOptions, St, StOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn test_signal(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * 0.013).sin()).collect()
}

fn cwt_bench(data: &[f32]) {
    let mut cwt = Cwt::new(CwtOptions {
        num: 84,
        radix2_exp: 12,
        wavelet_type: WaveletType::Morse,
        ..Default::default()
    })
    .unwrap();
    black_box(cwt.transform(data).unwrap());
}

fn nsgt_bench(data: &[f32]) {
    let mut nsgt = Nsgt::new(NsgtOptions {
        num: 64,
        radix2_exp: 12,
        ..Default::default()
    })
    .unwrap();
    black_box(nsgt.transform(data).unwrap());
}

fn st_bench(data: &[f32]) {
    let mut st = St::new(StOptions {
        radix2_exp: 10,
        ..Default::default()
    })
    .unwrap();
    black_box(st.transform(data).unwrap());
}

fn fst_bench(data: &[f32]) {
    let mut fst = Fst::new(FstOptions { radix2_exp: 10 }).unwrap();
    black_box(fst.transform(data).unwrap());
}

fn criterion_benchmark(c: &mut Criterion) {
    let cwt_data = test_signal(4096);
    c.bench_function("cwt_4096", |b| b.iter(|| cwt_bench(&cwt_data)));

    let nsgt_data = test_signal(4096);
    c.bench_function("nsgt_4096", |b| b.iter(|| nsgt_bench(&nsgt_data)));

    let fixed_data = test_signal(1024);
    c.bench_function("st_1024", |b| b.iter(|| st_bench(&fixed_data)));
    c.bench_function("fst_1024", |b| b.iter(|| fst_bench(&fixed_data)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
