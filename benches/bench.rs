use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use soft_fixed::{Batch, FitOptions, FixedFormat, Keyed, OverflowMode, RangeScaler, Repr, RoundingMode};
use soft_fixed::{bench_decode, bench_scale_round, convert, quantize, quantize_batch};

// Establish a baseline by comparing with a single fpu multiply and round

fn baseline_fpu_round_f64(c: &mut Criterion) {
  c.bench_function("baseline_fpu_round_f64", |b| {
    b.iter(|| (black_box(3.14) * black_box(1024.)).round());
  });
}

const NUMS: [f64; 4] = [
  3.99,
  -0.001953125,
  12345.678901,
  1.5e-7,
];

// Time the pieces of quantizing 1 value

fn decode(c: &mut Criterion) {
  let mut g = c.benchmark_group("decode");
  for num in NUMS {
    g.throughput(Throughput::Elements(1));
    g.bench_with_input(BenchmarkId::from_parameter(num), &num, |b, &num| {
      b.iter(|| bench_decode(black_box(num)));
    });
  }
  g.finish();
}

fn scale_round(c: &mut Criterion) {
  let mut g = c.benchmark_group("scale_round");
  for mode in RoundingMode::ALL {
    g.throughput(Throughput::Elements(1));
    g.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
      b.iter(|| bench_scale_round(black_box(NUMS[0]), black_box(10), mode));
    });
  }
  g.finish();
}

fn quantize_one(c: &mut Criterion) {
  let mut g = c.benchmark_group("quantize");
  for overflow in [OverflowMode::Saturate, OverflowMode::Wrap] {
    for mode in RoundingMode::ALL {
      let fmt = FixedFormat::new(16, 6, true, mode, overflow).unwrap();
      g.throughput(Throughput::Elements(NUMS.len() as u64));
      g.bench_with_input(BenchmarkId::from_parameter(fmt), &fmt, |b, &fmt| {
        b.iter(|| NUMS.map(|x| quantize(black_box(x), fmt).unwrap().raw()));
      });
    }
  }
  g.finish();
}

// Time whole batches

fn batch_data(len: usize) -> Vec<f64> {
  (0 .. len).map(|i| (i as f64 * 0.7311).sin() * 37.5).collect()
}

fn quantize_batches(c: &mut Criterion) {
  let fmt: FixedFormat = "ap_fixed<16,7,AP_RND_CONV,AP_SAT>".parse().unwrap();
  let mut g = c.benchmark_group("quantize_batch");
  for len in [16, 1024, 65536] {
    let data = Batch::Sequence(batch_data(len));
    g.throughput(Throughput::Elements(len as u64));
    g.bench_with_input(BenchmarkId::new("raw", len), &data, |b, data| {
      b.iter(|| quantize_batch(black_box(data), fmt).unwrap());
    });
    let q = quantize_batch(&data, fmt).unwrap();
    g.bench_with_input(BenchmarkId::new("binary", len), &q, |b, q| {
      b.iter(|| convert(black_box(q), Repr::Binary).unwrap());
    });
  }
  g.finish();
}

fn parallel_columns(c: &mut Criterion) {
  let fmt: FixedFormat = "ap_fixed<16,7,AP_RND_CONV,AP_SAT>".parse().unwrap();
  let columns = Keyed::from_columns((0 .. 16).map(|i| (format!("c{i}"), batch_data(8192)))).unwrap();
  let mut g = c.benchmark_group("quantize_columns");
  g.throughput(Throughput::Elements(16 * 8192));
  g.bench_function("16x8192", |b| {
    b.iter(|| soft_fixed::par::quantize_columns(black_box(&columns), &fmt.into()).unwrap());
  });
  g.finish();
}

fn scaler_apply(c: &mut Criterion) {
  let data = Batch::Sequence(batch_data(65536));
  let mut scaler = RangeScaler::new();
  scaler.fit(&data, &FitOptions::new()).unwrap();
  let mut g = c.benchmark_group("scaler_apply");
  g.throughput(Throughput::Elements(65536));
  g.bench_function("65536", |b| {
    b.iter(|| scaler.apply(black_box(&data)).unwrap());
  });
  g.finish();
}

criterion_group!(baseline_fpu,
  baseline_fpu_round_f64,
);

criterion_group!(single,
  decode,
  scale_round,
  quantize_one,
);

criterion_group!(batches,
  quantize_batches,
  parallel_columns,
  scaler_apply,
);

criterion_main!(baseline_fpu, single, batches);
