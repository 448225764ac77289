use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ev_core::{InputControls, ModelParams};
use ev_sweep::RateAxis;
use rust_decimal::Decimal;

fn bench_evaluate(c: &mut Criterion) {
    let params = ModelParams::reference();
    c.bench_function("evaluate reference", |b| {
        b.iter(|| ev_model::evaluate(black_box(&params)))
    });
}

fn bench_sweep(c: &mut Criterion) {
    let controls = InputControls::standard();
    let fine = Decimal::new(1, 2);
    let flop = RateAxis::new(controls.flop_rate.min, controls.flop_rate.max, fine).unwrap();
    let hit = RateAxis::new(controls.hit_rate.min, controls.hit_rate.max, fine).unwrap();
    let base = ModelParams::reference();
    c.bench_function("sweep 51x26 rate grid", |b| {
        b.iter(|| {
            let _ = black_box(ev_sweep::sweep(&base, flop, hit));
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_sweep);
criterion_main!(benches);
