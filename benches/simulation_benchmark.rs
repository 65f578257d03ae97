use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fx_hedge_engine::core::volatility::MarketVolPoint;
use fx_hedge_engine::model::{HestonCalibrator, HestonParameters};
use fx_hedge_engine::risk::RiskReport;
use fx_hedge_engine::simulation::{PathSimulator, SimulationConfig};

fn params() -> HestonParameters {
    HestonParameters::new(0.0036, 2.0, 0.0049, 0.3, -0.7)
}

fn bench_simulate_1000_paths_1y(c: &mut Criterion) {
    let config = SimulationConfig::new(1.10, 0.04, 0.025).with_trials(1_000);
    let simulator = PathSimulator::new(params(), config, &[0.25, 0.5, 1.0]).unwrap();

    c.bench_function("simulate_1000_paths_1y", |b| {
        b.iter(|| black_box(&simulator).simulate().unwrap())
    });
}

fn bench_simulate_10000_paths_5y(c: &mut Criterion) {
    let config = SimulationConfig::new(1.10, 0.04, 0.025).with_trials(10_000);
    let simulator = PathSimulator::new(params(), config, &[1.0, 2.0, 4.0, 5.2]).unwrap();

    let mut group = c.benchmark_group("simulate_10000_paths_5y");
    group.sample_size(10);
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(&simulator).simulate().unwrap())
    });
    group.finish();
}

fn bench_calibration(c: &mut Criterion) {
    let market = [MarketVolPoint::new(1.0, 0.06), MarketVolPoint::new(5.0, 0.07)];
    let calibrator = HestonCalibrator::new(-0.7, 0.3);

    c.bench_function("calibrate_two_points", |b| {
        b.iter(|| calibrator.calibrate(black_box(&market)).unwrap())
    });
}

fn bench_risk_report(c: &mut Criterion) {
    let npvs: Vec<f64> = (0..10_000u64)
        .map(|i| ((i.wrapping_mul(2_654_435_761) % 1_000_003) as f64) - 500_000.0)
        .collect();

    c.bench_function("risk_report_10000", |b| {
        b.iter(|| RiskReport::from_npvs(black_box(&npvs)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_simulate_1000_paths_1y,
    bench_simulate_10000_paths_5y,
    bench_calibration,
    bench_risk_report
);
criterion_main!(benches);
