//! Basic hedge comparison example.
//!
//! Values a EUR receivable schedule in USD under four hedging strategies
//! and prints the comparison table.

use chrono::NaiveDate;
use fx_hedge_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  fx-hedge-engine: Basic Hedging Comparison   ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");

    // --- Exposure: pay EUR 10M now, receive it back with coupons ---
    println!("━━━ Cash Flows (EUR) ━━━\n");
    let schedule = CashFlowSchedule::from_signed(
        date(2025, 8, 1),
        vec![
            (date(2025, 10, 1), dec!(-10_000_000)),
            (date(2026, 10, 1), dec!(1_000_000)),
            (date(2027, 10, 1), dec!(1_000_000)),
            (date(2029, 10, 1), dec!(1_000_000)),
            (date(2030, 10, 1), dec!(11_000_000)),
        ],
    )
    .expect("valid schedule");

    for (flow, t) in schedule.flows().iter().zip(schedule.times()) {
        println!(
            "  {}  {:>8} {:>14}   (t = {:.3}y)",
            flow.date(),
            flow.direction(),
            flow.amount(),
            t
        );
    }
    println!("  Net foreign amount: {}\n", schedule.net_foreign_amount());

    let inputs = AnalysisInputs {
        pair: CurrencyPair::default(),
        schedule,
        spot: 1.10,
        domestic: RateCurve::new(CurrencyCode::new("USD"), vec![(1.0, 0.040), (5.0, 0.040)])
            .expect("valid USD curve"),
        foreign: RateCurve::new(CurrencyCode::new("EUR"), vec![(1.0, 0.025), (5.0, 0.025)])
            .expect("valid EUR curve"),
        market_vols: vec![MarketVolPoint::new(1.0, 0.06), MarketVolPoint::new(5.0, 0.07)],
    };

    let analysis = HedgeAnalysis::new(inputs, AnalysisConfig::default()).expect("valid inputs");
    let table = analysis.run().expect("analysis failed");

    println!("{}", table);

    if let Some(best) = table.best_var95() {
        println!("━━━ Best 95% tail ━━━\n");
        println!(
            "  {} (VaR 95% {:.0} USD, {:+.0} vs unhedged)",
            best.strategy, best.report.var_95, best.var95_improvement
        );
    }
}
