//! fx-hedge-engine CLI
//!
//! Compare FX hedging strategies on a cash-flow scenario from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Run the full comparison on a scenario file
//! fx-hedge-engine run --input scenario.json
//!
//! # Output as JSON
//! fx-hedge-engine run --input scenario.json --format json
//!
//! # Calibrate only
//! fx-hedge-engine calibrate --input scenario.json
//!
//! # Write the reference EUR/USD scenario
//! fx-hedge-engine sample --output scenario.json
//! ```

use chrono::NaiveDate;
use fx_hedge_engine::analysis::{AnalysisConfig, AnalysisInputs, HedgeAnalysis};
use fx_hedge_engine::core::cashflow::CashFlowSchedule;
use fx_hedge_engine::core::currency::CurrencyPair;
use fx_hedge_engine::core::curve::RateCurve;
use fx_hedge_engine::core::volatility::MarketVolPoint;
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"fx-hedge-engine — Heston Monte Carlo comparison of FX hedging strategies

USAGE:
    fx-hedge-engine <COMMAND> [OPTIONS]

COMMANDS:
    run         Calibrate, simulate and compare Unhedged/Forward/Put/Collar
    calibrate   Calibrate the Heston model to the scenario's ATM vols
    sample      Write the reference EUR/USD scenario as JSON
    help        Show this message

OPTIONS (run, calibrate):
    --input <FILE>      Path to JSON scenario file
    --format <FORMAT>   Output format: text (default) or json (run only)

OPTIONS (sample):
    --output <FILE>     Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG            Log level, e.g. RUST_LOG=info

EXAMPLES:
    fx-hedge-engine sample --output scenario.json
    fx-hedge-engine run --input scenario.json
    fx-hedge-engine run --input scenario.json --format json
    fx-hedge-engine calibrate --input scenario.json"#
    );
}

/// JSON schema for a rate-curve node.
#[derive(serde::Deserialize, serde::Serialize)]
struct CurvePointInput {
    tenor: f64,
    rate: f64,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct CashFlowInput {
    date: NaiveDate,
    /// Signed foreign-currency amount; negative for outflows.
    amount: String,
}

/// JSON schema for a scenario file.
#[derive(serde::Deserialize, serde::Serialize)]
struct ScenarioFile {
    #[serde(default = "default_pair")]
    pair: String,
    valuation_date: NaiveDate,
    spot: f64,
    domestic_curve: Vec<CurvePointInput>,
    foreign_curve: Vec<CurvePointInput>,
    market_vols: Vec<MarketVolPoint>,
    cash_flows: Vec<CashFlowInput>,
    #[serde(default)]
    config: AnalysisConfig,
}

fn default_pair() -> String {
    "EUR/USD".to_string()
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_scenario(path: &str) -> (AnalysisInputs, AnalysisConfig) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: ScenarioFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Run `fx-hedge-engine sample` for a complete example scenario.");
        process::exit(1);
    });

    let pair = CurrencyPair::parse(&file.pair).unwrap_or_else(|e| fail(e));

    let mut flows = Vec::with_capacity(file.cash_flows.len());
    for cf in &file.cash_flows {
        let amount: Decimal = cf.amount.parse().unwrap_or_else(|e| {
            eprintln!("Invalid amount '{}': {}", cf.amount, e);
            process::exit(1);
        });
        flows.push((cf.date, amount));
    }
    let schedule = CashFlowSchedule::from_signed(file.valuation_date, flows).unwrap_or_else(|e| fail(e));

    let curve = |points: &[CurvePointInput], currency| {
        RateCurve::new(currency, points.iter().map(|p| (p.tenor, p.rate))).unwrap_or_else(|e| fail(e))
    };
    let domestic = curve(&file.domestic_curve, pair.domestic().clone());
    let foreign = curve(&file.foreign_curve, pair.foreign().clone());

    let inputs = AnalysisInputs {
        pair,
        schedule,
        spot: file.spot,
        domestic,
        foreign,
        market_vols: file.market_vols,
    };
    (inputs, file.config)
}

fn parse_input_and_format(args: &[String]) -> (String, String) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    if format != "text" && format != "json" {
        eprintln!("Unknown format '{}': expected 'text' or 'json'", format);
        process::exit(1);
    }
    (path, format)
}

fn cmd_run(args: &[String]) {
    let (path, format) = parse_input_and_format(args);
    let (inputs, config) = load_scenario(&path);

    let analysis = HedgeAnalysis::new(inputs, config).unwrap_or_else(|e| fail(e));
    let table = analysis.run().unwrap_or_else(|e| fail(e));

    if format == "json" {
        let json = serde_json::to_string_pretty(&table).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        print!("{}", table);
    }
}

fn cmd_calibrate(args: &[String]) {
    let (path, _) = parse_input_and_format(args);
    let (inputs, config) = load_scenario(&path);

    let analysis = HedgeAnalysis::new(inputs, config).unwrap_or_else(|e| fail(e));
    let calibration = analysis.calibrate().unwrap_or_else(|e| fail(e));
    let p = calibration.parameters;
    let market = &analysis.inputs().market_vols;

    println!("=== Heston Calibration ===");
    println!("v0:        {:.6}  (vol {:.2}%)", p.v0, p.v0.sqrt() * 100.0);
    println!(
        "kappa:     {:.4}{}",
        p.kappa,
        if calibration.kappa_fixed { "  (held fixed)" } else { "" }
    );
    println!("theta:     {:.6}  (vol {:.2}%)", p.theta, p.theta.sqrt() * 100.0);
    println!("xi:        {:.4}", p.xi);
    println!("rho:       {:.4}", p.rho);
    println!("Feller:    {}", if p.feller_satisfied() { "satisfied" } else { "violated" });
    println!("Objective: {:e}  ({} iterations)", calibration.objective, calibration.iterations);
    println!("Max variance error: {:e}", calibration.max_variance_error(market));

    println!("\nATM vol term structure:");
    println!("  {:>8} {:>10} {:>10}", "Maturity", "Model", "Market");
    let mut maturities: Vec<f64> = vec![0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0];
    maturities.extend(market.iter().map(|m| m.maturity));
    maturities.sort_by(|a, b| a.total_cmp(b));
    maturities.dedup();
    for t in maturities {
        let quoted = market
            .iter()
            .find(|m| m.maturity == t)
            .map(|m| format!("{:>9.3}%", m.atm_vol * 100.0))
            .unwrap_or_else(|| format!("{:>10}", "-"));
        println!("  {:>7.2}y {:>9.3}% {}", t, p.atm_vol(t) * 100.0, quoted);
    }
}

fn cmd_sample(args: &[String]) {
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| fail("invalid sample date"));
    let flow = |y, amount: &str| CashFlowInput {
        date: date(y, 10, 1),
        amount: amount.to_string(),
    };
    let scenario = ScenarioFile {
        pair: default_pair(),
        valuation_date: date(2025, 8, 1),
        spot: 1.10,
        domestic_curve: vec![CurvePointInput {
            tenor: 1.0,
            rate: 0.04,
        }],
        foreign_curve: vec![CurvePointInput {
            tenor: 1.0,
            rate: 0.025,
        }],
        market_vols: vec![MarketVolPoint::new(1.0, 0.06), MarketVolPoint::new(5.0, 0.07)],
        cash_flows: vec![
            flow(2025, "-10000000"),
            flow(2026, "1000000"),
            flow(2027, "1000000"),
            flow(2029, "1000000"),
            flow(2030, "11000000"),
        ],
        config: AnalysisConfig::default(),
    };

    let json = serde_json::to_string_pretty(&scenario).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Wrote reference EUR/USD scenario → {}", path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "calibrate" => cmd_calibrate(rest),
        "sample" => cmd_sample(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
