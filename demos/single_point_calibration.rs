//! Calibration with a single ATM quote.
//!
//! With one maturity the mean-reversion speed cannot be identified, so
//! kappa is held at the initial guess and only v0 and theta are fitted.
//! Shows how the fitted term structure changes with the kappa chosen.

use fx_hedge_engine::model::{HestonCalibrator, InitialGuess, MarketVolPoint};

fn main() {
    println!("╔═══════════════════════════════════════════════════╗");
    println!("║  fx-hedge-engine: Single-Point Heston Calibration ║");
    println!("╚═══════════════════════════════════════════════════╝\n");

    let market = [MarketVolPoint::new(1.0, 0.065)];
    println!("Market: 1Y ATM vol {:.2}%\n", market[0].atm_vol * 100.0);

    println!(
        "  {:>6} {:>10} {:>10} {:>8} {:>8} {:>8} {:>8}",
        "kappa", "v0", "theta", "3M", "1Y", "5Y", "Feller"
    );
    for kappa in [0.5, 1.0, 2.0, 4.0] {
        let guess = InitialGuess {
            v0: 0.003,
            kappa,
            theta: 0.006,
        };
        let calibration = match HestonCalibrator::new(-0.7, 0.3)
            .with_initial_guess(guess)
            .calibrate(&market)
        {
            Ok(c) => c,
            Err(e) => {
                eprintln!("  kappa {:.1}: {}", kappa, e);
                continue;
            }
        };
        let p = calibration.parameters;
        println!(
            "  {:>6.1} {:>10.6} {:>10.6} {:>7.2}% {:>7.2}% {:>7.2}% {:>8}",
            p.kappa,
            p.v0,
            p.theta,
            p.atm_vol(0.25) * 100.0,
            p.atm_vol(1.0) * 100.0,
            p.atm_vol(5.0) * 100.0,
            if p.feller_satisfied() { "yes" } else { "no" }
        );
    }
}
