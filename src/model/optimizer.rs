//! Bounded Nelder–Mead simplex search.
//!
//! Derivative-free and fully deterministic: the same objective, start point
//! and options always produce the same iterates. Bounds are enforced by
//! clamping every trial vertex into the box.

/// Axis-aligned box constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    /// Returns `None` if the vectors differ in length or any `lower > upper`.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Option<Self> {
        if lower.len() != upper.len() || lower.iter().zip(&upper).any(|(l, u)| l > u) {
            return None;
        }
        Some(Self { lower, upper })
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(v, (lo, hi))| v.clamp(*lo, *hi))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadOptions {
    pub max_iterations: usize,
    /// Absolute size of the initial simplex edge along each axis.
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Stop once the best vertex is at or below this objective value.
    pub objective_floor: f64,
    /// Stop once the vertex values differ by at most this much...
    pub f_tolerance: f64,
    /// ...and every vertex lies within this distance of the centroid.
    pub x_tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 4_000,
            initial_step: 0.25,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            objective_floor: 1e-20,
            f_tolerance: 1e-18,
            x_tolerance: 1e-10,
        }
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    ObjectiveFloor,
    SimplexCollapsed,
    MaxIterations,
    NonFiniteObjective,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadOutcome {
    pub x: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

impl NelderMeadOutcome {
    pub fn converged(&self) -> bool {
        matches!(
            self.termination,
            Termination::ObjectiveFloor | Termination::SimplexCollapsed
        )
    }
}

/// Minimise `objective` inside `bounds` starting from `initial`.
///
/// Panics if `initial` does not match the bounds' dimension; callers build
/// both from the same parameter layout.
pub fn nelder_mead<F>(
    initial: &[f64],
    bounds: &Bounds,
    options: NelderMeadOptions,
    mut objective: F,
) -> NelderMeadOutcome
where
    F: FnMut(&[f64]) -> f64,
{
    let dim = bounds.dimension();
    assert_eq!(initial.len(), dim, "start point does not match bounds");

    let mut evaluations = 0usize;
    let mut eval = |x: &[f64]| {
        evaluations += 1;
        objective(x)
    };

    let x0 = bounds.clamp(initial);
    let mut simplex = Vec::with_capacity(dim + 1);
    let mut values = Vec::with_capacity(dim + 1);
    values.push(eval(&x0));
    simplex.push(x0.clone());

    for d in 0..dim {
        let mut x = x0.clone();
        x[d] = (x0[d] + options.initial_step).min(bounds.upper[d]);
        if (x[d] - x0[d]).abs() < 1e-14 {
            x[d] = (x0[d] - options.initial_step).max(bounds.lower[d]);
        }
        values.push(eval(&x));
        simplex.push(x);
    }

    let mut iterations = 0usize;
    let mut termination = Termination::MaxIterations;

    for iter in 0..options.max_iterations {
        iterations = iter + 1;

        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        if !values[0].is_finite() {
            termination = Termination::NonFiniteObjective;
            break;
        }
        if values[0] <= options.objective_floor {
            termination = Termination::ObjectiveFloor;
            break;
        }

        let centroid: Vec<f64> = (0..dim)
            .map(|d| simplex.iter().take(dim).map(|x| x[d]).sum::<f64>() / dim as f64)
            .collect();

        let spread = (values[dim] - values[0]).abs();
        let diameter = simplex
            .iter()
            .map(|x| distance(x, &centroid))
            .fold(0.0_f64, f64::max);
        if spread <= options.f_tolerance && diameter <= options.x_tolerance {
            termination = Termination::SimplexCollapsed;
            break;
        }

        let toward = |coef: f64, from: &[f64]| -> Vec<f64> {
            let x: Vec<f64> = (0..dim)
                .map(|d| centroid[d] + coef * (from[d] - centroid[d]))
                .collect();
            bounds.clamp(&x)
        };

        let xr = toward(-options.reflection, &simplex[dim]);
        let fr = eval(&xr);

        if fr < values[0] {
            let xe = toward(options.expansion, &xr);
            let fe = eval(&xe);
            if fe < fr {
                simplex[dim] = xe;
                values[dim] = fe;
            } else {
                simplex[dim] = xr;
                values[dim] = fr;
            }
            continue;
        }

        if fr < values[dim - 1] {
            simplex[dim] = xr;
            values[dim] = fr;
            continue;
        }

        let xc = toward(options.contraction, &simplex[dim]);
        let fc = eval(&xc);
        if fc < values[dim] {
            simplex[dim] = xc;
            values[dim] = fc;
            continue;
        }

        for i in 1..=dim {
            let shrunk: Vec<f64> = (0..dim)
                .map(|d| simplex[0][d] + options.shrink * (simplex[i][d] - simplex[0][d]))
                .collect();
            let shrunk = bounds.clamp(&shrunk);
            values[i] = eval(&shrunk);
            simplex[i] = shrunk;
        }
    }

    let best = (0..=dim)
        .min_by(|&i, &j| values[i].total_cmp(&values[j]))
        .unwrap_or(0);

    NelderMeadOutcome {
        x: simplex[best].clone(),
        objective: values[best],
        iterations,
        evaluations,
        termination,
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_minimum() {
        let bounds = Bounds::new(vec![-5.0, -5.0], vec![5.0, 5.0]).unwrap();
        let out = nelder_mead(&[2.0, -3.0], &bounds, NelderMeadOptions::default(), |x| {
            (x[0] - 0.25).powi(2) + 3.0 * (x[1] + 0.4).powi(2)
        });
        assert!(out.converged());
        assert!((out.x[0] - 0.25).abs() < 1e-6);
        assert!((out.x[1] + 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_minimum_outside_box_lands_on_bound() {
        let bounds = Bounds::new(vec![-1.0, -1.0], vec![1.0, 1.0]).unwrap();
        let out = nelder_mead(&[0.0, 0.0], &bounds, NelderMeadOptions::default(), |x| {
            (x[0] - 3.0).powi(2) + (x[1] - 0.5).powi(2)
        });
        assert!((out.x[0] - 1.0).abs() < 1e-6);
        assert!((out.x[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_budget_exhaustion_reported() {
        let bounds = Bounds::new(vec![-10.0; 3], vec![10.0; 3]).unwrap();
        let options = NelderMeadOptions {
            max_iterations: 3,
            ..Default::default()
        };
        let out = nelder_mead(&[5.0, 5.0, 5.0], &bounds, options, |x| {
            x.iter().map(|v| (v - 1.0).powi(2)).sum()
        });
        assert_eq!(out.termination, Termination::MaxIterations);
        assert!(!out.converged());
        assert_eq!(out.iterations, 3);
    }

    #[test]
    fn test_deterministic() {
        let bounds = Bounds::new(vec![-2.0, -2.0], vec![2.0, 2.0]).unwrap();
        let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let a = nelder_mead(&[-1.2, 1.0], &bounds, NelderMeadOptions::default(), rosenbrock);
        let b = nelder_mead(&[-1.2, 1.0], &bounds, NelderMeadOptions::default(), rosenbrock);
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(Bounds::new(vec![1.0], vec![0.0]).is_none());
        assert!(Bounds::new(vec![0.0, 0.0], vec![1.0]).is_none());
    }
}
