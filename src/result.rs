//! The JSON-shaped solve result (§6.2).
//!
//! Grounded on `Simplex::get_solution` in
//! `examples/original_source/simplex/src/simplex.cc` for field shape
//! (variables, solution, objective), generalized with `serde` the way the
//! rest of this crate family serializes its outputs, plus the
//! `integerSolution` snap procedure the source never implemented.

use serde::{Deserialize, Serialize};

use crate::lp::driver::SolveResult;
use crate::lp::problem::{Constraint, Sense};
use crate::scalar::{Scalar, floor_toward_negative_infinity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionReport {
    pub variables: Vec<String>,
    pub solution: Vec<String>,
    #[serde(rename = "unboundedRay")]
    pub unbounded_ray: Vec<String>,
    #[serde(rename = "infeasibilityRay")]
    pub infeasibility_ray: Vec<String>,
    #[serde(rename = "integerSolution")]
    pub integer_solution: bool,
    #[serde(rename = "objectiveValue")]
    pub objective_value: String,
}

impl SolutionReport {
    /// Serializes to the §6.2 JSON shape (camelCase field names, as declared
    /// on the struct above).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Same as [`Self::to_json`], pretty-printed for a human-facing CLI.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds the external report for a solve outcome. `integer_snap` enables
/// the §6.2 enumeration procedure; the caller is responsible for only
/// setting it when `variable_names.len() <= 8` and the requested precision
/// is the default (§6.2: "only attempted when n <= 8 and requested
/// precision <= 0"). `original_constraints`/`original_costs` are the
/// caller's pre-standard-form rows (arbitrary sense), so feasibility here
/// is checked the way the user actually wrote the problem, not against the
/// slack-padded equality system the engine solves internally. `flipped`
/// must be the same flag `ProblemModel::to_standard_form` returned, since
/// `original_costs` (like the engine's own internal costs) is in minimize
/// sense regardless of the caller's original direction (`driver.rs`
/// restores sign the same way for the continuous `Optimal` case).
pub fn build_report<S: Scalar>(
    variable_names: &[String],
    result: &SolveResult<S>,
    original_constraints: Option<&[Constraint<S>]>,
    original_costs: Option<&[S]>,
    integer_snap: bool,
    flipped: bool,
) -> SolutionReport {
    match result {
        SolveResult::Optimal {
            solution,
            objective,
            ..
        } => {
            let (solution, objective, snapped) = if integer_snap {
                match try_integer_snap(solution, original_constraints, original_costs) {
                    Some((snapped_solution, snapped_objective)) => {
                        let snapped_objective = if flipped { -snapped_objective } else { snapped_objective };
                        (snapped_solution, snapped_objective, true)
                    }
                    None => (solution.clone(), *objective, false),
                }
            } else {
                (solution.clone(), *objective, false)
            };

            SolutionReport {
                variables: variable_names.to_vec(),
                solution: solution.iter().map(|v| v.to_string()).collect(),
                unbounded_ray: Vec::new(),
                infeasibility_ray: Vec::new(),
                integer_solution: snapped,
                objective_value: objective.to_string(),
            }
        }
        SolveResult::Unbounded { ray } => SolutionReport {
            variables: variable_names.to_vec(),
            solution: Vec::new(),
            unbounded_ray: ray.iter().map(|v| v.to_string()).collect(),
            infeasibility_ray: Vec::new(),
            integer_solution: false,
            objective_value: String::new(),
        },
        SolveResult::Infeasible { certificate } => SolutionReport {
            variables: variable_names.to_vec(),
            solution: Vec::new(),
            unbounded_ray: Vec::new(),
            infeasibility_ray: certificate.iter().map(|v| v.to_string()).collect(),
            integer_solution: false,
            objective_value: String::new(),
        },
        SolveResult::NeedsFixup { .. } | SolveResult::Timeout { .. } | SolveResult::Interrupted { .. } => SolutionReport {
            variables: variable_names.to_vec(),
            solution: Vec::new(),
            unbounded_ray: Vec::new(),
            infeasibility_ray: Vec::new(),
            integer_solution: false,
            objective_value: String::new(),
        },
    }
}

/// §6.2's `integerSolution` procedure: enumerate the `2^n`
/// `(floor(x_i), ceil(x_i))` combinations, keep the feasible one — tested
/// against the caller's original constraints at `TOL_FEAS` — with the best
/// original-sense objective. `floor` is the sign-independent helper from
/// §9's design notes, not a backend whose `floor` surprises by truncating
/// toward zero.
fn try_integer_snap<S: Scalar>(
    solution: &[S],
    constraints: Option<&[Constraint<S>]>,
    costs: Option<&[S]>,
) -> Option<(Vec<S>, S)> {
    let n = solution.len();
    if n == 0 || n > 8 {
        return None;
    }
    let (constraints, costs) = match (constraints, costs) {
        (Some(c), Some(costs)) => (c, costs),
        _ => return None,
    };

    let floors: Vec<i64> = solution.iter().map(|&x| floor_toward_negative_infinity(x)).collect();

    let mut best: Option<(Vec<S>, S)> = None;
    for mask in 0..(1u32 << n) {
        let candidate: Vec<S> = (0..n)
            .map(|i| {
                let use_ceil = (mask >> i) & 1 == 1;
                let floor_value = S::from_f64(floors[i] as f64);
                if use_ceil { floor_value + S::one() } else { floor_value }
            })
            .collect();

        if !satisfies_all(constraints, &candidate) {
            continue;
        }

        let objective = dot(costs, &candidate);
        match &best {
            None => best = Some((candidate, objective)),
            Some((_, best_obj)) if objective < *best_obj => best = Some((candidate, objective)),
            _ => {}
        }
    }

    best
}

fn satisfies_all<S: Scalar>(constraints: &[Constraint<S>], x: &[S]) -> bool {
    constraints.iter().all(|c| satisfies(c, x))
}

fn satisfies<S: Scalar>(c: &Constraint<S>, x: &[S]) -> bool {
    let lhs = dot(&c.coefficients, x);
    match c.sense {
        Sense::LessEqual => lhs <= c.rhs + S::tol_feas(),
        Sense::GreaterEqual | Sense::NonNegative => lhs >= c.rhs - S::tol_feas(),
        Sense::Equal => (lhs - c.rhs).abs() <= S::tol_feas(),
    }
}

fn dot<S: Scalar>(c: &[S], x: &[S]) -> S {
    c.iter().zip(x.iter()).fold(S::zero(), |acc, (a, b)| acc + *a * *b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_report_for_optimal_result() {
        let result = SolveResult::Optimal {
            solution: vec![0.6_f64, 0.2],
            objective: 0.46,
            dual: vec![0.2, 0.0667],
        };
        let report = build_report(&["x1".to_string(), "x2".to_string()], &result, None, None, false, true);
        assert_eq!(report.solution, vec!["0.6".to_string(), "0.2".to_string()]);
        assert!(!report.integer_solution);
    }

    #[test]
    fn serializes_to_the_camel_case_json_shape() {
        let result = SolveResult::Optimal {
            solution: vec![0.6_f64, 0.2],
            objective: 0.46,
            dual: vec![0.2, 0.0667],
        };
        let report = build_report(&["x1".to_string(), "x2".to_string()], &result, None, None, false, true);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"objectiveValue\":\"0.46\""));
        assert!(json.contains("\"integerSolution\":false"));

        let round_tripped: SolutionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped.solution, report.solution);
    }

    #[test]
    fn integer_snap_picks_best_feasible_corner() {
        // Maximize x+y s.t. x+2y<=4, 3x+y<=6: continuous optimum (1.6, 1.2).
        // Internal costs are in minimize sense (-1, -1); best integer
        // corner among the 4 floor/ceil combinations is (1, 1), obj -2.
        let constraints = vec![
            Constraint {
                coefficients: vec![1.0, 2.0],
                sense: Sense::LessEqual,
                rhs: 4.0,
            },
            Constraint {
                coefficients: vec![3.0, 1.0],
                sense: Sense::LessEqual,
                rhs: 6.0,
            },
            Constraint {
                coefficients: vec![1.0, 0.0],
                sense: Sense::NonNegative,
                rhs: 0.0,
            },
            Constraint {
                coefficients: vec![0.0, 1.0],
                sense: Sense::NonNegative,
                rhs: 0.0,
            },
        ];
        let costs = vec![-1.0, -1.0];
        let solution = vec![1.6_f64, 1.2];

        let (snapped, objective) = try_integer_snap(&solution, Some(&constraints), Some(&costs)).unwrap();
        assert_eq!(snapped, vec![1.0, 1.0]);
        assert_eq!(objective, -2.0);
    }
}
