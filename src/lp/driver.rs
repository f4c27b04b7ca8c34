//! Two-phase driver (C8).
//!
//! Grounded on `Simplex::process_to_artificial_problem` and
//! `Simplex::solve` in `examples/original_source/simplex/src/simplex.cc`:
//! the backward identity-column scan that builds the phase-1 basis, the
//! phase-1/phase-2 hand-off with artificial-variable cleanup, and the
//! lift-back to the caller's variable space (§4.8).

use macros::{explicit_options, use_option};

use crate::SolverError;
use crate::SolverHooks;
use crate::SolverOptions;
use crate::Status;
use crate::linalg::matrix::DenseMatrix;
use crate::lp::column_set::ColumnSet;
use crate::lp::engine::{EngineOutcome, SimplexEngine};
use crate::lp::problem::{ProblemModel, VariableOrigin};
use crate::scalar::Scalar;

/// What a solve actually produced, mirroring the normal-result taxonomy of
/// §7 (everything here is a legitimate outcome, never an error).
#[derive(Debug, Clone)]
pub enum SolveResult<S: Scalar> {
    Optimal {
        /// Values in the *original* variable space, lifted back per §4.8.
        solution: Vec<S>,
        objective: S,
        dual: Vec<S>,
    },
    Unbounded {
        ray: Vec<S>,
    },
    Infeasible {
        /// The phase-1 basic solution witnessing infeasibility.
        certificate: Vec<S>,
    },
    NeedsFixup {
        message: String,
    },
    Timeout {
        /// Best solution known when the cap was hit, lifted back.
        solution: Vec<S>,
    },
    /// A [`crate::terminators::Terminator`] stopped the solve early.
    Interrupted {
        /// Best solution known when the terminator fired, lifted back.
        solution: Vec<S>,
    },
}

#[explicit_options(name = SolverOptions)]
pub struct TwoPhaseDriver<S: Scalar> {
    engine: SimplexEngine<S>,
}

impl<S: Scalar> TwoPhaseDriver<S> {
    pub fn new(options: &SolverOptions) -> Self {
        Self {
            options: options.into(),
            engine: SimplexEngine::new(options),
        }
    }

    /// Runs the full §4.8 pipeline on an already-standard-form problem
    /// (caller has applied [`ProblemModel::to_standard_form`]). `hooks` is
    /// forwarded to both engine phases; pass [`SolverHooks::default`] for a
    /// plain solve with no instrumentation or early cancellation.
    pub fn solve(
        &self,
        standard: &ProblemModel<S>,
        flipped: bool,
        hooks: &mut SolverHooks,
    ) -> Result<SolveResult<S>, SolverError> {
        let (a, b) = standard.structural_system();
        // Every equality row is sign-invariant; flip rows with a negative
        // RHS to non-negative before scanning for identity columns so a
        // structurally-unit slack with the wrong sign can't masquerade as a
        // feasible starting basis (the `x <= -1, x >= 0` shape of §8
        // scenario 3 depends on this).
        let (a, b) = normalize_rhs_sign(a, b);
        let real_c: Vec<S> = standard.objective.costs.clone();
        let n_real = a.cols();

        let (artificial_a, phase1_c, initial_basis, artificial_cols) =
            build_artificial_problem(&a);

        let phase1 = self.engine.solve(&artificial_a, &b, &phase1_c, initial_basis, hooks)?;

        let (mut basis, phase1_x_b, phase1_objective) = match phase1 {
            EngineOutcome::Optimal {
                basis,
                x_basic,
                objective,
                ..
            } => (basis, x_basic, objective),
            EngineOutcome::Unbounded { .. } => {
                // A phase-1 (feasibility) objective, bounded below by 0, is
                // structurally never unbounded for a well-formed artificial
                // problem; treat it as a fixup signal rather than panicking.
                return Ok(SolveResult::NeedsFixup {
                    message: "phase-1 objective reported unbounded".to_string(),
                });
            }
            EngineOutcome::NeedsFixup { message } => {
                return Ok(SolveResult::NeedsFixup { message });
            }
            EngineOutcome::Timeout { x_basic, basis } => {
                let full = expand_to_full(n_real + artificial_cols.len(), &basis, &x_basic);
                return Ok(SolveResult::Timeout {
                    solution: lift_solution(standard, &full[..n_real], flipped),
                });
            }
            EngineOutcome::Terminated { status, x_basic, basis } => {
                let full = expand_to_full(n_real + artificial_cols.len(), &basis, &x_basic);
                let solution = lift_solution(standard, &full[..n_real], flipped);
                return Ok(terminated_result(status, solution));
            }
        };

        if phase1_objective.abs() > S::tol_feas() {
            let full = expand_to_full(n_real + artificial_cols.len(), &basis, &phase1_x_b);
            return Ok(SolveResult::Infeasible {
                certificate: full[..n_real].to_vec(),
            });
        }

        // Basis hand-off: drive out any artificial still sitting in the
        // basis at value 0.
        for q_pos in 0..basis.len() {
            let Some(col) = basis.get(q_pos) else { continue };
            if !artificial_cols.contains(&col) {
                continue;
            }

            let replacement = find_replacement_column(&artificial_a, &basis, q_pos, &artificial_cols);
            match replacement {
                Some(j) => {
                    basis.substitute(col, j);
                }
                None => {
                    return Ok(SolveResult::NeedsFixup {
                        message: format!(
                            "row {q_pos} is linearly dependent on the others: no non-artificial replacement column"
                        ),
                    });
                }
            }
        }

        // Phase 2: drop artificial columns, restore the real objective.
        let phase2_a = drop_columns(&artificial_a, &artificial_cols);
        let phase2_c: Vec<S> = real_c;

        let phase2 = self.engine.solve(&phase2_a, &b, &phase2_c, basis, hooks)?;
        match phase2 {
            EngineOutcome::Optimal {
                x_basic,
                dual,
                basis,
                ..
            } => {
                let full = expand_to_full(n_real, &basis, &x_basic);
                let solution = lift_solution(standard, &full, flipped);
                let objective = dot(&phase2_c, &full);
                let objective = if flipped { -objective } else { objective };
                Ok(SolveResult::Optimal {
                    solution,
                    objective,
                    dual,
                })
            }
            EngineOutcome::Unbounded { ray } => Ok(SolveResult::Unbounded {
                ray: lift_solution(standard, &ray, false),
            }),
            EngineOutcome::NeedsFixup { message } => Ok(SolveResult::NeedsFixup { message }),
            EngineOutcome::Timeout { x_basic, basis } => {
                let full = expand_to_full(n_real, &basis, &x_basic);
                Ok(SolveResult::Timeout {
                    solution: lift_solution(standard, &full, flipped),
                })
            }
            EngineOutcome::Terminated { status, x_basic, basis } => {
                let full = expand_to_full(n_real, &basis, &x_basic);
                let solution = lift_solution(standard, &full, flipped);
                Ok(terminated_result(status, solution))
            }
        }
    }
}

/// Maps an engine-level early stop to the matching driver-level outcome: a
/// [`Status::Interrupted`] terminator fire is reported distinctly from a
/// plain wall-clock/iteration-cap timeout.
fn terminated_result<S: Scalar>(status: Status, solution: Vec<S>) -> SolveResult<S> {
    match status {
        Status::Interrupted => SolveResult::Interrupted { solution },
        _ => SolveResult::Timeout { solution },
    }
}

/// Negates any row whose RHS is negative so every row of the returned
/// system has `b[i] >= 0`, without changing the solution set of `Ax = b`.
fn normalize_rhs_sign<S: Scalar>(mut a: DenseMatrix<S>, mut b: Vec<S>) -> (DenseMatrix<S>, Vec<S>) {
    for i in 0..a.rows() {
        if b[i] < S::zero() {
            for j in 0..a.cols() {
                a.set(i, j, -a.get(i, j));
            }
            b[i] = -b[i];
        }
    }
    (a, b)
}

/// §4.8 Phase 1, step 2: scan existing columns (most-recently-added first,
/// matching the source) for an identity column per row; append an
/// artificial unit column where none exists.
fn build_artificial_problem<S: Scalar>(
    a: &DenseMatrix<S>,
) -> (DenseMatrix<S>, Vec<S>, ColumnSet, Vec<usize>) {
    let m = a.rows();
    let n = a.cols();
    let mut basis = ColumnSet::unassigned(m);

    for i in 0..m {
        let mut found = None;
        for c in (0..n).rev() {
            let is_identity_column = (0..m).all(|j| {
                let expected = if j == i { S::one() } else { S::zero() };
                a.get(j, c) == expected
            });
            if is_identity_column {
                found = Some(c);
                break;
            }
        }
        if let Some(c) = found {
            basis.set(i, c);
        }
    }

    let missing: Vec<usize> = (0..m).filter(|&i| basis.get(i).is_none()).collect();
    let mut extended = DenseMatrix::new(m, n + missing.len());
    for i in 0..m {
        for j in 0..n {
            extended.set(i, j, a.get(i, j));
        }
    }
    let mut artificial_cols = Vec::with_capacity(missing.len());
    for (k, &row) in missing.iter().enumerate() {
        let col = n + k;
        extended.set(row, col, S::one());
        basis.set(row, col);
        artificial_cols.push(col);
    }

    let n_total = n + missing.len();
    let mut phase1_c = vec![S::zero(); n_total];
    for &col in &artificial_cols {
        phase1_c[col] = S::one();
    }

    (extended, phase1_c, basis, artificial_cols)
}

/// Basis hand-off helper: finds a non-artificial column `j` whose product
/// with the `q_pos`-th row of `B^-1` is nonzero, recomputing `B^-1` fresh
/// since the engine doesn't expose its internal one after returning.
fn find_replacement_column<S: Scalar>(
    a: &DenseMatrix<S>,
    basis: &ColumnSet,
    q_pos: usize,
    artificial_cols: &[usize],
) -> Option<usize> {
    let m = a.rows();
    let indices: Vec<usize> = (0..m).map(|i| basis.get(i).unwrap()).collect();
    let basis_matrix = {
        let mut out = DenseMatrix::new(m, m);
        for (j, &col) in indices.iter().enumerate() {
            let column = a.column(col);
            for i in 0..m {
                out.set(i, j, column[i]);
            }
        }
        out
    };
    let binv = crate::linalg::lu::inverse(&basis_matrix).ok()?;
    let row_q = binv.row(q_pos);

    for j in 0..a.cols() {
        if artificial_cols.contains(&j) || basis.contains(j) {
            continue;
        }
        let column = a.column(j);
        let mut dot = S::zero();
        for i in 0..m {
            dot = dot + row_q[i] * column[i];
        }
        if !dot.is_feasible_zero() {
            return Some(j);
        }
    }
    None
}

fn drop_columns<S: Scalar>(a: &DenseMatrix<S>, drop: &[usize]) -> DenseMatrix<S> {
    let m = a.rows();
    let keep: Vec<usize> = (0..a.cols()).filter(|c| !drop.contains(c)).collect();
    let mut out = DenseMatrix::new(m, keep.len());
    for (j, &col) in keep.iter().enumerate() {
        let column = a.column(col);
        for i in 0..m {
            out.set(i, j, column[i]);
        }
    }
    out
}

fn expand_to_full<S: Scalar>(n: usize, basis: &ColumnSet, x_basic: &[S]) -> Vec<S> {
    let mut x = vec![S::zero(); n];
    for (pos, value) in x_basic.iter().enumerate() {
        if let Some(col) = basis.get(pos) {
            if col < n {
                x[col] = *value;
            }
        }
    }
    x
}

fn dot<S: Scalar>(c: &[S], x: &[S]) -> S {
    c.iter().zip(x.iter()).fold(S::zero(), |acc, (a, b)| acc + *a * *b)
}

/// §4.8 Lifting: collapses the standard-form variable vector back to the
/// caller's original variables using each [`VariableOrigin`] tag.
fn lift_solution<S: Scalar>(standard: &ProblemModel<S>, x: &[S], flipped: bool) -> Vec<S> {
    let _ = flipped; // sign handling is applied to the objective, not the point.
    let mut out = Vec::new();
    for (idx, variable) in standard.variables.iter().enumerate() {
        match &variable.origin {
            VariableOrigin::Original => out.push(x[idx]),
            VariableOrigin::Slack | VariableOrigin::Auxiliary => {}
            VariableOrigin::Splitted { auxiliary_index } => {
                out.push(x[idx] - x[*auxiliary_index]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::problem::{Constraint, Direction, Objective, Sense, Variable};

    fn var(name: &str) -> Variable {
        Variable {
            name: name.to_string(),
            origin: VariableOrigin::Original,
        }
    }

    fn default_options() -> crate::SolverOptions {
        crate::SolverOptions::new()
    }

    fn two_var_problem() -> ProblemModel<f64> {
        ProblemModel {
            variables: vec![var("x1"), var("x2")],
            constraints: vec![
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
                Constraint {
                    coefficients: vec![1.0, 2.0],
                    sense: Sense::LessEqual,
                    rhs: 1.0,
                },
                Constraint {
                    coefficients: vec![3.0, 1.0],
                    sense: Sense::LessEqual,
                    rhs: 2.0,
                },
            ],
            objective: Objective {
                direction: Direction::Maximize,
                costs: vec![0.6, 0.5],
            },
        }
    }

    #[test]
    fn solves_simple_two_variable_lp() {
        let problem = two_var_problem();
        let (standard, flipped) = problem.to_standard_form();
        let driver = TwoPhaseDriver::new(&default_options());
        let mut hooks = crate::SolverHooks::default();
        let result = driver.solve(&standard, flipped, &mut hooks).unwrap();
        match result {
            SolveResult::Optimal { solution, objective, .. } => {
                assert!((solution[0] - 0.6).abs() < 1e-6);
                assert!((solution[1] - 0.2).abs() < 1e-6);
                assert!((objective - 0.46).abs() < 1e-6);
            }
            other => panic!("expected Optimal, got {other:?}"),
        }
    }

    #[test]
    fn detects_infeasible_problem() {
        // Minimize x s.t. x <= -1, x >= 0: infeasible.
        let problem = ProblemModel {
            variables: vec![var("x")],
            constraints: vec![
                Constraint {
                    coefficients: vec![1.0],
                    sense: Sense::NonNegative,
                    rhs: 0.0,
                },
                Constraint {
                    coefficients: vec![1.0],
                    sense: Sense::LessEqual,
                    rhs: -1.0,
                },
            ],
            objective: Objective {
                direction: Direction::Minimize,
                costs: vec![1.0],
            },
        };
        let (standard, flipped) = problem.to_standard_form();
        let driver = TwoPhaseDriver::new(&default_options());
        let mut hooks = crate::SolverHooks::default();
        let result = driver.solve(&standard, flipped, &mut hooks).unwrap();
        assert!(matches!(result, SolveResult::Infeasible { .. }));
    }
}
