//! Revised simplex iteration (C7).
//!
//! Grounded on `Simplex::solve_with_base` in
//! `examples/original_source/simplex/src/simplex.cc`: the refactor-vs-update
//! cadence, Bland's rule for both the entering and leaving variable, and the
//! ratio test are carried over step for step (§4.7); only the storage
//! (generic [`DenseMatrix`]/[`BasisInverse`] instead of the source's
//! reference-counted `Matrix`) and the option wiring are new. The hooks
//! check once per iteration is the same shape as the interior-point and
//! gradient-descent solvers' main loops.

use macros::{explicit_options, use_option};

use crate::SolverError;
use crate::SolverHooks;
use crate::SolverOptions;
use crate::Status;
use crate::callback::IterationSnapshot;
use crate::linalg::basis::BasisInverse;
use crate::linalg::matrix::DenseMatrix;
use crate::lp::column_set::ColumnSet;
use crate::scalar::Scalar;

/// Terminal outcome of one [`SimplexEngine::solve`] call (§4.7 Outputs).
/// Primal infeasibility is not diagnosable from inside the engine; that is
/// the two-phase driver's job (§4.8).
#[derive(Debug, Clone)]
pub enum EngineOutcome<S: Scalar> {
    Optimal {
        basis: ColumnSet,
        x_basic: Vec<S>,
        dual: Vec<S>,
        objective: S,
    },
    Unbounded {
        /// Direction of unbounded improvement, indexed like `A`'s columns.
        ray: Vec<S>,
    },
    /// The LU factorizer reported a singular basis with no fallback left.
    NeedsFixup { message: String },
    /// The iteration cap (§4.7 Failure semantics) was hit first.
    Timeout {
        basis: ColumnSet,
        x_basic: Vec<S>,
    },
    /// A [`crate::terminators::Terminator`] reported a status before the
    /// engine reached a terminal outcome on its own.
    Terminated {
        status: Status,
        basis: ColumnSet,
        x_basic: Vec<S>,
    },
}

#[explicit_options(name = SolverOptions)]
#[use_option(
    name = "refactor_cadence",
    type_ = usize,
    default = "10",
    description = "Iterations between full LU refactorizations of the basis inverse (K in the revised simplex method)"
)]
#[use_option(
    name = "iteration_cap_factor",
    type_ = usize,
    default = "200",
    description = "Iteration cap is this factor times (m + n); exceeding it yields a Timeout outcome"
)]
pub struct SimplexEngine<S: Scalar> {
    _marker: std::marker::PhantomData<S>,
}

impl<S: Scalar> SimplexEngine<S> {
    pub fn new(options: &SolverOptions) -> Self {
        Self {
            options: options.into(),
            _marker: std::marker::PhantomData,
        }
    }

    fn refactor_cadence(&self) -> usize {
        self.options.refactor_cadence.max(1)
    }

    fn iteration_cap(&self, m: usize, n: usize) -> usize {
        self.options.iteration_cap_factor * (m + n)
    }

    /// Runs §4.7's loop to completion starting from `basis`, which the
    /// caller asserts is feasible (`x_B = B^-1 b >= -TOL_FEAS`). `hooks`'s
    /// callback fires once per iteration that doesn't terminate the loop on
    /// its own, and its terminator is checked right after; both run on the
    /// same thread as the pivot itself, never suspending it.
    pub fn solve(
        &self,
        a: &DenseMatrix<S>,
        b: &[S],
        c: &[S],
        mut basis: ColumnSet,
        hooks: &mut SolverHooks,
    ) -> Result<EngineOutcome<S>, SolverError> {
        let m = a.rows();
        let n = a.cols();
        let cap = self.iteration_cap(m, n);
        let cadence = self.refactor_cadence();
        hooks.terminator.initialize();

        let basis_indices: Vec<usize> = (0..m)
            .map(|i| basis.get(i).expect("initial basis must be fully assigned"))
            .collect();
        let mut binv = BasisInverse::refactor(&gather_columns(a, &basis_indices))?;

        // Cached entering column/leaving row from the previous iteration,
        // reused by the rank-1 update instead of a full refactor.
        let mut pending_update: Option<(Vec<S>, usize)> = None;
        let mut dirty = false;

        let mut t = 0usize;
        loop {
            if t >= cap {
                let x_basic = binv.inverse().mul_vec(b);
                return Ok(EngineOutcome::Timeout { basis, x_basic });
            }

            // Step 1: basis inverse.
            if t % cadence == 0 || dirty {
                let indices: Vec<usize> = (0..m).map(|i| basis.get(i).unwrap()).collect();
                binv = BasisInverse::refactor(&gather_columns(a, &indices))?;
                dirty = false;
            } else if let Some((a_p, q_pos)) = pending_update.take() {
                if binv.update(&a_p, q_pos).is_err() {
                    let indices: Vec<usize> = (0..m).map(|i| basis.get(i).unwrap()).collect();
                    binv = BasisInverse::refactor(&gather_columns(a, &indices))?;
                }
            }

            // Step 2: basic solution.
            let x_b = binv.inverse().mul_vec(b);

            // Step 3: dual y = c_B . Binv.
            let c_b: Vec<S> = (0..m).map(|i| c[basis.get(i).unwrap()]).collect();
            let y = binv.inverse().row_vec_mul(&c_b);

            // Step 4: reduced costs r = c - y.A.
            let ya = y_times_a(a, &y);
            let r: Vec<S> = (0..n).map(|j| c[j] - ya[j]).collect();

            // Step 5: optimality.
            let entering = (0..n)
                .filter(|&j| !basis.contains(j))
                .find(|&j| r[j] < -S::tol_feas());

            let Some(p) = entering else {
                let objective = dot(c, &reconstruct_full(n, &basis, &x_b));
                return Ok(EngineOutcome::Optimal {
                    basis,
                    x_basic: x_b,
                    dual: y,
                    objective,
                });
            };

            // Step 7: direction.
            let a_p = binv.inverse().mul_vec(&a.column(p));

            // Step 8: unboundedness.
            if a_p.iter().all(|v| *v <= S::tol_feas()) {
                return Ok(EngineOutcome::Unbounded {
                    ray: unbounded_ray(n, p, &basis, &a_p),
                });
            }

            // Step 9: leaving variable, Bland-tie-broken by least basis column.
            let mut best: Option<(usize, S, usize)> = None; // (row, ratio, column index)
            for i in 0..m {
                if a_p[i] <= S::tol_feas() {
                    continue;
                }
                let ratio = x_b[i] / a_p[i];
                let col = basis.get(i).unwrap();
                match &best {
                    None => best = Some((i, ratio, col)),
                    Some((_, best_ratio, best_col)) => {
                        if ratio < *best_ratio - S::tol_feas()
                            || ((ratio - *best_ratio).abs() <= S::tol_feas() && col < *best_col)
                        {
                            best = Some((i, ratio, col));
                        }
                    }
                }
            }
            let (q_pos, _, leaving_col) = best.expect("unboundedness already ruled out");

            if a_p[q_pos].abs() < S::tol_pivot() {
                dirty = true;
            }

            let snapshot = IterationSnapshot {
                iteration: t,
                objective_estimate: dot(c, &reconstruct_full(n, &basis, &x_b)).to_f64(),
                primal_infeasibility: x_b
                    .iter()
                    .map(|v| if v.to_f64() < 0.0 { -v.to_f64() } else { 0.0 })
                    .fold(0.0, f64::max),
                entering_column: Some(p),
                leaving_row: Some(q_pos),
            };
            hooks.callback.call(&snapshot);
            if let Some(status) = hooks.terminator.terminate() {
                return Ok(EngineOutcome::Terminated { status, basis, x_basic: x_b });
            }

            // Step 10: pivot.
            basis.substitute(leaving_col, p);
            pending_update = Some((a_p, q_pos));
            t += 1;
        }
    }
}

fn gather_columns<S: Scalar>(a: &DenseMatrix<S>, indices: &[usize]) -> DenseMatrix<S> {
    let m = a.rows();
    let mut out = DenseMatrix::new(m, indices.len());
    for (j, &col) in indices.iter().enumerate() {
        let column = a.column(col);
        for i in 0..m {
            out.set(i, j, column[i]);
        }
    }
    out
}

fn y_times_a<S: Scalar>(a: &DenseMatrix<S>, y: &[S]) -> Vec<S> {
    a.row_vec_mul(y)
}

fn dot<S: Scalar>(c: &[S], x: &[S]) -> S {
    c.iter().zip(x.iter()).fold(S::zero(), |acc, (a, b)| acc + *a * *b)
}

fn reconstruct_full<S: Scalar>(n: usize, basis: &ColumnSet, x_b: &[S]) -> Vec<S> {
    let mut x = vec![S::zero(); n];
    for (pos, value) in x_b.iter().enumerate() {
        x[basis.get(pos).unwrap()] = *value;
    }
    x
}

fn unbounded_ray<S: Scalar>(n: usize, entering: usize, basis: &ColumnSet, a_p: &[S]) -> Vec<S> {
    let mut ray = vec![S::zero(); n];
    ray[entering] = S::one();
    for (pos, value) in a_p.iter().enumerate() {
        ray[basis.get(pos).unwrap()] = -*value;
    }
    ray
}
