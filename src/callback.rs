//! Per-iteration observability hook.
//!
//! A `Callback` trait plus a `build_option_enum!`-generated dispatcher,
//! carrying the simplex engine's own iteration data instead of
//! interior-point state, since §4.7's iteration has no
//! `alpha_primal`/complementary-slackness notion.

use macros::build_option_enum;

use crate::SolverOptions;

/// A snapshot of §3.6's engine state taken at the end of one §4.7
/// iteration, downcast to `f64` for logging regardless of the solve's
/// actual [`crate::Scalar`] backend.
#[derive(Debug, Clone, Copy)]
pub struct IterationSnapshot {
    pub iteration: usize,
    pub objective_estimate: f64,
    pub primal_infeasibility: f64,
    pub entering_column: Option<usize>,
    pub leaving_row: Option<usize>,
}

/// Hook invoked once per solver iteration for logging, monitoring, or early stopping.
pub trait Callback {
    /// Creates a new callback from solver options.
    fn new(options: &SolverOptions) -> Self
    where
        Self: Sized;

    /// Called at the end of each iteration with the current snapshot.
    fn call(&mut self, snapshot: &IterationSnapshot);
}

/// A callback that does nothing. Use when no per-iteration output is needed.
pub struct NoOpCallback {}

impl Callback for NoOpCallback {
    fn new(_options: &SolverOptions) -> Self {
        Self {}
    }

    fn call(&mut self, _snapshot: &IterationSnapshot) {
        // Do nothing
    }
}

/// Prints the iteration count, objective estimate, and primal infeasibility
/// to stdout each iteration.
pub struct ConvergenceOutput {}

impl Callback for ConvergenceOutput {
    fn new(_options: &SolverOptions) -> Self {
        Self {}
    }

    fn call(&mut self, snapshot: &IterationSnapshot) {
        let txt = format!(
            "| {:4}: | {:<12.6e} | {:<8.2e} | entering={:<4} | leaving={:<4} |",
            snapshot.iteration,
            snapshot.objective_estimate,
            snapshot.primal_infeasibility,
            snapshot
                .entering_column
                .map(|j| j.to_string())
                .unwrap_or_else(|| "-".to_string()),
            snapshot
                .leaving_row
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        println!("{}", txt);
    }
}

build_option_enum!(
    trait_ = Callback,
    name = "Callbacks",
    variants = (NoOpCallback, ConvergenceOutput),
    new_arguments = (&SolverOptions,),
    doc_header = "An enum representing different callbacks for the simplex engine. Each variant corresponds to a specific observability strategy."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_callback_does_not_panic() {
        let mut cb = NoOpCallback {};
        cb.call(&IterationSnapshot {
            iteration: 0,
            objective_estimate: 0.0,
            primal_infeasibility: 0.0,
            entering_column: None,
            leaving_row: None,
        });
    }
}
