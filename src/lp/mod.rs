//! Linear-programming core: problem model, column set, simplex engine, and
//! the two-phase driver that ties them together (C5-C8).

pub mod column_set;
pub mod driver;
pub mod engine;
pub mod problem;

use crate::SolverError;
use crate::SolverHooks;
use crate::SolverOptions;
use crate::lp::driver::{SolveResult, TwoPhaseDriver};
use crate::lp::problem::ProblemModel;
use crate::scalar::Scalar;

/// Runs the full pipeline of §2's data flow: standard-form transform, then
/// the two-phase driver, on an already-parsed [`ProblemModel`]. `hooks`
/// reaches both simplex phases; pass [`SolverHooks::default`] when no
/// instrumentation or early cancellation is needed.
pub fn solve<S: Scalar>(
    problem: ProblemModel<S>,
    options: &SolverOptions,
    hooks: &mut SolverHooks,
) -> Result<SolveResult<S>, SolverError> {
    let (standard, flipped) = problem.to_standard_form();
    let driver = TwoPhaseDriver::new(options);
    driver.solve(&standard, flipped, hooks)
}
