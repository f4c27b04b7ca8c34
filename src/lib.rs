//! A revised primal simplex engine for linear programs.
//!
//! The core algorithm (C1-C8) is generic over [`Scalar`] so that a binary64
//! build and an arbitrary-precision build share one implementation. The
//! ambient stack around it — options, errors, callbacks, termination — keeps
//! the shape the rest of this crate family uses.

use std::any::Any;

use dyn_clone::DynClone;
use macros::build_options;
use problemo::Problem;

pub mod callback;
pub mod interface;
pub mod linalg;
pub mod lp;
pub mod result;
pub mod scalar;
pub mod terminators;

#[cfg(test)]
pub mod tests;

pub use scalar::Scalar;

pub trait OptionTrait: Any + Sync + Send + DynClone {}
impl OptionTrait for &'static str {}
impl OptionTrait for String {}
impl OptionTrait for bool {}
impl OptionTrait for usize {}
impl OptionTrait for u8 {}
impl OptionTrait for u16 {}
impl OptionTrait for u32 {}
impl OptionTrait for u64 {}
impl OptionTrait for i8 {}
impl OptionTrait for i16 {}
impl OptionTrait for i32 {}
impl OptionTrait for i64 {}
impl OptionTrait for f32 {}
impl OptionTrait for f64 {}

impl Clone for Box<dyn OptionTrait> {
    fn clone(&self) -> Self {
        dyn_clone::clone_box(&**self)
    }
}

/// Outcome of a solve, per the taxonomy of spec.md §7. Unlike an error, every
/// one of these is a normal, expected thing for a linear program to do.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Status {
    #[default]
    /// The driver has not finished a phase yet.
    InProgress,
    /// Phase 2 terminated at an optimal basic feasible solution.
    Optimal,
    /// Phase 2 detected an unbounded ray; no finite optimum exists.
    Unbounded,
    /// Phase 1 terminated with a positive artificial objective.
    Infeasible,
    /// An artificial variable remained in the basis at zero level and no
    /// non-artificial column could replace it (linearly dependent rows).
    NeedsFixup,
    /// The iteration cap or a [`crate::terminators::Terminator`] wall-clock
    /// bound was hit before a terminal status was reached.
    Timeout,
    /// A [`crate::terminators::Terminator`] reported an external interrupt.
    Interrupted,
}

/// True errors: malformed input or an internal invariant violation, as
/// opposed to the [`Status`] outcomes a well-formed solve can legitimately
/// reach (§7).
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SolverError {
    #[display("parse error{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    ParseError {
        message: String,
        line: Option<usize>,
    },
    #[display("dimension mismatch: {message}")]
    DimensionMismatch { message: String },
    #[display("singular basis: {message}")]
    Singular { message: String },
    #[display("unknown or invalid option: {name}")]
    InvalidOption { name: String },
}

impl SolverError {
    pub fn parse(message: impl Into<String>) -> Self {
        SolverError::ParseError {
            message: message.into(),
            line: None,
        }
    }

    pub fn parse_at(message: impl Into<String>, line: usize) -> Self {
        SolverError::ParseError {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn dimension_mismatch(message: impl Into<String>) -> Self {
        SolverError::DimensionMismatch {
            message: message.into(),
        }
    }

    pub fn singular(message: impl Into<String>) -> Self {
        SolverError::Singular {
            message: message.into(),
        }
    }
}

/// Lifts a [`SolverError`] to the crate-boundary error type. Internal
/// functions stay in [`SolverError`]; only the public API surface converts.
pub fn as_problem(err: SolverError) -> Problem {
    Problem::from(err)
}

build_options!(name = SolverOptions, registry_name = OPTION_REGISTRY);

/// Bundles the per-iteration observability and cancellation hooks that
/// [`crate::lp::engine::SimplexEngine::solve`] checks once per iteration,
/// alongside the iteration cap that is always in force regardless of
/// hooks.
pub struct SolverHooks {
    pub callback: Box<dyn callback::Callback>,
    pub terminator: Box<dyn terminators::Terminator>,
}

impl Default for SolverHooks {
    /// A no-op pair: nothing is logged, nothing terminates early. Only the
    /// iteration cap governs termination.
    fn default() -> Self {
        Self {
            callback: Box::new(callback::NoOpCallback {}),
            terminator: Box::new(terminators::MultipleTerminators::new(Vec::new())),
        }
    }
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn status_defaults_to_in_progress() {
        assert_eq!(Status::default(), Status::InProgress);
    }

    #[test]
    fn solver_error_displays_with_context() {
        let err = SolverError::parse_at("unexpected token", 4);
        assert_eq!(err.to_string(), "parse error at line 4: unexpected token");
    }
}
