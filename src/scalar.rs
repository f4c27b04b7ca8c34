//! Abstracts the field type the simplex core computes over (C1).
//!
//! The engine, the dense matrix, and the LU factorization are all generic
//! over [`Scalar`] so that a binary64 build and an arbitrary-precision
//! rational build share one implementation. Downstream code must never
//! compare two scalars with `==` except against the exact [`Scalar::zero`]
//! / [`Scalar::one`] constants; everywhere else, use [`Scalar::is_feasible_zero`]
//! or the ordering operators, which respect `TOL_FEAS`.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::SolverError;

/// A field element with the tolerances the simplex core needs.
///
/// `TOL_PIVOT` bounds how small a diagonal LU pivot may be before the
/// factorization is declared singular. `TOL_FEAS` bounds how far a basic
/// solution or reduced cost may be from zero and still count as zero.
/// Per spec.md §3.1, the defaults are `1e-10` for binary64 and
/// `1e-28` for backends carrying at least 100 decimal digits of precision.
pub trait Scalar:
    Copy
    + Clone
    + Debug
    + Display
    + PartialOrd
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The exact additive identity. Used only for structural zero tests
    /// (e.g. "is this LU pivot column structurally empty"), never for
    /// feasibility tests.
    fn zero() -> Self;

    /// The exact multiplicative identity.
    fn one() -> Self;

    /// Absolute value.
    fn abs(self) -> Self;

    /// Pivot-rejection tolerance used by LU factorization (§4.3).
    fn tol_pivot() -> Self;

    /// Feasibility / optimality tolerance used by the simplex engine (§4.7).
    fn tol_feas() -> Self;

    /// Lossy conversion to `f64`, used for logging and JSON output.
    fn to_f64(self) -> f64;

    /// Construct a scalar from an `f64` literal (used for small integer
    /// constants like `2.0` inside the algorithm, not for parsing user
    /// input — see [`Scalar::parse_decimal`]).
    fn from_f64(value: f64) -> Self;

    /// Parse a decimal literal (`"3.25"`, `"-1"`, `"0"`) from input text.
    /// Must round-trip without silent precision loss for the default
    /// build (§3.1).
    fn parse_decimal(text: &str) -> Result<Self, SolverError>;

    /// Exact equality with the additive identity. Used inside LU to
    /// detect structural zeros (§4.1); never for feasibility tests.
    fn is_zero_exact(self) -> bool {
        self == Self::zero()
    }

    /// `|self| <= TOL_FEAS`.
    fn is_feasible_zero(self) -> bool {
        self.abs() <= Self::tol_feas()
    }
}

impl Scalar for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }

    fn tol_pivot() -> Self {
        1e-10
    }

    fn tol_feas() -> Self {
        1e-10
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn parse_decimal(text: &str) -> Result<Self, SolverError> {
        text.trim()
            .parse::<f64>()
            .map_err(|_| SolverError::ParseError {
                message: format!("'{}' is not a valid decimal number", text),
                line: None,
            })
    }
}

/// `floor` that truncates toward `-infinity` regardless of sign, unlike a
/// naive cast-to-integer which truncates toward zero (spec.md §9).
pub fn floor_toward_negative_infinity<S: Scalar>(x: S) -> i64 {
    let f = x.to_f64();
    f.floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_literals() {
        assert_eq!(f64::parse_decimal("3.25").unwrap(), 3.25);
        assert_eq!(f64::parse_decimal("-1").unwrap(), -1.0);
        assert_eq!(f64::parse_decimal("0").unwrap(), 0.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(f64::parse_decimal("abc").is_err());
    }

    #[test]
    fn floor_is_sign_independent() {
        assert_eq!(floor_toward_negative_infinity(1.8f64), 1);
        assert_eq!(floor_toward_negative_infinity(-1.2f64), -2);
        assert_eq!(floor_toward_negative_infinity(-1.0f64), -1);
    }

    #[test]
    fn feasible_zero_respects_tolerance() {
        assert!(1e-12f64.is_feasible_zero());
        assert!(!1e-5f64.is_feasible_zero());
    }
}
