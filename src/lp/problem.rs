//! Problem model and standard-form transform (C6).
//!
//! Grounded on `Simplex::process_to_standard_form` in
//! `examples/original_source/simplex/src/simplex.cc`: free-variable
//! splitting, slack insertion per constraint sense, and the maximize sign
//! flip, reworked as a pure value transform over [`DenseMatrix`] instead of
//! the source's in-place `Variable*`/`Constraint` heap objects (§4.6, §9
//! Design Notes: tagged variant, not virtual dispatch).

use crate::linalg::matrix::DenseMatrix;
use crate::scalar::Scalar;

/// Where a standard-form variable came from, so a solution can be lifted
/// back to the caller's original variable space (§3.5, §4.8 Lifting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableOrigin {
    /// Present in the caller's problem, already non-negative.
    Original,
    /// Inserted to convert an inequality row to an equality (§4.6 step 2).
    Slack,
    /// The `x+` half of a free variable split `x = x+ - x-`; carries the
    /// index of its paired [`VariableOrigin::Auxiliary`].
    Splitted { auxiliary_index: usize },
    /// The `x-` half of a free variable split (§4.6 step 1).
    Auxiliary,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub origin: VariableOrigin,
}

/// Row sense. `NonNegative` rows are bookkeeping for free-variable splits
/// and are kept separate from structural constraints (§3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessEqual,
    Equal,
    GreaterEqual,
    NonNegative,
}

#[derive(Debug, Clone)]
pub struct Constraint<S: Scalar> {
    pub coefficients: Vec<S>,
    pub sense: Sense,
    pub rhs: S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone)]
pub struct Objective<S: Scalar> {
    pub direction: Direction,
    pub costs: Vec<S>,
}

/// A linear program as built by a parser: arbitrary bounds, arbitrary
/// constraint senses, either optimization direction (§3.5).
#[derive(Debug, Clone)]
pub struct ProblemModel<S: Scalar> {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint<S>>,
    pub objective: Objective<S>,
}

impl<S: Scalar> ProblemModel<S> {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    fn push_column(&mut self, name: String, origin: VariableOrigin) -> usize {
        for c in &mut self.constraints {
            c.coefficients.push(S::zero());
        }
        self.objective.costs.push(S::zero());
        self.variables.push(Variable { name, origin });
        self.variables.len() - 1
    }

    /// Applies §4.6: splits free variables, inserts slacks, and flips the
    /// objective for a maximize problem. Returns the equivalent standard
    /// form `min c.x s.t. Ax = b, x >= 0` plus whether the sign was
    /// flipped, so the caller can restore the reported objective value.
    pub fn to_standard_form(mut self) -> (ProblemModel<S>, bool) {
        // Step 1: split every variable lacking an explicit NonNegative row.
        let has_nonneg: Vec<bool> = (0..self.num_variables())
            .map(|j| {
                self.constraints
                    .iter()
                    .any(|c| c.sense == Sense::NonNegative && !c.coefficients[j].is_zero_exact())
            })
            .collect();

        for j in 0..has_nonneg.len() {
            if has_nonneg[j] {
                continue;
            }
            let base_name = self.variables[j].name.clone();
            let auxiliary_index = self.push_column(format!("{base_name}__neg"), VariableOrigin::Auxiliary);
            for (row_idx, c) in self.constraints.iter_mut().enumerate() {
                let _ = row_idx;
                let value = c.coefficients[j];
                c.coefficients[auxiliary_index] = -value;
            }
            self.objective.costs[auxiliary_index] = -self.objective.costs[j];
            self.variables[j].origin = VariableOrigin::Splitted { auxiliary_index };
        }

        // Step 2: turn every inequality row into an equality via a slack.
        let n_rows = self.constraints.len();
        for row in 0..n_rows {
            let sense = self.constraints[row].sense;
            let coeff = match sense {
                Sense::LessEqual => Some(S::one()),
                Sense::GreaterEqual => Some(-S::one()),
                Sense::Equal | Sense::NonNegative => None,
            };
            if let Some(coeff) = coeff {
                let slack_index = self.push_column(format!("slack_{row}"), VariableOrigin::Slack);
                self.constraints[row].coefficients[slack_index] = coeff;
                self.constraints[row].sense = Sense::Equal;
            }
        }

        // Step 3: minimize.
        let flipped = self.objective.direction == Direction::Maximize;
        if flipped {
            for c in &mut self.objective.costs {
                *c = -*c;
            }
            self.objective.direction = Direction::Minimize;
        }

        (self, flipped)
    }

    /// The structural (non-`NonNegative`) rows, as a dense `A`/`b` pair.
    pub fn structural_system(&self) -> (DenseMatrix<S>, Vec<S>) {
        let rows: Vec<&Constraint<S>> = self
            .constraints
            .iter()
            .filter(|c| c.sense != Sense::NonNegative)
            .collect();
        let m = rows.len();
        let n = self.num_variables();
        let mut a = DenseMatrix::new(m, n);
        let mut b = vec![S::zero(); m];
        for (i, row) in rows.iter().enumerate() {
            for j in 0..n {
                a.set(i, j, row.coefficients[j]);
            }
            b[i] = row.rhs;
        }
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Variable {
        Variable {
            name: name.to_string(),
            origin: VariableOrigin::Original,
        }
    }

    #[test]
    fn splits_free_variable_and_flips_maximize() {
        // Maximize x s.t. x - y <= 1 (x, y both free; no NonNegative rows).
        let problem = ProblemModel::<f64> {
            variables: vec![var("x"), var("y")],
            constraints: vec![Constraint {
                coefficients: vec![1.0, -1.0],
                sense: Sense::LessEqual,
                rhs: 1.0,
            }],
            objective: Objective {
                direction: Direction::Maximize,
                costs: vec![1.0, 0.0],
            },
        };

        let (standard, flipped) = problem.to_standard_form();
        assert!(flipped);
        assert_eq!(standard.objective.direction, Direction::Minimize);
        // x, y split into 4 columns plus one slack for the <= row.
        assert_eq!(standard.num_variables(), 5);
        let (a, b) = standard.structural_system();
        assert_eq!(a.rows(), 1);
        assert_eq!(b, vec![1.0]);
    }

    #[test]
    fn leaves_already_nonnegative_equality_problem_untouched_in_shape() {
        let problem = ProblemModel::<f64> {
            variables: vec![var("x"), var("y")],
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
                    coefficients: vec![1.0, 1.0],
                    sense: Sense::Equal,
                    rhs: 1.0,
                },
            ],
            objective: Objective {
                direction: Direction::Minimize,
                costs: vec![1.0, 1.0],
            },
        };

        let (standard, flipped) = problem.to_standard_form();
        assert!(!flipped);
        assert_eq!(standard.num_variables(), 2);
    }
}
