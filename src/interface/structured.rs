//! The bracketed structured text format (§6.1) — ground truth for tests.
//!
//! Line-oriented, grounded on `Simplex::load_problem` in
//! `examples/original_source/simplex/src/simplex.cc`: a `[METADATA]` /
//! `[VARIABLES]` / `[CONSTRAINTS]` / `[OBJECTIVE]` section scan, each
//! non-header line tokenized by whitespace. Per spec.md §9's Open
//! Questions, this format (not the LP-format parser) is authoritative.

use crate::SolverError;
use crate::lp::problem::{Constraint, Direction, Objective, ProblemModel, Sense, Variable, VariableOrigin};
use crate::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Metadata,
    Variables,
    Constraints,
    Objective,
}

/// Parses the structured format into a [`ProblemModel`]. Variable bounds
/// become `NonNegative`/`GreaterEqual`/`LessEqual` rows exactly as
/// `load_problem` does, so [`ProblemModel::to_standard_form`] sees a
/// uniform representation regardless of input shape.
pub fn parse<S: Scalar>(text: &str) -> Result<ProblemModel<S>, SolverError> {
    let mut section = Section::None;
    let mut n_vars: Option<usize> = None;
    let mut variables: Vec<Variable> = Vec::new();
    let mut constraints: Vec<Constraint<S>> = Vec::new();
    let mut objective: Option<Objective<S>> = None;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "[METADATA]" => {
                section = Section::Metadata;
                continue;
            }
            "[VARIABLES]" => {
                section = Section::Variables;
                continue;
            }
            "[CONSTRAINTS]" => {
                section = Section::Constraints;
                continue;
            }
            "[OBJECTIVE]" => {
                section = Section::Objective;
                continue;
            }
            _ => {}
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();

        match section {
            Section::None => {
                return Err(SolverError::parse_at(
                    "content before any [SECTION] header",
                    line_no,
                ));
            }
            Section::Metadata => {
                if tokens.first() == Some(&"vars") {
                    let n: usize = tokens
                        .get(1)
                        .ok_or_else(|| SolverError::parse_at("'vars' requires an integer", line_no))?
                        .parse()
                        .map_err(|_| SolverError::parse_at("'vars' value is not an integer", line_no))?;
                    n_vars = Some(n);
                }
                // `name <free text>` is accepted and otherwise ignored.
            }
            Section::Variables => {
                let n = n_vars.ok_or_else(|| {
                    SolverError::parse_at("VARIABLES section before 'vars' declared", line_no)
                })?;
                let (lower, name, upper) = parse_variable_line::<S>(&tokens, line_no)?;
                let idx = variables.len();
                if idx >= n {
                    return Err(SolverError::parse_at(
                        "more variables declared than 'vars' announced",
                        line_no,
                    ));
                }
                variables.push(Variable {
                    name,
                    origin: VariableOrigin::Original,
                });

                let mut eye = vec![S::zero(); n];
                eye[idx] = S::one();

                if let Some(lb) = lower {
                    if lb.is_zero_exact() {
                        constraints.push(Constraint {
                            coefficients: eye.clone(),
                            sense: Sense::NonNegative,
                            rhs: S::zero(),
                        });
                    } else {
                        constraints.push(Constraint {
                            coefficients: eye.clone(),
                            sense: Sense::GreaterEqual,
                            rhs: lb,
                        });
                    }
                }
                if let Some(ub) = upper {
                    constraints.push(Constraint {
                        coefficients: eye,
                        sense: Sense::LessEqual,
                        rhs: ub,
                    });
                }
            }
            Section::Constraints => {
                let n = n_vars.ok_or_else(|| {
                    SolverError::parse_at("CONSTRAINTS section before 'vars' declared", line_no)
                })?;
                constraints.extend(parse_constraint_line::<S>(&tokens, n, line_no)?);
            }
            Section::Objective => {
                let n = n_vars.ok_or_else(|| {
                    SolverError::parse_at("OBJECTIVE section before 'vars' declared", line_no)
                })?;
                objective = Some(parse_objective_line::<S>(&tokens, n, line_no)?);
            }
        }
    }

    let objective = objective.ok_or_else(|| SolverError::parse("missing [OBJECTIVE] section"))?;
    if variables.is_empty() {
        return Err(SolverError::parse("missing or empty [VARIABLES] section"));
    }

    Ok(ProblemModel {
        variables,
        constraints,
        objective,
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_bound<S: Scalar>(token: &str) -> Result<Option<S>, SolverError> {
    match token {
        "inf" | "+inf" | "-inf" => Ok(None),
        other => S::parse_decimal(other).map(Some),
    }
}

/// Accepts both `<lb> <name> <ub>` and the two-sided
/// `<lb> <op> <name> <op> <ub>` alternative (§6.1).
fn parse_variable_line<S: Scalar>(
    tokens: &[&str],
    line_no: usize,
) -> Result<(Option<S>, String, Option<S>), SolverError> {
    match tokens.len() {
        3 => {
            let lower = parse_bound(tokens[0])?;
            let upper = parse_bound(tokens[2])?;
            Ok((lower, tokens[1].to_string(), upper))
        }
        5 => {
            let lower = parse_bound(tokens[0])?;
            let upper = parse_bound(tokens[4])?;
            Ok((lower, tokens[2].to_string(), upper))
        }
        _ => Err(SolverError::parse_at(
            format!("expected '<lb> <name> <ub>', found {} tokens", tokens.len()),
            line_no,
        )),
    }
}

fn sense_from_token(token: &str, line_no: usize) -> Result<Sense, SolverError> {
    match token {
        ">" | ">=" => Ok(Sense::GreaterEqual),
        "<" | "<=" => Ok(Sense::LessEqual),
        "=" => Ok(Sense::Equal),
        other => Err(SolverError::parse_at(
            format!("unknown comparison operator '{other}'"),
            line_no,
        )),
    }
}

/// Single-sided `<a1> ... <an> <op> <rhs>` or two-sided
/// `<lb> <op> <a1> ... <an> <op> <ub>` (§6.1). The two-sided form is
/// expanded into two rows sharing the same coefficients, one per bound.
fn parse_constraint_line<S: Scalar>(
    tokens: &[&str],
    n: usize,
    line_no: usize,
) -> Result<Vec<Constraint<S>>, SolverError> {
    if tokens.len() == n + 2 {
        let mut coefficients = Vec::with_capacity(n);
        for t in &tokens[0..n] {
            coefficients.push(S::parse_decimal(t)?);
        }
        let sense = sense_from_token(tokens[n], line_no)?;
        let rhs = S::parse_decimal(tokens[n + 1])?;
        Ok(vec![Constraint {
            coefficients,
            sense,
            rhs,
        }])
    } else if tokens.len() == n + 4 {
        let lower = S::parse_decimal(tokens[0])?;
        let lower_op = sense_from_token(tokens[1], line_no)?;
        let mut coefficients = Vec::with_capacity(n);
        for t in &tokens[2..2 + n] {
            coefficients.push(S::parse_decimal(t)?);
        }
        let upper_op = sense_from_token(tokens[2 + n], line_no)?;
        let upper = S::parse_decimal(tokens[3 + n])?;

        // `<lb> <op> a.x` reads as a bound on a.x from the left, so the
        // emitted row's sense is the mirror of the written operator.
        let lower_row_sense = match lower_op {
            Sense::LessEqual => Sense::GreaterEqual,
            Sense::GreaterEqual => Sense::LessEqual,
            Sense::Equal => Sense::Equal,
            Sense::NonNegative => {
                return Err(SolverError::parse_at("'>=0' is not a two-sided bound operator", line_no));
            }
        };
        let upper_row_sense = match upper_op {
            Sense::LessEqual | Sense::GreaterEqual | Sense::Equal => upper_op,
            Sense::NonNegative => {
                return Err(SolverError::parse_at("'>=0' is not a two-sided bound operator", line_no));
            }
        };

        Ok(vec![
            Constraint {
                coefficients: coefficients.clone(),
                sense: lower_row_sense,
                rhs: lower,
            },
            Constraint {
                coefficients,
                sense: upper_row_sense,
                rhs: upper,
            },
        ])
    } else {
        Err(SolverError::parse_at(
            format!(
                "expected {} coefficient tokens followed by an operator and RHS, or the two-sided form, found {}",
                n,
                tokens.len()
            ),
            line_no,
        ))
    }
}

fn parse_objective_line<S: Scalar>(
    tokens: &[&str],
    n: usize,
    line_no: usize,
) -> Result<Objective<S>, SolverError> {
    if tokens.len() != n + 1 {
        return Err(SolverError::parse_at(
            format!("expected 'maximize|minimize' followed by {n} costs"),
            line_no,
        ));
    }
    let direction = match tokens[0] {
        "maximize" => Direction::Maximize,
        "minimize" => Direction::Minimize,
        other => {
            return Err(SolverError::parse_at(
                format!("unknown objective direction '{other}'"),
                line_no,
            ));
        }
    };
    let mut costs = Vec::with_capacity(n);
    for t in &tokens[1..] {
        costs.push(S::parse_decimal(t)?);
    }
    Ok(Objective { direction, costs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_two_variable_lp() {
        let text = r#"
            [METADATA]
            name demo
            vars 2

            [VARIABLES]
            0 x1 inf
            0 x2 inf

            [CONSTRAINTS]
            1 2 <= 1
            3 1 <= 2

            [OBJECTIVE]
            maximize 0.6 0.5
        "#;
        let problem: ProblemModel<f64> = parse(text).unwrap();
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.constraints.len(), 4); // 2 NonNegative rows + 2 structural rows
        assert_eq!(problem.objective.direction, Direction::Maximize);
    }

    #[test]
    fn rejects_mismatched_coefficient_count() {
        let text = r#"
            [METADATA]
            vars 2
            [VARIABLES]
            0 x1 inf
            0 x2 inf
            [CONSTRAINTS]
            1 <= 1
            [OBJECTIVE]
            minimize 1 1
        "#;
        let result: Result<ProblemModel<f64>, _> = parse(text);
        assert!(result.is_err());
    }

    #[test]
    fn expands_two_sided_constraint_into_two_rows() {
        let text = r#"
            [METADATA]
            vars 2
            [VARIABLES]
            0 x1 inf
            0 x2 inf
            [CONSTRAINTS]
            1 <= 1 2 <= 4
            [OBJECTIVE]
            minimize 1 1
        "#;
        let problem: ProblemModel<f64> = parse(text).unwrap();
        // 2 NonNegative rows + 2 rows from the two-sided bound.
        assert_eq!(problem.constraints.len(), 4);
        let bound_rows = &problem.constraints[2..4];
        assert_eq!(bound_rows[0].sense, Sense::GreaterEqual);
        assert_eq!(bound_rows[0].rhs, 1.0);
        assert_eq!(bound_rows[1].sense, Sense::LessEqual);
        assert_eq!(bound_rows[1].rhs, 4.0);
        assert_eq!(bound_rows[0].coefficients, vec![1.0, 2.0]);
    }

    #[test]
    fn strips_end_of_line_comments() {
        let text = r#"
            [METADATA]
            vars 1 // one variable
            [VARIABLES]
            0 x inf
            [CONSTRAINTS]
            1 <= 5
            [OBJECTIVE]
            minimize 1
        "#;
        let problem: ProblemModel<f64> = parse(text).unwrap();
        assert_eq!(problem.num_variables(), 1);
    }
}
