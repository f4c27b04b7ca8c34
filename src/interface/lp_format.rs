//! Best-effort parser for the industry-standard LP text format
//! (`Maximize`/`Minimize` … `Subject To` … `Bounds` … `End`).
//!
//! Grounded on the section keywords and bound syntax documented in
//! `examples/original_source/clp/src/CoinLpIO.hpp`. Per spec.md §9's Open
//! Questions, the analogous parser in the original source
//! (`load_lp_problem`) never actually populated a problem, so none of its
//! behavior is carried over here — this is a fresh, deliberately narrower
//! implementation (no ranges, no SOS, no semi-continuous) that is NOT the
//! ground truth for tests; [`crate::interface::structured`] is.

use std::collections::HashMap;

use crate::SolverError;
use crate::lp::problem::{Constraint, Direction, Objective, ProblemModel, Sense, Variable, VariableOrigin};
use crate::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Objective,
    Constraints,
    Bounds,
    Done,
}

struct Term {
    coefficient: f64,
    variable: String,
}

/// Parses `text` into a [`ProblemModel`]. Variable order is first-seen
/// order across the objective and constraint rows.
pub fn parse<S: Scalar>(text: &str) -> Result<ProblemModel<S>, SolverError> {
    let mut var_order: Vec<String> = Vec::new();
    let mut var_index: HashMap<String, usize> = HashMap::new();

    let mut objective_direction = Direction::Minimize;
    let mut objective_terms: Vec<Term> = Vec::new();
    let mut raw_constraints: Vec<(Vec<Term>, Sense, f64)> = Vec::new();
    let mut raw_bounds: Vec<(String, Option<f64>, Option<f64>)> = Vec::new();

    let mut section: Option<Section> = None;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('\\') {
            continue;
        }

        let lowered = line.to_ascii_lowercase();
        if matches!(lowered.as_str(), "maximize" | "max" | "maximise") {
            objective_direction = Direction::Maximize;
            section = Some(Section::Objective);
            continue;
        }
        if matches!(lowered.as_str(), "minimize" | "min" | "minimise") {
            objective_direction = Direction::Minimize;
            section = Some(Section::Objective);
            continue;
        }
        if matches!(lowered.as_str(), "subject to" | "s.t." | "st" | "such that") {
            section = Some(Section::Constraints);
            continue;
        }
        if lowered == "bounds" {
            section = Some(Section::Bounds);
            continue;
        }
        if lowered == "end" {
            section = Some(Section::Done);
            continue;
        }
        if matches!(lowered.as_str(), "integers" | "generals" | "binaries" | "free" | "semis") {
            // Variable-classification sections are accepted but not
            // modeled: the core only ever solves continuous relaxations.
            continue;
        }

        match section {
            Some(Section::Objective) => {
                let (_, terms) = strip_label(line);
                objective_terms.extend(parse_terms(terms, line_no)?);
            }
            Some(Section::Constraints) => {
                let (_, body) = strip_label(line);
                raw_constraints.push(parse_constraint_row(body, line_no)?);
            }
            Some(Section::Bounds) => {
                raw_bounds.push(parse_bound_row(line, line_no)?);
            }
            Some(Section::Done) | None => {}
        }
    }

    for term in objective_terms
        .iter()
        .chain(raw_constraints.iter().flat_map(|(terms, _, _)| terms.iter()))
    {
        if !var_index.contains_key(&term.variable) {
            var_index.insert(term.variable.clone(), var_order.len());
            var_order.push(term.variable.clone());
        }
    }
    for (name, _, _) in &raw_bounds {
        if !var_index.contains_key(name) {
            var_index.insert(name.clone(), var_order.len());
            var_order.push(name.clone());
        }
    }

    let n = var_order.len();
    if n == 0 {
        return Err(SolverError::parse("no variables found in LP-format input"));
    }

    let mut costs = vec![S::zero(); n];
    for term in &objective_terms {
        let idx = var_index[&term.variable];
        costs[idx] = costs[idx] + S::from_f64(term.coefficient);
    }

    let mut constraints = Vec::with_capacity(raw_constraints.len() + n);
    for (terms, sense, rhs) in &raw_constraints {
        let mut coefficients = vec![S::zero(); n];
        for term in terms {
            let idx = var_index[&term.variable];
            coefficients[idx] = coefficients[idx] + S::from_f64(term.coefficient);
        }
        constraints.push(Constraint {
            coefficients,
            sense: *sense,
            rhs: S::from_f64(*rhs),
        });
    }

    let mut explicit_lower = vec![None; n];
    let mut explicit_upper = vec![None; n];
    for (name, lower, upper) in &raw_bounds {
        let idx = var_index[name];
        if let Some(lb) = lower {
            explicit_lower[idx] = Some(*lb);
        }
        if let Some(ub) = upper {
            explicit_upper[idx] = Some(*ub);
        }
    }

    for j in 0..n {
        let mut eye = vec![S::zero(); n];
        eye[j] = S::one();
        match explicit_lower[j] {
            Some(lb) if lb != 0.0 => constraints.push(Constraint {
                coefficients: eye.clone(),
                sense: Sense::GreaterEqual,
                rhs: S::from_f64(lb),
            }),
            Some(_) => constraints.push(Constraint {
                coefficients: eye.clone(),
                sense: Sense::NonNegative,
                rhs: S::zero(),
            }),
            // LP format's default lower bound is 0, matching our standard
            // form's implicit non-negativity.
            None => constraints.push(Constraint {
                coefficients: eye.clone(),
                sense: Sense::NonNegative,
                rhs: S::zero(),
            }),
        }
        if let Some(ub) = explicit_upper[j] {
            constraints.push(Constraint {
                coefficients: eye,
                sense: Sense::LessEqual,
                rhs: S::from_f64(ub),
            });
        }
    }

    let variables = var_order
        .into_iter()
        .map(|name| Variable {
            name,
            origin: VariableOrigin::Original,
        })
        .collect();

    Ok(ProblemModel {
        variables,
        constraints,
        objective: Objective {
            direction: objective_direction,
            costs,
        },
    })
}

/// Strips an optional `label:` prefix used on objective/constraint rows.
fn strip_label(line: &str) -> (Option<&str>, &str) {
    if let Some(idx) = line.find(':') {
        let (label, rest) = line.split_at(idx);
        (Some(label.trim()), rest[1..].trim())
    } else {
        (None, line)
    }
}

/// Tokenizes a `+ 2 x1 - x2 + 3.5 x3` style expression into signed terms.
/// Coefficients are optional (`x1` means `1 x1`); no space is required
/// between a coefficient and its variable (`2x1`).
fn parse_terms(body: &str, line_no: usize) -> Result<Vec<Term>, SolverError> {
    let mut terms = Vec::new();
    let mut sign = 1.0;
    let mut chars = body.chars().peekable();
    let mut buffer = String::new();

    fn flush(buffer: &mut String, sign: f64, terms: &mut Vec<Term>, line_no: usize) -> Result<(), SolverError> {
        if buffer.trim().is_empty() {
            return Ok(());
        }
        let token = buffer.trim();
        let split = token
            .find(|c: char| c.is_alphabetic() || c == '_')
            .unwrap_or(token.len());
        let (coef_str, name) = token.split_at(split);
        if name.is_empty() {
            return Err(SolverError::parse_at(format!("term '{token}' has no variable name"), line_no));
        }
        let coefficient = if coef_str.is_empty() {
            1.0
        } else {
            coef_str
                .parse::<f64>()
                .map_err(|_| SolverError::parse_at(format!("invalid coefficient '{coef_str}'"), line_no))?
        };
        terms.push(Term {
            coefficient: sign * coefficient,
            variable: name.to_string(),
        });
        buffer.clear();
        Ok(())
    }

    while let Some(&c) = chars.peek() {
        match c {
            '+' => {
                flush(&mut buffer, sign, &mut terms, line_no)?;
                sign = 1.0;
                chars.next();
            }
            '-' => {
                flush(&mut buffer, sign, &mut terms, line_no)?;
                sign = -1.0;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                buffer.push(c);
                chars.next();
            }
        }
    }
    flush(&mut buffer, sign, &mut terms, line_no)?;
    Ok(terms)
}

fn parse_constraint_row(body: &str, line_no: usize) -> Result<(Vec<Term>, Sense, f64), SolverError> {
    for (needle, sense) in [("<=", Sense::LessEqual), (">=", Sense::GreaterEqual), ("=", Sense::Equal)] {
        if let Some(idx) = body.find(needle) {
            let (lhs, rhs) = body.split_at(idx);
            let rhs = &rhs[needle.len()..];
            let terms = parse_terms(lhs, line_no)?;
            let rhs_value: f64 = rhs
                .trim()
                .parse()
                .map_err(|_| SolverError::parse_at(format!("invalid RHS '{}'", rhs.trim()), line_no))?;
            return Ok((terms, sense, rhs_value));
        }
    }
    Err(SolverError::parse_at(
        "constraint row has no comparison operator",
        line_no,
    ))
}

fn parse_bound_row(line: &str, line_no: usize) -> Result<(String, Option<f64>, Option<f64>), SolverError> {
    let lowered = line.to_ascii_lowercase();
    if lowered.ends_with("free") {
        let name = line[..line.len() - 4].trim().to_string();
        return Ok((name, Some(f64::NEG_INFINITY), Some(f64::INFINITY)));
    }

    // Two-sided: `<lb> <= name <= <ub>`.
    if let (Some(first_op), Some(last_op)) = (line.find("<="), line.rfind("<=")) {
        if first_op != last_op {
            let lb: f64 = line[..first_op]
                .trim()
                .parse()
                .map_err(|_| SolverError::parse_at("invalid lower bound", line_no))?;
            let middle = &line[first_op + 2..last_op];
            let ub: f64 = line[last_op + 2..]
                .trim()
                .parse()
                .map_err(|_| SolverError::parse_at("invalid upper bound", line_no))?;
            return Ok((middle.trim().to_string(), Some(lb), Some(ub)));
        }
    }

    for (needle, is_lower) in [(">=", true), ("<=", false)] {
        if let Some(idx) = line.find(needle) {
            let (name, value) = line.split_at(idx);
            let value = &value[needle.len()..];
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| SolverError::parse_at(format!("invalid bound '{}'", value.trim()), line_no))?;
            return Ok(if is_lower {
                (name.trim().to_string(), Some(value), None)
            } else {
                (name.trim().to_string(), None, Some(value))
            });
        }
    }

    Err(SolverError::parse_at(format!("unrecognized bounds row '{line}'"), line_no))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_objective_and_constraints() {
        let text = "Maximize\n 0.6 x1 + 0.5 x2\nSubject To\n x1 + 2 x2 <= 1\n 3 x1 + x2 <= 2\nEnd\n";
        let problem: ProblemModel<f64> = parse(text).unwrap();
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.objective.direction, Direction::Maximize);
    }

    #[test]
    fn parses_variable_bounds() {
        let text = "Minimize\n x\nSubject To\n x + 0 y <= 10\nBounds\n 2 <= x <= 8\nEnd\n";
        let problem: ProblemModel<f64> = parse(text).unwrap();
        assert!(problem.constraints.iter().any(|c| c.sense == Sense::GreaterEqual));
        assert!(problem.constraints.iter().any(|c| c.sense == Sense::LessEqual));
    }
}
