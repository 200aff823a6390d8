//! Allocation problem model.
//!
//! A [`Problem`] is the solver-independent description of an allocation:
//! an ordered registry of named [`Variable`]s, a list of linear
//! [`Constraint`]s over those names, and one [`Objective`]. Problems are
//! assembled fresh for every solve request and handed to
//! [`optimizer::solve`](crate::optimizer::solve) by reference; nothing
//! mutates them afterwards.
//!
//! Variables are keyed by interned name ([`Symbol`]). The registry keeps
//! insertion order, which defines the column order seen by the solver and
//! the row order of reports, but no other part of the model depends on
//! ordering.
//!
//! Everything malformed (duplicate or ill-formed names, references to
//! variables that were never registered, crossed bounds, non-finite
//! numbers) is caught by [`Problem::validate`] and reported as a
//! [`ValidationError`] before the solver is ever involved.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::{error::Error, fmt};
use string_cache::DefaultAtom;

use crate::lp_solver::OptimizationSense;

/// Interned variable/constraint name
pub type Symbol = DefaultAtom;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").unwrap();
}

/// Value domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Any real value within the bounds
    Continuous,
    /// Integer values within the bounds
    Integer,
    /// 0 or 1
    Boolean,
}

/// A named decision variable with bounds and a domain
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: Symbol,
    lower: f64,
    upper: f64,
    domain: Domain,
}

impl Variable {
    /// Continuous variable on `[lower, upper]`; use `f64::INFINITY` /
    /// `f64::NEG_INFINITY` for unbounded sides
    pub fn continuous(name: impl Into<Symbol>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            domain: Domain::Continuous,
        }
    }

    /// Integer variable on `[lower, upper]`
    pub fn integer(name: impl Into<Symbol>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            domain: Domain::Integer,
        }
    }

    /// Boolean variable (bounds fixed to {0, 1})
    pub fn boolean(name: impl Into<Symbol>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: 1.0,
            domain: Domain::Boolean,
        }
    }

    /// Pin the variable to zero, removing it from any positive allocation
    /// while keeping it in the report
    pub fn excluded(mut self) -> Self {
        self.lower = 0.0;
        self.upper = 0.0;
        self
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

/// Linear expression over variable names: `Σ coeff·name + constant`
///
/// Coefficients accumulate: adding a term for a name that already has one
/// sums the coefficients instead of duplicating the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: HashMap<Symbol, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constant(constant: f64) -> Self {
        Self {
            terms: HashMap::new(),
            constant,
        }
    }

    /// Add `coefficient * name`, merging with any existing term
    pub fn add_term(&mut self, name: impl Into<Symbol>, coefficient: f64) -> &mut Self {
        *self.terms.entry(name.into()).or_insert(0.0) += coefficient;
        self
    }

    /// Chaining form of [`add_term`](Self::add_term)
    pub fn term(mut self, name: impl Into<Symbol>, coefficient: f64) -> Self {
        self.add_term(name, coefficient);
        self
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient for `name`, 0.0 when absent
    pub fn coefficient(&self, name: &Symbol) -> f64 {
        self.terms.get(name).copied().unwrap_or(0.0)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.terms.iter().map(|(name, &coeff)| (name, coeff))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression against per-variable values
    pub fn eval(&self, value_of: impl Fn(&Symbol) -> f64) -> f64 {
        self.terms
            .iter()
            .map(|(name, coeff)| coeff * value_of(name))
            .sum::<f64>()
            + self.constant
    }
}

/// Relational operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEqual => write!(f, "<="),
            Relation::Equal => write!(f, "="),
            Relation::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Linear constraint: `expr <relation> rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: Symbol,
    expr: LinearExpr,
    relation: Relation,
    rhs: f64,
}

impl Constraint {
    /// Unnamed constraint
    pub fn new(expr: LinearExpr, relation: Relation, rhs: f64) -> Self {
        Self {
            name: Symbol::from(""),
            expr,
            relation,
            rhs,
        }
    }

    /// Constraint with a diagnostic name
    pub fn named(name: impl Into<Symbol>, expr: LinearExpr, relation: Relation, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            relation,
            rhs,
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Whether `value_of` satisfies the constraint within `tolerance`
    pub fn satisfied_by(&self, value_of: impl Fn(&Symbol) -> f64, tolerance: f64) -> bool {
        let lhs = self.expr.eval(value_of);
        match self.relation {
            Relation::LessEqual => lhs <= self.rhs + tolerance,
            Relation::Equal => (lhs - self.rhs).abs() <= tolerance,
            Relation::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

/// Objective: linear expression plus direction
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    expr: LinearExpr,
    sense: OptimizationSense,
}

impl Objective {
    pub fn maximize(expr: LinearExpr) -> Self {
        Self {
            expr,
            sense: OptimizationSense::Maximize,
        }
    }

    pub fn minimize(expr: LinearExpr) -> Self {
        Self {
            expr,
            sense: OptimizationSense::Minimize,
        }
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn sense(&self) -> OptimizationSense {
        self.sense
    }
}

/// A complete allocation problem
///
/// Built once per solve request; [`validate`](Self::validate) runs before
/// lowering into the LP layer, so the solver only ever sees well-formed
/// input.
#[derive(Debug, Clone)]
pub struct Problem {
    variables: Vec<Variable>,
    index: HashMap<Symbol, usize>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl Problem {
    pub fn new(objective: Objective) -> Self {
        Self {
            variables: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            objective,
        }
    }

    /// Register a variable. Names must match `[A-Za-z_][A-Za-z0-9_.-]*`
    /// and be unique within the problem.
    pub fn add_variable(&mut self, variable: Variable) -> Result<(), ValidationError> {
        if !NAME_RE.is_match(variable.name.as_ref()) {
            return Err(ValidationError::BadName(variable.name.clone()));
        }
        if self.index.contains_key(&variable.name) {
            return Err(ValidationError::DuplicateVariable(variable.name.clone()));
        }
        self.index
            .insert(variable.name.clone(), self.variables.len());
        self.variables.push(variable);
        Ok(())
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Variables in registration order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Keyed lookup into the registry
    pub fn variable(&self, name: &Symbol) -> Option<&Variable> {
        self.index.get(name).map(|&ix| &self.variables[ix])
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Check the whole problem for defects that must never reach the
    /// solver: crossed or NaN bounds, references to unregistered
    /// variables, non-finite coefficients or right-hand sides.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for variable in &self.variables {
            if variable.lower.is_nan() || variable.upper.is_nan() {
                return Err(ValidationError::NonFinite {
                    constraint: None,
                });
            }
            if variable.lower > variable.upper {
                return Err(ValidationError::BoundMismatch {
                    variable: variable.name.clone(),
                    lower: variable.lower,
                    upper: variable.upper,
                });
            }
        }

        for constraint in &self.constraints {
            let location = if constraint.name.is_empty() {
                None
            } else {
                Some(constraint.name.clone())
            };
            if !constraint.rhs.is_finite() || !constraint.expr.constant.is_finite() {
                return Err(ValidationError::NonFinite {
                    constraint: location,
                });
            }
            for (name, coeff) in constraint.expr.terms() {
                if !coeff.is_finite() {
                    return Err(ValidationError::NonFinite {
                        constraint: location,
                    });
                }
                if !self.index.contains_key(name) {
                    return Err(ValidationError::UnknownVariable {
                        variable: name.clone(),
                        constraint: location,
                    });
                }
            }
        }

        if !self.objective.expr.constant.is_finite() {
            return Err(ValidationError::NonFinite { constraint: None });
        }
        for (name, coeff) in self.objective.expr.terms() {
            if !coeff.is_finite() {
                return Err(ValidationError::NonFinite { constraint: None });
            }
            if !self.index.contains_key(name) {
                return Err(ValidationError::UnknownVariable {
                    variable: name.clone(),
                    constraint: None,
                });
            }
        }

        Ok(())
    }
}

/// Defects detected in a [`Problem`] before solving
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Variable name does not match the accepted identifier pattern
    BadName(Symbol),
    /// A variable with this name is already registered
    DuplicateVariable(Symbol),
    /// A constraint or the objective references an unregistered variable
    UnknownVariable {
        variable: Symbol,
        /// Name of the offending constraint; `None` for the objective or
        /// an unnamed constraint
        constraint: Option<Symbol>,
    },
    /// Lower bound above upper bound
    BoundMismatch {
        variable: Symbol,
        lower: f64,
        upper: f64,
    },
    /// NaN or infinite value where a finite one is required
    NonFinite { constraint: Option<Symbol> },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BadName(name) => {
                write!(f, "invalid variable name \"{}\"", name)
            }
            ValidationError::DuplicateVariable(name) => {
                write!(f, "variable \"{}\" registered twice", name)
            }
            ValidationError::UnknownVariable {
                variable,
                constraint: Some(constraint),
            } => write!(
                f,
                "constraint \"{}\" references unknown variable \"{}\"",
                constraint, variable
            ),
            ValidationError::UnknownVariable {
                variable,
                constraint: None,
            } => write!(f, "reference to unknown variable \"{}\"", variable),
            ValidationError::BoundMismatch {
                variable,
                lower,
                upper,
            } => write!(
                f,
                "variable \"{}\" has lower bound {} above upper bound {}",
                variable, lower, upper
            ),
            ValidationError::NonFinite {
                constraint: Some(constraint),
            } => write!(f, "non-finite value in constraint \"{}\"", constraint),
            ValidationError::NonFinite { constraint: None } => {
                write!(f, "non-finite value in problem")
            }
        }
    }
}

impl Error for ValidationError {}

/// Outcome classification of a solve request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal assignment found; values and objective are populated
    Optimal,
    /// The feasible region is empty
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// The solver terminated without classifying the problem
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Error => write!(f, "error"),
        }
    }
}

/// Assignment returned by the optimizer
///
/// Values follow the problem's registry order and are present only when
/// the status is [`SolveStatus::Optimal`]; branch on the status before
/// reading them.
#[derive(Debug, Clone)]
pub struct Solution {
    status: SolveStatus,
    objective: Option<f64>,
    values: Vec<(Symbol, f64)>,
}

impl Solution {
    pub(crate) fn optimal(objective: f64, values: Vec<(Symbol, f64)>) -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            values,
        }
    }

    pub(crate) fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Achieved objective value, present when optimal
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Value assigned to `name`, present when optimal and registered
    pub fn value(&self, name: &Symbol) -> Option<f64> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|&(_, value)| value)
    }

    /// All assignments in registry order (empty unless optimal)
    pub fn values(&self) -> &[(Symbol, f64)] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trivial_objective() -> Objective {
        Objective::maximize(LinearExpr::new().term("x", 1.0))
    }

    #[test]
    fn registry_keeps_insertion_order() {
        let mut problem = Problem::new(trivial_objective());
        for name in ["x", "b", "a"] {
            problem
                .add_variable(Variable::continuous(name, 0.0, 1.0))
                .unwrap();
        }

        let names: Vec<_> = problem
            .variables()
            .iter()
            .map(|v| v.name().as_ref().to_owned())
            .collect();
        assert_eq!(names, ["x", "b", "a"]);
        assert_eq!(problem.variable(&Symbol::from("b")).unwrap().upper(), 1.0);
    }

    #[test]
    fn duplicate_variable_rejected() {
        let mut problem = Problem::new(trivial_objective());
        problem
            .add_variable(Variable::continuous("x", 0.0, 1.0))
            .unwrap();
        assert_eq!(
            problem.add_variable(Variable::integer("x", 0.0, 5.0)),
            Err(ValidationError::DuplicateVariable(Symbol::from("x")))
        );
    }

    #[test]
    fn bad_names_rejected() {
        let mut problem = Problem::new(trivial_objective());
        for bad in ["", "2x", "solar panel", "a+b"] {
            assert_eq!(
                problem.add_variable(Variable::continuous(bad, 0.0, 1.0)),
                Err(ValidationError::BadName(Symbol::from(bad)))
            );
        }
        for good in ["x", "solar_pv", "unit.2", "WIND-north", "_hidden"] {
            assert!(
                problem
                    .add_variable(Variable::continuous(good, 0.0, 1.0))
                    .is_ok()
            );
        }
    }

    #[test]
    fn dangling_constraint_reference_caught() {
        let mut problem = Problem::new(trivial_objective());
        problem
            .add_variable(Variable::continuous("x", 0.0, 1.0))
            .unwrap();
        problem.add_constraint(Constraint::named(
            "cap",
            LinearExpr::new().term("ghost", 1.0),
            Relation::LessEqual,
            1.0,
        ));

        assert_eq!(
            problem.validate(),
            Err(ValidationError::UnknownVariable {
                variable: Symbol::from("ghost"),
                constraint: Some(Symbol::from("cap")),
            })
        );
    }

    #[test]
    fn dangling_objective_reference_caught() {
        let mut problem = Problem::new(Objective::minimize(LinearExpr::new().term("ghost", 1.0)));
        problem
            .add_variable(Variable::continuous("x", 0.0, 1.0))
            .unwrap();

        assert_eq!(
            problem.validate(),
            Err(ValidationError::UnknownVariable {
                variable: Symbol::from("ghost"),
                constraint: None,
            })
        );
    }

    #[test]
    fn crossed_bounds_caught() {
        let mut problem = Problem::new(trivial_objective());
        problem
            .add_variable(Variable::continuous("x", 2.0, 1.0))
            .unwrap();

        assert!(matches!(
            problem.validate(),
            Err(ValidationError::BoundMismatch { lower, upper, .. }) if lower == 2.0 && upper == 1.0
        ));
    }

    #[test]
    fn non_finite_rhs_caught() {
        let mut problem = Problem::new(trivial_objective());
        problem
            .add_variable(Variable::continuous("x", 0.0, 1.0))
            .unwrap();
        problem.add_constraint(Constraint::new(
            LinearExpr::new().term("x", 1.0),
            Relation::LessEqual,
            f64::NAN,
        ));

        assert_eq!(
            problem.validate(),
            Err(ValidationError::NonFinite { constraint: None })
        );
    }

    #[test]
    fn unbounded_sides_are_valid() {
        let mut problem = Problem::new(trivial_objective());
        problem
            .add_variable(Variable::continuous("x", f64::NEG_INFINITY, f64::INFINITY))
            .unwrap();
        assert_eq!(problem.validate(), Ok(()));
    }

    #[test]
    fn expr_terms_accumulate() {
        let expr = LinearExpr::new().term("x", 1.5).term("x", 2.5).term("y", 1.0);
        assert_eq!(expr.coefficient(&Symbol::from("x")), 4.0);
        assert_eq!(expr.coefficient(&Symbol::from("y")), 1.0);
        assert_eq!(expr.coefficient(&Symbol::from("z")), 0.0);
    }

    #[test]
    fn expr_eval_is_dot_product_plus_constant() {
        let expr = LinearExpr::with_constant(3.0).term("x", 2.0).term("y", -1.0);
        let value = expr.eval(|name| match name.as_ref() {
            "x" => 10.0,
            "y" => 4.0,
            _ => 0.0,
        });
        assert_eq!(value, 2.0 * 10.0 - 4.0 + 3.0);
    }

    #[test]
    fn excluded_variable_has_zero_bounds() {
        let variable = Variable::continuous("solar", 0.0, 100.0).excluded();
        assert_eq!(variable.lower(), 0.0);
        assert_eq!(variable.upper(), 0.0);
    }

    #[test]
    fn constraint_satisfaction_respects_tolerance() {
        let constraint = Constraint::new(
            LinearExpr::new().term("x", 1.0),
            Relation::Equal,
            250.0,
        );
        assert!(constraint.satisfied_by(|_| 250.0 + 1e-9, 1e-6));
        assert!(!constraint.satisfied_by(|_| 251.0, 1e-6));
    }
}
