//! Linear programming solver abstraction layer.
//!
//! This module decouples the allocation model from the concrete solver
//! libraries (Gurobi and COIN-OR CBC). Models are assembled through
//! [`LPModelBuilder`] and handed to whichever backend is compiled in and
//! selected at run time.
//!
//! # Branded types
//!
//! `VariableId`, `LinearExpression`, `Constraint` and `LPModelBuilder` all
//! carry a `Brand` type parameter. The brand is a zero-sized phantom type:
//! a variable created by one builder cannot be fed into another builder or
//! mixed into another builder's expressions, and the mistake is caught at
//! compile time rather than as a scrambled column index inside the solver.
//! The [`lp_model_builder!`](crate::lp_model_builder) macro mints a fresh
//! brand per call site:
//!
//! ```rust
//! use allot::constraint;
//! use allot::lp_model_builder;
//! use allot::lp_solver::{OptimizationSense, VariableType};
//!
//! let mut builder = lp_model_builder!();
//! let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
//! let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);
//!
//! builder.add_constraint(constraint!((x + y) <= 10.0));
//! builder.set_objective(2.0 * x + y, OptimizationSense::Maximize);
//! ```
//!
//! For a named brand use `lp_model_builder!(MyModel)`, or spell the generic
//! out with `LPModelBuilder::<MyModel>::new()`.
//!
//! # Expressions and constraints
//!
//! Linear expressions are built with ordinary operators (`x + y`,
//! `2.0 * x - 3.0`, see [`ops`]); constraints are written either with the
//! [`constraint!`](crate::constraint) macro, `(lhs) <op> rhs` with the
//! left-hand side parenthesised, or through the [`Constraint`] helpers
//! (`Constraint::le`, `Constraint::eq`, ...). Constraints may carry a name
//! used for diagnostics; the unnamed forms leave it empty.
//!
//! # Backend selection
//!
//! The backend is picked from the `ALLOT_LP_SOLVER` environment variable
//! (`"gurobi"`, `"coin_cbc"`/`"cbc"`). When unset, Gurobi is preferred if
//! its feature is enabled, otherwise CBC. Building with neither feature
//! turns `solve` into a hard error.

use anyhow::Result;
use std::env;
use std::marker::PhantomData;
use std::sync::Arc;

/// Variable domains supported by the LP backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous variable (any real value within its bounds)
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable (0 or 1)
    Binary,
}

/// Relational sense of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
    /// Strictly greater than (>)
    Greater,
}

/// Optimization direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationSense {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Termination status reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// Optimal solution found
    Optimal,
    /// Feasible solution found, optimality not proven
    Feasible,
    /// Problem proven infeasible
    Infeasible,
    /// Problem proven unbounded
    Unbounded,
    /// Problem is infeasible or unbounded, the solver could not tell which
    InfeasibleOrUnbounded,
    /// Any other solver-specific termination
    Other(&'static str),
}

/// Available LP solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverBackend {
    #[cfg(feature = "gurobi")]
    Gurobi,
    #[cfg(feature = "coin_cbc")]
    CoinCbc,
}

impl SolverBackend {
    /// Pick the backend from `ALLOT_LP_SOLVER`, falling back to whatever is
    /// compiled in (Gurobi preferred).
    fn from_env_or_default() -> Result<Self> {
        if let Ok(solver_name) = env::var("ALLOT_LP_SOLVER") {
            match solver_name.to_lowercase().as_str() {
                "gurobi" => {
                    #[cfg(feature = "gurobi")]
                    return Ok(SolverBackend::Gurobi);
                    #[cfg(not(feature = "gurobi"))]
                    return Err(anyhow::anyhow!(
                        "Gurobi requested via ALLOT_LP_SOLVER but the gurobi feature is not enabled"
                    ));
                }
                "coin_cbc" | "coin-cbc" | "cbc" => {
                    #[cfg(feature = "coin_cbc")]
                    return Ok(SolverBackend::CoinCbc);
                    #[cfg(not(feature = "coin_cbc"))]
                    return Err(anyhow::anyhow!(
                        "CBC requested via ALLOT_LP_SOLVER but the coin_cbc feature is not enabled"
                    ));
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid solver '{}' in ALLOT_LP_SOLVER. Valid options: gurobi, coin_cbc",
                        solver_name
                    ));
                }
            }
        }

        #[cfg(feature = "gurobi")]
        return Ok(SolverBackend::Gurobi);

        #[allow(unreachable_code)]
        #[cfg(feature = "coin_cbc")]
        return Ok(SolverBackend::CoinCbc);

        #[cfg(not(any(feature = "gurobi", feature = "coin_cbc")))]
        Err(anyhow::anyhow!(
            "No LP solver backend available. Enable the 'coin_cbc' or 'gurobi' feature."
        ))
    }
}

/// A single `coefficient * variable` term
#[derive(Debug, Clone)]
pub struct LinearTerm<Brand> {
    pub coefficient: f64,
    pub variable: VariableId<Brand>,
}

/// A linear expression: sum of terms plus a constant
#[derive(Debug, Clone)]
pub struct LinearExpression<Brand> {
    pub terms: Vec<LinearTerm<Brand>>,
    pub constant: f64,
}

impl<Brand> LinearExpression<Brand> {
    /// Expression holding only a constant
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Append a `coefficient * variable` term
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId<Brand>) {
        self.terms.push(LinearTerm {
            coefficient,
            variable,
        });
    }

    /// Expression consisting of a single variable
    pub fn from_variable(variable: VariableId<Brand>) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }
}

impl<Brand> From<VariableId<Brand>> for LinearExpression<Brand> {
    fn from(variable: VariableId<Brand>) -> Self {
        Self::from_variable(variable)
    }
}

/// Handle to a variable in an [`LPModelBuilder`]
///
/// Internally an index into the builder's column vector; the `Brand`
/// parameter ties the handle to the builder that created it.
pub struct VariableId<Brand> {
    pub(crate) id: usize,
    pub(crate) _brand: PhantomData<fn() -> Brand>,
}

// Manual impls so Brand itself never needs to implement anything.
impl<Brand> std::fmt::Debug for VariableId<Brand> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableId").field("id", &self.id).finish()
    }
}

impl<Brand> Clone for VariableId<Brand> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Brand> Copy for VariableId<Brand> {}

impl<Brand> PartialEq for VariableId<Brand> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Brand> Eq for VariableId<Brand> {}

impl<Brand> std::hash::Hash for VariableId<Brand> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Handle to a constraint in an [`LPModelBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(usize);

/// A linear constraint: `expression <sense> rhs`, with an optional
/// diagnostic name
#[derive(Debug, Clone)]
pub struct Constraint<Brand> {
    pub(crate) name: Arc<str>,
    pub(crate) expression: LinearExpression<Brand>,
    pub(crate) sense: ConstraintSense,
    pub(crate) rhs: f64,
}

impl<Brand> Constraint<Brand> {
    /// Create a named constraint
    pub fn new(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            sense,
            rhs,
        }
    }

    /// Unnamed equality constraint: `expression == rhs`
    pub fn eq(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new("", expression, ConstraintSense::Equal, rhs)
    }

    /// Unnamed `expression <= rhs`
    pub fn le(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new("", expression, ConstraintSense::LessEqual, rhs)
    }

    /// Unnamed `expression >= rhs`
    pub fn ge(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new("", expression, ConstraintSense::GreaterEqual, rhs)
    }

    /// Unnamed strict `expression > rhs`
    pub fn gt(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new("", expression, ConstraintSense::Greater, rhs)
    }
}

/// Column metadata stored by the builder
#[derive(Debug, Clone)]
pub(crate) struct VariableInfo {
    pub(crate) name: Arc<str>,
    pub(crate) var_type: VariableType,
    pub(crate) lower_bound: f64,
    pub(crate) upper_bound: f64,
}

/// Objective function: expression plus direction
#[derive(Debug, Clone)]
pub(crate) struct ObjectiveInfo<Brand> {
    pub(crate) expression: LinearExpression<Brand>,
    pub(crate) sense: OptimizationSense,
}

/// Result of solving an LP model
///
/// Variable values are only populated for [`OptimizationStatus::Optimal`]
/// and [`OptimizationStatus::Feasible`]; for every other status
/// `get_value` returns the zero-initialised placeholders.
#[derive(Debug, Clone)]
pub struct LPSolution<Brand> {
    pub status: OptimizationStatus,
    pub objective_value: f64,
    pub(crate) variable_values: Vec<f64>,
    pub(crate) _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPSolution<Brand> {
    /// Value assigned to `var_id`, if the variable belongs to this model
    pub fn get_value(&self, var_id: VariableId<Brand>) -> Option<f64> {
        self.variable_values.get(var_id.id).copied()
    }
}

/// Backend-independent LP model builder
///
/// Columns are stored in insertion order; `VariableId` is an index into
/// that order, so lookups never hash. The `Brand` parameter prevents
/// handles from one builder leaking into another (see the module docs).
pub struct LPModelBuilder<Brand> {
    pub(crate) variables: Vec<VariableInfo>,
    pub(crate) constraints: Vec<Constraint<Brand>>,
    pub(crate) objective: Option<ObjectiveInfo<Brand>>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPModelBuilder<Brand> {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            _brand: PhantomData,
        }
    }

    /// Add a column. The name is kept for diagnostics and passed through to
    /// backends that support named variables.
    pub fn add_variable(
        &mut self,
        name: impl Into<Arc<str>>,
        var_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let var_id = VariableId {
            id: self.variables.len(),
            _brand: PhantomData,
        };
        self.variables.push(VariableInfo {
            name: name.into(),
            var_type,
            lower_bound,
            upper_bound,
        });
        var_id
    }

    /// Add a constraint to the model
    pub fn add_constraint(&mut self, constraint: Constraint<Brand>) -> ConstraintId {
        let constr_id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        constr_id
    }

    /// Set the objective function
    pub fn set_objective(
        &mut self,
        expression: impl Into<LinearExpression<Brand>>,
        sense: OptimizationSense,
    ) {
        self.objective = Some(ObjectiveInfo {
            expression: expression.into(),
            sense,
        });
    }

    /// Name of a variable previously added with [`add_variable`](Self::add_variable)
    pub fn variable_name(&self, var_id: VariableId<Brand>) -> Option<&str> {
        self.variables.get(var_id.id).map(|v| &*v.name)
    }

    /// Number of columns currently in the model
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Solve the model with the selected backend
    pub fn solve(&self) -> Result<LPSolution<Brand>> {
        let solver = SolverBackend::from_env_or_default()?;

        match solver {
            #[cfg(feature = "gurobi")]
            SolverBackend::Gurobi => crate::lp_solver::gurobi::solve_gurobi(self),

            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => crate::lp_solver::coin_cbc::solve_coin_cbc(self),
        }
    }
}

impl<Brand> Default for LPModelBuilder<Brand> {
    fn default() -> Self {
        Self::new()
    }
}

pub mod macros;

pub mod ops;

#[cfg(feature = "gurobi")]
pub mod gurobi;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;

pub mod output_suppression;
