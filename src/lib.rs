//! Linear allocation planning toolkit.
//!
//! `allot` models small allocation problems (named decision variables
//! with bounds and domains, linear constraints over those names, one
//! linear objective) and delegates the numeric optimization to an
//! external LP/MIP solver (COIN-OR CBC by default, Gurobi optionally).
//! The result comes back as a name-keyed assignment ready for a table or
//! CSV.
//!
//! # Main workflow
//!
//! 1. Build a [`Problem`] from whatever parameters the caller collected
//!    (sliders, flags, config): register [`Variable`]s, add
//!    [`Constraint`]s, pick an [`Objective`].
//! 2. Hand it to [`optimizer::solve`]. Validation runs first; solver work
//!    is delegated to the backend selected via `ALLOT_LP_SOLVER`.
//! 3. Branch on the returned [`Solution`]'s status and render the values
//!    ([`report`]).
//!
//! Each solve request is independent and synchronous: problems are built
//! fresh, never shared, never mutated after hand-off.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use allot::{Constraint, LinearExpr, Objective, Problem, Relation, Variable, optimizer};
//!
//! let mut problem = Problem::new(Objective::maximize(
//!     LinearExpr::new().term("wind", 60.0).term("hydro", 70.0),
//! ));
//! problem.add_variable(Variable::continuous("wind", 0.0, 120.0))?;
//! problem.add_variable(Variable::continuous("hydro", 0.0, 80.0))?;
//! problem.add_constraint(Constraint::named(
//!     "demand",
//!     LinearExpr::new().term("wind", 1.0).term("hydro", 1.0),
//!     Relation::Equal,
//!     150.0,
//! ));
//!
//! let solution = optimizer::solve(&problem)?;
//! if solution.is_optimal() {
//!     println!("profit: {}", solution.objective().unwrap());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`problem`]**: the solver-independent model ([`Problem`],
//!   [`Variable`], [`Constraint`], [`Objective`], [`Solution`]) and its
//!   validation
//! - **[`optimizer`]**: lowering a problem into the LP layer and lifting
//!   the result back out
//! - **[`lp_solver`]**: branded model builder and the CBC/Gurobi backends
//! - **[`report`]**: table and CSV rendering
//! - **[`energy`]**, **[`workout`]**: the ready-made allocation scenarios
//!   behind the CLI subcommands

use clap::Parser;
use std::{error::Error, fmt};

pub mod energy;
pub mod lp_solver;
pub mod optimizer;
pub mod problem;
pub mod report;
pub mod workout;

pub use energy::{EnergyArgs, energy_main};
pub use problem::{
    Constraint, Domain, LinearExpr, Objective, Problem, Relation, Solution, SolveStatus, Symbol,
    ValidationError, Variable,
};
pub use workout::{WorkoutArgs, workout_main};

/// Application-level errors shared by the CLI commands.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// The allocation problem has no feasible assignment.
    Infeasible,
    /// The objective can grow without limit.
    Unbounded,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Infeasible => write!(f, "Problem Infeasible"),
            AppError::Unbounded => write!(f, "Problem Unbounded"),
        }
    }
}

impl Error for AppError {}

/// Command-line interface of the allocation tools.
#[derive(Debug, Parser)]
#[clap(
    name = "Allot Tools",
    about = "Linear allocation planning and optimization tools"
)]
pub enum CLIArguments {
    /// Allocate renewable energy production to meet a demand at maximum profit.
    Energy(EnergyArgs),
    /// Plan a weekly workout schedule around a goal, a time budget and
    /// physical limitations.
    Workout(WorkoutArgs),
}
