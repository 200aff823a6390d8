//! Allocation optimizer.
//!
//! [`solve`] is the single entry point between the model and the LP layer:
//! it validates a [`Problem`], lowers it into a freshly branded
//! [`LPModelBuilder`](crate::lp_solver::LPModelBuilder), delegates the
//! numeric work to the configured backend, and lifts the result back into
//! a name-keyed [`Solution`].
//!
//! The function is pure with respect to its input: the problem is taken by
//! reference and never mutated, every call builds its own solver model,
//! and nothing is shared between requests. A backend failure (as opposed
//! to a reported infeasibility) surfaces as `Err` and aborts only the one
//! request.

use std::collections::HashMap;

use anyhow::Result;

use crate::lp_solver::{LinearExpression, OptimizationStatus, VariableId, VariableType};
use crate::problem::{Domain, LinearExpr, Problem, Relation, Solution, SolveStatus, Symbol};
use crate::{constraint, lp_model_builder};

/// Rewrite a name-keyed expression over the solver's variable handles
fn lower_expr<Brand>(
    expr: &LinearExpr,
    ids: &HashMap<Symbol, VariableId<Brand>>,
) -> LinearExpression<Brand> {
    expr.terms()
        .fold(LinearExpression::new(expr.constant()), |acc, (name, coeff)| {
            acc + coeff * ids[name]
        })
}

/// Solve an allocation problem.
///
/// Returns a [`Solution`] whose status callers must branch on: values and
/// the objective are only present for [`SolveStatus::Optimal`]. Malformed
/// problems fail with a [`ValidationError`](crate::problem::ValidationError)
/// before any solver interaction.
pub fn solve(problem: &Problem) -> Result<Solution> {
    problem.validate()?;

    let mut builder = lp_model_builder!();

    let var_ids: HashMap<Symbol, VariableId<_>> = problem
        .variables()
        .iter()
        .map(|variable| {
            let var_type = match variable.domain() {
                Domain::Continuous => VariableType::Continuous,
                Domain::Integer => VariableType::Integer,
                Domain::Boolean => VariableType::Binary,
            };
            let id = builder.add_variable(
                variable.name().as_ref(),
                var_type,
                variable.lower(),
                variable.upper(),
            );
            (variable.name().clone(), id)
        })
        .collect();

    for c in problem.constraints() {
        let expr = lower_expr(c.expr(), &var_ids);
        let name: &str = c.name().as_ref();
        builder.add_constraint(match c.relation() {
            Relation::LessEqual => constraint!(name, (expr) <= c.rhs()),
            Relation::Equal => constraint!(name, (expr) == c.rhs()),
            Relation::GreaterEqual => constraint!(name, (expr) >= c.rhs()),
        });
    }

    builder.set_objective(
        lower_expr(problem.objective().expr(), &var_ids),
        problem.objective().sense(),
    );

    let lp_solution = builder.solve()?;

    Ok(match lp_solution.status {
        OptimizationStatus::Optimal | OptimizationStatus::Feasible => {
            let values = problem
                .variables()
                .iter()
                .map(|variable| {
                    let value = lp_solution
                        .get_value(var_ids[variable.name()])
                        .unwrap_or(0.0);
                    (variable.name().clone(), value)
                })
                .collect();
            Solution::optimal(lp_solution.objective_value, values)
        }
        OptimizationStatus::Infeasible | OptimizationStatus::InfeasibleOrUnbounded => {
            Solution::without_values(SolveStatus::Infeasible)
        }
        OptimizationStatus::Unbounded => Solution::without_values(SolveStatus::Unbounded),
        OptimizationStatus::Other(_) => Solution::without_values(SolveStatus::Error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Constraint, Objective, ValidationError, Variable};

    const TOL: f64 = 1e-6;

    /// Three-source energy allocation: capacities 100/120/80, demand as
    /// given, profit 50/60/70 per unit.
    fn energy_problem(demand: f64) -> Problem {
        let objective = Objective::maximize(
            LinearExpr::new()
                .term("solar", 100.0 - 50.0)
                .term("wind", 100.0 - 40.0)
                .term("hydro", 100.0 - 30.0),
        );
        let mut problem = Problem::new(objective);
        problem
            .add_variable(Variable::continuous("solar", 0.0, 100.0))
            .unwrap();
        problem
            .add_variable(Variable::continuous("wind", 0.0, 120.0))
            .unwrap();
        problem
            .add_variable(Variable::continuous("hydro", 0.0, 80.0))
            .unwrap();
        problem.add_constraint(Constraint::named(
            "demand",
            LinearExpr::new()
                .term("solar", 1.0)
                .term("wind", 1.0)
                .term("hydro", 1.0),
            Relation::Equal,
            demand,
        ));
        problem
    }

    #[test]
    fn cheap_sources_saturate_first() {
        let problem = energy_problem(250.0);
        let solution = solve(&problem).unwrap();

        assert_eq!(solution.status(), SolveStatus::Optimal);
        // Unique optimum: hydro and wind saturate before solar tops up.
        assert!((solution.value(&Symbol::from("hydro")).unwrap() - 80.0).abs() < TOL);
        assert!((solution.value(&Symbol::from("wind")).unwrap() - 120.0).abs() < TOL);
        assert!((solution.value(&Symbol::from("solar")).unwrap() - 50.0).abs() < TOL);
        assert!((solution.objective().unwrap() - 15_300.0).abs() < TOL);
    }

    #[test]
    fn optimal_values_satisfy_all_constraints() {
        let problem = energy_problem(180.0);
        let solution = solve(&problem).unwrap();

        assert!(solution.is_optimal());
        for constraint in problem.constraints() {
            assert!(
                constraint.satisfied_by(|name| solution.value(name).unwrap(), TOL),
                "constraint \"{}\" violated",
                constraint.name()
            );
        }
        for variable in problem.variables() {
            let value = solution.value(variable.name()).unwrap();
            assert!(value >= variable.lower() - TOL);
            assert!(value <= variable.upper() + TOL);
        }
    }

    #[test]
    fn objective_matches_dot_product() {
        let problem = energy_problem(220.0);
        let solution = solve(&problem).unwrap();

        let recomputed = problem
            .objective()
            .expr()
            .eval(|name| solution.value(name).unwrap());
        assert!((solution.objective().unwrap() - recomputed).abs() < TOL);
    }

    #[test]
    fn demand_above_total_capacity_is_infeasible() {
        // 350 > 100 + 120 + 80
        let problem = energy_problem(350.0);
        let solution = solve(&problem).unwrap();

        assert_eq!(solution.status(), SolveStatus::Infeasible);
        assert_eq!(solution.objective(), None);
        assert!(solution.values().is_empty());
    }

    #[test]
    fn resolving_yields_same_objective() {
        let problem = energy_problem(250.0);
        let first = solve(&problem).unwrap();
        let second = solve(&problem).unwrap();

        assert_eq!(first.status(), second.status());
        assert!((first.objective().unwrap() - second.objective().unwrap()).abs() < TOL);
    }

    #[test]
    fn excluded_variable_stays_at_zero() {
        let objective = Objective::maximize(
            LinearExpr::new()
                .term("solar", 50.0)
                .term("wind", 60.0)
                .term("hydro", 70.0),
        );
        let mut problem = Problem::new(objective);
        problem
            .add_variable(Variable::continuous("solar", 0.0, 100.0).excluded())
            .unwrap();
        problem
            .add_variable(Variable::continuous("wind", 0.0, 120.0))
            .unwrap();
        problem
            .add_variable(Variable::continuous("hydro", 0.0, 80.0))
            .unwrap();
        problem.add_constraint(Constraint::named(
            "demand",
            LinearExpr::new()
                .term("solar", 1.0)
                .term("wind", 1.0)
                .term("hydro", 1.0),
            Relation::Equal,
            150.0,
        ));

        let solution = solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert_eq!(solution.value(&Symbol::from("solar")), Some(0.0));
    }

    #[test]
    fn unbounded_objective_reported() {
        let mut problem = Problem::new(Objective::maximize(LinearExpr::new().term("x", 1.0)));
        problem
            .add_variable(Variable::continuous("x", 0.0, f64::INFINITY))
            .unwrap();
        problem.add_constraint(Constraint::new(
            LinearExpr::new().term("x", 1.0),
            Relation::GreaterEqual,
            1.0,
        ));

        let solution = solve(&problem).unwrap();
        assert_eq!(solution.status(), SolveStatus::Unbounded);
        assert!(solution.values().is_empty());
    }

    #[test]
    fn validation_runs_before_the_solver() {
        let mut problem = Problem::new(Objective::maximize(LinearExpr::new().term("ghost", 1.0)));
        problem
            .add_variable(Variable::continuous("x", 0.0, 1.0))
            .unwrap();

        let err = solve(&problem).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[test]
    fn integer_domain_rounds_to_whole_sessions() {
        // maximize x + y subject to x + y <= 3.5 with integer x, y
        let mut problem = Problem::new(Objective::maximize(
            LinearExpr::new().term("x", 1.0).term("y", 1.0),
        ));
        problem
            .add_variable(Variable::integer("x", 0.0, 10.0))
            .unwrap();
        problem
            .add_variable(Variable::integer("y", 0.0, 10.0))
            .unwrap();
        problem.add_constraint(Constraint::new(
            LinearExpr::new().term("x", 1.0).term("y", 1.0),
            Relation::LessEqual,
            3.5,
        ));

        let solution = solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!((solution.objective().unwrap() - 3.0).abs() < TOL);
        for &(_, value) in solution.values() {
            assert!((value - value.round()).abs() < TOL);
        }
    }
}
