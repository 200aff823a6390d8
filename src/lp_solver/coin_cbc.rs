use std::collections::HashMap;

use crate::lp_solver::output_suppression::GagHandle;
use crate::lp_solver::*;
use ::coin_cbc::{Model, Sense};

/// Round a value to a number of significant digits. Masks the floating
/// point noise CBC leaves on integral and boundary solutions.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

/// Solve an LP model using COIN-OR CBC
pub fn solve_coin_cbc<Brand>(builder: &LPModelBuilder<Brand>) -> Result<LPSolution<Brand>> {
    // CBC logs its progress to stdout, where our reports also go
    let _gag_handle = GagHandle::stdout()?;
    let mut model = Model::default();
    let mut var_map = HashMap::new();

    for (idx, var_info) in builder.variables.iter().enumerate() {
        let col = match var_info.var_type {
            VariableType::Continuous => model.add_col(),
            VariableType::Integer => model.add_integer(),
            VariableType::Binary => model.add_binary(),
        };
        // Bounds are applied for binaries too: a binary pinned to zero is
        // how callers exclude an activity from the model.
        model.set_col_lower(col, var_info.lower_bound);
        model.set_col_upper(col, var_info.upper_bound);

        let var_id = VariableId {
            id: idx,
            _brand: std::marker::PhantomData,
        };
        var_map.insert(var_id, col);
    }

    for constraint in &builder.constraints {
        let row = model.add_row();

        for term in &constraint.expression.terms {
            if let Some(&col) = var_map.get(&term.variable) {
                model.set_weight(row, col, term.coefficient);
            } else {
                return Err(anyhow::anyhow!(
                    "Variable {:?} not found in model",
                    term.variable
                ));
            }
        }

        let rhs_adjusted = constraint.rhs - constraint.expression.constant;

        match constraint.sense {
            ConstraintSense::LessEqual => {
                model.set_row_upper(row, rhs_adjusted);
            }
            ConstraintSense::Equal => {
                model.set_row_equal(row, rhs_adjusted);
            }
            ConstraintSense::GreaterEqual => {
                model.set_row_lower(row, rhs_adjusted);
            }
            ConstraintSense::Greater => {
                // CBC has no strict inequalities; approximate with a small epsilon
                model.set_row_lower(row, rhs_adjusted + 1e-10);
            }
        }
    }

    if let Some(obj_info) = &builder.objective {
        for term in &obj_info.expression.terms {
            if let Some(&col) = var_map.get(&term.variable) {
                model.set_obj_coeff(col, term.coefficient);
            } else {
                return Err(anyhow::anyhow!(
                    "Variable {:?} not found in model",
                    term.variable
                ));
            }
        }

        let sense = match obj_info.sense {
            OptimizationSense::Minimize => Sense::Minimize,
            OptimizationSense::Maximize => Sense::Maximize,
        };

        model.set_obj_sense(sense);
    }

    let solution = model.solve();

    let status = if solution.raw().is_proven_optimal() {
        OptimizationStatus::Optimal
    } else if solution.raw().is_proven_infeasible() {
        OptimizationStatus::Infeasible
    } else if solution.raw().is_continuous_unbounded() {
        OptimizationStatus::Unbounded
    } else {
        OptimizationStatus::Other("Unknown status")
    };

    // Only an optimal termination carries meaningful column values
    let num_vars = builder.variables.len();
    let mut variable_values = vec![0.0; num_vars];
    let mut objective_value = 0.0;
    if status == OptimizationStatus::Optimal {
        for (var_id, col) in var_map.iter() {
            let value = round_to_sig_digits(solution.col(*col), 8);
            variable_values[var_id.id] = value;
        }

        if let Some(obj_info) = &builder.objective {
            let mut obj_val = obj_info.expression.constant;
            for term in &obj_info.expression.terms {
                obj_val += term.coefficient * variable_values[term.variable.id];
            }
            objective_value = round_to_sig_digits(obj_val, 8);
        }
    }

    Ok(LPSolution {
        status,
        objective_value,
        variable_values,
        _brand: std::marker::PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sig_digit_rounding() {
        assert_eq!(round_to_sig_digits(0.0, 8), 0.0);
        assert_eq!(round_to_sig_digits(79.999999995, 8), 80.0);
        assert_eq!(round_to_sig_digits(-0.000012345678912, 8), -0.000012345679);
        assert_eq!(round_to_sig_digits(123456789.12, 8), 123456790.0);
    }
}
