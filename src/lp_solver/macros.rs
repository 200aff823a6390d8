//! Macros for assembling LP models.
//!
//! `lp_model_builder!` creates builders with a unique type-level brand per
//! call site; `constraint!` writes constraints in comparison syntax.

/// Create a new [`LPModelBuilder`](crate::lp_solver::LPModelBuilder) with a
/// unique brand.
///
/// Each invocation defines a fresh local brand type, so variables minted by
/// one builder cannot be mixed into another:
///
/// ```rust
/// use allot::lp_model_builder;
/// use allot::lp_solver::VariableType;
///
/// // Anonymous brand, unique per call site
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
///
/// // Named brand, easier to spot in type errors
/// let mut plan = lp_model_builder!(WeeklyPlan);
/// let sessions = plan.add_variable("sessions", VariableType::Integer, 0.0, 7.0);
///
/// // plan.add_constraint(allot::constraint!((x) <= 5.0)); // would not compile
/// # let _ = (x, sessions);
/// ```
#[macro_export]
macro_rules! lp_model_builder {
    // Named brand
    ($brand_name:ident) => {{
        struct $brand_name;
        $crate::lp_solver::LPModelBuilder::<$brand_name>::new()
    }};

    // Anonymous brand; the struct is scoped to this block, so every
    // invocation gets a distinct type
    () => {{
        struct UniqueBrand;
        $crate::lp_solver::LPModelBuilder::<UniqueBrand>::new()
    }};
}

/// Create a [`Constraint`](crate::lp_solver::Constraint) in comparison
/// syntax. The left-hand side must be parenthesised.
///
/// ```rust
/// use allot::constraint;
/// use allot::lp_model_builder;
/// use allot::lp_solver::VariableType;
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
/// let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);
///
/// builder.add_constraint(constraint!((x + y) == 10.0));
/// builder.add_constraint(constraint!((2.0 * x - y) <= 5.0));
///
/// // Named form, for solver diagnostics
/// builder.add_constraint(constraint!("demand", (x + y) >= 1.0));
/// ```
#[macro_export]
macro_rules! constraint {
    (($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            "",
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            "",
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            "",
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
    (($lhs:expr) > $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            "",
            $lhs,
            $crate::lp_solver::ConstraintSense::Greater,
            $rhs as f64,
        )
    };

    ($name:expr, ($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) > $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::Greater,
            $rhs as f64,
        )
    };
}
