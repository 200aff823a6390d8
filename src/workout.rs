//! Weekly workout plan scenario.
//!
//! Builds a small mixed-integer program over a fixed exercise catalog:
//! an integer sessions-per-week variable per exercise, plus a boolean
//! inclusion variable that ties "this exercise is part of the plan" to
//! the variety requirement. The goal selects the objective: weight loss
//! maximizes calories burned, muscle gain maximizes time under strength
//! load. Physical limitations knock the affected exercises out of the
//! plan entirely.

use std::{
    fs,
    io::Write,
    path::PathBuf,
};

use anyhow::{Result, bail};
use clap::Parser;
use itertools::Itertools;
use lazy_static::lazy_static;
use ordered_float::OrderedFloat;
use prettytable::{Table, format, row};

use crate::problem::{
    Constraint, LinearExpr, Objective, Problem, Relation, SolveStatus, Symbol, Variable,
};
use crate::{AppError, optimizer, report};

/// Exercise category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseKind {
    Cardio,
    Strength,
}

/// One catalog entry: per-session calories and duration
#[derive(Debug, Clone)]
pub struct Exercise {
    pub name: &'static str,
    pub kind: ExerciseKind,
    pub calories: f64,
    pub minutes: f64,
}

const fn exercise(name: &'static str, kind: ExerciseKind, calories: f64, minutes: f64) -> Exercise {
    Exercise {
        name,
        kind,
        calories,
        minutes,
    }
}

lazy_static! {
    /// The exercise catalog. Strength work burns calories too, but the
    /// reference plan only credits cardio with a calorie figure.
    pub static ref CATALOG: Vec<Exercise> = vec![
        exercise("treadmill", ExerciseKind::Cardio, 500.0, 30.0),
        exercise("elliptical", ExerciseKind::Cardio, 400.0, 30.0),
        exercise("rowing_machine", ExerciseKind::Cardio, 600.0, 30.0),
        exercise("stationary_bike", ExerciseKind::Cardio, 300.0, 30.0),
        exercise("circuit_training", ExerciseKind::Cardio, 450.0, 30.0),
        exercise("jump_rope", ExerciseKind::Cardio, 700.0, 15.0),
        exercise("kettlebell_swings", ExerciseKind::Cardio, 500.0, 20.0),
        exercise("bench_press", ExerciseKind::Strength, 0.0, 30.0),
        exercise("squats", ExerciseKind::Strength, 0.0, 30.0),
        exercise("deadlifts", ExerciseKind::Strength, 0.0, 30.0),
        exercise("pull_ups", ExerciseKind::Strength, 0.0, 20.0),
        exercise("shoulder_press", ExerciseKind::Strength, 0.0, 30.0),
        exercise("bent_over_rows", ExerciseKind::Strength, 0.0, 30.0),
        exercise("leg_press", ExerciseKind::Strength, 0.0, 30.0),
    ];
}

/// Training goal, selects the objective and the category mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Goal {
    WeightLoss,
    MuscleGain,
}

/// Physical limitations that exclude exercises from the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Limitation {
    Knee,
    Back,
    Shoulder,
}

impl Limitation {
    /// Exercises ruled out by this limitation
    pub fn affected(self) -> &'static [&'static str] {
        match self {
            Limitation::Knee => &["treadmill", "jump_rope", "squats"],
            Limitation::Back => &["deadlifts", "bent_over_rows"],
            Limitation::Shoulder => &["shoulder_press", "pull_ups"],
        }
    }
}

/// Command-line arguments for the workout planning command.
#[derive(Parser, Debug, Clone)]
pub struct WorkoutArgs {
    /// Training goal
    #[clap(long, value_enum, default_value_t = Goal::WeightLoss)]
    pub goal: Goal,

    /// Available minutes per week
    #[clap(short, long, default_value_t = 300.0)]
    pub time: f64,

    /// Physical limitation (repeatable)
    #[clap(long, value_enum)]
    pub limitation: Vec<Limitation>,

    /// Minimum number of distinct exercises in the plan
    #[clap(long, default_value_t = 5)]
    pub variety: usize,

    /// Report file (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// Output CSV file
    #[clap(long)]
    pub csv: Option<PathBuf>,
}

fn included_name(exercise: &Exercise) -> String {
    format!("{}_included", exercise.name)
}

fn is_excluded(exercise: &Exercise, limitations: &[Limitation]) -> bool {
    limitations
        .iter()
        .any(|l| l.affected().contains(&exercise.name))
}

/// Build the weekly plan problem.
pub fn workout_problem(args: &WorkoutArgs) -> Result<Problem> {
    let mut objective = LinearExpr::new();
    for e in CATALOG.iter() {
        let coeff = match args.goal {
            Goal::WeightLoss => e.calories,
            Goal::MuscleGain if e.kind == ExerciseKind::Strength => e.minutes,
            Goal::MuscleGain => continue,
        };
        objective.add_term(e.name, coeff);
    }

    let mut problem = Problem::new(Objective::maximize(objective));

    for e in CATALOG.iter() {
        let excluded = is_excluded(e, &args.limitation);
        // Sessions are capped by the time budget alone; the linking row
        // below ties them to the inclusion flag.
        let max_sessions = (args.time / e.minutes).floor();
        let mut sessions = Variable::integer(e.name, 0.0, max_sessions);
        let mut included = Variable::boolean(included_name(e));
        if excluded {
            sessions = sessions.excluded();
            included = included.excluded();
        }
        problem.add_variable(sessions)?;
        problem.add_variable(included)?;
    }

    let mut time_budget = LinearExpr::new();
    for e in CATALOG.iter() {
        time_budget.add_term(e.name, e.minutes);
    }
    problem.add_constraint(Constraint::named(
        "time_budget",
        time_budget,
        Relation::LessEqual,
        args.time,
    ));

    // included == 0 forces zero sessions; included == 1 demands at least one
    for e in CATALOG.iter() {
        let max_sessions = (args.time / e.minutes).floor();
        problem.add_constraint(Constraint::named(
            format!("{}_link", e.name),
            LinearExpr::new()
                .term(e.name, 1.0)
                .term(included_name(e), -max_sessions),
            Relation::LessEqual,
            0.0,
        ));
        problem.add_constraint(Constraint::named(
            format!("{}_active", e.name),
            LinearExpr::new()
                .term(e.name, 1.0)
                .term(included_name(e), -1.0),
            Relation::GreaterEqual,
            0.0,
        ));
    }

    let variety = CATALOG
        .iter()
        .fold(LinearExpr::new(), |expr, e| expr.term(included_name(e), 1.0));
    problem.add_constraint(Constraint::named(
        "variety",
        variety,
        Relation::GreaterEqual,
        args.variety as f64,
    ));

    let sessions_of = |kind: ExerciseKind| {
        CATALOG
            .iter()
            .filter(|e| e.kind == kind)
            .fold(LinearExpr::new(), |expr, e| expr.term(e.name, 1.0))
    };

    match args.goal {
        Goal::WeightLoss => {
            problem.add_constraint(Constraint::named(
                "cardio_min",
                sessions_of(ExerciseKind::Cardio),
                Relation::GreaterEqual,
                1.0,
            ));
            problem.add_constraint(Constraint::named(
                "strength_max",
                sessions_of(ExerciseKind::Strength),
                Relation::LessEqual,
                1.0,
            ));
        }
        Goal::MuscleGain => {
            problem.add_constraint(Constraint::named(
                "strength_min",
                sessions_of(ExerciseKind::Strength),
                Relation::GreaterEqual,
                2.0,
            ));
            problem.add_constraint(Constraint::named(
                "cardio_min",
                sessions_of(ExerciseKind::Cardio),
                Relation::GreaterEqual,
                1.0,
            ));
        }
    }

    // Balance caps keep either category from swallowing the whole week
    problem.add_constraint(Constraint::named(
        "cardio_cap",
        sessions_of(ExerciseKind::Cardio),
        Relation::LessEqual,
        5.0,
    ));
    problem.add_constraint(Constraint::named(
        "strength_cap",
        sessions_of(ExerciseKind::Strength),
        Relation::LessEqual,
        4.0,
    ));

    Ok(problem)
}

/// Entry point for the `workout` subcommand.
pub fn workout_main(args: WorkoutArgs) -> Result<()> {
    let mut writer: Box<dyn Write> = match &args.report {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    let problem = workout_problem(&args)?;
    let solution = optimizer::solve(&problem)?;

    match solution.status() {
        SolveStatus::Optimal => {}
        SolveStatus::Infeasible => return Err(AppError::Infeasible.into()),
        SolveStatus::Unbounded => return Err(AppError::Unbounded.into()),
        SolveStatus::Error => bail!("solver failed to classify the planning problem"),
    }

    if let Some(path) = &args.csv {
        let mut csv_file = std::io::BufWriter::new(fs::File::create(path)?);
        report::write_csv(&solution, &mut csv_file)?;
    }

    let sessions = |e: &Exercise| solution.value(&Symbol::from(e.name)).unwrap_or(0.0);

    let mut table = Table::new();
    table.set_titles(row!["Exercise", "Kind", "Sessions", "Minutes", "Calories"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    // Busiest exercises first, catalog order as tie-break
    for e in CATALOG
        .iter()
        .sorted_by_key(|e| OrderedFloat(-sessions(e)))
    {
        let n = sessions(e);
        let kind = match e.kind {
            ExerciseKind::Cardio => "cardio",
            ExerciseKind::Strength => "strength",
        };
        table.add_row(row![
            e.name,
            kind,
            format!("{:.0}", n),
            format!("{:.0}", n * e.minutes),
            format!("{:.0}", n * e.calories),
        ]);
    }

    let total_minutes: f64 = CATALOG.iter().map(|e| sessions(e) * e.minutes).sum();
    let total_calories: f64 = CATALOG.iter().map(|e| sessions(e) * e.calories).sum();

    writeln!(writer, "Weekly workout plan ({:?})", args.goal)?;
    table.print(&mut writer)?;
    writeln!(writer, "Total minutes: {:.0} of {:.0}", total_minutes, args.time)?;
    writeln!(writer, "Total calories: {:.0}", total_calories)?;

    Ok(())
}
