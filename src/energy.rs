//! Renewable energy allocation scenario.
//!
//! Chooses how much energy to draw from each source (solar, wind, hydro)
//! to meet a fixed demand at maximum profit. Each source has a production
//! capacity and a unit cost; every delivered unit sells at the same price,
//! so the objective maximizes `Σ (price − cost) · allocation` subject to
//! the capacities and an exact-demand balance.
//!
//! All coefficients are configuration with defaults, not constants: the
//! capacities (100/120/80), costs (50/40/30), price (100) and demand (250)
//! can all be overridden from the command line, sources can be excluded
//! outright, and `--sweep` re-solves the allocation over a whole range of
//! demands to show where the system stops being profitable or feasible.

use std::{
    fs,
    io::Write,
    path::PathBuf,
};

use anyhow::{Result, bail};
use clap::Parser;
use ordered_float::OrderedFloat;
use prettytable::{Table, format, row};
use rayon::prelude::*;

use crate::lp_solver::output_suppression::GagHandle;
use crate::problem::{
    Constraint, LinearExpr, Objective, Problem, Relation, Solution, SolveStatus, Variable,
};
use crate::{AppError, optimizer, report};

/// Energy sources available to the allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Source {
    Solar,
    Wind,
    Hydro,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Solar, Source::Wind, Source::Hydro];

    pub fn name(self) -> &'static str {
        match self {
            Source::Solar => "solar",
            Source::Wind => "wind",
            Source::Hydro => "hydro",
        }
    }
}

/// Command-line arguments for the energy allocation command.
#[derive(Parser, Debug, Clone)]
pub struct EnergyArgs {
    /// Demand that must be met exactly
    #[clap(short, long, default_value_t = 250.0)]
    pub demand: f64,

    /// Solar production capacity
    #[clap(long, default_value_t = 100.0)]
    pub solar_capacity: f64,

    /// Wind production capacity
    #[clap(long, default_value_t = 120.0)]
    pub wind_capacity: f64,

    /// Hydro production capacity
    #[clap(long, default_value_t = 80.0)]
    pub hydro_capacity: f64,

    /// Solar unit cost
    #[clap(long, default_value_t = 50.0)]
    pub solar_cost: f64,

    /// Wind unit cost
    #[clap(long, default_value_t = 40.0)]
    pub wind_cost: f64,

    /// Hydro unit cost
    #[clap(long, default_value_t = 30.0)]
    pub hydro_cost: f64,

    /// Sale price per delivered unit
    #[clap(long, default_value_t = 100.0)]
    pub price: f64,

    /// Exclude a source from the allocation (repeatable)
    #[clap(long, value_enum)]
    pub exclude: Vec<Source>,

    /// Report file (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// Output CSV file
    #[clap(long)]
    pub csv: Option<PathBuf>,

    /// Instead of a single solve, sweep demand from 0 to the total
    /// capacity in steps of this size
    #[clap(long)]
    pub sweep: Option<f64>,
}

impl EnergyArgs {
    pub fn capacity(&self, source: Source) -> f64 {
        match source {
            Source::Solar => self.solar_capacity,
            Source::Wind => self.wind_capacity,
            Source::Hydro => self.hydro_capacity,
        }
    }

    pub fn cost(&self, source: Source) -> f64 {
        match source {
            Source::Solar => self.solar_cost,
            Source::Wind => self.wind_cost,
            Source::Hydro => self.hydro_cost,
        }
    }

    fn total_capacity(&self) -> f64 {
        Source::ALL
            .iter()
            .filter(|s| !self.exclude.contains(s))
            .map(|&s| self.capacity(s))
            .sum()
    }

    /// Unit-cost expression, evaluated against a solution for reporting
    fn cost_expr(&self) -> LinearExpr {
        Source::ALL
            .iter()
            .fold(LinearExpr::new(), |expr, &s| expr.term(s.name(), self.cost(s)))
    }
}

/// Build the allocation problem for one demand value.
pub fn energy_problem(args: &EnergyArgs, demand: f64) -> Result<Problem> {
    let mut profit = LinearExpr::new();
    for &source in &Source::ALL {
        profit.add_term(source.name(), args.price - args.cost(source));
    }

    let mut problem = Problem::new(Objective::maximize(profit));
    for &source in &Source::ALL {
        let mut variable = Variable::continuous(source.name(), 0.0, args.capacity(source));
        if args.exclude.contains(&source) {
            variable = variable.excluded();
        }
        problem.add_variable(variable)?;
    }

    let balance = Source::ALL
        .iter()
        .fold(LinearExpr::new(), |expr, &s| expr.term(s.name(), 1.0));
    problem.add_constraint(Constraint::named("demand", balance, Relation::Equal, demand));

    Ok(problem)
}

/// Entry point for the `energy` subcommand.
pub fn energy_main(args: EnergyArgs) -> Result<()> {
    let mut writer: Box<dyn Write> = match &args.report {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    if let Some(step) = args.sweep {
        return sweep_main(&args, step, &mut writer);
    }

    let problem = energy_problem(&args, args.demand)?;
    let solution = optimizer::solve(&problem)?;

    match solution.status() {
        SolveStatus::Optimal => {}
        SolveStatus::Infeasible => return Err(AppError::Infeasible.into()),
        SolveStatus::Unbounded => return Err(AppError::Unbounded.into()),
        SolveStatus::Error => bail!("solver failed to classify the allocation problem"),
    }

    if let Some(path) = &args.csv {
        let mut csv_file = std::io::BufWriter::new(fs::File::create(path)?);
        report::write_csv(&solution, &mut csv_file)?;
    }

    let value_of = |name: &crate::problem::Symbol| solution.value(name).unwrap_or(0.0);
    let total_cost = args.cost_expr().eval(value_of);

    writeln!(writer, "Demand: {:.3}", args.demand)?;
    report::solution_table(&solution).print(&mut writer)?;
    writeln!(writer, "Total cost: {:.3}", total_cost)?;
    writeln!(writer, "Total profit: {:.3}", solution.objective().unwrap_or(0.0))?;

    Ok(())
}

/// Demand values covered by a sweep of the given step size.
fn sweep_points(total_capacity: f64, step: f64) -> Vec<f64> {
    let steps = (total_capacity / step).floor() as usize;
    (0..=steps).map(|i| i as f64 * step).collect()
}

fn sweep_main(args: &EnergyArgs, step: f64, writer: &mut impl Write) -> Result<()> {
    if step <= 0.0 {
        bail!("sweep step must be positive");
    }

    // Keep the stdout gag alive across the whole batch so worker threads
    // never race its creation against table printing.
    let gag = GagHandle::stdout()?;

    let mut outcomes: Vec<(f64, Solution)> = sweep_points(args.total_capacity(), step)
        .into_par_iter()
        .map(|demand| {
            let problem = energy_problem(args, demand)?;
            let solution = optimizer::solve(&problem)?;
            Ok((demand, solution))
        })
        .collect::<Result<_>>()?;
    outcomes.par_sort_unstable_by_key(|(demand, _)| OrderedFloat(*demand));
    drop(gag);

    let mut table = Table::new();
    table.set_titles(row!["Demand", "Status", "Solar", "Wind", "Hydro", "Profit"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    for (demand, solution) in &outcomes {
        match solution.status() {
            SolveStatus::Optimal => {
                let value = |name: &str| {
                    solution
                        .value(&crate::problem::Symbol::from(name))
                        .unwrap_or(0.0)
                };
                table.add_row(row![
                    format!("{:.1}", demand),
                    "optimal",
                    format!("{:.1}", value("solar")),
                    format!("{:.1}", value("wind")),
                    format!("{:.1}", value("hydro")),
                    format!("{:.1}", solution.objective().unwrap_or(0.0)),
                ]);
            }
            status => {
                table.add_row(row![format!("{:.1}", demand), status.to_string(), "-", "-", "-", "-"]);
            }
        }
    }

    table.print(writer)?;
    Ok(())
}
