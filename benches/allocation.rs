//! Benchmarks for allocation problem construction and solving.
//!
//! Measures the model-building path separately from the full
//! build-and-solve round trip, across a few demand points of the energy
//! scenario and both workout goals.

use clap::Parser;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use allot::energy::{EnergyArgs, energy_problem};
use allot::optimizer;
use allot::workout::{Goal, WorkoutArgs, workout_problem};

fn energy_args() -> EnergyArgs {
    EnergyArgs::parse_from(["energy"])
}

fn workout_args(goal: Goal) -> WorkoutArgs {
    let mut args = WorkoutArgs::parse_from(["workout"]);
    args.goal = goal;
    args
}

fn bench_problem_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("problem_build");

    let args = energy_args();
    group.bench_function("energy", |b| {
        b.iter(|| energy_problem(black_box(&args), black_box(250.0)).unwrap())
    });

    let args = workout_args(Goal::WeightLoss);
    group.bench_function("workout", |b| {
        b.iter(|| workout_problem(black_box(&args)).unwrap())
    });

    group.finish();
}

fn bench_energy_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("energy_solve");
    let args = energy_args();

    for demand in [100.0, 250.0, 300.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(demand),
            &demand,
            |b, &demand| {
                b.iter(|| {
                    let problem = energy_problem(&args, demand).unwrap();
                    optimizer::solve(black_box(&problem)).unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_workout_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("workout_solve");
    // MIP with linking rows, markedly slower than the pure LP
    group.sample_size(20);

    for goal in [Goal::WeightLoss, Goal::MuscleGain] {
        group.bench_with_input(
            BenchmarkId::new("goal", format!("{:?}", goal)),
            &goal,
            |b, &goal| {
                let args = workout_args(goal);
                b.iter(|| {
                    let problem = workout_problem(&args).unwrap();
                    optimizer::solve(black_box(&problem)).unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_problem_build,
    bench_energy_solve,
    bench_workout_solve
);
criterion_main!(benches);
