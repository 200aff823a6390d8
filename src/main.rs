use allot::{CLIArguments, energy_main, workout_main};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    match args {
        CLIArguments::Energy(args) => energy_main(args),
        CLIArguments::Workout(args) => workout_main(args),
    }
}
