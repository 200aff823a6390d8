//! Table and CSV rendering of allocation solutions.
//!
//! The optimizer hands back a name-keyed [`Solution`]; this module is the
//! presentation edge: a prettytable for terminals and report files, and a
//! CSV writer for anything downstream. Rows follow the problem's registry
//! order, zero allocations included.

use std::io::Write;

use anyhow::Result;
use prettytable::{Table, format, row};

use crate::problem::Solution;

/// Build the allocation table: one row per variable. The objective footer
/// is left to the caller, which knows what the number means.
pub fn solution_table(solution: &Solution) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Variable", "Value"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    for (name, value) in solution.values() {
        table.add_row(row![name.as_ref(), format!("{:.3}", value)]);
    }

    table
}

/// Write the allocation as CSV: header, one row per variable, objective
/// footer.
pub fn write_csv(solution: &Solution, out: &mut impl Write) -> Result<()> {
    writeln!(out, "variable,value")?;
    for (name, value) in solution.values() {
        writeln!(out, "{},{:.6}", name, value)?;
    }
    if let Some(objective) = solution.objective() {
        writeln!(out, "objective,{:.6}", objective)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Solution, Symbol};

    fn sample() -> Solution {
        Solution::optimal(
            120.0,
            vec![(Symbol::from("wind"), 120.0), (Symbol::from("hydro"), 0.0)],
        )
    }

    #[test]
    fn table_lists_all_variables_in_order() {
        let solution = sample();
        let rendered = solution_table(&solution).to_string();

        let wind = rendered.find("wind").unwrap();
        let hydro = rendered.find("hydro").unwrap();
        assert!(wind < hydro, "rows must follow registry order");
    }

    #[test]
    fn csv_has_header_rows_and_objective() {
        let solution = sample();
        let mut buffer = Vec::new();
        write_csv(&solution, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "variable,value");
        assert_eq!(lines[1], "wind,120.000000");
        assert_eq!(lines[2], "hydro,0.000000");
        assert_eq!(lines[3], "objective,120.000000");
    }
}
