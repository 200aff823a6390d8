use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

// Helper to run the allot binary with the given arguments
fn run_allot(args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--");
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("failed to run allot binary")
}

fn temp_paths(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let paths = names.iter().map(|n| dir.path().join(n)).collect();
    (dir, paths)
}

mod energy_cli {
    use super::*;

    #[test]
    fn default_scenario_reports_the_known_optimum() {
        let (_dir, paths) = temp_paths(&["energy.rpt", "energy.csv"]);
        let report = &paths[0];
        let csv = &paths[1];

        let output = run_allot(&[
            "energy",
            "--report",
            report.to_str().unwrap(),
            "--csv",
            csv.to_str().unwrap(),
        ]);
        assert!(
            output.status.success(),
            "command should succeed. stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let report_text = fs::read_to_string(report).expect("report should exist");
        assert!(report_text.contains("Demand: 250.000"));
        assert!(report_text.contains("Total profit: 15300.000"));

        // unique optimum: the cheaper sources saturate first
        let csv_text = fs::read_to_string(csv).expect("csv should exist");
        assert!(csv_text.starts_with("variable,value"));
        assert!(csv_text.contains("wind,120.000000"));
        assert!(csv_text.contains("hydro,80.000000"));
        assert!(csv_text.contains("objective,15300.000000"));
    }

    #[test]
    fn impossible_demand_fails_with_infeasible() {
        let output = run_allot(&["energy", "--demand", "350"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Infeasible"), "stderr: {}", stderr);
    }

    #[test]
    fn excluded_source_gets_no_allocation() {
        let (_dir, paths) = temp_paths(&["energy.csv"]);
        let csv = &paths[0];

        let output = run_allot(&[
            "energy",
            "--demand",
            "150",
            "--exclude",
            "solar",
            "--csv",
            csv.to_str().unwrap(),
        ]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let csv_text = fs::read_to_string(csv).expect("csv should exist");
        assert!(csv_text.contains("solar,0.000000"));
    }

    #[test]
    fn demand_sweep_writes_one_row_per_step() {
        let (_dir, paths) = temp_paths(&["sweep.rpt"]);
        let report = &paths[0];

        let output = run_allot(&[
            "energy",
            "--sweep",
            "100",
            "--report",
            report.to_str().unwrap(),
        ]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let report_text = fs::read_to_string(report).expect("report should exist");
        assert!(report_text.contains("Demand"));
        // total capacity 300 swept in steps of 100
        for demand in ["0.0", "100.0", "200.0", "300.0"] {
            assert!(report_text.contains(demand), "missing row for {}", demand);
        }
    }
}

mod workout_cli {
    use super::*;

    #[test]
    fn default_plan_is_produced() {
        let (_dir, paths) = temp_paths(&["plan.rpt", "plan.csv"]);
        let report = &paths[0];
        let csv = &paths[1];

        let output = run_allot(&[
            "workout",
            "--report",
            report.to_str().unwrap(),
            "--csv",
            csv.to_str().unwrap(),
        ]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let report_text = fs::read_to_string(report).expect("report should exist");
        assert!(report_text.contains("Weekly workout plan"));
        assert!(report_text.contains("Total minutes:"));

        let csv_text = fs::read_to_string(csv).expect("csv should exist");
        assert!(csv_text.contains("jump_rope,"));
        assert!(csv_text.contains("objective,"));
    }

    #[test]
    fn limitations_are_accepted() {
        let (_dir, paths) = temp_paths(&["plan.csv"]);
        let csv = &paths[0];

        let output = run_allot(&[
            "workout",
            "--limitation",
            "knee",
            "--limitation",
            "back",
            "--csv",
            csv.to_str().unwrap(),
        ]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let csv_text = fs::read_to_string(csv).expect("csv should exist");
        assert!(csv_text.contains("treadmill,0.000000"));
        assert!(csv_text.contains("deadlifts,0.000000"));
    }

    #[test]
    fn impossible_time_budget_fails_with_infeasible() {
        let output = run_allot(&["workout", "--time", "30"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Infeasible"), "stderr: {}", stderr);
    }
}
