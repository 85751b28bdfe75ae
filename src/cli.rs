//! Command dispatch for the menuscrub binary.
//!
//! `check <dir> [--json]` runs the read-only diagnostic pass and prints a
//! violation count per rule (or the full report as JSON). `clean <in> <out>`
//! runs the repair pipeline, writes the cleaned CSVs, and prints the stage
//! trace plus before/after row counts.

use std::path::Path;

use crate::checks::run_all_checks;
use crate::clean::run_pipeline;
use crate::data::loader::{load_dataset, write_dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Check,
    Clean,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("check") => Some(Command::Check),
        Some("clean") => Some(Command::Clean),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Check) => handle_check(args),
        Some(Command::Clean) => handle_clean(args),
        None => {
            eprintln!("usage: menuscrub <check|clean> ...");
            eprintln!("  check <dir> [--json]   run integrity checks on a dataset directory");
            eprintln!("  clean <in> <out>       repair a dataset and write the cleaned tables");
            2
        }
    }
}

fn handle_check(args: &[String]) -> i32 {
    let Some(dir) = args.get(2) else {
        eprintln!("usage: menuscrub check <dir> [--json]");
        return 2;
    };
    let as_json = args.iter().any(|arg| arg == "--json");

    let dataset = match load_dataset(Path::new(dir)) {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("check failed: {err}");
            return 1;
        }
    };

    let reports = run_all_checks(&dataset);
    if as_json {
        match serde_json::to_string_pretty(&reports) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("report serialization failed: {err}");
                return 1;
            }
        }
    } else {
        for report in &reports {
            println!("{} violations for {}", report.count, report.description);
        }
    }
    0
}

fn handle_clean(args: &[String]) -> i32 {
    let (Some(input), Some(output)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: menuscrub clean <in> <out>");
        return 2;
    };

    let dataset = match load_dataset(Path::new(input)) {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("clean failed: {err}");
            return 1;
        }
    };
    let before = dataset.counts();

    let run = run_pipeline(dataset);
    for outcome in &run.outcomes {
        println!(
            "stage {}: repaired {}, dropped {}",
            outcome.stage, outcome.repaired, outcome.dropped
        );
    }

    if let Err(err) = write_dataset(Path::new(output), &run.dataset) {
        eprintln!("clean failed: {err}");
        return 1;
    }

    let after = run.dataset.counts();
    print_counts("Menu", before.menus, after.menus);
    print_counts("MenuPage", before.pages, after.pages);
    print_counts("MenuItem", before.items, after.items);
    print_counts("Dish", before.dishes, after.dishes);
    0
}

fn print_counts(table: &str, before: usize, after: usize) {
    println!("{table}: {before} rows in, {after} rows out");
}
