use std::fmt::Write as _;

use crate::config::Config;
use crate::data::roster::{load_roster_with_report, Roster, DISPLAY_COLUMNS};
use crate::scenario::{
    clamp_headcount, cost_curve, evaluate, format_usd, selected_csv_string, SelectionDirection,
};
use crate::server;

const USAGE: &str = "usage: headcount <serve|scenario|export|curve|roster> [--roster <path>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Scenario,
    Export,
    Curve,
    Roster,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("scenario") => Some(Command::Scenario),
        Some("export") => Some(Command::Export),
        Some("curve") => Some(Command::Curve),
        Some("roster") => Some(Command::Roster),
        _ => None,
    }
}

/// Positional arguments after the command, with `--roster <path>` and `--table` pulled out.
#[derive(Debug, Default)]
struct Invocation<'a> {
    positional: Vec<&'a str>,
    roster: Option<&'a str>,
    table: bool,
}

fn split_args(args: &[String]) -> Result<Invocation<'_>, String> {
    let mut invocation = Invocation::default();
    let mut rest = args.iter().skip(2).map(String::as_str);
    while let Some(arg) = rest.next() {
        match arg {
            "--table" => invocation.table = true,
            "--roster" => match rest.next() {
                Some(path) => invocation.roster = Some(path),
                None => return Err("--roster requires a path".to_string()),
            },
            other => match other.strip_prefix("--roster=") {
                Some(path) => invocation.roster = Some(path),
                None => invocation.positional.push(other),
            },
        }
    }
    Ok(invocation)
}

pub fn run_with_args(args: &[String]) -> i32 {
    run_with_config(args, Config::from_env())
}

pub fn run_with_config(args: &[String], config: Config) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let invocation = match split_args(args) {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("{USAGE}");
            return 2;
        }
    };
    let config = match invocation.roster {
        Some(path) => config.with_roster_path(path),
        None => config,
    };

    match command {
        Command::Serve => handle_serve(config),
        Command::Scenario => handle_scenario(&invocation, &config),
        Command::Export => handle_export(&invocation, &config),
        Command::Curve => handle_curve(&invocation, &config),
        Command::Roster => handle_roster(&config),
    }
}

fn handle_serve(config: Config) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_scenario(invocation: &Invocation<'_>, config: &Config) -> i32 {
    let Some(direction) = parse_direction_arg(invocation.positional.get(1).copied()) else {
        return 2;
    };
    let Some(roster) = load_or_report(config) else {
        return 1;
    };
    let headcount = parse_headcount_arg(
        invocation.positional.first().copied(),
        config.default_headcount,
        roster.len(),
    );
    let result = evaluate(&roster, headcount, direction);

    if invocation.table {
        println!("headcount\ttotal_compensation\taverage_compensation\tpriority");
        println!(
            "{}\t{}\t{}\t{}",
            result.headcount_label(),
            format_usd(result.total_compensation),
            format_usd(i128::from(result.average_compensation)),
            result.direction
        );
        println!();
        println!("{}", DISPLAY_COLUMNS.join("\t"));
        for record in &result.selected {
            println!("{}", table_row(&record.display_fields()));
        }
        return 0;
    }

    match serde_json::to_string_pretty(&result) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize scenario result: {err}");
            1
        }
    }
}

fn handle_export(invocation: &Invocation<'_>, config: &Config) -> i32 {
    let Some(direction) = parse_direction_arg(invocation.positional.get(1).copied()) else {
        return 2;
    };
    let Some(roster) = load_or_report(config) else {
        return 1;
    };
    let headcount = parse_headcount_arg(
        invocation.positional.first().copied(),
        config.default_headcount,
        roster.len(),
    );
    let result = evaluate(&roster, headcount, direction);

    match selected_csv_string(&result.selected) {
        Ok(csv) => {
            print!("{csv}");
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_curve(invocation: &Invocation<'_>, config: &Config) -> i32 {
    let Some(direction) = parse_direction_arg(invocation.positional.first().copied()) else {
        return 2;
    };
    let Some(roster) = load_or_report(config) else {
        return 1;
    };

    let mut out = String::from("headcount\ttotal_compensation\taverage_compensation\n");
    for point in cost_curve(&roster, direction) {
        let _ = writeln!(
            &mut out,
            "{}\t{}\t{}",
            point.headcount, point.total_compensation, point.average_compensation
        );
    }
    print!("{out}");
    0
}

fn handle_roster(config: &Config) -> i32 {
    match load_roster_with_report(&config.roster_path) {
        Ok((_, report)) => {
            let payload = serde_json::json!({
                "source": config.roster_path.display().to_string(),
                "report": report,
            });
            match serde_json::to_string_pretty(&payload) {
                Ok(payload) => {
                    println!("{payload}");
                    0
                }
                Err(err) => {
                    eprintln!("failed to serialize load report: {err}");
                    1
                }
            }
        }
        Err(err) => {
            eprintln!("Could not load roster: {err}");
            1
        }
    }
}

/// Tab-separated row; tabs and line breaks inside a cell become spaces.
fn table_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| field.replace(['\t', '\r', '\n'], " "))
        .collect::<Vec<_>>()
        .join("\t")
}

fn load_or_report(config: &Config) -> Option<Roster> {
    match load_roster_with_report(&config.roster_path) {
        Ok((roster, _)) => Some(roster),
        Err(err) => {
            eprintln!("Could not load roster: {err}");
            None
        }
    }
}

/// Missing means lowest-first; an unknown value is a usage error.
fn parse_direction_arg(raw: Option<&str>) -> Option<SelectionDirection> {
    match raw {
        None => Some(SelectionDirection::default()),
        Some(value) => match value.parse::<SelectionDirection>() {
            Ok(direction) => Some(direction),
            Err(err) => {
                eprintln!("{err}");
                None
            }
        },
    }
}

fn parse_headcount_arg(raw: Option<&str>, default: usize, total: usize) -> usize {
    let fallback = default.min(total);
    match raw {
        None => fallback,
        Some(value) => value
            .parse::<i64>()
            .map(|requested| clamp_headcount(requested, total))
            .unwrap_or_else(|_| {
                eprintln!("invalid headcount '{value}', defaulting to {fallback}");
                fallback
            }),
    }
}
