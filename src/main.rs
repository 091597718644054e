//! CLI entry point. Grounded on `command/build.go`'s `buildResult`/
//! `printSummary`: evaluate every requested target, optionally keep going
//! past failures, then print an aurora-style colored OK/FAIL/TOTAL summary.

use clap::Parser;
use colored::Colorize;

use starfig::cli::{Cli, Command};
use starfig::{evaluator, label, workspace};

fn main() {
    starfig::logging::init();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Version => {
            println!("starfig {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Command::Build { targets, keep_going } => run_build(&targets, keep_going),
    };

    std::process::exit(exit_code);
}

fn run_build(raw_targets: &[String], keep_going: bool) -> i32 {
    let workspace_root = match std::env::current_dir().map_err(Into::into).and_then(|dir| workspace::find_starverse_directory(&dir)) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("{}: {err}", "error".red().bold());
            return 1;
        }
    };

    let mut build_targets = Vec::new();
    for raw in raw_targets {
        match label::parse_build_target(&workspace_root, raw) {
            Ok(targets) => build_targets.extend(targets),
            Err(err) => {
                eprintln!("{}: {err}", "error".red().bold());
                return 1;
            }
        }
    }

    let mut ok = 0usize;
    let mut failed = 0usize;
    for target in &build_targets {
        match evaluator::evaluate_build_target(target) {
            Ok(evaluated) => {
                for entry in evaluated {
                    println!("{} {} = {}", target.label().cyan(), entry.name, entry.rendered);
                }
                ok += 1;
            }
            Err(err) => {
                eprintln!("{} {}: {err}", "FAIL".red().bold(), target.label());
                failed += 1;
                if !keep_going {
                    break;
                }
            }
        }
    }

    println!(
        "{} {ok}  {} {failed}  {} {}",
        "OK".green().bold(),
        "FAIL".red().bold(),
        "TOTAL".bold(),
        ok + failed,
    );

    i32::from(failed > 0)
}
