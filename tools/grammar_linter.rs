//! Grammar Linter: checks tag usage in grammar files.
//!
//! Usage: grammar_linter <grammar file or directory>

use agreement_grammar::core::grammar::Grammar;
use agreement_grammar::core::lint::LintIssue;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check tag definitions and applications in grammar files")]
struct Args {
    /// A grammar file, or a directory searched recursively for .ron files
    path: PathBuf,
    /// Log loading details to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .init();

    let mut files = Vec::new();
    if args.path.is_file() {
        files.push(args.path.clone());
    } else if args.path.is_dir() {
        collect_grammar_files(&args.path, &mut files);
        files.sort();
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args.path.display());
        process::exit(1);
    }

    let mut errors = 0;
    let mut warnings = 0;

    println!("\n=== Grammar Lint Report ===\n");

    for file in &files {
        let grammar = match Grammar::load_from_ron(file) {
            Ok(grammar) => grammar,
            Err(e) => {
                println!("ERROR: {}: failed to load: {}", file.display(), e);
                errors += 1;
                continue;
            }
        };

        let issues = grammar.lint();
        println!(
            "{}: {} rules, {} issues",
            file.display(),
            grammar.rule_names().len(),
            issues.len()
        );
        for issue in &issues {
            print_issue(issue);
            if issue.is_error() {
                errors += 1;
            } else {
                warnings += 1;
            }
        }
    }

    if errors == 0 && warnings == 0 {
        println!("\nAll checks passed!");
    }

    println!("\nSummary: {} errors, {} warnings", errors, warnings);

    if errors > 0 {
        process::exit(1);
    }
}

fn print_issue(issue: &LintIssue) {
    println!("  {}", issue);
}

fn collect_grammar_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_grammar_files(&path, files);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                files.push(path);
            }
        }
    }
}
