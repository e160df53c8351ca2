//! Generate: prints random lines from a grammar file.
//!
//! Usage: generate <grammar.ron> [--seed <n>] [--count <n>] [--rule <name>]

use agreement_grammar::core::pipeline::Generator;
use clap::Parser;
use rand::Rng;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print random lines from a grammar file")]
struct Args {
    /// Grammar file in RON format
    grammar: PathBuf,
    /// Seed for reproducible output; drawn from the OS when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Number of lines to print
    #[arg(long, default_value_t = 10)]
    count: usize,
    /// Generate from this rule instead of the grammar's entry
    #[arg(long)]
    rule: Option<String>,
    /// Attempts per line before giving up
    #[arg(long, default_value_t = 1)]
    max_attempts: u32,
    /// Log loading and generation details to stderr
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

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    if args.seed.is_none() {
        eprintln!("seed: {}", seed);
    }

    let mut builder = Generator::builder()
        .seed(seed)
        .grammar_file(&args.grammar)
        .max_attempts(args.max_attempts);
    if let Some(ref rule) = args.rule {
        builder = builder.entry(rule);
    }

    let mut generator = match builder.build() {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    for _ in 0..args.count {
        match generator.generate() {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    }
}
