use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use srcmut::commands::mutate::{self, MutateOptions};
use srcmut::commands::{highlight, score, validate};
use srcmut::errors::{Error, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const PROGRAM_NAME: &str = "srcmut";

#[derive(Parser)]
#[command(name = "srcmut")]
#[command(about = "Seeded random source-code mutation driven by a TSV spec", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a random selection of mutations from the TSV spec to a source file
    Mutate {
        /// Source code file to apply mutations to. Defaults to stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Mutations TSV file. Defaults to stdin
        #[arg(short, long)]
        mutations: Option<PathBuf>,

        /// Write mutated source code to this file. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pass the PRNG seed as 64 hex digits. Defaults to generating one
        #[arg(short, long, conflicts_with = "read_seed")]
        seed: Option<String>,

        /// Read the PRNG seed from the first line of this file
        #[arg(short, long)]
        read_seed: Option<PathBuf>,

        /// Write the resolved PRNG seed out to this file
        #[arg(short, long)]
        write_seed: Option<PathBuf>,

        /// Exact number of mutations to perform. Defaults to a random count
        #[arg(short, long, conflicts_with_all = ["min_count", "max_count"])]
        count: Option<u32>,

        /// Minimum number of mutations to perform. Defaults to 1
        #[arg(long)]
        min_count: Option<u32>,

        /// Maximum number of mutations to perform. Defaults to the number available
        #[arg(long)]
        max_count: Option<u32>,

        /// Overwrite an existing output file
        #[arg(short = 'F', long)]
        force: bool,

        /// Show a unified diff of the mutation on stderr
        #[arg(long)]
        diff: bool,

        /// Print selection status messages to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Annotate a source file with mutation match locations
    Highlight {
        /// Source code file. Defaults to stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Mutations TSV file
        #[arg(short, long)]
        mutations: Option<PathBuf>,
    },

    /// Score a mutated source against its spec
    Score {
        /// Source code file. Defaults to stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Mutations TSV file
        #[arg(short, long)]
        mutations: Option<PathBuf>,
    },

    /// Parse and validate a mutations TSV file
    Validate {
        /// Mutations TSV file. Defaults to stdin
        #[arg(short, long)]
        mutations: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version keep clap's exit status; usage mistakes
            // exit 1.
            use clap::error::ErrorKind;
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            let _ = err.print();
            std::process::exit(1);
        }
    };
    let status = match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            err.exit_code()
        }
    };
    std::process::exit(status);
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Mutate {
            input,
            mutations,
            output,
            seed,
            read_seed,
            write_seed,
            count,
            min_count,
            max_count,
            force,
            diff,
            verbose,
        } => {
            let opts = MutateOptions {
                input,
                mutations,
                output,
                seed,
                read_seed,
                write_seed,
                count,
                min_count,
                max_count,
                force,
                verbose,
            };
            let outcome = mutate::run(&opts)?;

            if diff && outcome.source != outcome.output {
                display_diff(&outcome.source, &outcome.output);
            }
            let warnings = outcome.warnings.render();
            if !warnings.is_empty() {
                eprint!("{warnings}");
            }
            Ok(())
        }
        Commands::Highlight { input, mutations } => {
            highlight::run(input.as_deref(), mutations.as_deref())
        }
        Commands::Score { input, mutations } => score::run(input.as_deref(), mutations.as_deref()),
        Commands::Validate { mutations } => validate::run(mutations.as_deref()),
    }
}

/// Unified diff of the mutation, on stderr so it never mixes with the
/// mutated source going to stdout.
fn display_diff(original: &str, mutated: &str) {
    eprintln!("{}", "--- original".dimmed());
    eprintln!("{}", "+++ mutated".dimmed());

    let diff = TextDiff::from_lines(original, mutated);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        eprint!("{sign}");
    }
}

fn report_error(err: &Error) {
    let heading = match err {
        Error::Spec(_) => "Error parsing TSV file",
        Error::InvalidSeed(_) => "Error processing seed",
        Error::InvalidArgument(_) => "Error processing arguments",
        Error::Io(_) => "I/O error",
        Error::Internal(_) => "Internal error",
    };
    eprintln!("{PROGRAM_NAME}: {}", heading.red());
    eprintln!("{err}");
    eprintln!("Try '{PROGRAM_NAME} --help' to see available options and information.");
}
