//! The mutate pipeline: parse the spec, select a reproducible subset,
//! apply it to the source, and deliver the output and resolved seed.

use crate::errors::{Error, Result};
use crate::io;
use crate::replace::Replacer;
use crate::rng::Seed;
use crate::selector::{select_mutations, Selection, SelectorConfig};
use crate::spec::parse_spec;
use crate::warnings::Warnings;
use std::path::PathBuf;
use tracing::info;

/// Options for one mutate run, resolved from the CLI.
#[derive(Debug, Clone, Default)]
pub struct MutateOptions {
    pub input: Option<PathBuf>,
    pub mutations: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub seed: Option<String>,
    pub read_seed: Option<PathBuf>,
    pub write_seed: Option<PathBuf>,
    pub count: Option<u32>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    pub force: bool,
    pub verbose: bool,
}

/// Everything a caller needs after a run: the original and mutated texts
/// (for diffing), the seed that drove selection, and collected warnings.
#[derive(Debug)]
pub struct MutateOutcome {
    pub source: String,
    pub output: String,
    pub seed: Seed,
    pub applied: usize,
    pub warnings: Warnings,
}

/// Pure core of the mutate command: a function of (source, spec, config).
/// With a fixed seed the result is byte-identical across runs.
pub fn mutate_texts(
    source: &str,
    spec: &str,
    config: &SelectorConfig,
) -> Result<(String, Selection, Warnings)> {
    let mut rows = parse_spec(spec)?;
    let mut warnings = Warnings::new();
    let selection = select_mutations(&mut rows, config, &mut warnings)?;
    let output = Replacer::new(&mut warnings).apply_all(source, &selection.mutations)?;
    Ok((output, selection, warnings))
}

/// Full mutate command: validates options, performs I/O around
/// [`mutate_texts`], and writes the output and (optionally) the seed.
pub fn run(opts: &MutateOptions) -> Result<MutateOutcome> {
    validate_options(opts)?;

    let seed = match (&opts.seed, &opts.read_seed) {
        (Some(hex), _) => Some(Seed::from_hex(hex)?),
        (None, Some(path)) => Some(io::read_seed_file(path)?),
        (None, None) => None,
    };

    let inputs = io::read_inputs(opts.input.as_deref(), opts.mutations.as_deref())?;

    let config = SelectorConfig {
        count: opts.count,
        min_count: opts.min_count,
        max_count: opts.max_count,
        seed,
        verbose: opts.verbose,
    };
    let (output, selection, warnings) = mutate_texts(&inputs.source, &inputs.spec, &config)?;

    io::write_output(opts.output.as_deref(), &output)?;
    if let Some(seed_path) = &opts.write_seed {
        io::write_seed_file(seed_path, selection.seed)?;
    }

    info!(
        applied = selection.mutations.len(),
        seed = %selection.seed.to_hex(),
        "mutate run finished"
    );

    Ok(MutateOutcome {
        source: inputs.source,
        output,
        seed: selection.seed,
        applied: selection.mutations.len(),
        warnings,
    })
}

fn validate_options(opts: &MutateOptions) -> Result<()> {
    if opts.seed.is_some() && opts.read_seed.is_some() {
        return Err(Error::InvalidArgument(
            "options --seed and --read-seed are mutually exclusive. Please choose one".into(),
        ));
    }
    if opts.count.is_some() && (opts.min_count.is_some() || opts.max_count.is_some()) {
        return Err(Error::InvalidArgument(
            "option groups --count and --min-count/--max-count are mutually exclusive. \
             Please choose one group"
                .into(),
        ));
    }
    match &opts.output {
        Some(path) => io::check_output_destination(path, opts.force)?,
        None => {
            if opts.force {
                return Err(Error::InvalidArgument(
                    "option --force invalid when no output file is specified.".into(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_seed_config() -> SelectorConfig {
        SelectorConfig {
            seed: Some(Seed::from_hex(&"00".repeat(32)).unwrap()),
            count: Some(1),
            ..SelectorConfig::default()
        }
    }

    #[test]
    fn single_row_spec_mutates_the_source() {
        let (output, selection, warnings) = mutate_texts(
            "  myString = hello;\n",
            "myString = hello;\tmyString = world;\n",
            &zero_seed_config(),
        )
        .unwrap();
        assert_eq!(output, "  myString = world;\n");
        assert_eq!(selection.mutations.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn determinism_across_runs() {
        let source = "  a();\n  b();\n  c();\n";
        let spec = "a();\tx();\ty();\nb();\tz();\nc();\tw();\tv();\tu();\n";
        let config = SelectorConfig {
            seed: Some(Seed::from_hex(&"1f".repeat(32)).unwrap()),
            ..SelectorConfig::default()
        };
        let (first, ..) = mutate_texts(source, spec, &config).unwrap();
        let (second, ..) = mutate_texts(source, spec, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mutually_exclusive_seed_options_rejected() {
        let opts = MutateOptions {
            seed: Some("00".repeat(32)),
            read_seed: Some(PathBuf::from("seed.txt")),
            ..MutateOptions::default()
        };
        assert!(matches!(
            validate_options(&opts),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn mutually_exclusive_count_options_rejected() {
        let opts = MutateOptions {
            count: Some(3),
            min_count: Some(1),
            ..MutateOptions::default()
        };
        assert!(matches!(
            validate_options(&opts),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn force_without_output_rejected() {
        let opts = MutateOptions {
            force: true,
            ..MutateOptions::default()
        };
        assert!(matches!(
            validate_options(&opts),
            Err(Error::InvalidArgument(_))
        ));
    }
}
