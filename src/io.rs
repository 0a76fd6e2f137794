//! Input and output plumbing for the CLI: whole-file reads, the shared
//! stdin protocol, seed files, and the force-overwrite guard.
//!
//! When neither `--input` nor `--mutations` names a file, both come from
//! stdin: the first line is taken as a delimiter, the source runs until
//! the next occurrence of that exact line, and the remainder is the spec.

use crate::errors::{Error, Result};
use crate::rng::{Seed, SEED_HEX_DIGITS};
use std::fs;
use std::io::Read;
use std::path::Path;

/// The resolved pair of input texts for a mutate run.
#[derive(Debug, Clone)]
pub struct InputTexts {
    pub source: String,
    pub spec: String,
}

/// Loads source and spec from their respective files, falling back to the
/// shared-stdin protocol when both paths are absent.
pub fn read_inputs(source_path: Option<&Path>, spec_path: Option<&Path>) -> Result<InputTexts> {
    match (source_path, spec_path) {
        (None, None) => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            split_shared_stdin(&raw)
        }
        _ => {
            let source = match source_path {
                Some(path) => read_file(path, "source code")?,
                None => read_stdin()?,
            };
            let spec = match spec_path {
                Some(path) => read_file(path, "TSV mutations")?,
                None => read_stdin()?,
            };
            Ok(InputTexts { source, spec })
        }
    }
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("reading {what} file {}: {e}", path.display()),
        ))
    })
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Splits a combined stdin stream on its first-line delimiter.
pub fn split_shared_stdin(raw: &str) -> Result<InputTexts> {
    let mut lines = crate::text::split_lines(raw).into_iter();
    let delimiter = lines.next().unwrap_or_default();
    let delimiter_trimmed = delimiter.strip_suffix('\n').unwrap_or(&delimiter);

    let mut source = String::new();
    let mut found_second = false;
    let mut spec = String::new();
    for line in lines.by_ref() {
        if line.strip_suffix('\n').unwrap_or(&line) == delimiter_trimmed {
            found_second = true;
            break;
        }
        source.push_str(&line);
    }
    if !found_second {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "encountered EOF in stdin before the second delimiter line \
             separating the source code from the mutations",
        )));
    }
    for line in lines {
        if line.strip_suffix('\n').unwrap_or(&line) == delimiter_trimmed {
            break;
        }
        spec.push_str(&line);
    }
    Ok(InputTexts { source, spec })
}

/// Reads a seed from the first line of `path`: exactly 64 hex digits,
/// case-insensitive, trailing newline tolerated.
pub fn read_seed_file(path: &Path) -> Result<Seed> {
    let contents = read_file(path, "seed")?;
    let first_line = contents.lines().next().unwrap_or("");
    if first_line.len() != SEED_HEX_DIGITS {
        return Err(Error::InvalidSeed(format!(
            "expected {SEED_HEX_DIGITS} hexadecimal digits in {}, got {}",
            path.display(),
            first_line.len()
        )));
    }
    Seed::from_hex(first_line)
}

/// Writes the resolved seed to `path`, uppercase with a trailing newline.
pub fn write_seed_file(path: &Path, seed: Seed) -> Result<()> {
    fs::write(path, format!("{}\n", seed.to_hex()))?;
    Ok(())
}

/// Refuses to clobber an existing output file unless `force` is set.
pub fn check_output_destination(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!(
                "output file '{}' already exists. Use '-F' to force overwrite.",
                path.display()
            ),
        )));
    }
    Ok(())
}

/// Writes the mutated output to `path`, or to stdout when absent.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text)?;
            Ok(())
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_stdin_splits_on_delimiter() {
        let raw = "===\nsource line 1\nsource line 2\n===\npat\trepl\n";
        let inputs = split_shared_stdin(raw).unwrap();
        assert_eq!(inputs.source, "source line 1\nsource line 2\n");
        assert_eq!(inputs.spec, "pat\trepl\n");
    }

    #[test]
    fn shared_stdin_requires_second_delimiter() {
        let raw = "===\nsource only, no more delimiters\n";
        assert!(matches!(split_shared_stdin(raw), Err(Error::Io(_))));
    }

    #[test]
    fn shared_stdin_stops_spec_at_third_delimiter() {
        let raw = "===\nsrc\n===\npat\trepl\n===\nignored\n";
        let inputs = split_shared_stdin(raw).unwrap();
        assert_eq!(inputs.spec, "pat\trepl\n");
    }

    #[test]
    fn seed_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.txt");
        let seed = Seed::from_hex(&"ab".repeat(32)).unwrap();
        write_seed_file(&path, seed).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{}\n", "AB".repeat(32)));
        assert_eq!(read_seed_file(&path).unwrap(), seed);
    }

    #[test]
    fn seed_file_with_wrong_length_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.txt");
        fs::write(&path, "abc123\n").unwrap();
        assert!(matches!(read_seed_file(&path), Err(Error::InvalidSeed(_))));
    }

    #[test]
    fn existing_output_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.c");
        fs::write(&path, "already here").unwrap();
        assert!(matches!(
            check_output_destination(&path, false),
            Err(Error::Io(_))
        ));
        assert!(check_output_destination(&path, true).is_ok());
        let fresh = dir.path().join("fresh.c");
        assert!(check_output_destination(&fresh, false).is_ok());
    }
}
