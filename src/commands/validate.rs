//! Standalone spec validation: run the parser, report what it found.

use crate::errors::Result;
use crate::spec::parse_spec;
use std::path::Path;

/// Summary of a validated spec.
#[derive(Debug, PartialEq, Eq)]
pub struct SpecSummary {
    pub rows: usize,
    pub leaders: usize,
    pub nested: usize,
    pub regex_rows: usize,
    pub negated_rows: usize,
}

/// Parses the spec text and summarises its shape. Any parse error
/// propagates unchanged, so this doubles as a syntax check.
pub fn summarize_spec(spec: &str) -> Result<SpecSummary> {
    let rows = parse_spec(spec)?;
    Ok(SpecSummary {
        rows: rows.len(),
        leaders: rows.iter().filter(|r| r.flags.depth == 1).count(),
        nested: rows.iter().filter(|r| r.flags.depth > 1).count(),
        regex_rows: rows.iter().filter(|r| r.flags.is_regex).count(),
        negated_rows: rows.iter().filter(|r| r.flags.must_pass).count(),
    })
}

/// CLI entry: validate a mutations file (or stdin) and print the summary.
pub fn run(mutations: Option<&Path>) -> Result<()> {
    let spec = match mutations {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let summary = summarize_spec(&spec)?;
    println!(
        "OK: {} rows ({} group leaders, {} nested, {} regex, {} negated)",
        summary.rows, summary.leaders, summary.nested, summary.regex_rows, summary.negated_rows
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_row_kinds() {
        let spec = "lead\tl1\n^child\tc\n@synced\ts\n/re.*gex/\tr\n!neg\tn\n";
        let summary = summarize_spec(spec).unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.leaders, 1);
        assert_eq!(summary.nested, 2);
        assert_eq!(summary.regex_rows, 1);
        assert_eq!(summary.negated_rows, 1);
    }

    #[test]
    fn invalid_spec_propagates_error() {
        assert!(summarize_spec("").is_err());
        assert!(summarize_spec("lonely\n").is_err());
    }
}
