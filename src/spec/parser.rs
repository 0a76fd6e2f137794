use crate::errors::Result;
use crate::spec::prefix::{categorize, check_nesting};
use crate::spec::rows::{assemble_rows, check_indentation, take_cell, verify_has_permutation};
use crate::spec::{PossibleMutation, RowFlags};

/// Parses the full TSV spec text into an ordered sequence of
/// [`PossibleMutation`]s with depth, flags and line numbers filled in.
/// Group numbers stay 0; the selector assigns them.
pub fn parse_spec(input: &str) -> Result<Vec<PossibleMutation>> {
    let rows = assemble_rows(input)?;

    let mut mutations = Vec::with_capacity(rows.len());
    for row in &rows {
        let chars: Vec<char> = row.text.chars().collect();
        let row_line = row.line_number;
        let mut line_number = row_line;
        let mut pos = 0usize;

        check_indentation(&chars, row_line)?;

        let pattern = take_cell(&chars, &mut pos, &mut line_number, row_line)?;

        verify_has_permutation(&chars, pos, line_number, row_line)?;

        let mut permutations = Vec::new();
        while pos < chars.len() {
            while pos < chars.len() && chars[pos] == '\t' {
                pos += 1;
            }
            let permutation = take_cell(&chars, &mut pos, &mut line_number, row_line)?;
            permutations.push(permutation);
        }

        mutations.push(PossibleMutation {
            pattern,
            permutations,
            flags: RowFlags {
                line_number: row_line,
                ..RowFlags::default()
            },
        });
    }

    categorize(&mut mutations)?;
    check_nesting(&mutations)?;
    Ok(mutations)
}
