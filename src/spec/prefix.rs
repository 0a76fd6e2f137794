//! Operator-prefix (sigil) parsing and group-leader tagging.
//!
//! The sigil language at the head of a pattern cell:
//!
//! * `^` (repeatable) — nested child; depth 2 for one caret, +1 each extra
//! * `@` — index-synced nested child (depth per the same rule)
//! * `+` — insert the replacement on a new line after the match
//! * `?` — optional; skipped during group expansion unless chosen directly
//! * `!` — negated-test row
//! * `/` — regex pattern; must come last in the prefix
//!
//! `+`, `?` and `!` may each appear at most once, in any order, after any
//! nesting sigils. A pattern starting with none of `^ @ / + !` is literal.

use crate::errors::SpecError;
use crate::spec::PossibleMutation;

const SIGIL_START: [char; 5] = ['^', '@', '/', '+', '!'];
const NEST_SIGILS: [char; 2] = ['^', '@'];

fn starts_with_any(s: &str, set: &[char]) -> bool {
    s.chars().next().is_some_and(|c| set.contains(&c))
}

/// Walks the parsed rows, assigning depth and modifier flags from each
/// pattern's sigil prefix and promoting rows followed by a nested child to
/// group leaders (`depth = 1`).
pub fn categorize(rows: &mut [PossibleMutation]) -> Result<(), SpecError> {
    for i in 0..rows.len() {
        let next_nested = rows
            .get(i + 1)
            .is_some_and(|n| starts_with_any(&n.pattern, &NEST_SIGILS));

        // Plain row followed by a plain row: nothing to do.
        if !starts_with_any(&rows[i].pattern, &SIGIL_START) && !next_nested {
            continue;
        }

        // Leader tagging: a row whose first character is not a nesting
        // sigil (empty patterns never promote), followed by a child
        // carrying exactly one nesting sigil.
        let promotable = rows[i]
            .pattern
            .chars()
            .next()
            .is_some_and(|c| !NEST_SIGILS.contains(&c));
        if promotable {
            if let Some(next) = rows.get(i + 1) {
                let mut it = next.pattern.chars();
                let head = it.next();
                let second = it.next();
                if head.is_some_and(|c| NEST_SIGILS.contains(&c))
                    && second.is_some_and(|c| !NEST_SIGILS.contains(&c))
                {
                    rows[i].flags.depth = 1;
                }
            }
        }

        if starts_with_any(&rows[i].pattern, &SIGIL_START) {
            let row = &mut rows[i];
            let chars: Vec<char> = row.pattern.chars().collect();
            let line = row.flags.line_number;
            match chars[0] {
                '^' => case_caret(&chars, row, line)?,
                '@' => case_synced(&chars, 0, row, line)?,
                _ => case_special_chars(&chars, 0, row, line)?,
            }
        }
    }
    Ok(())
}

fn case_caret(chars: &[char], row: &mut PossibleMutation, line: usize) -> Result<(), SpecError> {
    row.flags.depth = 2;
    let mut i = 1;
    while i < chars.len() && chars[i] == '^' {
        row.flags.depth += 1;
        i += 1;
    }
    if i >= chars.len() {
        return Err(SpecError::EmptyPattern { line });
    }
    if chars[i] == '@' {
        case_synced(chars, i, row, line)?;
    } else if SPECIAL_CHARS.contains(&chars[i]) || chars[i] == '/' {
        case_special_chars(chars, i, row, line)?;
    }
    Ok(())
}

fn case_synced(
    chars: &[char],
    at: usize,
    row: &mut PossibleMutation,
    line: usize,
) -> Result<(), SpecError> {
    // Non-leaders can never sit at depth 1.
    row.flags.depth = if row.flags.depth == 0 {
        2
    } else {
        row.flags.depth + 1
    };
    row.flags.is_index_synced = true;
    let i = at + 1;
    if i >= chars.len() {
        return Err(SpecError::EmptyPattern { line });
    }
    if SPECIAL_CHARS.contains(&chars[i]) || chars[i] == '/' {
        case_special_chars(chars, i, row, line)?;
    }
    Ok(())
}

const SPECIAL_CHARS: [char; 3] = ['+', '!', '?'];

fn case_special_chars(
    chars: &[char],
    at: usize,
    row: &mut PossibleMutation,
    line: usize,
) -> Result<(), SpecError> {
    let mut remaining: Vec<char> = SPECIAL_CHARS.to_vec();
    let mut i = at;
    while i < chars.len() {
        let Some(found) = remaining.iter().position(|&c| c == chars[i]) else {
            break;
        };
        remaining.swap_remove(found);
        match chars[i] {
            '+' => row.flags.is_new_lined = true,
            '?' => row.flags.is_optional = true,
            '!' => row.flags.must_pass = true,
            _ => unreachable!(),
        }
        i += 1;
    }
    if i < chars.len() && chars[i] == '/' {
        row.flags.is_regex = true;
        i += 1;
    }
    if i >= chars.len() {
        return Err(SpecError::EmptyPattern { line });
    }
    Ok(())
}

/// Validates that depths form a well-formed group tree: the first row may
/// not be nested, depth may grow by at most one per row, and a row deeper
/// than 2 must be strictly deeper than its predecessor.
pub fn check_nesting(rows: &[PossibleMutation]) -> Result<(), SpecError> {
    let first = rows.first().ok_or(SpecError::NoMutations)?;
    if first.flags.depth > 1 {
        return Err(SpecError::InvalidNesting {
            line: first.flags.line_number,
        });
    }
    for (idx, pair) in rows.windows(2).enumerate() {
        let (a, b) = (pair[0].flags.depth, pair[1].flags.depth);
        let big_jump = a < b && b - a > 1;
        let deep_without_parent = b > 2 && b <= a;
        if big_jump || deep_without_parent {
            // A violation in the very first pair is reported against the
            // first row; later pairs name the offending second row.
            let line = if idx == 0 {
                pair[0].flags.line_number
            } else {
                pair[1].flags.line_number
            };
            return Err(SpecError::InvalidNesting { line });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::RowFlags;

    fn row(pattern: &str, line: usize) -> PossibleMutation {
        PossibleMutation {
            pattern: pattern.to_string(),
            permutations: vec!["x".to_string()],
            flags: RowFlags {
                line_number: line,
                ..RowFlags::default()
            },
        }
    }

    fn categorized(patterns: &[&str]) -> Vec<PossibleMutation> {
        let mut rows: Vec<_> = patterns
            .iter()
            .enumerate()
            .map(|(i, p)| row(p, i + 1))
            .collect();
        categorize(&mut rows).unwrap();
        rows
    }

    #[test]
    fn plain_rows_stay_standalone() {
        let rows = categorized(&["alpha", "beta"]);
        assert_eq!(rows[0].flags.depth, 0);
        assert_eq!(rows[1].flags.depth, 0);
    }

    #[test]
    fn leader_promoted_before_nested_child() {
        let rows = categorized(&["alpha", "^child"]);
        assert_eq!(rows[0].flags.depth, 1);
        assert_eq!(rows[1].flags.depth, 2);
    }

    #[test]
    fn caret_runs_deepen() {
        let rows = categorized(&["alpha", "^child", "^^grandchild"]);
        assert_eq!(rows[2].flags.depth, 3);
    }

    #[test]
    fn caret_then_synced_adds_depth_and_flag() {
        let rows = categorized(&["alpha", "^child", "^@grand"]);
        assert_eq!(rows[2].flags.depth, 3);
        assert!(rows[2].flags.is_index_synced);
        assert!(!rows[1].flags.is_index_synced);
    }

    #[test]
    fn synced_without_caret_is_depth_two() {
        let rows = categorized(&["alpha", "@child"]);
        assert_eq!(rows[1].flags.depth, 2);
        assert!(rows[1].flags.is_index_synced);
    }

    #[test]
    fn modifier_flags_each_once_any_order() {
        let rows = categorized(&["+!pat", "?lit", "!+?pat2"]);
        assert!(rows[0].flags.is_new_lined);
        assert!(rows[0].flags.must_pass);
        assert!(!rows[0].flags.is_optional);
        // A leading '?' alone does not enter the sigil parser.
        assert!(!rows[1].flags.is_optional);
        assert!(rows[2].flags.is_new_lined && rows[2].flags.is_optional && rows[2].flags.must_pass);
    }

    #[test]
    fn regex_slash_sets_flag() {
        let rows = categorized(&["/ab.c/g"]);
        assert!(rows[0].flags.is_regex);
        assert_eq!(rows[0].flags.prefix_len(), 1);
    }

    #[test]
    fn prefix_len_counts_sigils_and_flags() {
        let rows = categorized(&["alpha", "^+child", "^^@!deep"]);
        assert_eq!(rows[0].flags.prefix_len(), 0); // leader
        assert_eq!(rows[1].flags.prefix_len(), 2); // '^' + '+'
        assert_eq!(rows[2].flags.prefix_len(), 4); // '^^@' + '!'
        assert_eq!(rows[2].flags.depth, 4);
    }

    #[test]
    fn all_sigils_no_body_is_an_error() {
        let mut rows = vec![row("lead", 1), row("^^", 2)];
        assert!(matches!(
            categorize(&mut rows),
            Err(SpecError::EmptyPattern { line: 2 })
        ));
        let mut rows = vec![row("+", 1)];
        assert!(matches!(
            categorize(&mut rows),
            Err(SpecError::EmptyPattern { line: 1 })
        ));
    }

    #[test]
    fn nesting_rejects_leading_child() {
        let mut rows = vec![row("^orphan", 1)];
        categorize(&mut rows).unwrap();
        assert!(matches!(
            check_nesting(&rows),
            Err(SpecError::InvalidNesting { line: 1 })
        ));
    }

    #[test]
    fn nesting_rejects_depth_jump() {
        let mut rows = vec![row("lead", 1), row("^^deep", 2)];
        categorize(&mut rows).unwrap();
        // leader is depth 1, '^^' is depth 3: a two-level jump. Caught on
        // the first pair, the diagnostic names the first row's line.
        assert!(matches!(
            check_nesting(&rows),
            Err(SpecError::InvalidNesting { line: 1 })
        ));
    }

    #[test]
    fn nesting_violation_after_first_pair_names_second_row() {
        let mut rows = vec![
            row("lead", 1),
            row("^child", 2),
            row("standalone", 3),
            row("^^deep", 4),
        ];
        categorize(&mut rows).unwrap();
        // The 0 -> 3 jump sits in a later window, so the offending row
        // itself is named.
        assert!(matches!(
            check_nesting(&rows),
            Err(SpecError::InvalidNesting { line: 4 })
        ));
    }

    #[test]
    fn nesting_rejects_repeated_deep_rows() {
        let mut rows = vec![
            row("lead", 1),
            row("^child", 2),
            row("^^deep", 3),
            row("^^again", 4),
        ];
        categorize(&mut rows).unwrap();
        assert!(matches!(
            check_nesting(&rows),
            Err(SpecError::InvalidNesting { line: 4 })
        ));
    }

    #[test]
    fn nesting_accepts_well_formed_group() {
        let mut rows = vec![
            row("lead", 1),
            row("^a", 2),
            row("^^b", 3),
            row("^c", 4),
            row("standalone", 5),
        ];
        categorize(&mut rows).unwrap();
        assert!(check_nesting(&rows).is_ok());
    }
}
