use crate::errors::Result;
use crate::replace::regex::regex_replace;
use crate::spec::SelectedMutation;
use crate::text::{is_multiline, last_non_whitespace, split_lines};
use crate::warnings::Warnings;
use tracing::debug;

/// Applies selected mutations to a working copy of the source.
///
/// Matches are only accepted at line edges: the text before the pattern on
/// its starting line and after it on its ending line must be whitespace.
/// The whitespace in front becomes the indent that is propagated into
/// multi-line replacements and `+` (new-line) insertions.
pub struct Replacer<'w> {
    warnings: &'w mut Warnings,
}

impl<'w> Replacer<'w> {
    pub fn new(warnings: &'w mut Warnings) -> Self {
        Self { warnings }
    }

    /// Runs every mutation over `source` in the order given (the selector
    /// emits spec-line descending) and returns the mutated text.
    pub fn apply_all(&mut self, source: &str, mutations: &[SelectedMutation]) -> Result<String> {
        let mut subject = source.to_string();
        for sm in mutations {
            self.apply(&mut subject, sm)?;
        }
        Ok(subject)
    }

    fn apply(&mut self, subject: &mut String, sm: &SelectedMutation) -> Result<()> {
        if sm.flags.is_regex {
            regex_replace(self, subject, sm)
        } else {
            let matches = self.literal_replace(subject, sm);
            self.account(matches, sm);
            Ok(())
        }
    }

    /// Dispatches a literal (non-regex) mutation and returns how many
    /// times it matched.
    pub(crate) fn literal_replace(&mut self, subject: &mut String, sm: &SelectedMutation) -> usize {
        if sm.pattern.is_empty() {
            return 0;
        }
        let matches = if is_multiline(&sm.pattern) {
            multiline_replace(subject, sm)
        } else {
            single_line_replace(subject, sm)
        };
        debug!(
            line = sm.flags.line_number,
            matches, "literal replacement finished"
        );
        matches
    }

    pub(crate) fn account(&mut self, matches: usize, sm: &SelectedMutation) {
        if matches == 0 {
            self.warnings.add_no_match_line(sm.flags.line_number);
        }
        if matches > 1 {
            self.warnings.add_multiple_match_line(sm.flags.line_number);
        }
    }

    pub(crate) fn warnings(&mut self) -> &mut Warnings {
        self.warnings
    }
}

fn single_line_replace(subject: &mut String, sm: &SelectedMutation) -> usize {
    let mut matches = 0;
    let mut pos = 0;
    while let Some(rel) = subject[pos..].find(&sm.pattern) {
        let found = pos + rel;
        let begin = line_start(subject, found);
        match try_replace_at(subject, begin, found, sm.pattern.len(), sm) {
            Some(next) => {
                matches += 1;
                pos = next;
            }
            None => pos = found + 1,
        }
    }
    matches
}

fn multiline_replace(subject: &mut String, sm: &SelectedMutation) -> usize {
    let lines = split_lines(&sm.pattern);
    if lines.len() < 2 {
        // Interior '\r' without '\n' classifies as multi-line but yields a
        // single search line; exact matching handles it.
        return single_line_replace(subject, sm);
    }
    let mut matches = 0;
    let mut pos = 0;

    while let Some(rel) = subject[pos..].find(&lines[0]) {
        let found = pos + rel;
        let begin = line_start(subject, found);
        let indentation = found - begin;

        // The whole block may match literally (source indented the same
        // way the pattern is written); then the plain edge check applies.
        if subject[found..].starts_with(&sm.pattern) {
            match try_replace_at(subject, begin, found, sm.pattern.len(), sm) {
                Some(next) => {
                    matches += 1;
                    pos = next;
                }
                None => pos = found + 1,
            }
            continue;
        }

        let indent = subject[begin..found].to_string();

        // Line 0: pre-pattern region must be whitespace; the line's own
        // newline is part of the pattern line, so the trailing edge holds.
        if last_non_whitespace(&subject.as_bytes()[begin..found]).is_some() {
            pos = found + 1;
            continue;
        }
        let mut line_begin = found + lines[0].len();
        let mut end = line_begin;
        let mut add_indentation = false;

        if !line2_is_good(
            subject,
            &mut line_begin,
            &mut end,
            &lines[1],
            indentation,
            &mut add_indentation,
        ) {
            pos = found + 1;
            continue;
        }
        if !lines[2..].iter().all(|line| {
            whole_subline_matches(
                subject,
                &mut line_begin,
                &mut end,
                indentation,
                add_indentation,
                line,
            )
        }) {
            pos = found + 1;
            continue;
        }

        let length_to_remove = end - found;
        let perm = build_block_permutation(sm, &indent, add_indentation);
        matches += 1;

        if sm.flags.is_new_lined {
            let insert_at = (end + 1).min(subject.len());
            let mut insertion = perm;
            insertion.push('\n');
            subject.insert_str(insert_at, &insertion);
            pos = insert_at + insertion.len();
        } else {
            subject.replace_range(found..found + length_to_remove, &perm);
            pos = found + perm.len();
        }
    }
    matches
}

/// Byte index of the start of the line containing `at`.
fn line_start(subject: &str, at: usize) -> usize {
    let mut begin = at;
    while begin > 0 && subject.as_bytes()[begin - 1] != b'\n' {
        begin -= 1;
    }
    begin
}

/// Single-location replacement with line-edge verification. `begin` is the
/// start of the pattern's line, `pat_start` where the pattern text begins.
/// Returns the position to resume searching from, or `None` when the edge
/// check rejects this occurrence.
fn try_replace_at(
    subject: &mut String,
    begin: usize,
    pat_start: usize,
    pat_len: usize,
    sm: &SelectedMutation,
) -> Option<usize> {
    if last_non_whitespace(&subject.as_bytes()[begin..pat_start]).is_some() {
        return None;
    }
    let after = pat_start + pat_len;
    let line_end = if after > 0 && subject.as_bytes().get(after - 1) == Some(&b'\n') {
        after - 1
    } else {
        let mut e = after;
        while e < subject.len() && subject.as_bytes()[e] != b'\n' {
            e += 1;
        }
        if last_non_whitespace(&subject.as_bytes()[after..e]).is_some() {
            return None;
        }
        e
    };

    let indent = subject[begin..pat_start].to_string();
    let perm = build_line_permutation(sm, &indent);

    if sm.flags.is_new_lined {
        let mut insertion = perm;
        insertion.push('\n');
        let mut line_end = line_end;
        if line_end >= subject.len() {
            subject.push('\n');
            line_end = subject.len() - 1;
        }
        let insert_at = line_end + 1;
        subject.insert_str(insert_at, &insertion);
        Some(insert_at + insertion.len())
    } else {
        subject.replace_range(pat_start..after, &perm);
        Some(pat_start + perm.len())
    }
}

/// Replacement text for a single-line (or literally-matched) pattern:
/// multi-line replacements inherit the match's indent on every line after
/// the first, and `+` insertions start from the indent itself.
fn build_line_permutation(sm: &SelectedMutation, indent: &str) -> String {
    let mut perm = String::new();
    if sm.flags.is_new_lined {
        perm.push_str(indent);
    }
    if is_multiline(&sm.replacement) {
        let lines = split_lines(&sm.replacement);
        perm.push_str(&lines[0]);
        for line in &lines[1..] {
            perm.push_str(indent);
            perm.push_str(line);
        }
    } else {
        perm.push_str(&sm.replacement);
    }
    perm
}

/// Replacement text for a line-by-line block match. Indent propagation
/// only applies when the block itself matched indented
/// (`add_indentation`).
fn build_block_permutation(sm: &SelectedMutation, indent: &str, add_indentation: bool) -> String {
    if is_multiline(&sm.replacement) && add_indentation {
        let lines = split_lines(&sm.replacement);
        let mut perm = String::new();
        if sm.flags.is_new_lined {
            perm.push_str(indent);
        }
        perm.push_str(&lines[0]);
        for line in &lines[1..] {
            perm.push_str(indent);
            perm.push_str(line);
        }
        perm
    } else if sm.flags.is_new_lined {
        format!("{indent}{}", sm.replacement)
    } else {
        sm.replacement.clone()
    }
}

fn starts_at(subject: &str, at: usize, s: &str) -> bool {
    at <= subject.len() && subject[at..].starts_with(s)
}

/// Verifies the current line's edges around a matched segment and advances
/// the cursor: `begin` moves to the start of the next line's match region,
/// `end` to the end of the current line (its newline, or EOF).
fn line_edges_are_good(subject: &str, begin: &mut usize, end: &mut usize, s: &str) -> bool {
    if last_non_whitespace(&subject.as_bytes()[*begin..*end]).is_some() {
        return false;
    }
    *end += s.len();
    *begin = *end;
    if *begin > 0 && subject.as_bytes().get(*begin - 1) == Some(&b'\n') {
        return true;
    }
    let mut e = *end;
    while e < subject.len() && subject.as_bytes()[e] != b'\n' {
        e += 1;
    }
    let ok = last_non_whitespace(&subject.as_bytes()[*end..e]).is_none();
    *end = e;
    ok
}

/// A full pattern line must match at the shared indent column and leave
/// only whitespace to the end of its source line.
fn whole_subline_matches(
    subject: &str,
    begin: &mut usize,
    end: &mut usize,
    indentation: usize,
    add_indentation: bool,
    s: &str,
) -> bool {
    if add_indentation {
        *end = *begin + indentation;
    }
    if !starts_at(subject, *end, s) {
        return false;
    }
    if add_indentation {
        *end = *begin + indentation;
    }
    line_edges_are_good(subject, begin, end, s)
}

/// The second pattern line gets one retry: when it does not match flush at
/// the cursor and the first line was indented, matching restarts at the
/// indent column and indent propagation turns on for the rest of the
/// block.
fn line2_is_good(
    subject: &str,
    begin: &mut usize,
    end: &mut usize,
    line: &str,
    indentation: usize,
    add_indentation: &mut bool,
) -> bool {
    if !starts_at(subject, *end, line) {
        if indentation > 0 {
            *add_indentation = true;
        } else {
            return false;
        }
        return whole_subline_matches(subject, begin, end, indentation, *add_indentation, line);
    }
    line_edges_are_good(subject, begin, end, line)
}
