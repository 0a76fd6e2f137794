//! Row assembly and cell extraction.
//!
//! A row is normally one physical line, but a quoted cell may span
//! newlines, so assembly tracks quote parity rather than splitting on
//! `\n` directly. Quote counting only arms at cell boundaries (row start
//! or just after a tab); elsewhere a `"` is literal text.

use crate::errors::SpecError;
use crate::text::is_whitespace_char;

/// One assembled row and the spec line it begins on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRow {
    pub text: String,
    pub line_number: usize,
}

/// Partitions the spec text into rows.
///
/// Comment rows (`#` first byte) are dropped after assembly, consecutive
/// newlines outside quotes collapse, and a trailing empty row is
/// discarded. An empty first physical line is skipped entirely; the first
/// row then reports the line its content begins on.
pub fn assemble_rows(input: &str) -> Result<Vec<SpecRow>, SpecError> {
    let mut chars = input.chars();
    let mut temp = vec![SpecRow {
        text: String::new(),
        line_number: 1,
    }];
    let mut qmark_count = 0usize;
    let mut line_number = 1usize;
    let mut count_qmarks = true;

    let Some(first) = chars.next() else {
        return Err(SpecError::NoMutations);
    };
    let mut last = first;
    if first == '\n' {
        line_number += 1;
        temp[0].line_number = line_number;
    } else {
        if first == '"' {
            qmark_count += 1;
        } else {
            count_qmarks = false;
        }
        temp[0].text.push(first);
    }

    for c in chars {
        if c == '\t' && qmark_count % 2 == 0 && count_qmarks {
            qmark_count = 0;
            count_qmarks = false;
        }
        if c == '"' {
            if !count_qmarks {
                // A quote only opens a cell at a cell boundary.
                if temp.last().is_some_and(|r| r.text.is_empty()) || last == '\t' {
                    qmark_count += 1;
                    count_qmarks = true;
                }
            } else {
                qmark_count += 1;
            }
        }
        if c == '\n' {
            line_number += 1;
            if last == '\n' && qmark_count % 2 == 0 {
                continue;
            }
            let row_is_comment = temp.last().is_some_and(|r| r.text.starts_with('#'));
            if (last != '\n' && qmark_count % 2 == 0) || row_is_comment {
                temp.push(SpecRow {
                    text: String::new(),
                    line_number,
                });
                qmark_count = 0;
                last = c;
                continue;
            }
        }
        temp.last_mut().expect("rows never empty").text.push(c);
        last = c;
    }

    if temp.last().is_some_and(|r| r.text.is_empty()) {
        temp.pop();
    }

    let rows: Vec<SpecRow> = temp
        .into_iter()
        .filter(|r| !r.text.starts_with('#'))
        .collect();

    if rows.is_empty() {
        return Err(SpecError::NoMutations);
    }
    Ok(rows)
}

/// Extracts the next cell starting at `pos`.
///
/// Quoted cells: a leading `"` opens the cell, `""` is an escaped literal
/// quote, and the cell closes at a `"` followed by a tab or the row end.
/// Any other character after a closing quote is a syntax error. Unquoted
/// cells run to the next tab. `line_number` advances across embedded
/// newlines so diagnostics can point at the right physical line.
pub fn take_cell(
    chars: &[char],
    pos: &mut usize,
    line_number: &mut usize,
    row_line: usize,
) -> Result<String, SpecError> {
    let mut cell = String::new();

    if chars.get(*pos) != Some(&'"') {
        while *pos < chars.len() && chars[*pos] != '\t' {
            cell.push(chars[*pos]);
            *pos += 1;
        }
        return Ok(cell);
    }

    let mut line_start = *pos;
    *pos += 1;
    let mut consecutive_quotes = 0usize;
    let mut closed = false;

    while *pos < chars.len() {
        let c = chars[*pos];
        if c == '\n' {
            *line_number += 1;
            line_start = *pos + 1;
        }
        if c == '"' {
            consecutive_quotes += 1;
            let next = chars.get(*pos + 1).copied();
            if (next == Some('\t') && consecutive_quotes % 2 == 1) || next.is_none() {
                // end of quoted cell
                *pos += 1;
                closed = consecutive_quotes % 2 == 1;
                break;
            } else if next == Some('"') && chars.get(*pos + 2).copied() != Some('\t') {
                // escaped quote in quoted cell
                *pos += 1;
                consecutive_quotes += 1;
            } else if next != Some('\t') && consecutive_quotes % 2 == 1 {
                let invalid = next.expect("checked above");
                return Err(SpecError::InvalidCharAfterQuote {
                    found: describe_char(invalid),
                    index: *pos + 2 - line_start,
                    line: *line_number,
                    row_line,
                });
            }
        } else {
            consecutive_quotes = 0;
        }
        cell.push(chars[*pos]);
        *pos += 1;
    }

    if !closed && consecutive_quotes % 2 == 0 {
        // final cell in row is missing its terminating quote
        return Err(SpecError::UnterminatedQuote { row_line });
    }
    Ok(cell)
}

/// Fails when at least one non-empty permutation cell does not follow.
pub fn verify_has_permutation(
    chars: &[char],
    pos: usize,
    line_number: usize,
    row_line: usize,
) -> Result<(), SpecError> {
    let mut it = pos;
    while it < chars.len() && chars[it] == '\t' {
        it += 1;
    }
    if it >= chars.len() {
        return Err(SpecError::MissingPermutation {
            line: line_number,
            row_line,
        });
    }
    Ok(())
}

/// Cells in TSV format must not be indented.
pub fn check_indentation(chars: &[char], row_line: usize) -> Result<(), SpecError> {
    if chars.first().copied().is_some_and(is_whitespace_char) {
        return Err(SpecError::Indentation { line: row_line });
    }
    Ok(())
}

fn describe_char(c: char) -> String {
    if is_whitespace_char(c) {
        "['SPACE']".to_string()
    } else if c == '"' {
        "['QUOTATION MARK']".to_string()
    } else {
        format!("[ '{c}' ]")
    }
}
