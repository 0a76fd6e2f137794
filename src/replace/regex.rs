//! Regex-mode mutations.
//!
//! A regex pattern cell has the shape `body/modifiers` (the sigil parser
//! already stripped the leading `/`). The body runs against the whole
//! source; every distinct matched substring, whole match and capture
//! groups alike, is rewritten with the replacement template and then fed
//! back through the literal replacer so the usual line-edge and indent
//! rules still apply.
//!
//! Modifier letters merge with the defaults `AFgnm`: plain user text is
//! appended; with a `-` separator, letters before it are appended and
//! letters after it are removed from the defaults. Of the merged set,
//! `i m s x U` map onto engine flags. `g` is implied (all matches are
//! collected) and `A F n` have no host-engine equivalent; they are
//! accepted and ignored.

use crate::errors::{Result, SpecError};
use crate::replace::replacer::Replacer;
use crate::spec::SelectedMutation;
use regex::RegexBuilder;
use std::collections::BTreeSet;
use tracing::debug;

const DEFAULT_MODIFIERS: &str = "AFgnm";

pub(crate) fn regex_replace(
    replacer: &mut Replacer,
    subject: &mut String,
    sm: &SelectedMutation,
) -> Result<()> {
    let slash = sm
        .pattern
        .rfind('/')
        .ok_or(SpecError::MissingRegexSlash {
            line: sm.flags.line_number,
        })?;
    let body = &sm.pattern[..slash];
    let modifiers = merge_modifiers(&sm.pattern[slash + 1..]);
    let re = build_regex(body, &modifiers, sm.flags.line_number)?;

    let matched: BTreeSet<String> = re
        .captures_iter(subject)
        .flat_map(|caps| {
            caps.iter()
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    debug!(
        line = sm.flags.line_number,
        substrings = matched.len(),
        "regex match pass finished"
    );

    if matched.is_empty() {
        replacer.warnings().add_no_match_line(sm.flags.line_number);
        return Ok(());
    }

    for substring in &matched {
        if substring.is_empty() {
            continue;
        }
        let rewritten = re
            .replace_all(substring, sm.replacement.as_str())
            .into_owned();
        let sub = SelectedMutation {
            pattern: substring.clone(),
            replacement: rewritten,
            flags: sm.flags,
        };
        let matches = replacer.literal_replace(subject, &sub);
        replacer.account(matches, &sub);
    }
    Ok(())
}

/// Merges user modifier text with [`DEFAULT_MODIFIERS`].
fn merge_modifiers(user: &str) -> String {
    match user.find('-') {
        Some(split) => {
            let additional = &user[..split];
            let removed = &user[split + 1..];
            let mut modifiers = String::from(additional);
            for c in DEFAULT_MODIFIERS.chars() {
                if !removed.contains(c) {
                    modifiers.push(c);
                }
            }
            modifiers
        }
        None => format!("{user}{DEFAULT_MODIFIERS}"),
    }
}

fn build_regex(body: &str, modifiers: &str, line: usize) -> Result<regex::Regex> {
    let mut builder = RegexBuilder::new(body);
    for c in modifiers.chars() {
        match c {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'U' => {
                builder.swap_greed(true);
            }
            _ => {}
        }
    }
    builder.build().map_err(|e| {
        SpecError::BadRegex {
            line,
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::spec::RowFlags;
    use crate::warnings::Warnings;

    fn regex_mutation(pattern: &str, replacement: &str) -> SelectedMutation {
        SelectedMutation {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            flags: RowFlags {
                is_regex: true,
                line_number: 1,
                ..RowFlags::default()
            },
        }
    }

    fn apply(source: &str, sm: &SelectedMutation) -> Result<(String, Warnings)> {
        let mut warnings = Warnings::new();
        let mut subject = source.to_string();
        regex_replace(&mut Replacer::new(&mut warnings), &mut subject, sm)?;
        Ok((subject, warnings))
    }

    #[test]
    fn defaults_are_appended_to_user_modifiers() {
        assert_eq!(merge_modifiers(""), "AFgnm");
        assert_eq!(merge_modifiers("is"), "isAFgnm");
    }

    #[test]
    fn dash_removes_from_defaults() {
        assert_eq!(merge_modifiers("-m"), "AFgn");
        assert_eq!(merge_modifiers("i-gn"), "iAFm");
        assert_eq!(merge_modifiers("-AFgnm"), "");
    }

    #[test]
    fn missing_final_slash_is_an_error() {
        let sm = regex_mutation("no slash here", "x");
        let err = apply("src\n", &sm).unwrap_err();
        assert!(matches!(
            err,
            Error::Spec(SpecError::MissingRegexSlash { line: 1 })
        ));
    }

    #[test]
    fn invalid_regex_body_is_an_error() {
        let sm = regex_mutation("broken(/", "x");
        let err = apply("src\n", &sm).unwrap_err();
        assert!(matches!(err, Error::Spec(SpecError::BadRegex { .. })));
    }

    #[test]
    fn simple_regex_rewrites_matched_lines() {
        let sm = regex_mutation(r"counter_\d+/", "counter");
        let (out, _) = apply("  counter_12\n  other\n", &sm).unwrap();
        assert_eq!(out, "  counter\n  other\n");
    }

    #[test]
    fn capture_groups_substitute_in_replacement() {
        let sm = regex_mutation(r"set\((\w+)\)/", "clear($1)");
        let (out, _) = apply("  set(flag)\n", &sm).unwrap();
        assert_eq!(out, "  clear(flag)\n");
    }

    #[test]
    fn no_regex_match_records_warning() {
        let sm = regex_mutation(r"absent_\d+/", "x");
        let (out, warnings) = apply("nothing\n", &sm).unwrap();
        assert_eq!(out, "nothing\n");
        assert!(warnings.render().contains("had no match"));
    }

    #[test]
    fn case_insensitive_modifier_applies() {
        let sm = regex_mutation(r"todo/i", "done");
        let (out, _) = apply("  TODO\n", &sm).unwrap();
        assert_eq!(out, "  done\n");
    }

    #[test]
    fn edge_rules_still_gate_regex_rewrites() {
        // The regex finds the substring, but the literal pass refuses the
        // mid-line occurrence.
        let sm = regex_mutation(r"flag_\w+/", "flag_off");
        let (out, warnings) = apply("int flag_on = 1;\n", &sm).unwrap();
        assert_eq!(out, "int flag_on = 1;\n");
        assert!(warnings.render().contains("had no match"));
    }
}
