//! Non-fatal diagnostics collected across a run and emitted in one block
//! after the mutated output is written.

const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Accumulates no-match / multiple-match line numbers and free-text notes.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    no_match_lines: Vec<usize>,
    multiple_match_lines: Vec<usize>,
    notes: Vec<String>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the pattern from the given spec line matched nothing.
    pub fn add_no_match_line(&mut self, line: usize) {
        self.no_match_lines.push(line);
    }

    /// Records that the pattern from the given spec line matched more than
    /// once.
    pub fn add_multiple_match_line(&mut self, line: usize) {
        self.multiple_match_lines.push(line);
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(crate::text::sanitize_message(&note.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.no_match_lines.is_empty() && self.multiple_match_lines.is_empty() && self.notes.is_empty()
    }

    /// Formats the collected warnings as a single ANSI-yellow block, or an
    /// empty string when nothing was recorded.
    pub fn render(&self) -> String {
        let mut body = String::new();

        if !self.no_match_lines.is_empty() {
            body.push_str(&line_list_sentence(
                &self.no_match_lines,
                "had no match",
                "had no matches",
            ));
            body.push_str("\n   ");
        }
        if !self.multiple_match_lines.is_empty() {
            body.push_str(&line_list_sentence(
                &self.multiple_match_lines,
                "had multiple matches",
                "had multiple matches",
            ));
            body.push('\n');
        }
        if !self.notes.is_empty() {
            for note in &self.notes {
                body.push_str("   ");
                body.push_str(note);
                body.push('\n');
            }
            body.push('\n');
        }

        if body.is_empty() {
            return body;
        }
        format!("{YELLOW}Warnings:{RESET}\n   {body}")
    }
}

fn line_list_sentence(lines: &[usize], singular_verb: &str, plural_verb: &str) -> String {
    let plural = lines.len() > 1;
    let mut s = format!(
        "The pattern cell{} beginning at the{} following line number{} {} in the source file: {{ ",
        if plural { "s" } else { "" },
        if plural { "se" } else { "" },
        if plural { "s" } else { "" },
        if plural { plural_verb } else { singular_verb },
    );
    for (i, line) in lines.iter().enumerate() {
        s.push_str(&line.to_string());
        s.push_str(if i + 1 == lines.len() { " " } else { ", " });
    }
    s.push('}');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_warnings_render_nothing() {
        assert!(Warnings::new().render().is_empty());
        assert!(Warnings::new().is_empty());
    }

    #[test]
    fn single_no_match_uses_singular_forms() {
        let mut w = Warnings::new();
        w.add_no_match_line(7);
        let out = w.render();
        assert!(out.starts_with("\x1b[33mWarnings:\x1b[0m\n"));
        assert!(out.contains("The pattern cell beginning at the following line number had no match"));
        assert!(out.contains("{ 7 }"));
    }

    #[test]
    fn several_no_match_lines_pluralise() {
        let mut w = Warnings::new();
        w.add_no_match_line(3);
        w.add_no_match_line(9);
        let out = w.render();
        assert!(out.contains("pattern cells beginning at these following line numbers had no matches"));
        assert!(out.contains("{ 3, 9 }"));
    }

    #[test]
    fn multiple_match_section_renders() {
        let mut w = Warnings::new();
        w.add_multiple_match_line(4);
        let out = w.render();
        assert!(out.contains("had multiple matches in the source file: { 4 }"));
    }

    #[test]
    fn notes_are_sanitized() {
        let mut w = Warnings::new();
        w.add_note("count clamped\x1b[31m");
        let out = w.render();
        assert!(out.contains("count clamped?[31m"));
    }
}
