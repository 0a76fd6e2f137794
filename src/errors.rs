use thiserror::Error;

/// Top-level error type. Every failure in the library surfaces as one of
/// these five kinds; only the CLI boundary translates them into exit codes
/// and human-readable messages.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Process exit code for this error: user errors map to 1, internal
    /// invariant violations to 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Internal(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing the TSV mutation spec.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("No mutations found in TSV file.")]
    NoMutations,

    #[error(
        "Indentation detected.\n    Cells in TSV format should not be indented.\n    \
         Indentation found at row {line} of TSV file."
    )]
    Indentation { line: usize },

    #[error(
        "Permutation cell missing in TSV file.\n    Missing permutation cell on line number {line}\n    \
         Row that begins with pattern cell on line number {row_line} has no corresponding permutation cell(s)."
    )]
    MissingPermutation { line: usize, row_line: usize },

    #[error("Cell content missing in TSV file.\n    Missing cell content for pattern cell on line number {line}")]
    EmptyPattern { line: usize },

    #[error(
        "Terminating quote missing.\n    Cells beginning with QUOTATION MARK must end with QUOTATION MARK.\n    \
         Final cell of row beginning on line number {row_line} missing terminating QUOTATION MARK."
    )]
    UnterminatedQuote { row_line: usize },

    #[error(
        "Invalid syntax found at index {index} of line number {line} in TSV\n    \
         Currently found in your TSV : ... \"{found}...\n    \
         Expected to be found in TSV : ... \"['TAB']...\n    \
         If this is not the intended end of the quoted cell, check the preceding section of the row \
         beginning with the pattern cell on line number {row_line} for any extra or missing \
         QUOTATION MARKS and/or TABs."
    )]
    InvalidCharAfterQuote {
        found: String,
        index: usize,
        line: usize,
        row_line: usize,
    },

    #[error(
        "Invalid group nesting syntax in TSV file.\n    \
         Nested pattern cell in row number {line} has no corresponding parent."
    )]
    InvalidNesting { line: usize },

    #[error("Regex pattern cell in row beginning on line number {line} is missing final '/'.")]
    MissingRegexSlash { line: usize },

    #[error("Invalid regex in row beginning on line number {line}: {message}")]
    BadRegex { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_partition_user_and_internal_errors() {
        assert_eq!(Error::from(SpecError::NoMutations).exit_code(), 1);
        assert_eq!(Error::InvalidSeed("short".into()).exit_code(), 1);
        assert_eq!(Error::InvalidArgument("clash".into()).exit_code(), 1);
        assert_eq!(Error::Internal("broken invariant".into()).exit_code(), 2);
    }

    #[test]
    fn spec_error_messages_name_line_numbers() {
        let err = SpecError::MissingPermutation {
            line: 4,
            row_line: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("line number 4"));
        assert!(msg.contains("line number 3"));
    }
}
