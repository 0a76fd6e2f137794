//! srcmut: seeded, reproducible source-code mutation.
//!
//! The engine consumes a source text and a TSV *mutation spec* and emits a
//! modified source in which a bounded, reproducibly random subset of the
//! spec's mutations has been applied. A run is a pure function of
//! `(source, spec, seed)`: fix the seed and the output is byte-identical.
//!
//! # Architecture
//!
//! Data flows leaves-first through three subsystems:
//!
//! 1. [`spec`] — a quote-aware tabular parser that also interprets each
//!    row's leading sigil prefix (`^ @ + ? ! /`) into nesting depth,
//!    sync, optionality, negation and regex flags.
//! 2. [`selector`] — a ChaCha20-seeded selector that draws which rows to
//!    apply, expands groups, and partitions the run into a positive or
//!    negated mode.
//! 3. [`replace`] — a byte-index text replacer with whitespace-tolerant
//!    line-edge matching and indentation propagation for multi-line
//!    mutations.
//!
//! # Example
//!
//! ```
//! use srcmut::commands::mutate::mutate_texts;
//! use srcmut::rng::Seed;
//! use srcmut::selector::SelectorConfig;
//!
//! let config = SelectorConfig {
//!     seed: Some(Seed::from_hex(&"00".repeat(32)).unwrap()),
//!     ..SelectorConfig::default()
//! };
//! let (output, _, warnings) = mutate_texts(
//!     "  myString = hello;\n",
//!     "myString = hello;\tmyString = world;\n",
//!     &config,
//! )
//! .unwrap();
//! assert_eq!(output, "  myString = world;\n");
//! assert!(warnings.is_empty());
//! ```

pub mod commands;
pub mod errors;
pub mod io;
pub mod replace;
pub mod rng;
pub mod selector;
pub mod spec;
pub mod text;
pub mod warnings;

// Re-exports
pub use errors::{Error, Result, SpecError};
pub use replace::Replacer;
pub use rng::{ChaChaRng, Seed};
pub use selector::{select_mutations, Selection, SelectorConfig};
pub use spec::{parse_spec, PossibleMutation, RowFlags, SelectedMutation};
pub use warnings::Warnings;
