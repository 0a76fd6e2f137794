//! Application of selected mutations to the source text.
//!
//! All replacement works in byte-index space on an owned working copy of
//! the source. Literal patterns go through the single-line or multi-line
//! matcher in [`replacer`]; `/body/mods` patterns are expanded by
//! [`regex`] into literal sub-mutations first.

mod regex;
mod replacer;

pub use replacer::Replacer;
