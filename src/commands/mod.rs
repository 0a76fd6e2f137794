//! Subcommand implementations. Only `mutate` exercises the full engine;
//! `validate` runs the spec parser as a standalone check, and `highlight`
//! and `score` are placeholders for the analysis surface.

pub mod highlight;
pub mod mutate;
pub mod score;
pub mod validate;
