//! Placeholder for the score surface (grading a mutated source against
//! its originating spec).

use crate::errors::Result;
use std::path::Path;

pub fn run(_input: Option<&Path>, _mutations: Option<&Path>) -> Result<()> {
    println!("score command - not yet implemented");
    Ok(())
}
