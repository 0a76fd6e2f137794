//! Placeholder for the highlight surface (annotating a source file with
//! the locations each spec pattern would match).

use crate::errors::Result;
use std::path::Path;

pub fn run(_input: Option<&Path>, _mutations: Option<&Path>) -> Result<()> {
    println!("highlight command - not yet implemented");
    Ok(())
}
