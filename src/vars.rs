//! Interactive collection of template variable values.

use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::template_def::Mappings;

pub trait VarReader {
    fn values_for(&mut self, vars: &[String]) -> Result<Mappings>;
}

/// Prompts on stdout, reads one line per variable from stdin.
pub struct StdinReader;

impl VarReader for StdinReader {
    fn values_for(&mut self, vars: &[String]) -> Result<Mappings> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut values = Mappings::new();
        for name in vars {
            print!("Enter value for {name}: ");
            io::stdout().flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            values.insert(
                name.clone(),
                line.trim_end_matches(['\n', '\r']).to_string(),
            );
        }
        Ok(values)
    }
}
