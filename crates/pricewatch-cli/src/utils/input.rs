//! User input utilities for interactive command-line prompts.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Prompts the user for a yes/no confirmation on stdin.
///
/// Accepts 'y', 'yes', 'n', 'no' (case insensitive). Empty input and end of
/// input are treated as 'no'.
pub fn prompt_confirmation(prompt: &str) -> Result<bool> {
    print!("{prompt} (y/N): ");
    io::stdout().flush().context("Failed to flush prompt")?;
    read_confirmation(io::stdin().lock())
}

/// Read answers from `reader` until one is recognised.
pub fn read_confirmation(mut reader: impl BufRead) -> Result<bool> {
    loop {
        let mut input = String::new();
        let read = reader
            .read_line(&mut input)
            .context("Failed to read user input")?;
        if read == 0 {
            return Ok(false);
        }
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => eprintln!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}
