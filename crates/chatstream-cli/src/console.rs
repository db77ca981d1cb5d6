//! CLI console utilities

use colored::*;
use std::io::{self, Write};

/// CLI console for formatted output
///
/// Status lines go to stderr so that stdout carries only conversation text.
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message (verbose only)
    pub fn info(&self, message: &str) {
        if self.verbose {
            eprintln!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green().bold(), message.green());
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print a labelled value
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("{:>14}: {}", label.bold(), value);
    }

    /// Show the prompt and flush so it appears before input is read
    pub fn prompt(&self, prompt: &str) {
        print!("{} ", prompt.cyan().bold());
        let _ = io::stdout().flush();
    }
}
