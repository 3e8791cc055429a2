//! Progress lines for the CI log. Diagnostics go through `tracing` on stderr;
//! these are the human-facing status messages on stdout.

use colored::Colorize;
use std::io::{self, Write};

pub fn step(icon: &str, message: &str) {
    println!("{icon} {message}");
}

pub fn success(message: &str) {
    println!("✅ {}", message.green());
}

pub fn failure(message: &str) {
    println!("❌ {}", message.red().bold());
}

pub fn note(message: &str) {
    println!("ℹ️ {}", message.dimmed());
}

pub fn write_warning<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "⚠️ {}", message.yellow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_warning_keeps_message() {
        let mut out = Vec::new();
        write_warning(&mut out, "invalid OPENAI_MAX_TOKENS value").unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with("⚠️ "));
        assert!(line.contains("invalid OPENAI_MAX_TOKENS value"));
        assert!(line.ends_with('\n'));
    }
}
