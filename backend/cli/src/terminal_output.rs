//! Terminal output helpers: colored notes on stderr, JSON on stdout.

use anyhow::Result;
use serde_json::Value;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

fn note(symbol: &str, color: &str, label: &str, msg: &str) {
    if supports_color() {
        eprintln!("{color}{BOLD}{symbol}{RESET} {msg}");
    } else {
        eprintln!("{label}: {msg}");
    }
}

pub fn note_info(msg: &str) {
    note("ℹ", CYAN, "INFO", msg);
}

pub fn note_warn(msg: &str) {
    note("⚠", YELLOW, "WARN", msg);
}

pub fn note_error(msg: &str) {
    note("✖", RED, "ERROR", msg);
}

/// Pretty-print a JSON document to stdout, so output can be piped.
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
