use anyhow::Result;
use colored::Colorize;
use proctor_core::calculator;

/// Evaluates one expression and prints the result.
pub fn execute(expression: &str) -> Result<()> {
    match calculator::evaluate(expression) {
        Ok(value) => {
            println!("{}", format_value(value).bright_green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            Err(e.into())
        }
    }
}

/// Renders a result without float noise (`0.30000000000000004` → `0.3`).
///
/// Magnitudes from 1e15 up are printed in scientific notation, unrounded.
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1e15 {
        return format!("{:e}", value);
    }
    let rounded = (value * 1e10).round() / 1e10;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
