use crate::error::{ErrorContext, NopackageError};
use colored::Colorize;

pub fn format_error_chain(error: &NopackageError) -> String {
    let context = ErrorContext::new(error);
    context.to_string()
}

/// Format error for display to user with colors and formatting
pub fn format_error_with_color(error: &NopackageError, use_color: bool) -> String {
    let context = ErrorContext::new(error);
    let mut output = String::new();

    let header = if use_color {
        "Error:".red().bold().to_string()
    } else {
        "Error:".to_string()
    };
    output.push_str(&format!("{header} {error}\n"));

    if let Some(details) = &context.details {
        output.push_str(&format!("\n{details}\n"));
    }

    if let Some(suggestion) = &context.suggestion {
        let title = if use_color {
            "Suggestions:".yellow().bold().to_string()
        } else {
            "Suggestions:".to_string()
        };
        output.push_str(&format!("\n{title}\n"));
        for line in suggestion.lines().filter(|line| !line.trim().is_empty()) {
            let bullet = format!("• {line}");
            if use_color {
                output.push_str(&format!("{}\n", bullet.cyan()));
            } else {
                output.push_str(&format!("{bullet}\n"));
            }
        }
    }

    output
}
