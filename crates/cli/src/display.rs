//! Display utilities for the scframe CLI

use std::fmt;

use colored::Colorize;

/// A formatted section title
pub(crate) struct SectionTitle(pub(crate) &'static str);

impl fmt::Display for SectionTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n{}", self.0.bold().underline())
    }
}

/// Format a success message
pub(crate) fn success(message: &str) -> String {
    format!("✅ {}", message.green().bold())
}

/// Format a warning message
pub(crate) fn warning(message: &str) -> String {
    format!("⚠️  {}", message.yellow().bold())
}

/// Format a list of key-value pairs under a title
pub(crate) fn key_value_box(title: &str, items: &[(&str, String)]) -> String {
    let mut result = format!("{}", title.bold().underline());
    for (key, value) in items {
        result.push_str(&format!("\n  {}: {}", key.bold(), value));
    }
    result
}

/// Format one transport block: index, length and bytes
pub(crate) fn block(index: usize, bytes: &[u8]) -> String {
    let spaced = bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{} {} {}",
        format!("#{index:<3}").cyan(),
        format!("[{:>3}]", bytes.len()).dimmed(),
        spaced
    )
}
