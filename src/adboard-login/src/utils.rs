//! Utility functions for the adboard-login crate.

/// Mask a token for safe display.
pub fn safe_format_key(key: &str) -> String {
    if key.chars().count() <= 13 {
        return "***".to_string();
    }
    let prefix: String = key.chars().take(8).collect();
    let suffix: String = key
        .chars()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{prefix}***{suffix}")
}
