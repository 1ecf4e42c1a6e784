//! Status messages and inline styling for terminal output.
//!
//! Status lines go to stderr so stdout stays clean for tables and `--json`.
//! Colors are dropped when the stream is not a terminal or `NO_COLOR` is set.

use std::io::IsTerminal;

const GREEN: &str = "\x1b[38;2;0;245;212m";
const RED: &str = "\x1b[38;2;255;107;107m";
const AMBER: &str = "\x1b[38;2;255;200;87m";
const BLUE: &str = "\x1b[38;2;72;202;228m";
const GRAY: &str = "\x1b[38;2;130;154;177m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

fn use_colors(stderr: bool) -> bool {
    let is_terminal = if stderr {
        std::io::stderr().is_terminal()
    } else {
        std::io::stdout().is_terminal()
    };
    is_terminal && !colors_disabled()
}

/// Kind of status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
    Dim,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Warning => "[WARN]",
            MessageType::Info => "[INFO]",
            MessageType::Dim => "-",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageType::Success => GREEN,
            MessageType::Error => RED,
            MessageType::Warning => AMBER,
            MessageType::Info => BLUE,
            MessageType::Dim => GRAY,
        }
    }
}

fn format_message(msg_type: MessageType, message: &str, colors: bool) -> String {
    if colors {
        format!("{}{} {}{}", msg_type.color(), msg_type.icon(), message, RESET)
    } else {
        format!("{} {}", msg_type.icon(), message)
    }
}

fn print_status(msg_type: MessageType, message: &str) {
    eprintln!("{}", format_message(msg_type, message, use_colors(true)));
}

pub fn print_success(message: &str) {
    print_status(MessageType::Success, message);
}

pub fn print_error(message: &str) {
    print_status(MessageType::Error, message);
}

pub fn print_warning(message: &str) {
    print_status(MessageType::Warning, message);
}

pub fn print_info(message: &str) {
    print_status(MessageType::Info, message);
}

/// Bold text for stdout section headings.
pub fn heading(text: &str) -> String {
    if use_colors(false) {
        format!("{BOLD}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Colored inline label for stdout.
pub fn styled_label(msg_type: MessageType, label: &str) -> String {
    if use_colors(false) {
        format!("{}{}{}", msg_type.color(), label, RESET)
    } else {
        label.to_string()
    }
}
