//! Text utilities for command parsing.

/// Whether `text` is a command, i.e. starts with `/`.
pub fn is_command(text: &str) -> bool {
    text.starts_with('/')
}

/// Extracts the command token from `text` without the leading `/` and without a
/// trailing `@botname` suffix. Case-sensitive; `None` when `text` is not a command.
///
/// `"/help"` → `help`, `"/help@MyBot"` → `help`, `"/search black eyed peas"` →
/// `search`, `"Good day"` → `None`.
pub fn extract_command(text: &str) -> Option<&str> {
    if !is_command(text) {
        return None;
    }
    let token = text.split_whitespace().next()?;
    let token = token.split('@').next()?;
    Some(&token[1..])
}

/// Everything after the command token, trimmed. `None` when `text` is not a command.
///
/// `"/search black eyed peas"` → `black eyed peas`.
pub fn extract_arguments(text: &str) -> Option<&str> {
    if !is_command(text) {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((_, rest)) => Some(rest.trim()),
        None => Some(""),
    }
}
