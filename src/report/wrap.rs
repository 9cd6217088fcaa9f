//! Greedy word wrapping for table cells.

use std::fmt::Display;

/// Default maximum line length, in characters.
pub const DEFAULT_WRAP_WIDTH: usize = 40;

/// Wrap `value` into lines of at most `max_len` characters.
///
/// Breaks only between whitespace-separated words. A word longer than
/// `max_len` gets a line of its own and is never cut. Values that already
/// fit are returned untouched.
pub fn wrap_text<T: Display + ?Sized>(value: &T, max_len: usize) -> String {
    let text = value.to_string();
    if text.chars().count() <= max_len {
        return text;
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_len {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}
