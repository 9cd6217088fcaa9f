//! Common utilities for report rendering.
//!
//! Shared helpers for timestamp formatting and Typst string escaping.

use chrono::NaiveDateTime;

/// Timestamp layout used in the report title (e.g. "05-03-2024 09:05").
pub const TITLE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Format the generation time shown in the report title.
pub fn format_title_timestamp(generated_at: NaiveDateTime) -> String {
    generated_at.format(TITLE_TIMESTAMP_FORMAT).to_string()
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
        .replace('\r', r"\r")
}

/// Render one cell as a Typst content block.
///
/// Each line becomes a string literal so markup characters in camera names
/// are never interpreted; wrapper-inserted newlines become explicit breaks.
pub fn typst_cell(value: &str) -> String {
    if value.is_empty() {
        return "[]".to_string();
    }

    let lines: Vec<String> = value
        .split('\n')
        .map(|line| format!("#\"{}\"", escape_typst_string(line)))
        .collect();

    format!("[{}]", lines.join("#linebreak()"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_title_timestamp() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(format_title_timestamp(dt), "05-03-2024 09:05");
    }

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(
            escape_typst_string(r#"Камера "Север""#),
            r#"Камера \"Север\""#
        );
        assert_eq!(escape_typst_string(r"C:\cams"), r"C:\\cams");
    }

    #[test]
    fn test_typst_cell_breaks_lines() {
        assert_eq!(typst_cell("a\nb"), r##"[#"a"#linebreak()#"b"]"##);
        assert_eq!(typst_cell(""), "[]");
        assert_eq!(typst_cell("#set *x*"), r##"[#"#set *x*"]"##);
    }
}
