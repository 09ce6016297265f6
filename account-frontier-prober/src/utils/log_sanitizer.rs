//! Log sanitization utilities
//!
//! Profile pages run to hundreds of kilobytes of HTML and error pages can be
//! just as large; only a bounded prefix of any body reaches the logs or an
//! error value.

/// Maximum number of bytes of a body kept for logging.
const TRUNCATE_LIMIT: usize = 256;

/// Largest char boundary not above `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Truncate a response body for safe logging.
///
/// Bodies within the limit are returned unchanged (minus surrounding
/// whitespace); longer ones keep their first `TRUNCATE_LIMIT` bytes and gain a
/// suffix carrying the original length.
pub fn truncate_for_log(s: &str) -> String {
    let s = s.trim();
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_unchanged() {
        assert_eq!(truncate_for_log(r#"{"id":1}"#), r#"{"id":1}"#);
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(truncate_for_log("\n  not found \n"), "not found");
    }

    #[test]
    fn long_html_truncated_with_length() {
        let body = "<div>".repeat(200);
        let result = truncate_for_log(&body);
        assert!(result.ends_with("[truncated, total 1000 bytes]"));
        assert!(result.len() < body.len());
    }

    #[test]
    fn multibyte_boundary_respected() {
        let body = "é".repeat(200); // 2 bytes each
        let result = truncate_for_log(&body);
        assert!(result.starts_with(&"é".repeat(128)));
    }
}
