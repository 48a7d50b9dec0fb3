//! HTML entity escaping shared by the Markdown and highlighting passes.

/// Escape the five characters that are significant in HTML text and
/// attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(escape_html("left-pad 1.3.0"), "left-pad 1.3.0");
    }

    #[test]
    fn test_ampersand_escaped_once() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }
}
