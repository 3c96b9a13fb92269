//! Response bodies.

use std::borrow::Cow;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Confirmation page sent after every accepted submission.
pub fn confirmation_page(decoded: &str, escape: bool) -> String {
    let text = if escape {
        escape_html(decoded)
    } else {
        Cow::Borrowed(decoded)
    };
    format!(
        "<!DOCTYPE html><html lang=\"ja\"><body><h1>{}が登録されました</h1></body></html>",
        text
    )
}

/// Replace the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_page() {
        assert_eq!(
            confirmation_page("alice:100", true),
            "<!DOCTYPE html><html lang=\"ja\"><body><h1>alice:100が登録されました</h1></body></html>"
        );
    }

    #[test]
    fn test_escaping_modes() {
        let script = "<script>alert('x')</script>";
        assert!(confirmation_page(script, false).contains(script));

        let page = confirmation_page(script, true);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;が登録されました"));
    }

    #[test]
    fn test_escape_html_borrows_clean_text() {
        assert!(matches!(escape_html("あ 100"), Cow::Borrowed(_)));
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
    }
}
