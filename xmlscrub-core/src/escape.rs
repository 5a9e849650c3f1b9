//! escape.rs - XML text and attribute-value escaping.
//!
//! Every text chunk and attribute value passes through [`escape`] before it
//! is written (and before any content-replace rule runs, so user-supplied
//! patterns match the escaped form). The mapping is character-level and
//! non-overlapping, applied left to right.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::fmt::Write as _;

/// True if `c` needs replacing in the output stream.
fn needs_escape(c: char) -> bool {
    matches!(c, '<' | '>' | '&' | '"' | '\'') || c as u32 >= 127
}

/// Converts raw text into XML-safe text.
///
/// `<`, `>` and `&` become their predefined entities; `"` and `'` become
/// the numeric references `&#34;` and `&#39;`; every code point at or above
/// 127 becomes a decimal character reference; everything else is unchanged.
///
/// Returns the input borrowed when no character needs escaping, so the
/// common ASCII fast path allocates nothing. The escaped form grows
/// dynamically rather than being pre-sized at a fixed multiple of the
/// input, since no fixed multiplier bounds a decimal character reference.
pub fn escape(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(needs_escape) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..first]);
    for c in text[first..].chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c if c as u32 >= 127 => {
                // Infallible: writing to a String cannot fail.
                let _ = write!(out, "&#{};", c as u32);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_is_borrowed_unchanged() {
        let input = "nothing to do here 123";
        let escaped = escape(input);
        assert!(matches!(escaped, Cow::Borrowed(_)));
        assert_eq!(escaped, input);
    }

    #[test]
    fn predefined_entities() {
        assert_eq!(escape("a<b"), "a&lt;b");
        assert_eq!(escape("a>b"), "a&gt;b");
        assert_eq!(escape("a&b"), "a&amp;b");
    }

    #[test]
    fn quotes_become_numeric_references() {
        assert_eq!(escape(r#"say "hi""#), "say &#34;hi&#34;");
        assert_eq!(escape("it's"), "it&#39;s");
    }

    #[test]
    fn high_code_points_become_decimal_references() {
        assert_eq!(escape("café"), "caf&#233;");
        assert_eq!(escape("€"), "&#8364;");
        // DEL (127) is the first escaped code point.
        assert_eq!(escape("\u{7f}"), "&#127;");
        // 126 is the last unescaped one.
        assert_eq!(escape("~"), "~");
    }

    #[test]
    fn mapping_is_left_to_right_and_non_overlapping() {
        assert_eq!(escape("<&>"), "&lt;&amp;&gt;");
        // Already-escaped input is escaped again, not recognized.
        assert_eq!(escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn mixed_content() {
        assert_eq!(
            escape(r#"5 < 6 && "naïve""#),
            "5 &lt; 6 &amp;&amp; &#34;na&#239;ve&#34;"
        );
    }
}
