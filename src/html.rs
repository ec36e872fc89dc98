use std::borrow::Cow;

/// Escapes text for use in HTML element content or a quoted attribute.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(&['&', '<', '>', '"', '\''][..]) {
        return Cow::Borrowed(text)
    }
    let mut ret = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => ret.push_str("&amp;"),
            '<' => ret.push_str("&lt;"),
            '>' => ret.push_str("&gt;"),
            '"' => ret.push_str("&quot;"),
            '\'' => ret.push_str("&#x27;"),
            c => ret.push(c),
        }
    }
    Cow::Owned(ret)
}
