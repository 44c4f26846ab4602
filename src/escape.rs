/// Escape the characters of `markup` that are significant in HTML.
///
/// `&`, `<`, `>`, `"` and `'` are replaced by entities, everything else is
/// copied unchanged.
///
/// # Examples
///
/// ```
/// use kiln::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="/">Tom & Jerry</a>"#), "&lt;a href=&#34;/&#34;&gt;Tom &amp; Jerry&lt;/a&gt;");
/// ```
pub fn escape_html(markup: &str) -> String {
    let mut buffer = String::with_capacity(markup.len());
    for c in markup.chars() {
        match c {
            '&' => buffer.push_str("&amp;"),
            '<' => buffer.push_str("&lt;"),
            '>' => buffer.push_str("&gt;"),
            '"' => buffer.push_str("&#34;"),
            '\'' => buffer.push_str("&#39;"),
            c => buffer.push(c),
        }
    }

    buffer
}
