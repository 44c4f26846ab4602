//! Emitters which translate directives into render-script statements.
//!
//! Every statement is prefixed with `; ` so that a fragment written by the
//! template author can never run into the statement before it.

use super::scan::LoopFrame;
use serde_json::Value;

/// Escape `text` for inclusion between double quotes in generated source.
pub fn escape_literal(text: &str) -> String {
    let mut buffer = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => buffer.push_str("\\\\"),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            '"' => buffer.push_str("\\\""),
            c => buffer.push(c),
        }
    }

    buffer
}

/// Return `text` as a double quoted string literal.
pub fn quote(text: &str) -> String {
    Value::from(text).to_string()
}

/// Return a statement which appends literal text to the output.
pub fn literal(text: &str) -> String {
    format!("; __append(\"{}\");\n", escape_literal(text))
}

/// Return the fragment of a plain directive as it is, followed by a newline
/// when the fragment ends in an unterminated line comment.
pub fn statement(fragment: &str) -> String {
    let mut source = format!("; {fragment}");
    if ends_in_comment(fragment) {
        source.push('\n');
    }
    source.push('\n');

    source
}

/// Return a statement which appends the value of the expression, escaped
/// when requested. Empty expressions produce no statement.
pub fn output(fragment: &str, escaped: bool) -> Option<String> {
    let expression = strip_terminator(fragment);
    if expression.is_empty() {
        return None;
    }
    let guard = if ends_in_comment(expression) { "\n" } else { "" };

    Some(if escaped {
        format!("; __append(escape({expression}{guard}));\n")
    } else {
        format!("; __append({expression}{guard});\n")
    })
}

/// Return the statement opening a conditional.
pub fn branch_open(condition: &str) -> String {
    format!("; if ({condition}) {{\n")
}

/// Return the statement adding an alternative to a conditional.
pub fn branch_else(condition: Option<&str>) -> String {
    match condition {
        Some(condition) => format!("; }} else if ({condition}) {{\n"),
        None => "; } else {\n".into(),
    }
}

/// Return the statement opening a switch.
pub fn switch_open(expression: &str) -> String {
    format!("; switch ({expression}) {{\n")
}

/// Return the labels of a case group.
///
/// Every group but the first is preceded by a `break`, so control never
/// falls from one group into the next.
pub fn switch_case(values: &[Value], first: bool) -> String {
    let mut source = String::new();
    if !first {
        source.push_str("; break;\n");
    }
    for value in values {
        source.push_str(&format!("case ({value}):\n"));
    }

    source
}

/// Return the default label.
pub fn switch_default(first: bool) -> String {
    if first {
        "default:\n".into()
    } else {
        "; break;\ndefault:\n".into()
    }
}

/// Return the statement closing a switch.
pub fn switch_close(empty: bool) -> String {
    if empty {
        "; }\n".into()
    } else {
        "; break;\n; }\n".into()
    }
}

/// Return the statements opening a loop over the collection named by the
/// frame.
///
/// The loop binds the collection, its length, the current index (or key)
/// and value. The opening tag is written only when the collection is not
/// empty.
pub fn loop_open(frame: &LoopFrame, use_with: bool) -> String {
    let (collection, key, keyword) = loop_names(frame);
    let mut source = format!(
        "; {{\n; let {collection} = ({}), $length = len({collection}), {key} = 0, $value = null;\n",
        frame.name
    );
    if !frame.tag.is_empty() {
        source.push_str(&format!("; if ($length) __append(\"{}\");\n", frame.tag));
    }
    source.push_str(&format!("; for ({key}, $value {keyword} {collection}) {{\n"));
    if use_with {
        source.push_str("; with ($value) {\n");
    }

    source
}

/// Return the statements closing the loop of the frame.
///
/// The closing markup is the one given on the close directive, or else
/// derived from the opening tag.
pub fn loop_close(frame: &LoopFrame, use_with: bool) -> String {
    let mut source = String::new();
    if use_with {
        source.push_str("; }\n");
    }
    source.push_str("; }\n");

    let end = match &frame.end {
        Some(end) => end.clone(),
        None => close_tags(&frame.tag),
    };
    if !end.is_empty() {
        source.push_str(&format!("; if ($length) __append(\"{end}\");\n"));
    }
    source.push_str("; }\n");

    source
}

fn loop_names(frame: &LoopFrame) -> (&'static str, &'static str, &'static str) {
    if frame.map {
        ("$json", "$key", "in")
    } else {
        ("$array", "$index", "of")
    }
}

/// Derive the closing markup for an escaped opening markup.
///
/// Each line has its opening tags replaced by matching closing tags in
/// reverse order, and the lines themselves are reversed, so that
/// `<ul>\n<li>` becomes `</li>\n</ul>`.
///
/// # Examples
///
/// ```text
/// <ul class="x"><li>  ->  </li></ul>
/// ```
pub fn close_tags(tag: &str) -> String {
    let lines: Vec<String> = tag.split("\\n").map(close_line).collect();

    lines.into_iter().rev().collect::<Vec<_>>().join("\\n")
}

fn close_line(line: &str) -> String {
    let names = tag_names(line);
    let mut line = line.to_owned();

    for name in names.iter().rev() {
        match find_open_tag(&line) {
            Some((begin, end)) => line.replace_range(begin..end, &format!("</{name}>")),
            None => break,
        }
    }

    line
}

/// Return the names of every `<name` in the line.
fn tag_names(line: &str) -> Vec<&str> {
    let mut names = vec![];
    for (index, _) in line.match_indices('<') {
        let rest = &line[index + 1..];
        let length = word_length(rest);
        if length > 0 {
            names.push(&rest[..length]);
        }
    }

    names
}

/// Return the byte range of the first `<name ...>` in the line.
fn find_open_tag(line: &str) -> Option<(usize, usize)> {
    for (index, _) in line.match_indices('<') {
        let start = index + 1;
        let length = word_length(&line[start..]);
        if length == 0 {
            continue;
        }
        let after = start + length;

        return line[after..].find('>').map(|close| (index, after + close + 1));
    }

    None
}

fn word_length(text: &str) -> usize {
    text.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count()
}

/// Trim the fragment and remove one trailing statement terminator.
pub fn strip_terminator(fragment: &str) -> &str {
    let trimmed = fragment.trim();
    match trimmed.strip_suffix(';') {
        Some(stripped) => stripped.trim_end(),
        None => trimmed,
    }
}

/// Return true if the last line of the fragment holds a `//` comment.
fn ends_in_comment(fragment: &str) -> bool {
    match (fragment.rfind("//"), fragment.rfind('\n')) {
        (Some(comment), Some(newline)) => comment > newline,
        (Some(_), None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{close_tags, escape_literal, output, statement, strip_terminator, switch_case};
    use serde_json::json;

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("a\"b\\c\nd\re"), "a\\\"b\\\\c\\nd\\re");
    }

    #[test]
    fn test_statement_comment_guard() {
        assert_eq!(statement("x = 1"), "; x = 1\n");
        assert_eq!(statement("x = 1 // set"), "; x = 1 // set\n\n");
        assert_eq!(statement("// a\nx = 1"), "; // a\nx = 1\n");
    }

    #[test]
    fn test_output() {
        assert_eq!(output(" name; ", true).unwrap(), "; __append(escape(name));\n");
        assert_eq!(output("name", false).unwrap(), "; __append(name);\n");
        assert_eq!(output("a // note", false).unwrap(), "; __append(a // note\n);\n");
        assert!(output("  ", true).is_none());
        assert!(output(";", false).is_none());
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(" a ; "), "a");
        assert_eq!(strip_terminator("a;;"), "a;");
    }

    #[test]
    fn test_switch_case() {
        assert_eq!(switch_case(&[json!(1), json!("a")], true), "case (1):\ncase (\"a\"):\n");
        assert_eq!(switch_case(&[json!(2)], false), "; break;\ncase (2):\n");
    }

    #[test]
    fn test_close_tags() {
        assert_eq!(close_tags("<ul class=\\\"x\\\"><li>"), "</li></ul>");
        assert_eq!(close_tags("<table>\\n<tr>"), "</tr>\\n</table>");
        assert_eq!(close_tags("<div>text"), "</div>text");
        assert_eq!(close_tags("plain"), "plain");
        assert_eq!(close_tags(""), "");
    }
}
