mod pointer;

pub use pointer::Pointer;

use std::fmt::{Debug, Formatter, Result};

const BLANK: &str = "";
const PIPE: &str = "|";
const EQUAL: &str = "=";
const HIGHLIGHT: &str = "^";

/// Describes a type that can be associated with an Error and used
/// to print a visualization.
pub trait Visual: Debug + Send + Sync {
    /// Display the visualization by writing to the given Formatter.
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result;
}

/// Get the zero indexed line and byte offset within that line for the
/// given byte offset into `source`.
fn get_line_and_offset(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count();
    let line_begin = before.rfind('\n').map(|index| index + 1).unwrap_or(0);

    (line, offset - line_begin)
}

/// Wrapper for UnicodeWidthStr::width.
fn get_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::{get_line_and_offset, get_width};

    #[test]
    fn test_line_and_offset() {
        let source = "one\ntwo\nthree";

        assert_eq!(get_line_and_offset(source, 0), (0, 0));
        assert_eq!(get_line_and_offset(source, 5), (1, 1));
        assert_eq!(get_line_and_offset(source, 8), (2, 0));
        assert_eq!(get_line_and_offset(source, 100), (2, 5));
    }

    #[test]
    fn test_width() {
        assert_eq!(get_width("abc"), 3);
        assert_eq!(get_width("日本"), 4);
    }
}
