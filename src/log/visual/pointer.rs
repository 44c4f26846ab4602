use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_line_and_offset, get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};
use crate::region::Region;

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    line: usize,
    /// The display column that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    column: usize,
    /// The display width of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Pointer over the given source text and Region.
    pub fn new(source: &str, region: Region) -> Self {
        let (line, offset) = get_line_and_offset(source, region.begin);
        let text = source.split('\n').nth(line).unwrap_or_default();
        let column = get_width(text.get(..offset).unwrap_or(text));

        // Highlight no further than the end of the line being shown.
        let highlighted = region.literal(source).split('\n').next().unwrap_or_default();
        let length = max(1, get_width(highlighted));

        Self {
            line,
            column,
            length,
            text: text.trim_end_matches('\r').to_string(),
        }
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = get_width(&num);
        let align = self.column + self.length;

        let extra = "-".repeat(3_usize.saturating_sub(self.length));
        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}{extra}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;
    use crate::region::Region;

    #[test]
    fn test_pointer_second_line() {
        let pointer = Pointer::new("<% if (a) { %>\n<%= b %>", Region::new(16..19));

        assert_eq!(pointer.line, 1);
        assert_eq!(pointer.column, 1);
        assert_eq!(pointer.length, 3);
        assert_eq!(pointer.text, "<%= b %>");
    }

    #[test]
    fn test_pointer_end_of_source() {
        let source = "abc";
        let pointer = Pointer::new(source, Region::new(3..3));

        assert_eq!(pointer.line, 0);
        assert_eq!(pointer.column, 3);
        assert_eq!(pointer.length, 1);
    }

    #[test]
    fn test_pointer_empty_source() {
        let pointer = Pointer::new("", Region::new(0..0));

        assert_eq!(pointer.text, "");
    }
}
