use super::Marker;
use crate::log::{Error, INVALID_DELIMITERS};
use morel::Syntax;

/// The single character modifiers that follow the begin delimiter (or
/// precede the close delimiter) to select a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Raw output, `=` by default.
    Equal,
    /// Escaped output and trimming close, `-` by default.
    Plain,
    /// Comment, `#` by default.
    Notes,
    /// Loop, and the map iteration prefix, `~` by default.
    Loops,
    /// Conditional, `?` by default.
    Check,
    /// Switch, `:` by default.
    Shift,
}

/// Delimiters that identify directives within templates.
///
/// # Examples
///
/// ```
/// use kiln::{Delimiters, Marker};
///
/// let delimiters = Delimiters::new().with_markers("{{", "}}");
///
/// assert_eq!(delimiters.marker(Marker::BeginOutput), "{{=");
/// assert_eq!(delimiters.marker(Marker::BeginLiteral), "{{{");
/// assert_eq!(delimiters.marker(Marker::CloseTrim), "-}}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    begin: String,
    close: String,
    equal: char,
    plain: char,
    notes: char,
    loops: char,
    check: char,
    shift: char,
}

impl Delimiters {
    /// Create a new [`Delimiters`] with the default markers:
    ///
    /// ```text
    /// Statement: <% ... %>
    /// Output: <%= ... %> (raw) and <%- ... %> (escaped)
    /// Comment: <%# ... %>
    /// Loop: <%~ list <ul> %> ... <%~ %>
    /// Conditional: <%? a %> ... <%? ?b %> ... <%? ? %> ... <%? %>
    /// Switch: <%: a %><%: :1, 2 %> ... <%: : %> ... <%: %>
    /// Literal: <%% ... %>
    /// Trim: -%>
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            begin: "<%".into(),
            close: "%>".into(),
            equal: '=',
            plain: '-',
            notes: '#',
            loops: '~',
            check: '?',
            shift: ':',
        }
    }

    /// Set the begin and close markers.
    #[inline]
    pub fn set_markers(&mut self, begin: &str, close: &str) {
        self.begin = begin.into();
        self.close = close.into();
    }

    /// Set the begin and close markers.
    ///
    /// Returns the [`Delimiters`], so additional methods may be chained.
    #[inline]
    pub fn with_markers(mut self, begin: &str, close: &str) -> Self {
        self.set_markers(begin, close);

        self
    }

    /// Set the character used for the given [`Modifier`].
    pub fn set_modifier(&mut self, modifier: Modifier, character: char) {
        let slot = match modifier {
            Modifier::Equal => &mut self.equal,
            Modifier::Plain => &mut self.plain,
            Modifier::Notes => &mut self.notes,
            Modifier::Loops => &mut self.loops,
            Modifier::Check => &mut self.check,
            Modifier::Shift => &mut self.shift,
        };
        *slot = character;
    }

    /// Set the character used for the given [`Modifier`].
    ///
    /// Returns the [`Delimiters`], so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::{Delimiters, Marker, Modifier};
    ///
    /// let delimiters = Delimiters::new().with_modifier(Modifier::Loops, '@');
    /// assert_eq!(delimiters.marker(Marker::BeginLoop), "<%@");
    /// ```
    #[inline]
    pub fn with_modifier(mut self, modifier: Modifier, character: char) -> Self {
        self.set_modifier(modifier, character);

        self
    }

    /// Return the begin marker.
    #[inline]
    pub fn begin(&self) -> &str {
        &self.begin
    }

    /// Return the close marker.
    #[inline]
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Return the character used for the given [`Modifier`].
    pub fn modifier(&self, modifier: Modifier) -> char {
        match modifier {
            Modifier::Equal => self.equal,
            Modifier::Plain => self.plain,
            Modifier::Notes => self.notes,
            Modifier::Loops => self.loops,
            Modifier::Check => self.check,
            Modifier::Shift => self.shift,
        }
    }

    /// Return the slash character, which is the final character of the
    /// begin marker. Doubling it opens a literal section.
    pub fn slash(&self) -> Option<char> {
        self.begin.chars().last()
    }

    /// Return the text of the given [`Marker`].
    pub fn marker(&self, marker: Marker) -> String {
        let Self { begin, close, .. } = self;
        match marker {
            Marker::BeginLiteral => match self.slash() {
                Some(slash) => format!("{begin}{slash}"),
                None => String::new(),
            },
            Marker::BeginOutput => format!("{begin}{}", self.equal),
            Marker::BeginEscaped => format!("{begin}{}", self.plain),
            Marker::BeginComment => format!("{begin}{}", self.notes),
            Marker::BeginCheck => format!("{begin}{}", self.check),
            Marker::BeginShift => format!("{begin}{}", self.shift),
            Marker::BeginLoop => format!("{begin}{}", self.loops),
            Marker::Begin => begin.clone(),
            Marker::Close => close.clone(),
            Marker::CloseTrim => format!("{}{close}", self.plain),
            Marker::CloseEqual => format!("{}{close}", self.equal),
        }
    }

    /// Ensure the markers are usable.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the begin or close marker is empty or contains
    /// whitespace, or when two of the eleven marker strings are identical.
    pub fn validate(&self) -> Result<(), Error> {
        if self.begin.is_empty() || self.close.is_empty() {
            return Err(Error::build(INVALID_DELIMITERS)
                .with_help("the begin and close markers must not be empty"));
        }
        if self.begin.contains(char::is_whitespace) || self.close.contains(char::is_whitespace) {
            return Err(Error::build(INVALID_DELIMITERS)
                .with_help("the begin and close markers must not contain whitespace"));
        }

        let markers: Vec<String> = Marker::ALL.iter().map(|m| self.marker(*m)).collect();
        for (index, text) in markers.iter().enumerate() {
            if markers[index + 1..].contains(text) {
                return Err(Error::build(INVALID_DELIMITERS)
                    .with_help(format!("marker `{text}` is used for more than one purpose")));
            }
        }

        Ok(())
    }

    /// Return a [`Syntax`] instance containing every marker.
    ///
    /// Markers are registered longest first, so that a more specific marker
    /// wins over a shorter marker which begins at the same position.
    pub fn to_syntax(&self) -> Syntax {
        let mut markers: Vec<(usize, String)> = Marker::ALL
            .iter()
            .map(|marker| ((*marker).into(), self.marker(*marker)))
            .collect();
        markers.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));

        Syntax::new(markers)
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Delimiters, Modifier};
    use crate::syntax::Marker;

    #[test]
    fn test_default_markers() {
        let delimiters = Delimiters::new();
        let markers: Vec<String> = Marker::ALL.iter().map(|m| delimiters.marker(*m)).collect();

        assert_eq!(
            markers,
            vec!["<%%", "<%=", "<%-", "<%#", "<%?", "<%:", "<%~", "<%", "%>", "-%>", "=%>"]
        );
        assert!(delimiters.validate().is_ok());
    }

    #[test]
    fn test_custom_markers() {
        let delimiters = Delimiters::new()
            .with_markers("{{", "}}")
            .with_modifier(Modifier::Check, '!');

        assert_eq!(delimiters.slash(), Some('{'));
        assert_eq!(delimiters.marker(Marker::BeginCheck), "{{!");
        assert_eq!(delimiters.modifier(Modifier::Check), '!');
        assert!(delimiters.validate().is_ok());
    }

    #[test]
    fn test_duplicate_markers() {
        let delimiters = Delimiters::new().with_modifier(Modifier::Check, '=');

        assert!(delimiters.validate().is_err());
    }

    #[test]
    fn test_empty_marker() {
        assert!(Delimiters::new().with_markers("", "%>").validate().is_err());
        assert!(Delimiters::new().with_markers("<%", "% >").validate().is_err());
    }
}
