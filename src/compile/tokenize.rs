use crate::{
    region::Region,
    syntax::{Delimiters, Marker},
};
use morel::Finder;

/// A piece of template text, either plain text or a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Text,
    Marker(Marker),
}

impl Token {
    /// Return true if this is a marker that closes a directive.
    pub fn is_close(self) -> bool {
        matches!(self, Token::Marker(marker) if marker.is_close())
    }
}

/// Splits template text into an alternating sequence of text and
/// [`Marker`] tokens.
pub struct Tokenizer {
    finder: Finder,
}

impl Tokenizer {
    /// Create a new [`Tokenizer`] which recognizes the markers of the given
    /// [`Delimiters`].
    pub fn new(delimiters: &Delimiters) -> Self {
        Self {
            finder: Finder::new(delimiters.to_syntax()),
        }
    }

    /// Return every token in the text, in order.
    ///
    /// Text between markers is emitted only when it is non-empty, so an
    /// empty text produces no tokens at all. Concatenating the regions of the
    /// returned tokens reproduces the input.
    pub fn tokenize(&self, text: &str) -> Vec<(Token, Region)> {
        let mut tokens = vec![];
        let mut cursor = 0;

        while let Some((id, begin, end)) = self.finder.next(text, cursor) {
            if end <= cursor {
                break;
            }
            if begin > cursor {
                tokens.push((Token::Text, (cursor..begin).into()));
            }
            tokens.push((Token::Marker(Marker::from(id)), (begin..end).into()));
            cursor = end;
        }
        if cursor < text.len() {
            tokens.push((Token::Text, (cursor..text.len()).into()));
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::{Token, Tokenizer};
    use crate::syntax::{Delimiters, Marker};

    fn texts(text: &str) -> Vec<&str> {
        Tokenizer::new(&Delimiters::new())
            .tokenize(text)
            .into_iter()
            .map(|(_, region)| &text[region])
            .collect()
    }

    #[test]
    fn test_empty() {
        assert!(Tokenizer::new(&Delimiters::new()).tokenize("").is_empty());
    }

    #[test]
    fn test_text_only() {
        let tokens = Tokenizer::new(&Delimiters::new()).tokenize("hello");
        assert_eq!(tokens, vec![(Token::Text, (0..5).into())]);
    }

    #[test]
    fn test_longest_marker_wins() {
        let text = "a<%= x -%>b<%% c %>";
        assert_eq!(texts(text), vec!["a", "<%=", " x ", "-%>", "b", "<%%", " c ", "%>"]);

        let tokens = Tokenizer::new(&Delimiters::new()).tokenize(text);
        assert_eq!(tokens[1].0, Token::Marker(Marker::BeginOutput));
        assert_eq!(tokens[3].0, Token::Marker(Marker::CloseTrim));
        assert_eq!(tokens[5].0, Token::Marker(Marker::BeginLiteral));
        assert!(tokens[7].0.is_close());
    }

    #[test]
    fn test_adjacent_markers() {
        assert_eq!(texts("<%%>"), vec!["<%%", ">"]);
        assert_eq!(texts("<%-%>"), vec!["<%-", "%>"]);
    }

    #[test]
    fn test_custom_markers() {
        let delimiters = Delimiters::new().with_markers("{{", "}}");
        let text = "x{{= y }}z";
        let tokens = Tokenizer::new(&delimiters).tokenize(text);

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].0, Token::Marker(Marker::BeginOutput));
        assert_eq!(&text[tokens[2].1], " y ");
    }
}
