use super::token::{Keyword, Operator, Token};
use crate::{
    log::{Error, INVALID_SYNTAX},
    region::Region,
};

pub type TokenResult = Result<Option<(Token, Region)>, Error>;

/// Provides methods to read render-script source as [`Token`] instances.
///
/// Whitespace and comments are skipped.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    cursor: usize,
}

impl<'source> Lexer<'source> {
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Return the next [`Token`] and [`Region`], or None at the end of the
    /// source.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unrecognized character, an undelimited
    /// string or an unterminated comment is found.
    pub fn next(&mut self) -> TokenResult {
        self.skip_trivia()?;

        let from = self.cursor;
        let rest = &self.source[from..];
        let Some(char) = rest.chars().next() else {
            return Ok(None);
        };

        let (token, length) = match char {
            '(' => (Token::LeftParen, 1),
            ')' => (Token::RightParen, 1),
            '{' => (Token::LeftBrace, 1),
            '}' => (Token::RightBrace, 1),
            '[' => (Token::LeftBracket, 1),
            ']' => (Token::RightBracket, 1),
            ',' => (Token::Comma, 1),
            ';' => (Token::Semicolon, 1),
            ':' => (Token::Colon, 1),
            '.' => (Token::Period, 1),
            '?' => (Token::Question, 1),
            '+' => (Token::Operator(Operator::Add), 1),
            '-' => (Token::Operator(Operator::Subtract), 1),
            '*' => (Token::Operator(Operator::Multiply), 1),
            '/' => (Token::Operator(Operator::Divide), 1),
            '%' => (Token::Operator(Operator::Remainder), 1),
            '=' | '!' | '<' | '>' | '&' | '|' => self.lex_operator(rest, from)?,
            '"' | '\'' => (Token::String, self.lex_string(rest, from, char)?),
            c if c.is_ascii_digit() => (Token::Number, lex_number(rest)),
            c if is_ident_start(c) => return Ok(Some(self.lex_ident_or_keyword(rest, from))),
            c => {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(self.source, from..from + c.len_utf8())
                    .with_help(format!("unexpected character `{c}`")))
            }
        };
        self.cursor = from + length;

        Ok(Some((token, (from..from + length).into())))
    }

    /// Move the cursor past whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            let rest = &self.source[self.cursor..];
            let trimmed = rest.trim_start();
            self.cursor += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                self.cursor = match trimmed.find('\n') {
                    Some(newline) => self.cursor + newline + 1,
                    None => self.source.len(),
                };
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.cursor += end + 4,
                    None => {
                        return Err(Error::build(INVALID_SYNTAX)
                            .with_pointer(self.source, self.cursor..self.cursor + 2)
                            .with_help("this comment is never closed, close it with `*/`"))
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    /// Return the operator at the start of `rest`, and its length.
    ///
    /// All of these are recognized:
    ///
    /// `===`, `!==`, `==`, `!=`, `>=`, `<=`, `&&`, `||`, `=`, `!`, `<`, `>`
    fn lex_operator(&self, rest: &str, from: usize) -> Result<(Token, usize), Error> {
        let candidates = [
            ("===", Token::Operator(Operator::Equal)),
            ("!==", Token::Operator(Operator::NotEqual)),
            ("==", Token::Operator(Operator::Equal)),
            ("!=", Token::Operator(Operator::NotEqual)),
            (">=", Token::Operator(Operator::GreaterOrEqual)),
            ("<=", Token::Operator(Operator::LesserOrEqual)),
            ("&&", Token::Operator(Operator::And)),
            ("||", Token::Operator(Operator::Or)),
            ("=", Token::Assign),
            ("!", Token::Exclamation),
            (">", Token::Operator(Operator::Greater)),
            ("<", Token::Operator(Operator::Lesser)),
        ];

        candidates
            .into_iter()
            .find(|(text, _)| rest.starts_with(text))
            .map(|(text, token)| (token, text.len()))
            .ok_or_else(|| {
                Error::build(INVALID_SYNTAX)
                    .with_pointer(self.source, from..from + 1)
                    .with_help("expected `&&` or `||`")
            })
    }

    /// Return the length of the string literal at the start of `rest`,
    /// including both quotes.
    fn lex_string(&self, rest: &str, from: usize, quote: char) -> Result<usize, Error> {
        let mut escaped = false;
        for (index, char) in rest.char_indices().skip(1) {
            match char {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                c if c == quote => return Ok(index + 1),
                _ => {}
            }
        }

        Err(Error::build(INVALID_SYNTAX)
            .with_pointer(self.source, from..from + 1)
            .with_help(format!(
                "this might be an undelimited string, try closing it with `{quote}`"
            )))
    }

    /// Return an identifier or keyword [`Token`] read from the start of
    /// `rest`.
    fn lex_ident_or_keyword(&mut self, rest: &str, from: usize) -> (Token, Region) {
        let length = rest
            .char_indices()
            .find(|(_, c)| !is_ident_continue(*c))
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        let to = from + length;
        self.cursor = to;

        let token = match Keyword::from_text(&rest[..length]) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier,
        };

        (token, (from..to).into())
    }
}

/// Return the length of the number at the start of `rest`.
///
/// Digits may be followed by a fraction and an exponent, as in `1.5e-3`.
fn lex_number(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let digits = |from: usize| {
        from + bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut length = digits(0);
    if bytes.get(length) == Some(&b'.') && bytes.get(length + 1).is_some_and(u8::is_ascii_digit) {
        length = digits(length + 1);
    }
    if matches!(bytes.get(length), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(length + 1), Some(b'+' | b'-')));
        if bytes.get(length + 1 + sign).is_some_and(u8::is_ascii_digit) {
            length = digits(length + 1 + sign);
        }
    }

    length
}

/// Return true if the given character may begin an identifier, meaning `_`,
/// `$` or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character may continue an identifier, meaning
/// `$` or an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}
