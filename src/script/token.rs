use std::fmt::Display;

/// Tokens of render-script source.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    Identifier,
    Number,
    String,
    Keyword(Keyword),
    Operator(Operator),
    /// =
    Assign,
    /// !
    Exclamation,
    /// ?
    Question,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// :
    Colon,
    /// .
    Period,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Identifier => write!(f, "identifier"),
            Token::Number => write!(f, "number"),
            Token::String => write!(f, "string"),
            Token::Keyword(keyword) => write!(f, "`{keyword}`"),
            Token::Operator(operator) => write!(f, "`{operator}`"),
            Token::Assign => write!(f, "`=`"),
            Token::Exclamation => write!(f, "`!`"),
            Token::Question => write!(f, "`?`"),
            Token::LeftParen => write!(f, "`(`"),
            Token::RightParen => write!(f, "`)`"),
            Token::LeftBrace => write!(f, "`{{`"),
            Token::RightBrace => write!(f, "`}}`"),
            Token::LeftBracket => write!(f, "`[`"),
            Token::RightBracket => write!(f, "`]`"),
            Token::Comma => write!(f, "`,`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Colon => write!(f, "`:`"),
            Token::Period => write!(f, "`.`"),
        }
    }
}

/// Keywords recognized by the Lexer and Parser.
///
/// `in` and `of` are only meaningful inside a `for` header, and are read as
/// identifiers everywhere else.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    Let,
    If,
    Else,
    Switch,
    Case,
    Default,
    Break,
    For,
    With,
    Try,
    Catch,
    True,
    False,
    Null,
    This,
}

impl Keyword {
    /// Return the keyword spelled by the given text, if any.
    pub fn from_text(text: &str) -> Option<Self> {
        let keyword = match text {
            "let" | "var" | "const" => Keyword::Let,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "switch" => Keyword::Switch,
            "case" => Keyword::Case,
            "default" => Keyword::Default,
            "break" => Keyword::Break,
            "for" => Keyword::For,
            "with" => Keyword::With,
            "try" => Keyword::Try,
            "catch" => Keyword::Catch,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" | "undefined" => Keyword::Null,
            "this" => Keyword::This,
            _ => return None,
        };

        Some(keyword)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::Let => write!(f, "let"),
            Keyword::If => write!(f, "if"),
            Keyword::Else => write!(f, "else"),
            Keyword::Switch => write!(f, "switch"),
            Keyword::Case => write!(f, "case"),
            Keyword::Default => write!(f, "default"),
            Keyword::Break => write!(f, "break"),
            Keyword::For => write!(f, "for"),
            Keyword::With => write!(f, "with"),
            Keyword::Try => write!(f, "try"),
            Keyword::Catch => write!(f, "catch"),
            Keyword::True => write!(f, "true"),
            Keyword::False => write!(f, "false"),
            Keyword::Null => write!(f, "null"),
            Keyword::This => write!(f, "this"),
        }
    }
}

/// Binary operators recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Operator {
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// %
    Remainder,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// >
    Greater,
    /// <
    Lesser,
    /// >=
    GreaterOrEqual,
    /// <=
    LesserOrEqual,
    /// &&
    And,
    /// ||
    Or,
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Subtract => write!(f, "-"),
            Operator::Multiply => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::Remainder => write!(f, "%"),
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::Greater => write!(f, ">"),
            Operator::Lesser => write!(f, "<"),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::LesserOrEqual => write!(f, "<="),
            Operator::And => write!(f, "&&"),
            Operator::Or => write!(f, "||"),
        }
    }
}
