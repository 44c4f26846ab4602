use super::{
    lexer::{Lexer, TokenResult},
    token::{Keyword, Operator, Token},
    tree::{Arm, Expression, Iteration, Label, Program, Statement, Unary},
};
use crate::{
    log::{error_eof, expected, Error, INVALID_SYNTAX},
    region::Region,
};
use serde_json::{Number, Value};
use std::str::Chars;

type LexResultMust = Result<(Token, Region), Error>;

/// Parses render-script source into a [`Program`].
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    /// Token read ahead by `peek`, which is returned by the following `next`.
    buffer: Option<Option<(Token, Region)>>,
    /// Number of enclosing loops and switches, where `break` is allowed.
    breakable: usize,
}

impl<'source> Parser<'source> {
    /// Create a new [`Parser`] over the given source.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            buffer: None,
            breakable: 0,
        }
    }

    /// Parse the whole source.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] with a pointer to the offending token when the
    /// source is not valid.
    pub fn parse(mut self) -> Result<Program, Error> {
        let mut body = vec![];
        while self.peek()?.is_some() {
            if let Some(statement) = self.parse_statement()? {
                body.push(statement);
            }
        }

        Ok(Program { body })
    }

    /// Parse a single statement, returning None for an empty statement.
    fn parse_statement(&mut self) -> Result<Option<Statement>, Error> {
        let (token, region) = self.peek_must()?;
        let statement = match token {
            Token::Semicolon => {
                self.next()?;
                return Ok(None);
            }
            Token::LeftBrace => Statement::Block(self.parse_block()?),
            Token::Keyword(Keyword::Let) => self.parse_let()?,
            Token::Keyword(Keyword::If) => self.parse_if()?,
            Token::Keyword(Keyword::Switch) => self.parse_switch()?,
            Token::Keyword(Keyword::For) => self.parse_for()?,
            Token::Keyword(Keyword::With) => self.parse_with()?,
            Token::Keyword(Keyword::Try) => self.parse_try()?,
            Token::Keyword(Keyword::Break) => {
                self.next()?;
                if self.breakable == 0 {
                    return Err(Error::build(INVALID_SYNTAX)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`break` must be placed inside a loop or switch"));
                }
                self.skip_semicolon()?;
                Statement::Break
            }
            Token::Keyword(
                keyword @ (Keyword::Else | Keyword::Case | Keyword::Default | Keyword::Catch),
            ) => {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(self.lexer.source, region)
                    .with_help(format!("`{keyword}` is not expected here")))
            }
            _ => {
                let expression = self.parse_expression()?;
                self.skip_semicolon()?;
                Statement::Expression(expression)
            }
        };

        Ok(Some(statement))
    }

    /// Parse the statement which forms the body of a conditional or loop.
    fn parse_body(&mut self) -> Result<Statement, Error> {
        Ok(self
            .parse_statement()?
            .unwrap_or(Statement::Block(vec![])))
    }

    /// Parse the statements between braces.
    fn parse_block(&mut self) -> Result<Vec<Statement>, Error> {
        self.next_must(Token::LeftBrace)?;

        let mut statements = vec![];
        while !self.next_is(Token::RightBrace)? {
            if let Some(statement) = self.parse_statement()? {
                statements.push(statement);
            }
        }
        self.next()?;

        Ok(statements)
    }

    /// Parse a declaration such as `let a = 1, b;`.
    fn parse_let(&mut self) -> Result<Statement, Error> {
        self.next()?;

        let mut declarations = vec![];
        loop {
            let name = self.parse_identifier()?;
            let value = if self.next_is(Token::Assign)? {
                self.next()?;
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarations.push((name, value));

            if !self.next_is(Token::Comma)? {
                break;
            }
            self.next()?;
        }
        self.skip_semicolon()?;

        Ok(Statement::Let(declarations))
    }

    fn parse_if(&mut self) -> Result<Statement, Error> {
        self.next()?;
        let test = self.parse_parenthesized()?;
        let then = Box::new(self.parse_body()?);
        let otherwise = if self.next_is(Token::Keyword(Keyword::Else))? {
            self.next()?;
            Some(Box::new(self.parse_body()?))
        } else {
            None
        };

        Ok(Statement::If {
            test,
            then,
            otherwise,
        })
    }

    /// Parse a switch, grouping consecutive labels into a single [`Arm`].
    fn parse_switch(&mut self) -> Result<Statement, Error> {
        self.next()?;
        let subject = self.parse_parenthesized()?;
        self.next_must(Token::LeftBrace)?;
        self.breakable += 1;

        let mut arms: Vec<Arm> = vec![];
        loop {
            let (token, region) = self.peek_must()?;
            let label = match token {
                Token::RightBrace => {
                    self.next()?;
                    break;
                }
                Token::Keyword(Keyword::Case) => {
                    self.next()?;
                    let test = self.parse_expression()?;
                    self.next_must(Token::Colon)?;
                    Label::Case(test)
                }
                Token::Keyword(Keyword::Default) => {
                    self.next()?;
                    self.next_must(Token::Colon)?;
                    Label::Default
                }
                _ => {
                    let Some(statement) = self.parse_statement()? else {
                        continue;
                    };
                    match arms.last_mut() {
                        Some(arm) => arm.body.push(statement),
                        None => {
                            return Err(Error::build(INVALID_SYNTAX)
                                .with_pointer(self.lexer.source, region)
                                .with_help("statements in a switch must follow a `case` or `default` label"))
                        }
                    }
                    continue;
                }
            };

            match arms.last_mut() {
                Some(arm) if arm.body.is_empty() => arm.labels.push(label),
                _ => arms.push(Arm {
                    labels: vec![label],
                    body: vec![],
                }),
            }
        }
        self.breakable -= 1;

        Ok(Statement::Switch { subject, arms })
    }

    /// Parse a loop such as `for (index, value of list)` or `for (key in map)`.
    fn parse_for(&mut self) -> Result<Statement, Error> {
        self.next()?;
        self.next_must(Token::LeftParen)?;

        let first = self.parse_identifier()?;
        let second = if self.next_is(Token::Comma)? {
            self.next()?;
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let (token, region) = self.next_any_must()?;
        let iteration = match (token, &self.lexer.source[region]) {
            (Token::Identifier, "of") => Iteration::Of,
            (Token::Identifier, "in") => Iteration::In,
            _ => {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(self.lexer.source, region)
                    .with_help(expected("`of` or `in`", token)))
            }
        };
        let collection = self.parse_expression()?;
        self.next_must(Token::RightParen)?;

        self.breakable += 1;
        let body = Box::new(self.parse_body()?);
        self.breakable -= 1;

        let (key, value) = match (second, iteration) {
            (Some(value), _) => (Some(first), Some(value)),
            (None, Iteration::Of) => (None, Some(first)),
            (None, Iteration::In) => (Some(first), None),
        };

        Ok(Statement::For {
            iteration,
            key,
            value,
            collection,
            body,
        })
    }

    fn parse_with(&mut self) -> Result<Statement, Error> {
        self.next()?;
        let object = self.parse_parenthesized()?;
        let body = Box::new(self.parse_body()?);

        Ok(Statement::With { object, body })
    }

    fn parse_try(&mut self) -> Result<Statement, Error> {
        self.next()?;
        let body = self.parse_block()?;
        self.next_must(Token::Keyword(Keyword::Catch))?;
        self.next_must(Token::LeftParen)?;
        let binding = self.parse_identifier()?;
        self.next_must(Token::RightParen)?;
        let handler = self.parse_block()?;

        Ok(Statement::Try {
            body,
            binding,
            handler,
        })
    }

    fn parse_parenthesized(&mut self) -> Result<Expression, Error> {
        self.next_must(Token::LeftParen)?;
        let expression = self.parse_expression()?;
        self.next_must(Token::RightParen)?;

        Ok(expression)
    }

    /// Parse an expression, including assignments.
    fn parse_expression(&mut self) -> Result<Expression, Error> {
        let (_, region) = self.peek_must()?;
        let target = self.parse_conditional()?;

        if !self.next_is(Token::Assign)? {
            return Ok(target);
        }
        self.next()?;
        if !matches!(
            target,
            Expression::Identifier(_) | Expression::Member(..) | Expression::Index(..)
        ) {
            return Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, region)
                .with_help("only a name, member or index may be assigned to"));
        }
        let value = self.parse_expression()?;

        Ok(Expression::Assign(Box::new(target), Box::new(value)))
    }

    fn parse_conditional(&mut self) -> Result<Expression, Error> {
        let test = self.parse_binary(0)?;
        if !self.next_is(Token::Question)? {
            return Ok(test);
        }
        self.next()?;
        let then = self.parse_expression()?;
        self.next_must(Token::Colon)?;
        let otherwise = self.parse_expression()?;

        Ok(Expression::Conditional(
            Box::new(test),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    /// Parse binary operations which bind tighter than `minimum`.
    fn parse_binary(&mut self, minimum: u8) -> Result<Expression, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let operator = match self.peek()? {
                Some((Token::Operator(operator), _)) if precedence(operator) > minimum => operator,
                _ => break,
            };
            self.next()?;
            let right = self.parse_binary(precedence(operator))?;
            left = Expression::Binary(Box::new(left), operator, Box::new(right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, Error> {
        let unary = match self.peek()? {
            Some((Token::Exclamation, _)) => Unary::Not,
            Some((Token::Operator(Operator::Subtract), _)) => Unary::Negate,
            _ => return self.parse_postfix(),
        };
        self.next()?;

        Ok(Expression::Unary(unary, Box::new(self.parse_unary()?)))
    }

    /// Parse member access, indexing and calls following a primary expression.
    fn parse_postfix(&mut self) -> Result<Expression, Error> {
        let mut expression = self.parse_primary()?;
        loop {
            match self.peek()? {
                Some((Token::Period, _)) => {
                    self.next()?;
                    let name = match self.next_any_must()? {
                        (Token::Identifier | Token::Keyword(_), region) => {
                            self.lexer.source[region].to_owned()
                        }
                        (token, region) => {
                            return Err(Error::build(INVALID_SYNTAX)
                                .with_pointer(self.lexer.source, region)
                                .with_help(expected("a member name", token)))
                        }
                    };
                    expression = Expression::Member(Box::new(expression), name);
                }
                Some((Token::LeftBracket, _)) => {
                    self.next()?;
                    let index = self.parse_expression()?;
                    self.next_must(Token::RightBracket)?;
                    expression = Expression::Index(Box::new(expression), Box::new(index));
                }
                Some((Token::LeftParen, region)) => {
                    let Expression::Identifier(name) = expression else {
                        return Err(Error::build(INVALID_SYNTAX)
                            .with_pointer(self.lexer.source, region)
                            .with_help("only functions such as `escape` or `include` may be called"));
                    };
                    self.next()?;
                    let arguments = self.parse_list(Token::RightParen)?;
                    expression = Expression::Call(name, arguments);
                }
                _ => break,
            }
        }

        Ok(expression)
    }

    fn parse_primary(&mut self) -> Result<Expression, Error> {
        let (token, region) = self.next_any_must()?;
        let expression = match token {
            Token::Number => Expression::Literal(self.parse_number(region)?),
            Token::String => Expression::Literal(Value::String(self.parse_string(region)?)),
            Token::Keyword(Keyword::True) => Expression::Literal(Value::Bool(true)),
            Token::Keyword(Keyword::False) => Expression::Literal(Value::Bool(false)),
            Token::Keyword(Keyword::Null) => Expression::Literal(Value::Null),
            Token::Keyword(Keyword::This) => Expression::This,
            Token::Identifier => Expression::Identifier(self.lexer.source[region].to_owned()),
            Token::LeftParen => {
                let expression = self.parse_expression()?;
                self.next_must(Token::RightParen)?;
                expression
            }
            Token::LeftBracket => Expression::Array(self.parse_list(Token::RightBracket)?),
            Token::LeftBrace => Expression::Object(self.parse_object()?),
            token => {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(self.lexer.source, region)
                    .with_help(expected("an expression", token)))
            }
        };

        Ok(expression)
    }

    /// Parse comma separated expressions up to the closing token, which
    /// is consumed.
    fn parse_list(&mut self, close: Token) -> Result<Vec<Expression>, Error> {
        let mut items = vec![];
        loop {
            if self.next_is(close)? {
                self.next()?;
                break;
            }
            items.push(self.parse_expression()?);
            if self.next_is(Token::Comma)? {
                self.next()?;
            } else {
                self.next_must(close)?;
                break;
            }
        }

        Ok(items)
    }

    /// Parse the entries of an object literal, after the opening brace.
    fn parse_object(&mut self) -> Result<Vec<(String, Expression)>, Error> {
        let mut entries = vec![];
        loop {
            let key = match self.next_any_must()? {
                (Token::RightBrace, _) => break,
                (Token::Identifier | Token::Keyword(_) | Token::Number, region) => {
                    self.lexer.source[region].to_owned()
                }
                (Token::String, region) => self.parse_string(region)?,
                (token, region) => {
                    return Err(Error::build(INVALID_SYNTAX)
                        .with_pointer(self.lexer.source, region)
                        .with_help(expected("a key", token)))
                }
            };
            self.next_must(Token::Colon)?;
            entries.push((key, self.parse_expression()?));

            if self.next_is(Token::Comma)? {
                self.next()?;
            } else {
                self.next_must(Token::RightBrace)?;
                break;
            }
        }

        Ok(entries)
    }

    fn parse_identifier(&mut self) -> Result<String, Error> {
        match self.next_any_must()? {
            (Token::Identifier, region) => Ok(self.lexer.source[region].to_owned()),
            (token, region) => Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, region)
                .with_help(expected("a name", token))),
        }
    }

    /// Parse a String from the literal value of the given Region.
    ///
    /// Supports the escapes of JSON strings, along with `\'`, `\v`, `\0` and
    /// line continuations. Any other escaped character stands for itself.
    ///
    /// # Errors
    ///
    /// Returns an error if a `\u` escape is not followed by four hex digits.
    fn parse_string(&self, region: Region) -> Result<String, Error> {
        let window = &self.lexer.source[region];
        let inner = &window[1..window.len() - 1];
        if !inner.contains('\\') {
            return Ok(inner.to_owned());
        }

        let mut string = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }
            let c = match chars.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('b') => '\u{8}',
                Some('f') => '\u{c}',
                Some('v') => '\u{b}',
                Some('0') => '\0',
                Some('\n') => continue,
                Some('u') => self.parse_unicode(&mut chars, region)?,
                Some(other) => other,
                None => break,
            };
            string.push(c);
        }

        Ok(string)
    }

    /// Parse the code point of a `\u` escape, combining surrogate pairs.
    fn parse_unicode(&self, chars: &mut Chars, region: Region) -> Result<char, Error> {
        let code = self.parse_hex(chars, region)?;

        if (0xD800..0xDC00).contains(&code) {
            let mut lookahead = chars.clone();
            if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                let low = self.parse_hex(&mut lookahead, region)?;
                if (0xDC00..0xE000).contains(&low) {
                    *chars = lookahead;
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
        }

        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_hex(&self, chars: &mut Chars, region: Region) -> Result<u32, Error> {
        let digits: String = chars.take(4).collect();
        match u32::from_str_radix(&digits, 16) {
            Ok(code) if digits.len() == 4 => Ok(code),
            _ => Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, region)
                .with_help("a `\\u` escape must be followed by four hex digits")),
        }
    }

    /// Parse a number, whole numbers without a fraction or exponent become
    /// integers.
    fn parse_number(&self, region: Region) -> Result<Value, Error> {
        let window = &self.lexer.source[region];
        if !window.contains(|c| matches!(c, '.' | 'e' | 'E')) {
            if let Ok(integer) = window.parse::<i64>() {
                return Ok(Value::from(integer));
            }
        }

        window
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                Error::build(INVALID_SYNTAX)
                    .with_pointer(self.lexer.source, region)
                    .with_help("unrecognizable number")
            })
    }

    fn skip_semicolon(&mut self) -> Result<(), Error> {
        if self.next_is(Token::Semicolon)? {
            self.next()?;
        }

        Ok(())
    }

    /// Peek the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Lexer.
    fn peek(&mut self) -> TokenResult {
        match self.buffer {
            Some(buffered) => Ok(buffered),
            None => {
                let next = self.lexer.next()?;
                self.buffer = Some(next);

                Ok(next)
            }
        }
    }

    /// Peek the next token, which must exist.
    fn peek_must(&mut self) -> LexResultMust {
        self.peek()?.ok_or_else(|| error_eof(self.lexer.source))
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the lexer when the buffer is empty.
    fn next(&mut self) -> TokenResult {
        match self.buffer.take() {
            Some(t) => Ok(t),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self.peek()?.is_some_and(|(token, _)| token == expect))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given token,
    /// or when there are no tokens left.
    fn next_must(&mut self, expect: Token) -> LexResultMust {
        match self.next()? {
            Some((token, region)) if token == expect => Ok((token, region)),
            Some((token, region)) => Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, region)
                .with_help(expected(expect, token))),
            None => Err(error_eof(self.lexer.source).with_help(format!("expected {expect}"))),
        }
    }

    /// Get the next token, which must exist.
    fn next_any_must(&mut self) -> LexResultMust {
        self.next()?.ok_or_else(|| error_eof(self.lexer.source))
    }
}

/// Return the binding power of a binary operator, higher binds tighter.
fn precedence(operator: Operator) -> u8 {
    match operator {
        Operator::Or => 1,
        Operator::And => 2,
        Operator::Equal | Operator::NotEqual => 3,
        Operator::Greater
        | Operator::Lesser
        | Operator::GreaterOrEqual
        | Operator::LesserOrEqual => 4,
        Operator::Add | Operator::Subtract => 5,
        Operator::Multiply | Operator::Divide | Operator::Remainder => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        log::INVALID_SYNTAX,
        script::{
            token::Operator,
            tree::{Expression, Iteration, Label, Statement},
        },
    };
    use serde_json::json;

    fn expression(source: &str) -> Expression {
        match Parser::new(source).parse().unwrap().body.remove(0) {
            Statement::Expression(expression) => expression,
            statement => panic!("expected an expression, found {statement:?}"),
        }
    }

    fn identifier(name: &str) -> Box<Expression> {
        Box::new(Expression::Identifier(name.into()))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            expression("a + b * c == d"),
            Expression::Binary(
                Box::new(Expression::Binary(
                    identifier("a"),
                    Operator::Add,
                    Box::new(Expression::Binary(identifier("b"), Operator::Multiply, identifier("c")))
                )),
                Operator::Equal,
                identifier("d")
            )
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            expression("a - b - c"),
            Expression::Binary(
                Box::new(Expression::Binary(identifier("a"), Operator::Subtract, identifier("b"))),
                Operator::Subtract,
                identifier("c")
            )
        );
    }

    #[test]
    fn test_postfix_and_call() {
        assert_eq!(
            expression("escape(user.name[0])"),
            Expression::Call(
                "escape".into(),
                vec![Expression::Index(
                    Box::new(Expression::Member(identifier("user"), "name".into())),
                    Box::new(Expression::Literal(json!(0)))
                )]
            )
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            expression(r#"[1, 2.5, "aé😀", true, null, {b: 'c', "d e": 1}]"#),
            Expression::Array(vec![
                Expression::Literal(json!(1)),
                Expression::Literal(json!(2.5)),
                Expression::Literal(json!("aé😀")),
                Expression::Literal(json!(true)),
                Expression::Literal(json!(null)),
                Expression::Object(vec![
                    ("b".into(), Expression::Literal(json!("c"))),
                    ("d e".into(), Expression::Literal(json!(1))),
                ]),
            ])
        );
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            expression("a.b = c = 1"),
            Expression::Assign(
                Box::new(Expression::Member(identifier("a"), "b".into())),
                Box::new(Expression::Assign(
                    identifier("c"),
                    Box::new(Expression::Literal(json!(1)))
                ))
            )
        );
        assert!(Parser::new("1 = 2").parse().is_err());
    }

    #[test]
    fn test_generated_conditional() {
        let program = Parser::new("; if (a) {\n; __append(\"x\");\n; } else if (b) {\n; } else {\n; }\n")
            .parse()
            .unwrap();

        assert_eq!(program.body.len(), 1);
        let Statement::If { otherwise: Some(otherwise), .. } = &program.body[0] else {
            panic!("expected an if statement");
        };
        assert!(matches!(**otherwise, Statement::If { otherwise: Some(_), .. }));
    }

    #[test]
    fn test_generated_switch() {
        let program = Parser::new(
            "; switch (k) {\ncase (1):\ncase (2):\n; __append(\"a\");\n; break;\ndefault:\n; break;\n; }\n",
        )
        .parse()
        .unwrap();

        let Statement::Switch { arms, .. } = &program.body[0] else {
            panic!("expected a switch statement");
        };
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].labels.len(), 2);
        assert_eq!(arms[0].body.len(), 2);
        assert_eq!(arms[1].labels, vec![Label::Default]);
    }

    #[test]
    fn test_generated_loop() {
        let program = Parser::new(
            "; {\n; let $array = (items), $length = len($array), $index = 0, $value = null;\n\
            ; for ($index, $value of $array) {\n; with ($value) {\n; }\n; }\n; }\n",
        )
        .parse()
        .unwrap();

        let Statement::Block(block) = &program.body[0] else {
            panic!("expected a block");
        };
        assert!(matches!(block[0], Statement::Let(ref declarations) if declarations.len() == 4));
        assert!(matches!(
            block[1],
            Statement::For { iteration: Iteration::Of, key: Some(_), value: Some(_), .. }
        ));
    }

    #[test]
    fn test_generated_harness() {
        let source = "let __line = 1, __lines = \"a\", __filename = null;\n\
            try {\n; __line = 2\n} catch (__error) {\n\
            rethrow(__error, __lines, __filename, __line);\n}\n";

        assert!(Parser::new(source).parse().is_ok());
    }

    #[test]
    fn test_break_outside() {
        let error = Parser::new("; break;").parse().unwrap_err();
        assert_eq!(error.reason(), INVALID_SYNTAX);
    }

    #[test]
    fn test_statement_before_case() {
        assert!(Parser::new("switch (a) { x; case (1): }").parse().is_err());
        assert!(Parser::new("switch (a) { ; case (1): }").parse().is_ok());
    }

    #[test]
    fn test_unclosed() {
        assert!(Parser::new("; if (a) {").parse().is_err());
        assert!(Parser::new("; __append(a").parse().is_err());
        assert!(Parser::new("a.b(c)").parse().is_err());
    }
}
