use super::token::Operator;
use serde_json::Value;

/// A parsed render-script program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let a = 1, b;`
    Let(Vec<(String, Option<Expression>)>),
    /// An expression evaluated for its effect, such as a call or assignment.
    Expression(Expression),
    /// `{ ... }`, which opens a new scope.
    Block(Vec<Statement>),
    If {
        test: Expression,
        then: Box<Statement>,
        otherwise: Option<Box<Statement>>,
    },
    Switch {
        subject: Expression,
        arms: Vec<Arm>,
    },
    For {
        iteration: Iteration,
        /// The index or key binding.
        key: Option<String>,
        /// The value binding.
        value: Option<String>,
        collection: Expression,
        body: Box<Statement>,
    },
    /// `with (object) body`, which makes the keys of the object available
    /// as bare identifiers within the body.
    With {
        object: Expression,
        body: Box<Statement>,
    },
    Try {
        body: Vec<Statement>,
        binding: String,
        handler: Vec<Statement>,
    },
    Break,
}

/// A group of switch labels and the statements that follow them.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    pub labels: Vec<Label>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Case(Expression),
    Default,
}

/// How a `for` loop walks its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// `for (index, value of list)`, over the elements of a list or the
    /// characters of a string.
    Of,
    /// `for (key, value in map)`, over the entries of a map or the elements
    /// of a list.
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Array(Vec<Expression>),
    Object(Vec<(String, Expression)>),
    Identifier(String),
    /// `this`, the configured render context.
    This,
    /// `object.name`
    Member(Box<Expression>, String),
    /// `object[index]`
    Index(Box<Expression>, Box<Expression>),
    /// `name(arguments)`, calls are limited to the native functions.
    Call(String, Vec<Expression>),
    Unary(Unary, Box<Expression>),
    Binary(Box<Expression>, Operator, Box<Expression>),
    /// `test ? then : otherwise`
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
    /// `target = value`, the target is an identifier, member or index.
    Assign(Box<Expression>, Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unary {
    /// !
    Not,
    /// -
    Negate,
}
