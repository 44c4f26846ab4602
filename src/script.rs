//! The render-script language.
//!
//! Templates are compiled into render-script source, a small statement
//! language over JSON values. It has declarations, assignment, conditionals,
//! switches, loops over lists and maps, dynamic scope through `with`, and
//! `try`/`catch`. Function calls are limited to a fixed set of natives
//! provided by the renderer, so a template cannot reach beyond the data it
//! is rendered with.

mod lexer;
mod parser;
mod token;
mod tree;

pub use parser::Parser;
pub use token::Operator;
pub use tree::{Expression, Iteration, Label, Program, Statement, Unary};
