//! Unitdef Core - Fundamental types
//!
//! This crate provides the core types used throughout unitdef:
//! - `UnitError`: Structured errors for definition loading and conversion
//! - `ExprError`: Failures of the expression language
//! - A restricted arithmetic language (lexer, AST, parser, evaluator)
//!   used for numeric literals in definitions

mod error;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod eval;

pub use error::{UnitError, ExprError, ErrorKind, ErrorContext};
pub use ast::{Expr, BinOp, UnaryOp};
pub use parser::parse_expr;
pub use eval::{eval_number, evaluate};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{UnitError, ExprError, ErrorKind};
    pub use crate::{eval_number, parse_expr};
}
