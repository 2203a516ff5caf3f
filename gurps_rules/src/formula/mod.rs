//! Formula language: tokens, expression trees and the precedence parser

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOperator, Formula};
pub use error::{FormulaError, FormulaResult};
pub use lexer::tokenize;
pub use parser::{parse_formula, FormulaParser};
pub use token::{Percent, Symbol, Token};
