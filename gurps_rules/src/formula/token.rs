//! Formula tokens

use std::fmt;

/// Fixed-point fraction in hundredths; `37%` is `Percent(37)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(pub i64);

impl Percent {
    pub fn hundredths(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    LeftParen,
    RightParen,
    Star,
    Slash,
    Plus,
    Minus,
    Comma,
    LessEqual,
    Less,
    GreaterEqual,
    Greater,
    If,
    Then,
    Else,
    And,
    Or,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::LeftParen => "(",
            Symbol::RightParen => ")",
            Symbol::Star => "*",
            Symbol::Slash => "/",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Comma => ",",
            Symbol::LessEqual => "<=",
            Symbol::Less => "<",
            Symbol::GreaterEqual => ">=",
            Symbol::Greater => ">",
            Symbol::If => "IF",
            Symbol::Then => "THEN",
            Symbol::Else => "ELSE",
            Symbol::And => "AND",
            Symbol::Or => "OR",
        }
    }

    /// Whole-word keyword symbols
    pub fn keyword(word: &str) -> Option<Symbol> {
        match word {
            "IF" => Some(Symbol::If),
            "THEN" => Some(Symbol::Then),
            "ELSE" => Some(Symbol::Else),
            "AND" => Some(Symbol::And),
            "OR" => Some(Symbol::Or),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Identifier(String),
    Integer(i64),
    Percent(Percent),
    Boolean(bool),
    Symbol(Symbol),
}

impl Token {
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        matches!(self, Token::Symbol(s) if *s == symbol)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => f.write_str(name),
            Token::Integer(value) => write!(f, "{}", value),
            Token::Percent(percent) => write!(f, "{}", percent),
            Token::Boolean(value) => write!(f, "{}", value),
            Token::Symbol(symbol) => f.write_str(symbol.as_str()),
        }
    }
}
