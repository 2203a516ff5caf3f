//! Formula tokenizer and parser errors

use crate::config::compile_time::formula::{
    MAX_FORMULA_LENGTH, MAX_IDENTIFIER_LENGTH, MAX_NESTING_DEPTH,
};
use crate::logging::{codes, Code};
use crate::utils::Location;

pub type FormulaResult<T> = Result<T, FormulaError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("invalid character in formula '{character}' {location}")]
    InvalidCharacter { character: char, location: Location },

    #[error("invalid number '{text}' {location}")]
    InvalidNumber { text: String, location: Location },

    #[error("identifier is {length} characters long (max {max}) {location}", max = MAX_IDENTIFIER_LENGTH)]
    IdentifierTooLong { length: usize, location: Location },

    #[error("formula is {length} characters long (max {max}) {location}", max = MAX_FORMULA_LENGTH)]
    FormulaTooLong { length: usize, location: Location },

    #[error("{message} {location}")]
    Syntax { message: String, location: Location },

    #[error("formula nested deeper than {max} levels {location}", max = MAX_NESTING_DEPTH)]
    TooDeep { location: Location },
}

impl FormulaError {
    pub fn invalid_character(character: char, location: &Location) -> Self {
        Self::InvalidCharacter {
            character,
            location: location.clone(),
        }
    }

    pub fn invalid_number(text: &str, location: &Location) -> Self {
        Self::InvalidNumber {
            text: text.to_string(),
            location: location.clone(),
        }
    }

    pub fn identifier_too_long(length: usize, location: &Location) -> Self {
        Self::IdentifierTooLong {
            length,
            location: location.clone(),
        }
    }

    pub fn formula_too_long(length: usize, location: &Location) -> Self {
        Self::FormulaTooLong {
            length,
            location: location.clone(),
        }
    }

    pub fn syntax(message: impl Into<String>, location: &Location) -> Self {
        Self::Syntax {
            message: message.into(),
            location: location.clone(),
        }
    }

    pub fn too_deep(location: &Location) -> Self {
        Self::TooDeep {
            location: location.clone(),
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Self::InvalidCharacter { location, .. }
            | Self::InvalidNumber { location, .. }
            | Self::IdentifierTooLong { location, .. }
            | Self::FormulaTooLong { location, .. }
            | Self::Syntax { location, .. }
            | Self::TooDeep { location } => location,
        }
    }

    /// Raised while splitting text into tokens rather than while grouping them
    pub fn is_lex_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCharacter { .. }
                | Self::InvalidNumber { .. }
                | Self::IdentifierTooLong { .. }
        )
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidCharacter { .. } => codes::formula::INVALID_CHARACTER,
            Self::InvalidNumber { .. } => codes::formula::INVALID_NUMBER,
            Self::IdentifierTooLong { .. } => codes::formula::IDENTIFIER_TOO_LONG,
            Self::FormulaTooLong { .. } => codes::formula::FORMULA_TOO_LONG,
            Self::Syntax { .. } => codes::formula::FORMULA_SYNTAX,
            Self::TooDeep { .. } => codes::formula::FORMULA_TOO_DEEP,
        }
    }
}
