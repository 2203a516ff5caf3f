//! Errors raised while interpreting parsed declarations as traits

use crate::formula::FormulaError;
use crate::logging::{codes, Code};
use crate::utils::Location;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("{message} {location}")]
    IllegalStructure { message: String, location: Location },

    #[error("illegal operator '{operator}' for property {location}")]
    IllegalOperator { operator: String, location: Location },

    #[error("expected name of skill. got '{text}' {location}")]
    ExpectedSkillName { text: String, location: Location },

    #[error("{message} {location}")]
    WrongKind { message: String, location: Location },

    #[error(transparent)]
    Formula(#[from] FormulaError),
}

impl BuildError {
    pub fn illegal_structure(message: impl Into<String>, location: &Location) -> Self {
        Self::IllegalStructure {
            message: message.into(),
            location: location.clone(),
        }
    }

    pub fn illegal_operator(operator: &str, location: &Location) -> Self {
        Self::IllegalOperator {
            operator: operator.to_string(),
            location: location.clone(),
        }
    }

    pub fn expected_skill_name(text: &str, location: &Location) -> Self {
        Self::ExpectedSkillName {
            text: text.to_string(),
            location: location.clone(),
        }
    }

    pub fn wrong_kind(message: impl Into<String>, location: &Location) -> Self {
        Self::WrongKind {
            message: message.into(),
            location: location.clone(),
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Self::IllegalStructure { location, .. }
            | Self::IllegalOperator { location, .. }
            | Self::ExpectedSkillName { location, .. }
            | Self::WrongKind { location, .. } => location,
            Self::Formula(error) => error.location(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::IllegalStructure { .. } | Self::IllegalOperator { .. } => {
                codes::declaration::ILLEGAL_STRUCTURE
            }
            Self::ExpectedSkillName { .. } => codes::formula::FORMULA_SYNTAX,
            Self::WrongKind { .. } => codes::names::WRONG_KIND,
            Self::Formula(error) => error.error_code(),
        }
    }
}
