//! Database load errors and the kind taxonomy they report

use crate::config::compile_time::database::{MAX_SOURCES, MAX_TRAITS};
use crate::declaration::DeclarationError;
use crate::formula::FormulaError;
use crate::logging::{codes, Code};
use crate::properties::BuildError;
use crate::semantic_analysis::SemanticError;
use crate::utils::Location;
use std::fmt;

pub type LoadResult<T> = Result<T, LoadError>;

/// Category of a load failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Lex,
    FormulaSyntax,
    Type,
    UndefinedName,
    WrongKind,
    DuplicateName,
    CircularDefinition,
    MissingCoreAttribute,
    /// A compile-time size limit was exceeded
    LimitExceeded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Lex => "LexError",
            ErrorKind::FormulaSyntax => "FormulaSyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::UndefinedName => "UndefinedNameError",
            ErrorKind::WrongKind => "WrongKindError",
            ErrorKind::DuplicateName => "DuplicateNameError",
            ErrorKind::CircularDefinition => "CircularDefinitionError",
            ErrorKind::MissingCoreAttribute => "MissingCoreAttributeError",
            ErrorKind::LimitExceeded => "LimitExceededError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("duplicate definitions of \"{name}\". {first}, {second}")]
    DuplicateName {
        name: String,
        first: Location,
        second: Location,
    },

    #[error("missing definition of core attribute \"{name}\"")]
    MissingCoreAttribute { name: String },

    #[error("database would hold more than {max} traits {location}", max = MAX_TRAITS)]
    TooManyTraits { location: Location },

    #[error("{count} sources given (max {max})", max = MAX_SOURCES)]
    TooManySources { count: usize },
}

impl LoadError {
    pub fn duplicate_name(name: &str, first: Location, second: Location) -> Self {
        Self::DuplicateName {
            name: name.to_string(),
            first,
            second,
        }
    }

    pub fn missing_core_attribute(name: &str) -> Self {
        Self::MissingCoreAttribute {
            name: name.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Declaration(_) => ErrorKind::Syntax,
            Self::Build(error) => match error {
                BuildError::IllegalStructure { .. } | BuildError::IllegalOperator { .. } => {
                    ErrorKind::Syntax
                }
                BuildError::ExpectedSkillName { .. } => ErrorKind::FormulaSyntax,
                BuildError::WrongKind { .. } => ErrorKind::WrongKind,
                BuildError::Formula(formula) => formula_kind(formula),
            },
            Self::Semantic(error) => match error {
                SemanticError::TypeError { .. } => ErrorKind::Type,
                SemanticError::UndefinedName { .. } => ErrorKind::UndefinedName,
                SemanticError::WrongKind { .. } => ErrorKind::WrongKind,
                SemanticError::CircularDefinition { .. }
                | SemanticError::DependencyTooDeep { .. } => ErrorKind::CircularDefinition,
            },
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::MissingCoreAttribute { .. } => ErrorKind::MissingCoreAttribute,
            Self::TooManyTraits { .. } | Self::TooManySources { .. } => ErrorKind::LimitExceeded,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Declaration(error) => Some(error.location()),
            Self::Build(error) => Some(error.location()),
            Self::Semantic(error) => error.location(),
            Self::DuplicateName { second, .. } => Some(second),
            Self::TooManyTraits { location } => Some(location),
            Self::MissingCoreAttribute { .. } | Self::TooManySources { .. } => None,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Declaration(error) => error.error_code(),
            Self::Build(error) => error.error_code(),
            Self::Semantic(error) => error.error_code(),
            Self::DuplicateName { .. } => codes::names::DUPLICATE_NAME,
            Self::MissingCoreAttribute { .. } => codes::names::MISSING_CORE_ATTRIBUTE,
            Self::TooManyTraits { .. } | Self::TooManySources { .. } => {
                codes::names::TOO_MANY_TRAITS
            }
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }
}

fn formula_kind(error: &FormulaError) -> ErrorKind {
    if error.is_lex_error() {
        ErrorKind::Lex
    } else {
        ErrorKind::FormulaSyntax
    }
}
