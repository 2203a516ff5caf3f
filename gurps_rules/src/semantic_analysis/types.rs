//! Shared semantic analysis types

use crate::config::compile_time::semantic::{MAX_CYCLE_PATH_LENGTH, MAX_DEPENDENCY_DEPTH};
use crate::logging::{codes, Code};
use crate::utils::Location;
use std::fmt;
use thiserror::Error;

pub type SemanticResult<T> = Result<T, SemanticError>;

/// The three value sorts a formula can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSort {
    Int,
    Boolean,
    Percent,
}

impl fmt::Display for ValueSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueSort::Int => "integer",
            ValueSort::Boolean => "boolean",
            ValueSort::Percent => "percent",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("{message} {location}")]
    TypeError { message: String, location: Location },

    #[error("Name not found '{name}' {location}")]
    UndefinedName { name: String, location: Location },

    #[error("{message} {location}")]
    WrongKind { message: String, location: Location },

    #[error("{description}: {}", describe_cycle(.names, .locations))]
    CircularDefinition {
        description: String,
        names: Vec<String>,
        locations: Vec<Location>,
    },

    #[error("dependencies of '{name}' nest deeper than {max} {location}", max = MAX_DEPENDENCY_DEPTH)]
    DependencyTooDeep { name: String, location: Location },
}

fn describe_cycle(names: &[String], locations: &[Location]) -> String {
    names
        .iter()
        .zip(locations)
        .map(|(name, location)| format!("{} {}", name, location))
        .collect::<Vec<_>>()
        .join(", ")
}

impl SemanticError {
    /// Display text with long cycles cut to `MAX_CYCLE_PATH_LENGTH` nodes
    pub fn log_message(&self) -> String {
        match self {
            Self::CircularDefinition {
                description,
                names,
                locations,
            } if names.len() > MAX_CYCLE_PATH_LENGTH => format!(
                "{}: {}, ... ({} more)",
                description,
                describe_cycle(&names[..MAX_CYCLE_PATH_LENGTH], locations),
                names.len() - MAX_CYCLE_PATH_LENGTH
            ),
            _ => self.to_string(),
        }
    }

    pub fn expected_sort(sort: ValueSort, formula: &dyn fmt::Display, location: &Location) -> Self {
        Self::TypeError {
            message: format!("expected {}. got '{}'", sort, formula),
            location: location.clone(),
        }
    }

    pub fn illegal_division(formula: &dyn fmt::Display, location: &Location) -> Self {
        Self::TypeError {
            message: format!(
                "can only divide by a non-zero integer literal. got '{}'",
                formula
            ),
            location: location.clone(),
        }
    }

    pub fn comma_operator(formula: &dyn fmt::Display, location: &Location) -> Self {
        Self::TypeError {
            message: format!("',' is not allowed here. got '{}'", formula),
            location: location.clone(),
        }
    }

    pub fn undefined_name(name: &str, location: &Location) -> Self {
        Self::UndefinedName {
            name: name.to_string(),
            location: location.clone(),
        }
    }

    pub fn wrong_kind(message: impl Into<String>, location: &Location) -> Self {
        Self::WrongKind {
            message: message.into(),
            location: location.clone(),
        }
    }

    pub fn circular_definition(
        description: &str,
        names: Vec<String>,
        locations: Vec<Location>,
    ) -> Self {
        Self::CircularDefinition {
            description: description.to_string(),
            names,
            locations,
        }
    }

    pub fn dependency_too_deep(name: &str, location: &Location) -> Self {
        Self::DependencyTooDeep {
            name: name.to_string(),
            location: location.clone(),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::TypeError { location, .. }
            | Self::UndefinedName { location, .. }
            | Self::WrongKind { location, .. }
            | Self::DependencyTooDeep { location, .. } => Some(location),
            Self::CircularDefinition { locations, .. } => locations.first(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::TypeError { .. } => codes::semantic::TYPE_MISMATCH,
            Self::UndefinedName { .. } => codes::names::UNDEFINED_NAME,
            Self::WrongKind { .. } => codes::names::WRONG_KIND,
            Self::CircularDefinition { .. } | Self::DependencyTooDeep { .. } => {
                codes::semantic::CIRCULAR_DEFINITION
            }
        }
    }

    /// Error type string for logging context
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::TypeError { .. } => "TypeError",
            Self::UndefinedName { .. } => "UndefinedName",
            Self::WrongKind { .. } => "WrongKind",
            Self::CircularDefinition { .. } => "CircularDefinition",
            Self::DependencyTooDeep { .. } => "DependencyTooDeep",
        }
    }
}
