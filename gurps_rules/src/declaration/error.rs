//! Declaration-level syntax errors

use crate::config::compile_time::declaration::{MAX_BLOCK_DEPTH, MAX_LINE_LENGTH};
use crate::logging::{codes, Code};
use crate::utils::Location;

pub type DeclarationResult<T> = Result<T, DeclarationError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeclarationError {
    #[error("syntax problem {location}")]
    MalformedDeclaration { location: Location },

    #[error("block opened by '{name}' is never closed {location}")]
    UnterminatedBlock { name: String, location: Location },

    #[error("only one comment allowed per declaration {location}")]
    DuplicateComment { location: Location },

    #[error("name '{name}' is reserved {location}")]
    ReservedName { name: String, location: Location },

    #[error("blocks nested {depth} deep (max {max}) {location}", max = MAX_BLOCK_DEPTH)]
    BlockTooDeep { depth: usize, location: Location },

    #[error("line is {length} characters long (max {max}) {location}", max = MAX_LINE_LENGTH)]
    LineTooLong { length: usize, location: Location },
}

impl DeclarationError {
    pub fn malformed_declaration(location: Location) -> Self {
        Self::MalformedDeclaration { location }
    }

    pub fn unterminated_block(name: &str, location: Location) -> Self {
        Self::UnterminatedBlock {
            name: name.to_string(),
            location,
        }
    }

    pub fn duplicate_comment(location: Location) -> Self {
        Self::DuplicateComment { location }
    }

    pub fn reserved_name(name: &str, location: Location) -> Self {
        Self::ReservedName {
            name: name.to_string(),
            location,
        }
    }

    pub fn block_too_deep(depth: usize, location: Location) -> Self {
        Self::BlockTooDeep { depth, location }
    }

    pub fn line_too_long(length: usize, location: Location) -> Self {
        Self::LineTooLong { length, location }
    }

    pub fn location(&self) -> &Location {
        match self {
            Self::MalformedDeclaration { location }
            | Self::UnterminatedBlock { location, .. }
            | Self::DuplicateComment { location }
            | Self::ReservedName { location, .. }
            | Self::BlockTooDeep { location, .. }
            | Self::LineTooLong { location, .. } => location,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::MalformedDeclaration { .. } | Self::LineTooLong { .. } => {
                codes::declaration::MALFORMED_DECLARATION
            }
            Self::UnterminatedBlock { .. } => codes::declaration::UNTERMINATED_BLOCK,
            Self::DuplicateComment { .. } => codes::declaration::DUPLICATE_COMMENT,
            Self::ReservedName { .. } => codes::declaration::RESERVED_NAME,
            Self::BlockTooDeep { .. } => codes::declaration::BLOCK_TOO_DEEP,
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
