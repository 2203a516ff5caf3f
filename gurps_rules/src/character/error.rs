use crate::logging::{codes, Code};

pub type CharacterResult<T> = Result<T, CharacterError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CharacterError {
    #[error("Unknown trait '{name}'")]
    UnknownTrait { name: String },

    #[error("'{name}' is computed and cannot be purchased")]
    NotPurchasable { name: String },

    #[error("Invalid level {level} for '{name}': {reason}")]
    InvalidLevel {
        name: String,
        level: i64,
        reason: &'static str,
    },

    #[error("Invalid character snapshot: {message}")]
    SnapshotFormat { message: String },
}

impl CharacterError {
    pub fn unknown_trait(name: &str) -> Self {
        Self::UnknownTrait {
            name: name.to_string(),
        }
    }

    pub fn not_purchasable(name: &str) -> Self {
        Self::NotPurchasable {
            name: name.to_string(),
        }
    }

    pub fn invalid_level(name: &str, level: i64, reason: &'static str) -> Self {
        Self::InvalidLevel {
            name: name.to_string(),
            level,
            reason,
        }
    }

    pub fn snapshot_format(message: impl Into<String>) -> Self {
        Self::SnapshotFormat {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownTrait { .. } => codes::character::UNKNOWN_TRAIT,
            Self::NotPurchasable { .. } => codes::character::NOT_PURCHASABLE,
            Self::InvalidLevel { .. } => codes::character::INVALID_LEVEL,
            Self::SnapshotFormat { .. } => codes::character::SNAPSHOT_FORMAT,
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
