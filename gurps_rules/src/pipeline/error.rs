use crate::character::CharacterError;
use crate::database::LoadError;
use crate::file_processor::FileProcessorError;
use crate::logging::Code;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Database load failed: {0}")]
    DatabaseLoad(#[from] LoadError),

    #[error("Character load failed: {0}")]
    Character(#[from] CharacterError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::DatabaseLoad(error) => error.error_code(),
            Self::Character(error) => error.error_code(),
            Self::Pipeline { .. } => crate::logging::codes::system::INTERNAL_ERROR,
        }
    }
}
