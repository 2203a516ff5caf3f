//! Reading database files from disk under the compile-time size limits

mod processor;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, DATA_EXTENSIONS,
};
