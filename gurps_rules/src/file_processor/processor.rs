//! File processor: path checks, size and line limits, UTF-8 decoding

use crate::config::compile_time::file_processing::{MAX_FILE_SIZE, MAX_LINE_COUNT};
use crate::config::runtime::FileProcessorPreferences;
use crate::declaration::SourceText;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted when the extension check is enabled
pub const DATA_EXTENSIONS: [&str; 2] = ["gurpenator_data", "txt"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .gurpenator_data or .txt, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty: {path}")]
    EmptyFile { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_data_file: bool,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    /// Path as given by the caller; used in every error location
    pub display_path: String,
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    pub fn into_source_text(self) -> SourceText {
        SourceText::new(self.display_path, self.source)
    }
}

pub struct FileProcessor {
    pub require_data_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_data_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_data_extension: prefs.require_data_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_data_extension_required(mut self, required: bool) -> Self {
        self.require_data_extension = required;
        self
    }

    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = std::time::Instant::now();

        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;
        let source = self.read_file(&path, file_path)?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT);
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            display_path: file_path.to_string(),
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        if self.enable_performance_logging {
            let duration = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully with performance metrics",
                "file" => file_path,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => line_count,
                "duration_ms" => duration
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path
            );
        }

        Ok(result)
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        let path = Path::new(file_path);

        if file_path.is_empty() || !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }

        if !path.is_file() {
            let error = FileProcessorError::IoError {
                message: format!("'{}' is not a file", file_path),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path);
            return Err(error);
        }

        Ok(path.to_path_buf())
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = io_error(path, e);
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display());
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let is_data_file = extension
            .as_deref()
            .is_some_and(|ext| DATA_EXTENSIONS.contains(&ext));

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            is_data_file,
        })
    }

    fn validate_file(
        &self,
        metadata: &FileMetadata,
        file_path: &str,
    ) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds compile-time maximum size limit",
                "file" => file_path,
                "size_bytes" => metadata.size,
                "limit_bytes" => MAX_FILE_SIZE);
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_data_extension && !metadata.is_data_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have a data file extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none"));
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        let bytes = fs::read(path).map_err(|e| {
            let error = io_error(path, e);
            log_error!(error.error_code(), &error.to_string(), "file" => file_path);
            error
        })?;

        String::from_utf8(bytes).map_err(|_| {
            let error = FileProcessorError::InvalidEncoding {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Invalid UTF-8 encoding in file", "file" => file_path);
            error
        })
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(path: &Path, error: std::io::Error) -> FileProcessorError {
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
            path: path.display().to_string(),
        },
        std::io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => FileProcessorError::IoError {
            message: format!("'{}': {}", path.display(), error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("core.gurpenator_data");
        let content = "ST : 10 * level\nDX : 20 * level\n";
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();

        assert_eq!(result.metadata.line_count, 2);
        assert!(result.metadata.is_data_file);

        let source = result.into_source_text();
        assert_eq!(source.text, content);
        assert!(source.path.ends_with("core.gurpenator_data"));
    }

    #[test]
    fn test_file_not_found() {
        assert_matches!(
            FileProcessor::new().process_file("missing.gurpenator_data"),
            Err(FileProcessorError::FileNotFound { .. })
        );
    }

    #[test]
    fn test_compile_time_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.txt");
        fs::write(&file_path, "a".repeat((MAX_FILE_SIZE + 1) as usize)).unwrap();

        match FileProcessor::new().process_file(file_path.to_str().unwrap()) {
            Err(FileProcessorError::FileTooLarge { size, max_size }) => {
                assert!(size > MAX_FILE_SIZE);
                assert_eq!(max_size, MAX_FILE_SIZE);
            }
            other => panic!("Expected FileTooLarge error, got {:?}", other.map(|r| r.metadata)),
        }
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("traits.csv");
        fs::write(&file_path, "ST : 10 * level\n").unwrap();

        let processor = FileProcessor::new().with_data_extension_required(true);
        assert_matches!(
            processor.process_file(file_path.to_str().unwrap()),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "csv"
        );

        let relaxed = FileProcessor::new();
        assert!(relaxed.process_file(file_path.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.txt");
        fs::write(&file_path, "").unwrap();

        assert_matches!(
            FileProcessor::new().process_file(file_path.to_str().unwrap()),
            Err(FileProcessorError::EmptyFile { .. })
        );
    }

    #[test]
    fn test_too_many_lines() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("many_lines.txt");
        fs::write(&file_path, "\n".repeat(MAX_LINE_COUNT + 1)).unwrap();

        match FileProcessor::new().process_file(file_path.to_str().unwrap()) {
            Err(FileProcessorError::TooManyLines { lines, max_lines }) => {
                assert!(lines > MAX_LINE_COUNT);
                assert_eq!(max_lines, MAX_LINE_COUNT);
            }
            other => panic!("Expected TooManyLines error, got {:?}", other.map(|r| r.metadata)),
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("binary.txt");
        fs::write(&file_path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let error = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err();
        assert_matches!(error, FileProcessorError::InvalidEncoding { .. });
        assert_eq!(error.error_code(), codes::file_processing::INVALID_ENCODING);
    }
}
