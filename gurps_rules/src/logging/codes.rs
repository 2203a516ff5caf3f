//! Error and success codes with their classification metadata
//!
//! Every stage error maps to one of these codes through its `error_code()`;
//! the registry below is the single place their severity and category live.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const TOO_MANY_LINES: Code = Code::new("E012");
}

/// Declaration layer error codes
pub mod declaration {
    use super::Code;

    pub const MALFORMED_DECLARATION: Code = Code::new("E020");
    pub const UNTERMINATED_BLOCK: Code = Code::new("E021");
    pub const DUPLICATE_COMMENT: Code = Code::new("E022");
    pub const RESERVED_NAME: Code = Code::new("E023");
    pub const BLOCK_TOO_DEEP: Code = Code::new("E024");
    pub const ILLEGAL_STRUCTURE: Code = Code::new("E025");
}

/// Formula tokenizer and parser error codes
pub mod formula {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E030");
    pub const INVALID_NUMBER: Code = Code::new("E031");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E032");
    pub const FORMULA_SYNTAX: Code = Code::new("E040");
    pub const FORMULA_TOO_DEEP: Code = Code::new("E041");
    pub const FORMULA_TOO_LONG: Code = Code::new("E042");
}

/// Name table error codes
pub mod names {
    use super::Code;

    pub const DUPLICATE_NAME: Code = Code::new("E050");
    pub const MISSING_CORE_ATTRIBUTE: Code = Code::new("E051");
    pub const TOO_MANY_TRAITS: Code = Code::new("E052");
    pub const UNDEFINED_NAME: Code = Code::new("E060");
    pub const WRONG_KIND: Code = Code::new("E061");
}

/// Static checking error codes
pub mod semantic {
    use super::Code;

    pub const TYPE_MISMATCH: Code = Code::new("E070");
    pub const CIRCULAR_DEFINITION: Code = Code::new("E080");
}

/// Character mutation error codes
pub mod character {
    use super::Code;

    pub const UNKNOWN_TRAIT: Code = Code::new("E090");
    pub const NOT_PURCHASABLE: Code = Code::new("E091");
    pub const INVALID_LEVEL: Code = Code::new("E092");
    pub const SNAPSHOT_FORMAT: Code = Code::new("E093");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const DECLARATIONS_PARSED: Code = Code::new("I020");
    pub const PROPERTIES_BUILT: Code = Code::new("I030");
    pub const TYPE_CHECKING_PASSED: Code = Code::new("I070");
    pub const CYCLE_CHECK_PASSED: Code = Code::new("I071");
    pub const DATABASE_LOADED: Code = Code::new("I080");
    pub const CHARACTER_CREATED: Code = Code::new("I090");
    pub const CHARACTER_UPDATED: Code = Code::new("I091");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Internal engine error",
                "File a bug report with the database that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Engine initialization failed",
                "Check logging and configuration settings",
            ),
            // File processing
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "Database file not found",
                "Verify the file path exists",
            ),
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Medium,
                true,
                true,
                "Database file has an unexpected extension",
                "Rename the file or disable the extension requirement",
            ),
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "Database file exceeds the configured size limit",
                "Split the database into several files",
            ),
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Database file is empty",
                "Add declarations or drop the file from the load list",
            ),
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "Permission denied reading database file",
                "Check file permissions",
            ),
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "Database file is not valid UTF-8",
                "Re-save the file as UTF-8",
            ),
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "I/O error while reading a database file",
                "Retry or check the storage device",
            ),
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "Database file exceeds the configured line limit",
                "Split the database into several files",
            ),
            // Declarations
            ErrorMetadata::new(
                "E020",
                "Declaration",
                Severity::High,
                false,
                true,
                "Line does not match the declaration grammar",
                "Use `Name OPERATOR formula [\"comment\"] [{]`",
            ),
            ErrorMetadata::new(
                "E021",
                "Declaration",
                Severity::High,
                false,
                true,
                "Block opened with '{' is never closed",
                "Add a line containing only '}'",
            ),
            ErrorMetadata::new(
                "E022",
                "Declaration",
                Severity::Medium,
                false,
                true,
                "Declaration has more than one comment",
                "Keep a single comment per declaration",
            ),
            ErrorMetadata::new(
                "E023",
                "Declaration",
                Severity::High,
                false,
                true,
                "Reserved word used as a trait name",
                "Rename the trait",
            ),
            ErrorMetadata::new(
                "E024",
                "Declaration",
                Severity::High,
                false,
                true,
                "Blocks nested deeper than the configured limit",
                "Flatten the declaration",
            ),
            ErrorMetadata::new(
                "E025",
                "Declaration",
                Severity::High,
                false,
                true,
                "Declaration structure is not allowed here",
                "Check the operator and sub-property for this kind of declaration",
            ),
            // Formulas
            ErrorMetadata::new(
                "E030",
                "Formula",
                Severity::High,
                false,
                true,
                "Invalid character in formula",
                "Remove the character or quote it in the comment",
            ),
            ErrorMetadata::new(
                "E031",
                "Formula",
                Severity::High,
                false,
                true,
                "Numeric literal out of range",
                "Use a smaller number",
            ),
            ErrorMetadata::new(
                "E032",
                "Formula",
                Severity::Medium,
                false,
                true,
                "Identifier exceeds the configured length limit",
                "Shorten the trait name",
            ),
            ErrorMetadata::new(
                "E040",
                "Formula",
                Severity::High,
                false,
                true,
                "Formula is not a complete expression",
                "Check parentheses and operators",
            ),
            ErrorMetadata::new(
                "E041",
                "Formula",
                Severity::High,
                false,
                true,
                "Formula nested deeper than the configured limit",
                "Simplify the formula",
            ),
            ErrorMetadata::new(
                "E042",
                "Formula",
                Severity::High,
                false,
                true,
                "Formula text exceeds the configured length limit",
                "Simplify the formula",
            ),
            // Names
            ErrorMetadata::new(
                "E050",
                "Names",
                Severity::High,
                false,
                true,
                "Trait declared more than once",
                "Remove or rename one of the declarations",
            ),
            ErrorMetadata::new(
                "E051",
                "Names",
                Severity::High,
                false,
                true,
                "Core attribute missing from the database",
                "Load the core database or declare the attribute",
            ),
            ErrorMetadata::new(
                "E052",
                "Names",
                Severity::High,
                false,
                true,
                "Database declares more traits than the configured limit",
                "Reduce the database size",
            ),
            ErrorMetadata::new(
                "E060",
                "Names",
                Severity::High,
                false,
                true,
                "Reference to an undefined trait",
                "Declare the trait or fix the spelling",
            ),
            ErrorMetadata::new(
                "E061",
                "Names",
                Severity::High,
                false,
                true,
                "Trait is of the wrong kind for this use",
                "Reference a trait of the required kind",
            ),
            // Semantic
            ErrorMetadata::new(
                "E070",
                "Semantic",
                Severity::High,
                false,
                true,
                "Formula has the wrong type",
                "Use an int, boolean or percent expression as required",
            ),
            ErrorMetadata::new(
                "E080",
                "Semantic",
                Severity::High,
                false,
                true,
                "Definitions depend on each other in a cycle",
                "Break the cycle",
            ),
            // Character
            ErrorMetadata::new(
                "E090",
                "Character",
                Severity::Medium,
                true,
                false,
                "Character references a trait the database lacks",
                "Load the database that defines the trait",
            ),
            ErrorMetadata::new(
                "E091",
                "Character",
                Severity::Low,
                true,
                false,
                "Trait cannot be purchased",
                "Purchase the traits it is computed from instead",
            ),
            ErrorMetadata::new(
                "E092",
                "Character",
                Severity::Low,
                true,
                false,
                "Purchased level is out of range for this trait",
                "Use 0 or 1 for yes/no advantages and non-negative levels for skills",
            ),
            ErrorMetadata::new(
                "E093",
                "Character",
                Severity::Medium,
                true,
                false,
                "Character snapshot is malformed",
                "Re-save the character",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(false)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    match get_error_metadata(code) {
        Some(metadata) => metadata.category,
        None if code.starts_with('I') => "Success",
        None => "Unknown",
    }
}
