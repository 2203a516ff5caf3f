// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    declaration: DeclarationLimits,
    formula: FormulaLimits,
    database: DatabaseLimits,
    semantic: SemanticLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct DeclarationLimits {
    max_block_depth: usize,
    max_line_length: usize,
}

#[derive(serde::Deserialize)]
struct FormulaLimits {
    max_formula_length: usize,
    max_nesting_depth: usize,
    max_identifier_length: usize,
}

#[derive(serde::Deserialize)]
struct DatabaseLimits {
    max_traits: usize,
    max_sources: usize,
}

#[derive(serde::Deserialize)]
struct SemanticLimits {
    max_cycle_path_length: usize,
    max_dependency_depth: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GURPS_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=GURPS_CONFIG_DIR");

    let profile = env::var("GURPS_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("GURPS_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of gurps_rules directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 100_000_000;
    const ABSOLUTE_MAX_NESTING: usize = 1_000;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.formula.max_nesting_depth > ABSOLUTE_MAX_NESTING
        || config.declaration.max_block_depth > ABSOLUTE_MAX_NESTING
        || config.semantic.max_dependency_depth > ABSOLUTE_MAX_NESTING * 10
    {
        panic!("LIMITS: recursion limits exceed absolute maximum");
    }

    if config.formula.max_identifier_length > config.formula.max_formula_length {
        panic!("LIMITS: max_identifier_length cannot exceed max_formula_length");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.file_processing.max_file_size > 10_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const MAX_LINE_COUNT: usize = {};
    }}

    pub mod declaration {{
        pub const MAX_BLOCK_DEPTH: usize = {};
        pub const MAX_LINE_LENGTH: usize = {};
    }}

    pub mod formula {{
        pub const MAX_FORMULA_LENGTH: usize = {};
        pub const MAX_NESTING_DEPTH: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
    }}

    pub mod database {{
        pub const MAX_TRAITS: usize = {};
        pub const MAX_SOURCES: usize = {};
    }}

    pub mod semantic {{
        pub const MAX_CYCLE_PATH_LENGTH: usize = {};
        pub const MAX_DEPENDENCY_DEPTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.max_line_count,
        config.declaration.max_block_depth,
        config.declaration.max_line_length,
        config.formula.max_formula_length,
        config.formula.max_nesting_depth,
        config.formula.max_identifier_length,
        config.database.max_traits,
        config.database.max_sources,
        config.semantic.max_cycle_path_length,
        config.semantic.max_dependency_depth,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
