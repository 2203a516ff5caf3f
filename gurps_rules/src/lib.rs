// Internal modules
pub mod character;
pub mod config;
pub mod database;
pub mod declaration;
pub mod file_processor;
pub mod formula;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod properties;
pub mod semantic_analysis;
pub mod utils;

// Re-export key types for library consumers
pub use character::{
    ChangeListener, CharacterError, CharacterSnapshot, GurpsCharacter, TraitChanged,
};
pub use database::{ErrorKind, GurpsDatabase, LoadError};
pub use declaration::SourceText;
pub use pipeline::{PipelineError, PipelineResult};
