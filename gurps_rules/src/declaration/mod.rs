//! Declaration parsing: raw database text into `ParsedThing` trees

pub mod error;
pub mod parsed_thing;
pub mod parser;

pub use error::{DeclarationError, DeclarationResult};
pub use parsed_thing::{DeclarationOperator, ParsedThing, SourceText};
pub use parser::{is_reserved_name, DeclarationParser, RESERVED_NAMES};

use crate::logging::codes;
use crate::{log_debug, log_error, log_success};

/// Parse a whole source eagerly, logging the outcome
pub fn parse_source(source: &SourceText) -> DeclarationResult<Vec<ParsedThing>> {
    log_debug!("Parsing declarations", "source" => source.path);

    match DeclarationParser::new(source).collect::<DeclarationResult<Vec<_>>>() {
        Ok(things) => {
            log_success!(
                codes::success::DECLARATIONS_PARSED,
                "Declarations parsed",
                "source" => source.path,
                "declarations" => things.len()
            );
            Ok(things)
        }
        Err(error) => {
            log_error!(
                error.error_code(),
                &error.to_string(),
                location = error.location().clone()
            );
            Err(error)
        }
    }
}
