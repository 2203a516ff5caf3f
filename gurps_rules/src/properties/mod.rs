//! Trait definitions and the builder that produces them from parsed declarations

pub mod builder;
pub mod error;
pub mod model;

pub use builder::build_property;
pub use error::{BuildError, BuildResult};
pub use model::{
    CostOperator, Difficulty, Effect, EffectKind, EffectRef, GurpsProperty, TraitKind,
    ValueFormat,
};

use crate::declaration::ParsedThing;
use crate::logging::codes;
use crate::{log_error, log_success};

/// Build every top-level declaration of one source
pub fn build_properties(things: &[ParsedThing]) -> BuildResult<Vec<GurpsProperty>> {
    let mut properties = Vec::with_capacity(things.len());

    for thing in things {
        match build_property(thing) {
            Ok(property) => properties.push(property),
            Err(error) => {
                log_error!(
                    error.error_code(),
                    &error.to_string(),
                    location = error.location().clone(),
                    "trait" => thing.name
                );
                return Err(error);
            }
        }
    }

    log_success!(
        codes::success::PROPERTIES_BUILT,
        "Trait definitions built",
        "traits" => properties.len()
    );
    Ok(properties)
}
