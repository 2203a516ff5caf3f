//! Registration of built traits into one name table

use super::error::{LoadError, LoadResult};
use crate::config::compile_time::database::{MAX_SOURCES, MAX_TRAITS};
use crate::config::runtime::LoaderPreferences;
use crate::declaration::{self, SourceText};
use crate::logging::with_source_context;
use crate::properties::{self, GurpsProperty};
use crate::{log_debug, log_error};
use std::collections::HashMap;

/// Accumulates traits across sources before semantic analysis
#[derive(Debug, Default)]
pub struct DatabaseLoader {
    traits: Vec<GurpsProperty>,
    index: HashMap<String, usize>,
}

impl DatabaseLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_source_count(sources: &[SourceText]) -> LoadResult<()> {
        if sources.len() > MAX_SOURCES {
            return Err(LoadError::TooManySources {
                count: sources.len(),
            });
        }
        Ok(())
    }

    /// Parse and build one source, registering every trait it declares
    pub fn add_source(&mut self, source: &SourceText, source_id: usize) -> LoadResult<usize> {
        with_source_context(&source.path, source_id, || -> LoadResult<usize> {
            let things = declaration::parse_source(source)?;
            let properties = properties::build_properties(&things)?;
            let count = properties.len();
            for property in properties {
                self.register(property)?;
            }
            log_debug!("Source registered", "source" => source.path, "traits" => count);
            Ok(count)
        })
    }

    pub fn register(&mut self, property: GurpsProperty) -> LoadResult<()> {
        if let Some(&existing) = self.index.get(&property.name) {
            let error = LoadError::duplicate_name(
                &property.name,
                self.traits[existing].location.clone(),
                property.location.clone(),
            );
            log_error!(
                error.error_code(),
                &error.to_string(),
                location = property.location.clone()
            );
            return Err(error);
        }

        if self.traits.len() >= MAX_TRAITS {
            return Err(LoadError::TooManyTraits {
                location: property.location.clone(),
            });
        }

        self.index.insert(property.name.clone(), self.traits.len());
        self.traits.push(property);
        Ok(())
    }

    pub fn check_core_attributes(&self, preferences: &LoaderPreferences) -> LoadResult<()> {
        for name in &preferences.core_attributes {
            if !self.index.contains_key(name) {
                let error = LoadError::missing_core_attribute(name);
                log_error!(error.error_code(), &error.to_string());
                return Err(error);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn into_parts(self) -> (Vec<GurpsProperty>, HashMap<String, usize>) {
        (self.traits, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_register_rejects_duplicates_with_both_locations() {
        let mut loader = DatabaseLoader::new();
        loader
            .add_source(&SourceText::new("first.txt", "ST : 10 * level\n"), 0)
            .unwrap();

        let error = loader
            .add_source(&SourceText::new("second.txt", "\nST : 20 * level\n"), 1)
            .unwrap_err();

        assert_matches!(
            &error,
            LoadError::DuplicateName { name, first, second }
                if name == "ST" && first.path() == "first.txt" && second.line() == 2
        );
        assert_eq!(loader.len(), 1);
    }

    #[test]
    fn test_core_attributes_must_exist() {
        let mut loader = DatabaseLoader::new();
        loader
            .add_source(&SourceText::new("core.txt", "ST : 10 * level\n"), 0)
            .unwrap();

        let preferences = LoaderPreferences {
            core_attributes: vec!["ST".to_string(), "DX".to_string()],
            apply_presentation_tweaks: false,
        };
        assert_matches!(
            loader.check_core_attributes(&preferences),
            Err(LoadError::MissingCoreAttribute { name }) if name == "DX"
        );
    }
}
