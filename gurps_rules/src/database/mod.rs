//! The loaded, checked and immutable trait database

pub mod error;
pub mod loader;
pub mod presentation;

pub use error::{ErrorKind, LoadError, LoadResult};
pub use loader::DatabaseLoader;

use crate::config::runtime::LoaderPreferences;
use crate::declaration::SourceText;
use crate::logging::codes;
use crate::properties::GurpsProperty;
use crate::semantic_analysis::{inheritance_root, SemanticAnalyzer};
use crate::{log_error, log_info, log_success};
use std::collections::HashMap;

/// Every trait of a database, indexed by name
///
/// Built once by [`GurpsDatabase::load`] and never mutated afterwards;
/// characters share it through `Arc`.
#[derive(Debug, Clone)]
pub struct GurpsDatabase {
    traits: Vec<GurpsProperty>,
    index: HashMap<String, usize>,
}

impl GurpsDatabase {
    /// Load every source in order into one name table. All or nothing.
    pub fn load(sources: &[SourceText], preferences: &LoaderPreferences) -> LoadResult<Self> {
        log_info!("Loading trait database", "sources" => sources.len());

        if let Err(error) = DatabaseLoader::check_source_count(sources) {
            log_error!(error.error_code(), &error.to_string());
            return Err(error);
        }

        let mut loader = DatabaseLoader::new();
        for (source_id, source) in sources.iter().enumerate() {
            loader.add_source(source, source_id)?;
        }
        loader.check_core_attributes(preferences)?;

        let (mut traits, index) = loader.into_parts();
        SemanticAnalyzer::analyze(&mut traits, &index)?;

        if preferences.apply_presentation_tweaks {
            presentation::apply_presentation_tweaks(&mut traits, &index);
        }

        log_success!(
            codes::success::DATABASE_LOADED,
            "Trait database loaded",
            "sources" => sources.len(),
            "traits" => traits.len()
        );
        Ok(Self { traits, index })
    }

    pub fn traits(&self) -> &[GurpsProperty] {
        &self.traits
    }

    pub fn get(&self, name: &str) -> Option<&GurpsProperty> {
        self.index_of(name).map(|i| &self.traits[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get_index(&self, i: usize) -> Option<&GurpsProperty> {
        self.traits.get(i)
    }

    /// Root skill of an inheritance chain; the trait itself when it inherits nothing
    pub fn inheritance_root(&self, i: usize) -> Option<usize> {
        inheritance_root(&self.traits, i)
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}
