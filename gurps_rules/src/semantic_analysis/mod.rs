//! Whole-database semantic analysis
//!
//! Runs after every source has been registered: formula sorts, effect
//! targets, inheritance links, then the circularity and specialty rules.

pub mod cycle_analyzer;
pub mod specialty_checker;
pub mod type_checker;
pub mod types;

pub use specialty_checker::inheritance_root;
pub use type_checker::CheckingContext;
pub use types::{SemanticError, SemanticResult, ValueSort};

use crate::logging::codes;
use crate::properties::GurpsProperty;
use crate::{log_debug, log_error, log_info, log_success};
use std::collections::HashMap;

pub struct SemanticAnalyzer;

impl SemanticAnalyzer {
    /// Check the database in place, filling `effected_by` and parent links
    pub fn analyze(
        traits: &mut [GurpsProperty],
        index: &HashMap<String, usize>,
    ) -> SemanticResult<()> {
        log_info!("Starting semantic analysis", "traits" => traits.len());

        let result = Self::run_checks(traits, index);
        if let Err(error) = &result {
            match error.location() {
                Some(location) => log_error!(
                    error.error_code(),
                    &error.log_message(),
                    location = location.clone(),
                    "error_type" => error.error_type()
                ),
                None => log_error!(
                    error.error_code(),
                    &error.log_message(),
                    "error_type" => error.error_type()
                ),
            }
        }
        result
    }

    fn run_checks(
        traits: &mut [GurpsProperty],
        index: &HashMap<String, usize>,
    ) -> SemanticResult<()> {
        log_debug!("Step 1: Checking formula sorts and effect targets");
        let links = type_checker::check_formulas(traits, index)?;
        let link_count = links.len();
        type_checker::link_effects(traits, links);
        log_success!(
            codes::success::TYPE_CHECKING_PASSED,
            "Formula type checking passed",
            "effects" => link_count
        );

        log_debug!("Step 2: Resolving inherited skill parents");
        specialty_checker::resolve_parents(traits, index)?;

        log_debug!("Step 3: Checking for circular definitions");
        cycle_analyzer::check_inheritance_cycles(traits)?;
        cycle_analyzer::check_function_cycles(traits, index)?;
        specialty_checker::check_optional_specialties(traits)?;
        cycle_analyzer::check_evaluation_cycles(traits, index)?;
        log_success!(
            codes::success::CYCLE_CHECK_PASSED,
            "No circular definitions found"
        );

        Ok(())
    }
}
