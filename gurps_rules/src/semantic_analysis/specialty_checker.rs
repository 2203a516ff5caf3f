//! Skill inheritance: parent resolution and the optional-specialty rules

use super::types::{SemanticError, SemanticResult};
use crate::properties::{GurpsProperty, TraitKind};
use std::collections::HashMap;

/// Point every inherited skill at its parent
pub fn resolve_parents(
    traits: &mut [GurpsProperty],
    index: &HashMap<String, usize>,
) -> SemanticResult<()> {
    for i in 0..traits.len() {
        let TraitKind::InheritedSkill { parent, .. } = &traits[i].kind else {
            continue;
        };

        let location = &traits[i].location;
        let resolved = *index
            .get(parent)
            .ok_or_else(|| SemanticError::undefined_name(parent, location))?;

        if !traits[resolved].is_skill() {
            return Err(SemanticError::wrong_kind(
                format!("Parent is not a skill '{}'", parent),
                location,
            ));
        }

        if let TraitKind::InheritedSkill { parent_index, .. } = &mut traits[i].kind {
            *parent_index = Some(resolved);
        }
    }
    Ok(())
}

fn parent_of(traits: &[GurpsProperty], i: usize) -> Option<usize> {
    match traits.get(i)?.kind {
        TraitKind::InheritedSkill { parent_index, .. } => parent_index,
        _ => None,
    }
}

/// Category specialties need category parents, and a plain specialty of a
/// specialty needs that specialty to sit under a category
pub fn check_optional_specialties(traits: &[GurpsProperty]) -> SemanticResult<()> {
    for (i, property) in traits.iter().enumerate() {
        let TraitKind::InheritedSkill { category, .. } = property.kind else {
            continue;
        };
        let Some(parent) = parent_of(traits, i) else {
            continue;
        };

        if category {
            if !traits[parent].is_category() {
                return Err(SemanticError::wrong_kind(
                    "Optional specialties cannot be categories",
                    &property.location,
                ));
            }
        } else if let Some(grandparent) = parent_of(traits, parent) {
            if !traits[grandparent].is_category() {
                return Err(SemanticError::wrong_kind(
                    "Optional specialties cannot be based on optional specialties",
                    &property.location,
                ));
            }
        }
    }
    Ok(())
}

/// Walk parent links to the root skill; `None` if the chain never ends
pub fn inheritance_root(traits: &[GurpsProperty], start: usize) -> Option<usize> {
    let mut current = start;
    for _ in 0..=traits.len() {
        match parent_of(traits, current) {
            Some(parent) => current = parent,
            None => return Some(current),
        }
    }
    None
}
