//! Circular definition detection
//!
//! Three graphs are searched depth-first: skill inheritance chains,
//! attribute-function references, and the level evaluation graph.

use super::specialty_checker::inheritance_root;
use super::types::{SemanticError, SemanticResult};
use crate::config::compile_time::semantic::MAX_DEPENDENCY_DEPTH;
use crate::properties::{EffectKind, GurpsProperty, TraitKind};
use crate::{log_debug, log_info};
use std::collections::HashMap;

/// Adjacency lists indexed by trait position
type Adjacency = Vec<Vec<usize>>;

fn resolve_names(names: Vec<&str>, index: &HashMap<String, usize>) -> Vec<usize> {
    names
        .into_iter()
        .filter_map(|name| index.get(name).copied())
        .collect()
}

fn push_unique(edges: &mut Vec<usize>, node: usize) {
    if !edges.contains(&node) {
        edges.push(node);
    }
}

pub fn inheritance_graph(traits: &[GurpsProperty]) -> Adjacency {
    traits
        .iter()
        .map(|property| match property.kind {
            TraitKind::InheritedSkill {
                parent_index: Some(parent),
                ..
            } => vec![parent],
            _ => Vec::new(),
        })
        .collect()
}

pub fn function_graph(traits: &[GurpsProperty], index: &HashMap<String, usize>) -> Adjacency {
    traits
        .iter()
        .map(|property| match &property.kind {
            TraitKind::AttributeFunction { formula } => {
                let mut edges = Vec::new();
                for used in resolve_names(formula.used_names(), index) {
                    if matches!(traits[used].kind, TraitKind::AttributeFunction { .. }) {
                        push_unique(&mut edges, used);
                    }
                }
                edges
            }
            _ => Vec::new(),
        })
        .collect()
}

/// Everything a trait's level reads: its function formula, its inheritance
/// root's formula, and the trait modifiers targeting it. Costs are never
/// read by a level, so cost formulas cannot close a cycle.
pub fn evaluation_graph(traits: &[GurpsProperty], index: &HashMap<String, usize>) -> Adjacency {
    traits
        .iter()
        .enumerate()
        .map(|(i, property)| {
            let mut edges = Vec::new();

            let formula = match &property.kind {
                TraitKind::AttributeFunction { formula } => Some(formula),
                TraitKind::Skill { .. } | TraitKind::InheritedSkill { .. } => {
                    inheritance_root(traits, i).and_then(|root| traits[root].own_formula())
                }
                TraitKind::IntAdvantage { .. } | TraitKind::BooleanAdvantage { .. } => None,
            };
            if let Some(formula) = formula {
                for used in resolve_names(formula.used_names(), index) {
                    push_unique(&mut edges, used);
                }
            }

            for effect_ref in &property.effected_by {
                let effect = &traits[effect_ref.owner].effects[effect_ref.effect];
                if effect.kind != EffectKind::TraitModifier {
                    continue;
                }
                for used in resolve_names(effect.formula.used_names(), index) {
                    push_unique(&mut edges, used);
                }
            }

            edges
        })
        .collect()
}

struct CycleSearch<'a> {
    adjacency: &'a Adjacency,
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    path: Vec<usize>,
}

enum SearchOutcome {
    Clear,
    Cycle(Vec<usize>),
    TooDeep(usize),
}

impl<'a> CycleSearch<'a> {
    fn new(adjacency: &'a Adjacency) -> Self {
        Self {
            adjacency,
            visited: vec![false; adjacency.len()],
            on_stack: vec![false; adjacency.len()],
            path: Vec::new(),
        }
    }

    fn run(mut self) -> SearchOutcome {
        for node in 0..self.adjacency.len() {
            if !self.visited[node] {
                match self.visit(node, 0) {
                    SearchOutcome::Clear => {}
                    outcome => return outcome,
                }
            }
        }
        SearchOutcome::Clear
    }

    fn visit(&mut self, node: usize, depth: usize) -> SearchOutcome {
        if depth > MAX_DEPENDENCY_DEPTH {
            return SearchOutcome::TooDeep(node);
        }

        self.visited[node] = true;
        self.on_stack[node] = true;
        self.path.push(node);

        let adjacency = self.adjacency;
        for &neighbor in &adjacency[node] {
            if self.on_stack[neighbor] {
                let start = self.path.iter().position(|&n| n == neighbor).unwrap_or(0);
                return SearchOutcome::Cycle(self.path[start..].to_vec());
            }
            if !self.visited[neighbor] {
                match self.visit(neighbor, depth + 1) {
                    SearchOutcome::Clear => {}
                    outcome => return outcome,
                }
            }
        }

        self.on_stack[node] = false;
        self.path.pop();
        SearchOutcome::Clear
    }
}

fn check_graph(
    traits: &[GurpsProperty],
    adjacency: &Adjacency,
    description: &str,
) -> SemanticResult<()> {
    log_debug!("Searching for cycles",
        "graph" => description,
        "nodes" => adjacency.len(),
        "edges" => adjacency.iter().map(Vec::len).sum::<usize>()
    );

    match CycleSearch::new(adjacency).run() {
        SearchOutcome::Clear => Ok(()),
        SearchOutcome::TooDeep(node) => Err(SemanticError::dependency_too_deep(
            &traits[node].name,
            &traits[node].location,
        )),
        SearchOutcome::Cycle(cycle) => {
            log_info!("Cycle found",
                "graph" => description,
                "cycle_length" => cycle.len()
            );
            let names = cycle.iter().map(|&i| traits[i].name.clone()).collect();
            let locations = cycle.iter().map(|&i| traits[i].location.clone()).collect();
            Err(SemanticError::circular_definition(description, names, locations))
        }
    }
}

pub fn check_inheritance_cycles(traits: &[GurpsProperty]) -> SemanticResult<()> {
    check_graph(traits, &inheritance_graph(traits), "recursive skill inheritance")
}

pub fn check_function_cycles(
    traits: &[GurpsProperty],
    index: &HashMap<String, usize>,
) -> SemanticResult<()> {
    check_graph(traits, &function_graph(traits, index), "recursive functions")
}

/// Requires parents resolved and inheritance already known to be acyclic
pub fn check_evaluation_cycles(
    traits: &[GurpsProperty],
    index: &HashMap<String, usize>,
) -> SemanticResult<()> {
    check_graph(
        traits,
        &evaluation_graph(traits, index),
        "circular dependency",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_finds_cycle_path() {
        let adjacency = vec![vec![1], vec![2], vec![1]];
        match CycleSearch::new(&adjacency).run() {
            SearchOutcome::Cycle(cycle) => assert_eq!(cycle, vec![1, 2]),
            _ => panic!("expected a cycle"),
        }
    }

    #[test]
    fn test_search_accepts_diamond() {
        let adjacency = vec![vec![1, 2], vec![3], vec![3], vec![]];
        assert!(matches!(CycleSearch::new(&adjacency).run(), SearchOutcome::Clear));
    }

    #[test]
    fn test_self_loop() {
        let adjacency = vec![vec![0]];
        assert!(matches!(
            CycleSearch::new(&adjacency).run(),
            SearchOutcome::Cycle(cycle) if cycle == vec![0]
        ));
    }
}
