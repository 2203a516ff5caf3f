//! Change subscriptions between traits
//!
//! `dependents[i]` lists every trait whose level, cost or formatted value
//! may read trait `i`. Built once per character from the database.

use crate::database::GurpsDatabase;
use crate::properties::{GurpsProperty, TraitKind};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn build(database: &GurpsDatabase) -> Self {
        let mut graph = Self {
            dependents: vec![Vec::new(); database.len()],
        };

        for (i, property) in database.traits().iter().enumerate() {
            if let Some(formula) = property.own_formula() {
                graph.subscribe_names(database, formula.used_names(), i);
            }

            for ancestor in ancestors(database, property) {
                graph.subscribe(ancestor, i);
                if let Some(formula) = database.get_index(ancestor).and_then(|a| a.own_formula()) {
                    graph.subscribe_names(database, formula.used_names(), i);
                }
            }

            for effect_ref in &property.effected_by {
                graph.subscribe(effect_ref.owner, i);
                let effect = database
                    .get_index(effect_ref.owner)
                    .and_then(|owner| owner.effects.get(effect_ref.effect));
                if let Some(effect) = effect {
                    graph.subscribe_names(database, effect.formula.used_names(), i);
                }
            }
        }

        graph
    }

    fn subscribe(&mut self, source: usize, dependent: usize) {
        if source == dependent {
            return;
        }
        if let Some(edges) = self.dependents.get_mut(source) {
            if !edges.contains(&dependent) {
                edges.push(dependent);
            }
        }
    }

    fn subscribe_names(&mut self, database: &GurpsDatabase, names: Vec<&str>, dependent: usize) {
        for name in names {
            if let Some(source) = database.index_of(name) {
                self.subscribe(source, dependent);
            }
        }
    }

    pub fn dependents(&self, i: usize) -> &[usize] {
        self.dependents.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(Vec::len).sum()
    }
}

/// Every parent up the inheritance chain, nearest first
fn ancestors(database: &GurpsDatabase, property: &GurpsProperty) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut current = property;

    while let TraitKind::InheritedSkill {
        parent_index: Some(parent),
        ..
    } = current.kind
    {
        if chain.contains(&parent) || chain.len() > database.len() {
            break;
        }
        chain.push(parent);
        match database.get_index(parent) {
            Some(next) => current = next,
            None => break,
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LoaderPreferences;
    use crate::declaration::SourceText;

    fn graph(text: &str) -> (GurpsDatabase, DependencyGraph) {
        let database = GurpsDatabase::load(
            &[SourceText::new("graph.txt", text)],
            &LoaderPreferences::without_core_attributes(),
        )
        .unwrap();
        let graph = DependencyGraph::build(&database);
        (database, graph)
    }

    fn dependents_of<'a>(
        database: &'a GurpsDatabase,
        graph: &DependencyGraph,
        name: &str,
    ) -> Vec<&'a str> {
        let i = database.index_of(name).unwrap();
        graph
            .dependents(i)
            .iter()
            .map(|&d| database.get_index(d).unwrap().name.as_str())
            .collect()
    }

    #[test]
    fn test_formula_references() {
        let (database, graph) = graph("ST : 10 * level\nLift = ST * ST / 5\nCarry = Lift * 2\n");
        assert_eq!(dependents_of(&database, &graph, "ST"), vec!["Lift"]);
        assert_eq!(dependents_of(&database, &graph, "Lift"), vec!["Carry"]);
        assert!(dependents_of(&database, &graph, "Carry").is_empty());
    }

    #[test]
    fn test_effect_owner_and_formula_names() {
        let (database, graph) =
            graph("ST : 10 * level\nIQ : 20 * level\nHuman : 0 {\n ST += IQ\n}\n");
        assert_eq!(dependents_of(&database, &graph, "Human"), vec!["ST"]);
        assert_eq!(dependents_of(&database, &graph, "IQ"), vec!["ST"]);
    }

    #[test]
    fn test_inheritance_ancestors() {
        let (database, graph) = graph(
            "DX : 20 * level\nSwords : DX H {\n category = true\n}\nSaber := Swords\nCavalry Saber := Saber\n",
        );
        assert_eq!(
            dependents_of(&database, &graph, "DX"),
            vec!["Swords", "Saber", "Cavalry Saber"]
        );
        assert_eq!(
            dependents_of(&database, &graph, "Swords"),
            vec!["Saber", "Cavalry Saber"]
        );
    }
}
