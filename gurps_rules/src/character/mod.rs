//! Characters: purchased levels over a shared database, with change propagation
//!
//! Only purchased levels are stored. Levels, costs and formatted values are
//! recomputed on every read; the per-trait snapshot string only decides
//! whether a change event fires.

pub mod error;
pub mod evaluator;
pub mod graph;
pub mod snapshot;

pub use error::{CharacterError, CharacterResult};
pub use evaluator::Evaluator;
pub use graph::DependencyGraph;
pub use snapshot::CharacterSnapshot;

use crate::database::GurpsDatabase;
use crate::logging::codes;
use crate::properties::TraitKind;
use crate::{log_debug, log_error, log_success};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Notification that one trait's visible values changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitChanged {
    pub name: String,
    pub snapshot: String,
}

pub trait ChangeListener: Send {
    fn trait_changed(&mut self, event: &TraitChanged);

    /// Called once per mutation that changed anything
    fn character_changed(&mut self) {}
}

/// Everything a sheet shows for one trait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitValue {
    pub name: String,
    pub display_name: String,
    pub purchased_levels: i64,
    pub level: Option<i64>,
    pub cost: Option<i64>,
    pub formatted: String,
}

pub struct GurpsCharacter {
    name: String,
    database: Arc<GurpsDatabase>,
    /// Purchased levels by trait index; the only mutable trait state
    purchased: Vec<i64>,
    /// Last `name:levels:cost:formatted` seen for each trait
    snapshots: Vec<String>,
    listeners: Vec<Box<dyn ChangeListener>>,
    graph: DependencyGraph,
    /// Presentation data from the loaded snapshot, saved back unchanged
    layout: serde_json::Value,
}

impl fmt::Debug for GurpsCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GurpsCharacter")
            .field("name", &self.name)
            .field("traits", &self.purchased.len())
            .field("purchased", &self.to_snapshot().purchases)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl GurpsCharacter {
    pub fn new(database: Arc<GurpsDatabase>) -> Self {
        let graph = DependencyGraph::build(&database);
        let count = database.len();

        let mut character = Self {
            name: String::new(),
            database,
            purchased: vec![0; count],
            snapshots: vec![String::new(); count],
            listeners: Vec::new(),
            graph,
            layout: serde_json::Value::Null,
        };
        character.refresh_snapshots();

        log_success!(
            codes::success::CHARACTER_CREATED,
            "Character created",
            "traits" => count,
            "dependencies" => character.graph.edge_count()
        );
        character
    }

    /// Rebuild a character from saved purchases; every entry is validated
    pub fn from_snapshot(
        database: Arc<GurpsDatabase>,
        snapshot: &CharacterSnapshot,
    ) -> CharacterResult<Self> {
        let mut character = Self::new(database);
        character.name = snapshot.name.clone();
        character.layout = snapshot.layout.clone();

        for (name, &levels) in &snapshot.purchases {
            let index = character.validate_purchase(name, levels)?;
            character.purchased[index] = levels;
        }
        character.refresh_snapshots();
        Ok(character)
    }

    pub fn to_snapshot(&self) -> CharacterSnapshot {
        let purchases = self
            .purchased
            .iter()
            .enumerate()
            .filter(|(_, levels)| **levels != 0)
            .filter_map(|(index, &levels)| {
                let name = &self.database.get_index(index)?.name;
                Some((name.clone(), levels))
            })
            .collect();

        CharacterSnapshot {
            name: self.name.clone(),
            purchases,
            layout: self.layout.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.name {
            self.name = name;
            for listener in &mut self.listeners {
                listener.character_changed();
            }
        }
    }

    pub fn database(&self) -> &Arc<GurpsDatabase> {
        &self.database
    }

    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.database, &self.purchased)
    }

    fn lookup(&self, name: &str) -> CharacterResult<usize> {
        self.database
            .index_of(name)
            .ok_or_else(|| CharacterError::unknown_trait(name))
    }

    pub fn purchased_levels(&self, name: &str) -> CharacterResult<i64> {
        Ok(self.purchased[self.lookup(name)?])
    }

    pub fn level(&self, name: &str) -> CharacterResult<Option<i64>> {
        Ok(self.evaluator().level(self.lookup(name)?))
    }

    pub fn cost(&self, name: &str) -> CharacterResult<Option<i64>> {
        Ok(self.evaluator().cost(self.lookup(name)?))
    }

    pub fn formatted(&self, name: &str) -> CharacterResult<String> {
        let index = self.lookup(name)?;
        Ok(self.value_at(&self.evaluator(), index).formatted)
    }

    pub fn value(&self, name: &str) -> CharacterResult<TraitValue> {
        let index = self.lookup(name)?;
        Ok(self.value_at(&self.evaluator(), index))
    }

    /// Every trait that is purchased or has a computed level, in database order
    pub fn visible_values(&self) -> Vec<TraitValue> {
        let evaluator = self.evaluator();
        (0..self.purchased.len())
            .map(|index| self.value_at(&evaluator, index))
            .filter(|value| value.purchased_levels != 0 || value.level.is_some())
            .collect()
    }

    pub fn total_cost(&self) -> i64 {
        let evaluator = self.evaluator();
        (0..self.purchased.len())
            .filter_map(|index| evaluator.cost(index))
            .fold(0i64, i64::saturating_add)
    }

    fn value_at(&self, evaluator: &Evaluator<'_>, index: usize) -> TraitValue {
        let property = self.database.get_index(index);
        let level = evaluator.level(index);

        TraitValue {
            name: property.map(|p| p.name.clone()).unwrap_or_default(),
            display_name: property
                .map(|p| p.display_name().to_string())
                .unwrap_or_default(),
            purchased_levels: evaluator.purchased(index),
            level,
            cost: evaluator.cost(index),
            formatted: property
                .map(|p| p.format.format(level))
                .unwrap_or_default(),
        }
    }

    fn snapshot_at(&self, evaluator: &Evaluator<'_>, index: usize) -> String {
        let value = self.value_at(evaluator, index);
        let cost = value
            .cost
            .map(|cost| cost.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{}:{}:{}:{}",
            value.name, value.purchased_levels, cost, value.formatted
        )
    }

    fn refresh_snapshots(&mut self) {
        let evaluator = self.evaluator();
        let snapshots = (0..self.purchased.len())
            .map(|index| self.snapshot_at(&evaluator, index))
            .collect();
        self.snapshots = snapshots;
    }

    /// Last recorded `name:levels:cost:formatted` for a trait
    pub fn snapshot_of(&self, name: &str) -> CharacterResult<&str> {
        Ok(&self.snapshots[self.lookup(name)?])
    }

    fn validate_purchase(&self, name: &str, levels: i64) -> CharacterResult<usize> {
        let index = self.lookup(name)?;
        let property = self
            .database
            .get_index(index)
            .ok_or_else(|| CharacterError::unknown_trait(name))?;

        match property.kind {
            TraitKind::AttributeFunction { .. } => Err(CharacterError::not_purchasable(name)),
            TraitKind::BooleanAdvantage { .. } if !(0..=1).contains(&levels) => Err(
                CharacterError::invalid_level(name, levels, "expected 0 or 1"),
            ),
            TraitKind::Skill { .. } | TraitKind::InheritedSkill { .. } if levels < 0 => Err(
                CharacterError::invalid_level(name, levels, "skills cannot be negative"),
            ),
            _ => Ok(index),
        }
    }

    /// Store a new purchased level and notify every trait whose values changed
    ///
    /// Returns the changed trait names in breadth-first visit order.
    pub fn set_purchased_levels(
        &mut self,
        name: &str,
        levels: i64,
    ) -> CharacterResult<Vec<String>> {
        let start = match self.validate_purchase(name, levels) {
            Ok(index) => index,
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(), "trait" => name);
                return Err(error);
            }
        };

        self.purchased[start] = levels;

        let mut changed = Vec::new();
        let mut events = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(index) = queue.pop_front() {
            let snapshot = self.snapshot_at(&self.evaluator(), index);
            if snapshot == self.snapshots[index] {
                continue;
            }

            let name = self.value_name(index);
            self.snapshots[index] = snapshot.clone();
            changed.push(name.clone());
            events.push(TraitChanged { name, snapshot });

            for &dependent in self.graph.dependents(index) {
                if visited.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        for event in &events {
            for listener in &mut self.listeners {
                listener.trait_changed(event);
            }
        }
        if !changed.is_empty() {
            for listener in &mut self.listeners {
                listener.character_changed();
            }
            log_success!(
                codes::success::CHARACTER_UPDATED,
                "Character updated",
                "trait" => name,
                "changed" => changed.len()
            );
        } else {
            log_debug!("Purchase changed nothing", "trait" => name);
        }

        Ok(changed)
    }

    fn value_name(&self, index: usize) -> String {
        self.database
            .get_index(index)
            .map(|property| property.name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LoaderPreferences;
    use crate::declaration::SourceText;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    const SCENARIO: &str = "\
ST : 10 * level
Human : 0 {
 ST += 10
}
Lift = ST*ST/5
";

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        character_changes: Arc<Mutex<usize>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn character_changes(&self) -> usize {
            *self.character_changes.lock().unwrap()
        }

        fn clear(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    impl ChangeListener for Recorder {
        fn trait_changed(&mut self, event: &TraitChanged) {
            self.events.lock().unwrap().push(event.name.clone());
        }

        fn character_changed(&mut self) {
            *self.character_changes.lock().unwrap() += 1;
        }
    }

    fn character(text: &str) -> (GurpsCharacter, Recorder) {
        let database = GurpsDatabase::load(
            &[SourceText::new("character.txt", text)],
            &LoaderPreferences::without_core_attributes(),
        )
        .unwrap();
        let mut character = GurpsCharacter::new(Arc::new(database));
        let recorder = Recorder::default();
        character.add_listener(Box::new(recorder.clone()));
        (character, recorder)
    }

    #[test]
    fn test_racial_template_scenario() {
        let (mut character, recorder) = character(SCENARIO);

        character.set_purchased_levels("Human", 1).unwrap();
        assert_eq!(character.level("ST").unwrap(), Some(10));
        assert_eq!(character.level("Lift").unwrap(), Some(20));

        character.set_purchased_levels("ST", 2).unwrap();
        assert_eq!(character.level("Lift").unwrap(), Some(28));
        assert_eq!(character.cost("ST").unwrap(), Some(20));

        recorder.clear();
        let changed = character.set_purchased_levels("ST", 0).unwrap();
        assert_eq!(character.level("Lift").unwrap(), Some(20));
        assert_eq!(changed, vec!["ST".to_string(), "Lift".to_string()]);
        assert_eq!(
            recorder.events().iter().filter(|name| *name == "Lift").count(),
            1
        );
    }

    #[test]
    fn test_setting_same_level_fires_nothing() {
        let (mut character, recorder) = character(SCENARIO);
        character.set_purchased_levels("ST", 3).unwrap();
        let before = recorder.character_changes();
        recorder.clear();

        let changed = character.set_purchased_levels("ST", 3).unwrap();
        assert!(changed.is_empty());
        assert!(recorder.events().is_empty());
        assert_eq!(recorder.character_changes(), before);
    }

    #[test]
    fn test_unchanged_dependents_stop_propagation() {
        let (mut character, recorder) =
            character("ST : 10 * level\nStrong = IF ST >= 5 THEN 1 ELSE 0\nMighty = Strong * 2\n");

        character.set_purchased_levels("ST", 6).unwrap();
        assert_eq!(recorder.events(), vec!["ST", "Strong", "Mighty"]);

        recorder.clear();
        character.set_purchased_levels("ST", 7).unwrap();
        assert_eq!(recorder.events(), vec!["ST"]);
    }

    #[test]
    fn test_discount_cap() {
        let (mut character, _) = character(
            "Gadget : 100\nA : 0 {\n Gadget.cost -= 30%\n}\nB : 0 {\n Gadget.cost -= 40%\n}\nC : 0 {\n Gadget.cost -= 50%\n}\n",
        );
        character.set_purchased_levels("Gadget", 1).unwrap();
        assert_eq!(character.cost("Gadget").unwrap(), Some(100));

        for name in ["A", "B", "C"] {
            character.set_purchased_levels(name, 1).unwrap();
        }
        assert_eq!(character.cost("Gadget").unwrap(), Some(20));
    }

    #[test]
    fn test_unpurchased_skill_is_absent() {
        let (mut character, _) = character("DX : 20 * level\nGuns : DX E\n");
        assert_eq!(character.level("Guns").unwrap(), None);
        assert_eq!(character.formatted("Guns").unwrap(), "-");

        character.set_purchased_levels("Guns", 1).unwrap();
        assert_eq!(character.level("Guns").unwrap(), Some(0));
        assert_eq!(character.formatted("Guns").unwrap(), "0");
    }

    #[test]
    fn test_reads_are_deterministic() {
        let (mut character, _) = character(SCENARIO);
        character.set_purchased_levels("Human", 1).unwrap();
        assert_eq!(character.level("Lift").unwrap(), character.level("Lift").unwrap());
        assert_eq!(character.total_cost(), character.total_cost());
    }

    #[test]
    fn test_purchase_validation() {
        let (mut character, _) = character(
            "DX : 20 * level\nGuns : DX E\nLuck : 15\nLift = DX * 2\n",
        );

        assert_matches!(
            character.set_purchased_levels("Nope", 1),
            Err(CharacterError::UnknownTrait { .. })
        );
        assert_matches!(
            character.set_purchased_levels("Lift", 1),
            Err(CharacterError::NotPurchasable { .. })
        );
        assert_matches!(
            character.set_purchased_levels("Luck", 2),
            Err(CharacterError::InvalidLevel { level: 2, .. })
        );
        assert_matches!(
            character.set_purchased_levels("Guns", -1),
            Err(CharacterError::InvalidLevel { .. })
        );
        assert!(character.set_purchased_levels("DX", -2).is_ok());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut character, _) = character(SCENARIO);
        character.set_name("Conan");
        character.set_purchased_levels("Human", 1).unwrap();
        character.set_purchased_levels("ST", 2).unwrap();

        let snapshot = character.to_snapshot();
        assert_eq!(snapshot.purchases.len(), 2);
        assert_eq!(snapshot.purchases.get("ST"), Some(&2));

        let restored =
            GurpsCharacter::from_snapshot(character.database().clone(), &snapshot).unwrap();
        assert_eq!(restored.name(), "Conan");
        assert_eq!(restored.level("Lift").unwrap(), Some(28));
        assert_eq!(restored.total_cost(), character.total_cost());
        assert_eq!(
            restored.snapshot_of("Lift").unwrap(),
            character.snapshot_of("Lift").unwrap()
        );
    }

    #[test]
    fn test_snapshot_keeps_layout() {
        let (character, _) = character(SCENARIO);
        let mut snapshot = CharacterSnapshot::new("Conan");
        snapshot.purchases.insert("ST".to_string(), 1);
        snapshot.layout = serde_json::json!({ "columns": ["ST", "Lift"] });

        let restored =
            GurpsCharacter::from_snapshot(character.database().clone(), &snapshot).unwrap();
        assert_eq!(restored.to_snapshot(), snapshot);
        assert!(character.to_snapshot().layout.is_null());
    }

    #[test]
    fn test_debug_lists_purchases() {
        let (mut character, _) = character(SCENARIO);
        character.set_name("Conan");
        character.set_purchased_levels("ST", 2).unwrap();

        let text = format!("{:?}", character);
        assert!(text.starts_with("GurpsCharacter { name: \"Conan\""));
        assert!(text.contains("\"ST\": 2"));
        assert!(text.contains("listeners: 1"));
    }

    #[test]
    fn test_per_level_surcharge_and_discount_pool() {
        let (mut character, recorder) = character(
            "ST : 10 * level\nMagery : 5 * level {\n ST.cost += level * 10%\n}\nFrugal : 0 {\n ST.cost -= 50%\n}\n",
        );
        character.set_purchased_levels("ST", 3).unwrap();
        assert_eq!(character.cost("ST").unwrap(), Some(30));

        recorder.clear();
        character.set_purchased_levels("Magery", 2).unwrap();
        assert_eq!(character.cost("ST").unwrap(), Some(36));
        assert_eq!(recorder.events(), vec!["Magery", "ST"]);

        character.set_purchased_levels("Frugal", 1).unwrap();
        assert_eq!(character.cost("ST").unwrap(), Some(21));

        character.set_purchased_levels("Magery", 5).unwrap();
        assert_eq!(character.cost("ST").unwrap(), Some(30));
        assert_eq!(character.level("ST").unwrap(), Some(3));
        assert_eq!(character.total_cost(), 30 + 25);
    }

    #[test]
    fn test_snapshot_rejects_unknown_traits() {
        let (character, _) = character(SCENARIO);
        let mut snapshot = CharacterSnapshot::new("Nobody");
        snapshot.purchases.insert("Wings".to_string(), 1);

        assert_matches!(
            GurpsCharacter::from_snapshot(character.database().clone(), &snapshot),
            Err(CharacterError::UnknownTrait { name }) if name == "Wings"
        );
    }

    #[test]
    fn test_total_cost() {
        let (mut character, _) = character("ST : 10 * level\nDX : 20 * level\nGuns : DX E\nLift = ST\n");
        character.set_purchased_levels("ST", 1).unwrap();
        character.set_purchased_levels("DX", 2).unwrap();
        character.set_purchased_levels("Guns", 4).unwrap();
        assert_eq!(character.total_cost(), 10 + 40 + 8);
    }

    #[test]
    fn test_visible_values_skip_untouched_skills() {
        let (mut character, _) = character("DX : 20 * level\nGuns : DX E\n");
        character.set_purchased_levels("DX", 1).unwrap();

        let names: Vec<String> = character
            .visible_values()
            .into_iter()
            .map(|value| value.name)
            .collect();
        assert_eq!(names, vec!["DX".to_string()]);
    }
}
