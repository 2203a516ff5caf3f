//! Level and cost evaluation against one character's purchases
//!
//! Everything here is a pure function of the database and the purchased
//! levels. A checked database guarantees that names resolve, sorts match
//! and no evaluation recurses forever; anything that still slips through
//! evaluates to `None` rather than panicking.

use crate::database::GurpsDatabase;
use crate::formula::{BinaryOperator, Formula};
use crate::properties::{CostOperator, Difficulty, EffectKind, GurpsProperty, TraitKind};

/// Largest discount cost modifiers may add up to, in percent
pub const MAX_DISCOUNT: i64 = 80;

/// Skill point cost for a number of purchased levels
pub fn skill_cost(levels: i64) -> i64 {
    if levels < 3 {
        levels
    } else {
        levels.saturating_sub(2).saturating_mul(4)
    }
}

/// Apply pooled cost modifiers; `discount` is positive and capped
pub fn apply_cost_modifiers(cost: i64, surcharge: i64, discount: i64) -> i64 {
    let percent = surcharge.saturating_sub(discount.min(MAX_DISCOUNT));
    cost.saturating_add(cost.saturating_mul(percent).div_euclid(100))
}

pub struct Evaluator<'a> {
    database: &'a GurpsDatabase,
    purchased: &'a [i64],
}

impl<'a> Evaluator<'a> {
    pub fn new(database: &'a GurpsDatabase, purchased: &'a [i64]) -> Self {
        Self {
            database,
            purchased,
        }
    }

    pub fn purchased(&self, i: usize) -> i64 {
        self.purchased.get(i).copied().unwrap_or(0)
    }

    fn property(&self, i: usize) -> Option<&'a GurpsProperty> {
        self.database.get_index(i)
    }

    /// Current level including active trait modifiers
    pub fn level(&self, i: usize) -> Option<i64> {
        let base = self.base_level(i)?;

        let bonus = self
            .active_effects(i)
            .filter(|(_, kind, _)| *kind == EffectKind::TraitModifier)
            .filter_map(|(owner, _, formula)| self.eval_int(formula, self.purchased(owner)))
            .fold(0i64, i64::saturating_add);

        Some(base.saturating_add(bonus))
    }

    fn base_level(&self, i: usize) -> Option<i64> {
        let property = self.property(i)?;
        let purchased = self.purchased(i);

        match &property.kind {
            TraitKind::IntAdvantage { .. } | TraitKind::BooleanAdvantage { .. } => Some(purchased),
            TraitKind::AttributeFunction { formula } => self.eval_int(formula, purchased),
            TraitKind::Skill { .. } | TraitKind::InheritedSkill { .. } => {
                if purchased == 0 {
                    return None;
                }
                let root = self.database.inheritance_root(i)?;
                let TraitKind::Skill { formula, .. } = &self.property(root)?.kind else {
                    return None;
                };
                let offset = self.effective_difficulty(i)?.offset();

                self.eval_int(formula, purchased)
                    .map(|base| base.saturating_add(offset).saturating_add(purchased))
            }
        }
    }

    /// Explicit difficulty, or the parent's made one step easier unless the parent is a category
    pub fn effective_difficulty(&self, i: usize) -> Option<Difficulty> {
        let mut current = i;
        let mut steps = 0;

        for _ in 0..=self.database.len() {
            match &self.property(current)?.kind {
                TraitKind::Skill { difficulty, .. } => return Some(ease(*difficulty, steps)),
                TraitKind::InheritedSkill {
                    difficulty: Some(difficulty),
                    ..
                } => return Some(ease(*difficulty, steps)),
                TraitKind::InheritedSkill {
                    difficulty: None,
                    parent_index,
                    ..
                } => {
                    let parent = (*parent_index)?;
                    if !self.property(parent)?.is_category() {
                        steps += 1;
                    }
                    current = parent;
                }
                _ => return None,
            }
        }
        None
    }

    /// Point cost including active cost modifiers
    pub fn cost(&self, i: usize) -> Option<i64> {
        let property = self.property(i)?;
        let purchased = self.purchased(i);

        let base = match &property.kind {
            TraitKind::AttributeFunction { .. } => return None,
            TraitKind::IntAdvantage { cost } | TraitKind::BooleanAdvantage { cost } => {
                if purchased == 0 {
                    0
                } else {
                    self.eval_int(cost, purchased).unwrap_or(0)
                }
            }
            TraitKind::Skill { .. } | TraitKind::InheritedSkill { .. } => skill_cost(purchased),
        };

        let mut surcharge = 0i64;
        let mut discount = 0i64;
        for (owner, kind, formula) in self.active_effects(i) {
            let EffectKind::CostModifier(operator) = kind else {
                continue;
            };
            let Some(percent) = self.eval_percent(formula, self.purchased(owner)) else {
                continue;
            };
            let signed = match operator {
                CostOperator::Add => percent,
                CostOperator::Subtract => percent.saturating_neg(),
            };
            if signed >= 0 {
                surcharge = surcharge.saturating_add(signed);
            } else {
                discount = discount.saturating_add(signed.saturating_neg());
            }
        }

        Some(apply_cost_modifiers(base, surcharge, discount))
    }

    /// Effects targeting `i` whose owner is currently purchased
    fn active_effects(
        &self,
        i: usize,
    ) -> impl Iterator<Item = (usize, EffectKind, &'a Formula)> + '_ {
        self.property(i)
            .into_iter()
            .flat_map(|property| property.effected_by.iter())
            .filter(move |effect_ref| self.purchased(effect_ref.owner) != 0)
            .filter_map(move |effect_ref| {
                let effect = self.property(effect_ref.owner)?.effects.get(effect_ref.effect)?;
                Some((effect_ref.owner, effect.kind, &effect.formula))
            })
    }

    /// Whether a trait counts as true inside a boolean formula
    pub fn truth(&self, i: usize) -> bool {
        let Some(property) = self.property(i) else {
            return false;
        };

        match property.kind {
            TraitKind::BooleanAdvantage { .. } => self.purchased(i) != 0,
            TraitKind::Skill { .. } | TraitKind::InheritedSkill { .. } => self.level(i).is_some(),
            TraitKind::IntAdvantage { .. } | TraitKind::AttributeFunction { .. } => false,
        }
    }

    fn identifier(&self, name: &str) -> Option<usize> {
        self.database.index_of(name)
    }

    /// `level` is the purchased level of the trait the formula belongs to
    pub fn eval_int(&self, formula: &Formula, level: i64) -> Option<i64> {
        match formula {
            Formula::Integer(value) => Some(*value),
            Formula::Level => Some(level),
            Formula::Identifier(name) => self.level(self.identifier(name)?),
            Formula::Negate(operand) => self.eval_int(operand, level).map(i64::saturating_neg),
            Formula::Binary { op, left, right } => {
                let left = self.eval_int(left, level)?;
                let right = self.eval_int(right, level)?;
                match op {
                    BinaryOperator::Add => Some(left.saturating_add(right)),
                    BinaryOperator::Subtract => Some(left.saturating_sub(right)),
                    BinaryOperator::Multiply => Some(left.saturating_mul(right)),
                    BinaryOperator::Divide if right != 0 => Some(left.saturating_div(right)),
                    _ => None,
                }
            }
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(condition, level) {
                    self.eval_int(then_branch, level)
                } else {
                    self.eval_int(else_branch, level)
                }
            }
            Formula::Percent(_) | Formula::Boolean(_) => None,
        }
    }

    pub fn eval_bool(&self, formula: &Formula, level: i64) -> bool {
        match formula {
            Formula::Boolean(value) => *value,
            Formula::Identifier(name) => self.identifier(name).is_some_and(|i| self.truth(i)),
            Formula::Binary { op, left, right } => match op {
                BinaryOperator::And => self.eval_bool(left, level) && self.eval_bool(right, level),
                BinaryOperator::Or => self.eval_bool(left, level) || self.eval_bool(right, level),
                op if op.is_comparison() => {
                    let (Some(left), Some(right)) =
                        (self.eval_int(left, level), self.eval_int(right, level))
                    else {
                        return false;
                    };
                    match op {
                        BinaryOperator::Less => left < right,
                        BinaryOperator::LessEqual => left <= right,
                        BinaryOperator::Greater => left > right,
                        BinaryOperator::GreaterEqual => left >= right,
                        _ => false,
                    }
                }
                _ => false,
            },
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(condition, level) {
                    self.eval_bool(then_branch, level)
                } else {
                    self.eval_bool(else_branch, level)
                }
            }
            Formula::Level | Formula::Integer(_) | Formula::Percent(_) | Formula::Negate(_) => {
                false
            }
        }
    }

    /// Value in percent points; `37%` evaluates to 37
    pub fn eval_percent(&self, formula: &Formula, level: i64) -> Option<i64> {
        match formula {
            Formula::Percent(percent) => Some(percent.hundredths()),
            Formula::Binary {
                op: BinaryOperator::Multiply,
                left,
                right,
            } => {
                if let Some(percent) = self.eval_scaled_percent(left, right, level) {
                    return Some(percent);
                }
                self.eval_scaled_percent(right, left, level)
            }
            _ => None,
        }
    }

    fn eval_scaled_percent(&self, scale: &Formula, percent: &Formula, level: i64) -> Option<i64> {
        if !scale.mentions_level() {
            return None;
        }
        let percent = self.eval_percent(percent, level)?;
        Some(self.eval_int(scale, level)?.saturating_mul(percent))
    }
}

fn ease(difficulty: Difficulty, steps: usize) -> Difficulty {
    (0..steps).fold(difficulty, |difficulty, _| difficulty.easier())
}
