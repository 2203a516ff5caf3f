//! Three-sorted type checking of trait and effect formulas

use super::types::{SemanticError, SemanticResult, ValueSort};
use crate::formula::{BinaryOperator, Formula};
use crate::properties::{EffectKind, EffectRef, GurpsProperty, TraitKind};
use crate::utils::Location;
use std::collections::HashMap;

/// Name table plus the trait whose formula is being checked
pub struct CheckingContext<'a> {
    traits: &'a [GurpsProperty],
    index: &'a HashMap<String, usize>,
    enclosing: &'a GurpsProperty,
    location: &'a Location,
}

impl<'a> CheckingContext<'a> {
    pub fn new(
        traits: &'a [GurpsProperty],
        index: &'a HashMap<String, usize>,
        enclosing: &'a GurpsProperty,
    ) -> Self {
        Self {
            traits,
            index,
            enclosing,
            location: &enclosing.location,
        }
    }

    /// Same context, reporting errors at another location
    pub fn at(&self, location: &'a Location) -> Self {
        Self {
            traits: self.traits,
            index: self.index,
            enclosing: self.enclosing,
            location,
        }
    }

    fn lookup(&self, name: &str) -> SemanticResult<&'a GurpsProperty> {
        self.index
            .get(name)
            .and_then(|&i| self.traits.get(i))
            .ok_or_else(|| SemanticError::undefined_name(name, self.location))
    }

    fn check_level(&self) -> SemanticResult<()> {
        if matches!(self.enclosing.kind, TraitKind::AttributeFunction { .. }) {
            return Err(SemanticError::undefined_name("level", self.location));
        }
        Ok(())
    }

    pub fn check_is_int(&self, formula: &Formula) -> SemanticResult<()> {
        match formula {
            Formula::Integer(_) => Ok(()),
            Formula::Level => self.check_level(),
            Formula::Identifier(name) => match self.lookup(name)?.kind {
                TraitKind::IntAdvantage { .. }
                | TraitKind::AttributeFunction { .. }
                | TraitKind::Skill { .. }
                | TraitKind::InheritedSkill { .. } => Ok(()),
                TraitKind::BooleanAdvantage { .. } => Err(self.expected(ValueSort::Int, formula)),
            },
            Formula::Negate(operand) => self.check_is_int(operand),
            Formula::Binary { op, left, right } => match op {
                BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply => {
                    self.check_is_int(left)?;
                    self.check_is_int(right)
                }
                BinaryOperator::Divide => {
                    self.check_is_int(left)?;
                    match right.as_ref() {
                        Formula::Integer(divisor) if *divisor != 0 => Ok(()),
                        _ => Err(SemanticError::illegal_division(formula, self.location)),
                    }
                }
                BinaryOperator::Comma => Err(SemanticError::comma_operator(formula, self.location)),
                _ => Err(self.expected(ValueSort::Int, formula)),
            },
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_is_boolean(condition)?;
                self.check_is_int(then_branch)?;
                self.check_is_int(else_branch)
            }
            Formula::Percent(_) | Formula::Boolean(_) => Err(self.expected(ValueSort::Int, formula)),
        }
    }

    pub fn check_is_boolean(&self, formula: &Formula) -> SemanticResult<()> {
        match formula {
            Formula::Boolean(_) => Ok(()),
            Formula::Identifier(name) => match self.lookup(name)?.kind {
                TraitKind::BooleanAdvantage { .. }
                | TraitKind::Skill { .. }
                | TraitKind::InheritedSkill { .. } => Ok(()),
                TraitKind::IntAdvantage { .. } | TraitKind::AttributeFunction { .. } => {
                    Err(self.expected(ValueSort::Boolean, formula))
                }
            },
            Formula::Binary { op, left, right } => match op {
                op if op.is_comparison() => {
                    self.check_is_int(left)?;
                    self.check_is_int(right)
                }
                BinaryOperator::And | BinaryOperator::Or => {
                    self.check_is_boolean(left)?;
                    self.check_is_boolean(right)
                }
                BinaryOperator::Comma => Err(SemanticError::comma_operator(formula, self.location)),
                _ => Err(self.expected(ValueSort::Boolean, formula)),
            },
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_is_boolean(condition)?;
                self.check_is_boolean(then_branch)?;
                self.check_is_boolean(else_branch)
            }
            Formula::Level
            | Formula::Integer(_)
            | Formula::Percent(_)
            | Formula::Negate(_) => Err(self.expected(ValueSort::Boolean, formula)),
        }
    }

    /// A percent literal, or an int that mentions `level` times a percent
    pub fn check_is_percent(&self, formula: &Formula) -> SemanticResult<()> {
        match formula {
            Formula::Percent(_) => Ok(()),
            Formula::Binary {
                op: BinaryOperator::Multiply,
                left,
                right,
            } => {
                if self.is_scaled_percent(left, right) || self.is_scaled_percent(right, left) {
                    Ok(())
                } else {
                    Err(self.expected(ValueSort::Percent, formula))
                }
            }
            Formula::Binary {
                op: BinaryOperator::Comma,
                ..
            } => Err(SemanticError::comma_operator(formula, self.location)),
            _ => Err(self.expected(ValueSort::Percent, formula)),
        }
    }

    fn is_scaled_percent(&self, scale: &Formula, percent: &Formula) -> bool {
        scale.mentions_level()
            && self.check_is_int(scale).is_ok()
            && self.check_is_percent(percent).is_ok()
    }

    fn expected(&self, sort: ValueSort, formula: &Formula) -> SemanticError {
        SemanticError::expected_sort(sort, formula, self.location)
    }
}

/// Check every trait formula and effect, returning the effect links to record on targets
pub fn check_formulas(
    traits: &[GurpsProperty],
    index: &HashMap<String, usize>,
) -> SemanticResult<Vec<(usize, EffectRef)>> {
    let mut links = Vec::new();

    for (owner, property) in traits.iter().enumerate() {
        let context = CheckingContext::new(traits, index, property);

        match &property.kind {
            TraitKind::Skill { formula, .. } | TraitKind::AttributeFunction { formula } => {
                context.check_is_int(formula)?
            }
            TraitKind::IntAdvantage { cost } | TraitKind::BooleanAdvantage { cost } => {
                context.check_is_int(cost)?
            }
            TraitKind::InheritedSkill { .. } => {}
        }

        for (effect_index, effect) in property.effects.iter().enumerate() {
            let context = context.at(&effect.location);
            let target = index
                .get(&effect.target)
                .copied()
                .ok_or_else(|| SemanticError::undefined_name(&effect.target, &effect.location))?;
            let target_property = &traits[target];

            match effect.kind {
                EffectKind::TraitModifier => {
                    if !target_property.has_level() {
                        return Err(SemanticError::wrong_kind(
                            "Cannot modify the level of a trait with no level",
                            &effect.location,
                        ));
                    }
                    context.check_is_int(&effect.formula)?;
                }
                EffectKind::CostModifier(_) => {
                    if !target_property.has_cost() {
                        return Err(SemanticError::wrong_kind(
                            "Cannot modify the cost of a trait with no cost",
                            &effect.location,
                        ));
                    }
                    context.check_is_percent(&effect.formula)?;
                }
            }

            links.push((
                target,
                EffectRef {
                    owner,
                    effect: effect_index,
                },
            ));
        }
    }

    Ok(links)
}

/// Record each effect on the trait it targets
pub fn link_effects(traits: &mut [GurpsProperty], links: Vec<(usize, EffectRef)>) {
    for (target, effect_ref) in links {
        if let Some(property) = traits.get_mut(target) {
            property.effected_by.push(effect_ref);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_formula;
    use assert_matches::assert_matches;

    fn table() -> (Vec<GurpsProperty>, HashMap<String, usize>) {
        let location = Location::new("types.txt", 1);
        let traits = vec![
            GurpsProperty::new(
                "ST",
                TraitKind::IntAdvantage {
                    cost: parse_formula("10 * level", &location).unwrap(),
                },
                location.clone(),
            ),
            GurpsProperty::new(
                "Luck",
                TraitKind::BooleanAdvantage {
                    cost: Formula::Integer(15),
                },
                location.clone(),
            ),
            GurpsProperty::new(
                "Lift",
                TraitKind::AttributeFunction {
                    formula: parse_formula("ST*ST/5", &location).unwrap(),
                },
                location,
            ),
        ];
        let index = traits
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        (traits, index)
    }

    fn check(sort: ValueSort, enclosing: usize, text: &str) -> SemanticResult<()> {
        let (traits, index) = table();
        let context = CheckingContext::new(&traits, &index, &traits[enclosing]);
        let formula = parse_formula(text, &traits[enclosing].location).unwrap();
        match sort {
            ValueSort::Int => context.check_is_int(&formula),
            ValueSort::Boolean => context.check_is_boolean(&formula),
            ValueSort::Percent => context.check_is_percent(&formula),
        }
    }

    #[test]
    fn test_int_rules() {
        assert!(check(ValueSort::Int, 0, "ST * 2 + Lift - level").is_ok());
        assert!(check(ValueSort::Int, 0, "IF Luck AND ST > 10 THEN 1 ELSE -1").is_ok());
        assert_matches!(check(ValueSort::Int, 0, "Luck + 1"), Err(SemanticError::TypeError { .. }));
        assert_matches!(check(ValueSort::Int, 0, "true"), Err(SemanticError::TypeError { .. }));
    }

    #[test]
    fn test_division_needs_nonzero_literal() {
        assert!(check(ValueSort::Int, 0, "ST / 5").is_ok());
        assert_matches!(check(ValueSort::Int, 0, "ST / 0"), Err(SemanticError::TypeError { .. }));
        assert_matches!(check(ValueSort::Int, 0, "5 / ST"), Err(SemanticError::TypeError { .. }));
    }

    #[test]
    fn test_level_is_undefined_in_attribute_function() {
        assert_matches!(
            check(ValueSort::Int, 2, "level + 1"),
            Err(SemanticError::UndefinedName { name, .. }) if name == "level"
        );
    }

    #[test]
    fn test_undefined_names() {
        assert_matches!(
            check(ValueSort::Int, 0, "Strength"),
            Err(SemanticError::UndefinedName { name, .. }) if name == "Strength"
        );
    }

    #[test]
    fn test_boolean_rules() {
        assert!(check(ValueSort::Boolean, 0, "Luck OR ST > 10").is_ok());
        assert!(check(ValueSort::Boolean, 0, "IF Luck THEN true ELSE ST >= 12").is_ok());
        assert_matches!(check(ValueSort::Boolean, 0, "Lift"), Err(SemanticError::TypeError { .. }));
        assert_matches!(check(ValueSort::Boolean, 0, "Luck OR ST"), Err(SemanticError::TypeError { .. }));
        assert_matches!(check(ValueSort::Boolean, 0, "level"), Err(SemanticError::TypeError { .. }));
        assert_matches!(
            check(ValueSort::Int, 0, "IF Lift THEN 1 ELSE 0"),
            Err(SemanticError::TypeError { message, .. }) if message.starts_with("expected boolean")
        );
        assert_matches!(
            check(ValueSort::Int, 0, "IF ST THEN 1 ELSE 0"),
            Err(SemanticError::TypeError { message, .. }) if message.starts_with("expected boolean")
        );
    }

    #[test]
    fn test_percent_rules() {
        assert!(check(ValueSort::Percent, 0, "20%").is_ok());
        assert!(check(ValueSort::Percent, 0, "level * 10%").is_ok());
        assert!(check(ValueSort::Percent, 0, "5% * (level + 1)").is_ok());
        assert_matches!(check(ValueSort::Percent, 0, "ST * 10%"), Err(SemanticError::TypeError { .. }));
        assert_matches!(check(ValueSort::Percent, 0, "10"), Err(SemanticError::TypeError { .. }));
    }

    #[test]
    fn test_comma_is_never_typed() {
        assert_matches!(
            check(ValueSort::Int, 0, "1, 2"),
            Err(SemanticError::TypeError { message, .. }) if message.contains("','")
        );
    }
}
