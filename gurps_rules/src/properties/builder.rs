//! Interprets `ParsedThing` trees as typed trait definitions

use super::error::{BuildError, BuildResult};
use super::model::{CostOperator, Difficulty, Effect, EffectKind, GurpsProperty, TraitKind};
use crate::declaration::{DeclarationOperator, ParsedThing};
use crate::formula::{parse_formula, Formula};

/// Sub-things that describe the enclosing trait rather than modify another one
const DESCRIPTIVE_SUB_THINGS: [&str; 3] = ["category", "default", "requires"];

/// Split a trailing ` E`, ` A`, ` H` or ` V` off a skill formula
fn split_difficulty(formula: &str) -> Option<(&str, Difficulty)> {
    let mut chars = formula.chars().rev();
    let letter = chars.next()?;
    let difficulty = Difficulty::from_letter(letter)?;
    if chars.next() != Some(' ') || chars.next().is_none() {
        return None;
    }
    Some((&formula[..formula.len() - 1], difficulty))
}

pub fn build_property(thing: &ParsedThing) -> BuildResult<GurpsProperty> {
    let mut property = create_property(thing)?;
    property.comment = thing.comment.clone();

    for sub_thing in &thing.sub_things {
        apply_sub_thing(&mut property, sub_thing)?;
    }

    Ok(property)
}

fn create_property(thing: &ParsedThing) -> BuildResult<GurpsProperty> {
    if thing.has_sub_property() {
        return Err(BuildError::illegal_structure(
            "No '.' allowed in names",
            &thing.location,
        ));
    }

    let kind = match thing.operator {
        DeclarationOperator::Define => match split_difficulty(&thing.formula) {
            Some((text, difficulty)) => TraitKind::Skill {
                difficulty,
                formula: parse_formula(text, &thing.location)?,
                category: false,
            },
            None => {
                let cost = parse_formula(&thing.formula, &thing.location)?;
                if cost.mentions_level() {
                    TraitKind::IntAdvantage { cost }
                } else {
                    TraitKind::BooleanAdvantage { cost }
                }
            }
        },
        DeclarationOperator::Inherit => {
            let (text, difficulty) = match split_difficulty(&thing.formula) {
                Some((text, difficulty)) => (text, Some(difficulty)),
                None => (thing.formula.as_str(), None),
            };
            match parse_formula(text, &thing.location)? {
                Formula::Identifier(parent) => TraitKind::InheritedSkill {
                    parent,
                    parent_index: None,
                    difficulty,
                    category: false,
                },
                _ => return Err(BuildError::expected_skill_name(text.trim(), &thing.location)),
            }
        }
        DeclarationOperator::Function => TraitKind::AttributeFunction {
            formula: parse_formula(&thing.formula, &thing.location)?,
        },
        DeclarationOperator::AddTo | DeclarationOperator::SubtractFrom => {
            return Err(BuildError::illegal_structure(
                format!("expected ':', '=', or ':='. got '{}'", thing.operator),
                &thing.location,
            ));
        }
    };

    Ok(GurpsProperty::new(&thing.name, kind, thing.location.clone()))
}

fn apply_sub_thing(property: &mut GurpsProperty, sub_thing: &ParsedThing) -> BuildResult<()> {
    if DESCRIPTIVE_SUB_THINGS.contains(&sub_thing.name.as_str()) {
        return apply_descriptive(property, sub_thing);
    }

    match sub_thing.operator {
        DeclarationOperator::AddTo | DeclarationOperator::SubtractFrom => {
            let formula = parse_formula(&sub_thing.formula, &sub_thing.location)?;
            let subtract = sub_thing.operator == DeclarationOperator::SubtractFrom;

            let (kind, formula) = match sub_thing.sub_property.as_deref() {
                None if subtract => (EffectKind::TraitModifier, Formula::negate(formula)),
                None => (EffectKind::TraitModifier, formula),
                Some("cost") => {
                    let operator = if subtract {
                        CostOperator::Subtract
                    } else {
                        CostOperator::Add
                    };
                    (EffectKind::CostModifier(operator), formula)
                }
                Some(other) => {
                    return Err(BuildError::illegal_structure(
                        format!("can't modify the '{}' of another trait", other),
                        &sub_thing.location,
                    ));
                }
            };

            if let Some(nested) = sub_thing.sub_things.first() {
                return Err(BuildError::illegal_structure(
                    "Subitems not allowed here",
                    &nested.location,
                ));
            }

            property.effects.push(Effect {
                owner: property.name.clone(),
                target: sub_thing.name.clone(),
                kind,
                formula,
                location: sub_thing.location.clone(),
            });
            Ok(())
        }
        DeclarationOperator::Define => {
            if sub_thing.has_sub_property() {
                return Err(BuildError::illegal_structure(
                    "No '.' allowed in names",
                    &sub_thing.location,
                ));
            }
            Ok(())
        }
        DeclarationOperator::Inherit | DeclarationOperator::Function => Err(
            BuildError::illegal_operator(sub_thing.operator.as_str(), &sub_thing.location),
        ),
    }
}

/// `category`, `default` and `requires`
fn apply_descriptive(property: &mut GurpsProperty, sub_thing: &ParsedThing) -> BuildResult<()> {
    if let Some(sub_property) = &sub_thing.sub_property {
        return Err(BuildError::illegal_structure(
            format!(
                "property '{}' has no subproperty '{}'",
                sub_thing.name, sub_property
            ),
            &sub_thing.location,
        ));
    }

    let formula = parse_formula(&sub_thing.formula, &sub_thing.location)?;
    if sub_thing.name != "category" {
        return Ok(());
    }

    let Formula::Boolean(value) = formula else {
        return Err(BuildError::illegal_structure(
            "category can only be 'true' or 'false'",
            &sub_thing.location,
        ));
    };

    match &mut property.kind {
        TraitKind::Skill { category, .. } | TraitKind::InheritedSkill { category, .. } => {
            *category = value;
            Ok(())
        }
        _ => Err(BuildError::wrong_kind(
            "only skills can be categories",
            &sub_thing.location,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{DeclarationParser, SourceText};
    use crate::formula::BinaryOperator;
    use assert_matches::assert_matches;

    fn build(text: &str) -> BuildResult<GurpsProperty> {
        let source = SourceText::new("builder.txt", text);
        let thing = DeclarationParser::new(&source)
            .next()
            .expect("one declaration")
            .expect("parses");
        build_property(&thing)
    }

    #[test]
    fn test_skill_with_difficulty() {
        let property = build("Broadsword : DX A").unwrap();
        assert_matches!(
            property.kind,
            TraitKind::Skill { difficulty: Difficulty::Average, formula: Formula::Identifier(ref name), category: false }
                if name == "DX"
        );
    }

    #[test]
    fn test_advantage_kind_depends_on_level() {
        assert_matches!(build("ST : 10 * level").unwrap().kind, TraitKind::IntAdvantage { .. });
        assert_matches!(build("Combat Reflexes : 15").unwrap().kind, TraitKind::BooleanAdvantage { .. });
    }

    #[test]
    fn test_inherited_skill() {
        let property = build("Guns (Pistol) := Guns").unwrap();
        assert_matches!(
            property.kind,
            TraitKind::InheritedSkill { ref parent, difficulty: None, parent_index: None, .. } if parent == "Guns"
        );

        let explicit = build("Guns (Rifle) := Guns E").unwrap();
        assert_matches!(explicit.kind, TraitKind::InheritedSkill { difficulty: Some(Difficulty::Easy), .. });
    }

    #[test]
    fn test_inherited_skill_requires_bare_name() {
        assert_matches!(
            build("Guns (Pistol) := Guns + 1"),
            Err(BuildError::ExpectedSkillName { .. })
        );
    }

    #[test]
    fn test_attribute_function() {
        assert_matches!(build("Lift = ST*ST/5").unwrap().kind, TraitKind::AttributeFunction { .. });
    }

    #[test]
    fn test_top_level_structure_errors() {
        assert_matches!(build("ST.cost : 10"), Err(BuildError::IllegalStructure { .. }));
        assert_matches!(build("ST += 10"), Err(BuildError::IllegalStructure { .. }));
    }

    #[test]
    fn test_effects_from_block() {
        let property = build("Human : 0 \"race\" {\n ST += 10\n HT -= 1\n Magery.cost -= 20%\n Speaks : 0\n}").unwrap();

        assert_eq!(property.comment.as_deref(), Some("race"));
        assert_eq!(property.effects.len(), 3);

        let st = &property.effects[0];
        assert_eq!((st.owner.as_str(), st.target.as_str()), ("Human", "ST"));
        assert_eq!(st.kind, EffectKind::TraitModifier);
        assert_eq!(st.formula, Formula::Integer(10));

        assert_eq!(property.effects[1].formula, Formula::negate(Formula::Integer(1)));
        assert_eq!(
            property.effects[2].kind,
            EffectKind::CostModifier(CostOperator::Subtract)
        );
    }

    #[test]
    fn test_category_sub_thing() {
        let property = build("Guns : DX E {\n category = true\n default = DX - 4\n}").unwrap();
        assert!(property.is_category());

        assert_matches!(
            build("Luck : 15 {\n category = true\n}"),
            Err(BuildError::WrongKind { .. })
        );
        assert_matches!(
            build("Guns : DX E {\n category = 1\n}"),
            Err(BuildError::IllegalStructure { .. })
        );
        assert_matches!(
            build("Guns : DX E {\n category.x = true\n}"),
            Err(BuildError::IllegalStructure { .. })
        );
    }

    #[test]
    fn test_sub_thing_errors() {
        assert_matches!(
            build("Human : 0 {\n ST.level += 1\n}"),
            Err(BuildError::IllegalStructure { message, .. }) if message.contains("'level'")
        );
        assert_matches!(
            build("Human : 0 {\n ST = 1\n}"),
            Err(BuildError::IllegalOperator { .. })
        );
        assert_matches!(
            build("Human : 0 {\n ST += 1 {\n  DX += 1\n }\n}"),
            Err(BuildError::IllegalStructure { location, .. }) if location.line() == 3
        );
    }

    #[test]
    fn test_formula_errors_propagate() {
        assert_matches!(build("Lift = ST *"), Err(BuildError::Formula(_)));
    }

    #[test]
    fn test_negated_modifier_renders() {
        let property = build("Klutz : -5 {\n DX -= 1 + level\n}").unwrap();
        assert_eq!(
            property.effects[0].formula,
            Formula::negate(Formula::binary(BinaryOperator::Add, Formula::Integer(1), Formula::Level))
        );
    }
}
