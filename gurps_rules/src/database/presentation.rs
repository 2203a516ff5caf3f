//! Display tweaks for well-known traits

use crate::properties::{GurpsProperty, TraitKind, ValueFormat};
use std::collections::HashMap;

/// Damage traits shown in dice notation
pub const DICE_TRAITS: [&str; 2] = ["Thrust", "Swing"];

/// Stored in quarters so that it stays an integer
pub const BASIC_SPEED_X4: &str = "Basic Speed x4";
pub const BASIC_SPEED_DISPLAY_NAME: &str = "Basic Speed";

pub fn apply_presentation_tweaks(traits: &mut [GurpsProperty], index: &HashMap<String, usize>) {
    for name in DICE_TRAITS {
        if let Some(&i) = index.get(name) {
            traits[i].format = ValueFormat::Dice;
        }
    }

    if let Some(&i) = index.get(BASIC_SPEED_X4) {
        traits[i].display_name = Some(BASIC_SPEED_DISPLAY_NAME.to_string());
        traits[i].format = ValueFormat::Quarters;
    }

    for property in traits.iter_mut() {
        if matches!(property.kind, TraitKind::BooleanAdvantage { .. }) {
            property.format = ValueFormat::YesNo;
        }
    }
}
