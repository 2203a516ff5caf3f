//! Immutable trait definitions

use crate::formula::Formula;
use crate::utils::Location;
use std::fmt;

/// How a trait's integer value is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    #[default]
    Decimal,
    /// Four units per die: `7` is `2d-1`
    Dice,
    YesNo,
    /// Value divided by four: `21` is `5.25`
    Quarters,
}

impl ValueFormat {
    pub fn format(&self, value: Option<i64>) -> String {
        let Some(value) = value else {
            return "-".to_string();
        };

        match self {
            ValueFormat::Decimal => value.to_string(),
            ValueFormat::Dice => format_dice(value),
            ValueFormat::YesNo => if value != 0 { "Yes" } else { "No" }.to_string(),
            ValueFormat::Quarters => format_quarters(value),
        }
    }
}

fn format_dice(value: i64) -> String {
    let mut dice = value.saturating_add(1).div_euclid(4);
    let mut adds = value.saturating_sub(dice.saturating_mul(4));
    if dice < 1 {
        dice = 1;
        adds = value.saturating_sub(4);
    }

    match adds {
        0 => format!("{}d", dice),
        adds if adds > 0 => format!("{}d+{}", dice, adds),
        adds => format!("{}d{}", dice, adds),
    }
}

fn format_quarters(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    let fraction = match magnitude % 4 {
        1 => ".25",
        2 => ".5",
        3 => ".75",
        _ => "",
    };
    format!("{}{}{}", sign, magnitude / 4, fraction)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Average,
    Hard,
    VeryHard,
}

impl Difficulty {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'E' => Some(Difficulty::Easy),
            'A' => Some(Difficulty::Average),
            'H' => Some(Difficulty::Hard),
            'V' => Some(Difficulty::VeryHard),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Difficulty::Easy => 'E',
            Difficulty::Average => 'A',
            Difficulty::Hard => 'H',
            Difficulty::VeryHard => 'V',
        }
    }

    /// Added to the base formula when computing skill level
    pub fn offset(&self) -> i64 {
        match self {
            Difficulty::Easy => -1,
            Difficulty::Average => -2,
            Difficulty::Hard => -3,
            Difficulty::VeryHard => -4,
        }
    }

    /// One step easier, saturating at Easy
    pub fn easier(&self) -> Self {
        match self {
            Difficulty::Easy | Difficulty::Average => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Average,
            Difficulty::VeryHard => Difficulty::Hard,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostOperator {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Adds to the target's level; `-=` is stored as a negated formula
    TraitModifier,
    /// Adjusts the target's cost by a percent
    CostModifier(CostOperator),
}

/// A modifier declared inside a trait's block that applies to another trait
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub owner: String,
    pub target: String,
    pub kind: EffectKind,
    pub formula: Formula,
    pub location: Location,
}

/// Position of an effect: the owning trait's index and the effect's index in its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectRef {
    pub owner: usize,
    pub effect: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraitKind {
    Skill {
        difficulty: Difficulty,
        formula: Formula,
        category: bool,
    },
    InheritedSkill {
        parent: String,
        /// Filled in once the whole database is known
        parent_index: Option<usize>,
        difficulty: Option<Difficulty>,
        category: bool,
    },
    IntAdvantage {
        cost: Formula,
    },
    BooleanAdvantage {
        cost: Formula,
    },
    AttributeFunction {
        formula: Formula,
    },
}

impl TraitKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TraitKind::Skill { .. } => "skill",
            TraitKind::InheritedSkill { .. } => "inherited skill",
            TraitKind::IntAdvantage { .. } => "advantage",
            TraitKind::BooleanAdvantage { .. } => "boolean advantage",
            TraitKind::AttributeFunction { .. } => "attribute function",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GurpsProperty {
    pub name: String,
    pub display_name: Option<String>,
    pub comment: Option<String>,
    pub location: Location,
    pub format: ValueFormat,
    pub kind: TraitKind,
    pub effects: Vec<Effect>,
    pub effected_by: Vec<EffectRef>,
}

impl GurpsProperty {
    pub fn new(name: impl Into<String>, kind: TraitKind, location: Location) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            comment: None,
            location,
            format: ValueFormat::default(),
            kind,
            effects: Vec::new(),
            effected_by: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_skill(&self) -> bool {
        matches!(
            self.kind,
            TraitKind::Skill { .. } | TraitKind::InheritedSkill { .. }
        )
    }

    pub fn is_advantage(&self) -> bool {
        matches!(
            self.kind,
            TraitKind::IntAdvantage { .. } | TraitKind::BooleanAdvantage { .. }
        )
    }

    /// Whether other traits may add to this trait's level
    pub fn has_level(&self) -> bool {
        !matches!(self.kind, TraitKind::BooleanAdvantage { .. })
    }

    /// Whether other traits may adjust this trait's cost
    pub fn has_cost(&self) -> bool {
        !matches!(self.kind, TraitKind::AttributeFunction { .. })
    }

    pub fn is_category(&self) -> bool {
        match self.kind {
            TraitKind::Skill { category, .. } | TraitKind::InheritedSkill { category, .. } => {
                category
            }
            _ => false,
        }
    }

    /// The formula this trait evaluates directly, if any
    pub fn own_formula(&self) -> Option<&Formula> {
        match &self.kind {
            TraitKind::Skill { formula, .. } | TraitKind::AttributeFunction { formula } => {
                Some(formula)
            }
            TraitKind::IntAdvantage { cost } | TraitKind::BooleanAdvantage { cost } => Some(cost),
            TraitKind::InheritedSkill { .. } => None,
        }
    }
}
