//! Parse-tree nodes produced by the declaration parser

use crate::utils::Location;
use std::fmt;
use std::sync::Arc;

/// One named database source
#[derive(Debug, Clone)]
pub struct SourceText {
    pub path: Arc<str>,
    pub text: String,
}

impl SourceText {
    pub fn new(path: impl Into<Arc<str>>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationOperator {
    /// `:`
    Define,
    /// `:=`
    Inherit,
    /// `=`
    Function,
    /// `+=`
    AddTo,
    /// `-=`
    SubtractFrom,
}

impl DeclarationOperator {
    /// Longest operators first, so `:=` wins over `:`
    pub const ALL: [DeclarationOperator; 5] = [
        DeclarationOperator::Inherit,
        DeclarationOperator::Define,
        DeclarationOperator::Function,
        DeclarationOperator::AddTo,
        DeclarationOperator::SubtractFrom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Define => ":",
            Self::Inherit => ":=",
            Self::Function => "=",
            Self::AddTo => "+=",
            Self::SubtractFrom => "-=",
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::AddTo | Self::SubtractFrom)
    }
}

impl fmt::Display for DeclarationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declaration line plus any nested `{ ... }` block
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedThing {
    pub name: String,
    pub sub_property: Option<String>,
    pub operator: DeclarationOperator,
    pub formula: String,
    pub comment: Option<String>,
    pub location: Location,
    pub sub_things: Vec<ParsedThing>,
}

impl ParsedThing {
    pub fn has_sub_property(&self) -> bool {
        self.sub_property.is_some()
    }

    /// `name` or `name.sub` as written
    pub fn full_name(&self) -> String {
        match &self.sub_property {
            Some(sub) => format!("{}.{}", self.name, sub),
            None => self.name.clone(),
        }
    }
}
