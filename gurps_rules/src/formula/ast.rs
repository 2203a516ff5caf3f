//! Formula expression trees

use super::token::{Percent, Symbol};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Add,
    Subtract,
    LessEqual,
    Less,
    GreaterEqual,
    Greater,
    And,
    Or,
    Comma,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Less => "<",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Greater => ">",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Comma => ",",
        }
    }

    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::Star => Some(BinaryOperator::Multiply),
            Symbol::Slash => Some(BinaryOperator::Divide),
            Symbol::Plus => Some(BinaryOperator::Add),
            Symbol::Minus => Some(BinaryOperator::Subtract),
            Symbol::LessEqual => Some(BinaryOperator::LessEqual),
            Symbol::Less => Some(BinaryOperator::Less),
            Symbol::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            Symbol::Greater => Some(BinaryOperator::Greater),
            Symbol::And => Some(BinaryOperator::And),
            Symbol::Or => Some(BinaryOperator::Or),
            Symbol::Comma => Some(BinaryOperator::Comma),
            Symbol::LeftParen
            | Symbol::RightParen
            | Symbol::If
            | Symbol::Then
            | Symbol::Else => None,
        }
    }

    /// Precedence tier, tightest first
    pub fn tier(&self) -> usize {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide => 0,
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::LessEqual
            | BinaryOperator::Less
            | BinaryOperator::GreaterEqual
            | BinaryOperator::Greater => 2,
            BinaryOperator::And => 3,
            BinaryOperator::Or => 4,
            BinaryOperator::Comma => 6,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.tier() == 2
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier of unary minus
pub const NEGATE_TIER: usize = 1;
/// Tier of `IF ... THEN ... ELSE`
pub const CONDITIONAL_TIER: usize = 5;
pub const TIER_COUNT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Identifier(String),
    /// Purchased levels of the enclosing trait
    Level,
    Integer(i64),
    Percent(Percent),
    Boolean(bool),
    Negate(Box<Formula>),
    Binary {
        op: BinaryOperator,
        left: Box<Formula>,
        right: Box<Formula>,
    },
    Conditional {
        condition: Box<Formula>,
        then_branch: Box<Formula>,
        else_branch: Box<Formula>,
    },
}

impl Formula {
    pub fn negate(operand: Formula) -> Self {
        Formula::Negate(Box::new(operand))
    }

    pub fn binary(op: BinaryOperator, left: Formula, right: Formula) -> Self {
        Formula::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(condition: Formula, then_branch: Formula, else_branch: Formula) -> Self {
        Formula::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Trait names referenced, first occurrence order, without duplicates
    pub fn used_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Formula::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            Formula::Level | Formula::Integer(_) | Formula::Percent(_) | Formula::Boolean(_) => {}
            Formula::Negate(operand) => operand.collect_names(names),
            Formula::Binary { left, right, .. } => {
                left.collect_names(names);
                right.collect_names(names);
            }
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.collect_names(names);
                then_branch.collect_names(names);
                else_branch.collect_names(names);
            }
        }
    }

    pub fn mentions_level(&self) -> bool {
        match self {
            Formula::Level => true,
            Formula::Identifier(_)
            | Formula::Integer(_)
            | Formula::Percent(_)
            | Formula::Boolean(_) => false,
            Formula::Negate(operand) => operand.mentions_level(),
            Formula::Binary { left, right, .. } => left.mentions_level() || right.mentions_level(),
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.mentions_level()
                    || then_branch.mentions_level()
                    || else_branch.mentions_level()
            }
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Identifier(name) => f.write_str(name),
            Formula::Level => f.write_str("level"),
            Formula::Integer(value) => write!(f, "{}", value),
            Formula::Percent(percent) => write!(f, "{}", percent),
            Formula::Boolean(value) => write!(f, "{}", value),
            Formula::Negate(operand) => write!(f, "(-{})", operand),
            Formula::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Formula::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(
                f,
                "(IF {} THEN {} ELSE {})",
                condition, then_branch, else_branch
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_names_deduplicates_in_order() {
        let formula = Formula::binary(
            BinaryOperator::Divide,
            Formula::binary(
                BinaryOperator::Multiply,
                Formula::Identifier("ST".into()),
                Formula::Identifier("ST".into()),
            ),
            Formula::Identifier("Lift Divisor".into()),
        );
        assert_eq!(formula.used_names(), vec!["ST", "Lift Divisor"]);
    }

    #[test]
    fn test_mentions_level_is_structural() {
        let with_level = Formula::binary(BinaryOperator::Multiply, Formula::Integer(5), Formula::Level);
        let named = Formula::Identifier("Tech level".into());

        assert!(with_level.mentions_level());
        assert!(!named.mentions_level());
        assert!(named.used_names().contains(&"Tech level"));
    }

    #[test]
    fn test_display_is_fully_parenthesized() {
        let formula = Formula::conditional(
            Formula::Boolean(true),
            Formula::negate(Formula::Integer(1)),
            Formula::binary(BinaryOperator::Add, Formula::Level, Formula::Percent(Percent(20))),
        );
        assert_eq!(formula.to_string(), "(IF true THEN (-1) ELSE (level + 20%))");
    }
}
